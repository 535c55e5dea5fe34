//! The side-channel blob stored in a complaint's `Observacao` column.

use serde::{Deserialize, Serialize};

use crate::{input::NovaDenuncia, signature::Assinatura};

/// Placeholder stored for any blank observation field.
pub const NAO_INFORMADO: &str = "N/A";

/// Complaint details that have no column of their own. Field order is the
/// serialized order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observacao {
  pub identificacao:           String,
  pub criancas_adolescentes:   String,
  pub pais_responsaveis:       String,
  pub endereco:                String,
  pub conselheiro_averiguador: String,
  #[serde(default)]
  pub assinatura:              Option<Assinatura>,
}

impl Observacao {
  pub fn from_denuncia(body: &NovaDenuncia) -> Self {
    let or_na = |v: &Option<String>| v.clone().unwrap_or_else(|| NAO_INFORMADO.to_owned());
    Self {
      identificacao:           or_na(&body.identificacao_denunciante),
      criancas_adolescentes:   or_na(&body.nome_data_nascimento_crianca_adolescente),
      pais_responsaveis:       or_na(&body.nomes_pais_responsaveis),
      endereco:                or_na(&body.endereco),
      conselheiro_averiguador: or_na(&body.conselheiro_efetuou_averiguacao),
      assinatura:              body.assinatura.clone(),
    }
  }

  pub fn encode(&self) -> crate::Result<String> {
    Ok(serde_json::to_string(self)?)
  }

  /// Decode a stored column. Rows written by other tools may hold plain text
  /// or partial objects, so this returns `None` rather than failing.
  pub fn decode(raw: &str) -> Option<Self> {
    serde_json::from_str(raw).ok()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_fields_become_placeholder_and_signature_null() {
    let body = NovaDenuncia {
      endereco: Some("Rua A, 10".into()),
      ..Default::default()
    };
    let encoded = Observacao::from_denuncia(&body).encode().unwrap();
    assert_eq!(
      encoded,
      r#"{"identificacao":"N/A","criancasAdolescentes":"N/A","paisResponsaveis":"N/A","endereco":"Rua A, 10","conselheiroAveriguador":"N/A","assinatura":null}"#
    );
  }

  #[test]
  fn decode_keeps_signature_and_rejects_free_text() {
    let body = NovaDenuncia {
      assinatura: Some(Assinatura::digital("Ana")),
      ..Default::default()
    };
    let raw = Observacao::from_denuncia(&body).encode().unwrap();
    let back = Observacao::decode(&raw).unwrap();
    assert_eq!(back.assinatura.and_then(|a| a.nome).as_deref(), Some("Ana"));

    assert!(Observacao::decode("observação livre").is_none());
  }
}
