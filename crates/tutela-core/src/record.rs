//! Persisted record types.
//!
//! Every record is a flat row keyed by a surrogate integer that the store
//! assigns (never the database). Serialized field names are the column names
//! clients already depend on, which is why several of them are not camelCase.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::signature::Assinatura;

// ─── Council members ─────────────────────────────────────────────────────────

/// Role of a council member.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Cargo {
  Secretario,
  Conselheiro,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conselheiro {
  #[serde(rename = "idConselheiro")]
  pub id:              i64,
  #[serde(rename = "nomeConselheiro")]
  pub nome:            Option<String>,
  pub cargo:           Option<Cargo>,
  pub cpf:             Option<String>,
  pub rg:              Option<String>,
  pub data_nascimento: Option<String>,
  pub endereco:        Option<String>,
  /// `(DDD) number`
  #[serde(rename = "contatoConselheiro")]
  pub contato:         Option<String>,
  pub nacionalidade:   Option<String>,
  #[serde(rename = "iniMandato", default)]
  pub inicio_mandato:  Option<String>,
  #[serde(rename = "fimMandato", default)]
  pub fim_mandato:     Option<String>,
}

// ─── Lookup ──────────────────────────────────────────────────────────────────

/// A "violated right" lookup row, created on demand by assistance records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DireitoViolado {
  #[serde(rename = "idDireitoViolado")]
  pub id:        i64,
  #[serde(rename = "Descricao")]
  pub descricao: Option<String>,
}

// ─── Complaint ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Denuncia {
  #[serde(rename = "nrDenuncia")]
  pub nr_denuncia:         i64,
  #[serde(rename = "DescricaoFato")]
  pub descricao_fato:      Option<String>,
  #[serde(rename = "Data")]
  pub data:                Option<String>,
  #[serde(rename = "TipoDenuncia")]
  pub tipo_denuncia:       Option<String>,
  /// 1 when the complainant identified themselves, 0 when anonymous.
  #[serde(rename = "PessoalEnfEntrada")]
  pub pessoal_enf_entrada: i64,
  #[serde(rename = "idConselheiro")]
  pub id_conselheiro:      Option<i64>,
  #[serde(rename = "Data_averiguacao")]
  pub data_averiguacao:    Option<String>,
  /// JSON-encoded [`crate::observacao::Observacao`].
  #[serde(rename = "Observacao")]
  pub observacao:          Option<String>,
}

// ─── Assistance record ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atendimento {
  #[serde(rename = "idAtendimento")]
  pub id:                        i64,
  #[serde(rename = "Data")]
  pub data:                      Option<String>,
  #[serde(rename = "Hora")]
  pub hora:                      Option<String>,
  #[serde(rename = "Relato")]
  pub relato:                    Option<String>,
  #[serde(rename = "idDireitoViolado")]
  pub id_direito_violado:        Option<i64>,
  /// Joined from the lookup table on read.
  #[serde(rename = "direitoVioladoDescricao", default)]
  pub direito_violado_descricao: Option<String>,
}

/// Payload returned by a successful assistance-record create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtendimentoCriado {
  #[serde(flatten)]
  pub atendimento: Atendimento,
  pub assinatura:  Option<Assinatura>,
}

// ─── Notification ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notificacao {
  pub id:                 i64,
  /// Name of whoever received the notice.
  pub redator:            Option<String>,
  /// Body of the "second notice"; the column is historically named
  /// `assinatura`.
  #[serde(rename = "assinatura")]
  pub segunda_via:        Option<String>,
  #[serde(rename = "idConselheiro")]
  pub id_conselheiro:     Option<i64>,
  #[serde(rename = "idSecretario")]
  pub id_secretario:      Option<i64>,
  #[serde(rename = "idMedida_idMaior")]
  pub id_medida_id_maior: Option<i64>,
  #[serde(rename = "dataNotificacao", default)]
  pub data:               Option<String>,
  #[serde(rename = "horaNotificacao", default)]
  pub hora:               Option<String>,
}

/// Payload returned by a successful notification create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificacaoCriada {
  pub id:               i64,
  pub redator:          Option<String>,
  #[serde(rename = "assinaturaTexto")]
  pub assinatura_texto: Option<String>,
  #[serde(rename = "dataNotificacao")]
  pub data:             Option<String>,
  #[serde(rename = "horaNotificacao")]
  pub hora:             Option<String>,
  pub assinatura:       Option<Assinatura>,
}

impl NotificacaoCriada {
  pub fn new(row: Notificacao, assinatura: Option<Assinatura>) -> Self {
    Self {
      id: row.id,
      redator: row.redator,
      assinatura_texto: row.segunda_via,
      data: row.data,
      hora: row.hora,
      assinatura,
    }
  }
}

// ─── Protective-measure terms ────────────────────────────────────────────────

/// A protective-measure term; the same shape serves minors and guardians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermoMedidas {
  #[serde(rename = "idmedida_aplicada")]
  pub id:        i64,
  pub data:      Option<String>,
  pub descricao: Option<String>,
  /// First selected clause only; see [`crate::medidas::inciso`].
  pub inciso:    Option<i64>,
}

/// Payload returned by a successful term create. Only here does the full
/// clause selection survive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermoCriado {
  #[serde(flatten)]
  pub termo:                TermoMedidas,
  #[serde(rename = "medidasSelecionadas")]
  pub medidas_selecionadas: Vec<u8>,
  pub assinatura:           Option<Assinatura>,
}

// ─── Map markers ─────────────────────────────────────────────────────────────

/// A case location shown on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marcador {
  #[serde(rename = "idMarcador")]
  pub id:             i64,
  pub latitude:       f64,
  pub longitude:      f64,
  #[serde(rename = "tipoDocumento")]
  pub tipo_documento: Option<String>,
  #[serde(rename = "idDocumento")]
  pub id_documento:   Option<String>,
  pub endereco:       Option<String>,
  pub descricao:      Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn denuncia_uses_column_names_on_the_wire() {
    let d = Denuncia {
      nr_denuncia:         7,
      descricao_fato:      Some("x".into()),
      data:                Some("2024-01-10".into()),
      tipo_denuncia:       Some("identificada".into()),
      pessoal_enf_entrada: 1,
      id_conselheiro:      None,
      data_averiguacao:    None,
      observacao:          None,
    };
    let v = serde_json::to_value(&d).unwrap();
    assert_eq!(v["nrDenuncia"], 7);
    assert_eq!(v["DescricaoFato"], "x");
    assert_eq!(v["PessoalEnfEntrada"], 1);
    assert!(v["idConselheiro"].is_null());
    assert!(v["Data_averiguacao"].is_null());
  }

  #[test]
  fn notification_created_payload_renames_notice_body() {
    let row = Notificacao {
      id:                 3,
      redator:            Some("Maria".into()),
      segunda_via:        Some("Comparecer dia 12".into()),
      id_conselheiro:     None,
      id_secretario:      None,
      id_medida_id_maior: None,
      data:               Some("2024-02-01".into()),
      hora:               None,
    };
    let v = serde_json::to_value(NotificacaoCriada::new(row, None)).unwrap();
    assert_eq!(v["assinaturaTexto"], "Comparecer dia 12");
    assert_eq!(v["dataNotificacao"], "2024-02-01");
    assert!(v["assinatura"].is_null());
  }

  #[test]
  fn cargo_parses_from_column_text() {
    assert_eq!("secretario".parse::<Cargo>().unwrap(), Cargo::Secretario);
    assert_eq!(Cargo::Conselheiro.as_ref(), "conselheiro");
    assert!("prefeito".parse::<Cargo>().is_err());
  }
}
