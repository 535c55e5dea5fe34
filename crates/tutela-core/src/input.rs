//! Request bodies for the create endpoints.
//!
//! Bodies never fail to decode: every field is optional, unknown fields are
//! ignored, and a value of the wrong JSON type degrades to "absent" instead of
//! rejecting the request. Empty strings count as absent, matching how the
//! forms submit blank inputs.

use serde::{Deserialize, Serialize};

use crate::{record::Cargo, signature::Assinatura};

// ─── Lenient field decoders ──────────────────────────────────────────────────

/// `deserialize_with` helpers that map loosely-typed JSON onto `Option`s.
pub mod lenient {
  use serde::{Deserialize, Deserializer};
  use serde_json::Value;

  use crate::signature::Assinatura;

  /// Strings pass through; numbers and booleans are stringified; empty
  /// strings, `null` and containers become `None`.
  pub fn string<'de, D>(d: D) -> Result<Option<String>, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(match Value::deserialize(d)? {
      Value::String(s) if !s.is_empty() => Some(s),
      Value::Number(n) => Some(n.to_string()),
      Value::Bool(b) => Some(b.to_string()),
      _ => None,
    })
  }

  /// Integers, integral floats and numeric strings become `Some`.
  pub fn int<'de, D>(d: D) -> Result<Option<i64>, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(match Value::deserialize(d)? {
      Value::Number(n) => n
        .as_i64()
        .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
      Value::String(s) => s.trim().parse().ok(),
      _ => None,
    })
  }

  /// Numbers and numeric strings become `Some`.
  pub fn float<'de, D>(d: D) -> Result<Option<f64>, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(match Value::deserialize(d)? {
      Value::Number(n) => n.as_f64(),
      Value::String(s) => s.trim().parse().ok(),
      _ => None,
    })
  }

  /// Truthiness as a form would see it: `false`, `0`, `""` and `null` are
  /// unset, anything else is set.
  pub fn flag<'de, D>(d: D) -> Result<bool, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(match Value::deserialize(d)? {
      Value::Null => false,
      Value::Bool(b) => b,
      Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
      Value::String(s) => !s.is_empty(),
      Value::Array(_) | Value::Object(_) => true,
    })
  }

  /// A signature object, or `None` for anything that is not one.
  pub fn assinatura<'de, D>(d: D) -> Result<Option<Assinatura>, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(match Value::deserialize(d)? {
      v @ Value::Object(_) => serde_json::from_value(v).ok(),
      _ => None,
    })
  }
}

// ─── Complaint ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NovaDenuncia {
  #[serde(deserialize_with = "lenient::string")]
  pub data_denuncia:                            Option<String>,
  #[serde(deserialize_with = "lenient::string")]
  pub hora_denuncia:                            Option<String>,
  /// `"identificada"` or `"anonima"`.
  #[serde(deserialize_with = "lenient::string")]
  pub tipo_pessoa:                              Option<String>,
  #[serde(deserialize_with = "lenient::string")]
  pub identificacao_denunciante:                Option<String>,
  #[serde(deserialize_with = "lenient::string")]
  pub fatos:                                    Option<String>,
  #[serde(deserialize_with = "lenient::string")]
  pub nome_data_nascimento_crianca_adolescente: Option<String>,
  #[serde(deserialize_with = "lenient::string")]
  pub nomes_pais_responsaveis:                  Option<String>,
  #[serde(deserialize_with = "lenient::string")]
  pub endereco:                                 Option<String>,
  /// Free-text name, resolved by substring when `id_conselheiro` is absent.
  #[serde(deserialize_with = "lenient::string")]
  pub conselheiro_recebeu:                      Option<String>,
  #[serde(deserialize_with = "lenient::int")]
  pub id_conselheiro:                           Option<i64>,
  #[serde(deserialize_with = "lenient::string")]
  pub data_averiguacao:                         Option<String>,
  #[serde(deserialize_with = "lenient::string")]
  pub conselheiro_efetuou_averiguacao:          Option<String>,
  #[serde(deserialize_with = "lenient::assinatura")]
  pub assinatura:                               Option<Assinatura>,
}

impl NovaDenuncia {
  /// Value stored in `PessoalEnfEntrada`.
  pub fn pessoal_enf_entrada(&self) -> i64 {
    i64::from(self.tipo_pessoa.as_deref() == Some("identificada"))
  }
}

// ─── Assistance record ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NovoAtendimento {
  #[serde(deserialize_with = "lenient::string")]
  pub data_atendimento:   Option<String>,
  #[serde(deserialize_with = "lenient::string")]
  pub hora_atendimento:   Option<String>,
  #[serde(deserialize_with = "lenient::string")]
  pub direito_violado:    Option<String>,
  #[serde(deserialize_with = "lenient::int")]
  pub id_direito_violado: Option<i64>,
  #[serde(deserialize_with = "lenient::string")]
  pub relatos:            Option<String>,
  /// Collected by the form but not persisted.
  #[serde(deserialize_with = "lenient::string")]
  pub quem_eh_o_violador: Option<String>,
  #[serde(deserialize_with = "lenient::assinatura")]
  pub assinatura:         Option<Assinatura>,
}

// ─── Notification ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NovaNotificacao {
  #[serde(deserialize_with = "lenient::string")]
  pub data_notificacao:       Option<String>,
  #[serde(deserialize_with = "lenient::string")]
  pub hora_notificacao:       Option<String>,
  #[serde(deserialize_with = "lenient::string")]
  pub nome_quem_recebeu:      Option<String>,
  #[serde(deserialize_with = "lenient::string")]
  pub segunda_via_convocacao: Option<String>,
  #[serde(deserialize_with = "lenient::assinatura")]
  pub assinatura:             Option<Assinatura>,
}

// ─── Protective-measure terms ────────────────────────────────────────────────

/// Body shared by both term kinds. Guardian terms use all eight flags; minor
/// terms ignore `medida_vii` and `medida_viii`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NovoTermo {
  #[serde(rename = "dataTermo", deserialize_with = "lenient::string")]
  pub data_termo:              Option<String>,
  #[serde(rename = "horaTermo", deserialize_with = "lenient::string")]
  pub hora_termo:              Option<String>,
  #[serde(rename = "aplicacaoMedidasTexto", deserialize_with = "lenient::string")]
  pub aplicacao_medidas_texto: Option<String>,
  #[serde(rename = "medidaI", deserialize_with = "lenient::flag")]
  pub medida_i:                bool,
  #[serde(rename = "medidaII", deserialize_with = "lenient::flag")]
  pub medida_ii:               bool,
  #[serde(rename = "medidaIII", deserialize_with = "lenient::flag")]
  pub medida_iii:              bool,
  #[serde(rename = "medidaIV", deserialize_with = "lenient::flag")]
  pub medida_iv:               bool,
  #[serde(rename = "medidaV", deserialize_with = "lenient::flag")]
  pub medida_v:                bool,
  #[serde(rename = "medidaVI", deserialize_with = "lenient::flag")]
  pub medida_vi:               bool,
  #[serde(rename = "medidaVII", deserialize_with = "lenient::flag")]
  pub medida_vii:              bool,
  #[serde(rename = "medidaVIII", deserialize_with = "lenient::flag")]
  pub medida_viii:             bool,
  #[serde(deserialize_with = "lenient::assinatura")]
  pub assinatura:              Option<Assinatura>,
}

impl NovoTermo {
  /// The eight flags in clause order.
  pub fn flags(&self) -> [bool; 8] {
    [
      self.medida_i,
      self.medida_ii,
      self.medida_iii,
      self.medida_iv,
      self.medida_v,
      self.medida_vi,
      self.medida_vii,
      self.medida_viii,
    ]
  }

  /// Set clause `n` (1-based). Out-of-range numbers are ignored.
  pub fn set_flag(&mut self, n: u8, on: bool) {
    let slot = match n {
      1 => &mut self.medida_i,
      2 => &mut self.medida_ii,
      3 => &mut self.medida_iii,
      4 => &mut self.medida_iv,
      5 => &mut self.medida_v,
      6 => &mut self.medida_vi,
      7 => &mut self.medida_vii,
      8 => &mut self.medida_viii,
      _ => return,
    };
    *slot = on;
  }
}

// ─── Council members ─────────────────────────────────────────────────────────

/// Body of `POST /conselheiros` and `PUT /conselheiros/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NovoConselheiro {
  #[serde(deserialize_with = "lenient::string")]
  pub nome:            Option<String>,
  #[serde(deserialize_with = "cargo")]
  pub cargo:           Option<Cargo>,
  #[serde(deserialize_with = "lenient::string")]
  pub cpf:             Option<String>,
  #[serde(deserialize_with = "lenient::string")]
  pub rg:              Option<String>,
  #[serde(deserialize_with = "lenient::string")]
  pub data_nascimento: Option<String>,
  #[serde(deserialize_with = "lenient::string")]
  pub endereco:        Option<String>,
  #[serde(rename = "celularDDD", deserialize_with = "lenient::string")]
  pub celular_ddd:     Option<String>,
  #[serde(deserialize_with = "lenient::string")]
  pub celular_numero:  Option<String>,
  #[serde(deserialize_with = "lenient::string")]
  pub nacionalidade:   Option<String>,
}

impl NovoConselheiro {
  /// Contact column value, `"(DDD) number"`. `None` when both are blank.
  pub fn contato(&self) -> Option<String> {
    match (self.celular_ddd.as_deref(), self.celular_numero.as_deref()) {
      (None, None) => None,
      (ddd, num) => Some(format!("({}) {}", ddd.unwrap_or(""), num.unwrap_or(""))),
    }
  }
}

fn cargo<'de, D>(d: D) -> Result<Option<Cargo>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  Ok(lenient::string(d)?.and_then(|s| s.to_lowercase().parse().ok()))
}

// ─── Map markers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NovoMarcador {
  #[serde(deserialize_with = "lenient::float")]
  pub latitude:       Option<f64>,
  #[serde(deserialize_with = "lenient::float")]
  pub longitude:      Option<f64>,
  #[serde(deserialize_with = "lenient::string")]
  pub tipo_documento: Option<String>,
  #[serde(deserialize_with = "lenient::string")]
  pub id_documento:   Option<String>,
  #[serde(deserialize_with = "lenient::string")]
  pub endereco:       Option<String>,
  #[serde(deserialize_with = "lenient::string")]
  pub descricao:      Option<String>,
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn denuncia_body_tolerates_wrong_types_and_blanks() {
    let d: NovaDenuncia = serde_json::from_value(json!({
      "dataDenuncia": "2024-01-10",
      "tipoPessoa": "identificada",
      "fatos": "",
      "endereco": 42,
      "idConselheiro": "3",
      "assinatura": "not an object",
      "campoDesconhecido": true
    }))
    .unwrap();

    assert_eq!(d.data_denuncia.as_deref(), Some("2024-01-10"));
    assert_eq!(d.fatos, None);
    assert_eq!(d.endereco.as_deref(), Some("42"));
    assert_eq!(d.id_conselheiro, Some(3));
    assert!(d.assinatura.is_none());
    assert_eq!(d.pessoal_enf_entrada(), 1);
  }

  #[test]
  fn anonymous_or_missing_kind_is_not_declared() {
    let d: NovaDenuncia = serde_json::from_value(json!({ "tipoPessoa": "anonima" })).unwrap();
    assert_eq!(d.pessoal_enf_entrada(), 0);
    assert_eq!(NovaDenuncia::default().pessoal_enf_entrada(), 0);
  }

  #[test]
  fn term_flags_follow_form_truthiness() {
    let t: NovoTermo = serde_json::from_value(json!({
      "medidaI": false,
      "medidaII": true,
      "medidaIII": 0,
      "medidaIV": "on",
      "medidaV": null,
      "medidaVI": ""
    }))
    .unwrap();
    assert_eq!(t.flags(), [false, true, false, true, false, false, false, false]);
  }

  #[test]
  fn contact_is_formatted_from_ddd_and_number() {
    let c: NovoConselheiro = serde_json::from_value(json!({
      "nome": "Ana",
      "cargo": "Secretario",
      "celularDDD": "55",
      "celularNumero": "99999-0000"
    }))
    .unwrap();
    assert_eq!(c.contato().as_deref(), Some("(55) 99999-0000"));
    assert_eq!(c.cargo, Some(Cargo::Secretario));
    assert_eq!(NovoConselheiro::default().contato(), None);
  }
}
