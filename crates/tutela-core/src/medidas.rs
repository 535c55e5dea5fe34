//! Protective-measure clauses and the "inciso" column.
//!
//! Terms for minors choose among the six clauses of Art. 101 of Lei
//! 8.069/90; terms for guardians among the eight of Art. 129. The stored
//! `inciso` keeps only the first selected clause. The full selection exists
//! only in the create response.

use serde::{Deserialize, Serialize};

/// Whom a protective-measure term is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermoAlvo {
  Menor,
  Responsavel,
}

const INCISOS_MENOR: [&str; 6] = [
  "encaminhamento aos pais ou responsável, mediante termo de responsabilidade;",
  "orientação, apoio e acompanhamento temporários;",
  "matrícula e frequência obrigatórias em estabelecimento oficial de ensino fundamental;",
  "inclusão em programa comunitário ou oficial de auxílio à família, à criança e ao adolescente;",
  "inclusão em serviços e programas oficiais ou comunitários de proteção, apoio e promoção da \
   família, da criança e do adolescente;",
  "requisição de tratamento médico, psicológico ou psiquiátrico, em regime hospitalar ou \
   ambulatorial;",
];

const INCISOS_RESPONSAVEL: [&str; 8] = [
  "encaminhamento a programa oficial ou comunitário de proteção à família;",
  "encaminhamento a serviços e programas oficiais ou comunitários de proteção, apoio e promoção \
   da família;",
  "inclusão em programa oficial ou comunitário de auxílio, orientação e tratamento a alcoólatras \
   e toxicômanos;",
  "encaminhamento a tratamento psicológico ou psiquiátrico;",
  "encaminhamento a cursos ou programas de orientação;",
  "obrigação de matricular o filho ou pupilo e acompanhar sua frequência e aproveitamento escolar;",
  "obrigação de encaminhar a criança ou adolescente a tratamento especializado;",
  "advertência",
];

const ROMANOS: [&str; 8] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII"];

impl TermoAlvo {
  /// Number of clause flags the form offers.
  pub fn clause_count(self) -> u8 {
    match self {
      TermoAlvo::Menor => 6,
      TermoAlvo::Responsavel => 8,
    }
  }

  /// Legal basis printed above the clause list.
  pub fn artigo(self) -> &'static str {
    match self {
      TermoAlvo::Menor => "conforme Art. 101 da Lei 8.069/90, inciso:",
      TermoAlvo::Responsavel => "conforme Art. 129 da Lei 8.069/90, inciso:",
    }
  }

  /// Text of clause `n` (1-based).
  pub fn clause_text(self, n: u8) -> Option<&'static str> {
    let idx = usize::from(n).checked_sub(1)?;
    match self {
      TermoAlvo::Menor => INCISOS_MENOR.get(idx).copied(),
      TermoAlvo::Responsavel => INCISOS_RESPONSAVEL.get(idx).copied(),
    }
  }

  /// `"( II ) - orientação, ..."`.
  pub fn clause_label(self, n: u8) -> Option<String> {
    let text = self.clause_text(n)?;
    let roman = ROMANOS.get(usize::from(n) - 1)?;
    Some(format!("( {roman} ) - {text}"))
  }
}

/// 1-based numbers of the selected clauses, in clause order. Flags past the
/// target's clause count are ignored.
pub fn selecionadas(alvo: TermoAlvo, flags: &[bool]) -> Vec<u8> {
  flags
    .iter()
    .take(usize::from(alvo.clause_count()))
    .enumerate()
    .filter(|(_, on)| **on)
    .map(|(i, _)| i as u8 + 1)
    .collect()
}

/// The value persisted in `inciso`: the first selected clause.
pub fn inciso(selecionadas: &[u8]) -> Option<i64> {
  selecionadas.first().map(|n| i64::from(*n))
}

/// Roman numeral for clause `n`.
pub fn romano(n: u8) -> Option<&'static str> {
  ROMANOS.get(usize::from(n).checked_sub(1)?).copied()
}
