//! The combined document view.
//!
//! `GET /documentos` returns one capped array per kind, each row tagged with
//! its kind. Clients merge those arrays into a single [`Document`] sequence,
//! newest first, and filter it by kind and free text.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::{
  medidas::TermoAlvo,
  record::{Atendimento, Denuncia, Notificacao, TermoMedidas},
};

/// Rows per kind returned by the aggregated view.
pub const DOCUMENT_LIMIT: usize = 50;

// ─── Kind ────────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DocumentKind {
  Denuncia,
  Atendimento,
  Notificacao,
  TermoMedidasMenor,
  TermoMedidasResponsavel,
}

impl DocumentKind {
  pub fn all() -> impl Iterator<Item = DocumentKind> {
    DocumentKind::iter()
  }

  /// Human-readable label.
  pub fn label(self) -> &'static str {
    match self {
      DocumentKind::Denuncia => "Denúncia",
      DocumentKind::Atendimento => "Atendimento",
      DocumentKind::Notificacao => "Notificação",
      DocumentKind::TermoMedidasMenor => "Termo Medidas (Menor)",
      DocumentKind::TermoMedidasResponsavel => "Termo Medidas (Responsável)",
    }
  }

  /// REST collection path.
  pub fn path(self) -> &'static str {
    match self {
      DocumentKind::Denuncia => "/denuncias",
      DocumentKind::Atendimento => "/atendimentos",
      DocumentKind::Notificacao => "/notificacoes",
      DocumentKind::TermoMedidasMenor => "/termos-medidas-menor",
      DocumentKind::TermoMedidasResponsavel => "/termos-medidas-responsavel",
    }
  }

  /// Parse a `tipo` tag as sent on the wire.
  pub fn from_tipo(tipo: &str) -> crate::Result<Self> {
    tipo
      .parse()
      .map_err(|_| crate::Error::UnknownDocumentKind(tipo.to_owned()))
  }

  pub fn termo_alvo(self) -> Option<TermoAlvo> {
    match self {
      DocumentKind::TermoMedidasMenor => Some(TermoAlvo::Menor),
      DocumentKind::TermoMedidasResponsavel => Some(TermoAlvo::Responsavel),
      _ => None,
    }
  }
}

// ─── Aggregated payload ──────────────────────────────────────────────────────

/// A row tagged with its kind, serialized flat: `{...row, "tipo": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tagged<T> {
  #[serde(flatten)]
  pub record: T,
  pub tipo:   DocumentKind,
}

impl<T> Tagged<T> {
  pub fn new(record: T, tipo: DocumentKind) -> Self {
    Self { record, tipo }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSet {
  pub denuncias:                  Vec<Tagged<Denuncia>>,
  pub atendimentos:               Vec<Tagged<Atendimento>>,
  pub notificacoes:               Vec<Tagged<Notificacao>>,
  pub termos_medidas_menor:       Vec<Tagged<TermoMedidas>>,
  pub termos_medidas_responsavel: Vec<Tagged<TermoMedidas>>,
}

impl DocumentSet {
  pub fn new(
    denuncias: Vec<Denuncia>,
    atendimentos: Vec<Atendimento>,
    notificacoes: Vec<Notificacao>,
    termos_menor: Vec<TermoMedidas>,
    termos_responsavel: Vec<TermoMedidas>,
  ) -> Self {
    fn tag<T>(rows: Vec<T>, kind: DocumentKind) -> Vec<Tagged<T>> {
      rows.into_iter().map(|r| Tagged::new(r, kind)).collect()
    }
    Self {
      denuncias:                  tag(denuncias, DocumentKind::Denuncia),
      atendimentos:               tag(atendimentos, DocumentKind::Atendimento),
      notificacoes:               tag(notificacoes, DocumentKind::Notificacao),
      termos_medidas_menor:       tag(termos_menor, DocumentKind::TermoMedidasMenor),
      termos_medidas_responsavel: tag(
        termos_responsavel,
        DocumentKind::TermoMedidasResponsavel,
      ),
    }
  }

  pub fn len(&self) -> usize {
    self.denuncias.len()
      + self.atendimentos.len()
      + self.notificacoes.len()
      + self.termos_medidas_menor.len()
      + self.termos_medidas_responsavel.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Merge every kind into one sequence, newest first. Rows without a
  /// parseable date sort last; ties keep their per-kind order.
  pub fn into_documents(self) -> Vec<Document> {
    let mut docs: Vec<Document> = self
      .denuncias
      .into_iter()
      .map(|t| Document::Denuncia(t.record))
      .chain(self.atendimentos.into_iter().map(|t| Document::Atendimento(t.record)))
      .chain(self.notificacoes.into_iter().map(|t| Document::Notificacao(t.record)))
      .chain(
        self
          .termos_medidas_menor
          .into_iter()
          .map(|t| Document::Termo(TermoAlvo::Menor, t.record)),
      )
      .chain(
        self
          .termos_medidas_responsavel
          .into_iter()
          .map(|t| Document::Termo(TermoAlvo::Responsavel, t.record)),
      )
      .collect();

    docs.sort_by(|a, b| newest_first(a.date(), b.date()));
    docs
  }
}

fn newest_first(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
  match (a, b) {
    (Some(a), Some(b)) => b.cmp(&a),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
}

// ─── Unified document ────────────────────────────────────────────────────────

/// One row of the merged document list.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
  Denuncia(Denuncia),
  Atendimento(Atendimento),
  Notificacao(Notificacao),
  Termo(TermoAlvo, TermoMedidas),
}

impl Document {
  pub fn kind(&self) -> DocumentKind {
    match self {
      Document::Denuncia(_) => DocumentKind::Denuncia,
      Document::Atendimento(_) => DocumentKind::Atendimento,
      Document::Notificacao(_) => DocumentKind::Notificacao,
      Document::Termo(TermoAlvo::Menor, _) => DocumentKind::TermoMedidasMenor,
      Document::Termo(TermoAlvo::Responsavel, _) => DocumentKind::TermoMedidasResponsavel,
    }
  }

  pub fn id(&self) -> i64 {
    match self {
      Document::Denuncia(d) => d.nr_denuncia,
      Document::Atendimento(a) => a.id,
      Document::Notificacao(n) => n.id,
      Document::Termo(_, t) => t.id,
    }
  }

  fn raw_date(&self) -> Option<&str> {
    match self {
      Document::Denuncia(d) => d.data.as_deref(),
      Document::Atendimento(a) => a.data.as_deref(),
      Document::Notificacao(n) => n.data.as_deref(),
      Document::Termo(_, t) => t.data.as_deref(),
    }
  }

  pub fn date(&self) -> Option<NaiveDate> {
    self.raw_date().and_then(parse_date)
  }

  /// `YYYY-MM-DD`, the form search matches against. Unparseable dates are
  /// shown verbatim.
  pub fn display_date(&self) -> Option<String> {
    match self.date() {
      Some(d) => Some(d.format("%Y-%m-%d").to_string()),
      None => self.raw_date().map(str::to_owned),
    }
  }

  /// `DD/MM/YYYY`, or `N/A`.
  pub fn date_br(&self) -> String {
    self
      .date()
      .map(|d| d.format("%d/%m/%Y").to_string())
      .unwrap_or_else(|| "N/A".to_owned())
  }

  pub fn description(&self) -> Option<&str> {
    match self {
      Document::Denuncia(d) => d.descricao_fato.as_deref(),
      Document::Atendimento(a) => a.relato.as_deref(),
      Document::Notificacao(n) => n.redator.as_deref(),
      Document::Termo(_, t) => t.descricao.as_deref(),
    }
  }

  /// Case-insensitive substring match over id, description and display
  /// date. An empty needle matches everything.
  pub fn matches(&self, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
      return true;
    }
    self.id().to_string().contains(&needle)
      || self.description().is_some_and(|d| d.to_lowercase().contains(&needle))
      || self.display_date().is_some_and(|d| d.to_lowercase().contains(&needle))
  }
}

/// Accepts `YYYY-MM-DD` optionally followed by a time part
/// (`2024-01-10T03:00:00.000Z`, `2024-01-10 00:00:00`).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
  let head = raw.trim().get(..10)?;
  NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Apply the list view's kind filter and free-text search.
pub fn filter<'a>(
  docs: &'a [Document],
  kind: Option<DocumentKind>,
  needle: &str,
) -> Vec<&'a Document> {
  docs
    .iter()
    .filter(|d| kind.is_none_or(|k| d.kind() == k))
    .filter(|d| d.matches(needle))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn denuncia(n: i64, data: Option<&str>, fato: &str) -> Denuncia {
    Denuncia {
      nr_denuncia:         n,
      descricao_fato:      Some(fato.into()),
      data:                data.map(Into::into),
      tipo_denuncia:       None,
      pessoal_enf_entrada: 0,
      id_conselheiro:      None,
      data_averiguacao:    None,
      observacao:          None,
    }
  }

  fn termo(id: i64, data: &str) -> TermoMedidas {
    TermoMedidas {
      id,
      data: Some(data.into()),
      descricao: Some("medida".into()),
      inciso: Some(1),
    }
  }

  fn sample() -> Vec<Document> {
    DocumentSet::new(
      vec![
        denuncia(1, Some("2024-01-10"), "Negligência"),
        denuncia(2, None, "Sem data"),
      ],
      vec![Atendimento {
        id:                        1,
        data:                      Some("2024-03-05T00:00:00.000Z".into()),
        hora:                      None,
        relato:                    Some("Visita domiciliar".into()),
        id_direito_violado:        None,
        direito_violado_descricao: None,
      }],
      vec![],
      vec![termo(1, "2024-01-22")],
      vec![termo(1, "2023-12-01")],
    )
    .into_documents()
  }

  #[test]
  fn kinds_serialize_kebab_case() {
    assert_eq!(DocumentKind::TermoMedidasMenor.as_ref(), "termo-medidas-menor");
    assert_eq!(
      serde_json::to_value(DocumentKind::TermoMedidasResponsavel).unwrap(),
      "termo-medidas-responsavel"
    );
    assert_eq!(DocumentKind::all().count(), 5);
    assert_eq!(
      DocumentKind::from_tipo("notificacao").unwrap(),
      DocumentKind::Notificacao
    );
    assert!(matches!(
      DocumentKind::from_tipo("oficio"),
      Err(crate::Error::UnknownDocumentKind(_))
    ));
  }

  #[test]
  fn tagged_rows_are_flat() {
    let t = Tagged::new(termo(4, "2024-01-01"), DocumentKind::TermoMedidasMenor);
    let v = serde_json::to_value(&t).unwrap();
    assert_eq!(v["idmedida_aplicada"], 4);
    assert_eq!(v["tipo"], "termo-medidas-menor");
  }

  #[test]
  fn merged_list_is_newest_first_with_undated_last() {
    let docs = sample();
    let order: Vec<_> = docs.iter().map(|d| (d.kind(), d.id())).collect();
    assert_eq!(order, vec![
      (DocumentKind::Atendimento, 1),
      (DocumentKind::TermoMedidasMenor, 1),
      (DocumentKind::Denuncia, 1),
      (DocumentKind::TermoMedidasResponsavel, 1),
      (DocumentKind::Denuncia, 2),
    ]);
  }

  #[test]
  fn date_search_ignores_kind_of_row() {
    let docs = sample();
    let hits = filter(&docs, None, "2024-01");
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|d| d.display_date().unwrap().contains("2024-01")));
  }

  #[test]
  fn kind_filter_intersects_search() {
    let docs = sample();
    let hits = filter(&docs, Some(DocumentKind::Denuncia), "2024-01");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id(), 1);

    assert_eq!(filter(&docs, Some(DocumentKind::Denuncia), "").len(), 2);
    assert_eq!(filter(&docs, None, "visita").len(), 1);
  }

  #[test]
  fn iso_timestamps_display_as_dates() {
    let docs = sample();
    assert_eq!(docs[0].display_date().as_deref(), Some("2024-03-05"));
    assert_eq!(docs[0].date_br(), "05/03/2024");
  }
}
