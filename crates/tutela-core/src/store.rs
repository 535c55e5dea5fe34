//! The `CaseStore` trait.
//!
//! Implemented by storage backends (e.g. `tutela-store-sqlite`). The API and
//! server crates depend on this abstraction, not on a concrete backend.

use std::future::Future;

use serde::Serialize;

use crate::{
  input::{NovaDenuncia, NovaNotificacao, NovoAtendimento, NovoConselheiro, NovoMarcador, NovoTermo},
  medidas::TermoAlvo,
  record::{
    Atendimento, Conselheiro, Denuncia, DireitoViolado, Marcador, Notificacao, TermoMedidas,
  },
};

// ─── Error detail ────────────────────────────────────────────────────────────

/// Vendor detail attached to a failed database operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FailureDetail {
  /// Result-code name, e.g. `ConstraintViolation`.
  pub code:      Option<String>,
  /// Extended numeric result code.
  pub errno:     Option<i64>,
  /// SQLSTATE-style class.
  #[serde(rename = "sqlState")]
  pub sql_state: Option<String>,
}

/// Lets the HTTP layer report what went wrong below it without knowing the
/// backend.
pub trait ErrorDetail {
  fn detail(&self) -> FailureDetail;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a case-record store.
///
/// Document records are append-only: they are created once and never
/// updated or deleted. Council members are the only mutable entity.
///
/// Surrogate keys are assigned by the store as `MAX(key) + 1` per table.
/// List operations return rows newest first (descending key); `limit` of
/// `None` returns every row.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CaseStore: Send + Sync {
  type Error: std::error::Error + ErrorDetail + Send + Sync + 'static;

  /// Round-trip a trivial query.
  fn ping(&self) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Stop handing out connections and wait for in-flight work to finish.
  /// Every later call fails.
  fn close(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Council members ───────────────────────────────────────────────────

  fn list_conselheiros(
    &self,
  ) -> impl Future<Output = Result<Vec<Conselheiro>, Self::Error>> + Send + '_;

  fn get_conselheiro(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Conselheiro>, Self::Error>> + Send + '_;

  fn create_conselheiro(
    &self,
    input: NovoConselheiro,
  ) -> impl Future<Output = Result<Conselheiro, Self::Error>> + Send + '_;

  /// Fields absent from `input` keep their stored value. Returns `None` if
  /// no member has this id.
  fn update_conselheiro(
    &self,
    id: i64,
    input: NovoConselheiro,
  ) -> impl Future<Output = Result<Option<Conselheiro>, Self::Error>> + Send + '_;

  /// Returns `false` if no member has this id.
  fn delete_conselheiro(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Complaints ────────────────────────────────────────────────────────

  /// Persist a complaint. The receiving member is `input.id_conselheiro`
  /// when given, else the first member whose name contains
  /// `input.conselheiro_recebeu`.
  fn create_denuncia(
    &self,
    input: NovaDenuncia,
  ) -> impl Future<Output = Result<Denuncia, Self::Error>> + Send + '_;

  fn list_denuncias(
    &self,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<Denuncia>, Self::Error>> + Send + '_;

  // ── Assistance records ────────────────────────────────────────────────

  /// Persist an assistance record. The violated right is
  /// `input.id_direito_violado` when given, else the first lookup row whose
  /// description contains `input.direito_violado`; an unmatched description
  /// inserts a new lookup row.
  fn create_atendimento(
    &self,
    input: NovoAtendimento,
  ) -> impl Future<Output = Result<Atendimento, Self::Error>> + Send + '_;

  /// Rows carry the joined violated-right description.
  fn list_atendimentos(
    &self,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<Atendimento>, Self::Error>> + Send + '_;

  fn list_direitos_violados(
    &self,
  ) -> impl Future<Output = Result<Vec<DireitoViolado>, Self::Error>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  fn create_notificacao(
    &self,
    input: NovaNotificacao,
  ) -> impl Future<Output = Result<Notificacao, Self::Error>> + Send + '_;

  fn list_notificacoes(
    &self,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<Notificacao>, Self::Error>> + Send + '_;

  // ── Protective-measure terms ──────────────────────────────────────────

  /// Persist a term. Returns the stored row and the full clause selection,
  /// of which only the first survives in the row.
  fn create_termo(
    &self,
    alvo: TermoAlvo,
    input: NovoTermo,
  ) -> impl Future<Output = Result<(TermoMedidas, Vec<u8>), Self::Error>> + Send + '_;

  fn list_termos(
    &self,
    alvo: TermoAlvo,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<TermoMedidas>, Self::Error>> + Send + '_;

  // ── Map markers ───────────────────────────────────────────────────────

  fn list_marcadores(
    &self,
  ) -> impl Future<Output = Result<Vec<Marcador>, Self::Error>> + Send + '_;

  fn create_marcador(
    &self,
    input: NovoMarcador,
  ) -> impl Future<Output = Result<Marcador, Self::Error>> + Send + '_;
}
