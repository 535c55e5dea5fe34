//! Surrogate-key allocation.
//!
//! Every table's key is `MAX(key) + 1`, with an empty table starting at 1.
//! Whether that read and the insert that uses it are isolated from other
//! writers depends on [`IdAllocation`].

use serde::{Deserialize, Serialize};

/// How a create claims its key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdAllocation {
  /// Lookups, allocation and insert share one `BEGIN IMMEDIATE`
  /// transaction; concurrent creators queue on the write lock.
  #[default]
  Transactional,
  /// Each statement commits on its own. Two creators may read the same
  /// maximum; the second insert then fails with a primary-key violation.
  Autocommit,
}

/// Tables with a store-assigned key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
  Conselheiro,
  DireitoViolado,
  Denuncia,
  Atendimento,
  Notificacao,
  MedidaMenor,
  MedidaResponsavel,
  Marcador,
}

impl Table {
  pub fn name(self) -> &'static str {
    match self {
      Table::Conselheiro => "Conselheiro",
      Table::DireitoViolado => "DireitoViolado",
      Table::Denuncia => "Denuncia",
      Table::Atendimento => "Atendimento",
      Table::Notificacao => "Notificacao",
      Table::MedidaMenor => "medida_aplicacao_menor",
      Table::MedidaResponsavel => "medida_aplicacao_responsavel",
      Table::Marcador => "marcador_mapa",
    }
  }

  pub fn key(self) -> &'static str {
    match self {
      Table::Conselheiro => "idConselheiro",
      Table::DireitoViolado => "idDireitoViolado",
      Table::Denuncia => "nrDenuncia",
      Table::Atendimento => "idAtendimento",
      Table::Notificacao => "id",
      Table::MedidaMenor | Table::MedidaResponsavel => "idmedida_aplicada",
      Table::Marcador => "idMarcador",
    }
  }
}

/// Read the next key for `table`.
pub fn next_id(conn: &rusqlite::Connection, table: Table) -> rusqlite::Result<i64> {
  let sql = format!(
    "SELECT COALESCE(MAX({key}), 0) + 1 FROM {name}",
    key = table.key(),
    name = table.name()
  );
  conn.query_row(&sql, [], |r| r.get(0))
}
