//! Row mappers between SQLite rows and `tutela-core` records.
//!
//! Mappers run on the connection's worker thread and only fail with
//! `rusqlite` errors. Values that need domain validation (the council-member
//! role) are read raw and checked afterwards.

use rusqlite::Row;
use tutela_core::record::{
  Atendimento, Cargo, Conselheiro, Denuncia, DireitoViolado, Marcador, Notificacao, TermoMedidas,
};

use crate::Result;

// ─── Conselheiro ─────────────────────────────────────────────────────────────

pub const CONSELHEIRO_COLUMNS: &str = "idConselheiro, nomeConselheiro, cargo, cpf, rg, \
   data_nascimento, endereco, contatoConselheiro, nacionalidade, iniMandato, fimMandato";

/// A `Conselheiro` row with `cargo` still as text.
pub struct RawConselheiro {
  pub conselheiro: Conselheiro,
  pub cargo:       Option<String>,
}

impl RawConselheiro {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      conselheiro: Conselheiro {
        id:              row.get("idConselheiro")?,
        nome:            row.get("nomeConselheiro")?,
        cargo:           None,
        cpf:             row.get("cpf")?,
        rg:              row.get("rg")?,
        data_nascimento: row.get("data_nascimento")?,
        endereco:        row.get("endereco")?,
        contato:         row.get("contatoConselheiro")?,
        nacionalidade:   row.get("nacionalidade")?,
        inicio_mandato:  row.get("iniMandato")?,
        fim_mandato:     row.get("fimMandato")?,
      },
      cargo:       row.get("cargo")?,
    })
  }

  pub fn into_conselheiro(self) -> Result<Conselheiro> {
    let cargo = self
      .cargo
      .filter(|c| !c.is_empty())
      .map(|c| decode_cargo(&c))
      .transpose()?;
    Ok(Conselheiro { cargo, ..self.conselheiro })
  }
}

pub fn decode_cargo(s: &str) -> Result<Cargo> {
  s.to_lowercase()
    .parse()
    .map_err(|_| tutela_core::Error::UnknownCargo(s.to_owned()).into())
}

pub fn encode_cargo(c: Option<Cargo>) -> Option<&'static str> {
  c.map(|c| match c {
    Cargo::Secretario => "secretario",
    Cargo::Conselheiro => "conselheiro",
  })
}

// ─── Documents ───────────────────────────────────────────────────────────────

pub fn denuncia_from_row(row: &Row<'_>) -> rusqlite::Result<Denuncia> {
  Ok(Denuncia {
    nr_denuncia:         row.get("nrDenuncia")?,
    descricao_fato:      row.get("DescricaoFato")?,
    data:                row.get("Data")?,
    tipo_denuncia:       row.get("TipoDenuncia")?,
    pessoal_enf_entrada: row.get("PessoalEnfEntrada")?,
    id_conselheiro:      row.get("idConselheiro")?,
    data_averiguacao:    row.get("Data_averiguacao")?,
    observacao:          row.get("Observacao")?,
  })
}

/// Expects the `direitoVioladoDescricao` column from the lookup join.
pub fn atendimento_from_row(row: &Row<'_>) -> rusqlite::Result<Atendimento> {
  Ok(Atendimento {
    id:                        row.get("idAtendimento")?,
    data:                      row.get("Data")?,
    hora:                      row.get("Hora")?,
    relato:                    row.get("Relato")?,
    id_direito_violado:        row.get("idDireitoViolado")?,
    direito_violado_descricao: row.get("direitoVioladoDescricao")?,
  })
}

pub fn notificacao_from_row(row: &Row<'_>) -> rusqlite::Result<Notificacao> {
  Ok(Notificacao {
    id:                 row.get("id")?,
    redator:            row.get("redator")?,
    segunda_via:        row.get("assinatura")?,
    id_conselheiro:     row.get("idConselheiro")?,
    id_secretario:      row.get("idSecretario")?,
    id_medida_id_maior: row.get("idMedida_idMaior")?,
    data:               row.get("dataNotificacao")?,
    hora:               row.get("horaNotificacao")?,
  })
}

pub fn termo_from_row(row: &Row<'_>) -> rusqlite::Result<TermoMedidas> {
  Ok(TermoMedidas {
    id:        row.get("idmedida_aplicada")?,
    data:      row.get("data")?,
    descricao: row.get("descricao")?,
    inciso:    row.get("inciso")?,
  })
}

// ─── Lookups and markers ─────────────────────────────────────────────────────

pub fn direito_from_row(row: &Row<'_>) -> rusqlite::Result<DireitoViolado> {
  Ok(DireitoViolado {
    id:        row.get("idDireitoViolado")?,
    descricao: row.get("Descricao")?,
  })
}

pub fn marcador_from_row(row: &Row<'_>) -> rusqlite::Result<Marcador> {
  Ok(Marcador {
    id:             row.get("idMarcador")?,
    latitude:       row.get("latitude")?,
    longitude:      row.get("longitude")?,
    tipo_documento: row.get("tipoDocumento")?,
    id_documento:   row.get("idDocumento")?,
    endereco:       row.get("endereco")?,
    descricao:      row.get("descricao")?,
  })
}

/// `LIMIT` value for an optional cap; SQLite treats `-1` as unbounded.
pub fn encode_limit(limit: Option<usize>) -> i64 {
  limit.and_then(|l| i64::try_from(l).ok()).unwrap_or(-1)
}
