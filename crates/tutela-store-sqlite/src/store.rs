//! SQLite implementation of [`CaseStore`].

use std::{path::Path, sync::Arc};

use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tutela_core::{
  input::{NovaDenuncia, NovaNotificacao, NovoAtendimento, NovoConselheiro, NovoMarcador, NovoTermo},
  lookup::{self, Resolution},
  medidas::{self, TermoAlvo},
  observacao::Observacao,
  record::{
    Atendimento, Conselheiro, Denuncia, DireitoViolado, Marcador, Notificacao, TermoMedidas,
  },
  store::CaseStore,
};

use crate::{
  Error, Result,
  encode::{
    CONSELHEIRO_COLUMNS, RawConselheiro, atendimento_from_row, denuncia_from_row,
    direito_from_row, encode_cargo, encode_limit, marcador_from_row, notificacao_from_row,
    termo_from_row,
  },
  ident::{IdAllocation, Table, next_id},
  pool::Pool,
  schema::SCHEMA,
};

/// Pool size used when none is configured.
pub const DEFAULT_POOL_SIZE: usize = 10;

/// Tuning for [`SqliteStore::open`].
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
  pub pool_size:     usize,
  pub id_allocation: IdAllocation,
}

impl Default for StoreOptions {
  fn default() -> Self {
    Self {
      pool_size:     DEFAULT_POOL_SIZE,
      id_allocation: IdAllocation::default(),
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A case-record store backed by a pooled SQLite database.
///
/// Cloning is cheap; the pool is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pool:          Arc<Pool>,
  id_allocation: IdAllocation,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
    let pool = Pool::open(path, options.pool_size).await?;
    let store = Self {
      pool:          Arc::new(pool),
      id_allocation: options.id_allocation,
    };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let store = Self {
      pool:          Arc::new(Pool::open_in_memory().await?),
      id_allocation: IdAllocation::Transactional,
    };
    store.init_schema().await?;
    Ok(store)
  }

  pub fn id_allocation(&self) -> IdAllocation {
    self.id_allocation
  }

  pub fn pool_size(&self) -> usize {
    self.pool.size()
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .pool
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
  }

  /// Run one create. In [`IdAllocation::Transactional`] mode `f` runs inside
  /// a `BEGIN IMMEDIATE` transaction so its key read and insert cannot
  /// interleave with another writer's.
  async fn write<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
    T: Send + 'static,
  {
    let mode = self.id_allocation;
    self
      .pool
      .call(move |conn| match mode {
        IdAllocation::Transactional => {
          let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
          let out = f(&tx)?;
          tx.commit()?;
          Ok(out)
        }
        IdAllocation::Autocommit => Ok(f(conn)?),
      })
      .await
  }

  async fn list<T, F>(&self, sql: &'static str, limit: Option<usize>, map: F) -> Result<Vec<T>>
  where
    F: Fn(&rusqlite::Row<'_>) -> rusqlite::Result<T> + Send + 'static,
    T: Send + 'static,
  {
    let limit = encode_limit(limit);
    self
      .pool
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |r| map(r))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }
}

// ─── Lookup resolution ───────────────────────────────────────────────────────

fn resolve_conselheiro(
  conn: &rusqlite::Connection,
  typed: Option<i64>,
  nome: Option<&str>,
) -> rusqlite::Result<Resolution> {
  if let Some(id) = typed {
    return Ok(Resolution::Typed(id));
  }
  let Some(nome) = nome else {
    return Ok(Resolution::Absent);
  };
  let mut stmt =
    conn.prepare("SELECT idConselheiro, nomeConselheiro FROM Conselheiro ORDER BY idConselheiro")?;
  let rows = stmt
    .query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, Option<String>>(1)?)))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(
    lookup::first_match(rows.iter().map(|(id, n)| (*id, n.as_deref())), nome)
      .map_or(Resolution::Absent, Resolution::Matched),
  )
}

fn resolve_direito(
  conn: &rusqlite::Connection,
  typed: Option<i64>,
  descricao: Option<&str>,
) -> rusqlite::Result<Resolution> {
  if let Some(id) = typed {
    return Ok(Resolution::Typed(id));
  }
  let Some(descricao) = descricao else {
    return Ok(Resolution::Absent);
  };
  let mut stmt = conn
    .prepare("SELECT idDireitoViolado, Descricao FROM DireitoViolado ORDER BY idDireitoViolado")?;
  let rows = stmt
    .query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, Option<String>>(1)?)))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  if let Some(id) = lookup::first_match(rows.iter().map(|(id, d)| (*id, d.as_deref())), descricao)
  {
    return Ok(Resolution::Matched(id));
  }
  if descricao.trim().is_empty() {
    return Ok(Resolution::Absent);
  }
  let id = next_id(conn, Table::DireitoViolado)?;
  conn.execute(
    "INSERT INTO DireitoViolado (idDireitoViolado, Descricao) VALUES (?1, ?2)",
    rusqlite::params![id, descricao],
  )?;
  Ok(Resolution::Created(id))
}

fn select_conselheiro(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<RawConselheiro> {
  conn.query_row(
    &format!("SELECT {CONSELHEIRO_COLUMNS} FROM Conselheiro WHERE idConselheiro = ?1"),
    rusqlite::params![id],
    RawConselheiro::from_row,
  )
}

fn get_atendimento(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<Atendimento> {
  conn.query_row(
    "SELECT a.*, d.Descricao AS direitoVioladoDescricao
       FROM Atendimento a
       LEFT JOIN DireitoViolado d ON a.idDireitoViolado = d.idDireitoViolado
      WHERE a.idAtendimento = ?1",
    rusqlite::params![id],
    atendimento_from_row,
  )
}

fn termo_table(alvo: TermoAlvo) -> Table {
  match alvo {
    TermoAlvo::Menor => Table::MedidaMenor,
    TermoAlvo::Responsavel => Table::MedidaResponsavel,
  }
}

// ─── CaseStore impl ──────────────────────────────────────────────────────────

impl CaseStore for SqliteStore {
  type Error = Error;

  async fn ping(&self) -> Result<i64> {
    self
      .pool
      .call(|conn| Ok(conn.query_row("SELECT 1 AS test", [], |r| r.get(0))?))
      .await
  }

  async fn close(&self) -> Result<()> {
    self.pool.close().await
  }

  // ── Council members ───────────────────────────────────────────────────────

  async fn list_conselheiros(&self) -> Result<Vec<Conselheiro>> {
    let raws = self
      .pool
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CONSELHEIRO_COLUMNS} FROM Conselheiro ORDER BY idConselheiro DESC"
        ))?;
        let rows = stmt
          .query_map([], RawConselheiro::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawConselheiro::into_conselheiro).collect()
  }

  async fn get_conselheiro(&self, id: i64) -> Result<Option<Conselheiro>> {
    let raw = self
      .pool
      .call(move |conn| Ok(select_conselheiro(conn, id).optional()?))
      .await?;
    raw.map(RawConselheiro::into_conselheiro).transpose()
  }

  async fn create_conselheiro(&self, input: NovoConselheiro) -> Result<Conselheiro> {
    let contato = input.contato();
    let cargo = encode_cargo(input.cargo);
    let raw = self
      .write(move |conn| {
        let id = next_id(conn, Table::Conselheiro)?;
        conn.execute(
          "INSERT INTO Conselheiro (
             idConselheiro, nomeConselheiro, cargo, cpf, rg,
             data_nascimento, endereco, contatoConselheiro, nacionalidade
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id,
            input.nome,
            cargo,
            input.cpf,
            input.rg,
            input.data_nascimento,
            input.endereco,
            contato,
            input.nacionalidade,
          ],
        )?;
        select_conselheiro(conn, id)
      })
      .await?;

    let conselheiro = raw.into_conselheiro()?;
    tracing::info!(id = conselheiro.id, "council member created");
    Ok(conselheiro)
  }

  async fn update_conselheiro(
    &self,
    id: i64,
    input: NovoConselheiro,
  ) -> Result<Option<Conselheiro>> {
    let contato = input.contato();
    let cargo = encode_cargo(input.cargo);
    let raw = self
      .pool
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE Conselheiro SET
             nomeConselheiro    = COALESCE(?2, nomeConselheiro),
             cargo              = COALESCE(?3, cargo),
             cpf                = COALESCE(?4, cpf),
             rg                 = COALESCE(?5, rg),
             data_nascimento    = COALESCE(?6, data_nascimento),
             endereco           = COALESCE(?7, endereco),
             contatoConselheiro = COALESCE(?8, contatoConselheiro),
             nacionalidade      = COALESCE(?9, nacionalidade)
           WHERE idConselheiro = ?1",
          rusqlite::params![
            id,
            input.nome,
            cargo,
            input.cpf,
            input.rg,
            input.data_nascimento,
            input.endereco,
            contato,
            input.nacionalidade,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(Some(select_conselheiro(conn, id)?))
      })
      .await?;

    let Some(raw) = raw else { return Ok(None) };
    tracing::info!(id, "council member updated");
    raw.into_conselheiro().map(Some)
  }

  async fn delete_conselheiro(&self, id: i64) -> Result<bool> {
    let removed = self
      .pool
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM Conselheiro WHERE idConselheiro = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;
    if removed > 0 {
      tracing::info!(id, "council member deleted");
    }
    Ok(removed > 0)
  }

  // ── Complaints ────────────────────────────────────────────────────────────

  async fn create_denuncia(&self, input: NovaDenuncia) -> Result<Denuncia> {
    let observacao = Observacao::from_denuncia(&input).encode()?;
    let pessoal = input.pessoal_enf_entrada();

    let denuncia = self
      .write(move |conn| {
        let conselheiro = resolve_conselheiro(
          conn,
          input.id_conselheiro,
          input.conselheiro_recebeu.as_deref(),
        )?;
        let nr = next_id(conn, Table::Denuncia)?;
        let denuncia = Denuncia {
          nr_denuncia:         nr,
          descricao_fato:      input.fatos,
          data:                input.data_denuncia,
          tipo_denuncia:       input.tipo_pessoa,
          pessoal_enf_entrada: pessoal,
          id_conselheiro:      conselheiro.id(),
          data_averiguacao:    input.data_averiguacao,
          observacao:          Some(observacao),
        };
        conn.execute(
          "INSERT INTO Denuncia (
             nrDenuncia, DescricaoFato, Data, TipoDenuncia, PessoalEnfEntrada,
             idConselheiro, Data_averiguacao, Observacao
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            denuncia.nr_denuncia,
            denuncia.descricao_fato,
            denuncia.data,
            denuncia.tipo_denuncia,
            denuncia.pessoal_enf_entrada,
            denuncia.id_conselheiro,
            denuncia.data_averiguacao,
            denuncia.observacao,
          ],
        )?;
        Ok(denuncia)
      })
      .await?;

    tracing::info!(nr = denuncia.nr_denuncia, "complaint created");
    Ok(denuncia)
  }

  async fn list_denuncias(&self, limit: Option<usize>) -> Result<Vec<Denuncia>> {
    self
      .list(
        "SELECT * FROM Denuncia ORDER BY nrDenuncia DESC LIMIT ?1",
        limit,
        denuncia_from_row,
      )
      .await
  }

  // ── Assistance records ────────────────────────────────────────────────────

  async fn create_atendimento(&self, input: NovoAtendimento) -> Result<Atendimento> {
    let (atendimento, direito) = self
      .write(move |conn| {
        let direito = resolve_direito(
          conn,
          input.id_direito_violado,
          input.direito_violado.as_deref(),
        )?;
        let id = next_id(conn, Table::Atendimento)?;
        conn.execute(
          "INSERT INTO Atendimento (idAtendimento, Data, Hora, Relato, idDireitoViolado)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            id,
            input.data_atendimento,
            input.hora_atendimento,
            input.relatos,
            direito.id(),
          ],
        )?;
        Ok((get_atendimento(conn, id)?, direito))
      })
      .await?;

    if let Resolution::Created(id) = direito {
      tracing::info!(id, "violated-right lookup row created");
    }
    tracing::info!(id = atendimento.id, "assistance record created");
    Ok(atendimento)
  }

  async fn list_atendimentos(&self, limit: Option<usize>) -> Result<Vec<Atendimento>> {
    self
      .list(
        "SELECT a.*, d.Descricao AS direitoVioladoDescricao
           FROM Atendimento a
           LEFT JOIN DireitoViolado d ON a.idDireitoViolado = d.idDireitoViolado
          ORDER BY a.idAtendimento DESC
          LIMIT ?1",
        limit,
        atendimento_from_row,
      )
      .await
  }

  async fn list_direitos_violados(&self) -> Result<Vec<DireitoViolado>> {
    self
      .list(
        "SELECT * FROM DireitoViolado ORDER BY idDireitoViolado LIMIT ?1",
        None,
        direito_from_row,
      )
      .await
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  async fn create_notificacao(&self, input: NovaNotificacao) -> Result<Notificacao> {
    let notificacao = self
      .write(move |conn| {
        let id = next_id(conn, Table::Notificacao)?;
        let notificacao = Notificacao {
          id,
          redator: input.nome_quem_recebeu,
          segunda_via: input.segunda_via_convocacao,
          id_conselheiro: None,
          id_secretario: None,
          id_medida_id_maior: None,
          data: input.data_notificacao,
          hora: input.hora_notificacao,
        };
        conn.execute(
          "INSERT INTO Notificacao (
             id, redator, assinatura, idConselheiro, idSecretario, idMedida_idMaior,
             dataNotificacao, horaNotificacao
           ) VALUES (?1, ?2, ?3, NULL, NULL, NULL, ?4, ?5)",
          rusqlite::params![
            notificacao.id,
            notificacao.redator,
            notificacao.segunda_via,
            notificacao.data,
            notificacao.hora,
          ],
        )?;
        Ok(notificacao)
      })
      .await?;

    tracing::info!(id = notificacao.id, "notification created");
    Ok(notificacao)
  }

  async fn list_notificacoes(&self, limit: Option<usize>) -> Result<Vec<Notificacao>> {
    self
      .list(
        "SELECT * FROM Notificacao ORDER BY id DESC LIMIT ?1",
        limit,
        notificacao_from_row,
      )
      .await
  }

  // ── Protective-measure terms ──────────────────────────────────────────────

  async fn create_termo(
    &self,
    alvo: TermoAlvo,
    input: NovoTermo,
  ) -> Result<(TermoMedidas, Vec<u8>)> {
    let selecionadas = medidas::selecionadas(alvo, &input.flags());
    let inciso = medidas::inciso(&selecionadas);
    let table = termo_table(alvo);

    let termo = self
      .write(move |conn| {
        let id = next_id(conn, table)?;
        let termo = TermoMedidas {
          id,
          data: input.data_termo,
          descricao: input.aplicacao_medidas_texto,
          inciso,
        };
        conn.execute(
          &format!(
            "INSERT INTO {} (idmedida_aplicada, data, descricao, inciso) VALUES (?1, ?2, ?3, ?4)",
            table.name()
          ),
          rusqlite::params![termo.id, termo.data, termo.descricao, termo.inciso],
        )?;
        Ok(termo)
      })
      .await?;

    tracing::info!(
      id = termo.id,
      alvo = ?alvo,
      selecionadas = ?selecionadas,
      "protective-measure term created"
    );
    Ok((termo, selecionadas))
  }

  async fn list_termos(
    &self,
    alvo: TermoAlvo,
    limit: Option<usize>,
  ) -> Result<Vec<TermoMedidas>> {
    let sql = match alvo {
      TermoAlvo::Menor => {
        "SELECT * FROM medida_aplicacao_menor ORDER BY idmedida_aplicada DESC LIMIT ?1"
      }
      TermoAlvo::Responsavel => {
        "SELECT * FROM medida_aplicacao_responsavel ORDER BY idmedida_aplicada DESC LIMIT ?1"
      }
    };
    self.list(sql, limit, termo_from_row).await
  }

  // ── Map markers ───────────────────────────────────────────────────────────

  async fn list_marcadores(&self) -> Result<Vec<Marcador>> {
    self
      .list(
        "SELECT * FROM marcador_mapa ORDER BY idMarcador DESC LIMIT ?1",
        None,
        marcador_from_row,
      )
      .await
  }

  async fn create_marcador(&self, input: NovoMarcador) -> Result<Marcador> {
    let marcador = self
      .write(move |conn| {
        let id = next_id(conn, Table::Marcador)?;
        conn.execute(
          "INSERT INTO marcador_mapa (
             idMarcador, latitude, longitude, tipoDocumento, idDocumento, endereco, descricao
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id,
            input.latitude,
            input.longitude,
            input.tipo_documento,
            input.id_documento,
            input.endereco,
            input.descricao,
          ],
        )?;
        conn.query_row(
          "SELECT * FROM marcador_mapa WHERE idMarcador = ?1",
          rusqlite::params![id],
          marcador_from_row,
        )
      })
      .await?;

    tracing::info!(id = marcador.id, "map marker created");
    Ok(marcador)
  }
}
