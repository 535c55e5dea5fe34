//! Integration tests for `SqliteStore` against in-memory and temp-file
//! databases.

use std::collections::HashSet;

use tutela_core::{
  input::{NovaDenuncia, NovaNotificacao, NovoAtendimento, NovoConselheiro, NovoMarcador, NovoTermo},
  medidas::TermoAlvo,
  observacao::Observacao,
  record::Cargo,
  signature::Assinatura,
  store::{CaseStore, ErrorDetail},
};

use crate::{Error, IdAllocation, SqliteStore, StoreOptions, pool::Pool, schema::SCHEMA};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn conselheiro(nome: &str, cargo: Cargo) -> NovoConselheiro {
  NovoConselheiro {
    nome: Some(nome.into()),
    cargo: Some(cargo),
    celular_ddd: Some("55".into()),
    celular_numero: Some("99999-0000".into()),
    ..Default::default()
  }
}

// ─── Complaints ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn denuncia_create_then_list_matches_payload() {
  let s = store().await;
  let created = s
    .create_denuncia(NovaDenuncia {
      data_denuncia: Some("2024-01-10".into()),
      tipo_pessoa: Some("identificada".into()),
      fatos: Some("x".into()),
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(created.nr_denuncia, 1);
  assert_eq!(created.pessoal_enf_entrada, 1);
  assert_eq!(created.id_conselheiro, None);
  assert_eq!(created.data_averiguacao, None);

  let listed = s.list_denuncias(None).await.unwrap();
  assert_eq!(listed, vec![created.clone()]);

  let obs = Observacao::decode(created.observacao.as_deref().unwrap()).unwrap();
  assert_eq!(obs.identificacao, "N/A");
  assert!(obs.assinatura.is_none());
}

#[tokio::test]
async fn sequential_creates_get_increasing_keys() {
  let s = store().await;
  let a = s.create_denuncia(NovaDenuncia::default()).await.unwrap();
  let b = s.create_denuncia(NovaDenuncia::default()).await.unwrap();
  let c = s.create_denuncia(NovaDenuncia::default()).await.unwrap();
  assert!(a.nr_denuncia < b.nr_denuncia && b.nr_denuncia < c.nr_denuncia);

  let listed: Vec<_> = s
    .list_denuncias(None)
    .await
    .unwrap()
    .into_iter()
    .map(|d| d.nr_denuncia)
    .collect();
  assert_eq!(listed, vec![3, 2, 1]);
}

#[tokio::test]
async fn denuncia_resolves_member_by_typed_id_before_name() {
  let s = store().await;
  let maria = s.create_conselheiro(conselheiro("Maria Souza", Cargo::Conselheiro)).await.unwrap();
  let ana = s.create_conselheiro(conselheiro("Ana Maria", Cargo::Secretario)).await.unwrap();

  let by_name = s
    .create_denuncia(NovaDenuncia {
      conselheiro_recebeu: Some("maria".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(by_name.id_conselheiro, Some(maria.id));

  let typed = s
    .create_denuncia(NovaDenuncia {
      conselheiro_recebeu: Some("maria".into()),
      id_conselheiro: Some(ana.id),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(typed.id_conselheiro, Some(ana.id));

  let unknown = s
    .create_denuncia(NovaDenuncia {
      conselheiro_recebeu: Some("joão".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(unknown.id_conselheiro, None);
}

#[tokio::test]
async fn denuncia_keeps_signature_in_observation() {
  let s = store().await;
  let d = s
    .create_denuncia(NovaDenuncia {
      assinatura: Some(Assinatura::digital("Ana")),
      ..Default::default()
    })
    .await
    .unwrap();
  let obs = Observacao::decode(d.observacao.as_deref().unwrap()).unwrap();
  assert_eq!(obs.assinatura.unwrap().nome.as_deref(), Some("Ana"));
}

// ─── Assistance records ──────────────────────────────────────────────────────

#[tokio::test]
async fn atendimento_creates_missing_right_then_reuses_it() {
  let s = store().await;
  let first = s
    .create_atendimento(NovoAtendimento {
      data_atendimento: Some("2024-02-01".into()),
      hora_atendimento: Some("14:30".into()),
      direito_violado: Some("Direito à Educação".into()),
      relatos: Some("relato".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(first.id_direito_violado, Some(1));
  assert_eq!(first.direito_violado_descricao.as_deref(), Some("Direito à Educação"));

  let second = s
    .create_atendimento(NovoAtendimento {
      direito_violado: Some("educação".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(second.id_direito_violado, Some(1));
  assert_eq!(s.list_direitos_violados().await.unwrap().len(), 1);

  let listed = s.list_atendimentos(None).await.unwrap();
  assert_eq!(listed.len(), 2);
  assert_eq!(listed[0].id, second.id);
  assert_eq!(listed[1].hora.as_deref(), Some("14:30"));
}

#[tokio::test]
async fn atendimento_with_typed_right_creates_no_lookup_row() {
  let s = store().await;
  let a = s
    .create_atendimento(NovoAtendimento {
      id_direito_violado: Some(7),
      direito_violado: Some("Convivência familiar".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(a.id_direito_violado, Some(7));
  assert_eq!(a.direito_violado_descricao, None);
  assert!(s.list_direitos_violados().await.unwrap().is_empty());
}

// ─── Notifications ───────────────────────────────────────────────────────────

#[tokio::test]
async fn notificacao_references_are_always_null() {
  let s = store().await;
  let n = s
    .create_notificacao(NovaNotificacao {
      nome_quem_recebeu: Some("José".into()),
      segunda_via_convocacao: Some("Comparecer".into()),
      data_notificacao: Some("2024-03-01".into()),
      ..Default::default()
    })
    .await
    .unwrap();

  let listed = s.list_notificacoes(None).await.unwrap();
  assert_eq!(listed, vec![n.clone()]);
  assert_eq!(n.id_conselheiro, None);
  assert_eq!(n.id_secretario, None);
  assert_eq!(n.id_medida_id_maior, None);
  assert_eq!(n.data.as_deref(), Some("2024-03-01"));
  assert_eq!(n.hora, None);
}

// ─── Protective-measure terms ────────────────────────────────────────────────

// Clauses II and IV selected persist inciso 2 only. The full selection is
// returned to the caller but never stored.
#[tokio::test]
async fn termo_persists_first_selected_clause_only() {
  let s = store().await;
  let mut input = NovoTermo {
    data_termo: Some("2024-01-22".into()),
    aplicacao_medidas_texto: Some("Encaminhamento".into()),
    ..Default::default()
  };
  input.set_flag(2, true);
  input.set_flag(4, true);

  let (termo, selecionadas) = s.create_termo(TermoAlvo::Menor, input).await.unwrap();
  assert_eq!(selecionadas, vec![2, 4]);
  assert_eq!(termo.inciso, Some(2));

  let listed = s.list_termos(TermoAlvo::Menor, None).await.unwrap();
  assert_eq!(listed, vec![termo]);
  assert!(s.list_termos(TermoAlvo::Responsavel, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn termo_kinds_have_independent_keys() {
  let s = store().await;
  let (m, _) = s.create_termo(TermoAlvo::Menor, NovoTermo::default()).await.unwrap();
  let (r, sel) = s
    .create_termo(TermoAlvo::Responsavel, NovoTermo::default())
    .await
    .unwrap();
  assert_eq!((m.id, r.id), (1, 1));
  assert!(sel.is_empty());
  assert_eq!(r.inciso, None);
}

#[tokio::test]
async fn list_limit_caps_rows() {
  let s = store().await;
  for _ in 0..55 {
    s.create_termo(TermoAlvo::Responsavel, NovoTermo::default()).await.unwrap();
  }
  let capped = s.list_termos(TermoAlvo::Responsavel, Some(50)).await.unwrap();
  assert_eq!(capped.len(), 50);
  assert_eq!(capped[0].id, 55);
  assert_eq!(s.list_termos(TermoAlvo::Responsavel, None).await.unwrap().len(), 55);
}

// ─── Council members ─────────────────────────────────────────────────────────

#[tokio::test]
async fn conselheiro_crud() {
  let s = store().await;
  let c = s.create_conselheiro(conselheiro("Maria", Cargo::Conselheiro)).await.unwrap();
  assert_eq!(c.contato.as_deref(), Some("(55) 99999-0000"));
  assert_eq!(c.cargo, Some(Cargo::Conselheiro));

  let mut edit = conselheiro("Maria Lima", Cargo::Secretario);
  edit.nacionalidade = Some("Brasileira".into());
  let updated = s.update_conselheiro(c.id, edit).await.unwrap().unwrap();
  assert_eq!(updated.nome.as_deref(), Some("Maria Lima"));
  assert_eq!(updated.cargo, Some(Cargo::Secretario));

  assert!(s.update_conselheiro(99, NovoConselheiro::default()).await.unwrap().is_none());
  assert_eq!(s.get_conselheiro(c.id).await.unwrap(), Some(updated.clone()));

  // An empty edit changes nothing.
  let same = s.update_conselheiro(c.id, NovoConselheiro::default()).await.unwrap();
  assert_eq!(same, Some(updated));

  assert!(s.delete_conselheiro(c.id).await.unwrap());
  assert!(!s.delete_conselheiro(c.id).await.unwrap());
  assert!(s.get_conselheiro(c.id).await.unwrap().is_none());
}

#[tokio::test]
async fn conselheiros_list_newest_first() {
  let s = store().await;
  s.create_conselheiro(conselheiro("A", Cargo::Conselheiro)).await.unwrap();
  s.create_conselheiro(conselheiro("B", Cargo::Conselheiro)).await.unwrap();
  let names: Vec<_> = s
    .list_conselheiros()
    .await
    .unwrap()
    .into_iter()
    .filter_map(|c| c.nome)
    .collect();
  assert_eq!(names, vec!["B", "A"]);
}

// ─── Map markers ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn marcador_roundtrip() {
  let s = store().await;
  let m = s
    .create_marcador(NovoMarcador {
      latitude: Some(-28.2916),
      longitude: Some(-53.5014),
      tipo_documento: Some("denuncia".into()),
      id_documento: Some("1".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(m.id, 1);
  assert_eq!(s.list_marcadores().await.unwrap(), vec![m]);
}

#[tokio::test]
async fn marcador_without_coordinates_is_a_constraint_error() {
  let s = store().await;
  let err = s.create_marcador(NovoMarcador::default()).await.unwrap_err();
  assert!(err.is_constraint_violation());
  assert_eq!(err.detail().sql_state.as_deref(), Some("23000"));
}

// ─── Errors and lifecycle ────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_key_reports_sqlstate_and_code() {
  let pool = Pool::open_in_memory().await.unwrap();
  pool
    .call(|c| {
      c.execute_batch(SCHEMA)?;
      Ok(())
    })
    .await
    .unwrap();

  let insert = || {
    pool.call(|c| {
      c.execute("INSERT INTO Notificacao (id) VALUES (1)", [])?;
      Ok(())
    })
  };
  insert().await.unwrap();
  let err = insert().await.unwrap_err();

  let detail = err.detail();
  assert_eq!(detail.code.as_deref(), Some("ConstraintViolation"));
  assert_eq!(detail.sql_state.as_deref(), Some("23000"));
  assert!(detail.errno.is_some());
}

#[tokio::test]
async fn closed_store_fails_every_call() {
  let s = store().await;
  assert_eq!(s.ping().await.unwrap(), 1);
  s.close().await.unwrap();
  assert!(matches!(s.ping().await, Err(Error::PoolClosed)));
  assert!(matches!(s.list_denuncias(None).await, Err(Error::PoolClosed)));
}

// ─── Concurrent allocation ───────────────────────────────────────────────────

async fn file_store(dir: &tempfile::TempDir, id_allocation: IdAllocation) -> SqliteStore {
  SqliteStore::open(dir.path().join("conselho.sqlite3"), StoreOptions {
    pool_size: 8,
    id_allocation,
  })
  .await
  .expect("file store")
}

async fn create_concurrently(s: &SqliteStore, n: usize) -> Vec<crate::Result<i64>> {
  let tasks: Vec<_> = (0..n)
    .map(|_| {
      let s = s.clone();
      tokio::spawn(async move {
        s.create_denuncia(NovaDenuncia::default())
          .await
          .map(|d| d.nr_denuncia)
      })
    })
    .collect();
  let mut out = Vec::with_capacity(n);
  for t in tasks {
    out.push(t.await.unwrap());
  }
  out
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn transactional_allocation_never_collides() {
  let dir = tempfile::tempdir().unwrap();
  let s = file_store(&dir, IdAllocation::Transactional).await;

  let results = create_concurrently(&s, 24).await;
  let ids: HashSet<i64> = results.into_iter().map(|r| r.unwrap()).collect();
  assert_eq!(ids, (1..=24).collect::<HashSet<_>>());
}

// Autocommit allocation reads MAX and inserts in separate statements, so two
// creators can claim the same key. Whether that happens in a given run
// depends on scheduling; this documents the possible outcomes rather than
// asserting that the race occurs.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn autocommit_allocation_race_outcomes() {
  let dir = tempfile::tempdir().unwrap();
  let s = file_store(&dir, IdAllocation::Autocommit).await;

  let results = create_concurrently(&s, 24).await;
  let mut ids = HashSet::new();
  let mut collisions = 0;
  for r in results {
    match r {
      Ok(id) => assert!(ids.insert(id), "key {id} handed out twice"),
      Err(e) => {
        assert!(e.is_constraint_violation(), "unexpected failure: {e}");
        collisions += 1;
      }
    }
  }
  assert_eq!(ids.len() + collisions, 24);
  assert_eq!(s.list_denuncias(None).await.unwrap().len(), ids.len());
}

#[tokio::test]
async fn store_reports_its_options() {
  let dir = tempfile::tempdir().unwrap();
  let s = file_store(&dir, IdAllocation::Autocommit).await;
  assert_eq!(s.pool_size(), 8);
  assert_eq!(s.id_allocation(), IdAllocation::Autocommit);

  let mem = store().await;
  assert_eq!(mem.pool_size(), 1);
  assert_eq!(mem.id_allocation(), IdAllocation::Transactional);
}
