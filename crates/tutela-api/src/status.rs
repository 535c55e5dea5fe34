//! Service banner and database health check.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tutela_core::store::{CaseStore, ErrorDetail};

use crate::ApiState;

/// `GET /`
pub async fn root() -> Json<Value> {
  Json(json!({
    "message": "API do Conselho Tutelar está rodando!",
    "endpoints": {
      "login": "POST /login, POST /logout, GET /me",
      "conselheiros": "GET /conselheiros, POST /conselheiros, GET|PUT|DELETE /conselheiros/{id}",
      "denuncias": "GET /denuncias, POST /denuncias",
      "atendimentos": "GET /atendimentos, POST /atendimentos",
      "direitosViolados": "GET /direitos-violados",
      "notificacoes": "GET /notificacoes, POST /notificacoes",
      "termosMedidasMenor": "GET /termos-medidas-menor, POST /termos-medidas-menor",
      "termosMedidasResponsavel": "GET /termos-medidas-responsavel, POST /termos-medidas-responsavel",
      "documentos": "GET /documentos",
      "marcadoresMapa": "GET /marcadores-mapa, POST /marcadores-mapa",
      "testDb": "GET /test-db (testa conexão com banco)"
    }
  }))
}

/// `GET /test-db`
pub async fn test_db<S: CaseStore>(State(state): State<ApiState<S>>) -> Response {
  let info = &state.db_info;
  match state.store.ping().await {
    Ok(test) => Json(json!({
      "success": true,
      "message": "Conexão com banco de dados OK",
      "test": [{ "test": test }],
      "config": {
        "host": info.host,
        "database": info.database,
        "user": info.user,
      }
    }))
    .into_response(),
    Err(e) => {
      let detail = e.detail();
      tracing::error!(error = %e, "database health check failed");
      (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
          "success": false,
          "error": "Erro ao conectar com banco de dados",
          "details": e.to_string(),
          "code": detail.code,
        })),
      )
        .into_response()
    }
  }
}
