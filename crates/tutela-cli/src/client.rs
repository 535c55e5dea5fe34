//! Async HTTP client wrapping the Tutela JSON API.

use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, RequestBuilder, StatusCode, header::CONTENT_TYPE};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tutela_core::{
  document::{DocumentKind, DocumentSet},
  record::{Conselheiro, DireitoViolado, Marcador},
};

// ─── Errors ───────────────────────────────────────────────────────────────────

/// Every failure is phrased as guidance for the person at the terminal.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
  #[error(
    "Não foi possível conectar ao servidor em {url}. Verifique se o backend está rodando."
  )]
  Connection {
    url:    String,
    #[source]
    source: reqwest::Error,
  },

  #[error("Endpoint não encontrado. Verifique se a rota {path} existe no backend.")]
  NotFound { path: String },

  #[error("Servidor retornou uma resposta que não é JSON (Status: {status}).")]
  NotJson { status: u16 },

  /// The server's own `error` (or `details`) message.
  #[error("{message}")]
  Server { status: u16, message: String },

  #[error("Resposta inesperada do servidor: {0}")]
  Decode(#[from] serde_json::Error),
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Turn a raw response into its JSON body or a [`ClientError`].
pub(crate) fn classify(
  status: StatusCode,
  content_type: &str,
  body: &[u8],
  path: &str,
) -> Result<Value> {
  if !content_type.contains("application/json") {
    if status == StatusCode::NOT_FOUND {
      return Err(ClientError::NotFound { path: path.to_owned() });
    }
    return Err(ClientError::NotJson { status: status.as_u16() });
  }

  let value: Value = serde_json::from_slice(body)?;
  if status.is_success() {
    return Ok(value);
  }

  let text = |k: &str| value.get(k).and_then(Value::as_str).filter(|s| !s.is_empty());
  let message = text("error")
    .or_else(|| text("details"))
    .map(str::to_owned)
    .unwrap_or_else(|| format!("Erro {}", status.as_u16()));
  Err(ClientError::Server { status: status.as_u16(), message })
}

// ─── Response shapes ──────────────────────────────────────────────────────────

/// Profile of the logged-in user, as returned by `/login` and `/me`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Perfil {
  pub username:  String,
  pub role:      String,
  pub nome:      Option<String>,
  pub cargo:     Option<String>,
  pub email:     Option<String>,
  pub telefone:  Option<String>,
  pub matricula: Option<String>,
  /// Duty roster, free text.
  pub plantao:   Option<String>,
}

impl Perfil {
  pub fn display_name(&self) -> &str {
    self.nome.as_deref().unwrap_or(&self.username)
  }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
  token:   String,
  usuario: Perfil,
}

#[derive(Serialize)]
struct Credenciais<'a> {
  username: &'a str,
  password: &'a str,
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// HTTP client holding the session token once logged in.
pub struct ApiClient {
  client:   Client,
  base_url: String,
  token:    Option<String>,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url: base_url.into(), token: None })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  pub fn is_logged_in(&self) -> bool {
    self.token.is_some()
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match &self.token {
      Some(t) => req.bearer_auth(t),
      None => req,
    }
  }

  async fn send(&self, req: RequestBuilder, path: &str) -> Result<Value> {
    let connection = |source| ClientError::Connection { url: self.base_url.clone(), source };

    let resp = self.auth(req).send().await.map_err(connection)?;
    let status = resp.status();
    let content_type = resp
      .headers()
      .get(CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .unwrap_or_default()
      .to_owned();
    let body = resp.bytes().await.map_err(connection)?;

    let result = classify(status, &content_type, &body, path);
    if let Err(e) = &result {
      tracing::warn!(%path, status = status.as_u16(), error = %e, "request failed");
    }
    result
  }

  async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let value = self.send(self.client.get(self.url(path)), path).await?;
    Ok(serde_json::from_value(value)?)
  }

  async fn post(&self, path: &str, body: &impl Serialize) -> Result<Value> {
    self
      .send(self.client.post(self.url(path)).json(body), path)
      .await
  }

  async fn put(&self, path: &str, body: &impl Serialize) -> Result<Value> {
    self
      .send(self.client.put(self.url(path)).json(body), path)
      .await
  }

  async fn delete(&self, path: &str) -> Result<Value> {
    self.send(self.client.delete(self.url(path)), path).await
  }

  // ── Session ─────────────────────────────────────────────────────────────────

  /// `POST /login`; keeps the token for later requests.
  pub async fn login(&mut self, username: &str, password: &str) -> Result<Perfil> {
    let value = self
      .post("/login", &Credenciais { username, password })
      .await?;
    let resp: LoginResponse = serde_json::from_value(value)?;
    self.token = Some(resp.token);
    tracing::info!(username = %resp.usuario.username, "logged in");
    Ok(resp.usuario)
  }

  /// `POST /logout`. The local token is dropped even if the call fails.
  pub async fn logout(&mut self) -> Result<()> {
    let result = self.post("/logout", &Value::Null).await.map(drop);
    self.token = None;
    result
  }

  // ── Reads ───────────────────────────────────────────────────────────────────

  /// `GET /documentos`
  pub async fn documentos(&self) -> Result<DocumentSet> {
    self.get("/documentos").await
  }

  /// `GET /me`
  pub async fn me(&self) -> Result<Perfil> {
    self.get("/me").await
  }

  /// `GET /conselheiros`
  pub async fn conselheiros(&self) -> Result<Vec<Conselheiro>> {
    self.get("/conselheiros").await
  }

  /// `GET /conselheiros/{id}`
  pub async fn conselheiro(&self, id: i64) -> Result<Conselheiro> {
    self.get(&conselheiro_path(id)).await
  }

  /// `GET /direitos-violados`
  pub async fn direitos(&self) -> Result<Vec<DireitoViolado>> {
    self.get("/direitos-violados").await
  }

  /// `GET /marcadores-mapa`
  pub async fn marcadores(&self) -> Result<Vec<Marcador>> {
    self.get("/marcadores-mapa").await
  }

  // ── Writes ──────────────────────────────────────────────────────────────────

  /// Create a document of `kind`; returns the server's confirmation message.
  pub async fn submit(&self, kind: DocumentKind, body: &Value) -> Result<String> {
    let value = self.post(kind.path(), body).await?;
    Ok(message(&value, "Documento salvo"))
  }

  /// `POST /conselheiros`
  pub async fn criar_conselheiro(&self, body: &Value) -> Result<String> {
    let value = self.post("/conselheiros", body).await?;
    Ok(message(&value, "Profissional cadastrado com sucesso!"))
  }

  /// `PUT /conselheiros/{id}`. Absent fields keep their stored value.
  pub async fn atualizar_conselheiro(&self, id: i64, body: &Value) -> Result<String> {
    let value = self.put(&conselheiro_path(id), body).await?;
    Ok(message(&value, "Profissional atualizado com sucesso!"))
  }

  /// `DELETE /conselheiros/{id}`
  pub async fn excluir_conselheiro(&self, id: i64) -> Result<String> {
    let value = self.delete(&conselheiro_path(id)).await?;
    Ok(message(&value, "Profissional excluído com sucesso!"))
  }

  /// `POST /marcadores-mapa`
  pub async fn criar_marcador(&self, body: &Value) -> Result<String> {
    let value = self.post("/marcadores-mapa", body).await?;
    Ok(message(&value, "Marcador criado com sucesso"))
  }
}

fn conselheiro_path(id: i64) -> String {
  format!("/conselheiros/{id}")
}

/// The server's `message`, or `fallback` when it sent none.
fn message(value: &Value, fallback: &str) -> String {
  value
    .get("message")
    .and_then(Value::as_str)
    .unwrap_or(fallback)
    .to_owned()
}
