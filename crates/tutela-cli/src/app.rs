//! Application state machine and event dispatcher.

use std::path::PathBuf;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tutela_core::{
  document::{self, Document, DocumentKind},
  record::{Conselheiro, DireitoViolado, Marcador},
};
use tutela_pdf::PdfOptions;

use crate::{
  client::{ApiClient, Perfil},
  form::{Form, FormTarget, Lookup, rank},
  map::MapView,
};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  Login,
  Menu,
  Documents,
  Form,
  Map,
  Members,
  Profile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
  Documentos,
  Novo(DocumentKind),
  Mapa,
  Profissionais,
  Perfil,
  Sair,
}

pub const MENU: [MenuItem; 10] = [
  MenuItem::Documentos,
  MenuItem::Novo(DocumentKind::Denuncia),
  MenuItem::Novo(DocumentKind::Atendimento),
  MenuItem::Novo(DocumentKind::Notificacao),
  MenuItem::Novo(DocumentKind::TermoMedidasMenor),
  MenuItem::Novo(DocumentKind::TermoMedidasResponsavel),
  MenuItem::Mapa,
  MenuItem::Profissionais,
  MenuItem::Perfil,
  MenuItem::Sair,
];

impl MenuItem {
  pub fn label(self) -> &'static str {
    match self {
      MenuItem::Documentos => "Visualizar documentos",
      MenuItem::Novo(DocumentKind::Denuncia) => "Nova denúncia",
      MenuItem::Novo(DocumentKind::Atendimento) => "Novo atendimento",
      MenuItem::Novo(DocumentKind::Notificacao) => "Nova notificação",
      MenuItem::Novo(DocumentKind::TermoMedidasMenor) => {
        "Termo de medidas (criança/adolescente)"
      }
      MenuItem::Novo(DocumentKind::TermoMedidasResponsavel) => "Termo de medidas (responsável)",
      MenuItem::Mapa => "Mapa de ocorrências",
      MenuItem::Profissionais => "Gerenciar profissionais",
      MenuItem::Perfil => "Meu perfil",
      MenuItem::Sair => "Sair da conta",
    }
  }
}

/// Username/password inputs. `focus` is 0 for the user, 1 for the password.
#[derive(Debug, Default)]
pub struct LoginState {
  pub username: String,
  pub password: String,
  pub focus:    usize,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub screen: Screen,
  pub client: ApiClient,
  pub perfil: Option<Perfil>,
  pub login:  LoginState,

  pub menu_cursor: usize,

  /// Merged document list, newest first.
  pub documents:     Vec<Document>,
  /// `None` shows every kind.
  pub kind_filter:   Option<DocumentKind>,
  pub filter:        String,
  pub filter_active: bool,
  /// Cursor position within the *filtered* document list.
  pub list_cursor:   usize,

  pub form:        Option<Form>,
  /// Screen to return to when the form closes.
  pub form_origin: Screen,
  /// Cursor in the lookup popup; `Some` while it is open.
  pub picker:      Option<usize>,

  /// Cursor in the member list.
  pub member_cursor:  usize,
  /// Member awaiting delete confirmation.
  pub confirm_delete: Option<i64>,

  pub conselheiros: Vec<Conselheiro>,
  pub direitos:     Vec<DireitoViolado>,

  pub marcadores: Vec<Marcador>,
  pub map:        MapView,

  /// Where generated PDFs are written.
  pub output_dir: PathBuf,

  /// One-line status message shown in the status bar.
  pub status_msg: String,
}

impl App {
  pub fn new(client: ApiClient, output_dir: PathBuf) -> Self {
    Self {
      screen: Screen::Login,
      client,
      perfil: None,
      login: LoginState::default(),
      menu_cursor: 0,
      documents: Vec::new(),
      kind_filter: None,
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      form: None,
      form_origin: Screen::Menu,
      picker: None,
      member_cursor: 0,
      confirm_delete: None,
      conselheiros: Vec::new(),
      direitos: Vec::new(),
      marcadores: Vec::new(),
      map: MapView::default(),
      output_dir,
      status_msg: String::new(),
    }
  }

  // ── Session ─────────────────────────────────────────────────────────────────

  /// Log in with the credentials on the login screen.
  pub async fn login(&mut self) {
    self.status_msg = "Entrando…".into();
    match self
      .client
      .login(&self.login.username, &self.login.password)
      .await
    {
      Ok(perfil) => {
        self.status_msg = format!("Bem-vindo(a), {}", perfil.display_name());
        self.perfil = Some(perfil);
        self.login.password.clear();
        self.screen = Screen::Menu;
        self.menu_cursor = 0;
      }
      Err(e) => self.status_msg = e.to_string(),
    }
  }

  async fn logout(&mut self) {
    if let Err(e) = self.client.logout().await {
      tracing::warn!(error = %e, "logout failed");
    }
    self.perfil = None;
    self.documents.clear();
    self.form = None;
    self.screen = Screen::Login;
    self.login.focus = 1;
    self.status_msg = "Sessão encerrada".into();
  }

  // ── Data loading ────────────────────────────────────────────────────────────

  pub async fn load_documents(&mut self) {
    self.status_msg = "Carregando documentos…".into();
    match self.client.documentos().await {
      Ok(set) => {
        self.documents = set.into_documents();
        self.list_cursor = 0;
        self.status_msg = format!("{} documento(s)", self.documents.len());
      }
      Err(e) => self.status_msg = e.to_string(),
    }
  }

  /// Council members and violated rights for the form pickers.
  async fn load_lookups(&mut self) {
    if !self.client.is_logged_in() {
      return;
    }
    match self.client.conselheiros().await {
      Ok(list) => self.conselheiros = list,
      Err(e) => self.status_msg = e.to_string(),
    }
    match self.client.direitos().await {
      Ok(list) => self.direitos = list,
      Err(e) => self.status_msg = e.to_string(),
    }
  }

  async fn load_members(&mut self) {
    self.status_msg = "Carregando profissionais…".into();
    match self.client.conselheiros().await {
      Ok(list) => {
        self.status_msg = format!("{} profissional(is)", list.len());
        self.conselheiros = list;
        self.member_cursor = self.member_cursor.min(self.conselheiros.len().saturating_sub(1));
      }
      Err(e) => self.status_msg = e.to_string(),
    }
  }

  /// Refresh the profile from `/me`.
  async fn load_profile(&mut self) {
    match self.client.me().await {
      Ok(perfil) => self.perfil = Some(perfil),
      Err(e) => self.status_msg = e.to_string(),
    }
  }

  async fn load_marcadores(&mut self) {
    match self.client.marcadores().await {
      Ok(list) => {
        self.status_msg = format!("{} marcador(es)", list.len());
        self.marcadores = list;
        self.map.select(0, self.marcadores.len());
      }
      Err(e) => self.status_msg = e.to_string(),
    }
  }

  // ── Document list ───────────────────────────────────────────────────────────

  pub fn filtered_documents(&self) -> Vec<&Document> {
    document::filter(&self.documents, self.kind_filter, &self.filter)
  }

  pub fn cursor_document(&self) -> Option<&Document> {
    self.filtered_documents().get(self.list_cursor).copied()
  }

  /// All kinds, then each kind in turn.
  pub fn cycle_kind(&mut self) {
    let kinds: Vec<DocumentKind> = DocumentKind::all().collect();
    self.kind_filter = match self.kind_filter {
      None => kinds.first().copied(),
      Some(k) => kinds
        .iter()
        .position(|x| *x == k)
        .and_then(|i| kinds.get(i + 1).copied()),
    };
    self.list_cursor = 0;
  }

  /// Render the selected document to the output directory.
  fn generate_pdf(&mut self) {
    let Some(doc) = self.cursor_document() else {
      return;
    };
    self.status_msg = match tutela_pdf::save(doc, None, &PdfOptions::now(), &self.output_dir) {
      Ok(path) => {
        tracing::info!(path = %path.display(), "pdf written");
        format!("PDF salvo em {}", path.display())
      }
      Err(e) => format!("Erro ao gerar PDF: {e}"),
    };
  }

  // ── Form ────────────────────────────────────────────────────────────────────

  async fn open_form(&mut self, kind: DocumentKind) {
    if self.conselheiros.is_empty() || self.direitos.is_empty() {
      self.load_lookups().await;
    }
    self.show_form(Form::new(kind, Local::now().date_naive()));
  }

  fn show_form(&mut self, form: Form) {
    self.form = Some(form);
    self.form_origin = self.screen;
    self.picker = None;
    self.screen = Screen::Form;
  }

  /// Registration form, or the edit form for `id` loaded fresh from the
  /// server. A failed load stays on the list.
  async fn open_member_form(&mut self, id: Option<i64>) {
    let today = Local::now().date_naive();
    let form = match id {
      None => Form::conselheiro(None, today),
      Some(id) => match self.client.conselheiro(id).await {
        Ok(c) => Form::conselheiro(Some(&c), today),
        Err(e) => {
          self.status_msg = e.to_string();
          return;
        }
      },
    };
    self.show_form(form);
  }

  /// Marker form at the map centre, tied to the selected document when
  /// opened from the document list.
  fn open_marker_form(&mut self) {
    let documento = match self.screen {
      Screen::Documents => self.cursor_document().map(|d| (d.kind(), d.id())),
      _ => None,
    };
    let form = Form::marcador((self.map.lat, self.map.lon), documento, Local::now().date_naive());
    self.show_form(form);
  }

  /// Close the form and reload whatever the origin screen shows.
  async fn leave_form(&mut self) {
    self.form = None;
    self.picker = None;
    self.screen = self.form_origin;
    match self.screen {
      Screen::Members => self.load_members().await,
      Screen::Map => self.load_marcadores().await,
      _ => {}
    }
  }

  /// `(id, label)` choices for the focused picker, ranked by what was typed.
  pub fn picker_options(&self) -> Vec<(i64, String)> {
    let Some(form) = &self.form else {
      return Vec::new();
    };
    let query = form.focused().map_or("", |f| f.value.as_str());
    match form.focused_lookup() {
      Some(Lookup::Conselheiro) => {
        rank(&self.conselheiros, |c| c.nome.as_deref().unwrap_or_default(), query)
          .into_iter()
          .map(|c| (c.id, c.nome.clone().unwrap_or_default()))
          .collect()
      }
      Some(Lookup::Direito) => {
        rank(&self.direitos, |d| d.descricao.as_deref().unwrap_or_default(), query)
          .into_iter()
          .map(|d| (d.id, d.descricao.clone().unwrap_or_default()))
          .collect()
      }
      None => Vec::new(),
    }
  }

  async fn submit_form(&mut self) {
    let Some(form) = self.form.as_mut() else {
      return;
    };
    let Some(body) = form.begin_submit() else {
      return;
    };
    let target = form.target;
    let result = match target {
      FormTarget::Documento(kind) => self.client.submit(kind, &body).await,
      FormTarget::Conselheiro(None) => self.client.criar_conselheiro(&body).await,
      FormTarget::Conselheiro(Some(id)) => self.client.atualizar_conselheiro(id, &body).await,
      FormTarget::Marcador => self.client.criar_marcador(&body).await,
    }
    .map_err(|e| e.to_string());
    match &result {
      Ok(message) => tracing::info!(?target, %message, "form submitted"),
      Err(error) => tracing::warn!(?target, %error, "submit failed"),
    }

    // Member and marker forms hand back to the screen they came from.
    if !matches!(target, FormTarget::Documento(_)) {
      if let Ok(message) = result {
        self.leave_form().await;
        self.status_msg = message;
        return;
      }
    }
    if let Some(form) = self.form.as_mut() {
      form.finish(result);
    }
  }

  // ── Members ─────────────────────────────────────────────────────────────────

  pub fn cursor_member(&self) -> Option<&Conselheiro> {
    self.conselheiros.get(self.member_cursor)
  }

  async fn delete_member(&mut self, id: i64) {
    match self.client.excluir_conselheiro(id).await {
      Ok(message) => {
        tracing::info!(id, "member deleted");
        self.load_members().await;
        self.status_msg = message;
      }
      Err(e) => self.status_msg = e.to_string(),
    }
  }

  // ── Key handling ────────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    match self.screen {
      Screen::Login => self.handle_login_key(key).await,
      Screen::Menu => self.handle_menu_key(key).await,
      Screen::Documents if self.filter_active => Ok(self.handle_filter_key(key)),
      Screen::Documents => self.handle_documents_key(key).await,
      Screen::Form => self.handle_form_key(key).await,
      Screen::Map => self.handle_map_key(key).await,
      Screen::Members if self.confirm_delete.is_some() => {
        self.handle_confirm_key(key).await;
        Ok(true)
      }
      Screen::Members => self.handle_members_key(key).await,
      Screen::Profile => Ok(self.handle_profile_key(key)),
    }
  }

  async fn handle_login_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    let field = if self.login.focus == 0 {
      &mut self.login.username
    } else {
      &mut self.login.password
    };
    match key.code {
      KeyCode::Esc => return Ok(false),
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
        self.login.focus = 1 - self.login.focus;
      }
      KeyCode::Enter if self.login.focus == 0 => self.login.focus = 1,
      KeyCode::Enter => self.login().await,
      KeyCode::Backspace => {
        field.pop();
      }
      KeyCode::Char(c) => field.push(c),
      _ => {}
    }
    Ok(true)
  }

  async fn handle_menu_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),
      KeyCode::Down | KeyCode::Char('j') => {
        self.menu_cursor = (self.menu_cursor + 1).min(MENU.len() - 1);
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.menu_cursor = self.menu_cursor.saturating_sub(1);
      }
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        match MENU.get(self.menu_cursor).copied() {
          Some(MenuItem::Documentos) => {
            self.screen = Screen::Documents;
            self.load_documents().await;
          }
          Some(MenuItem::Novo(kind)) => self.open_form(kind).await,
          Some(MenuItem::Mapa) => {
            self.screen = Screen::Map;
            self.load_marcadores().await;
          }
          Some(MenuItem::Profissionais) => {
            self.screen = Screen::Members;
            self.member_cursor = 0;
            self.load_members().await;
          }
          Some(MenuItem::Perfil) => {
            self.screen = Screen::Profile;
            self.load_profile().await;
          }
          Some(MenuItem::Sair) => self.logout().await,
          None => {}
        }
      }
      _ => {}
    }
    Ok(true)
  }

  fn handle_filter_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => self.filter_active = false,
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => self.filter.push(c),
      _ => {}
    }
    self.list_cursor = 0;
    true
  }

  async fn handle_documents_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => self.screen = Screen::Menu,
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.filtered_documents().len();
        if self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Tab | KeyCode::Char('t') => self.cycle_kind(),
      KeyCode::Enter | KeyCode::Char('p') => self.generate_pdf(),
      KeyCode::Char('m') if self.cursor_document().is_some() => self.open_marker_form(),
      KeyCode::Char('r') => self.load_documents().await,
      _ => {}
    }
    Ok(true)
  }

  async fn handle_form_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if self.picker.is_some() {
      self.handle_picker_key(key);
      return Ok(true);
    }

    let submit = key.code == KeyCode::F(2)
      || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s'));
    if submit {
      self.submit_form().await;
      return Ok(true);
    }

    let Some(form) = self.form.as_mut() else {
      self.screen = Screen::Menu;
      return Ok(true);
    };
    match key.code {
      KeyCode::Esc => {
        self.form = None;
        self.screen = self.form_origin;
      }
      KeyCode::Tab | KeyCode::Down => form.next(),
      KeyCode::BackTab | KeyCode::Up => form.prev(),
      KeyCode::Left => form.cycle(-1),
      KeyCode::Right => form.cycle(1),
      KeyCode::Enter if form.focused_lookup().is_some() => self.picker = Some(0),
      KeyCode::Enter => form.next(),
      KeyCode::Backspace => form.backspace(),
      KeyCode::Char(c) => form.input(c),
      _ => {}
    }
    Ok(true)
  }

  fn handle_picker_key(&mut self, key: KeyEvent) {
    let options = self.picker_options();
    let cursor = self.picker.unwrap_or(0);
    match key.code {
      KeyCode::Esc => self.picker = None,
      KeyCode::Down => self.picker = Some((cursor + 1).min(options.len().saturating_sub(1))),
      KeyCode::Up => self.picker = Some(cursor.saturating_sub(1)),
      KeyCode::Enter => {
        if let (Some(form), Some((id, label))) = (self.form.as_mut(), options.get(cursor)) {
          form.pick(*id, label);
          form.next();
        }
        self.picker = None;
      }
      KeyCode::Backspace => {
        if let Some(form) = self.form.as_mut() {
          form.backspace();
        }
        self.picker = Some(0);
      }
      KeyCode::Char(c) => {
        if let Some(form) = self.form.as_mut() {
          form.input(c);
        }
        self.picker = Some(0);
      }
      _ => {}
    }
  }

  async fn handle_map_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    let len = self.marcadores.len();
    match key.code {
      KeyCode::Char('q') => return Ok(false),
      KeyCode::Esc => self.screen = Screen::Menu,
      KeyCode::Left => self.map.pan(-1.0, 0.0),
      KeyCode::Right => self.map.pan(1.0, 0.0),
      KeyCode::Up => self.map.pan(0.0, 1.0),
      KeyCode::Down => self.map.pan(0.0, -1.0),
      KeyCode::Char('+') | KeyCode::Char('=') => self.map.zoom_in(),
      KeyCode::Char('-') => self.map.zoom_out(),
      KeyCode::Char('c') => self.map.recenter(),
      KeyCode::Char('j') => {
        self.map.select(1, len);
        self.map.focus(&self.marcadores);
      }
      KeyCode::Char('k') => {
        self.map.select(-1, len);
        self.map.focus(&self.marcadores);
      }
      KeyCode::Char('n') => self.open_marker_form(),
      KeyCode::Char('r') => self.load_marcadores().await,
      _ => {}
    }
    Ok(true)
  }

  async fn handle_members_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => self.screen = Screen::Menu,
      KeyCode::Down | KeyCode::Char('j') => {
        if self.member_cursor + 1 < self.conselheiros.len() {
          self.member_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.member_cursor = self.member_cursor.saturating_sub(1);
      }
      KeyCode::Char('n') => self.open_member_form(None).await,
      KeyCode::Enter | KeyCode::Char('e') => {
        if let Some(id) = self.cursor_member().map(|c| c.id) {
          self.open_member_form(Some(id)).await;
        }
      }
      KeyCode::Char('d') | KeyCode::Delete => {
        self.confirm_delete = self.cursor_member().map(|c| c.id);
      }
      KeyCode::Char('r') => self.load_members().await,
      _ => {}
    }
    Ok(true)
  }

  /// `s`/`y` confirms the pending delete; any other key cancels it.
  async fn handle_confirm_key(&mut self, key: KeyEvent) {
    let Some(id) = self.confirm_delete.take() else {
      return;
    };
    if matches!(key.code, KeyCode::Char('s' | 'S' | 'y' | 'Y')) {
      self.delete_member(id).await;
    } else {
      self.status_msg = "Exclusão cancelada".into();
    }
  }

  fn handle_profile_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') | KeyCode::Enter => {
        self.screen = Screen::Menu;
      }
      _ => {}
    }
    true
  }

  /// Key hints for the status bar.
  pub fn hints(&self) -> (&'static str, &'static str) {
    match self.screen {
      Screen::Login => ("LOGIN", "Tab alterna campo  Enter entrar  Esc sair"),
      Screen::Menu => ("MENU", "↑↓/jk navegar  Enter abrir  q sair"),
      Screen::Documents if self.filter_active => {
        ("BUSCA", "Digite para filtrar  Enter confirmar  Esc limpar")
      }
      Screen::Documents => (
        "DOCUMENTOS",
        "↑↓/jk navegar  / buscar  Tab tipo  p gerar PDF  m marcar no mapa  r recarregar  Esc voltar",
      ),
      Screen::Form if self.picker.is_some() => {
        ("SELEÇÃO", "Digite para filtrar  ↑↓ escolher  Enter confirmar  Esc fechar")
      }
      Screen::Form => (
        "FORMULÁRIO",
        "Tab/↑↓ campo  ←→ opção  Espaço marcar  Enter lista  F2/Ctrl-S enviar  Esc voltar",
      ),
      Screen::Map => (
        "MAPA",
        "←↑↓→ mover  +/- zoom  j/k marcador  c centralizar  n novo marcador  Esc voltar",
      ),
      Screen::Members if self.confirm_delete.is_some() => {
        ("EXCLUIR", "s confirmar exclusão  qualquer outra tecla cancela")
      }
      Screen::Members => (
        "PROFISSIONAIS",
        "↑↓/jk navegar  n novo  Enter/e editar  d excluir  r recarregar  Esc voltar",
      ),
      Screen::Profile => ("PERFIL", "Esc voltar"),
    }
  }
}

#[cfg(test)]
mod tests {
  use tutela_core::record::{Atendimento, Denuncia, Notificacao};

  use super::*;
  use crate::form::Phase;

  fn phase(app: &App) -> Option<&Phase> {
    app.form.as_ref().map(|f| &f.phase)
  }

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn app() -> App {
    let client = ApiClient::new("http://127.0.0.1:9").unwrap();
    App::new(client, std::env::temp_dir())
  }

  fn docs() -> Vec<Document> {
    vec![
      Document::Atendimento(Atendimento {
        id:                        3,
        data:                      Some("2024-02-01".into()),
        hora:                      None,
        relato:                    Some("Falta escolar".into()),
        id_direito_violado:        None,
        direito_violado_descricao: None,
      }),
      Document::Denuncia(Denuncia {
        nr_denuncia:         7,
        descricao_fato:      Some("Criança sozinha".into()),
        data:                Some("2024-01-10".into()),
        tipo_denuncia:       None,
        pessoal_enf_entrada: 0,
        id_conselheiro:      None,
        data_averiguacao:    None,
        observacao:          None,
      }),
      Document::Notificacao(Notificacao {
        id:                 4,
        redator:            Some("Ana".into()),
        segunda_via:        None,
        id_conselheiro:     None,
        id_secretario:      None,
        id_medida_id_maior: None,
        data:               None,
        hora:               None,
      }),
    ]
  }

  async fn type_str(app: &mut App, s: &str) {
    for c in s.chars() {
      app.handle_key(key(KeyCode::Char(c))).await.unwrap();
    }
  }

  #[tokio::test]
  async fn ctrl_c_quits_everywhere() {
    let mut app = app();
    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert!(!app.handle_key(ctrl_c).await.unwrap());
    app.screen = Screen::Form;
    assert!(!app.handle_key(ctrl_c).await.unwrap());
  }

  #[tokio::test]
  async fn login_fields_and_failure_message() {
    let mut app = app();
    type_str(&mut app, "ana").await;
    app.handle_key(key(KeyCode::Tab)).await.unwrap();
    type_str(&mut app, "pw").await;
    assert_eq!(app.login.username, "ana");
    assert_eq!(app.login.password, "pw");

    app.handle_key(key(KeyCode::Enter)).await.unwrap();
    assert_eq!(app.screen, Screen::Login);
    assert!(app.status_msg.contains("Não foi possível conectar"));
  }

  #[tokio::test]
  async fn kind_filter_cycles_through_all_kinds() {
    let mut app = app();
    app.screen = Screen::Documents;
    app.documents = docs();
    assert_eq!(app.filtered_documents().len(), 3);

    app.handle_key(key(KeyCode::Tab)).await.unwrap();
    assert_eq!(app.kind_filter, Some(DocumentKind::Denuncia));
    assert_eq!(app.filtered_documents().len(), 1);

    for _ in 0..4 {
      app.cycle_kind();
    }
    assert_eq!(app.kind_filter, Some(DocumentKind::TermoMedidasResponsavel));
    app.cycle_kind();
    assert_eq!(app.kind_filter, None);
  }

  #[tokio::test]
  async fn search_narrows_and_escape_clears() {
    let mut app = app();
    app.screen = Screen::Documents;
    app.documents = docs();

    app.handle_key(key(KeyCode::Char('/'))).await.unwrap();
    type_str(&mut app, "escolar").await;
    assert!(app.filter_active);
    let hits = app.filtered_documents();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id(), 3);

    app.handle_key(key(KeyCode::Esc)).await.unwrap();
    assert!(!app.filter_active);
    assert_eq!(app.filtered_documents().len(), 3);
  }

  #[tokio::test]
  async fn pdf_is_written_for_selected_row() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::new(ApiClient::new("http://127.0.0.1:9").unwrap(), dir.path().into());
    app.screen = Screen::Documents;
    app.documents = docs();

    app.handle_key(key(KeyCode::Down)).await.unwrap();
    app.handle_key(key(KeyCode::Char('p'))).await.unwrap();
    assert!(dir.path().join("Denuncia_7.pdf").exists());
    assert!(app.status_msg.starts_with("PDF salvo em"));
  }

  #[tokio::test]
  async fn picker_sends_typed_id() {
    let mut app = app();
    app.screen = Screen::Menu;
    app.conselheiros = vec![
      conselheiro(1, "Maria Souza"),
      conselheiro(2, "Carlos Lima"),
    ];
    app.direitos = vec![DireitoViolado { id: 1, descricao: Some("Educação".into()) }];
    app.menu_cursor = 1;
    app.handle_key(key(KeyCode::Enter)).await.unwrap();
    assert_eq!(app.screen, Screen::Form);

    let form = app.form.as_mut().unwrap();
    form.focus = form
      .fields
      .iter()
      .position(|f| f.key == "conselheiroRecebeu")
      .unwrap();
    app.handle_key(key(KeyCode::Enter)).await.unwrap();
    assert_eq!(app.picker, Some(0));

    type_str(&mut app, "carl").await;
    assert_eq!(app.picker_options(), vec![(2, "Carlos Lima".to_owned())]);
    app.handle_key(key(KeyCode::Enter)).await.unwrap();
    assert_eq!(app.picker, None);

    let body = app.form.as_ref().unwrap().to_body().unwrap();
    assert_eq!(body["idConselheiro"], 2);
    assert_eq!(body["conselheiroRecebeu"], "Carlos Lima");
  }

  #[tokio::test]
  async fn failed_submit_keeps_form_and_reports() {
    let mut app = app();
    app.open_form(DocumentKind::Notificacao).await;
    type_str(&mut app, "2024-01-01").await;
    // Date field already holds today's date, so this one is now invalid.
    app.handle_key(KeyEvent::new(KeyCode::F(2), KeyModifiers::NONE)).await.unwrap();
    assert!(matches!(phase(&app), Some(Phase::Error(_))));

    let form = app.form.as_mut().unwrap();
    form.fields[0].value = "2024-01-01".into();
    app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)).await.unwrap();
    match phase(&app) {
      Some(Phase::Error(msg)) => assert!(msg.contains("Não foi possível conectar")),
      other => panic!("unexpected phase {other:?}"),
    }
  }

  fn menu_to(app: &mut App, item: MenuItem) {
    app.screen = Screen::Menu;
    app.menu_cursor = MENU.iter().position(|m| *m == item).unwrap();
  }

  #[tokio::test]
  async fn menu_opens_members_and_profile() {
    let mut app = app();
    menu_to(&mut app, MenuItem::Profissionais);
    app.handle_key(key(KeyCode::Enter)).await.unwrap();
    assert_eq!(app.screen, Screen::Members);
    assert!(app.status_msg.contains("Não foi possível conectar"));
    app.handle_key(key(KeyCode::Esc)).await.unwrap();
    assert_eq!(app.screen, Screen::Menu);

    menu_to(&mut app, MenuItem::Perfil);
    app.handle_key(key(KeyCode::Enter)).await.unwrap();
    assert_eq!(app.screen, Screen::Profile);
    assert_eq!(app.hints().0, "PERFIL");
    app.handle_key(key(KeyCode::Esc)).await.unwrap();
    assert_eq!(app.screen, Screen::Menu);
  }

  #[tokio::test]
  async fn delete_needs_confirmation() {
    let mut app = app();
    app.screen = Screen::Members;
    app.conselheiros = vec![conselheiro(1, "Maria Souza"), conselheiro(2, "Carlos Lima")];
    app.handle_key(key(KeyCode::Down)).await.unwrap();
    app.handle_key(key(KeyCode::Char('d'))).await.unwrap();
    assert_eq!(app.confirm_delete, Some(2));
    assert_eq!(app.hints().0, "EXCLUIR");

    // Any other key cancels, and is not taken as a command.
    app.handle_key(key(KeyCode::Char('n'))).await.unwrap();
    assert_eq!(app.confirm_delete, None);
    assert_eq!(app.status_msg, "Exclusão cancelada");
    assert_eq!(app.screen, Screen::Members);

    app.handle_key(key(KeyCode::Char('d'))).await.unwrap();
    app.handle_key(key(KeyCode::Char('s'))).await.unwrap();
    assert_eq!(app.confirm_delete, None);
    assert!(app.status_msg.contains("Não foi possível conectar"));
    assert_eq!(app.conselheiros.len(), 2);
  }

  #[tokio::test]
  async fn member_forms_return_to_the_list() {
    let mut app = app();
    app.screen = Screen::Members;
    app.conselheiros = vec![conselheiro(1, "Maria Souza")];

    // Editing loads the member first; a failed load stays on the list.
    app.handle_key(key(KeyCode::Char('e'))).await.unwrap();
    assert_eq!(app.screen, Screen::Members);
    assert!(app.form.is_none());

    app.handle_key(key(KeyCode::Char('n'))).await.unwrap();
    assert_eq!(app.screen, Screen::Form);
    assert_eq!(app.form.as_ref().unwrap().target, FormTarget::Conselheiro(None));
    type_str(&mut app, "Ana").await;
    app.handle_key(KeyEvent::new(KeyCode::F(2), KeyModifiers::NONE)).await.unwrap();
    assert!(matches!(phase(&app), Some(Phase::Error(_))));
    assert_eq!(app.form.as_ref().unwrap().fields[0].value, "Ana");

    app.handle_key(key(KeyCode::Esc)).await.unwrap();
    assert_eq!(app.screen, Screen::Members);
    assert!(app.form.is_none());
  }

  #[tokio::test]
  async fn map_opens_marker_form_at_view_centre() {
    let mut app = app();
    app.screen = Screen::Map;
    app.map.pan(1.0, 0.0);
    app.handle_key(key(KeyCode::Char('n'))).await.unwrap();
    assert_eq!(app.screen, Screen::Form);

    let body = app.form.as_ref().unwrap().to_body().unwrap();
    assert_eq!(body["latitude"], app.map.lat);
    assert_eq!(body["longitude"], app.map.lon);
    assert_eq!(body["idDocumento"], serde_json::Value::Null);

    app.handle_key(key(KeyCode::Esc)).await.unwrap();
    assert_eq!(app.screen, Screen::Map);
  }

  #[tokio::test]
  async fn document_row_can_be_pinned_on_the_map() {
    let mut app = app();
    app.screen = Screen::Documents;
    app.documents = docs();
    app.handle_key(key(KeyCode::Down)).await.unwrap();
    app.handle_key(key(KeyCode::Char('m'))).await.unwrap();
    assert_eq!(app.screen, Screen::Form);

    let body = app.form.as_ref().unwrap().to_body().unwrap();
    assert_eq!(body["tipoDocumento"], "denuncia");
    assert_eq!(body["idDocumento"], "7");

    app.handle_key(key(KeyCode::Esc)).await.unwrap();
    assert_eq!(app.screen, Screen::Documents);
  }

  fn conselheiro(id: i64, nome: &str) -> Conselheiro {
    Conselheiro {
      id,
      nome: Some(nome.into()),
      cargo: None,
      cpf: None,
      rg: None,
      data_nascimento: None,
      endereco: None,
      contato: None,
      nacionalidade: None,
      inicio_mandato: None,
      fim_mandato: None,
    }
  }
}
