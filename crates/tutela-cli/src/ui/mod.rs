//! Screen rendering, one module per screen.

pub mod document_list;
pub mod form;
pub mod login;
pub mod map;
pub mod members;
pub mod profile;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, MENU, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  match app.screen {
    Screen::Login => login::draw(f, rows[1], app),
    Screen::Menu => draw_menu(f, rows[1], app),
    Screen::Documents => document_list::draw(f, rows[1], app),
    Screen::Form => form::draw(f, rows[1], app),
    Screen::Map => map::draw(f, rows[1], app),
    Screen::Members => members::draw(f, rows[1], app),
    Screen::Profile => profile::draw(f, rows[1], app),
  }
  draw_status(f, rows[2], app);
}

/// A `width`×`height` rectangle centred in `area`.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let w = width.min(area.width);
  let h = height.min(area.height);
  Rect {
    x:      area.x + (area.width - w) / 2,
    y:      area.y + (area.height - h) / 2,
    width:  w,
    height: h,
  }
}

pub(crate) fn highlight() -> Style {
  Style::default()
    .bg(Color::Blue)
    .fg(Color::White)
    .add_modifier(Modifier::BOLD)
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%d/%m/%Y").to_string();
  let user = app
    .perfil
    .as_ref()
    .map(|p| format!("{} ({})  ", p.display_name(), p.role))
    .unwrap_or_default();

  let left = Span::styled(
    " Conselho Tutelar - Panambi",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{user}{date} "),
    Style::default().fg(Color::Gray),
  );

  // Simple left-right header: pad the middle.
  let left_width = left.width() as u16;
  let right_width = right.width() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Menu ─────────────────────────────────────────────────────────────────────

fn draw_menu(f: &mut Frame, area: Rect, app: &App) {
  let rect = centered(area, 50, MENU.len() as u16 + 2);
  let block = Block::default()
    .title(" Menu ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let items: Vec<ListItem> = MENU
    .iter()
    .map(|item| ListItem::new(format!(" {}", item.label())))
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.menu_cursor));
  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(highlight()),
    rect,
    &mut state,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = app.hints();

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::Gray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

#[cfg(test)]
mod tests {
  use ratatui::{Terminal, backend::TestBackend};

  use super::*;
  use crate::client::ApiClient;

  fn render(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    terminal.draw(|f| draw(f, app)).unwrap();
    let buf = terminal.backend().buffer().clone();
    buf
      .content()
      .chunks(buf.area.width as usize)
      .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
      .collect::<Vec<_>>()
      .join("\n")
  }

  fn app() -> App {
    App::new(ApiClient::new("http://127.0.0.1:9").unwrap(), std::env::temp_dir())
  }

  #[test]
  fn centered_fits_inside() {
    let area = Rect::new(0, 0, 20, 10);
    assert_eq!(centered(area, 10, 4), Rect::new(5, 3, 10, 4));
    assert_eq!(centered(area, 40, 40), area);
  }

  #[test]
  fn every_screen_draws() {
    let mut app = app();
    assert!(render(&app).contains("Usuário"));

    app.screen = Screen::Menu;
    assert!(render(&app).contains("Nova denúncia"));

    app.screen = Screen::Documents;
    assert!(render(&app).contains("Nenhum documento"));

    app.screen = Screen::Map;
    assert!(render(&app).contains("Marcadores"));

    app.form = Some(crate::form::Form::new(
      tutela_core::document::DocumentKind::Atendimento,
      chrono::NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
    ));
    app.screen = Screen::Form;
    let out = render(&app);
    assert!(out.contains("Ficha de Atendimento"));
    assert!(out.contains("2024-03-05"));
    assert!(out.contains("FORMULÁRIO"));
    assert!(out.contains("Assinatura"));
  }

  #[test]
  fn member_list_and_delete_prompt() {
    use tutela_core::record::{Cargo, Conselheiro};

    let mut app = app();
    app.screen = Screen::Members;
    assert!(render(&app).contains("Nenhum profissional cadastrado"));

    app.conselheiros = vec![Conselheiro {
      id:              4,
      nome:            Some("Maria Souza".into()),
      cargo:           Some(Cargo::Secretario),
      cpf:             None,
      rg:              None,
      data_nascimento: None,
      endereco:        None,
      contato:         Some("(55) 99999-0000".into()),
      nacionalidade:   None,
      inicio_mandato:  None,
      fim_mandato:     None,
    }];
    let out = render(&app);
    assert!(out.contains("Maria Souza"));
    assert!(out.contains("Secretário/a"));
    assert!(out.contains("(55) 99999-0000"));

    app.confirm_delete = Some(4);
    let out = render(&app);
    assert!(out.contains("Excluir profissional"));
    assert!(out.contains("EXCLUIR"));
  }

  #[test]
  fn profile_shows_sections_and_fallbacks() {
    let mut app = app();
    app.screen = Screen::Profile;
    assert!(render(&app).contains("Perfil indisponível"));

    app.perfil = Some(crate::client::Perfil {
      username: "carla".into(),
      role: "conselheiro".into(),
      nome: Some("Carla Dias".into()),
      email: Some("carla@panambi.rs.gov.br".into()),
      plantao: Some("Sábado 08h-20h".into()),
      ..Default::default()
    });
    let out = render(&app);
    assert!(out.contains("Meu Perfil"));
    assert!(out.contains("Carla Dias"));
    assert!(out.contains("carla@panambi.rs.gov.br"));
    assert!(out.contains("Sábado 08h-20h"));
    // Telephone was not set.
    assert!(out.contains("Não informado"));
  }

  #[test]
  fn member_form_has_no_signature_row() {
    let mut app = app();
    app.form = Some(crate::form::Form::conselheiro(
      None,
      chrono::NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
    ));
    app.screen = Screen::Form;
    let out = render(&app);
    assert!(out.contains("Cadastrar Profissional"));
    assert!(out.contains("< conselheiro >"));
    assert!(!out.contains("Assinatura"));
  }
}
