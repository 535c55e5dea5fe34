//! Login screen.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use super::centered;
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let rect = centered(area, 50, 9);
  let block = Block::default()
    .title(" Entrar ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(rect);
  f.render_widget(block, rect);

  let masked = "•".repeat(app.login.password.chars().count());
  let row = |label: &'static str, value: String, focused: bool| {
    let style = if focused {
      Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
      Style::default()
    };
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
      Span::styled(format!("{label:<9}"), Style::default().fg(Color::Cyan)),
      Span::styled(format!("{value}{cursor}"), style),
    ])
  };

  let lines = vec![
    Line::from(Span::styled(
      "Sistema do Conselho Tutelar",
      Style::default().add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
    row("Usuário", app.login.username.clone(), app.login.focus == 0),
    row("Senha", masked, app.login.focus == 1),
    Line::from(""),
    Line::from(Span::styled(
      app.client.base_url().to_owned(),
      Style::default().fg(Color::DarkGray),
    )),
  ];
  f.render_widget(Paragraph::new(lines), inner);
}
