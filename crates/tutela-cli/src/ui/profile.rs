//! Profile of the logged-in user.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use super::centered;
use crate::app::App;

const NAO_INFORMADO: &str = "Não informado";

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let rect = centered(area, 60, 16);
  let block = Block::default()
    .title(" Meu Perfil ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let Some(p) = &app.perfil else {
    f.render_widget(Paragraph::new("Perfil indisponível.").block(block), rect);
    return;
  };

  let section = |title: &'static str| {
    Line::from(Span::styled(
      title,
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ))
  };
  let row = |label: &str, value: Option<&str>| {
    Line::from(vec![
      Span::styled(format!("  {label:<12}"), Style::default().fg(Color::Gray)),
      Span::raw(value.filter(|v| !v.is_empty()).unwrap_or(NAO_INFORMADO).to_owned()),
    ])
  };

  let lines = vec![
    section("Identificação"),
    row("Nome", Some(p.display_name())),
    row("Cargo", p.cargo.as_deref()),
    row("Perfil", Some(p.role.as_str())),
    row("Matrícula", p.matricula.as_deref()),
    Line::from(""),
    section("Contato"),
    row("E-mail", p.email.as_deref()),
    row("Telefone", p.telefone.as_deref()),
    Line::from(""),
    section("Plantão"),
    row("Escala", p.plantao.as_deref()),
  ];
  f.render_widget(Paragraph::new(lines).block(block), rect);
}
