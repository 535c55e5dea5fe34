//! Council member list with edit and delete.

use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  text::Line,
  widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};
use tutela_core::record::{Cargo, Conselheiro};

use super::{centered, highlight};
use crate::app::App;

pub fn cargo_label(cargo: Option<Cargo>) -> &'static str {
  match cargo {
    Some(Cargo::Secretario) => "Secretário/a",
    Some(Cargo::Conselheiro) => "Conselheiro/a",
    None => "Não informado",
  }
}

fn nome(c: &Conselheiro) -> &str {
  c.nome.as_deref().unwrap_or("Nome não informado")
}

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(format!(" Profissionais ({}) ", app.conselheiros.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  if app.conselheiros.is_empty() {
    f.render_widget(
      Paragraph::new("Nenhum profissional cadastrado no banco de dados.")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let rows: Vec<Row> = app
    .conselheiros
    .iter()
    .map(|c| {
      Row::new(vec![
        Cell::from(c.id.to_string()),
        Cell::from(nome(c).to_owned()),
        Cell::from(cargo_label(c.cargo)),
        Cell::from(c.contato.clone().unwrap_or_default()),
      ])
    })
    .collect();
  let header = Row::new(vec!["ID", "Nome", "Cargo", "Contato"]).style(
    Style::default()
      .fg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );

  let mut state = TableState::default();
  state.select(Some(app.member_cursor));
  f.render_stateful_widget(
    Table::new(rows, [
      Constraint::Length(6),
      Constraint::Min(20),
      Constraint::Length(15),
      Constraint::Length(20),
    ])
    .header(header)
    .row_highlight_style(highlight()),
    inner,
    &mut state,
  );

  if let Some(c) = app.confirm_delete.and_then(|id| app.conselheiros.iter().find(|c| c.id == id)) {
    let rect = centered(area, 56, 6);
    f.render_widget(Clear, rect);
    let text = vec![
      Line::from(format!(
        "Tem certeza que deseja excluir {}? Esta ação não pode ser desfeita.",
        nome(c)
      )),
      Line::from(""),
      Line::from("s = sim    outra tecla = cancelar"),
    ];
    f.render_widget(
      Paragraph::new(text).wrap(Wrap { trim: true }).block(
        Block::default()
          .title(" Excluir profissional ")
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::Red)),
      ),
      rect,
    );
  }
}
