//! Document list: merged kinds, newest first.

use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use super::highlight;
use crate::app::App;

/// Render the document table into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let filtered = app.filtered_documents();
  let total = app.documents.len();

  let tipo = app.kind_filter.map_or("Todos", |k| k.label());
  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" Documentos · {tipo} ({}/{}) ", filtered.len(), total)
  } else {
    format!(" Documentos · {tipo} ({}) ", filtered.len())
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Filter bar on the last inner row.
  if (app.filter_active || !app.filter.is_empty()) && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    let filter_text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  if filtered.is_empty() {
    f.render_widget(
      Paragraph::new("Nenhum documento encontrado.").style(Style::default().fg(Color::DarkGray)),
      inner_area,
    );
    return;
  }

  let rows: Vec<Row> = filtered
    .iter()
    .map(|doc| {
      Row::new(vec![
        Cell::from(doc.kind().label()),
        Cell::from(doc.id().to_string()),
        Cell::from(doc.date_br()),
        Cell::from(doc.description().unwrap_or_default().replace('\n', " ")),
      ])
    })
    .collect();

  let header = Row::new(vec!["Tipo", "ID", "Data", "Descrição"]).style(
    Style::default()
      .fg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );

  let mut state = TableState::default();
  state.select(Some(app.list_cursor));

  f.render_stateful_widget(
    Table::new(rows, [
      Constraint::Length(28),
      Constraint::Length(6),
      Constraint::Length(11),
      Constraint::Min(10),
    ])
    .header(header)
    .row_highlight_style(highlight()),
    inner_area,
    &mut state,
  );
}
