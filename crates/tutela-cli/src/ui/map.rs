//! Case-location map with a marker list beside it.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Style},
  symbols::Marker,
  text::Line,
  widgets::{
    Block, Borders, List, ListItem, ListState,
    canvas::{Canvas, Map, MapResolution, Points},
  },
};

use super::highlight;
use crate::{app::App, map::CENTRO};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
    .split(area);

  draw_canvas(f, cols[0], app);
  draw_markers(f, cols[1], app);
}

fn draw_canvas(f: &mut Frame, area: Rect, app: &App) {
  let view = &app.map;
  let selected = app.marcadores.get(view.cursor);
  let others: Vec<(f64, f64)> = app
    .marcadores
    .iter()
    .enumerate()
    .filter(|(i, _)| *i != view.cursor)
    .map(|(_, m)| (m.longitude, m.latitude))
    .collect();

  let canvas = Canvas::default()
    .block(
      Block::default()
        .title(format!(
          " Panambi/RS · ±{:.3}° · {} visível(is) ",
          view.span,
          app.marcadores.iter().filter(|m| view.contains(m.latitude, m.longitude)).count(),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray)),
    )
    .marker(Marker::Braille)
    .x_bounds(view.x_bounds())
    .y_bounds(view.y_bounds())
    .paint(move |ctx| {
      ctx.draw(&Map { color: Color::DarkGray, resolution: MapResolution::High });
      ctx.layer();
      ctx.print(CENTRO.1, CENTRO.0, Line::styled("+ Panambi", Style::default().fg(Color::Cyan)));
      ctx.draw(&Points { coords: &others, color: Color::Red });
      if let Some(m) = selected {
        ctx.draw(&Points { coords: &[(m.longitude, m.latitude)], color: Color::Yellow });
        ctx.print(
          m.longitude,
          m.latitude,
          Line::styled(format!(" #{}", m.id), Style::default().fg(Color::Yellow)),
        );
      }
    });
  f.render_widget(canvas, area);
}

fn draw_markers(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(format!(" Marcadores ({}) ", app.marcadores.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let items: Vec<ListItem> = app
    .marcadores
    .iter()
    .map(|m| {
      let tipo = m.tipo_documento.as_deref().unwrap_or("?");
      let doc = m.id_documento.as_deref().unwrap_or("-");
      let onde = m
        .endereco
        .as_deref()
        .or(m.descricao.as_deref())
        .unwrap_or_default();
      ListItem::new(vec![
        Line::from(format!("{tipo} #{doc}")),
        Line::styled(format!("  {onde}"), Style::default().fg(Color::Gray)),
      ])
    })
    .collect();

  let mut state = ListState::default();
  state.select((!app.marcadores.is_empty()).then_some(app.map.cursor));
  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(highlight()),
    area,
    &mut state,
  );
}
