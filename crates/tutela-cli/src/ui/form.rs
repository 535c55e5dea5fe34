//! Data-entry form and its lookup popup.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use super::{centered, highlight};
use crate::{app::App, form::Phase};

const LABEL_WIDTH: usize = 32;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(form) = &app.form else {
    return;
  };

  let block = Block::default()
    .title(format!(" {} ", form.title()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let parts = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Min(0), Constraint::Length(2)])
    .split(inner);

  let label_style = Style::default().fg(Color::Cyan);
  let focus_style = Style::default()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

  let mut lines: Vec<Line> = form
    .fields
    .iter()
    .enumerate()
    .map(|(i, field)| {
      let focused = i == form.focus;
      let cursor = if focused && field.takes_text() { "_" } else { "" };
      Line::from(vec![
        Span::styled(format!("{:<LABEL_WIDTH$}", field.label), label_style),
        Span::styled(
          format!("{}{cursor}", field.display()),
          if focused { focus_style } else { Style::default() },
        ),
      ])
    })
    .collect();

  // Signature row, on document forms only.
  let on_sig = form.on_signature();
  if form.has_signature() {
    let sig = &form.signature;
    let sig_style = if on_sig { focus_style } else { Style::default() };
    lines.push(Line::from(""));
    let mut sig_spans = vec![
      Span::styled(format!("{:<LABEL_WIDTH$}", "Assinatura"), label_style),
      Span::styled(format!("< {} >", sig.mode.label()), sig_style),
    ];
    if let Some(hint) = sig.mode.input_hint() {
      let cursor = if on_sig { "_" } else { "" };
      sig_spans.push(Span::styled(format!("  {hint}: {}{cursor}", sig.input), sig_style));
    }
    lines.push(Line::from(sig_spans));
  }

  // Keep the focused row visible.
  let height = parts[0].height as usize;
  let focus_row = if on_sig { lines.len() - 1 } else { form.focus };
  let scroll = focus_row.saturating_sub(height.saturating_sub(1));
  f.render_widget(
    Paragraph::new(lines).scroll((scroll as u16, 0)),
    parts[0],
  );

  let (text, color) = match &form.phase {
    Phase::Editing => (String::new(), Color::Gray),
    Phase::Submitting => ("Enviando…".to_owned(), Color::Yellow),
    Phase::Success(m) => (format!("✔ {m}"), Color::Green),
    Phase::Error(m) => (format!("✘ {m}"), Color::Red),
  };
  f.render_widget(
    Paragraph::new(text)
      .style(Style::default().fg(color))
      .wrap(Wrap { trim: true }),
    parts[1],
  );

  if let Some(cursor) = app.picker {
    draw_picker(f, area, app, cursor);
  }
}

fn draw_picker(f: &mut Frame, area: Rect, app: &App, cursor: usize) {
  let options = app.picker_options();
  let rect = centered(area, 60, 14);
  f.render_widget(Clear, rect);

  let query = app
    .form
    .as_ref()
    .and_then(|form| form.focused())
    .map_or("", |field| field.value.as_str());
  let block = Block::default()
    .title(format!(" Selecionar: {query}_ "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow));

  if options.is_empty() {
    let inner = block.inner(rect);
    f.render_widget(block, rect);
    f.render_widget(
      Paragraph::new("Nenhuma opção; o texto digitado será enviado.")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let items: Vec<ListItem> = options
    .iter()
    .map(|(id, label)| ListItem::new(format!(" #{id:<4} {label}")))
    .collect();
  let mut state = ListState::default();
  state.select(Some(cursor.min(options.len() - 1)));
  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(highlight()),
    rect,
    &mut state,
  );
}
