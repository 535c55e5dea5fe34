//! Top-down flow layout in millimetres with automatic page breaks.

use crate::{
  image::Image,
  text::{Font, text_width, wrap},
  writer::{BLACK, Content, PAGE_HEIGHT, Rgb},
};

const PT_PER_MM: f32 = 72.0 / 25.4;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const MARGIN_MM: f32 = 20.0;
pub const TEXT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
const TOP_MM: f32 = 20.0;
const BOTTOM_MM: f32 = 280.0;

fn pt(mm: f32) -> f32 {
  mm * PT_PER_MM
}

/// Flows text down the page, starting a new page when the next element does
/// not fit. Everything drawn is also recorded as plain text.
pub struct Layout {
  pages:   Vec<Content>,
  current: Content,
  y:       f32,
  plain:   String,
  images:  Vec<Image>,
}

impl Default for Layout {
  fn default() -> Self {
    Self::new()
  }
}

impl Layout {
  pub fn new() -> Self {
    Self {
      pages:   Vec::new(),
      current: Content::default(),
      y:       TOP_MM,
      plain:   String::new(),
      images:  Vec::new(),
    }
  }

  /// Text drawn so far, one line per drawn line.
  pub fn plain_text(&self) -> &str {
    &self.plain
  }

  pub fn gap(&mut self, mm: f32) {
    self.y += mm;
  }

  /// Break the page unless `height_mm` still fits below the cursor.
  pub fn ensure(&mut self, height_mm: f32) {
    if self.y + height_mm > BOTTOM_MM {
      self.pages.push(std::mem::take(&mut self.current));
      self.y = TOP_MM;
    }
  }

  fn draw(&mut self, x_mm: f32, s: &str, font: Font, size: f32, color: Rgb) {
    self
      .current
      .text(pt(x_mm), PAGE_HEIGHT - pt(self.y), font, size, color, s);
    self.plain.push_str(s);
    self.plain.push('\n');
  }

  /// One centred line; advances by `advance_mm`.
  pub fn centered(&mut self, s: &str, font: Font, size: f32, advance_mm: f32) {
    self.ensure(advance_mm);
    let w_mm = text_width(s, font, size) / PT_PER_MM;
    let x = ((PAGE_WIDTH_MM - w_mm) / 2.0).max(0.0);
    self.draw(x, s, font, size, BLACK);
    self.y += advance_mm;
  }

  /// One unwrapped line at `x_mm`; advances by `advance_mm`.
  pub fn line_at(&mut self, x_mm: f32, s: &str, font: Font, size: f32, color: Rgb, advance_mm: f32) {
    self.ensure(advance_mm);
    self.draw(x_mm, s, font, size, color);
    self.y += advance_mm;
  }

  /// Wrapped text at the left margin, `line_mm` per line.
  pub fn paragraph(&mut self, s: &str, font: Font, size: f32, line_mm: f32) {
    for line in wrap(s, font, size, pt(TEXT_WIDTH_MM)) {
      self.ensure(line_mm);
      self.draw(MARGIN_MM, &line, font, size, BLACK);
      self.y += line_mm;
    }
  }

  /// Horizontal rule across the text width at the cursor.
  pub fn rule(&mut self, width_pt: f32) {
    let y = PAGE_HEIGHT - pt(self.y);
    self
      .current
      .line((pt(MARGIN_MM), y), (pt(PAGE_WIDTH_MM - MARGIN_MM), y), width_pt, BLACK);
  }

  /// Framed box whose top edge is at the cursor. The cursor does not move.
  pub fn frame(&mut self, x_mm: f32, w_mm: f32, h_mm: f32, stroke: Rgb, fill: Rgb) {
    let bottom = PAGE_HEIGHT - pt(self.y + h_mm);
    self
      .current
      .rect(pt(x_mm), bottom, pt(w_mm), pt(h_mm), stroke, fill);
  }

  /// Rule between `x0_mm` and `x1_mm`, `dy_mm` below the cursor.
  pub fn rule_between(&mut self, x0_mm: f32, x1_mm: f32, dy_mm: f32, color: Rgb) {
    let y = PAGE_HEIGHT - pt(self.y + dy_mm);
    self.current.line((pt(x0_mm), y), (pt(x1_mm), y), 0.5, color);
  }

  /// Image stretched into a `w_mm` by `h_mm` box whose top edge is at the
  /// cursor; advances by `advance_mm`.
  pub fn image(&mut self, img: Image, x_mm: f32, w_mm: f32, h_mm: f32, advance_mm: f32) {
    self.ensure(advance_mm.max(h_mm));
    self.images.push(img);
    let bottom = PAGE_HEIGHT - pt(self.y + h_mm);
    self
      .current
      .image(self.images.len(), pt(x_mm), bottom, pt(w_mm), pt(h_mm));
    self.y += advance_mm;
  }

  /// Page contents plus the images they reference.
  pub fn finish(mut self) -> (Vec<Content>, Vec<Image>) {
    self.pages.push(self.current);
    (self.pages, self.images)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn long_paragraph_breaks_pages() {
    let mut l = Layout::new();
    let text = "palavra ".repeat(3000);
    l.paragraph(&text, Font::Regular, 10.0, 7.0);
    assert!(l.y <= BOTTOM_MM);
    assert!(l.finish().0.len() > 1);
  }

  #[test]
  fn plain_text_records_every_line() {
    let mut l = Layout::new();
    l.centered("TÍTULO", Font::Bold, 16.0, 10.0);
    l.paragraph("corpo", Font::Regular, 10.0, 7.0);
    assert_eq!(l.plain_text(), "TÍTULO\ncorpo\n");
  }

  #[test]
  fn ensure_moves_to_fresh_page() {
    let mut l = Layout::new();
    l.gap(255.0);
    l.ensure(10.0);
    assert_eq!(l.y, TOP_MM);
    assert_eq!(l.finish().0.len(), 2);
  }

  #[test]
  fn image_breaks_page_when_box_does_not_fit() {
    use crate::image::tests::png;

    let mut l = Layout::new();
    l.gap(260.0);
    let img = Image::from_png(&png(1, 1, 0, &[0, 0])).unwrap();
    l.image(img, MARGIN_MM, 60.0, 20.0, 25.0);
    assert_eq!(l.y, TOP_MM + 25.0);

    let (pages, images) = l.finish();
    assert_eq!((pages.len(), images.len()), (2, 1));
    assert!(String::from_utf8_lossy(pages[1].as_bytes()).contains("/Im1 Do"));
  }
}
