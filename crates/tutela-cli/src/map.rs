//! Viewport over the case-location map.

use tutela_core::record::Marcador;

/// Centre of Panambi/RS as `(latitude, longitude)`.
pub const CENTRO: (f64, f64) = (-28.2916, -53.5014);

const SPAN_INICIAL: f64 = 0.05;
const SPAN_MIN: f64 = 0.005;
const SPAN_MAX: f64 = 180.0;

/// Terminal cells are about twice as tall as wide, so the latitude range is
/// half the longitude range.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
  pub lat:    f64,
  pub lon:    f64,
  /// Half the visible longitude range, in degrees.
  pub span:   f64,
  /// Selected marker in the side list.
  pub cursor: usize,
}

impl Default for MapView {
  fn default() -> Self {
    Self { lat: CENTRO.0, lon: CENTRO.1, span: SPAN_INICIAL, cursor: 0 }
  }
}

impl MapView {
  pub fn x_bounds(&self) -> [f64; 2] {
    [self.lon - self.span, self.lon + self.span]
  }

  pub fn y_bounds(&self) -> [f64; 2] {
    [self.lat - self.span / 2.0, self.lat + self.span / 2.0]
  }

  pub fn zoom_in(&mut self) {
    self.span = (self.span / 2.0).max(SPAN_MIN);
  }

  pub fn zoom_out(&mut self) {
    self.span = (self.span * 2.0).min(SPAN_MAX);
  }

  /// Move by a quarter of the view in each unit direction.
  pub fn pan(&mut self, dx: f64, dy: f64) {
    self.lon = (self.lon + dx * self.span / 2.0).clamp(-180.0, 180.0);
    self.lat = (self.lat + dy * self.span / 4.0).clamp(-90.0, 90.0);
  }

  pub fn recenter(&mut self) {
    *self = Self { cursor: self.cursor, ..Self::default() };
  }

  pub fn contains(&self, lat: f64, lon: f64) -> bool {
    let [x0, x1] = self.x_bounds();
    let [y0, y1] = self.y_bounds();
    (x0..=x1).contains(&lon) && (y0..=y1).contains(&lat)
  }

  /// Centre the view on the selected marker.
  pub fn focus(&mut self, marcadores: &[Marcador]) {
    if let Some(m) = marcadores.get(self.cursor) {
      self.lat = m.latitude;
      self.lon = m.longitude;
    }
  }

  pub fn select(&mut self, step: isize, len: usize) {
    if len == 0 {
      self.cursor = 0;
      return;
    }
    self.cursor = (self.cursor as isize + step).clamp(0, len as isize - 1) as usize;
  }
}
