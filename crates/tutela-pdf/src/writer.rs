//! Minimal PDF 1.4 object writer.
//!
//! Produces one uncompressed content stream per page, the two standard
//! Helvetica faces with WinAnsi encoding, PNG image XObjects and a classic
//! cross-reference table. No embedded fonts.

use std::fmt::Write as _;

use crate::{
  image::Image,
  text::{Font, encode_winansi, escape_literal},
};

/// A4 in points.
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;

/// RGB in `0.0..=1.0`.
pub type Rgb = (f32, f32, f32);

pub const BLACK: Rgb = (0.0, 0.0, 0.0);

// ─── Content streams ─────────────────────────────────────────────────────────

/// Drawing operators for one page, in PDF user space (origin bottom-left).
#[derive(Debug, Default, Clone)]
pub struct Content {
  ops: Vec<u8>,
}

impl Content {
  pub fn text(&mut self, x: f32, y: f32, font: Font, size: f32, color: Rgb, s: &str) {
    self.op(format_args!(
      "BT {r:.3} {g:.3} {b:.3} rg /{f} {size:.1} Tf {x:.2} {y:.2} Td (",
      r = color.0,
      g = color.1,
      b = color.2,
      f = font.resource(),
    ));
    self.ops.extend(escape_literal(&encode_winansi(s)));
    self.ops.extend_from_slice(b") Tj ET\n");
  }

  pub fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb) {
    self.op(format_args!(
      "{:.3} {:.3} {:.3} RG {width:.2} w {:.2} {:.2} m {:.2} {:.2} l S\n",
      color.0, color.1, color.2, from.0, from.1, to.0, to.1,
    ));
  }

  /// Filled and stroked rectangle with its lower-left corner at `(x, y)`.
  pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, stroke: Rgb, fill: Rgb) {
    self.op(format_args!(
      "q {:.3} {:.3} {:.3} RG {:.3} {:.3} {:.3} rg 0.5 w {x:.2} {y:.2} {w:.2} {h:.2} re B Q\n",
      stroke.0, stroke.1, stroke.2, fill.0, fill.1, fill.2,
    ));
  }

  /// Paint image `/Im<n>` into the box with lower-left corner `(x, y)`.
  pub fn image(&mut self, n: usize, x: f32, y: f32, w: f32, h: f32) {
    self.op(format_args!("q {w:.2} 0 0 {h:.2} {x:.2} {y:.2} cm /Im{n} Do Q\n"));
  }

  fn op(&mut self, args: std::fmt::Arguments<'_>) {
    let mut s = String::new();
    // Writing to a String cannot fail.
    let _ = s.write_fmt(args);
    self.ops.extend_from_slice(s.as_bytes());
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.ops
  }
}

// ─── File assembly ───────────────────────────────────────────────────────────

struct Objects {
  buf:     Vec<u8>,
  offsets: Vec<usize>,
}

impl Objects {
  fn push(&mut self, body: &[u8]) -> usize {
    self.offsets.push(self.buf.len());
    let id = self.offsets.len();
    self.buf.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
    self.buf.extend_from_slice(body);
    self.buf.extend_from_slice(b"\nendobj\n");
    id
  }
}

const CATALOG: usize = 1;
const PAGES: usize = 2;
const FONT_REGULAR: usize = 3;
const FONT_BOLD: usize = 4;
const INFO: usize = 5;
const FIRST_PAGE: usize = 6;

/// Assemble a complete PDF file from page contents. `title` goes into the
/// document information dictionary. `images[i]` is available to every page
/// as `/Im<i+1>`.
pub fn write_pdf(title: &str, pages: &[Content], images: &[Image]) -> Vec<u8> {
  let mut objs = Objects {
    buf:     b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec(),
    offsets: Vec::new(),
  };

  let kids: Vec<String> = (0..pages.len())
    .map(|i| format!("{} 0 R", FIRST_PAGE + 2 * i))
    .collect();

  // Image objects follow the pages; an alpha plane follows its image.
  let mut next = FIRST_PAGE + 2 * pages.len();
  let image_ids: Vec<(usize, Option<usize>)> = images
    .iter()
    .map(|img| {
      let id = next;
      next += 1;
      let smask = img.has_alpha().then(|| {
        next += 1;
        next - 1
      });
      (id, smask)
    })
    .collect();
  let xobjects = if image_ids.is_empty() {
    String::new()
  } else {
    let refs: Vec<String> = image_ids
      .iter()
      .enumerate()
      .map(|(i, (id, _))| format!("/Im{} {id} 0 R", i + 1))
      .collect();
    format!(" /XObject << {} >>", refs.join(" "))
  };

  objs.push(format!("<< /Type /Catalog /Pages {PAGES} 0 R >>").as_bytes());
  objs.push(
    format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), pages.len()).as_bytes(),
  );
  objs.push(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>");
  objs.push(
    b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
  );

  let mut info = b"<< /Producer (tutela-pdf) /Title (".to_vec();
  info.extend(escape_literal(&encode_winansi(title)));
  info.extend_from_slice(b") >>");
  objs.push(&info);

  for (i, page) in pages.iter().enumerate() {
    let contents = FIRST_PAGE + 2 * i + 1;
    objs.push(
      format!(
        "<< /Type /Page /Parent {PAGES} 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
         /Resources << /Font << /F1 {FONT_REGULAR} 0 R /F2 {FONT_BOLD} 0 R >>{xobjects} >> \
         /Contents {contents} 0 R >>"
      )
      .as_bytes(),
    );
    let bytes = page.as_bytes();
    let mut stream = format!("<< /Length {} >>\nstream\n", bytes.len()).into_bytes();
    stream.extend_from_slice(bytes);
    stream.extend_from_slice(b"\nendstream");
    objs.push(&stream);
  }

  for (img, (_, smask)) in images.iter().zip(&image_ids) {
    objs.push(&img.xobject(*smask));
    if let Some(mask) = img.smask() {
      objs.push(&mask);
    }
  }

  let Objects { mut buf, offsets } = objs;
  let xref_at = buf.len();
  let size = offsets.len() + 1;
  let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
  for off in &offsets {
    let _ = writeln!(xref, "{off:010} 00000 n ");
  }
  let _ = write!(
    xref,
    "trailer\n<< /Size {size} /Root {CATALOG} 0 R /Info {INFO} 0 R >>\nstartxref\n{xref_at}\n%%EOF\n"
  );
  buf.extend_from_slice(xref.as_bytes());
  buf
}
