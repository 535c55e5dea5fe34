//! Printable PDF forms for Tutela documents.
//!
//! Turns a [`Document`] from the merged list into a single-file A4 PDF with
//! the municipal header, the record's fields and a signature block (drawn
//! signatures are embedded as PNG images). Pure
//! synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use tutela_core::{document::Document, record::Notificacao};
//! use tutela_pdf::{PdfOptions, render};
//!
//! # fn demo(n: Notificacao) {
//! let doc = Document::Notificacao(n);
//! let pdf = render(&doc, None, &PdfOptions::now());
//! std::fs::write(&pdf.file_name, &pdf.bytes).unwrap();
//! # }
//! ```

pub mod error;
mod image;
mod layout;
mod render;
pub mod text;
mod writer;

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tutela_core::{
  document::{Document, DocumentKind},
  signature::Assinatura,
};

pub use error::{Error, Result};
pub use render::{ASSINATURA_PADRAO, image_caption};

// ─── Public types ────────────────────────────────────────────────────────────

/// Rendering parameters that do not come from the record.
#[derive(Debug, Clone)]
pub struct PdfOptions {
  /// Timestamp printed in a certificate seal.
  pub generated_at: NaiveDateTime,
}

impl PdfOptions {
  pub fn now() -> Self {
    Self { generated_at: Local::now().naive_local() }
  }
}

/// A rendered document.
#[derive(Debug, Clone)]
pub struct Rendered {
  pub file_name: String,
  pub bytes:     Vec<u8>,
  /// Hex SHA-256 of the document text above the signature block.
  pub digest:    String,
  pub pages:     usize,
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// `Denuncia_<id>.pdf`, `TermoMedidasMenor_<id>.pdf`, and so on.
pub fn file_name(doc: &Document) -> String {
  let stem = match doc.kind() {
    DocumentKind::Denuncia => "Denuncia",
    DocumentKind::Atendimento => "Atendimento",
    DocumentKind::Notificacao => "Notificacao",
    DocumentKind::TermoMedidasMenor => "TermoMedidasMenor",
    DocumentKind::TermoMedidasResponsavel => "TermoMedidasResponsavel",
  };
  format!("{stem}_{}.pdf", doc.id())
}

/// Render `doc`. `assinatura` overrides any signature stored with the record.
pub fn render(doc: &Document, assinatura: Option<&Assinatura>, opts: &PdfOptions) -> Rendered {
  let (layout, digest) = render::layout(doc, assinatura, opts);
  let (title, _) = render::titles(doc);
  let (pages, images) = layout.finish();
  Rendered {
    file_name: file_name(doc),
    bytes: writer::write_pdf(title, &pages, &images),
    digest,
    pages: pages.len(),
  }
}

/// Render `doc` into `dir` and return the written path.
pub fn save(
  doc: &Document,
  assinatura: Option<&Assinatura>,
  opts: &PdfOptions,
  dir: &Path,
) -> Result<PathBuf> {
  let rendered = render(doc, assinatura, opts);
  let path = dir.join(&rendered.file_name);
  std::fs::write(&path, &rendered.bytes).map_err(|source| Error::Write {
    path: path.clone(),
    source,
  })?;
  Ok(path)
}

#[cfg(test)]
mod tests;
