//! The signature object captured alongside every document.
//!
//! Clients send one of three shapes: a certificate stub, a typed name, or a
//! hand-drawn/uploaded image encoded as a data URL. None of them is a
//! cryptographic signature; the payload is stored and echoed as-is.

use serde::{Deserialize, Serialize};

/// How a document was signed, derived from the payload's `tipo` and the
/// fields that accompany it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureKind {
  /// `tipo: "certificado"` with a certificate blob attached.
  Certificado,
  /// `tipo: "digital"` with a typed name.
  Digital,
  /// `tipo: "fisica"` with an image data URL.
  Fisica,
  /// Anything else, including a `tipo` whose companion field is missing.
  Padrao,
}

/// Client-captured signature payload.
///
/// The certificate password some clients attach is accepted on input but is
/// never serialized back out, so it never reaches the database or a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assinatura {
  pub tipo:        Option<String>,
  pub nome:        Option<String>,
  /// `data:image/png;base64,...`
  pub imagem:      Option<String>,
  /// Base64 of the uploaded certificate file.
  pub certificado: Option<String>,

  #[serde(rename = "senhaCertificado", skip_serializing)]
  pub senha_certificado: Option<serde_json::Value>,

  /// Unrecognised fields, preserved verbatim.
  #[serde(flatten)]
  pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Assinatura {
  /// A typed-name signature.
  pub fn digital(nome: impl Into<String>) -> Self {
    Self {
      tipo: Some("digital".into()),
      nome: Some(nome.into()),
      ..Self::default()
    }
  }

  pub fn kind(&self) -> SignatureKind {
    let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
    match self.tipo.as_deref() {
      Some("certificado") if filled(&self.certificado) => SignatureKind::Certificado,
      Some("digital") if filled(&self.nome) => SignatureKind::Digital,
      Some("fisica") if filled(&self.imagem) => SignatureKind::Fisica,
      _ => SignatureKind::Padrao,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kind_requires_companion_field() {
    let mut a = Assinatura { tipo: Some("certificado".into()), ..Default::default() };
    assert_eq!(a.kind(), SignatureKind::Padrao);
    a.certificado = Some("MIIB".into());
    assert_eq!(a.kind(), SignatureKind::Certificado);

    assert_eq!(Assinatura::digital("Ana").kind(), SignatureKind::Digital);
    assert_eq!(Assinatura::digital("").kind(), SignatureKind::Padrao);
  }

  #[test]
  fn certificate_password_is_never_serialized() {
    let a: Assinatura = serde_json::from_value(serde_json::json!({
      "tipo": "certificado",
      "certificado": "MIIB",
      "senhaCertificado": "hunter2",
      "infoCertificado": { "nome": "cert.pfx" }
    }))
    .unwrap();

    let out = serde_json::to_value(&a).unwrap();
    assert!(out.get("senhaCertificado").is_none());
    assert_eq!(out["infoCertificado"]["nome"], "cert.pfx");
    assert_eq!(out["certificado"], "MIIB");
  }
}
