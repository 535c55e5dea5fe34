//! Per-kind page layout and the signature block.

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use sha2::{Digest, Sha256};
use tutela_core::{
  document::{Document, parse_date},
  medidas::TermoAlvo,
  observacao::{NAO_INFORMADO, Observacao},
  record::{Atendimento, Denuncia, Notificacao, TermoMedidas},
  signature::{Assinatura, SignatureKind},
};

use crate::{
  PdfOptions,
  image::Image,
  layout::{Layout, MARGIN_MM, TEXT_WIDTH_MM},
  text::Font,
  writer::{BLACK, Rgb},
};

pub const CABECALHO_TITULO: &str = "Conselho Tutelar - Panambi";
pub const CABECALHO_ENDERECO: &str = "Rua: Hermann Mayer, 43, Térreo, Centro, Panambi/RS.";
pub const CABECALHO_CONTATO: &str =
  "Fone (55) 3375 6592/84195737 Email: conselhotutelar@panambi.rs.gov.br";

pub const ASSINATURA_PADRAO: &str = "Ass. Digital Conselheiro (a) Tutelar";

const BODY: f32 = 10.0;
const LINE: f32 = 7.0;

const SEAL_STROKE: Rgb = (0.0, 0.4, 0.8);
const SEAL_FILL: Rgb = (0.94, 0.97, 1.0);
const DIGEST_GREY: Rgb = (0.39, 0.39, 0.39);

/// Title lines for each kind.
pub fn titles(doc: &Document) -> (&'static str, Option<&'static str>) {
  match doc {
    Document::Denuncia(_) => ("FICHA RECEBIMENTO DE DENÚNCIA", None),
    Document::Atendimento(_) => ("FICHA DE ATENDIMENTO", None),
    Document::Notificacao(_) => ("NOTIFICAÇÃO", None),
    Document::Termo(TermoAlvo::Menor, _) => {
      ("TERMO DE MEDIDAS APLICADAS", Some("(Criança/Adolescente)"))
    }
    Document::Termo(TermoAlvo::Responsavel, _) => {
      ("TERMO DE MEDIDAS APLICADAS", Some("(Responsável)"))
    }
  }
}

fn na(v: Option<&str>) -> &str {
  v.filter(|s| !s.is_empty()).unwrap_or(NAO_INFORMADO)
}

fn date_br(raw: Option<&str>) -> String {
  match raw {
    Some(r) => parse_date(r)
      .map(|d| d.format("%d/%m/%Y").to_string())
      .unwrap_or_else(|| r.to_owned()),
    None => NAO_INFORMADO.to_owned(),
  }
}

/// `HH:MM` from a stored time.
fn hora(raw: Option<&str>) -> String {
  match raw {
    Some(h) => h.chars().take(5).collect(),
    None => NAO_INFORMADO.to_owned(),
  }
}

// ─── Page ────────────────────────────────────────────────────────────────────

/// Lay out `doc` and return the layout plus the SHA-256 of the text above the
/// signature block.
pub(crate) fn layout(
  doc: &Document,
  assinatura: Option<&Assinatura>,
  opts: &PdfOptions,
) -> (Layout, String) {
  let mut l = Layout::new();
  header(&mut l, doc);

  let observacao = match doc {
    Document::Denuncia(d) => d.observacao.as_deref().map(|raw| (raw, Observacao::decode(raw))),
    _ => None,
  };

  match doc {
    Document::Denuncia(d) => denuncia(&mut l, d, observacao.as_ref()),
    Document::Atendimento(a) => atendimento(&mut l, a),
    Document::Notificacao(n) => notificacao(&mut l, n),
    Document::Termo(alvo, t) => termo(&mut l, *alvo, t),
  }

  let digest = hex::encode(Sha256::digest(l.plain_text().as_bytes()));

  // A complaint keeps its signature inside the observation blob.
  let stored = observacao.and_then(|(_, o)| o).and_then(|o| o.assinatura);
  let assinatura = assinatura.or(stored.as_ref());

  l.gap(10.0);
  signature_block(&mut l, assinatura, &digest, opts);
  (l, digest)
}

fn header(l: &mut Layout, doc: &Document) {
  let (title, subtitle) = titles(doc);
  match subtitle {
    Some(sub) => {
      l.centered(title, Font::Bold, 16.0, 5.0);
      l.centered(sub, Font::Bold, 12.0, 10.0);
    }
    None => l.centered(title, Font::Bold, 16.0, 10.0),
  }
  l.centered(CABECALHO_TITULO, Font::Regular, BODY, 5.0);
  l.centered(CABECALHO_ENDERECO, Font::Regular, BODY, 5.0);
  l.centered(CABECALHO_CONTATO, Font::Regular, BODY, 15.0);
  l.rule(1.4);
  l.gap(10.0);
}

fn section(l: &mut Layout, heading: &str) {
  l.line_at(MARGIN_MM, heading, Font::Bold, 12.0, BLACK, 10.0);
}

/// A wrapped field followed by the standard spacing.
fn field(l: &mut Layout, text: &str) {
  l.paragraph(text, Font::Regular, BODY, LINE);
  l.gap(5.0);
}

// ─── Kinds ───────────────────────────────────────────────────────────────────

fn denuncia(l: &mut Layout, d: &Denuncia, observacao: Option<&(&str, Option<Observacao>)>) {
  section(l, "DADOS DA DENÚNCIA");
  field(l, &format!("Número da Denúncia: {}", d.nr_denuncia));
  field(l, &format!("Data: {}", date_br(d.data.as_deref())));
  field(l, &format!("Tipo de Denúncia: {}", na(d.tipo_denuncia.as_deref())));
  field(l, "Descrição dos Fatos:");
  field(l, na(d.descricao_fato.as_deref()));

  match observacao {
    Some((_, Some(o))) => {
      let mut lines = vec![
        format!("Identificação: {}", o.identificacao),
        format!("Crianças/Adolescentes: {}", o.criancas_adolescentes),
        format!("Pais/Responsáveis: {}", o.pais_responsaveis),
      ];
      if o.endereco != "-" {
        lines.push(format!("Endereço: {}", o.endereco));
      }
      lines.push(format!("Conselheiro Averiguador: {}", o.conselheiro_averiguador));
      field(l, "Observações:");
      field(l, &lines.join("\n"));
    }
    Some((raw, None)) if !raw.is_empty() => {
      field(l, "Observações:");
      field(l, raw);
    }
    _ => {}
  }

  if d.data_averiguacao.is_some() {
    field(
      l,
      &format!("Data de Averiguação: {}", date_br(d.data_averiguacao.as_deref())),
    );
  }
}

fn atendimento(l: &mut Layout, a: &Atendimento) {
  section(l, "DADOS DO ATENDIMENTO");
  field(l, &format!("ID do Atendimento: {}", a.id));
  field(l, &format!("Data: {}", date_br(a.data.as_deref())));
  field(l, &format!("Hora: {}", hora(a.hora.as_deref())));
  if let Some(direito) = a.direito_violado_descricao.as_deref() {
    field(l, &format!("Direito Violado: {direito}"));
  }
  field(l, "Relato:");
  l.paragraph(na(a.relato.as_deref()), Font::Regular, BODY, LINE);
}

fn notificacao(l: &mut Layout, n: &Notificacao) {
  section(l, "DADOS DA NOTIFICAÇÃO");
  field(l, &format!("ID da Notificação: {}", n.id));
  if n.data.is_some() {
    field(l, &format!("Data: {}", date_br(n.data.as_deref())));
  }
  if let Some(redator) = n.redator.as_deref() {
    field(l, &format!("Nome de quem recebeu: {redator}"));
  }
  if let Some(texto) = n.segunda_via.as_deref() {
    field(l, "Segue abaixo a segunda via da Convocação:");
    l.paragraph(texto, Font::Regular, BODY, LINE);
  }
}

fn termo(l: &mut Layout, alvo: TermoAlvo, t: &TermoMedidas) {
  section(l, "DADOS DO TERMO");
  field(l, &format!("ID do Termo: {}", t.id));
  field(l, &format!("Data: {}", date_br(t.data.as_deref())));

  let clause = t
    .inciso
    .and_then(|n| u8::try_from(n).ok())
    .and_then(|n| alvo.clause_label(n));
  if let Some(label) = clause {
    field(l, &format!("Medida aplicada {}", alvo.artigo()));
    field(l, &label);
  } else if let Some(n) = t.inciso {
    field(l, &format!("Inciso: {n}"));
  }

  field(l, "Descrição:");
  l.paragraph(na(t.descricao.as_deref()), Font::Regular, BODY, LINE);
}

// ─── Signature ───────────────────────────────────────────────────────────────

fn signature_block(l: &mut Layout, assinatura: Option<&Assinatura>, digest: &str, opts: &PdfOptions) {
  let kind = assinatura.map_or(SignatureKind::Padrao, Assinatura::kind);
  match (kind, assinatura) {
    (SignatureKind::Certificado, _) => seal(l, digest, opts),
    (SignatureKind::Digital, Some(a)) => {
      let nome = a.nome.as_deref().unwrap_or_default();
      l.line_at(MARGIN_MM, &format!("Ass. Digital: {nome}"), Font::Regular, 9.0, BLACK, 5.0);
    }
    (SignatureKind::Fisica, Some(a)) => {
      l.line_at(MARGIN_MM, "Assinatura Física:", Font::Regular, 9.0, BLACK, 5.0);
      let data_url = a.imagem.as_deref().unwrap_or_default();
      match Image::from_data_url(data_url) {
        Ok(img) => l.image(img, MARGIN_MM, SIGNATURE_W, SIGNATURE_H, SIGNATURE_H + 5.0),
        Err(_) => l.line_at(MARGIN_MM, &image_caption(data_url), Font::Regular, 9.0, BLACK, 5.0),
      }
    }
    _ => l.line_at(MARGIN_MM, ASSINATURA_PADRAO, Font::Regular, 9.0, BLACK, 5.0),
  }
}

/// Box for a drawn or uploaded signature, in millimetres.
const SIGNATURE_W: f32 = 60.0;
const SIGNATURE_H: f32 = 20.0;

/// Caption standing in for a signature image that cannot be drawn.
pub fn image_caption(data_url: &str) -> String {
  let payload = data_url
    .split_once(',')
    .map_or(data_url, |(_, rest)| rest)
    .trim();
  match B64.decode(payload) {
    Ok(bytes) if !bytes.is_empty() => {
      format!("(Imagem de assinatura anexada, {} bytes)", bytes.len())
    }
    _ => "(Imagem de assinatura ilegível)".to_owned(),
  }
}

const SEAL_HEIGHT: f32 = 35.0;

/// Framed notice for a certificate-backed signature. The certificate is
/// never opened or checked, and the digest covers the document text only.
fn seal(l: &mut Layout, digest: &str, opts: &PdfOptions) {
  l.ensure(SEAL_HEIGHT + 5.0);
  let x = MARGIN_MM;
  let w = TEXT_WIDTH_MM;
  l.frame(x, w, SEAL_HEIGHT, SEAL_STROKE, SEAL_FILL);
  l.rule_between(x + 5.0, x + w - 5.0, 12.0, SEAL_STROKE);

  l.gap(8.0);
  l.line_at(
    x + 5.0,
    "ASSINATURA COM CERTIFICADO DIGITAL (NÃO VERIFICADA)",
    Font::Bold,
    8.0,
    SEAL_STROKE,
    12.0,
  );
  let quando = opts.generated_at.format("%d/%m/%Y %H:%M");
  l.line_at(
    x + 20.0,
    &format!("Documento assinado digitalmente em {quando}"),
    Font::Regular,
    7.0,
    BLACK,
    7.0,
  );
  l.line_at(
    x + 20.0,
    "Certificado anexado; autenticidade não verificada por este sistema",
    Font::Regular,
    7.0,
    BLACK,
    6.0,
  );
  l.line_at(
    x + 5.0,
    &format!("Resumo SHA-256 do conteúdo (não é assinatura): {digest}"),
    Font::Regular,
    5.0,
    DIGEST_GREY,
    7.0,
  );
}
