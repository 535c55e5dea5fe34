use chrono::NaiveDate;
use tutela_core::{
  document::Document,
  medidas::TermoAlvo,
  observacao::Observacao,
  record::{Atendimento, Denuncia, Notificacao, TermoMedidas},
  signature::Assinatura,
};

use super::*;
use crate::text::{encode_winansi, escape_literal};

fn opts() -> PdfOptions {
  PdfOptions {
    generated_at: NaiveDate::from_ymd_opt(2024, 3, 5)
      .unwrap()
      .and_hms_opt(14, 30, 0)
      .unwrap(),
  }
}

/// Whether `s` appears as drawn text.
fn contains(pdf: &[u8], s: &str) -> bool {
  let needle = escape_literal(&encode_winansi(s));
  pdf.windows(needle.len()).any(|w| w == needle.as_slice())
}

fn denuncia(observacao: Option<String>) -> Document {
  Document::Denuncia(Denuncia {
    nr_denuncia:         7,
    descricao_fato:      Some("Criança sozinha em casa".into()),
    data:                Some("2024-01-10".into()),
    tipo_denuncia:       Some("Presencial".into()),
    pessoal_enf_entrada: 1,
    id_conselheiro:      None,
    data_averiguacao:    None,
    observacao,
  })
}

fn atendimento(relato: &str) -> Document {
  Document::Atendimento(Atendimento {
    id:                        3,
    data:                      Some("2024-02-01T03:00:00.000Z".into()),
    hora:                      Some("09:15:00".into()),
    relato:                    Some(relato.into()),
    id_direito_violado:        Some(1),
    direito_violado_descricao: Some("Educação".into()),
  })
}

fn termo(alvo: TermoAlvo, inciso: Option<i64>) -> Document {
  Document::Termo(alvo, TermoMedidas {
    id:        12,
    data:      Some("2024-01-22".into()),
    descricao: Some("Acompanhamento".into()),
    inciso,
  })
}

fn certificado() -> Assinatura {
  Assinatura {
    tipo: Some("certificado".into()),
    certificado: Some("TUlJQ..".into()),
    ..Assinatura::default()
  }
}

// ─── File names and titles ───────────────────────────────────────────────────

#[test]
fn file_names_follow_kind_and_id() {
  assert_eq!(file_name(&denuncia(None)), "Denuncia_7.pdf");
  assert_eq!(file_name(&atendimento("x")), "Atendimento_3.pdf");
  assert_eq!(
    file_name(&termo(TermoAlvo::Menor, None)),
    "TermoMedidasMenor_12.pdf"
  );
  assert_eq!(
    file_name(&termo(TermoAlvo::Responsavel, None)),
    "TermoMedidasResponsavel_12.pdf"
  );
  let n = Document::Notificacao(Notificacao {
    id:                 4,
    redator:            None,
    segunda_via:        None,
    id_conselheiro:     None,
    id_secretario:      None,
    id_medida_id_maior: None,
    data:               None,
    hora:               None,
  });
  assert_eq!(file_name(&n), "Notificacao_4.pdf");
}

#[test]
fn header_and_fields_are_printed() {
  let pdf = render(&atendimento("Relato curto"), None, &opts());
  assert!(pdf.bytes.starts_with(b"%PDF-1.4"));
  assert!(contains(&pdf.bytes, "FICHA DE ATENDIMENTO"));
  assert!(contains(&pdf.bytes, "Conselho Tutelar - Panambi"));
  assert!(contains(&pdf.bytes, "Rua: Hermann Mayer, 43, Térreo, Centro, Panambi/RS."));
  assert!(contains(&pdf.bytes, "Data: 01/02/2024"));
  assert!(contains(&pdf.bytes, "Hora: 09:15"));
  assert!(contains(&pdf.bytes, "Direito Violado: Educação"));
  assert_eq!(pdf.pages, 1);
}

#[test]
fn term_titles_and_clause() {
  let menor = render(&termo(TermoAlvo::Menor, Some(2)), None, &opts());
  assert!(contains(&menor.bytes, "(Criança/Adolescente)"));
  assert!(contains(&menor.bytes, "( II ) - orientação"));
  assert!(contains(&menor.bytes, "Art. 101"));

  let resp = render(&termo(TermoAlvo::Responsavel, Some(8)), None, &opts());
  assert!(contains(&resp.bytes, "(Responsável)"));
  assert!(contains(&resp.bytes, "( VIII ) - advertência"));
}

// ─── Complaint observation ───────────────────────────────────────────────────

#[test]
fn complaint_observation_is_decoded() {
  let obs = Observacao {
    identificacao:           "Maria".into(),
    criancas_adolescentes:   "João, 8 anos".into(),
    pais_responsaveis:       "N/A".into(),
    endereco:                "-".into(),
    conselheiro_averiguador: "Carlos".into(),
    assinatura:              Some(Assinatura::digital("Carlos")),
  };
  let pdf = render(&denuncia(Some(obs.encode().unwrap())), None, &opts());
  assert!(contains(&pdf.bytes, "Identificação: Maria"));
  assert!(contains(&pdf.bytes, "Crianças/Adolescentes: João, 8 anos"));
  assert!(!contains(&pdf.bytes, "Endereço: -"));
  // Signature recovered from the blob.
  assert!(contains(&pdf.bytes, "Ass. Digital: Carlos"));
}

#[test]
fn plain_text_observation_is_printed_verbatim() {
  let pdf = render(&denuncia(Some("texto livre".into())), None, &opts());
  assert!(contains(&pdf.bytes, "Observações:"));
  assert!(contains(&pdf.bytes, "texto livre"));
  assert!(contains(&pdf.bytes, ASSINATURA_PADRAO));
}

// ─── Signatures ──────────────────────────────────────────────────────────────

#[test]
fn default_signature_line() {
  let pdf = render(&atendimento("x"), None, &opts());
  assert!(contains(&pdf.bytes, "Ass. Digital Conselheiro (a) Tutelar"));
}

#[test]
fn certificate_seal_prints_content_digest() {
  let a = certificado();
  let pdf = render(&atendimento("x"), Some(&a), &opts());
  assert_eq!(pdf.digest.len(), 64);
  assert!(contains(&pdf.bytes, "(NÃO VERIFICADA)"));
  assert!(contains(&pdf.bytes, "Documento assinado digitalmente em 05/03/2024 14:30"));
  assert!(contains(&pdf.bytes, &pdf.digest));
}

#[test]
fn digest_tracks_document_text() {
  let a = certificado();
  let one = render(&atendimento("primeiro"), Some(&a), &opts());
  let again = render(&atendimento("primeiro"), Some(&a), &opts());
  let other = render(&atendimento("segundo"), Some(&a), &opts());
  assert_eq!(one.digest, again.digest);
  assert_ne!(one.digest, other.digest);
}

#[test]
fn image_signature_is_embedded() {
  let a = Assinatura {
    tipo: Some("fisica".into()),
    imagem: Some(crate::image::tests::red_pixel_url()),
    ..Assinatura::default()
  };
  let pdf = render(&denuncia(None), Some(&a), &opts());
  assert!(contains(&pdf.bytes, "Assinatura Física:"));
  assert!(contains(&pdf.bytes, "/Subtype /Image /Width 1 /Height 1"));
  assert!(contains(&pdf.bytes, "/Im1 Do"));
  assert!(contains(&pdf.bytes, "/SMask "));
  assert!(!contains(&pdf.bytes, "(Imagem de assinatura"));
}

#[test]
fn unreadable_image_signature_gets_caption() {
  let a = Assinatura {
    tipo: Some("fisica".into()),
    imagem: Some("data:image/png;base64,iVBORw0KGgo=".into()),
    ..Assinatura::default()
  };
  let pdf = render(&atendimento("x"), Some(&a), &opts());
  assert!(contains(&pdf.bytes, "Assinatura Física:"));
  assert!(contains(&pdf.bytes, "(Imagem de assinatura anexada, 8 bytes)"));
  assert!(!contains(&pdf.bytes, "/XObject"));
  assert_eq!(image_caption("data:image/png;base64,@@@"), "(Imagem de assinatura ilegível)");
}

#[test]
fn incomplete_signature_falls_back_to_default() {
  let a = Assinatura {
    tipo: Some("digital".into()),
    ..Assinatura::default()
  };
  let pdf = render(&atendimento("x"), Some(&a), &opts());
  assert!(contains(&pdf.bytes, ASSINATURA_PADRAO));
}

// ─── Layout ──────────────────────────────────────────────────────────────────

#[test]
fn long_report_spans_pages() {
  let relato = "O relato continua por muitas linhas. ".repeat(400);
  let pdf = render(&atendimento(&relato), None, &opts());
  assert!(pdf.pages > 1);
  assert!(contains(&pdf.bytes, &format!("/Count {}", pdf.pages)));
}

#[test]
fn save_writes_named_file() {
  let dir = std::env::temp_dir().join(format!("tutela-pdf-{}", std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = save(&denuncia(None), None, &opts(), &dir).unwrap();
  assert_eq!(path.file_name().unwrap(), "Denuncia_7.pdf");
  assert!(std::fs::read(&path).unwrap().ends_with(b"%%EOF\n"));
  std::fs::remove_dir_all(&dir).unwrap();
}
