//! Data-entry forms for the five document kinds, council members and map
//! markers.
//!
//! A form is a flat list of fields keyed by their wire names. Submitting
//! walks the fields into a JSON body; the phase tracks
//! `editing → submitting → (success | error)`. Only document forms carry a
//! signature row.

use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use chrono::{NaiveDate, NaiveTime};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use serde_json::{Map, Value};
use tutela_core::{
  document::DocumentKind,
  medidas::{TermoAlvo, romano},
  record::Conselheiro,
  signature::Assinatura,
};

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum FormError {
  #[error("Data inválida em \"{0}\" (use AAAA-MM-DD)")]
  Date(String),

  #[error("Hora inválida em \"{0}\" (use HH:MM)")]
  Time(String),

  #[error("Número inválido em \"{0}\"")]
  Number(String),

  #[error("Não foi possível ler {path}: {source}")]
  Read {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("{0} não é uma imagem PNG")]
  NotPng(PathBuf),

  #[error("Informe {0}")]
  Missing(&'static str),

  #[error("Assinatura inválida: {0}")]
  Encode(#[from] serde_json::Error),
}

// ─── Fields ───────────────────────────────────────────────────────────────────

/// Which list a picker field chooses from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
  Conselheiro,
  Direito,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
  Text,
  Date,
  Time,
  /// Decimal number, sent as a JSON number.
  Number,
  /// Cycled with ←/→.
  Choice(&'static [&'static str]),
  /// Toggled with space.
  Flag,
  /// Free text plus an optional id picked from a loaded list. The id goes out
  /// under `id_key` when one was picked.
  Picker {
    lookup: Lookup,
    id_key: Option<&'static str>,
  },
}

#[derive(Debug, Clone)]
pub struct Field {
  pub key:    &'static str,
  pub label:  String,
  pub kind:   FieldKind,
  pub value:  String,
  pub on:     bool,
  pub choice: usize,
  pub picked: Option<i64>,
}

impl Field {
  fn new(key: &'static str, label: impl Into<String>, kind: FieldKind) -> Self {
    Self {
      key,
      label: label.into(),
      kind,
      value: String::new(),
      on: false,
      choice: 0,
      picked: None,
    }
  }

  fn text(key: &'static str, label: &str) -> Self {
    Self::new(key, label, FieldKind::Text)
  }

  fn with_value(mut self, value: Option<&str>) -> Self {
    self.value = value.unwrap_or_default().to_owned();
    self
  }

  /// Select the choice named `option`; unknown names leave it unchanged.
  fn choose(mut self, option: Option<&str>) -> Self {
    if let (FieldKind::Choice(opts), Some(option)) = (&self.kind, option) {
      if let Some(i) = opts.iter().position(|o| *o == option) {
        self.choice = i;
      }
    }
    self
  }

  /// What the field shows on screen.
  pub fn display(&self) -> String {
    match &self.kind {
      FieldKind::Flag => (if self.on { "[x]" } else { "[ ]" }).to_owned(),
      FieldKind::Choice(opts) => format!("< {} >", opts.get(self.choice).unwrap_or(&"")),
      FieldKind::Picker { .. } => match self.picked {
        Some(id) => format!("{} (#{id})", self.value),
        None => self.value.clone(),
      },
      _ => self.value.clone(),
    }
  }

  pub fn takes_text(&self) -> bool {
    !matches!(self.kind, FieldKind::Flag | FieldKind::Choice(_))
  }
}

// ─── Signature ────────────────────────────────────────────────────────────────

/// Signature capture mode. The free-text input means a file path for
/// `Certificado` and `Imagem`, a name for `Digital`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureMode {
  #[default]
  Nenhuma,
  Certificado,
  Digital,
  Imagem,
}

impl SignatureMode {
  const ALL: [SignatureMode; 4] = [
    SignatureMode::Nenhuma,
    SignatureMode::Certificado,
    SignatureMode::Digital,
    SignatureMode::Imagem,
  ];

  pub fn label(self) -> &'static str {
    match self {
      SignatureMode::Nenhuma => "Padrão (sem assinatura)",
      SignatureMode::Certificado => "Certificado digital (arquivo)",
      SignatureMode::Digital => "Nome digitado",
      SignatureMode::Imagem => "Imagem PNG (arquivo)",
    }
  }

  pub fn input_hint(self) -> Option<&'static str> {
    match self {
      SignatureMode::Nenhuma => None,
      SignatureMode::Certificado | SignatureMode::Imagem => Some("caminho do arquivo"),
      SignatureMode::Digital => Some("nome"),
    }
  }

  fn cycle(self, step: isize) -> Self {
    let i = Self::ALL.iter().position(|m| *m == self).unwrap_or(0) as isize;
    let n = Self::ALL.len() as isize;
    Self::ALL[(i + step).rem_euclid(n) as usize]
  }
}

#[derive(Debug, Clone, Default)]
pub struct SignatureInput {
  pub mode:  SignatureMode,
  pub input: String,
}

impl SignatureInput {
  /// Build the payload; reads the certificate or image file from disk.
  pub fn build(&self) -> Result<Option<Assinatura>, FormError> {
    let input = self.input.trim();
    match self.mode {
      SignatureMode::Nenhuma => Ok(None),
      SignatureMode::Digital if input.is_empty() => Err(FormError::Missing("o nome da assinatura")),
      SignatureMode::Digital => Ok(Some(Assinatura::digital(input))),
      SignatureMode::Certificado | SignatureMode::Imagem if input.is_empty() => {
        Err(FormError::Missing("o caminho do arquivo de assinatura"))
      }
      SignatureMode::Certificado => {
        let bytes = read(Path::new(input))?;
        Ok(Some(Assinatura {
          tipo: Some("certificado".into()),
          certificado: Some(B64.encode(bytes)),
          ..Assinatura::default()
        }))
      }
      SignatureMode::Imagem => {
        let path = Path::new(input);
        let bytes = read(path)?;
        if !bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
          return Err(FormError::NotPng(path.to_owned()));
        }
        Ok(Some(Assinatura {
          tipo: Some("fisica".into()),
          imagem: Some(format!("data:image/png;base64,{}", B64.encode(bytes))),
          ..Assinatura::default()
        }))
      }
    }
  }
}

fn read(path: &Path) -> Result<Vec<u8>, FormError> {
  std::fs::read(path).map_err(|source| FormError::Read { path: path.to_owned(), source })
}

// ─── Form ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
  Editing,
  Submitting,
  Success(String),
  Error(String),
}

/// What a form creates or edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTarget {
  Documento(DocumentKind),
  /// `None` registers a new member; `Some(id)` edits that one.
  Conselheiro(Option<i64>),
  Marcador,
}

pub struct Form {
  pub target:    FormTarget,
  pub fields:    Vec<Field>,
  pub signature: SignatureInput,
  /// Index into `fields`; `fields.len()` is the signature row on document
  /// forms.
  pub focus:     usize,
  pub phase:     Phase,
  today:         NaiveDate,
}

const TIPO_PESSOA: &[&str] = &["identificada", "anonima"];
const CARGOS: &[&str] = &["conselheiro", "secretario"];
const TIPOS_DOCUMENTO: &[&str] = &[
  "denuncia",
  "atendimento",
  "notificacao",
  "termo-medidas-menor",
  "termo-medidas-responsavel",
];

/// Split a stored `"(DDD) number"` contact. Anything else is all number.
pub fn split_contato(contato: &str) -> (String, String) {
  let parsed = contato.trim().strip_prefix('(').and_then(|rest| {
    let (ddd, number) = rest.split_once(')')?;
    let number = number.trim();
    (!ddd.is_empty() && ddd.bytes().all(|b| b.is_ascii_digit()) && !number.is_empty())
      .then(|| (ddd.to_owned(), number.to_owned()))
  });
  parsed.unwrap_or_else(|| (String::new(), contato.trim().to_owned()))
}

fn member_fields(existing: Option<&Conselheiro>) -> Vec<Field> {
  let value = |get: fn(&Conselheiro) -> Option<&str>| existing.and_then(get);
  let (ddd, numero) = value(|c| c.contato.as_deref()).map(split_contato).unzip();
  vec![
    Field::text("nome", "Nome").with_value(value(|c| c.nome.as_deref())),
    Field::new("cargo", "Cargo", FieldKind::Choice(CARGOS))
      .choose(existing.and_then(|c| c.cargo.as_ref()).map(|c| c.as_ref())),
    Field::text("cpf", "CPF").with_value(value(|c| c.cpf.as_deref())),
    Field::text("rg", "RG").with_value(value(|c| c.rg.as_deref())),
    Field::new("dataNascimento", "Data de nascimento", FieldKind::Date)
      .with_value(value(|c| c.data_nascimento.as_deref())),
    Field::text("nacionalidade", "Nacionalidade").with_value(value(|c| c.nacionalidade.as_deref())),
    Field::text("endereco", "Endereço").with_value(value(|c| c.endereco.as_deref())),
    Field::text("celularDDD", "DDD").with_value(ddd.as_deref()),
    Field::text("celularNumero", "Celular").with_value(numero.as_deref()),
  ]
}

fn marker_fields(at: (f64, f64), documento: Option<(DocumentKind, i64)>) -> Vec<Field> {
  let tipo = documento.map(|(kind, _)| kind.as_ref().to_owned());
  let id = documento.map(|(_, id)| id.to_string());
  vec![
    Field::new("latitude", "Latitude", FieldKind::Number).with_value(Some(&at.0.to_string())),
    Field::new("longitude", "Longitude", FieldKind::Number).with_value(Some(&at.1.to_string())),
    Field::new("tipoDocumento", "Tipo de documento", FieldKind::Choice(TIPOS_DOCUMENTO))
      .choose(tipo.as_deref()),
    Field::text("idDocumento", "Número do documento").with_value(id.as_deref()),
    Field::text("endereco", "Endereço"),
    Field::text("descricao", "Descrição"),
  ]
}

fn fields_for(kind: DocumentKind, today: NaiveDate) -> Vec<Field> {
  let date = |key: &'static str, label: &str| {
    let mut f = Field::new(key, label, FieldKind::Date);
    f.value = today.format("%Y-%m-%d").to_string();
    f
  };
  let time = |key: &'static str, label: &str| Field::new(key, label, FieldKind::Time);
  let conselheiro = |key: &'static str, label: &str, id_key: Option<&'static str>| {
    Field::new(key, label, FieldKind::Picker { lookup: Lookup::Conselheiro, id_key })
  };

  match kind {
    DocumentKind::Denuncia => vec![
      date("dataDenuncia", "Data"),
      time("horaDenuncia", "Hora"),
      Field::new("tipoPessoa", "Denunciante", FieldKind::Choice(TIPO_PESSOA)),
      Field::text("identificacaoDenunciante", "Identificação do denunciante"),
      Field::text("fatos", "Fatos"),
      Field::text("nomeDataNascimentoCriancaAdolescente", "Crianças/adolescentes"),
      Field::text("nomesPaisResponsaveis", "Pais/responsáveis"),
      Field::text("endereco", "Endereço"),
      conselheiro("conselheiroRecebeu", "Conselheiro que recebeu", Some("idConselheiro")),
      Field::new("dataAveriguacao", "Data da averiguação", FieldKind::Date),
      conselheiro("conselheiroEfetuouAveriguacao", "Conselheiro averiguador", None),
    ],
    DocumentKind::Atendimento => vec![
      date("dataAtendimento", "Data"),
      time("horaAtendimento", "Hora"),
      Field::new(
        "direitoViolado",
        "Direito violado",
        FieldKind::Picker { lookup: Lookup::Direito, id_key: Some("idDireitoViolado") },
      ),
      Field::text("relatos", "Relato"),
      Field::text("quemEhOViolador", "Violador"),
    ],
    DocumentKind::Notificacao => vec![
      date("dataNotificacao", "Data"),
      time("horaNotificacao", "Hora"),
      Field::text("nomeQuemRecebeu", "Nome de quem recebeu"),
      Field::text("segundaViaConvocacao", "Segunda via da convocação"),
    ],
    DocumentKind::TermoMedidasMenor | DocumentKind::TermoMedidasResponsavel => {
      let alvo = kind.termo_alvo().unwrap_or(TermoAlvo::Menor);
      let mut fields = vec![
        date("dataTermo", "Data"),
        time("horaTermo", "Hora"),
        Field::text("aplicacaoMedidasTexto", "Descrição das medidas"),
      ];
      fields.extend((1..=alvo.clause_count()).filter_map(|n| {
        let key = MEDIDA_KEYS.get(usize::from(n) - 1)?;
        let label = alvo
          .clause_label(n)
          .unwrap_or_else(|| romano(n).unwrap_or_default().to_owned());
        Some(Field::new(*key, label, FieldKind::Flag))
      }));
      fields
    }
  }
}

const MEDIDA_KEYS: [&str; 8] = [
  "medidaI", "medidaII", "medidaIII", "medidaIV", "medidaV", "medidaVI", "medidaVII",
  "medidaVIII",
];

impl Form {
  fn with_fields(target: FormTarget, fields: Vec<Field>, today: NaiveDate) -> Self {
    Self {
      target,
      fields,
      signature: SignatureInput::default(),
      focus: 0,
      phase: Phase::Editing,
      today,
    }
  }

  /// Blank document form; dates start at `today`.
  pub fn new(kind: DocumentKind, today: NaiveDate) -> Self {
    Self::with_fields(FormTarget::Documento(kind), fields_for(kind, today), today)
  }

  /// Member registration, or editing `existing` with its values filled in.
  pub fn conselheiro(existing: Option<&Conselheiro>, today: NaiveDate) -> Self {
    let target = FormTarget::Conselheiro(existing.map(|c| c.id));
    Self::with_fields(target, member_fields(existing), today)
  }

  /// New map marker at `at` (`(latitude, longitude)`), optionally tied to a
  /// document.
  pub fn marcador(at: (f64, f64), documento: Option<(DocumentKind, i64)>, today: NaiveDate) -> Self {
    Self::with_fields(FormTarget::Marcador, marker_fields(at, documento), today)
  }

  pub fn title(&self) -> &'static str {
    match self.target {
      FormTarget::Documento(DocumentKind::Denuncia) => "Ficha de Recebimento de Denúncia",
      FormTarget::Documento(DocumentKind::Atendimento) => "Ficha de Atendimento",
      FormTarget::Documento(DocumentKind::Notificacao) => "Notificação",
      FormTarget::Documento(DocumentKind::TermoMedidasMenor) => {
        "Termo de Medidas (Criança/Adolescente)"
      }
      FormTarget::Documento(DocumentKind::TermoMedidasResponsavel) => {
        "Termo de Medidas (Responsável)"
      }
      FormTarget::Conselheiro(None) => "Cadastrar Profissional",
      FormTarget::Conselheiro(Some(_)) => "Editar Profissional",
      FormTarget::Marcador => "Novo Marcador no Mapa",
    }
  }

  pub fn has_signature(&self) -> bool {
    matches!(self.target, FormTarget::Documento(_))
  }

  /// Focusable rows: the fields plus the signature row, if any.
  fn rows(&self) -> usize {
    self.fields.len() + usize::from(self.has_signature())
  }

  pub fn on_signature(&self) -> bool {
    self.has_signature() && self.focus == self.fields.len()
  }

  pub fn focused(&self) -> Option<&Field> {
    self.fields.get(self.focus)
  }

  fn focused_mut(&mut self) -> Option<&mut Field> {
    self.fields.get_mut(self.focus)
  }

  /// Any edit after a finished submission starts a new one.
  fn touch(&mut self) {
    if matches!(self.phase, Phase::Success(_) | Phase::Error(_)) {
      self.phase = Phase::Editing;
    }
  }

  // ── Navigation and editing ──────────────────────────────────────────────────

  pub fn next(&mut self) {
    self.focus = (self.focus + 1) % self.rows().max(1);
  }

  pub fn prev(&mut self) {
    let n = self.rows().max(1);
    self.focus = (self.focus + n - 1) % n;
  }

  pub fn input(&mut self, c: char) {
    self.touch();
    if self.on_signature() {
      self.signature.input.push(c);
      return;
    }
    if let Some(f) = self.focused_mut() {
      if f.takes_text() {
        f.value.push(c);
        f.picked = None;
      } else if c == ' ' {
        f.on = !f.on;
      }
    }
  }

  pub fn backspace(&mut self) {
    self.touch();
    if self.on_signature() {
      self.signature.input.pop();
    } else if let Some(f) = self.focused_mut() {
      if f.takes_text() {
        f.value.pop();
        f.picked = None;
      }
    }
  }

  /// ←/→ on a choice or on the signature mode.
  pub fn cycle(&mut self, step: isize) {
    self.touch();
    if self.on_signature() {
      self.signature.mode = self.signature.mode.cycle(step);
      return;
    }
    if let Some(f) = self.focused_mut() {
      if let FieldKind::Choice(opts) = f.kind {
        let n = opts.len() as isize;
        f.choice = (f.choice as isize + step).rem_euclid(n) as usize;
      }
    }
  }

  /// Record a pick from the lookup list for the focused field.
  pub fn pick(&mut self, id: i64, label: &str) {
    self.touch();
    if let Some(f) = self.focused_mut() {
      f.value = label.to_owned();
      f.picked = Some(id);
    }
  }

  /// The lookup list behind the focused field, if it is a picker.
  pub fn focused_lookup(&self) -> Option<Lookup> {
    match self.focused()?.kind {
      FieldKind::Picker { lookup, .. } => Some(lookup),
      _ => None,
    }
  }

  // ── Submission ──────────────────────────────────────────────────────────────

  /// JSON body with wire names. Blank text goes out as `null`; document
  /// bodies also carry `assinatura`.
  pub fn to_body(&self) -> Result<Value, FormError> {
    let mut body = Map::new();
    for f in &self.fields {
      let text = f.value.trim();
      let value = match &f.kind {
        FieldKind::Flag => Value::Bool(f.on),
        FieldKind::Choice(opts) => opts.get(f.choice).map_or(Value::Null, |s| Value::from(*s)),
        _ if text.is_empty() => Value::Null,
        FieldKind::Date => {
          NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| FormError::Date(f.label.clone()))?;
          Value::from(text)
        }
        FieldKind::Time => {
          NaiveTime::parse_from_str(text, "%H:%M").map_err(|_| FormError::Time(f.label.clone()))?;
          Value::from(text)
        }
        FieldKind::Number => {
          let n: f64 = text
            .replace(',', ".")
            .parse()
            .map_err(|_| FormError::Number(f.label.clone()))?;
          Value::from(n)
        }
        FieldKind::Picker { id_key, .. } => {
          if let (Some(k), Some(id)) = (id_key, f.picked) {
            body.insert((*k).to_owned(), Value::from(id));
          }
          Value::from(text)
        }
        FieldKind::Text => Value::from(text),
      };
      body.insert(f.key.to_owned(), value);
    }

    if self.has_signature() {
      let assinatura = self.signature.build()?;
      body.insert("assinatura".into(), serde_json::to_value(assinatura)?);
    }
    Ok(Value::Object(body))
  }

  /// Move to `Submitting` and return the body to send. `None` while a
  /// submission is already in flight or when the body is invalid; the latter
  /// leaves the phase at `Error`.
  pub fn begin_submit(&mut self) -> Option<Value> {
    if self.phase == Phase::Submitting {
      return None;
    }
    match self.to_body() {
      Ok(body) => {
        self.phase = Phase::Submitting;
        Some(body)
      }
      Err(e) => {
        self.phase = Phase::Error(e.to_string());
        None
      }
    }
  }

  /// Settle a submission. Success clears document and registration forms;
  /// an edit keeps its values.
  pub fn finish(&mut self, result: Result<String, String>) {
    match result {
      Ok(message) => {
        match self.target {
          FormTarget::Documento(kind) => self.fields = fields_for(kind, self.today),
          FormTarget::Conselheiro(None) => self.fields = member_fields(None),
          FormTarget::Conselheiro(Some(_)) | FormTarget::Marcador => {}
        }
        self.signature = SignatureInput::default();
        self.focus = 0;
        self.phase = Phase::Success(message);
      }
      Err(message) => self.phase = Phase::Error(message),
    }
  }
}

// ─── Fuzzy lookup ─────────────────────────────────────────────────────────────

/// Items whose label fuzzy-matches `query`, best first. An empty query keeps
/// every item in its original order.
pub fn rank<'a, T>(items: &'a [T], label: impl Fn(&T) -> &str, query: &str) -> Vec<&'a T> {
  let query = query.trim();
  if query.is_empty() {
    return items.iter().collect();
  }
  let matcher = SkimMatcherV2::default().ignore_case();
  let mut scored: Vec<(i64, &T)> = items
    .iter()
    .filter_map(|it| matcher.fuzzy_match(label(it), query).map(|s| (s, it)))
    .collect();
  scored.sort_by(|a, b| b.0.cmp(&a.0));
  scored.into_iter().map(|(_, it)| it).collect()
}
