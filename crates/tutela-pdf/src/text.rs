//! WinAnsi encoding, Helvetica metrics and line wrapping.

/// Which of the two standard fonts a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
  Regular,
  Bold,
}

impl Font {
  /// Resource name in the page dictionary.
  pub(crate) fn resource(self) -> &'static str {
    match self {
      Font::Regular => "F1",
      Font::Bold => "F2",
    }
  }
}

// ─── Encoding ────────────────────────────────────────────────────────────────

/// Encode `s` as WinAnsi bytes. Characters outside the code page become
/// `?`; tabs become spaces and other control characters are dropped.
pub fn encode_winansi(s: &str) -> Vec<u8> {
  s.chars().filter_map(winansi_byte).collect()
}

fn winansi_byte(c: char) -> Option<u8> {
  let b = match c {
    '\t' => b' ',
    c if c.is_control() => return None,
    ' '..='~' => c as u8,
    '\u{A0}'..='\u{FF}' => c as u32 as u8,
    '€' => 0x80,
    '‚' => 0x82,
    'ƒ' => 0x83,
    '„' => 0x84,
    '…' => 0x85,
    '†' => 0x86,
    '‡' => 0x87,
    'ˆ' => 0x88,
    '‰' => 0x89,
    'Š' => 0x8A,
    '‹' => 0x8B,
    'Œ' => 0x8C,
    'Ž' => 0x8E,
    '‘' => 0x91,
    '’' => 0x92,
    '“' => 0x93,
    '”' => 0x94,
    '•' => 0x95,
    '–' => 0x96,
    '—' => 0x97,
    '˜' => 0x98,
    '™' => 0x99,
    'š' => 0x9A,
    '›' => 0x9B,
    'œ' => 0x9C,
    'ž' => 0x9E,
    'Ÿ' => 0x9F,
    _ => b'?',
  };
  Some(b)
}

/// Escape encoded bytes for a PDF literal string.
pub(crate) fn escape_literal(bytes: &[u8]) -> Vec<u8> {
  let mut out = Vec::with_capacity(bytes.len() + 2);
  for &b in bytes {
    if matches!(b, b'\\' | b'(' | b')') {
      out.push(b'\\');
    }
    out.push(b);
  }
  out
}

// ─── Metrics ─────────────────────────────────────────────────────────────────

/// Helvetica advance widths for `' '..='~'`, in 1/1000 em.
const HELVETICA: [u16; 95] = [
  278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
  556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
  1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
  667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
  333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
  556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Bold glyphs run roughly this much wider than regular ones.
const BOLD_FACTOR: f32 = 1.06;

fn glyph_width(b: u8) -> u16 {
  match b {
    b' '..=b'~' => HELVETICA[usize::from(b - b' ')],
    // Accented capitals.
    0xC0..=0xDE => 722,
    _ => 556,
  }
}

/// Width of `s` in points at `size`.
pub fn text_width(s: &str, font: Font, size: f32) -> f32 {
  let units: u32 = encode_winansi(s)
    .into_iter()
    .map(|b| u32::from(glyph_width(b)))
    .sum();
  let w = units as f32 * size / 1000.0;
  match font {
    Font::Regular => w,
    Font::Bold => w * BOLD_FACTOR,
  }
}

// ─── Wrapping ────────────────────────────────────────────────────────────────

/// Break `s` into lines no wider than `max` points. Explicit newlines are
/// kept; words longer than a line are split by character.
pub fn wrap(s: &str, font: Font, size: f32, max: f32) -> Vec<String> {
  let mut lines = Vec::new();
  for para in s.split('\n') {
    let mut line = String::new();
    for word in para.split_whitespace() {
      let candidate = if line.is_empty() {
        word.to_owned()
      } else {
        format!("{line} {word}")
      };
      if text_width(&candidate, font, size) <= max {
        line = candidate;
        continue;
      }
      if !line.is_empty() {
        lines.push(std::mem::take(&mut line));
      }
      if text_width(word, font, size) <= max {
        line = word.to_owned();
      } else {
        for c in word.chars() {
          let mut next = line.clone();
          next.push(c);
          if !line.is_empty() && text_width(&next, font, size) > max {
            lines.push(std::mem::take(&mut line));
            line.push(c);
          } else {
            line = next;
          }
        }
      }
    }
    lines.push(line);
  }
  lines
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn portuguese_text_encodes_to_single_bytes() {
    assert_eq!(encode_winansi("Denúncia"), b"Den\xFAncia".to_vec());
    assert_eq!(encode_winansi("NOTIFICAÇÃO"), b"NOTIFICA\xC7\xC3O".to_vec());
    assert_eq!(encode_winansi("a\tb"), b"a b".to_vec());
    assert_eq!(encode_winansi("“x” – ok"), b"\x93x\x94 \x96 ok".to_vec());
    assert_eq!(encode_winansi("🔒"), b"?".to_vec());
  }

  #[test]
  fn literal_delimiters_are_escaped() {
    assert_eq!(escape_literal(b"(a\\b)"), b"\\(a\\\\b\\)".to_vec());
  }

  #[test]
  fn widths_follow_afm_metrics() {
    // "Hi" = 722 + 222
    assert!((text_width("Hi", Font::Regular, 10.0) - 9.44).abs() < 1e-4);
    assert!(text_width("Hi", Font::Bold, 10.0) > text_width("Hi", Font::Regular, 10.0));
  }

  #[test]
  fn wrap_respects_width_and_newlines() {
    let lines = wrap("um dois três\nquatro", Font::Regular, 10.0, 40.0);
    assert!(lines.len() >= 3);
    assert!(lines.iter().all(|l| text_width(l, Font::Regular, 10.0) <= 40.0));
    assert_eq!(lines.last().map(String::as_str), Some("quatro"));
  }

  #[test]
  fn long_words_are_split() {
    let word = "x".repeat(200);
    let lines = wrap(&word, Font::Regular, 10.0, 100.0);
    assert!(lines.len() > 1);
    assert_eq!(lines.concat(), word);
  }

  #[test]
  fn empty_input_is_one_empty_line() {
    assert_eq!(wrap("", Font::Regular, 10.0, 100.0), vec![String::new()]);
  }
}
