//! Name-based foreign-key resolution.
//!
//! Clients should send typed ids. Older clients send free text instead, which
//! is matched against lookup rows by case-insensitive substring.

/// Return the key of the first candidate, in the order given, whose label
/// contains `needle` ignoring case. Blank needles and blank labels never
/// match.
pub fn first_match<'a, I>(candidates: I, needle: &str) -> Option<i64>
where
  I: IntoIterator<Item = (i64, Option<&'a str>)>,
{
  let needle = needle.trim().to_lowercase();
  if needle.is_empty() {
    return None;
  }
  candidates
    .into_iter()
    .find(|(_, label)| label.is_some_and(|l| l.to_lowercase().contains(&needle)))
    .map(|(id, _)| id)
}

/// How a reference was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
  /// Explicit id from the request.
  Typed(i64),
  /// Matched an existing row by name.
  Matched(i64),
  /// No match; a new lookup row was inserted.
  Created(i64),
  Absent,
}

impl Resolution {
  pub fn id(self) -> Option<i64> {
    match self {
      Resolution::Typed(id) | Resolution::Matched(id) | Resolution::Created(id) => Some(id),
      Resolution::Absent => None,
    }
  }
}
