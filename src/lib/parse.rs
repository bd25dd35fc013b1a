#[cfg(feature = "tracing")]
use tracing::{debug, trace};

pub const COMMENT_PREFIX: &str = "#";
pub const ASSIGNMENT_OPERATOR: &str = "=";

/// Every physical line of an environment file, classified.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnvFile<'a> {
  pub lines: Vec<EnvLine<'a>>,
}

impl<'a> From<&'a str> for EnvFile<'a> {
  fn from(s: &'a str) -> Self {
    #[cfg(feature = "tracing")]
    debug!("Parsing env file with {} lines", s.lines().count());

    let lines = s
      .lines()
      .map(|line| {
        #[cfg(feature = "tracing")]
        trace!("Parsing line: {:?}", line);

        EnvLine::from(line)
      })
      .collect();

    Self { lines }
  }
}

impl<'a> EnvFile<'a> {
  pub fn get(&self, key: &str) -> Option<&EnvEntry<'a>> {
    self.lines.iter().find_map(|line| match line {
      EnvLine::Entry(entry) if entry.key == key => Some(entry),
      _ => None,
    })
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnvLine<'a> {
  Blank,
  /// Trimmed comment line, prefix included.
  Comment(&'a str),
  Entry(EnvEntry<'a>),
}

impl<'a> EnvLine<'a> {
  /// The trimmed text of the line.
  pub fn text(&self) -> &'a str {
    match self {
      EnvLine::Blank => "",
      EnvLine::Comment(comment) => comment,
      EnvLine::Entry(entry) => entry.raw,
    }
  }

  pub fn entry(&self) -> Option<&EnvEntry<'a>> {
    match self {
      EnvLine::Entry(entry) => Some(entry),
      _ => None,
    }
  }
}

impl<'a> From<&'a str> for EnvLine<'a> {
  fn from(s: &'a str) -> Self {
    let trimmed = s.trim();

    if trimmed.is_empty() {
      EnvLine::Blank
    } else if trimmed.starts_with(COMMENT_PREFIX) {
      EnvLine::Comment(trimmed)
    } else {
      EnvLine::Entry(trimmed.into())
    }
  }
}

/// A non-comment line. Lines without `=` are bare keys.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvEntry<'a> {
  pub key: &'a str,
  pub raw: &'a str,
}

impl<'a> EnvEntry<'a> {
  pub fn is_assignment(&self) -> bool {
    self.raw.contains(ASSIGNMENT_OPERATOR)
  }
}

impl<'a> From<&'a str> for EnvEntry<'a> {
  fn from(s: &'a str) -> Self {
    let raw = s.trim();
    let key = raw
      .split_once(ASSIGNMENT_OPERATOR)
      .map_or(raw, |(key, _)| key.trim());

    #[cfg(feature = "tracing")]
    trace!("Parsed entry: key={}", key);

    EnvEntry { key, raw }
  }
}
