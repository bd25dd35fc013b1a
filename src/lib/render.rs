//! Rendering of the environment file.
//!
//! The file starts with a fixed banner, followed by one boxed heading per
//! section and that section's entries:
//!
//! ```text
//! # +---------------------+
//! # |       Api Keys
//! # +---------------------+
//! API_KEY=""
//! API_URL=https://example.test
//! ```
//!
//! Entries of declared sections are sorted, custom entries keep file order.

use std::borrow::Cow;

use indexmap::IndexMap;

use crate::declaration::Declaration;
use crate::parse::{ASSIGNMENT_OPERATOR, COMMENT_PREFIX};

/// Synthetic section collecting every line no declared key claims.
pub const CUSTOM_SECTION: &str = "customVariables";

/// Section name → lines, in render order.
pub type SectionBuckets<'a> = IndexMap<String, Vec<Cow<'a, str>>>;

const HEADING_WIDTH: usize = 21;
const HEADING_MARKER: &str = "# |";

const BANNER: [&str; 4] = [
  "# ###############################################",
  "#  Environment variables",
  "#  Missing keys are added by env-setup. Fill in the values below.",
  "# ###############################################",
];

fn rule() -> String {
  format!("# +{}+", "-".repeat(HEADING_WIDTH))
}

/// `featureFlags` → `Feature Flags`.
pub fn friendly_name(section: &str) -> String {
  let mut spaced = String::with_capacity(section.len() + 4);
  for (i, c) in section.chars().enumerate() {
    if i > 0 && c.is_uppercase() {
      spaced.push(' ');
    }
    spaced.push(c);
  }

  let mut chars = spaced.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

/// Three heading lines for `section`. The name is padded against a fixed
/// width, so long names are not centered.
pub fn heading(section: &str) -> [String; 3] {
  let name = friendly_name(section);
  let pad = HEADING_WIDTH.saturating_sub(name.chars().count()) / 2;

  [
    rule(),
    format!("{} {}{}", HEADING_MARKER, " ".repeat(pad), name),
    rule(),
  ]
}

/// Banner lines, heading rules and heading names. These are regenerated on
/// every write and never carried over from the old file.
pub fn is_generated_comment(line: &str) -> bool {
  let line = line.trim();
  BANNER.contains(&line) || line == rule() || is_heading_name(line)
}

/// A name line exactly as [`heading`] renders it, for any section name,
/// so headings of sections no longer declared are recognized too.
fn is_heading_name(line: &str) -> bool {
  let Some(padded) = line.strip_prefix(HEADING_MARKER).and_then(|rest| rest.strip_prefix(' ')) else {
    return false;
  };
  let name = padded.trim_start_matches(' ');
  let pad = padded.len() - name.len();

  !name.is_empty()
    && pad == HEADING_WIDTH.saturating_sub(name.chars().count()) / 2
    && friendly_name(&name.replace(' ', "")) == name
}

/// Renders one bucket entry. Blank lines and generated comments render to nothing.
pub fn render_entry(entry: &str) -> Option<String> {
  let entry = entry.trim();

  if entry.is_empty() {
    None
  } else if entry.contains(ASSIGNMENT_OPERATOR) {
    Some(entry.to_string())
  } else if entry.starts_with(COMMENT_PREFIX) {
    (!is_generated_comment(entry)).then(|| entry.to_string())
  } else {
    Some(format!("{}{}\"\"", entry, ASSIGNMENT_OPERATOR))
  }
}

/// Renders buckets into the lines of the environment file.
pub fn env_file_content(buckets: &SectionBuckets) -> Vec<String> {
  let mut lines: Vec<String> = BANNER.iter().map(|line| line.to_string()).collect();

  for (section, entries) in buckets {
    lines.extend(heading(section));

    let mut rendered: Vec<String> = entries.iter().filter_map(|e| render_entry(e)).collect();
    if section != CUSTOM_SECTION {
      rendered.sort();
    }
    lines.extend(rendered);
  }

  lines
}

/// Renders a fresh file where every declared key is a placeholder.
pub fn declaration_content(declaration: &Declaration) -> Vec<String> {
  let buckets: SectionBuckets = declaration
    .iter()
    .map(|(section, keys)| {
      (
        section.clone(),
        keys.iter().map(|key| Cow::Borrowed(key.as_str())).collect(),
      )
    })
    .collect();

  env_file_content(&buckets)
}
