//! Patching of the webpack `EnvironmentPlugin` call.
//!
//! The plugin call is found by two line patterns and nothing else:
//!
//! - the opening line contains `new webpack.EnvironmentPlugin({`
//!   (the `webpack.` qualifier is optional)
//! - the closing line is a lone `})`, optionally followed by `,` or `;`
//!
//! Missing keys are inserted as `KEY: null,` right before the closing line.
//! If the whole call sits on its opening line, that line is expanded into a
//! multi-line call instead.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Match, Regex};

#[cfg(feature = "tracing")]
use tracing::{debug, info, trace};

use crate::declaration::{FlattenedKey, SetupContext};
use crate::format::{FormatError, Formatter};

static PLUGIN_OPEN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"new\s+(?:webpack\s*\.\s*)?EnvironmentPlugin\s*\(\s*\{").expect("valid plugin pattern")
});

static PLUGIN_CLOSE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^\s*\}\)\s*[,;]?\s*$").expect("valid closing pattern"));

const INLINE_CLOSE: &str = "})";
const ENTRY_INDENT: &str = "  ";

/// What happened to the build configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
  /// Every declared key already occurs in the file. Nothing was written.
  UpToDate,
  /// The listed keys were added to the plugin call.
  Patched { added: Vec<String> },
}

/// Adds every declared key missing from the build configuration at `path`
/// to its `EnvironmentPlugin` call.
pub fn patch<P: AsRef<Path>>(
  path: P,
  ctx: &SetupContext,
  formatter: &dyn Formatter,
) -> Result<PatchOutcome, PatchError> {
  let path = path.as_ref();

  let source = std::fs::read_to_string(path).map_err(|e| PatchError::Read(path.to_path_buf(), e))?;
  let formatted = formatter.format(&source)?;

  let missing = missing_keys(&formatted, ctx.keys());
  if missing.is_empty() {
    #[cfg(feature = "tracing")]
    debug!("All declared keys present in {:?}", path);

    return Ok(PatchOutcome::UpToDate);
  }

  #[cfg(feature = "tracing")]
  debug!("{} keys missing from {:?}", missing.len(), path);

  let patched = insert_keys(&formatted, &missing)?;
  let output = formatter.format(&patched)?;
  std::fs::write(path, output).map_err(PatchError::Write)?;

  let added: Vec<String> = missing.iter().map(|flat| flat.key.clone()).collect();

  #[cfg(feature = "tracing")]
  info!("Added {:?} to {:?}", added, path);

  Ok(PatchOutcome::Patched { added })
}

/// Declared keys that do not occur anywhere in `source`.
pub fn missing_keys<'k>(source: &str, keys: &'k [FlattenedKey]) -> Vec<&'k FlattenedKey> {
  keys
    .iter()
    .filter(|flat| !source.contains(flat.key.as_str()))
    .collect()
}

/// Inserts `KEY: null,` entries for `missing` into the plugin call of `source`.
pub fn insert_keys(source: &str, missing: &[&FlattenedKey]) -> Result<String, PatchError> {
  let mut lines: Vec<String> = source.lines().map(str::to_string).collect();

  let (start, open_end) = lines
    .iter()
    .enumerate()
    .find_map(|(i, line)| PLUGIN_OPEN.find(line).map(|m| (i, m.end())))
    .ok_or(PatchError::PluginNotFound)?;

  let inline = lines[start][open_end..].contains(INLINE_CLOSE);
  let end = if inline {
    None
  } else {
    lines[start + 1..]
      .iter()
      .position(|line| PLUGIN_CLOSE.is_match(line))
      .map(|offset| start + 1 + offset)
  };

  let indent = format!("{}{}", leading_whitespace(&lines[start]), ENTRY_INDENT);

  match end {
    Some(end) => {
      #[cfg(feature = "tracing")]
      trace!("Plugin block spans lines {}..={}", start, end);

      if let Some(last) = last_entry_line(&lines, start, end) {
        terminate_with_comma(&mut lines[last]);
      }

      let entries = missing.iter().map(|flat| null_entry(&indent, &flat.key));
      lines.splice(end..end, entries);
    }
    None => {
      #[cfg(feature = "tracing")]
      trace!("Plugin call on line {} is inline", start);

      let line = &lines[start];
      let open = PLUGIN_OPEN.find(line).ok_or(PatchError::PluginNotFound)?;
      let expanded = expand_inline(line, open, &indent, missing);
      lines[start] = expanded;
    }
  }

  let mut patched = lines.join("\n");
  if source.ends_with('\n') {
    patched.push('\n');
  }
  Ok(patched)
}

/// `new webpack.EnvironmentPlugin({ A: null })` becomes a multi-line call
/// listing `missing` first, followed by whatever the line had after the brace.
fn expand_inline(line: &str, open: Match<'_>, indent: &str, missing: &[&FlattenedKey]) -> String {
  let head = line[..open.end()].trim_end();
  let tail = line[open.end()..].trim();
  let closing_indent = &indent[..indent.len() - ENTRY_INDENT.len()];

  let mut expanded = vec![head.to_string()];
  expanded.extend(missing.iter().map(|flat| null_entry(indent, &flat.key)));
  if !tail.is_empty() {
    expanded.push(format!("{}{}", closing_indent, tail));
  }
  expanded.join("\n")
}

fn null_entry(indent: &str, key: &str) -> String {
  format!("{}{}: null,", indent, key)
}

/// Last line strictly between `start` and `end` holding code, skipping blank
/// and comment-only lines.
fn last_entry_line(lines: &[String], start: usize, end: usize) -> Option<usize> {
  (start + 1..end)
    .rev()
    .find(|&i| !code_part(&lines[i]).trim().is_empty())
}

/// `line` without a trailing `// comment`. Only `//` at the start or after
/// whitespace counts, so `https://` inside strings is left alone.
fn code_part(line: &str) -> &str {
  line
    .match_indices("//")
    .find(|(i, _)| *i == 0 || line[..*i].ends_with(char::is_whitespace))
    .map_or(line, |(i, _)| &line[..i])
}

fn terminate_with_comma(line: &mut String) {
  let code = code_part(line).trim_end();
  if code.is_empty() || code.ends_with(',') || code.ends_with('{') {
    return;
  }
  let terminated = format!("{},{}", code, line[code.len()..].trim_end());
  *line = terminated;
}

fn leading_whitespace(line: &str) -> &str {
  &line[..line.len() - line.trim_start().len()]
}

/// Errors that leave the build configuration untouched.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
  /// Error reading the build configuration
  #[error("Failed to read build config {0}: {1}")]
  Read(PathBuf, std::io::Error),
  /// No `EnvironmentPlugin` call in the build configuration
  #[error("No EnvironmentPlugin found in build config")]
  PluginNotFound,
  /// The formatter rejected the build configuration
  #[error("Format error: {0}")]
  Format(#[from] FormatError),
  /// Error writing the patched build configuration
  #[error("Write error: {0}")]
  Write(std::io::Error),
}
