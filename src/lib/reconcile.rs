//! Environment file reconciliation.
//!
//! # Reconcile Logic
//!
//! 1. If the file does not exist, a fresh file holding every declared key is written.
//!    Any other read error leaves the file alone.
//! 2. Otherwise every line is assigned to the declared section owning its key.
//!    Comments, blank lines and undeclared keys go to the custom section in file order.
//! 3. For each declared key, the existing line is kept verbatim, or a placeholder is added.
//!    Sections that are no longer declared disappear.
//! 4. The file is always rewritten, even when nothing changed.

use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::{debug, info, trace};

use crate::declaration::SetupContext;
use crate::parse::{EnvFile, EnvLine};
use crate::render::{self, CUSTOM_SECTION, SectionBuckets};

/// What happened to the environment file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvFileOutcome {
  /// The file did not exist and was created from the declaration.
  Created,
  /// The existing file was merged and rewritten.
  Rewritten,
}

/// Brings the environment file at `path` in line with the declared keys.
pub fn reconcile<P: AsRef<Path>>(path: P, ctx: &SetupContext) -> Result<EnvFileOutcome, EnvFileError> {
  let path = path.as_ref();

  let bytes = match std::fs::read(path) {
    Ok(bytes) => bytes,
    Err(e) if e.kind() == ErrorKind::NotFound => {
      #[cfg(feature = "tracing")]
      info!("No env file at {:?}, creating one", path);

      let lines = render::declaration_content(ctx.declaration());
      write_lines(path, &lines)?;
      return Ok(EnvFileOutcome::Created);
    }
    Err(e) => return Err(EnvFileError::Read(e)),
  };

  #[cfg(feature = "tracing")]
  debug!("Merging existing env file {:?}", path);

  // Invalid UTF-8 is replaced rather than treated as a missing file.
  let existing = String::from_utf8_lossy(&bytes);
  let file = EnvFile::from(&*existing);
  let merged = merge(bucket(&file, ctx), ctx);
  write_lines(path, &render::env_file_content(&merged))?;

  #[cfg(feature = "tracing")]
  info!("Updated env file {:?}", path);

  Ok(EnvFileOutcome::Rewritten)
}

/// Sorts every line of `file` into the bucket of the section owning it.
fn bucket<'a>(file: &EnvFile<'a>, ctx: &SetupContext) -> SectionBuckets<'a> {
  let mut buckets = SectionBuckets::new();

  for line in &file.lines {
    let section = match line {
      EnvLine::Entry(entry) => ctx.owning_section(entry.key).unwrap_or(CUSTOM_SECTION),
      EnvLine::Blank | EnvLine::Comment(_) => CUSTOM_SECTION,
    };

    #[cfg(feature = "tracing")]
    trace!("Line {:?} goes to {}", line.text(), section);

    buckets
      .entry(section.to_string())
      .or_default()
      .push(Cow::Borrowed(line.text()));
  }

  buckets
}

/// One entry per declared key, reusing the existing line when there is one.
/// The custom bucket is carried over last.
fn merge<'a>(mut existing: SectionBuckets<'a>, ctx: &'a SetupContext) -> SectionBuckets<'a> {
  let mut merged = SectionBuckets::new();

  for (section, keys) in ctx.declaration() {
    let lines = existing.get(section);

    let entries = keys
      .iter()
      .map(|key| {
        lines
          .and_then(|lines| lines.iter().find(|line| entry_key(line) == key.as_str()))
          .cloned()
          .unwrap_or_else(|| {
            #[cfg(feature = "tracing")]
            trace!("Adding placeholder for {} in {}", key, section);

            Cow::Borrowed(key.as_str())
          })
      })
      .collect();

    merged.insert(section.clone(), entries);
  }

  merged.insert(
    CUSTOM_SECTION.to_string(),
    existing.shift_remove(CUSTOM_SECTION).unwrap_or_default(),
  );

  merged
}

fn entry_key(line: &str) -> &str {
  EnvLine::from(line)
    .entry()
    .map_or("", |entry| entry.key)
}

fn write_lines(path: &Path, lines: &[String]) -> Result<(), EnvFileError> {
  let mut content = lines.join("\n");
  content.push('\n');
  std::fs::write(path, content).map_err(EnvFileError::Write)
}

/// Errors that can occur while reconciling the environment file.
#[derive(Debug, thiserror::Error)]
pub enum EnvFileError {
  /// Error reading an existing environment file
  #[error("Read error: {0}")]
  Read(std::io::Error),
  /// Error writing the reconciled content
  #[error("Write error: {0}")]
  Write(std::io::Error),
}
