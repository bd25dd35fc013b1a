//! Source formatting applied to the build configuration around patching.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

/// Turns source text into its canonical layout.
pub trait Formatter {
  fn format(&self, source: &str) -> Result<String, FormatError>;
}

/// Leaves the text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Formatter for Passthrough {
  fn format(&self, source: &str) -> Result<String, FormatError> {
    Ok(source.to_string())
  }
}

/// Pipes the text through an external program, stdin to stdout.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
  program: String,
  args: Vec<String>,
}

impl CommandFormatter {
  pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      program: program.into(),
      args: args.into_iter().map(Into::into).collect(),
    }
  }

  /// `prettier --stdin-filepath <file>`, so prettier infers the parser from the file name.
  pub fn prettier(program: impl Into<String>, file: &Path) -> Self {
    Self::new(
      program,
      ["--stdin-filepath".to_string(), file.display().to_string()],
    )
  }
}

impl Formatter for CommandFormatter {
  fn format(&self, source: &str) -> Result<String, FormatError> {
    #[cfg(feature = "tracing")]
    debug!("Formatting {} bytes with {} {:?}", source.len(), self.program, self.args);

    let mut child = Command::new(&self.program)
      .args(&self.args)
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .spawn()
      .map_err(|e| FormatError::Spawn(self.program.clone(), e))?;

    let stdin = child.stdin.take();
    let output = std::thread::scope(|scope| {
      let writer = scope.spawn(move || match stdin {
        // Formatters may exit without draining stdin; their exit status decides.
        Some(mut stdin) => match stdin.write_all(source.as_bytes()) {
          Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
          result => result,
        },
        None => Ok(()),
      });
      let output = child.wait_with_output();
      writer
        .join()
        .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")))
        .and(output)
    })
    .map_err(FormatError::Io)?;

    if !output.status.success() {
      return Err(FormatError::Failed {
        program: self.program.clone(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      });
    }

    #[cfg(feature = "tracing")]
    trace!("Formatter produced {} bytes", output.stdout.len());

    String::from_utf8(output.stdout).map_err(FormatError::Utf8)
  }
}

/// Errors that can occur while formatting.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
  /// The formatter could not be started
  #[error("Failed to start formatter '{0}': {1}")]
  Spawn(String, std::io::Error),
  /// Error talking to the formatter process
  #[error("Formatter IO error: {0}")]
  Io(std::io::Error),
  /// The formatter exited unsuccessfully
  #[error("Formatter '{program}' failed: {stderr}")]
  Failed { program: String, stderr: String },
  /// The formatter produced invalid UTF-8
  #[error("Formatter output is not UTF-8: {0}")]
  Utf8(std::string::FromUtf8Error),
}
