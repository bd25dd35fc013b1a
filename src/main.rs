use clap::{Parser, ValueEnum};
use env_setup::config::SetupConfig;
use env_setup::format::{CommandFormatter, Formatter, Passthrough};
use env_setup::setup::EnvSetup;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
  name = "env-setup",
  about = "Keep your env file and webpack EnvironmentPlugin in line with your declared variables",
  version,
  author
)]
struct Cli {
  /// Path to the JSON config declaring envFilePath, webpackConfigPath and vars
  #[arg(short, long)]
  config: PathBuf,

  /// Formatter run over the webpack config before and after patching
  #[arg(long, value_enum, default_value_t = FormatterKind::Prettier)]
  formatter: FormatterKind,

  /// Prettier executable used by the prettier formatter
  #[arg(long, default_value = "prettier")]
  prettier: String,

  /// Verbose output (-v for verbose, -vv for very verbose)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatterKind {
  Prettier,
  None,
}

fn setup_tracing(verbose: u8) {
  use tracing_subscriber::fmt;
  use tracing_subscriber::prelude::*;

  let log_level = match verbose {
    1 => "debug",
    2 => "trace",
    _ => "info",
  };

  tracing_subscriber::registry()
    .with(fmt::layer())
    .with(tracing_subscriber::EnvFilter::new(
      std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
    ))
    .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
  let cli = Cli::parse();

  setup_tracing(cli.verbose);

  #[cfg(feature = "tracing")]
  tracing::info!("init");

  let config = SetupConfig::load(&cli.config)?;

  let formatter: Box<dyn Formatter> = match (cli.formatter, &config.webpack_config_path) {
    (FormatterKind::Prettier, Some(path)) => Box::new(CommandFormatter::prettier(cli.prettier, path)),
    _ => Box::new(Passthrough),
  };

  EnvSetup::run(&config, formatter.as_ref());

  Ok(())
}
