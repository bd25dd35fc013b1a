//! Running both file operations for one configuration.
//!
//! Neither operation aborts the run. Their failures are logged and handed
//! back in the [`RunReport`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use env_setup::config::SetupConfig;
//! use env_setup::format::Passthrough;
//! use env_setup::setup::EnvSetup;
//!
//! let config = SetupConfig::load("env-setup.json").unwrap();
//! let report = EnvSetup::run(&config, &Passthrough);
//! assert!(report.env_file.is_ok());
//! ```

#[cfg(feature = "tracing")]
use tracing::{error, info, warn};

use crate::config::SetupConfig;
use crate::declaration::SetupContext;
use crate::format::Formatter;
use crate::patch::{self, PatchError, PatchOutcome};
use crate::reconcile::{self, EnvFileError, EnvFileOutcome};

/// Main service reconciling the env file and patching the build config.
pub struct EnvSetup;

/// Per-file results of one run.
#[derive(Debug)]
pub struct RunReport {
  pub env_file: Result<EnvFileOutcome, EnvFileError>,
  /// `None` when no build config is configured.
  pub build_config: Option<Result<PatchOutcome, PatchError>>,
}

impl EnvSetup {
  /// Reconciles the env file, then patches the build config if one is configured.
  pub fn run(config: &SetupConfig, formatter: &dyn Formatter) -> RunReport {
    let ctx = SetupContext::new(config.vars.clone());

    #[cfg(feature = "tracing")]
    info!(
      "Syncing {} keys in {} sections",
      ctx.keys().len(),
      ctx.declaration().len()
    );

    let env_file = reconcile::reconcile(&config.env_file_path, &ctx);
    #[cfg(feature = "tracing")]
    match &env_file {
      Ok(EnvFileOutcome::Created) => info!("Created {:?}", config.env_file_path),
      Ok(EnvFileOutcome::Rewritten) => info!("Synced {:?}", config.env_file_path),
      Err(e) => error!("Could not update {:?}: {}", config.env_file_path, e),
    }

    let build_config = config.webpack_config_path.as_ref().map(|path| {
      let result = patch::patch(path, &ctx, formatter);
      #[cfg(feature = "tracing")]
      match &result {
        Ok(PatchOutcome::UpToDate) => info!("{:?} already exposes every key", path),
        Ok(PatchOutcome::Patched { added }) => info!("Added {} keys to {:?}", added.len(), path),
        Err(PatchError::PluginNotFound) => warn!("No EnvironmentPlugin found in {:?}", path),
        Err(e) => error!("Could not patch {:?}: {}", path, e),
      }
      result
    });

    RunReport {
      env_file,
      build_config,
    }
  }
}
