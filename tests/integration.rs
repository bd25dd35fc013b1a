use env_setup::config::SetupConfig;
use env_setup::declaration::{Declaration, SetupContext};
use env_setup::format::{FormatError, Formatter, Passthrough};
use env_setup::patch::{self, PatchError, PatchOutcome};
use env_setup::reconcile::{self, EnvFileOutcome};
use env_setup::setup::EnvSetup;
use std::fs;
use tempfile::TempDir;

/// Marks everything it formats, so a write through it is visible.
struct Stamping;

impl Formatter for Stamping {
  fn format(&self, source: &str) -> Result<String, FormatError> {
    let body = source.trim_end_matches("// formatted\n");
    Ok(format!("{}// formatted\n", body))
  }
}

fn context() -> SetupContext {
  let mut declaration = Declaration::new();
  declaration.insert(
    "apiKeys".to_string(),
    vec!["API_URL".to_string(), "API_KEY".to_string()],
  );
  declaration.insert("database".to_string(), vec!["DB_HOST".to_string()]);
  SetupContext::new(declaration)
}

#[test]
fn test_bootstrap_creates_env_file() {
  let temp_dir = TempDir::new().unwrap();
  let env_path = temp_dir.path().join(".env");

  let outcome = reconcile::reconcile(&env_path, &context()).unwrap();
  assert_eq!(outcome, EnvFileOutcome::Created);

  let content = fs::read_to_string(&env_path).unwrap();
  let expected = "# ###############################################
#  Environment variables
#  Missing keys are added by env-setup. Fill in the values below.
# ###############################################
# +---------------------+
# |       Api Keys
# +---------------------+
API_KEY=\"\"
API_URL=\"\"
# +---------------------+
# |       Database
# +---------------------+
DB_HOST=\"\"
";

  assert_eq!(content, expected);
}

#[test]
fn test_reconcile_merges_existing_file() {
  let temp_dir = TempDir::new().unwrap();
  let env_path = temp_dir.path().join(".env");

  let existing = "# +---------------------+
# |       Old Stuff
# +---------------------+
LEGACY=1
API_KEY=secret123
# remember to rotate
DB_HOST=localhost

ZZZ_CUSTOM=yes
";
  fs::write(&env_path, existing).unwrap();

  let outcome = reconcile::reconcile(&env_path, &context()).unwrap();
  assert_eq!(outcome, EnvFileOutcome::Rewritten);

  let content = fs::read_to_string(&env_path).unwrap();
  let body: Vec<&str> = content.lines().skip(4).collect();

  assert_eq!(
    body,
    [
      "# +---------------------+",
      "# |       Api Keys",
      "# +---------------------+",
      "API_KEY=secret123",
      "API_URL=\"\"",
      "# +---------------------+",
      "# |       Database",
      "# +---------------------+",
      "DB_HOST=localhost",
      "# +---------------------+",
      "# |   Custom Variables",
      "# +---------------------+",
      "LEGACY=1",
      "# remember to rotate",
      "ZZZ_CUSTOM=yes",
    ]
  );
  assert!(!content.contains("Old Stuff"));
}

#[test]
fn test_reconcile_is_idempotent() {
  let temp_dir = TempDir::new().unwrap();
  let env_path = temp_dir.path().join(".env");
  fs::write(&env_path, "B_CUSTOM=2\n# hi\nAPI_URL=https://x.test/?a=b\nA-B=1\n").unwrap();

  let ctx = context();
  reconcile::reconcile(&env_path, &ctx).unwrap();
  let first = fs::read_to_string(&env_path).unwrap();
  reconcile::reconcile(&env_path, &ctx).unwrap();
  let second = fs::read_to_string(&env_path).unwrap();

  assert_eq!(first, second);
  assert!(second.contains("API_URL=https://x.test/?a=b\n"));
}

#[test]
fn test_patch_inserts_missing_keys() {
  let temp_dir = TempDir::new().unwrap();
  let config_path = temp_dir.path().join("webpack.config.js");
  fs::write(
    &config_path,
    "new webpack.EnvironmentPlugin({\nAPI_URL: null\n})",
  )
  .unwrap();

  let outcome = patch::patch(&config_path, &context(), &Passthrough).unwrap();
  assert_eq!(
    outcome,
    PatchOutcome::Patched {
      added: vec!["API_KEY".to_string(), "DB_HOST".to_string()]
    }
  );

  let patched = fs::read_to_string(&config_path).unwrap();
  assert_eq!(
    patched,
    "new webpack.EnvironmentPlugin({\nAPI_URL: null,\n  API_KEY: null,\n  DB_HOST: null,\n})"
  );
}

#[test]
fn test_patch_is_noop_when_keys_present() {
  let temp_dir = TempDir::new().unwrap();
  let config_path = temp_dir.path().join("webpack.config.js");
  let source = "new webpack.EnvironmentPlugin({ API_URL: null, API_KEY: null, DB_HOST: null })\n";
  fs::write(&config_path, source).unwrap();

  let outcome = patch::patch(&config_path, &context(), &Stamping).unwrap();

  assert_eq!(outcome, PatchOutcome::UpToDate);
  assert_eq!(fs::read_to_string(&config_path).unwrap(), source);
}

#[test]
fn test_patch_writes_through_formatter() {
  let temp_dir = TempDir::new().unwrap();
  let config_path = temp_dir.path().join("webpack.config.js");
  fs::write(&config_path, "new webpack.EnvironmentPlugin({\n})\n").unwrap();

  patch::patch(&config_path, &context(), &Stamping).unwrap();

  let patched = fs::read_to_string(&config_path).unwrap();
  assert!(patched.ends_with("})\n// formatted\n"));
  assert!(patched.contains("  DB_HOST: null,\n"));
}

#[test]
fn test_patch_without_plugin_leaves_file() {
  let temp_dir = TempDir::new().unwrap();
  let config_path = temp_dir.path().join("webpack.config.js");
  let source = "module.exports = { plugins: [] };\n";
  fs::write(&config_path, source).unwrap();

  let result = patch::patch(&config_path, &context(), &Stamping);

  assert!(matches!(result, Err(PatchError::PluginNotFound)));
  assert_eq!(fs::read_to_string(&config_path).unwrap(), source);
}

#[test]
fn test_run_from_config_file() {
  let temp_dir = TempDir::new().unwrap();
  let env_path = temp_dir.path().join(".env");
  let webpack_path = temp_dir.path().join("webpack.config.js");
  let config_path = temp_dir.path().join("env-setup.json");

  fs::write(
    &webpack_path,
    "module.exports = {\n  plugins: [\n    new webpack.EnvironmentPlugin({\n      FEATURE_X: null,\n    }),\n  ],\n};\n",
  )
  .unwrap();
  let config_json = format!(
    r#"{{
      "envFilePath": {:?},
      "webpackConfigPath": {:?},
      "vars": {{ "featureFlags": ["FEATURE_Y", "FEATURE_X"] }}
    }}"#,
    env_path.display().to_string(),
    webpack_path.display().to_string()
  );
  fs::write(&config_path, config_json).unwrap();

  let config = SetupConfig::load(&config_path).unwrap();
  let report = EnvSetup::run(&config, &Passthrough);

  assert!(matches!(report.env_file, Ok(EnvFileOutcome::Created)));
  assert_eq!(
    report.build_config.unwrap().unwrap(),
    PatchOutcome::Patched {
      added: vec!["FEATURE_Y".to_string()]
    }
  );

  let env = fs::read_to_string(&env_path).unwrap();
  assert!(env.contains("# |     Feature Flags\nFEATURE_X=\"\"\nFEATURE_Y=\"\"\n"));

  let webpack = fs::read_to_string(&webpack_path).unwrap();
  assert!(webpack.contains("      FEATURE_X: null,\n      FEATURE_Y: null,\n    }),"));
}
