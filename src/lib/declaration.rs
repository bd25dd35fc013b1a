//! Declared variables and the run context built from them.

use indexmap::IndexMap;

/// Section name → ordered list of required variable keys.
///
/// Section order is the order the sections were declared in.
pub type Declaration = IndexMap<String, Vec<String>>;

/// One declared key together with the section that declares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedKey {
  pub section: String,
  pub key: String,
}

impl FlattenedKey {
  pub fn new(section: impl Into<String>, key: impl Into<String>) -> Self {
    Self {
      section: section.into(),
      key: key.into(),
    }
  }
}

/// Flattens a declaration into `(section, key)` pairs, sections first, then keys,
/// both in declared order.
pub fn flatten(declaration: &Declaration) -> Vec<FlattenedKey> {
  declaration
    .iter()
    .flat_map(|(section, keys)| keys.iter().map(move |key| FlattenedKey::new(section, key)))
    .collect()
}

/// Read-only data shared by the reconciler and the patcher for one run.
#[derive(Debug, Clone)]
pub struct SetupContext {
  declaration: Declaration,
  keys: Vec<FlattenedKey>,
}

impl SetupContext {
  pub fn new(declaration: Declaration) -> Self {
    let keys = flatten(&declaration);
    Self { declaration, keys }
  }

  pub fn declaration(&self) -> &Declaration {
    &self.declaration
  }

  pub fn keys(&self) -> &[FlattenedKey] {
    &self.keys
  }

  /// First declared section listing `key`, if any.
  pub fn owning_section(&self, key: &str) -> Option<&str> {
    self
      .keys
      .iter()
      .find(|flat| flat.key == key)
      .map(|flat| flat.section.as_str())
  }
}
