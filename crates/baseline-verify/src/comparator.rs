use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::comparators::{BinaryComparator, KeywordComparator, TextComparator};
use crate::error::ComparisonError;

/// Ignore-list key for excluded header keywords.
pub const VALUE_EXCL_LIST: &str = "value_excl_list";

/// A free-form ignore directive handed to a comparator.
///
/// Comparators act on the keys they understand and leave the rest alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreList {
  pub key: String,
  pub values: Vec<String>,
}

impl IgnoreList {
  pub fn new(key: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
    Self {
      key: key.into(),
      values: values.into_iter().map(Into::into).collect(),
    }
  }
}

/// Shorthand for ignoring header keywords: a single
/// [`VALUE_EXCL_LIST`] entry carrying the comma-joined keys.
pub fn ignore_keys<S: AsRef<str>>(keys: &[S]) -> IgnoreList {
  let joined = keys.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",");
  IgnoreList::new(VALUE_EXCL_LIST, [joined])
}

/// Outcome of a completed comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
  Same,
  Differs(String),
}

/// A named equality check for one kind of artifact.
pub trait Comparator: Send + Sync {
  /// Name the comparator is selected by.
  fn name(&self) -> &str;

  /// Compare a produced artifact with its reference.
  fn compare(
    &self,
    produced: &Path,
    reference: &Path,
    ignore: &[IgnoreList],
  ) -> Result<Verdict, ComparisonError>;

  /// Directive that accepts `produced` as the new `reference`.
  fn okify_directive(&self, produced: &Path, reference: &Path) -> String {
    default_directive(self.name(), produced, reference)
  }
}

/// `okify <comparator> <produced> <reference>`
pub fn default_directive(comparator: &str, produced: &Path, reference: &Path) -> String {
  format!(
    "okify {} {} {}",
    comparator,
    produced.display(),
    reference.display()
  )
}

/// Comparators by name.
#[derive(Clone, Default)]
pub struct ComparatorRegistry {
  comparators: HashMap<String, Arc<dyn Comparator>>,
}

impl ComparatorRegistry {
  /// An empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// A registry holding `binary`, `text` and `keyword`.
  pub fn with_builtins() -> Self {
    let mut registry = Self::new();
    registry.register(Arc::new(BinaryComparator));
    registry.register(Arc::new(TextComparator));
    registry.register(Arc::new(KeywordComparator));
    registry
  }

  pub fn register(&mut self, comparator: Arc<dyn Comparator>) {
    self
      .comparators
      .insert(comparator.name().to_string(), comparator);
  }

  pub fn get(&self, name: &str) -> Option<Arc<dyn Comparator>> {
    self.comparators.get(name).cloned()
  }

  pub fn names(&self) -> Vec<String> {
    let mut names: Vec<String> = self.comparators.keys().cloned().collect();
    names.sort();
    names
  }
}
