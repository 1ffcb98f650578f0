use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::DescriptorError;
use crate::source::ParameterSource;
use crate::value::Value;

/// Key holding the task name.
pub const TASKNAME_KEY: &str = "taskname";

/// Key holding the parameter source identifier.
pub const SOURCE_ID_KEY: &str = "parameter-source-id";

/// Control parameters that say nothing about what the task computed.
pub const IGNORE_NAMES: &[&str] = &["mode", "$nargs"];

/// Values that mean "not set". Compared trimmed and lower-cased.
pub const IGNORE_VALUES: &[&str] = &["none", "no", "", "indef"];

/// Whether a parameter is left out of descriptors.
pub fn is_ignored(name: &str, value: &Value) -> bool {
  if IGNORE_NAMES.contains(&name) {
    return true;
  }
  let rendered = value.to_string();
  let normalized = rendered.trim().to_lowercase();
  IGNORE_VALUES.contains(&normalized.as_str())
}

/// Filtered attribute snapshot of one task invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Descriptor {
  attributes: BTreeMap<String, Value>,
}

impl Descriptor {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add or replace an attribute.
  pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
    self.attributes.insert(name.into(), value.into());
    self
  }

  pub fn get(&self, name: &str) -> Option<&Value> {
    self.attributes.get(name)
  }

  pub fn taskname(&self) -> Option<&str> {
    match self.attributes.get(TASKNAME_KEY) {
      Some(Value::String(s)) => Some(s),
      _ => None,
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.attributes.iter().map(|(k, v)| (k.as_str(), v))
  }

  pub fn len(&self) -> usize {
    self.attributes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.attributes.is_empty()
  }
}

/// Build a descriptor for `taskname` from `source`.
pub fn extract(taskname: &str, source: &dyn ParameterSource) -> Result<Descriptor, DescriptorError> {
  extract_into(Descriptor::new(), taskname, source)
}

/// Extend a pre-populated descriptor with the parameters of `source`.
pub fn extract_into(
  base: Descriptor,
  taskname: &str,
  source: &dyn ParameterSource,
) -> Result<Descriptor, DescriptorError> {
  let source_id = source.source_id();
  let mut descriptor = base;

  for parameter in source.parameters()? {
    if is_ignored(&parameter.name, &parameter.value) {
      debug!(name = %parameter.name, value = %parameter.value, "parameter skipped");
      continue;
    }
    descriptor = descriptor.with(parameter.name, parameter.value);
  }

  Ok(
    descriptor
      .with(TASKNAME_KEY, taskname)
      .with(SOURCE_ID_KEY, source_id),
  )
}
