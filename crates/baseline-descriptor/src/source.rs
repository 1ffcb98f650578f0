use crate::error::DescriptorError;
use crate::value::Value;

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
  pub name: String,
  pub value: Value,
}

impl Parameter {
  pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
    Self {
      name: name.into(),
      value: value.into(),
    }
  }
}

/// An opaque name → value source of task parameters.
pub trait ParameterSource {
  /// Identifier recorded in the descriptor (usually a file path).
  fn source_id(&self) -> String;

  /// All declared parameters, in declaration order.
  fn parameters(&self) -> Result<Vec<Parameter>, DescriptorError>;
}

/// Parameters already held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticParameters {
  id: String,
  parameters: Vec<Parameter>,
}

impl StaticParameters {
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      parameters: Vec::new(),
    }
  }

  pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
    self.parameters.push(Parameter::new(name, value));
    self
  }
}

impl ParameterSource for StaticParameters {
  fn source_id(&self) -> String {
    self.id.clone()
  }

  fn parameters(&self) -> Result<Vec<Parameter>, DescriptorError> {
    Ok(self.parameters.clone())
  }
}
