use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use baseline_config::TaskDef;

use crate::error::TaskExecutionError;
use crate::process::{ProcessEnv, run_process};

/// An invocable task.
///
/// Implementations run with `parameter_file` as their parameter set and
/// write everything they print to `output`. The returned indicator is zero on
/// success; anything else is a task-reported error.
#[async_trait]
pub trait Task: Send + Sync {
  async fn invoke(&self, parameter_file: &Path, output: &Path) -> Result<i32, TaskExecutionError>;
}

/// Maps task names to invocable tasks.
pub trait TaskRegistry: Send + Sync {
  /// Look up a task by name.
  fn get(&self, name: &str) -> Option<Arc<dyn Task>>;

  /// All registered names, sorted.
  fn names(&self) -> Vec<String>;
}

/// A task backed by an external program.
///
/// The parameter file path is appended as the last argument.
#[derive(Debug, Clone)]
pub struct CommandTask {
  program: String,
  args: Vec<String>,
  env: HashMap<String, String>,
}

impl CommandTask {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      env: HashMap::new(),
    }
  }

  pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.insert(key.into(), value.into());
    self
  }

  fn command_line(&self, parameter_file: &Path) -> Vec<String> {
    let mut argv = Vec::with_capacity(self.args.len() + 2);
    argv.push(self.program.clone());
    argv.extend(self.args.iter().cloned());
    argv.push(parameter_file.display().to_string());
    argv
  }
}

impl From<&TaskDef> for CommandTask {
  fn from(def: &TaskDef) -> Self {
    Self {
      program: def.program.clone(),
      args: def.args.clone(),
      env: def.env.clone(),
    }
  }
}

#[async_trait]
impl Task for CommandTask {
  async fn invoke(&self, parameter_file: &Path, output: &Path) -> Result<i32, TaskExecutionError> {
    let argv = self.command_line(parameter_file);

    run_process(&argv, ProcessEnv::Extend(&self.env), output).await
  }
}

/// A registry held entirely in memory.
#[derive(Default, Clone)]
pub struct InMemoryTaskRegistry {
  tasks: HashMap<String, Arc<dyn Task>>,
}

impl InMemoryTaskRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(&mut self, name: impl Into<String>, task: Arc<dyn Task>) {
    self.tasks.insert(name.into(), task);
  }

  pub fn with(mut self, name: impl Into<String>, task: Arc<dyn Task>) -> Self {
    self.register(name, task);
    self
  }
}

impl TaskRegistry for InMemoryTaskRegistry {
  fn get(&self, name: &str) -> Option<Arc<dyn Task>> {
    self.tasks.get(name).cloned()
  }

  fn names(&self) -> Vec<String> {
    let mut names: Vec<String> = self.tasks.keys().cloned().collect();
    names.sort();
    names
  }
}

/// Registry built from the `tasks` section of the configuration.
pub struct ConfiguredTaskRegistry {
  inner: InMemoryTaskRegistry,
}

impl ConfiguredTaskRegistry {
  pub fn new(tasks: &HashMap<String, TaskDef>) -> Self {
    let mut inner = InMemoryTaskRegistry::new();
    for (name, def) in tasks {
      inner.register(name.clone(), Arc::new(CommandTask::from(def)));
    }
    Self { inner }
  }
}

impl TaskRegistry for ConfiguredTaskRegistry {
  fn get(&self, name: &str) -> Option<Arc<dyn Task>> {
    self.inner.get(name)
  }

  fn names(&self) -> Vec<String> {
    self.inner.names()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_command_line_appends_parameter_file() {
    let task = CommandTask::new("calcspec").with_args(["--batch"]);
    assert_eq!(
      task.command_line(Path::new("calcspec1.par")),
      vec!["calcspec", "--batch", "calcspec1.par"]
    );
  }

  #[test]
  fn test_configured_registry() {
    let mut tasks = HashMap::new();
    tasks.insert(
      "b".to_string(),
      TaskDef {
        program: "true".to_string(),
        args: vec![],
        env: HashMap::new(),
      },
    );
    tasks.insert(
      "a".to_string(),
      TaskDef {
        program: "false".to_string(),
        args: vec![],
        env: HashMap::new(),
      },
    );

    let registry = ConfiguredTaskRegistry::new(&tasks);

    assert_eq!(registry.names(), vec!["a", "b"]);
    assert!(registry.get("a").is_some());
    assert!(registry.get("missing").is_none());
  }
}
