//! Named task execution.

use std::path::{Path, PathBuf};

use baseline_descriptor::{Descriptor, ParFile, extract_into};
use tracing::{error, info, instrument};

use crate::error::TaskExecutionError;
use crate::fs::ensure_absent;
use crate::process::flush_stdio;
use crate::registry::TaskRegistry;

/// One run of a named task against a parameter file.
#[derive(Debug, Clone)]
pub struct TaskInvocation {
  /// Name resolved through the task registry.
  pub taskname: String,
  /// Parameter file the task runs with.
  pub parameter_file: PathBuf,
  /// File receiving the task's combined stdout and stderr.
  pub output: PathBuf,
  /// Attributes to start the descriptor with.
  pub descriptor: Option<Descriptor>,
}

impl TaskInvocation {
  pub fn new(
    taskname: impl Into<String>,
    parameter_file: impl Into<PathBuf>,
    output: impl Into<PathBuf>,
  ) -> Self {
    Self {
      taskname: taskname.into(),
      parameter_file: parameter_file.into(),
      output: output.into(),
      descriptor: None,
    }
  }

  pub fn with_descriptor(mut self, descriptor: Descriptor) -> Self {
    self.descriptor = Some(descriptor);
    self
  }

  /// Extract the descriptor, then run the task.
  ///
  /// Returns the descriptor describing the run.
  pub async fn run(self, registry: &dyn TaskRegistry) -> Result<Descriptor, TaskExecutionError> {
    ensure_absent(&self.output).await?;

    let source = ParFile::new(&self.parameter_file);
    let descriptor = extract_into(
      self.descriptor.unwrap_or_default(),
      &self.taskname,
      &source,
    )?;

    invoke_task(registry, &self.taskname, &self.parameter_file, &self.output).await?;
    Ok(descriptor)
  }
}

/// Run a named task, see [`TaskInvocation::run`].
pub async fn run_task(
  registry: &dyn TaskRegistry,
  taskname: &str,
  parameter_file: &Path,
  output: &Path,
  descriptor: Option<Descriptor>,
) -> Result<Descriptor, TaskExecutionError> {
  let mut invocation = TaskInvocation::new(taskname, parameter_file, output);
  invocation.descriptor = descriptor;
  invocation.run(registry).await
}

/// Resolve `taskname` and run it, without building a descriptor.
///
/// The capture file is removed first. A non-zero indicator from the task is
/// returned as [`TaskExecutionError::Failed`].
#[instrument(
  name = "task_run",
  skip(registry, taskname, parameter_file, output),
  fields(
    task = %taskname,
    parameter_file = %parameter_file.display(),
    output = %output.display(),
  )
)]
pub async fn invoke_task(
  registry: &dyn TaskRegistry,
  taskname: &str,
  parameter_file: &Path,
  output: &Path,
) -> Result<(), TaskExecutionError> {
  let task = registry
    .get(taskname)
    .ok_or_else(|| TaskExecutionError::NotFound(taskname.to_string()))?;

  ensure_absent(output).await?;
  flush_stdio();

  info!("task started");
  let indicator = task.invoke(parameter_file, output).await?;

  if indicator != 0 {
    error!(indicator, "task failed");
    return Err(TaskExecutionError::Failed {
      task: taskname.to_string(),
      indicator,
    });
  }

  info!("task completed");
  Ok(())
}
