//! Task execution errors.

use baseline_descriptor::DescriptorError;

/// Errors that can occur while running a task or process.
#[derive(Debug, thiserror::Error)]
pub enum TaskExecutionError {
  /// The task ran and reported an error indicator.
  #[error("task {task} exited with error {indicator}")]
  Failed { task: String, indicator: i32 },

  /// No task is registered under the name.
  #[error("task not found: {0}")]
  NotFound(String),

  /// An empty argument list was given.
  #[error("empty command line")]
  EmptyCommand,

  /// The program could not be started.
  #[error("failed to start {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The parameter source could not be read.
  #[error(transparent)]
  Descriptor(#[from] DescriptorError),

  /// An I/O error occurred while preparing the capture file.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}
