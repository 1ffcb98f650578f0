use std::path::PathBuf;

use baseline_descriptor::DescriptorError;
use baseline_task::TaskExecutionError;
use thiserror::Error;

/// A comparator could not reach a verdict.
#[derive(Debug, Error)]
pub enum ComparisonError {
  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("unknown comparator: {0}")]
  UnknownComparator(String),
}

/// Failure of a single check. Sibling checks keep running.
#[derive(Debug, Error)]
pub enum VerifyError {
  /// The artifact differs from its reference.
  #[error("{artifact} differs from {reference} ({comparator}): {detail}")]
  ComparisonFailure {
    artifact: PathBuf,
    reference: PathBuf,
    comparator: String,
    detail: String,
  },

  /// The comparator could not complete.
  #[error("comparison of {artifact} could not complete: {message}")]
  ComparisonError { artifact: PathBuf, message: String },

  /// The artifact was never produced.
  #[error("expected artifact missing: {artifact}")]
  MissingArtifact { artifact: PathBuf },

  /// The okify directive could not be written.
  #[error("failed to write okify log {path}: {source}")]
  Okify {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A test class definition could not be loaded.
  #[error("invalid test class definition {path}: {message}")]
  Definition { path: PathBuf, message: String },
}

/// Failure before any comparison ran. Fails the whole class.
#[derive(Debug, Error)]
pub enum SetupError {
  #[error("bad parameter file: {0}")]
  Descriptor(#[from] DescriptorError),

  #[error("task execution failed: {0}")]
  Task(#[from] TaskExecutionError),

  #[error("failed to open okify log {path}: {source}")]
  Okify {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("pre-exec hook failed: {0}")]
  PreExec(#[source] Box<dyn std::error::Error + Send + Sync>),
}
