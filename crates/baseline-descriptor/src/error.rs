use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading a parameter source.
#[derive(Debug, Error)]
pub enum DescriptorError {
  /// The parameter source could not be read.
  #[error("failed to read parameter source {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A line of the parameter source could not be parsed.
  #[error("malformed parameter source {source_id} at line {line}: {message}")]
  Malformed {
    source_id: String,
    line: usize,
    message: String,
  },
}
