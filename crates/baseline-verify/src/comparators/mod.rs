//! Built-in comparators.

mod binary;
mod keyword;
mod text;

pub use binary::BinaryComparator;
pub use keyword::KeywordComparator;
pub use text::TextComparator;

use std::path::Path;

use crate::error::ComparisonError;

fn read_bytes(path: &Path) -> Result<Vec<u8>, ComparisonError> {
  std::fs::read(path).map_err(|source| ComparisonError::Read {
    path: path.to_path_buf(),
    source,
  })
}

fn read_text(path: &Path) -> Result<String, ComparisonError> {
  std::fs::read_to_string(path).map_err(|source| ComparisonError::Read {
    path: path.to_path_buf(),
    source,
  })
}
