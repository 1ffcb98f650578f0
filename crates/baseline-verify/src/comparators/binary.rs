use std::path::Path;

use super::read_bytes;
use crate::comparator::{Comparator, IgnoreList, Verdict};
use crate::error::ComparisonError;

/// Byte-for-byte equality.
pub struct BinaryComparator;

impl Comparator for BinaryComparator {
  fn name(&self) -> &str {
    "binary"
  }

  fn compare(
    &self,
    produced: &Path,
    reference: &Path,
    _ignore: &[IgnoreList],
  ) -> Result<Verdict, ComparisonError> {
    let produced = read_bytes(produced)?;
    let reference = read_bytes(reference)?;

    if produced == reference {
      return Ok(Verdict::Same);
    }

    let offset = produced
      .iter()
      .zip(reference.iter())
      .position(|(a, b)| a != b)
      .unwrap_or_else(|| produced.len().min(reference.len()));

    Ok(Verdict::Differs(format!(
      "first difference at byte {} ({} vs {} bytes)",
      offset,
      produced.len(),
      reference.len()
    )))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_binary() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    let c = dir.path().join("c");
    std::fs::write(&a, b"abcdef").unwrap();
    std::fs::write(&b, b"abcdef").unwrap();
    std::fs::write(&c, b"abcXef").unwrap();

    assert_eq!(BinaryComparator.compare(&a, &b, &[]).unwrap(), Verdict::Same);
    match BinaryComparator.compare(&a, &c, &[]).unwrap() {
      Verdict::Differs(detail) => assert!(detail.contains("byte 3"), "{detail}"),
      Verdict::Same => panic!("expected difference"),
    }
  }

  #[test]
  fn test_missing_reference() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    std::fs::write(&a, b"x").unwrap();
    assert!(matches!(
      BinaryComparator.compare(&a, &dir.path().join("nope"), &[]),
      Err(ComparisonError::Read { .. })
    ));
  }
}
