use std::collections::BTreeMap;
use std::path::Path;

use super::read_text;
use crate::comparator::{Comparator, IgnoreList, VALUE_EXCL_LIST, Verdict};
use crate::error::ComparisonError;

/// Compares header cards of the form `KEY = VALUE`.
///
/// Keys are case-insensitive; lines without `=` (comments, history) are
/// skipped. A repeated key keeps every value in file order. Keys named in a [`VALUE_EXCL_LIST`] ignore-list are excluded.
pub struct KeywordComparator;

impl KeywordComparator {
  fn excluded(ignore: &[IgnoreList]) -> Vec<String> {
    ignore
      .iter()
      .filter(|list| list.key == VALUE_EXCL_LIST)
      .flat_map(|list| list.values.iter())
      .flat_map(|value| value.split(','))
      .map(|key| key.trim().to_uppercase())
      .filter(|key| !key.is_empty())
      .collect()
  }

  fn cards(content: &str, excluded: &[String]) -> BTreeMap<String, Vec<String>> {
    let mut cards: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in content
      .lines()
      .filter_map(|line| line.split_once('='))
      .map(|(key, value)| (key.trim().to_uppercase(), value.trim().to_string()))
      .filter(|(key, _)| !key.is_empty() && !excluded.contains(key))
    {
      cards.entry(key).or_default().push(value);
    }
    cards
  }
}

impl Comparator for KeywordComparator {
  fn name(&self) -> &str {
    "keyword"
  }

  fn compare(
    &self,
    produced: &Path,
    reference: &Path,
    ignore: &[IgnoreList],
  ) -> Result<Verdict, ComparisonError> {
    let excluded = Self::excluded(ignore);
    let ours = Self::cards(&read_text(produced)?, &excluded);
    let theirs = Self::cards(&read_text(reference)?, &excluded);

    let mut differing: Vec<&str> = ours
      .iter()
      .filter(|(key, value)| theirs.get(*key) != Some(*value))
      .map(|(key, _)| key.as_str())
      .collect();
    differing.extend(
      theirs
        .keys()
        .filter(|key| !ours.contains_key(*key))
        .map(String::as_str),
    );

    if differing.is_empty() {
      Ok(Verdict::Same)
    } else {
      differing.sort_unstable();
      Ok(Verdict::Differs(format!(
        "keywords differ: {}",
        differing.join(", ")
      )))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::comparator::ignore_keys;

  const PRODUCED: &str = "SIMPLE = T\nDATE = '2024-03-02'\nexptime = 10.0\nHISTORY made by task\n";
  const REFERENCE: &str = "SIMPLE = T\nDATE = '2020-01-01'\nEXPTIME = 10.0\n";

  fn files() -> (tempfile::TempDir, std::path::PathBuf, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("out.hdr");
    let b = dir.path().join("ref.hdr");
    std::fs::write(&a, PRODUCED).unwrap();
    std::fs::write(&b, REFERENCE).unwrap();
    (dir, a, b)
  }

  #[test]
  fn test_reports_differing_keys() {
    let (_dir, a, b) = files();
    assert_eq!(
      KeywordComparator.compare(&a, &b, &[]).unwrap(),
      Verdict::Differs("keywords differ: DATE".to_string())
    );
  }

  #[test]
  fn test_excluded_keys() {
    let (_dir, a, b) = files();
    let ignore = vec![ignore_keys(&["date", "ORIGIN"])];
    assert_eq!(
      KeywordComparator.compare(&a, &b, &ignore).unwrap(),
      Verdict::Same
    );
  }

  #[test]
  fn test_repeated_keys_compare_every_value() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    std::fs::write(&a, "COMMENT = produced wrong\nCOMMENT = same\n").unwrap();
    std::fs::write(&b, "COMMENT = reference right\nCOMMENT = same\n").unwrap();
    assert_eq!(
      KeywordComparator.compare(&a, &b, &[]).unwrap(),
      Verdict::Differs("keywords differ: COMMENT".to_string())
    );

    std::fs::write(&a, "COMMENT = same\n").unwrap();
    std::fs::write(&b, "COMMENT = same\nCOMMENT = same\n").unwrap();
    assert!(matches!(
      KeywordComparator.compare(&a, &b, &[]).unwrap(),
      Verdict::Differs(_)
    ));
  }

  #[test]
  fn test_missing_key_differs() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    std::fs::write(&a, "A = 1\n").unwrap();
    std::fs::write(&b, "A = 1\nB = 2\n").unwrap();
    assert_eq!(
      KeywordComparator.compare(&a, &b, &[]).unwrap(),
      Verdict::Differs("keywords differ: B".to_string())
    );
  }
}
