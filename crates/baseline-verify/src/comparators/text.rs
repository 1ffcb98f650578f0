use std::path::Path;

use super::read_text;
use crate::comparator::{Comparator, IgnoreList, Verdict};
use crate::error::ComparisonError;

/// Drop lines containing any of the values.
pub const IGNORE_LINES: &str = "ignore_lines";
/// Drop lines whose first word is any of the values.
pub const IGNORE_WSTART: &str = "ignore_wstart";

/// Line-by-line text equality.
pub struct TextComparator;

impl TextComparator {
  fn kept_lines<'a>(content: &'a str, ignore: &[IgnoreList]) -> Vec<&'a str> {
    content
      .lines()
      .filter(|line| !ignore.iter().any(|list| Self::drops(list, line)))
      .collect()
  }

  fn drops(list: &IgnoreList, line: &str) -> bool {
    match list.key.as_str() {
      IGNORE_LINES => list.values.iter().any(|v| line.contains(v.as_str())),
      IGNORE_WSTART => {
        let first = line.split_whitespace().next().unwrap_or("");
        list.values.iter().any(|v| v == first)
      }
      _ => false,
    }
  }
}

impl Comparator for TextComparator {
  fn name(&self) -> &str {
    "text"
  }

  fn compare(
    &self,
    produced: &Path,
    reference: &Path,
    ignore: &[IgnoreList],
  ) -> Result<Verdict, ComparisonError> {
    let produced = read_text(produced)?;
    let reference = read_text(reference)?;

    let ours = Self::kept_lines(&produced, ignore);
    let theirs = Self::kept_lines(&reference, ignore);

    for (index, (a, b)) in ours.iter().zip(theirs.iter()).enumerate() {
      if a != b {
        return Ok(Verdict::Differs(format!(
          "line {}: {:?} != {:?}",
          index + 1,
          a,
          b
        )));
      }
    }

    if ours.len() != theirs.len() {
      return Ok(Verdict::Differs(format!(
        "{} lines vs {} lines",
        ours.len(),
        theirs.len()
      )));
    }

    Ok(Verdict::Same)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pair(a: &str, b: &str) -> (tempfile::TempDir, std::path::PathBuf, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let pa = dir.path().join("a.txt");
    let pb = dir.path().join("b.txt");
    std::fs::write(&pa, a).unwrap();
    std::fs::write(&pb, b).unwrap();
    (dir, pa, pb)
  }

  #[test]
  fn test_trailing_whitespace_differs() {
    let (_dir, a, b) = pair("x  \ny\n", "x\ny\n");
    match TextComparator.compare(&a, &b, &[]).unwrap() {
      Verdict::Differs(detail) => assert!(detail.starts_with("line 1"), "{detail}"),
      Verdict::Same => panic!("expected difference"),
    }
  }

  #[test]
  fn test_line_endings_are_not_content() {
    let (_dir, a, b) = pair("x\r\ny\r\n", "x\ny\n");
    assert_eq!(TextComparator.compare(&a, &b, &[]).unwrap(), Verdict::Same);
  }

  #[test]
  fn test_difference_reports_line() {
    let (_dir, a, b) = pair("x\ny\n", "x\nz\n");
    match TextComparator.compare(&a, &b, &[]).unwrap() {
      Verdict::Differs(detail) => assert!(detail.starts_with("line 2"), "{detail}"),
      Verdict::Same => panic!("expected difference"),
    }
  }

  #[test]
  fn test_extra_lines_differ() {
    let (_dir, a, b) = pair("x\n", "x\ny\n");
    assert!(matches!(
      TextComparator.compare(&a, &b, &[]).unwrap(),
      Verdict::Differs(_)
    ));
  }

  #[test]
  fn test_ignore_lists() {
    let (_dir, a, b) = pair(
      "Run at 10:01\nresult 5\nDATE today\n",
      "Run at 09:00\nresult 5\nDATE yesterday\n",
    );
    let ignore = vec![
      IgnoreList::new(IGNORE_LINES, ["Run at"]),
      IgnoreList::new(IGNORE_WSTART, ["DATE"]),
    ];
    assert_eq!(
      TextComparator.compare(&a, &b, &ignore).unwrap(),
      Verdict::Same
    );
  }
}
