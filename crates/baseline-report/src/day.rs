//! Day report model.

use baseline_store::Status;
use serde::Serialize;

use crate::engine::RunListing;

/// Per-host annotation about missing results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Note {
  /// Every result for the host is missing.
  All,
  /// Some results are missing.
  Some,
}

impl Note {
  pub fn as_str(self) -> &'static str {
    match self {
      Note::All => "all",
      Note::Some => "some",
    }
  }
}

/// Note for a host given the last count in the status sequence and the
/// total across all statuses.
///
/// The last counted status is Missing, so this flags hosts with missing
/// results.
pub fn classify(last_count: i64, total: i64) -> Option<Note> {
  if last_count == total {
    Some(Note::All)
  } else if last_count != 0 {
    Some(Note::Some)
  } else {
    None
  }
}

/// Outcome counts in [`Status::ALL`] order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
  counts: Vec<(Status, i64)>,
  total: i64,
}

impl StatusCounts {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append the count for the next status in sequence.
  pub fn push(&mut self, status: Status, count: i64) {
    self.counts.push((status, count));
    self.total += count;
  }

  pub fn get(&self, status: Status) -> i64 {
    self
      .counts
      .iter()
      .find(|(s, _)| *s == status)
      .map(|(_, n)| *n)
      .unwrap_or(0)
  }

  pub fn total(&self) -> i64 {
    self.total
  }

  pub fn iter(&self) -> impl Iterator<Item = (Status, i64)> + '_ {
    self.counts.iter().copied()
  }

  pub fn note(&self) -> Option<Note> {
    let last = self.counts.last().map(|(_, n)| *n).unwrap_or(0);
    classify(last, self.total)
  }
}

impl FromIterator<(Status, i64)> for StatusCounts {
  fn from_iter<I: IntoIterator<Item = (Status, i64)>>(iter: I) -> Self {
    let mut counts = Self::new();
    for (status, count) in iter {
      counts.push(status, count);
    }
    counts
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostRow {
  pub host: String,
  /// Operating system description; `?` when unknown.
  pub os: String,
  pub counts: StatusCounts,
}

impl HostRow {
  pub fn note(&self) -> Option<Note> {
    self.counts.note()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSection {
  pub project: String,
  pub hosts: Vec<HostRow>,
}

/// Navigation for `daily_<date>` runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyHeader {
  pub weekday: String,
  pub previous: String,
  /// Omitted when the run is already the latest daily run.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next: Option<String>,
  /// Omitted when it would repeat `next` or when there is no next.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub latest: Option<String>,
}

/// Counts by project and host for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayReport {
  pub test_run: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub daily: Option<DailyHeader>,
  pub projects: Vec<ProjectSection>,
}

impl DayReport {
  /// The host row for `project` and `host`.
  pub fn host(&self, project: &str, host: &str) -> Option<&HostRow> {
    self
      .projects
      .iter()
      .find(|p| p.project == project)?
      .hosts
      .iter()
      .find(|h| h.host == host)
  }
}

/// A day report, or the run listing it fell back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayView {
  Report(DayReport),
  Listing(RunListing),
}

#[cfg(test)]
mod tests {
  use super::*;

  fn counts(values: [i64; 5]) -> StatusCounts {
    Status::ALL.iter().copied().zip(values).collect()
  }

  #[test]
  fn test_all_missing() {
    let c = counts([0, 0, 0, 0, 5]);
    assert_eq!(c.total(), 5);
    assert_eq!(c.note(), Some(Note::All));
  }

  #[test]
  fn test_some_missing() {
    let c = counts([3, 0, 0, 0, 2]);
    assert_eq!(c.total(), 5);
    assert_eq!(c.note(), Some(Note::Some));
  }

  #[test]
  fn test_none_missing() {
    assert_eq!(counts([5, 0, 0, 0, 0]).note(), None);
    assert_eq!(counts([1, 2, 3, 4, 0]).note(), None);
  }

  #[test]
  fn test_only_missing_triggers_note() {
    // Errors or disabled tests alone never produce a note.
    assert_eq!(counts([0, 0, 4, 0, 0]).note(), None);
    assert_eq!(counts([0, 0, 0, 4, 0]).note(), None);
  }

  #[test]
  fn test_classify_empty_host() {
    assert_eq!(classify(0, 0), Some(Note::All));
  }

  #[test]
  fn test_get_by_status() {
    let c = counts([2, 1, 0, 0, 0]);
    assert_eq!(c.get(Status::Pass), 2);
    assert_eq!(c.get(Status::Fail), 1);
    assert_eq!(c.get(Status::Missing), 0);
  }
}
