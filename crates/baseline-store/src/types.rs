use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Outcome of one test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum Status {
  #[serde(rename = "P")]
  #[sqlx(rename = "P")]
  Pass,
  #[serde(rename = "F")]
  #[sqlx(rename = "F")]
  Fail,
  #[serde(rename = "E")]
  #[sqlx(rename = "E")]
  Error,
  #[serde(rename = "D")]
  #[sqlx(rename = "D")]
  Disabled,
  #[serde(rename = "M")]
  #[sqlx(rename = "M")]
  Missing,
}

impl Status {
  /// Every status, in report column order.
  pub const ALL: [Status; 5] = [
    Status::Pass,
    Status::Fail,
    Status::Error,
    Status::Disabled,
    Status::Missing,
  ];

  /// Single-letter storage code.
  pub fn code(self) -> &'static str {
    match self {
      Status::Pass => "P",
      Status::Fail => "F",
      Status::Error => "E",
      Status::Disabled => "D",
      Status::Missing => "M",
    }
  }

  /// Column heading used in reports.
  pub fn label(self) -> &'static str {
    match self {
      Status::Pass => "pass",
      Status::Fail => "fail",
      Status::Error => "error",
      Status::Disabled => "disabled",
      Status::Missing => "missing",
    }
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.code())
  }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for Status {
  type Err = UnknownStatus;

  /// Accepts the letter code or the label, case-insensitively.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let wanted = s.trim().to_lowercase();
    Status::ALL
      .into_iter()
      .find(|status| status.code().to_lowercase() == wanted || status.label() == wanted)
      .ok_or_else(|| UnknownStatus(s.to_string()))
  }
}

/// One persisted test outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct OutcomeRow {
  pub test_run: String,
  pub project: String,
  pub host: String,
  pub test_name: String,
  pub status: Status,
  pub recorded_at: DateTime<Utc>,
}

impl OutcomeRow {
  /// A row stamped with the current time.
  pub fn now(
    test_run: impl Into<String>,
    project: impl Into<String>,
    host: impl Into<String>,
    test_name: impl Into<String>,
    status: Status,
  ) -> Self {
    Self {
      test_run: test_run.into(),
      project: project.into(),
      host: host.into(),
      test_name: test_name.into(),
      status,
      recorded_at: Utc::now(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_codes_and_labels() {
    assert_eq!("P".parse::<Status>().unwrap(), Status::Pass);
    assert_eq!("f".parse::<Status>().unwrap(), Status::Fail);
    assert_eq!("Error".parse::<Status>().unwrap(), Status::Error);
    assert_eq!("disabled".parse::<Status>().unwrap(), Status::Disabled);
    assert_eq!(" M ".parse::<Status>().unwrap(), Status::Missing);
    assert!("X".parse::<Status>().is_err());
  }

  #[test]
  fn test_serde_uses_codes() {
    assert_eq!(serde_json::to_string(&Status::Missing).unwrap(), "\"M\"");
    let status: Status = serde_json::from_str("\"D\"").unwrap();
    assert_eq!(status, Status::Disabled);
  }
}
