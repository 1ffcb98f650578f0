//! Test-run name shapes.
//!
//! Names are opaque strings, except that `daily_<YYYY-MM-DD>` names support
//! calendar arithmetic and a few symbolic names resolve against the store.

use chrono::{Days, NaiveDate};

/// Prefix of date-named runs.
pub const DAILY_PREFIX: &str = "daily_";

/// `<prefix>_latest` resolves to the greatest `<prefix>_*` run.
pub const LATEST_SUFFIX: &str = "_latest";

/// Shorthand for the invoking user's runs.
pub const ME: &str = "-me";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wildcard matching every run recorded by `user`.
pub fn user_pattern(user: &str) -> String {
  format!("user_{user}_*")
}

/// Whether `name` contains wildcard characters.
pub fn is_pattern(name: &str) -> bool {
  name.contains(['*', '?', '['])
}

/// How a requested run name maps onto stored runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunSpec {
  /// Used as-is.
  Exact(String),
  /// The lexicographically greatest stored run matching the pattern.
  Greatest(String),
}

impl RunSpec {
  /// Classify `name` for the user `user` on the calendar day `today`.
  pub fn parse(name: &str, user: &str, today: NaiveDate) -> Self {
    if name == ME {
      return RunSpec::Greatest(user_pattern(user));
    }
    if name == "daily_today" {
      return RunSpec::Exact(DailyRun::new(today).name());
    }
    if name == "daily_yesterday" {
      let day = today.checked_sub_days(Days::new(1)).unwrap_or(today);
      return RunSpec::Exact(DailyRun::new(day).name());
    }
    if let Some(prefix) = name.strip_suffix(LATEST_SUFFIX)
      && !prefix.is_empty()
    {
      return RunSpec::Greatest(format!("{prefix}_*"));
    }
    if is_pattern(name) {
      return RunSpec::Greatest(name.to_string());
    }
    RunSpec::Exact(name.to_string())
  }
}

/// A run named `daily_<YYYY-MM-DD>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DailyRun {
  date: NaiveDate,
}

impl DailyRun {
  pub fn new(date: NaiveDate) -> Self {
    Self { date }
  }

  /// `None` unless `name` is a daily run with a valid date.
  pub fn parse(name: &str) -> Option<Self> {
    let date = name.strip_prefix(DAILY_PREFIX)?;
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok().map(Self::new)
  }

  pub fn date(&self) -> NaiveDate {
    self.date
  }

  pub fn name(&self) -> String {
    format!("{DAILY_PREFIX}{}", self.date.format(DATE_FORMAT))
  }

  /// Day of the week, e.g. `Friday`.
  pub fn weekday_name(&self) -> String {
    self.date.format("%A").to_string()
  }

  pub fn previous(&self) -> Option<Self> {
    self.date.pred_opt().map(Self::new)
  }

  pub fn next(&self) -> Option<Self> {
    self.date.succ_opt().map(Self::new)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn test_daily_arithmetic_crosses_leap_day() {
    let run = DailyRun::parse("daily_2024-03-01").unwrap();

    assert_eq!(run.previous().unwrap().name(), "daily_2024-02-29");
    assert_eq!(run.next().unwrap().name(), "daily_2024-03-02");
    assert_eq!(run.weekday_name(), "Friday");
  }

  #[test]
  fn test_daily_year_boundary() {
    let run = DailyRun::parse("daily_2023-12-31").unwrap();
    assert_eq!(run.next().unwrap().name(), "daily_2024-01-01");
  }

  #[test]
  fn test_malformed_daily_names() {
    assert_eq!(DailyRun::parse("daily_2024-02-30"), None);
    assert_eq!(DailyRun::parse("daily_latest"), None);
    assert_eq!(DailyRun::parse("nightly_2024-01-01"), None);
  }

  #[test]
  fn test_run_spec() {
    let today = day(2024, 3, 1);

    assert_eq!(RunSpec::parse("r1", "bob", today), RunSpec::Exact("r1".into()));
    assert_eq!(
      RunSpec::parse(ME, "bob", today),
      RunSpec::Greatest("user_bob_*".into())
    );
    assert_eq!(
      RunSpec::parse("daily_latest", "bob", today),
      RunSpec::Greatest("daily_*".into())
    );
    assert_eq!(
      RunSpec::parse("nightly_latest", "bob", today),
      RunSpec::Greatest("nightly_*".into())
    );
    assert_eq!(
      RunSpec::parse("daily_today", "bob", today),
      RunSpec::Exact("daily_2024-03-01".into())
    );
    assert_eq!(
      RunSpec::parse("daily_yesterday", "bob", today),
      RunSpec::Exact("daily_2024-02-29".into())
    );
    assert_eq!(
      RunSpec::parse("user_*_x", "bob", today),
      RunSpec::Greatest("user_*_x".into())
    );
    assert_eq!(RunSpec::parse("_latest", "bob", today), RunSpec::Exact("_latest".into()));
  }
}
