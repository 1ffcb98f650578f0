//! Report queries against a [`ResultStore`].

use std::collections::HashMap;

use baseline_store::{Column, Filter, Order, OutcomeRow, ResultStore, Status};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::day::{DailyHeader, DayReport, DayView, HostRow, ProjectSection, StatusCounts};
use crate::error::ReportError;
use crate::query::Query;
use crate::run_name::{DAILY_PREFIX, DailyRun, ME, RunSpec, user_pattern};

/// Status pattern selecting failing and erroring tests.
pub const PROBLEM_STATUS: &str = "[FE]";

const UNKNOWN_OS: &str = "?";

/// One run in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunEntry {
  pub test_run: String,
}

impl RunEntry {
  /// Query opening this run's day report.
  pub fn day_query(&self) -> Query {
    Query::run(&self.test_run)
  }

  /// Query opening the result tree for every project and host.
  pub fn tree_query(&self) -> Query {
    Query::run(&self.test_run).project("*").host("*")
  }

  /// Query listing this run's failing and erroring tests.
  pub fn problems_query(&self) -> Query {
    self.tree_query().status(PROBLEM_STATUS)
  }
}

/// Runs matching a pattern, newest name first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunListing {
  pub pattern: String,
  pub runs: Vec<RunEntry>,
}

/// Failing and erroring tests for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemListing {
  pub test_run: String,
  pub project: String,
  pub host: String,
  pub rows: Vec<OutcomeRow>,
}

/// Builds listings and day reports from stored outcomes.
pub struct ReportEngine<S> {
  store: S,
  os_info: HashMap<String, String>,
  user: String,
  today: Option<NaiveDate>,
}

impl<S: ResultStore> ReportEngine<S> {
  pub fn new(store: S) -> Self {
    Self {
      store,
      os_info: HashMap::new(),
      user: "unknown".to_string(),
      today: None,
    }
  }

  /// Host to operating-system descriptions for the `os` column.
  pub fn with_os_info(mut self, os_info: HashMap<String, String>) -> Self {
    self.os_info = os_info;
    self
  }

  /// The user `-me` expands to.
  pub fn with_user(mut self, user: impl Into<String>) -> Self {
    self.user = user.into();
    self
  }

  /// Fix the date used for `daily_today` and `daily_yesterday`.
  pub fn with_today(mut self, today: NaiveDate) -> Self {
    self.today = Some(today);
    self
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  fn today(&self) -> NaiveDate {
    self.today.unwrap_or_else(|| Local::now().date_naive())
  }

  /// Rewrite `-me` to the current user's run pattern.
  pub fn expand_pattern(&self, pattern: &str) -> String {
    if pattern == ME {
      user_pattern(&self.user)
    } else {
      pattern.to_string()
    }
  }

  /// The stored run `name` refers to, or `None` when a symbolic or wildcard
  /// name matches nothing.
  pub async fn resolve_run(&self, name: &str) -> Result<Option<String>, ReportError> {
    match RunSpec::parse(name, &self.user, self.today()) {
      RunSpec::Exact(run) => Ok(Some(run)),
      RunSpec::Greatest(pattern) => self.latest_matching(&pattern).await,
    }
  }

  async fn latest_matching(&self, pattern: &str) -> Result<Option<String>, ReportError> {
    let runs = self
      .store
      .distinct(
        Column::TestRun,
        &Filter::new().glob(Column::TestRun, pattern),
        Order::Descending,
      )
      .await?;
    Ok(runs.into_iter().next())
  }

  /// Runs matching `pattern` (every run when absent), newest name first.
  #[instrument(name = "report_runs", skip(self))]
  pub async fn list_runs(&self, pattern: Option<&str>) -> Result<RunListing, ReportError> {
    let pattern = pattern.map(|p| self.expand_pattern(p)).unwrap_or_else(|| "*".to_string());

    let runs = self
      .store
      .distinct(
        Column::TestRun,
        &Filter::new().glob(Column::TestRun, &pattern),
        Order::Descending,
      )
      .await?;
    debug!(count = runs.len(), "runs listed");

    Ok(RunListing {
      pattern,
      runs: runs.into_iter().map(|test_run| RunEntry { test_run }).collect(),
    })
  }

  /// The day report for `test_run`.
  ///
  /// Without a run name, or when the name resolves to nothing, this falls
  /// back to the run listing.
  #[instrument(name = "report_day", skip(self))]
  pub async fn day_report(&self, test_run: Option<&str>) -> Result<DayView, ReportError> {
    let Some(requested) = test_run else {
      return Ok(DayView::Listing(self.list_runs(None).await?));
    };

    let Some(run) = self.resolve_run(requested).await? else {
      info!(requested, "run name matched nothing, listing runs");
      return Ok(DayView::Listing(self.list_runs(Some(requested)).await?));
    };

    let run_filter = Filter::new().eq(Column::TestRun, &run);
    let projects = self
      .store
      .distinct(Column::Project, &run_filter, Order::Ascending)
      .await?;

    let mut sections = Vec::with_capacity(projects.len());
    for project in projects {
      let project_filter = run_filter.clone().eq(Column::Project, &project);
      let hosts = self
        .store
        .distinct(Column::Host, &project_filter, Order::Ascending)
        .await?;

      let mut rows = Vec::with_capacity(hosts.len());
      for host in hosts {
        let host_filter = project_filter.clone().eq(Column::Host, &host);
        let mut counts = StatusCounts::new();
        for status in Status::ALL {
          let count = self.store.count(&host_filter.clone().status(status)).await?;
          counts.push(status, count);
        }
        rows.push(HostRow {
          os: self
            .os_info
            .get(&host)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_OS.to_string()),
          host,
          counts,
        });
      }

      sections.push(ProjectSection {
        project,
        hosts: rows,
      });
    }

    let daily = self.daily_header(&run).await?;

    Ok(DayView::Report(DayReport {
      test_run: run,
      daily,
      projects: sections,
    }))
  }

  /// Weekday and neighbouring-day links for `daily_<date>` runs. Neighbours
  /// are computed from the date alone, whether or not they were recorded.
  async fn daily_header(&self, run: &str) -> Result<Option<DailyHeader>, ReportError> {
    if !run.starts_with(DAILY_PREFIX) {
      return Ok(None);
    }
    let Some(day) = DailyRun::parse(run) else {
      debug!(run, "daily run with unparseable date");
      return Ok(None);
    };
    let Some(previous) = day.previous() else {
      return Ok(None);
    };

    let latest = self.latest_matching(&format!("{DAILY_PREFIX}*")).await?;

    let mut next = None;
    let mut latest_link = None;
    if latest.as_deref() != Some(run)
      && let Some(following) = day.next()
    {
      let following = following.name();
      if latest.as_deref() != Some(following.as_str()) {
        latest_link = latest;
      }
      next = Some(following);
    }

    Ok(Some(DailyHeader {
      weekday: day.weekday_name(),
      previous: previous.name(),
      next,
      latest: latest_link,
    }))
  }

  /// Failing and erroring tests in `test_run`, optionally narrowed by
  /// project and host patterns.
  #[instrument(name = "report_problems", skip(self))]
  pub async fn problem_tests(
    &self,
    test_run: &str,
    project: Option<&str>,
    host: Option<&str>,
  ) -> Result<ProblemListing, ReportError> {
    let run = self
      .resolve_run(test_run)
      .await?
      .unwrap_or_else(|| test_run.to_string());
    let project = project.unwrap_or("*").to_string();
    let host = host.unwrap_or("*").to_string();

    let filter = Filter::new()
      .eq(Column::TestRun, &run)
      .glob(Column::Project, &project)
      .glob(Column::Host, &host)
      .glob(Column::Status, PROBLEM_STATUS);
    let rows = self.store.rows(&filter).await?;

    Ok(ProblemListing {
      test_run: run,
      project,
      host,
      rows,
    })
  }
}
