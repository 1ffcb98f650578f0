//! Baseline Report
//!
//! Read-side views over the outcome store:
//! - Resolving run names (`-me`, `daily_latest`, wildcards)
//! - Listing test runs with drill-down links
//! - The per-run day report: pass/fail/error/disabled/missing counts by
//!   project and host
//! - Problem-test listings
//!
//! Every view is built into a [`Table`] and rendered as html or csv from
//! that same table.

mod day;
mod engine;
mod error;
mod query;
mod render;
mod run_name;
mod table;

pub use day::{DailyHeader, DayReport, DayView, HostRow, Note, ProjectSection, StatusCounts, classify};
pub use engine::{PROBLEM_STATUS, ProblemListing, ReportEngine, RunEntry, RunListing};
pub use error::ReportError;
pub use query::{LinkMode, Query};
pub use render::{OutputFormat, UnknownFormat, render_day_view, render_listing, render_problems};
pub use run_name::{DAILY_PREFIX, DailyRun, LATEST_SUFFIX, ME, RunSpec, is_pattern, user_pattern};
pub use table::{Cell, Table};
