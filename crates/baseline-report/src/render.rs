//! Turning report models into html or csv.
//!
//! Each view is first laid out as a [`Table`]; both formats are rendered from
//! that table, so they always agree on rows and columns.

use std::fmt;
use std::str::FromStr;

use baseline_store::Status;

use crate::day::{DayReport, DayView};
use crate::engine::{ProblemListing, RunListing};
use crate::error::ReportError;
use crate::query::{LinkMode, Query};
use crate::table::{Cell, NavLink, Table, render_page};

/// Columns of the day report after the host name.
const DAY_COLUMNS: usize = 8;

/// Output format of a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
  #[default]
  Html,
  Csv,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown output format: {0}")]
pub struct UnknownFormat(String);

impl FromStr for OutputFormat {
  type Err = UnknownFormat;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "html" => Ok(OutputFormat::Html),
      "csv" => Ok(OutputFormat::Csv),
      _ => Err(UnknownFormat(s.to_string())),
    }
  }
}

impl fmt::Display for OutputFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      OutputFormat::Html => f.write_str("html"),
      OutputFormat::Csv => f.write_str("csv"),
    }
  }
}

pub(crate) fn listing_table(listing: &RunListing, base: &str) -> Table {
  let mut table = Table::with_headings(["test_run", "", ""]);
  for entry in &listing.runs {
    table.push(vec![
      Cell::linked(&entry.test_run, entry.day_query().link(base, LinkMode::Day)),
      Cell::linked("(tree display)", entry.tree_query().link(base, LinkMode::Tree)),
      Cell::linked(
        "(problem tests)",
        entry.problems_query().link(base, LinkMode::Problems),
      ),
    ]);
  }
  table
}

pub(crate) fn day_table(report: &DayReport, base: &str) -> Table {
  let mut table = Table::new();

  for section in &report.projects {
    let project_query = Query::run(&report.test_run)
      .project(&section.project)
      .host("*");
    let project_link = project_query.link(base, LinkMode::Tree);

    table.push(vec![
      Cell::linked(&section.project, &project_link)
        .colspan(DAY_COLUMNS)
        .heading(),
    ]);

    let mut headings = vec![
      Cell::text(""),
      Cell::text(""),
      Cell::linked("total", &project_link),
    ];
    for status in Status::ALL {
      headings.push(Cell::linked(
        status.label(),
        project_query.clone().status(status.code()).link(base, LinkMode::Tree),
      ));
    }
    headings.push(Cell::text(""));
    table.push(headings);

    for row in &section.hosts {
      let host_query = Query::run(&report.test_run)
        .project(&section.project)
        .host(&row.host);
      let host_link = host_query.link(base, LinkMode::Tree);

      let mut cells = vec![
        Cell::linked(&row.host, &host_link),
        Cell::text(&row.os),
        Cell::linked(row.counts.total().to_string(), &host_link),
      ];
      for (status, count) in row.counts.iter() {
        cells.push(Cell::linked(
          count.to_string(),
          host_query.clone().rstatus(status).link(base, LinkMode::Tree),
        ));
      }
      cells.push(Cell::text(row.note().map(|n| n.as_str()).unwrap_or("")));
      table.push(cells);
    }

    table.push(vec![Cell::text("")]);
  }

  table
}

pub(crate) fn problems_table(listing: &ProblemListing) -> Table {
  let mut table = Table::with_headings(["project", "host", "test_name", "status"]);
  for row in &listing.rows {
    table.push(vec![
      Cell::text(&row.project),
      Cell::text(&row.host),
      Cell::text(&row.test_name),
      Cell::text(row.status.code()),
    ]);
  }
  table
}

/// Render the run listing.
pub fn render_listing(
  listing: &RunListing,
  format: OutputFormat,
  base: &str,
) -> Result<String, ReportError> {
  let table = listing_table(listing, base);
  match format {
    OutputFormat::Csv => Ok(table.to_csv()),
    OutputFormat::Html => Ok(render_page(&listing.pattern, None, &[], &table)?),
  }
}

/// Render a day report, or the listing it fell back to.
pub fn render_day_view(view: &DayView, format: OutputFormat, base: &str) -> Result<String, ReportError> {
  let report = match view {
    DayView::Listing(listing) => return render_listing(listing, format, base),
    DayView::Report(report) => report,
  };

  let table = day_table(report, base);
  if format == OutputFormat::Csv {
    return Ok(table.to_csv());
  }

  let day_link = |run: &str| Query::run(run).link(base, LinkMode::Day);
  let mut nav = Vec::new();
  let mut subtitle = None;
  if let Some(daily) = &report.daily {
    subtitle = Some(daily.weekday.as_str());
    nav.push(NavLink {
      label: "prev",
      text: daily.previous.clone(),
      link: day_link(&daily.previous),
    });
    if let Some(next) = &daily.next {
      nav.push(NavLink {
        label: "next",
        text: next.clone(),
        link: day_link(next),
      });
    }
    if let Some(latest) = &daily.latest {
      nav.push(NavLink {
        label: "latest",
        text: latest.clone(),
        link: day_link(latest),
      });
    }
  }

  Ok(render_page(&report.test_run, subtitle, &nav, &table)?)
}

/// Render a problem-test listing.
pub fn render_problems(listing: &ProblemListing, format: OutputFormat) -> Result<String, ReportError> {
  let table = problems_table(listing);
  match format {
    OutputFormat::Csv => Ok(table.to_csv()),
    OutputFormat::Html => Ok(render_page(&listing.test_run, None, &[], &table)?),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::day::{DailyHeader, HostRow, ProjectSection, StatusCounts};

  fn report() -> DayReport {
    DayReport {
      test_run: "daily_2024-03-01".to_string(),
      daily: Some(DailyHeader {
        weekday: "Friday".to_string(),
        previous: "daily_2024-02-29".to_string(),
        next: Some("daily_2024-03-02".to_string()),
        latest: None,
      }),
      projects: vec![ProjectSection {
        project: "A".to_string(),
        hosts: vec![HostRow {
          host: "h1".to_string(),
          os: "linux".to_string(),
          counts: Status::ALL.into_iter().zip([3, 0, 0, 0, 2]).collect::<StatusCounts>(),
        }],
      }],
    }
  }

  #[test]
  fn test_format_from_str() {
    assert_eq!("HTML".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
    assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
    assert!("json".parse::<OutputFormat>().is_err());
  }

  #[test]
  fn test_day_table_layout() {
    let table = day_table(&report(), "b");

    assert_eq!(table.rows.len(), 4);
    let texts: Vec<&str> = table.rows[2].iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, ["h1", "linux", "5", "3", "0", "0", "0", "2", "some"]);
    assert_eq!(
      table.rows[2][7].link.as_deref(),
      Some("b?mode=tree&test_run=daily_2024-03-01&project=A&host=h1&rstatus=M")
    );
    assert_eq!(
      table.rows[1][4].link.as_deref(),
      Some("b?mode=tree&test_run=daily_2024-03-01&project=A&host=*&status=F")
    );
  }

  #[test]
  fn test_day_csv() {
    let csv = render_day_view(&DayView::Report(report()), OutputFormat::Csv, "b").unwrap();
    assert_eq!(
      csv,
      "A\r\n,,total,pass,fail,error,disabled,missing,\r\nh1,linux,5,3,0,0,0,2,some\r\n\r\n"
    );
  }

  #[test]
  fn test_day_html_header() {
    let html = render_day_view(&DayView::Report(report()), OutputFormat::Html, "b").unwrap();

    assert!(html.contains("<h1>daily_2024-03-01</h1>"));
    assert!(html.contains("<h2>Friday</h2>"));
    assert!(html.contains(">daily_2024-02-29</a>"));
    assert!(html.contains("next <a"));
    assert!(!html.contains("latest <a"));
  }
}
