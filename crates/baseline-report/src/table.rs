//! Format-neutral table model.

use minijinja::{Environment, context};
use serde::Serialize;

const TABLE_TEMPLATE: &str = include_str!("../templates/table.html");
const PAGE_TEMPLATE: &str = include_str!("../templates/page.html");

/// One table cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cell {
  pub text: String,
  /// Drill-down target; html only.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub link: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub colspan: Option<usize>,
  /// Rendered emphasized in html.
  pub heading: bool,
}

impl Cell {
  pub fn text(text: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      ..Default::default()
    }
  }

  pub fn linked(text: impl Into<String>, link: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      link: Some(link.into()),
      ..Default::default()
    }
  }

  pub fn colspan(mut self, span: usize) -> Self {
    self.colspan = Some(span);
    self
  }

  pub fn heading(mut self) -> Self {
    self.heading = true;
    self
  }
}

/// Rows of cells with optional column headings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
  pub headings: Vec<String>,
  pub rows: Vec<Vec<Cell>>,
}

impl Table {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_headings<S: Into<String>>(headings: impl IntoIterator<Item = S>) -> Self {
    Self {
      headings: headings.into_iter().map(Into::into).collect(),
      rows: Vec::new(),
    }
  }

  pub fn push(&mut self, row: Vec<Cell>) {
    self.rows.push(row);
  }

  /// Comma-separated rows, quoting fields that need it. Links are dropped.
  pub fn to_csv(&self) -> String {
    let mut out = String::new();
    if !self.headings.is_empty() {
      push_csv_line(&mut out, self.headings.iter().map(String::as_str));
    }
    for row in &self.rows {
      push_csv_line(&mut out, row.iter().map(|c| c.text.as_str()));
    }
    out
  }

  /// The table as an html fragment.
  pub fn to_html(&self) -> Result<String, minijinja::Error> {
    let env = environment()?;
    env.get_template("table.html")?.render(context! { table => self })
  }
}

/// A labelled link in a page header, e.g. `prev daily_2024-02-29`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct NavLink {
  pub label: &'static str,
  pub text: String,
  pub link: String,
}

/// A full html page: title, optional subtitle and navigation, then the table.
pub(crate) fn render_page(
  title: &str,
  subtitle: Option<&str>,
  nav: &[NavLink],
  table: &Table,
) -> Result<String, minijinja::Error> {
  let env = environment()?;
  env.get_template("page.html")?.render(context! {
    title => title,
    subtitle => subtitle,
    nav => nav,
    table => table,
  })
}

fn environment() -> Result<Environment<'static>, minijinja::Error> {
  let mut env = Environment::new();
  env.add_template("table.html", TABLE_TEMPLATE)?;
  env.add_template("page.html", PAGE_TEMPLATE)?;
  Ok(env)
}

fn push_csv_line<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
  let fields: Vec<String> = fields.map(csv_field).collect();
  out.push_str(&fields.join(","));
  out.push_str("\r\n");
}

fn csv_field(field: &str) -> String {
  if field.contains([',', '"', '\n', '\r']) {
    format!("\"{}\"", field.replace('"', "\"\""))
  } else {
    field.to_string()
  }
}
