use crate::types::Status;

/// Queryable outcome columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
  TestRun,
  Project,
  Host,
  TestName,
  Status,
}

impl Column {
  pub fn as_sql(self) -> &'static str {
    match self {
      Column::TestRun => "test_run",
      Column::Project => "project",
      Column::Host => "host",
      Column::TestName => "test_name",
      Column::Status => "status",
    }
  }
}

/// How a column is constrained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match {
  Exact(String),
  /// Shell-style wildcard (`*`, `?`, `[...]`), case-sensitive.
  Glob(String),
}

/// Sort direction for [`crate::ResultStore::distinct`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
  #[default]
  Ascending,
  Descending,
}

impl Order {
  pub fn as_sql(self) -> &'static str {
    match self {
      Order::Ascending => "ASC",
      Order::Descending => "DESC",
    }
  }
}

/// A conjunction of column constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
  clauses: Vec<(Column, Match)>,
}

impl Filter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Require `column` to equal `value`.
  pub fn eq(mut self, column: Column, value: impl Into<String>) -> Self {
    self.clauses.push((column, Match::Exact(value.into())));
    self
  }

  /// Require `column` to match `pattern`.
  ///
  /// The unconstrained pattern `*` adds nothing, so the query runs without a
  /// GLOB clause.
  pub fn glob(mut self, column: Column, pattern: impl Into<String>) -> Self {
    let pattern = pattern.into();
    if pattern != "*" {
      self.clauses.push((column, Match::Glob(pattern)));
    }
    self
  }

  pub fn status(self, status: Status) -> Self {
    self.eq(Column::Status, status.code())
  }

  pub fn clauses(&self) -> &[(Column, Match)] {
    &self.clauses
  }

  pub fn is_empty(&self) -> bool {
    self.clauses.is_empty()
  }

  /// `WHERE ...` fragment (empty when unconstrained) and its bind values.
  pub(crate) fn to_sql(&self) -> (String, Vec<String>) {
    if self.clauses.is_empty() {
      return (String::new(), Vec::new());
    }

    let mut conditions = Vec::with_capacity(self.clauses.len());
    let mut binds = Vec::with_capacity(self.clauses.len());
    for (column, matcher) in &self.clauses {
      match matcher {
        Match::Exact(value) => {
          conditions.push(format!("{} = ?", column.as_sql()));
          binds.push(value.clone());
        }
        Match::Glob(pattern) => {
          conditions.push(format!("{} GLOB ?", column.as_sql()));
          binds.push(pattern.clone());
        }
      }
    }

    (format!(" WHERE {}", conditions.join(" AND ")), binds)
  }
}
