use baseline_store::Status;
use url::form_urlencoded;

/// Which view a drill-down link opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
  /// Run listing.
  Runs,
  /// Day report for one run.
  Day,
  /// Result tree for a run, project and host.
  Tree,
  /// Failing and erroring tests.
  Problems,
}

impl LinkMode {
  pub fn as_str(self) -> &'static str {
    match self {
      LinkMode::Runs => "runs",
      LinkMode::Day => "day",
      LinkMode::Tree => "tree",
      LinkMode::Problems => "problems",
    }
  }
}

/// Report query parameters. Absent fields are unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
  pub test_run: Option<String>,
  pub project: Option<String>,
  pub host: Option<String>,
  /// Status pattern, e.g. `F` or `[FE]`.
  pub status: Option<String>,
  /// Status of the counted cell a link came from.
  pub rstatus: Option<Status>,
}

impl Query {
  pub fn run(test_run: impl Into<String>) -> Self {
    Self {
      test_run: Some(test_run.into()),
      ..Default::default()
    }
  }

  pub fn project(mut self, project: impl Into<String>) -> Self {
    self.project = Some(project.into());
    self
  }

  pub fn host(mut self, host: impl Into<String>) -> Self {
    self.host = Some(host.into());
    self
  }

  pub fn status(mut self, status: impl Into<String>) -> Self {
    self.status = Some(status.into());
    self
  }

  pub fn rstatus(mut self, status: Status) -> Self {
    self.rstatus = Some(status);
    self
  }

  /// The url-encoded query string, without the leading `?`.
  pub fn to_query_string(&self, mode: LinkMode) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer.append_pair("mode", mode.as_str());
    if let Some(test_run) = &self.test_run {
      serializer.append_pair("test_run", test_run);
    }
    if let Some(project) = &self.project {
      serializer.append_pair("project", project);
    }
    if let Some(host) = &self.host {
      serializer.append_pair("host", host);
    }
    if let Some(status) = &self.status {
      serializer.append_pair("status", status);
    }
    if let Some(rstatus) = self.rstatus {
      serializer.append_pair("rstatus", rstatus.code());
    }
    serializer.finish()
  }

  /// A link to `mode` under `base` carrying this query.
  pub fn link(&self, base: &str, mode: LinkMode) -> String {
    format!("{base}?{}", self.to_query_string(mode))
  }
}
