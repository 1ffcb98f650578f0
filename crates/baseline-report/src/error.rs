/// Errors from building or rendering a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
  #[error("store error: {0}")]
  Store(#[from] baseline_store::Error),

  #[error("render error: {0}")]
  Render(#[from] minijinja::Error),
}
