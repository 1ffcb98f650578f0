//! Single-artifact checks.

use std::path::{Path, PathBuf};

use baseline_store::Status;
use baseline_task::ensure_absent;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::comparator::{ComparatorRegistry, IgnoreList, Verdict, default_directive};
use crate::error::{ComparisonError, VerifyError};
use crate::okify::OkifyLog;

/// Status of one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonStatus {
  Pass,
  Fail,
  Error,
  Missing,
}

impl ComparisonStatus {
  pub fn to_status(self) -> Status {
    match self {
      ComparisonStatus::Pass => Status::Pass,
      ComparisonStatus::Fail => Status::Fail,
      ComparisonStatus::Error => Status::Error,
      ComparisonStatus::Missing => Status::Missing,
    }
  }
}

/// Outcome of checking one artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
  pub artifact: PathBuf,
  pub reference: PathBuf,
  pub comparator: String,
  pub status: ComparisonStatus,
  pub ignore: Vec<IgnoreList>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub detail: Option<String>,
  /// Directive accepting this output; `None` when the check passed.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub okify: Option<String>,
}

impl ComparisonResult {
  pub fn passed(&self) -> bool {
    self.status == ComparisonStatus::Pass
  }

  /// The assertion-style error for a result that did not pass.
  pub fn failure(&self) -> Option<VerifyError> {
    let detail = self.detail.clone().unwrap_or_default();
    match self.status {
      ComparisonStatus::Pass => None,
      ComparisonStatus::Fail => Some(VerifyError::ComparisonFailure {
        artifact: self.artifact.clone(),
        reference: self.reference.clone(),
        comparator: self.comparator.clone(),
        detail,
      }),
      ComparisonStatus::Error => Some(VerifyError::ComparisonError {
        artifact: self.artifact.clone(),
        message: detail,
      }),
      ComparisonStatus::Missing => Some(VerifyError::MissingArtifact {
        artifact: self.artifact.clone(),
      }),
    }
  }
}

/// How a check treats its result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckOptions {
  /// Ignore directives handed to the comparator.
  pub ignore: Vec<IgnoreList>,
  /// Return an error for any result other than pass.
  pub exc: bool,
  /// Delete the produced artifact when it passes.
  pub cleanup: bool,
}

/// Where the reference copy of `artifact` lives.
pub fn reference_for(artifact: &Path, reference_dir: &Path) -> PathBuf {
  match artifact.file_name() {
    Some(name) => reference_dir.join(name),
    None => reference_dir.join(artifact),
  }
}

/// Compare `artifact` with its reference, without side effects.
pub fn compare_artifact(
  registry: &ComparatorRegistry,
  artifact: &Path,
  reference_dir: &Path,
  comparator: &str,
  ignore: &[IgnoreList],
) -> ComparisonResult {
  let reference = reference_for(artifact, reference_dir);

  let (status, detail, okify) = match registry.get(comparator) {
    None => (
      ComparisonStatus::Error,
      Some(ComparisonError::UnknownComparator(comparator.to_string()).to_string()),
      Some(default_directive(comparator, artifact, &reference)),
    ),
    Some(_) if !artifact.exists() => (
      ComparisonStatus::Missing,
      Some("artifact not produced".to_string()),
      Some(default_directive(comparator, artifact, &reference)),
    ),
    Some(cmp) => {
      let directive = Some(cmp.okify_directive(artifact, &reference));
      match cmp.compare(artifact, &reference, ignore) {
        Ok(Verdict::Same) => (ComparisonStatus::Pass, None, None),
        Ok(Verdict::Differs(detail)) => (ComparisonStatus::Fail, Some(detail), directive),
        Err(e) => (ComparisonStatus::Error, Some(e.to_string()), directive),
      }
    }
  };

  ComparisonResult {
    artifact: artifact.to_path_buf(),
    reference,
    comparator: comparator.to_string(),
    status,
    ignore: ignore.to_vec(),
    detail,
    okify,
  }
}

/// Compare one artifact and apply `options`.
///
/// A result other than pass appends its directive to `okify`; a pass with
/// `cleanup` removes the artifact. With `exc` the non-pass result comes back
/// as an error.
pub async fn check_file(
  registry: &ComparatorRegistry,
  artifact: &Path,
  reference_dir: &Path,
  comparator: &str,
  options: &CheckOptions,
  okify: Option<&mut OkifyLog>,
) -> Result<ComparisonResult, VerifyError> {
  let result = compare_artifact(registry, artifact, reference_dir, comparator, &options.ignore);
  settle(result, options, okify).await
}

pub(crate) async fn settle(
  result: ComparisonResult,
  options: &CheckOptions,
  okify: Option<&mut OkifyLog>,
) -> Result<ComparisonResult, VerifyError> {
  if result.passed() {
    info!(artifact = %result.artifact.display(), comparator = %result.comparator, "check passed");
    if options.cleanup
      && let Err(e) = ensure_absent(&result.artifact).await
    {
      debug!(artifact = %result.artifact.display(), error = %e, "cleanup failed");
    }
  } else {
    warn!(
      artifact = %result.artifact.display(),
      comparator = %result.comparator,
      status = ?result.status,
      detail = result.detail.as_deref().unwrap_or(""),
      "check did not pass"
    );
    if let (Some(log), Some(directive)) = (okify, result.okify.as_deref()) {
      log.append(directive).map_err(|source| VerifyError::Okify {
        path: log.path().to_path_buf(),
        source,
      })?;
    }
  }

  if options.exc
    && let Some(err) = result.failure()
  {
    return Err(err);
  }

  Ok(result)
}
