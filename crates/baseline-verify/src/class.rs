//! Test-class lifecycle.
//!
//! A class names one task run and the artifacts it must reproduce. Setup
//! cleans old outputs, builds the descriptor, opens the okify log and runs
//! the task; each artifact is then checked independently; teardown closes the
//! log and removes side-effect files.

use std::path::{Path, PathBuf};

use baseline_descriptor::{Descriptor, ParFile, extract};
use baseline_store::{OutcomeRow, Status};
use baseline_task::{TaskRegistry, ensure_absent, invoke_task};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::check::{CheckOptions, ComparisonResult, compare_artifact, settle};
use crate::comparator::{ComparatorRegistry, IgnoreList, ignore_keys};
use crate::error::{SetupError, VerifyError};
use crate::okify::{OkifyLog, okify_path};

/// Comparator used for artifacts listed without an explicit check.
pub const DEFAULT_COMPARATOR: &str = "binary";

/// Descriptor key holding the okify log path.
pub const OKIFY_FILE_KEY: &str = "okify-file";

fn default_comparator() -> String {
  DEFAULT_COMPARATOR.to_string()
}

/// Declaration of a test class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestClassDef {
  /// Defaults to the parameter file stem.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  pub taskname: String,
  pub parfile: PathBuf,
  /// Artifacts compared against references. May contain wildcards.
  #[serde(default)]
  pub cmplist: Vec<String>,
  /// Side-effect files removed before the run and at teardown.
  #[serde(default)]
  pub cleanuplist: Vec<String>,
  /// Explicit checks; when empty, every plain `cmplist` entry is checked
  /// with [`DEFAULT_COMPARATOR`].
  #[serde(default)]
  pub checks: Vec<CheckDef>,
}

/// One artifact check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckDef {
  pub file: String,
  #[serde(default = "default_comparator")]
  pub comparator: String,
  #[serde(default)]
  pub ignore: Vec<IgnoreList>,
  /// Header keywords to exclude.
  #[serde(default)]
  pub ignore_keys: Vec<String>,
}

impl CheckDef {
  pub fn new(file: impl Into<String>, comparator: impl Into<String>) -> Self {
    Self {
      file: file.into(),
      comparator: comparator.into(),
      ignore: Vec::new(),
      ignore_keys: Vec::new(),
    }
  }

  /// All ignore directives, with `ignore_keys` expanded.
  pub fn ignore_lists(&self) -> Vec<IgnoreList> {
    let mut lists = self.ignore.clone();
    if !self.ignore_keys.is_empty() {
      lists.push(ignore_keys(&self.ignore_keys));
    }
    lists
  }
}

impl TestClassDef {
  /// Parse a definition from JSON.
  pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(content)
  }

  /// Load a definition from a JSON file.
  pub fn load(path: &Path) -> Result<Self, VerifyError> {
    let content = std::fs::read_to_string(path).map_err(|e| VerifyError::Definition {
      path: path.to_path_buf(),
      message: e.to_string(),
    })?;
    Self::from_json(&content).map_err(|e| VerifyError::Definition {
      path: path.to_path_buf(),
      message: e.to_string(),
    })
  }

  pub fn class_name(&self) -> String {
    self.name.clone().unwrap_or_else(|| {
      self
        .parfile
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| self.taskname.clone())
    })
  }

  /// Capture file for the task's output.
  pub fn stdout_path(&self) -> PathBuf {
    self.parfile.with_extension("stdout")
  }

  pub fn okify_path(&self) -> PathBuf {
    okify_path(&self.parfile)
  }

  /// The checks this class performs.
  pub fn planned_checks(&self) -> Vec<CheckDef> {
    if !self.checks.is_empty() {
      return self.checks.clone();
    }
    self
      .cmplist
      .iter()
      .filter(|name| !is_pattern(name))
      .map(|name| CheckDef::new(name.clone(), DEFAULT_COMPARATOR))
      .collect()
  }
}

/// Extra setup run after the descriptor is built and before the task runs.
///
/// An error fails the class like any other setup failure.
pub type PreExecHook<'h> =
  &'h (dyn Fn(&TestClassDef, &Descriptor) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
         + Send
         + Sync);

/// Lifecycle position of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassState {
  Init,
  Cleaned,
  DescriptorBuilt,
  Executed,
  Comparing,
  TornDown,
}

/// A class whose task has run, ready for checks.
pub struct ClassRun<'a> {
  def: TestClassDef,
  comparators: &'a ComparatorRegistry,
  reference_dir: PathBuf,
  state: ClassState,
  descriptor: Descriptor,
  okify: OkifyLog,
  results: Vec<ComparisonResult>,
}

impl<'a> ClassRun<'a> {
  /// Clean, build the descriptor, open the okify log and run the task.
  pub async fn setup(
    def: TestClassDef,
    tasks: &dyn TaskRegistry,
    comparators: &'a ComparatorRegistry,
    reference_dir: impl Into<PathBuf>,
  ) -> Result<Self, SetupError> {
    Self::setup_with(def, tasks, comparators, reference_dir, None).await
  }

  /// [`ClassRun::setup`] with a hook run just before the task.
  #[instrument(
    name = "class_setup",
    skip_all,
    fields(class = %def.class_name(), task = %def.taskname)
  )]
  pub async fn setup_with(
    def: TestClassDef,
    tasks: &dyn TaskRegistry,
    comparators: &'a ComparatorRegistry,
    reference_dir: impl Into<PathBuf>,
    pre_exec: Option<PreExecHook<'_>>,
  ) -> Result<Self, SetupError> {
    remove_all(def.cmplist.iter().chain(def.cleanuplist.iter())).await;
    debug!(state = ?ClassState::Cleaned, "state");

    let okify_file = def.okify_path();
    let descriptor = extract(&def.taskname, &ParFile::new(&def.parfile))?
      .with(OKIFY_FILE_KEY, okify_file.display().to_string());
    let okify = OkifyLog::open(&okify_file).map_err(|source| SetupError::Okify {
      path: okify_file.clone(),
      source,
    })?;
    debug!(state = ?ClassState::DescriptorBuilt, "state");

    if let Some(hook) = pre_exec {
      hook(&def, &descriptor).map_err(SetupError::PreExec)?;
    }

    invoke_task(tasks, &def.taskname, &def.parfile, &def.stdout_path()).await?;
    info!(state = ?ClassState::Executed, "class ready");

    Ok(Self {
      def,
      comparators,
      reference_dir: reference_dir.into(),
      state: ClassState::Executed,
      descriptor,
      okify,
      results: Vec::new(),
    })
  }

  pub fn state(&self) -> ClassState {
    self.state
  }

  pub fn descriptor(&self) -> &Descriptor {
    &self.descriptor
  }

  pub fn definition(&self) -> &TestClassDef {
    &self.def
  }

  pub fn results(&self) -> &[ComparisonResult] {
    &self.results
  }

  /// Check one artifact.
  ///
  /// Failures are okified and returned as errors; passing artifacts are
  /// removed. The result is kept either way.
  pub async fn check_file(&mut self, check: &CheckDef) -> Result<ComparisonResult, VerifyError> {
    self.state = ClassState::Comparing;

    let options = CheckOptions {
      ignore: check.ignore_lists(),
      exc: true,
      cleanup: true,
    };
    let result = compare_artifact(
      self.comparators,
      Path::new(&check.file),
      &self.reference_dir,
      &check.comparator,
      &options.ignore,
    );
    self.results.push(result.clone());

    settle(result, &options, Some(&mut self.okify)).await
  }

  /// Close the okify log and remove side-effect files.
  pub async fn teardown(self) -> ClassSummary {
    let okify_path = self.okify.path().to_path_buf();
    let okify_entries = match self.okify.close() {
      Ok(n) => n,
      Err(e) => {
        error!(path = %okify_path.display(), error = %e, "failed to flush okify log");
        0
      }
    };

    remove_all(self.def.cleanuplist.iter()).await;
    debug!(state = ?ClassState::TornDown, "state");

    ClassSummary {
      class: self.def.class_name(),
      descriptor: self.descriptor,
      results: self.results,
      okify_path,
      okify_entries,
    }
  }
}

/// What a completed class produced.
#[derive(Debug, Clone, Serialize)]
pub struct ClassSummary {
  pub class: String,
  pub descriptor: Descriptor,
  pub results: Vec<ComparisonResult>,
  pub okify_path: PathBuf,
  pub okify_entries: usize,
}

/// Result of running a whole class.
#[derive(Debug)]
pub enum ClassReport {
  /// Setup failed; no check ran.
  SetupFailed {
    class: String,
    planned: Vec<String>,
    error: SetupError,
  },
  Completed(ClassSummary),
}

impl ClassReport {
  pub fn class_name(&self) -> &str {
    match self {
      ClassReport::SetupFailed { class, .. } => class,
      ClassReport::Completed(summary) => &summary.class,
    }
  }

  /// Whether setup succeeded and every check passed.
  pub fn all_passed(&self) -> bool {
    match self {
      ClassReport::SetupFailed { .. } => false,
      ClassReport::Completed(summary) => summary.results.iter().all(ComparisonResult::passed),
    }
  }

  /// One outcome row per check. A failed setup marks every planned check
  /// as an error.
  pub fn outcomes(
    &self,
    test_run: &str,
    project: &str,
    host: &str,
    at: DateTime<Utc>,
  ) -> Vec<OutcomeRow> {
    let row = |test: &str, status: Status| OutcomeRow {
      test_run: test_run.to_string(),
      project: project.to_string(),
      host: host.to_string(),
      test_name: format!("{}/{}", self.class_name(), test),
      status,
      recorded_at: at,
    };

    match self {
      ClassReport::SetupFailed { planned, .. } => planned
        .iter()
        .map(|file| row(file, Status::Error))
        .collect(),
      ClassReport::Completed(summary) => summary
        .results
        .iter()
        .map(|r| row(&r.artifact.display().to_string(), r.status.to_status()))
        .collect(),
    }
  }
}

/// Run a class end to end: setup, every planned check, teardown.
pub async fn run_class(
  def: TestClassDef,
  tasks: &dyn TaskRegistry,
  comparators: &ComparatorRegistry,
  reference_dir: &Path,
) -> ClassReport {
  run_class_with(def, tasks, comparators, reference_dir, None).await
}

/// [`run_class`] with a pre-exec hook.
pub async fn run_class_with(
  def: TestClassDef,
  tasks: &dyn TaskRegistry,
  comparators: &ComparatorRegistry,
  reference_dir: &Path,
  pre_exec: Option<PreExecHook<'_>>,
) -> ClassReport {
  let class = def.class_name();
  let checks = def.planned_checks();

  let mut run = match ClassRun::setup_with(def, tasks, comparators, reference_dir, pre_exec).await {
    Ok(run) => run,
    Err(error) => {
      error!(class = %class, error = %error, "class setup failed");
      return ClassReport::SetupFailed {
        class,
        planned: checks.into_iter().map(|c| c.file).collect(),
        error,
      };
    }
  };

  for check in &checks {
    if let Err(e) = run.check_file(check).await {
      debug!(class = %class, error = %e, "check failed");
    }
  }

  ClassReport::Completed(run.teardown().await)
}

fn is_pattern(name: &str) -> bool {
  name.contains(['*', '?', '['])
}

/// Best-effort removal of each name, expanding wildcards.
async fn remove_all<'n>(names: impl Iterator<Item = &'n String>) {
  for name in names {
    if !is_pattern(name) {
      remove_quietly(Path::new(name)).await;
      continue;
    }
    match glob::glob(name) {
      Ok(paths) => {
        for path in paths.flatten() {
          remove_quietly(&path).await;
        }
      }
      Err(e) => debug!(pattern = %name, error = %e, "invalid cleanup pattern"),
    }
  }
}

async fn remove_quietly(path: &Path) {
  if let Err(e) = ensure_absent(path).await {
    debug!(path = %path.display(), error = %e, "cleanup failed");
  }
}
