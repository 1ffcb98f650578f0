//! Integration tests for the test-class lifecycle.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use baseline_descriptor::Descriptor;
use baseline_store::Status;
use baseline_task::{InMemoryTaskRegistry, Task, TaskExecutionError};
use baseline_verify::{
  CheckDef, CheckOptions, ClassReport, ClassRun, ClassState, ComparatorRegistry,
  ComparisonStatus, OKIFY_FILE_KEY, SetupError, TestClassDef, VerifyError, check_file, run_class,
  run_class_with,
};
use chrono::Utc;

type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Produces a fixed set of artifacts in `dir`.
struct ProducingTask {
  dir: PathBuf,
  indicator: i32,
}

#[async_trait]
impl Task for ProducingTask {
  async fn invoke(&self, _parameter_file: &Path, output: &Path) -> Result<i32, TaskExecutionError> {
    std::fs::write(output, "task log\n")?;
    std::fs::write(self.dir.join("same.txt"), "hello\n")?;
    std::fs::write(self.dir.join("diff.txt"), "actual\n")?;
    std::fs::write(self.dir.join("out.hdr"), "SIMPLE = T\nDATE = '2024-03-02'\n")?;
    std::fs::write(self.dir.join("scratch.tmp"), "side effect")?;
    Ok(self.indicator)
  }
}

struct Fixture {
  dir: tempfile::TempDir,
  reference_dir: PathBuf,
}

impl Fixture {
  fn new() -> Self {
    let dir = tempfile::tempdir().unwrap();
    let reference_dir = dir.path().join("ref");
    std::fs::create_dir(&reference_dir).unwrap();
    std::fs::write(reference_dir.join("same.txt"), "hello\n").unwrap();
    std::fs::write(reference_dir.join("diff.txt"), "expected\n").unwrap();
    std::fs::write(reference_dir.join("missing.txt"), "never produced\n").unwrap();
    std::fs::write(
      reference_dir.join("out.hdr"),
      "SIMPLE = T\nDATE = '2001-01-01'\n",
    )
    .unwrap();
    std::fs::write(
      dir.path().join("calc1.par"),
      "input,s,a,\"in.fits\",,,\nmode,s,h,\"al\"\n",
    )
    .unwrap();
    Self { dir, reference_dir }
  }

  fn path(&self, name: &str) -> PathBuf {
    self.dir.path().join(name)
  }

  fn file(&self, name: &str) -> String {
    self.path(name).display().to_string()
  }

  fn registry(&self, indicator: i32) -> InMemoryTaskRegistry {
    InMemoryTaskRegistry::new().with(
      "produce",
      Arc::new(ProducingTask {
        dir: self.dir.path().to_path_buf(),
        indicator,
      }),
    )
  }

  fn definition(&self) -> TestClassDef {
    let mut hdr = CheckDef::new(self.file("out.hdr"), "keyword");
    hdr.ignore_keys = vec!["DATE".to_string()];

    TestClassDef {
      name: None,
      taskname: "produce".to_string(),
      parfile: self.path("calc1.par"),
      cmplist: vec![
        self.file("same.txt"),
        self.file("diff.txt"),
        self.file("missing.txt"),
        self.file("out.hdr"),
        self.file("old_*.log"),
      ],
      cleanuplist: vec![self.file("scratch.tmp")],
      checks: vec![
        CheckDef::new(self.file("same.txt"), "text"),
        CheckDef::new(self.file("diff.txt"), "text"),
        CheckDef::new(self.file("missing.txt"), "binary"),
        hdr,
      ],
    }
  }
}

#[tokio::test]
async fn test_class_runs_every_check() {
  let fx = Fixture::new();
  std::fs::write(fx.path("missing.txt"), "stale output from an earlier run").unwrap();
  std::fs::write(fx.path("old_1.log"), "stale").unwrap();
  std::fs::write(fx.path("old_2.log"), "stale").unwrap();

  let report = run_class(
    fx.definition(),
    &fx.registry(0),
    &ComparatorRegistry::with_builtins(),
    &fx.reference_dir,
  )
  .await;

  let summary = match &report {
    ClassReport::Completed(summary) => summary,
    ClassReport::SetupFailed { error, .. } => panic!("setup failed: {error}"),
  };

  let statuses: Vec<ComparisonStatus> = summary.results.iter().map(|r| r.status).collect();
  assert_eq!(
    statuses,
    vec![
      ComparisonStatus::Pass,
      ComparisonStatus::Fail,
      ComparisonStatus::Missing,
      ComparisonStatus::Pass,
    ]
  );
  assert!(!report.all_passed());

  // Wildcard entries were cleaned before the run.
  assert!(!fx.path("old_1.log").exists());
  assert!(!fx.path("old_2.log").exists());

  // Passing artifacts are removed; failing ones stay for inspection.
  assert!(!fx.path("same.txt").exists());
  assert!(!fx.path("out.hdr").exists());
  assert!(fx.path("diff.txt").exists());

  // Side effects are gone after teardown; captured output is kept.
  assert!(!fx.path("scratch.tmp").exists());
  assert_eq!(
    std::fs::read_to_string(fx.path("calc1.stdout")).unwrap(),
    "task log\n"
  );

  // One directive per non-passing check.
  let okify = std::fs::read_to_string(fx.path("calc1.okify")).unwrap();
  let lines: Vec<&str> = okify.lines().collect();
  assert_eq!(lines.len(), 2);
  assert_eq!(summary.okify_entries, 2);
  assert!(lines[0].starts_with("okify text "));
  assert!(lines[0].contains("diff.txt"));
  assert!(lines[1].starts_with("okify binary "));
  assert!(lines[1].contains("missing.txt"));

  assert_eq!(
    summary.descriptor.get(OKIFY_FILE_KEY).map(|v| v.to_string()),
    Some(fx.file("calc1.okify"))
  );
  assert_eq!(summary.descriptor.taskname(), Some("produce"));

  let rows = report.outcomes("r1", "A", "h1", Utc::now());
  let row_statuses: Vec<Status> = rows.iter().map(|r| r.status).collect();
  assert_eq!(
    row_statuses,
    vec![Status::Pass, Status::Fail, Status::Missing, Status::Pass]
  );
  assert_eq!(rows[1].test_name, format!("calc1/{}", fx.file("diff.txt")));
}

#[tokio::test]
async fn test_task_failure_fails_the_class() {
  let fx = Fixture::new();
  std::fs::write(fx.path("scratch.tmp"), "left over").unwrap();

  let report = run_class(
    fx.definition(),
    &fx.registry(3),
    &ComparatorRegistry::with_builtins(),
    &fx.reference_dir,
  )
  .await;

  match &report {
    ClassReport::SetupFailed { class, planned, error } => {
      assert_eq!(class, "calc1");
      assert_eq!(planned.len(), 4);
      assert!(matches!(
        error,
        SetupError::Task(TaskExecutionError::Failed { indicator: 3, .. })
      ));
    }
    ClassReport::Completed(_) => panic!("expected setup failure"),
  }

  let rows = report.outcomes("r1", "A", "h1", Utc::now());
  assert_eq!(rows.len(), 4);
  assert!(rows.iter().all(|r| r.status == Status::Error));
}

#[tokio::test]
async fn test_missing_parameter_file_fails_the_class() {
  let fx = Fixture::new();
  let mut def = fx.definition();
  def.parfile = fx.path("absent.par");

  let report = run_class(
    def,
    &fx.registry(0),
    &ComparatorRegistry::with_builtins(),
    &fx.reference_dir,
  )
  .await;

  assert!(matches!(
    report,
    ClassReport::SetupFailed {
      error: SetupError::Descriptor(_),
      ..
    }
  ));
  // The task never ran.
  assert!(!fx.path("same.txt").exists());
}

#[tokio::test]
async fn test_failed_check_does_not_stop_siblings() {
  let fx = Fixture::new();
  let def = fx.definition();
  let checks = def.checks.clone();
  let registry = fx.registry(0);
  let comparators = ComparatorRegistry::with_builtins();

  let mut run = ClassRun::setup(def, &registry, &comparators, &fx.reference_dir)
    .await
    .unwrap();
  assert_eq!(run.state(), ClassState::Executed);

  let err = run.check_file(&checks[1]).await.unwrap_err();
  assert!(matches!(err, VerifyError::ComparisonFailure { .. }));
  assert_eq!(run.state(), ClassState::Comparing);

  let err = run.check_file(&checks[2]).await.unwrap_err();
  assert!(matches!(err, VerifyError::MissingArtifact { .. }));

  let ok = run.check_file(&checks[0]).await.unwrap();
  assert!(ok.passed());
  assert!(ok.okify.is_none());

  let summary = run.teardown().await;
  assert_eq!(summary.results.len(), 3);
  assert_eq!(summary.okify_entries, 2);
}

#[tokio::test]
async fn test_check_file_without_exc_returns_result() {
  let fx = Fixture::new();
  std::fs::write(fx.path("diff.txt"), "actual\n").unwrap();

  let options = CheckOptions {
    exc: false,
    cleanup: true,
    ..Default::default()
  };
  let result = check_file(
    &ComparatorRegistry::with_builtins(),
    &fx.path("diff.txt"),
    &fx.reference_dir,
    "text",
    &options,
    None,
  )
  .await
  .unwrap();

  assert_eq!(result.status, ComparisonStatus::Fail);
  assert!(result.detail.unwrap().contains("line 1"));
  assert!(fx.path("diff.txt").exists());
}

#[tokio::test]
async fn test_pre_exec_hook_runs_before_task() {
  let fx = Fixture::new();
  let scratch = fx.path("scratch.tmp");
  std::fs::write(&scratch, "left over").unwrap();
  let called = AtomicBool::new(false);

  let hook = |def: &TestClassDef, descriptor: &Descriptor| -> Result<(), HookError> {
    assert_eq!(def.class_name(), "calc1");
    assert_eq!(descriptor.taskname(), Some("produce"));
    // Cleaning has happened and the task has not produced anything yet.
    assert!(!scratch.exists());
    called.store(true, Ordering::SeqCst);
    Ok(())
  };

  let report = run_class_with(
    fx.definition(),
    &fx.registry(0),
    &ComparatorRegistry::with_builtins(),
    &fx.reference_dir,
    Some(&hook),
  )
  .await;

  assert!(called.load(Ordering::SeqCst));
  assert!(matches!(report, ClassReport::Completed(_)));
}

#[tokio::test]
async fn test_pre_exec_hook_failure_fails_the_class() {
  let fx = Fixture::new();
  let hook = |_: &TestClassDef, _: &Descriptor| -> Result<(), HookError> {
    Err("fixture directory not writable".into())
  };

  let report = run_class_with(
    fx.definition(),
    &fx.registry(0),
    &ComparatorRegistry::with_builtins(),
    &fx.reference_dir,
    Some(&hook),
  )
  .await;

  match &report {
    ClassReport::SetupFailed { error, .. } => {
      assert!(matches!(error, SetupError::PreExec(_)));
      assert!(error.to_string().contains("fixture directory not writable"));
    }
    ClassReport::Completed(_) => panic!("expected setup failure"),
  }
  // The task never ran.
  assert!(!fx.path("same.txt").exists());
  assert!(report.outcomes("r1", "A", "h1", Utc::now()).iter().all(|r| r.status == Status::Error));
}
