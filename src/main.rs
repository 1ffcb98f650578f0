use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use baseline_config::Config;
use baseline_report::{
  OutputFormat, ReportEngine, render_day_view, render_listing, render_problems,
};
use baseline_store::{OutcomeRow, ResultStore, SqliteStore, Status};
use baseline_task::{ConfiguredTaskRegistry, ProcessEnv, cat_to_stdout, run_process, run_task};
use baseline_verify::{ClassReport, ComparatorRegistry, TestClassDef, run_class};

/// Baseline - run test tasks, compare their output with references, report outcomes
#[derive(Parser)]
#[command(name = "baseline")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the configuration file (default: ~/.baseline/config.json when present)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a program with stdout and stderr captured into one file
  Exec {
    /// Capture file, replaced on every run
    #[arg(long)]
    output: PathBuf,

    /// Program and arguments
    #[arg(last = true, required = true)]
    argv: Vec<String>,
  },

  /// Run a configured task against a parameter file
  Task {
    /// Task name from the configuration
    name: String,

    /// Parameter file
    parfile: PathBuf,

    /// Capture file (default: the parameter file with a .stdout extension)
    #[arg(long)]
    output: Option<PathBuf>,
  },

  /// Copy files to stdout
  Cat {
    files: Vec<PathBuf>,
  },

  /// Run a test class and record its outcomes
  Class {
    /// Test class definition (JSON)
    definition: PathBuf,

    #[command(flatten)]
    target: RecordTarget,
  },

  /// Record a single outcome
  Record {
    #[command(flatten)]
    target: RecordTarget,

    /// Test name
    #[arg(long)]
    test: String,

    /// Status code or name (P, F, E, D, M)
    #[arg(long)]
    status: Status,
  },

  /// List test runs
  Runs {
    /// Run name pattern, or -me for your own runs
    #[arg(long, allow_hyphen_values = true)]
    test_run: Option<String>,

    #[arg(long, default_value_t = OutputFormat::Html)]
    format: OutputFormat,
  },

  /// Show the day report for a run
  Day {
    /// Run name; daily_latest and other special names are resolved
    #[arg(long, allow_hyphen_values = true)]
    test_run: Option<String>,

    #[arg(long, default_value_t = OutputFormat::Html)]
    format: OutputFormat,
  },

  /// List failing and erroring tests in a run
  Problems {
    #[arg(long, allow_hyphen_values = true)]
    test_run: String,

    /// Project pattern
    #[arg(long)]
    project: Option<String>,

    /// Host pattern
    #[arg(long)]
    host: Option<String>,

    #[arg(long, default_value_t = OutputFormat::Html)]
    format: OutputFormat,
  },
}

/// Where outcomes are recorded.
#[derive(clap::Args)]
struct RecordTarget {
  #[arg(long)]
  test_run: String,

  #[arg(long)]
  project: String,

  #[arg(long)]
  host: String,
}

fn main() -> Result<ExitCode> {
  let cli = Cli::parse();

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr),
    )
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
    )
    .init();

  let config_path = cli.config.or_else(default_config_path);
  let config = Config::load_or_default(config_path.as_deref()).with_context(|| {
    format!(
      "failed to load configuration: {}",
      config_path
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
    )
  })?;

  let Some(command) = cli.command else {
    println!("baseline - use --help to see available commands");
    return Ok(ExitCode::SUCCESS);
  };

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run(command, config).await })
}

/// `~/.baseline/config.json`, if it exists.
fn default_config_path() -> Option<PathBuf> {
  let path = dirs::home_dir()?.join(".baseline").join("config.json");
  path.exists().then_some(path)
}

async fn run(command: Commands, config: Config) -> Result<ExitCode> {
  match command {
    Commands::Exec { output, argv } => {
      let code = run_process(&argv, ProcessEnv::Inherit, &output)
        .await
        .with_context(|| format!("failed to run {}", argv.join(" ")))?;
      Ok(exit_code(code))
    }
    Commands::Task {
      name,
      parfile,
      output,
    } => {
      let output = output.unwrap_or_else(|| parfile.with_extension("stdout"));
      let registry = ConfiguredTaskRegistry::new(&config.tasks);
      let descriptor = run_task(&registry, &name, &parfile, &output, None)
        .await
        .with_context(|| format!("task {name} failed"))?;
      println!("{}", serde_json::to_string_pretty(&descriptor)?);
      Ok(ExitCode::SUCCESS)
    }
    Commands::Cat { files } => {
      cat_to_stdout(&files).context("failed to copy files to stdout")?;
      Ok(ExitCode::SUCCESS)
    }
    Commands::Class { definition, target } => run_class_command(&definition, &target, &config).await,
    Commands::Record {
      target,
      test,
      status,
    } => {
      let store = open_store(&config).await?;
      let row = OutcomeRow::now(target.test_run, target.project, target.host, test, status);
      store.record(&row).await.context("failed to record outcome")?;
      Ok(ExitCode::SUCCESS)
    }
    Commands::Runs { test_run, format } => {
      let engine = report_engine(&config).await?;
      let listing = engine
        .list_runs(test_run.as_deref())
        .await
        .context("failed to list runs")?;
      print!("{}", render_listing(&listing, format, &config.link_base)?);
      Ok(ExitCode::SUCCESS)
    }
    Commands::Day { test_run, format } => {
      let engine = report_engine(&config).await?;
      let view = engine
        .day_report(test_run.as_deref())
        .await
        .context("failed to build day report")?;
      print!("{}", render_day_view(&view, format, &config.link_base)?);
      Ok(ExitCode::SUCCESS)
    }
    Commands::Problems {
      test_run,
      project,
      host,
      format,
    } => {
      let engine = report_engine(&config).await?;
      let listing = engine
        .problem_tests(&test_run, project.as_deref(), host.as_deref())
        .await
        .context("failed to list problem tests")?;
      print!("{}", render_problems(&listing, format)?);
      Ok(ExitCode::SUCCESS)
    }
  }
}

async fn run_class_command(
  definition: &Path,
  target: &RecordTarget,
  config: &Config,
) -> Result<ExitCode> {
  let def = TestClassDef::load(definition)
    .with_context(|| format!("failed to load test class: {}", definition.display()))?;
  let store = open_store(config).await?;
  let tasks = ConfiguredTaskRegistry::new(&config.tasks);
  let comparators = ComparatorRegistry::with_builtins();

  let report = run_class(def, &tasks, &comparators, &config.reference_dir).await;

  let rows = report.outcomes(&target.test_run, &target.project, &target.host, Utc::now());
  for row in &rows {
    store
      .record(row)
      .await
      .with_context(|| format!("failed to record outcome for {}", row.test_name))?;
    println!("{} {}", row.status.code(), row.test_name);
  }

  match &report {
    ClassReport::SetupFailed { class, error, .. } => {
      eprintln!("class {class} failed during setup: {error}");
    }
    ClassReport::Completed(summary) => {
      info!(
        class = %summary.class,
        okify_entries = summary.okify_entries,
        "class finished"
      );
      if summary.okify_entries > 0 {
        eprintln!(
          "{} okify entries written to {}",
          summary.okify_entries,
          summary.okify_path.display()
        );
      }
    }
  }

  Ok(if report.all_passed() {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  })
}

async fn open_store(config: &Config) -> Result<SqliteStore> {
  SqliteStore::connect(&config.database_url)
    .await
    .with_context(|| format!("failed to open database: {}", config.database_url))
}

async fn report_engine(config: &Config) -> Result<ReportEngine<SqliteStore>> {
  let store = open_store(config).await?;
  Ok(
    ReportEngine::new(store)
      .with_os_info(config.os_info.clone())
      .with_user(config.current_user()),
  )
}

/// Map a process indicator onto an exit code; signals become 128 + signal.
fn exit_code(code: i32) -> ExitCode {
  let code = if code < 0 { 128 - code } else { code };
  match u8::try_from(code) {
    Ok(code) => ExitCode::from(code),
    Err(_) => {
      warn!(code, "exit code out of range");
      ExitCode::FAILURE
    }
  }
}
