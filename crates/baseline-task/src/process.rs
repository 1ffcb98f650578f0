//! Generic external process execution.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::{info, instrument};

use crate::error::TaskExecutionError;
use crate::fs::ensure_absent;

/// Flush our own buffered output so it lands before the child's.
pub fn flush_stdio() {
  let _ = std::io::stdout().flush();
  let _ = std::io::stderr().flush();
}

/// Environment handed to a child process.
#[derive(Debug, Clone, Copy, Default)]
pub enum ProcessEnv<'a> {
  /// The child inherits ours unchanged.
  #[default]
  Inherit,
  /// Our environment with these variables set on top.
  Extend(&'a HashMap<String, String>),
  /// Exactly these variables.
  Replace(&'a HashMap<String, String>),
}

/// Run `args[0]` with the remaining arguments, capturing stdout and stderr
/// into `output`.
///
/// Returns the exit code; a child killed by a signal reports the
/// negated signal number.
#[instrument(
  name = "process_run",
  skip(args, env, output),
  fields(
    program = args.first().map(String::as_str).unwrap_or(""),
    output = %output.display(),
  )
)]
pub async fn run_process(
  args: &[String],
  env: ProcessEnv<'_>,
  output: &Path,
) -> Result<i32, TaskExecutionError> {
  let (program, rest) = args.split_first().ok_or(TaskExecutionError::EmptyCommand)?;

  ensure_absent(output).await?;
  flush_stdio();

  let stdout = std::fs::File::create(output)?;
  let stderr = stdout.try_clone()?;

  let mut command = Command::new(program);
  command
    .args(rest)
    .stdin(Stdio::null())
    .stdout(Stdio::from(stdout))
    .stderr(Stdio::from(stderr));

  match env {
    ProcessEnv::Inherit => {}
    ProcessEnv::Extend(vars) => {
      command.envs(vars);
    }
    ProcessEnv::Replace(vars) => {
      command.env_clear().envs(vars);
    }
  }

  let status = command
    .status()
    .await
    .map_err(|source| TaskExecutionError::Spawn {
      program: program.clone(),
      source,
    })?;

  let code = exit_code(status);
  info!(code, "process exited");
  Ok(code)
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
  use std::os::unix::process::ExitStatusExt;
  status
    .code()
    .or_else(|| status.signal().map(|s| -s))
    .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
  status.code().unwrap_or(-1)
}
