//! Task execution for baseline.
//!
//! Runs external tools with stdout and stderr captured into a single file.
//! Two entry points exist:
//! - [`run_process`] runs an explicit argument list and returns its exit code
//! - [`run_task`] resolves a task name through a [`TaskRegistry`], extracts
//!   the invocation's descriptor and fails with
//!   [`TaskExecutionError::Failed`] when the task reports an error
//!
//! The capture file is always removed before a run so output from an earlier
//! run can never be mistaken for the current one.

mod cat;
mod error;
mod fs;
mod process;
mod registry;
mod runner;

pub use cat::{CHUNK_SIZE, cat, cat_to_stdout};
pub use error::TaskExecutionError;
pub use fs::ensure_absent;
pub use process::{ProcessEnv, flush_stdio, run_process};
pub use registry::{
  CommandTask, ConfiguredTaskRegistry, InMemoryTaskRegistry, Task, TaskRegistry,
};
pub use runner::{TaskInvocation, invoke_task, run_task};
