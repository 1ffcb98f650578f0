//! Baseline Verify
//!
//! Compares artifacts produced by a task against reference copies and keeps
//! the okify log: one directive per comparison that did not pass, enough to
//! accept the current output as the new reference.
//!
//! A test class runs its task once and then checks each artifact as an
//! independent test:
//!
//! ```text
//! Init → Cleaned → DescriptorBuilt → Executed → Comparing → TornDown
//! ```
//!
//! Errors before `Comparing` fail the whole class ([`SetupError`]); a failing
//! comparison only fails its own check ([`VerifyError`]).

mod check;
mod class;
mod comparator;
mod comparators;
mod error;
mod okify;

pub use check::{
  CheckOptions, ComparisonResult, ComparisonStatus, check_file, compare_artifact, reference_for,
};
pub use class::{
  CheckDef, ClassReport, ClassRun, ClassState, ClassSummary, DEFAULT_COMPARATOR, OKIFY_FILE_KEY,
  PreExecHook, TestClassDef, run_class, run_class_with,
};
pub use comparator::{
  Comparator, ComparatorRegistry, IgnoreList, VALUE_EXCL_LIST, Verdict, default_directive,
  ignore_keys,
};
pub use comparators::{BinaryComparator, KeywordComparator, TextComparator};
pub use error::{ComparisonError, SetupError, VerifyError};
pub use okify::{OkifyLog, okify_path};
