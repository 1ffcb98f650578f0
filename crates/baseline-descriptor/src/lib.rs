//! Baseline Descriptor
//!
//! A descriptor is the filtered name → value snapshot of the parameters a
//! task ran with. It is built once per invocation and attached to the
//! outcome so a failing test can be inspected later.
//!
//! Parameters come from any [`ParameterSource`]; [`ParFile`] reads the
//! comma-separated parameter files tasks are normally driven by.

mod descriptor;
mod error;
mod par_file;
mod source;
mod value;

pub use descriptor::{
  Descriptor, IGNORE_NAMES, IGNORE_VALUES, SOURCE_ID_KEY, TASKNAME_KEY, extract, extract_into,
  is_ignored,
};
pub use error::DescriptorError;
pub use par_file::ParFile;
pub use source::{Parameter, ParameterSource, StaticParameters};
pub use value::Value;
