//! Baseline Config
//!
//! Configuration for the baseline tools. A single JSON file supplies the
//! database location, where reference artifacts live, the named task
//! registry, and the host → OS table shown in day reports.
//!
//! Every field is optional; a missing file means [`Config::default`].

mod config;
mod error;
mod user;

pub use config::{Config, DEFAULT_DATABASE_URL, DEFAULT_LINK_BASE, DEFAULT_REFERENCE_DIR, TaskDef};
pub use error::ConfigError;
pub use user::{USER_ENV_VARS, current_user, user_from};
