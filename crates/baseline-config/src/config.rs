use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::user::current_user;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://baseline.db?mode=rwc";
pub const DEFAULT_REFERENCE_DIR: &str = "ref";
pub const DEFAULT_LINK_BASE: &str = "baseline";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Connection URL for the outcome database.
  pub database_url: String,

  /// Directory holding reference artifacts, keyed by file name.
  pub reference_dir: PathBuf,

  /// Overrides the user name used to expand `-me`.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user: Option<String>,

  /// Host name → operating system description.
  pub os_info: HashMap<String, String>,

  /// Named tasks, resolved by the task registry.
  pub tasks: HashMap<String, TaskDef>,

  /// Base URL prepended to drill-down links in html output.
  pub link_base: String,
}

/// An external program registered under a task name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDef {
  pub program: String,
  #[serde(default)]
  pub args: Vec<String>,
  /// Extra environment, layered over the caller's environment.
  #[serde(default)]
  pub env: HashMap<String, String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      database_url: DEFAULT_DATABASE_URL.to_string(),
      reference_dir: PathBuf::from(DEFAULT_REFERENCE_DIR),
      user: None,
      os_info: HashMap::new(),
      tasks: HashMap::new(),
      link_base: DEFAULT_LINK_BASE.to_string(),
    }
  }
}

impl Config {
  /// Load configuration from a JSON file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&content)
  }

  /// Load from `path` when given, otherwise fall back to defaults.
  pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
    match path {
      Some(p) => Self::load(p),
      None => Ok(Self::default()),
    }
  }

  /// Parse configuration from a JSON string.
  pub fn from_json(content: &str) -> Result<Self, ConfigError> {
    Ok(serde_json::from_str(content)?)
  }

  /// The user `-me` expands to.
  pub fn current_user(&self) -> String {
    self.user.clone().unwrap_or_else(current_user)
  }
}
