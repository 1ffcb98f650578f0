//! Baseline Store
//!
//! This crate provides the storage trait and implementations for test
//! outcomes. Every execution appends one row per test; nothing is updated
//! or deleted, and reports classify results at query time.
//!
//! The [`ResultStore`] trait defines operations for:
//! - Recording an outcome
//! - Listing the distinct values of a column under a filter
//! - Counting and listing rows under a filter

mod filter;
mod sqlite;
mod types;

pub use filter::{Column, Filter, Match, Order};
pub use sqlite::SqliteStore;
pub use types::{OutcomeRow, Status, UnknownStatus};

use async_trait::async_trait;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// A database error occurred.
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  /// Applying the schema failed.
  #[error("migration error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Storage trait for test outcomes.
///
/// Implementations rely on the backing database for atomicity of a single
/// insert and consistency of a single query; callers hold no locks.
#[async_trait]
pub trait ResultStore: Send + Sync {
  /// Append one outcome.
  async fn record(&self, row: &OutcomeRow) -> Result<(), Error>;

  /// Distinct non-null values of `column` among rows matching `filter`.
  async fn distinct(&self, column: Column, filter: &Filter, order: Order)
  -> Result<Vec<String>, Error>;

  /// Number of rows matching `filter`.
  async fn count(&self, filter: &Filter) -> Result<i64, Error>;

  /// Rows matching `filter`, ordered by project, host and test name.
  async fn rows(&self, filter: &Filter) -> Result<Vec<OutcomeRow>, Error>;
}
