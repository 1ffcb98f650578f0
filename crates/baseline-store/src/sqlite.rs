use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::debug;

use crate::filter::{Column, Filter, Order};
use crate::types::OutcomeRow;
use crate::{Error, ResultStore};

/// How long a writer waits for a competing lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based store implementation.
#[derive(Clone)]
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  /// Create a new SQLite store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Open `url`, creating the database if needed, and apply migrations.
  ///
  /// In-memory databases get a single connection that is never recycled, so
  /// every query sees the same database. File databases use WAL so readers
  /// do not wait on appenders.
  pub async fn connect(url: &str) -> Result<Self, Error> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

    let (options, pool_options) = if url.contains(":memory:") {
      (
        options,
        SqlitePoolOptions::new()
          .max_connections(1)
          .idle_timeout(None)
          .max_lifetime(None),
      )
    } else {
      (
        options
          .journal_mode(SqliteJournalMode::Wal)
          .busy_timeout(BUSY_TIMEOUT),
        SqlitePoolOptions::new().max_connections(5),
      )
    };

    let pool = pool_options.connect_with(options).await?;

    let store = Self::new(pool);
    store.migrate().await?;
    Ok(store)
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(&self.pool).await
  }
}

#[async_trait]
impl ResultStore for SqliteStore {
  async fn record(&self, row: &OutcomeRow) -> Result<(), Error> {
    sqlx::query(
      r#"
            INSERT INTO outcomes (test_run, project, host, test_name, status, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
    )
    .bind(&row.test_run)
    .bind(&row.project)
    .bind(&row.host)
    .bind(&row.test_name)
    .bind(row.status)
    .bind(row.recorded_at)
    .execute(&self.pool)
    .await?;

    Ok(())
  }

  async fn distinct(
    &self,
    column: Column,
    filter: &Filter,
    order: Order,
  ) -> Result<Vec<String>, Error> {
    let (conditions, binds) = filter.to_sql();
    let sql = format!(
      "SELECT DISTINCT {col} FROM outcomes{conditions} ORDER BY {col} {order}",
      col = column.as_sql(),
      order = order.as_sql(),
    );
    debug!(%sql, ?binds, "distinct");

    let mut query = sqlx::query_scalar::<_, Option<String>>(&sql);
    for value in binds {
      query = query.bind(value);
    }

    let values = query.fetch_all(&self.pool).await?;
    Ok(values.into_iter().flatten().collect())
  }

  async fn count(&self, filter: &Filter) -> Result<i64, Error> {
    let (conditions, binds) = filter.to_sql();
    let sql = format!("SELECT COUNT(*) FROM outcomes{conditions}");

    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    for value in binds {
      query = query.bind(value);
    }

    Ok(query.fetch_one(&self.pool).await?)
  }

  async fn rows(&self, filter: &Filter) -> Result<Vec<OutcomeRow>, Error> {
    let (conditions, binds) = filter.to_sql();
    let sql = format!(
      "SELECT test_run, project, host, test_name, status, recorded_at FROM outcomes{conditions} \
       ORDER BY project, host, test_name, id"
    );

    let mut query = sqlx::query_as::<_, OutcomeRow>(&sql);
    for value in binds {
      query = query.bind(value);
    }

    Ok(query.fetch_all(&self.pool).await?)
  }
}
