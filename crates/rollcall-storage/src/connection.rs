//! Opening the attendance database.
//!
//! One process owns the database: the dispatch loop writes enrollments and
//! reads the enrolled set, so the pool stays small. WAL mode lets the
//! lookups of an identification run while an enrollment commits.

use crate::error::{StorageError, StorageResult};
use sqlx::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Default database file, relative to the working directory.
pub const DEFAULT_DATABASE_PATH: &str = "rollcall.db";

/// Where and how to open the attendance database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// SQLite file; missing parent directories are created.
    pub path: PathBuf,

    /// Pooled connections.
    pub pool_size: u32,

    /// How long a statement waits on a locked database.
    pub busy_timeout: Duration,

    /// How long a caller waits for a pooled connection.
    pub acquire_timeout: Duration,

    pub create_if_missing: bool,

    /// Apply pending migrations when opening.
    pub migrate_on_open: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
            pool_size: 4,
            busy_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(10),
            create_if_missing: true,
            migrate_on_open: true,
        }
    }
}

impl DatabaseConfig {
    /// Defaults, stored at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn pool_size(mut self, size: u32) -> Self {
        self.pool_size = size.max(1);
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    pub fn migrate_on_open(mut self, migrate: bool) -> Self {
        self.migrate_on_open = migrate;
        self
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(self.create_if_missing)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(self.busy_timeout)
            .disable_statement_logging()
    }
}

/// Pooled handle on the attendance database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the database described by `config`.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Configuration`] if the parent directory cannot be created
    /// - [`StorageError::Database`] if SQLite cannot open the file
    /// - [`StorageError::Migration`] if a migration fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rollcall_storage::{Database, DatabaseConfig};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let db = Database::open(DatabaseConfig::new("data/rollcall.db").pool_size(2)).await?;
    /// db.health_check().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn open(config: DatabaseConfig) -> StorageResult<Self> {
        ensure_parent_dir(&config.path)?;

        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(config.connect_options())
            .await?;

        let db = Self { pool };
        if config.migrate_on_open {
            db.migrate().await?;
        }

        info!("Opened attendance database {}", config.path.display());
        Ok(db)
    }

    /// A migrated database that lives only as long as the returned handle.
    pub async fn in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);

        // A second connection would see a different empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Apply the workspace `migrations/` not yet recorded in this database.
    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        debug!("Attendance schema up to date");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool once checked-out connections come back.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> StorageResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Configuration(format!(
                    "cannot create {}: {}",
                    parent.display(),
                    e
                ))
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = DatabaseConfig::default();

        assert_eq!(config.path, PathBuf::from("rollcall.db"));
        assert_eq!(config.pool_size, 4);
        assert!(config.create_if_missing);
        assert!(config.migrate_on_open);
    }

    #[test]
    fn test_config_builder() {
        let config = DatabaseConfig::new("/var/lib/rollcall/attendance.db")
            .pool_size(0)
            .busy_timeout(Duration::from_millis(250))
            .create_if_missing(false)
            .migrate_on_open(false);

        assert_eq!(config.path, PathBuf::from("/var/lib/rollcall/attendance.db"));
        assert_eq!(config.pool_size, 1);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert!(!config.create_if_missing);
        assert!(!config.migrate_on_open);
    }

    #[tokio::test]
    async fn test_in_memory_is_migrated() {
        let db = Database::in_memory().await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM students")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_missing_file_without_create_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig::new(dir.path().join("absent.db")).create_if_missing(false);

        let result = Database::open(config).await;
        assert!(matches!(result, Err(StorageError::Database(_))));
    }
}
