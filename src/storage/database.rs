//! SQLite-backed object store

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::Settings;
use crate::storage::object_store::ObjectStore;

/// Object store that keeps one row per key in a SQLite table
///
/// Clones share the connection. The async [`ObjectStore`] methods run the
/// blocking queries on tokio's blocking pool.
#[derive(Clone)]
pub struct SqliteObjectStore {
    conn: Arc<Mutex<Connection>>,
    bucket: String,
}

const CURRENT_SCHEMA_VERSION: i64 = 1;

impl SqliteObjectStore {
    /// Open or create the database configured in settings
    pub fn open(settings: &Settings) -> Result<Self> {
        let db_path = settings.database_path();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Self::open_path(&db_path, &settings.storage.bucket)
    }

    /// Open database at a specific path (useful for testing)
    pub fn open_path(path: &Path, bucket: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        Self::from_connection(conn, bucket)
    }

    /// Open an in-memory database (for testing)
    pub fn open_memory(bucket: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, bucket)
    }

    fn from_connection(conn: Connection, bucket: &str) -> Result<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            bucket: bucket.to_string(),
        };
        store.initialize()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("Object store connection lock poisoned"))
    }

    /// Initialize database schema
    fn initialize(&self) -> Result<()> {
        let current_version = self.schema_version()?;
        if current_version > CURRENT_SCHEMA_VERSION {
            anyhow::bail!(
                "Database schema version {} is newer than supported version {}",
                current_version,
                CURRENT_SCHEMA_VERSION
            );
        }

        if current_version < 1 {
            self.migrate_to_v1()?;
            self.set_schema_version(1)?;
        }

        Ok(())
    }

    /// Current schema version tracked in PRAGMA user_version.
    pub fn schema_version(&self) -> Result<i64> {
        Ok(self
            .conn()?
            .query_row("PRAGMA user_version;", [], |row| row.get(0))?)
    }

    fn set_schema_version(&self, version: i64) -> Result<()> {
        self.conn()?
            .execute(&format!("PRAGMA user_version = {}", version), [])?;
        Ok(())
    }

    fn migrate_to_v1(&self) -> Result<()> {
        self.conn()?.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS objects (
                bucket TEXT NOT NULL,
                key TEXT NOT NULL,
                body BLOB NOT NULL,
                content_type TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (bucket, key)
            );
            "#,
        )?;

        Ok(())
    }

    /// Bucket this store reads and writes
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Read an object together with its content type
    pub fn get_object(&self, key: &str) -> Result<Option<(Vec<u8>, String)>> {
        let object = self
            .conn()?
            .query_row(
                "SELECT body, content_type FROM objects WHERE bucket = ?1 AND key = ?2",
                params![self.bucket, key],
                |row| Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        Ok(object)
    }

    /// Insert or replace an object
    pub fn put_object(&self, key: &str, body: &[u8], content_type: &str) -> Result<()> {
        self.conn()?.execute(
            r#"
            INSERT INTO objects (bucket, key, body, content_type, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(bucket, key) DO UPDATE SET
                body = excluded.body,
                content_type = excluded.content_type,
                updated_at = excluded.updated_at
            "#,
            params![
                self.bucket,
                key,
                body,
                content_type,
                Utc::now().timestamp(),
            ],
        )?;

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for SqliteObjectStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let store = self.clone();
        let key = key.to_string();
        let object = tokio::task::spawn_blocking(move || store.get_object(&key))
            .await
            .context("Object store read task failed")??;

        Ok(object.map(|(body, _)| body))
    }

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        let store = self.clone();
        let key = key.to_string();
        let content_type = content_type.to_string();
        tokio::task::spawn_blocking(move || store.put_object(&key, &body, &content_type))
            .await
            .context("Object store write task failed")?
    }
}
