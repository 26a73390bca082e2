//! SQLite Fact Storage
//!
//! Information Hiding:
//! - Table schema and SQL hidden from users
//! - Blocking rusqlite calls moved off the async runtime
//! - Seeding is idempotent through a uniqueness constraint

use super::seed::DEBATE_FACTS;
use super::FactStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS facts (
    topic TEXT NOT NULL,
    fact TEXT NOT NULL,
    UNIQUE (topic, fact)
)";

/// Fact table stored in a single `facts(topic, fact)` SQLite table
pub struct SqliteFactStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteFactStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open fact database {:?}", path))?;
        tracing::debug!("[SqliteFactStore] Opened {:?}", path);
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory fact database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(SCHEMA, [])
            .context("Failed to create facts table")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("Fact database lock poisoned"))
    }

    /// Insert a fact; returns false when the pair already exists.
    ///
    /// Topics are stored lower-cased so lookups never depend on SQLite's
    /// ASCII-only `lower()`.
    pub fn insert(&self, topic: &str, fact: &str) -> Result<bool> {
        let topic = topic.trim().to_lowercase();
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "INSERT OR IGNORE INTO facts (topic, fact) VALUES (?1, ?2)",
                params![topic, fact],
            )
            .context("Failed to insert fact")?;
        Ok(changed > 0)
    }

    /// Load the sample debate facts; returns how many rows were new
    pub fn seed_defaults(&self) -> Result<usize> {
        let mut inserted = 0;
        for (topic, fact) in DEBATE_FACTS {
            if self.insert(topic, fact)? {
                inserted += 1;
            }
        }
        tracing::info!("[SqliteFactStore] Seeded {} new fact(s)", inserted);
        Ok(inserted)
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM facts", [], |row| row.get(0))
            .context("Failed to count facts")?;
        Ok(count as usize)
    }
}

#[async_trait]
impl FactStore for SqliteFactStore {
    async fn lookup(&self, topic: &str) -> Result<Vec<String>> {
        let conn = Arc::clone(&self.conn);
        let topic = topic.trim().to_lowercase();

        tokio::task::spawn_blocking(move || -> Result<Vec<String>> {
            let conn = conn
                .lock()
                .map_err(|_| anyhow::anyhow!("Fact database lock poisoned"))?;
            let mut stmt = conn.prepare(
                "SELECT fact FROM facts WHERE instr(topic, ?1) > 0 ORDER BY rowid",
            )?;
            let rows = stmt.query_map([&topic], |row| row.get::<_, String>(0))?;
            let facts = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(facts)
        })
        .await
        .context("Fact lookup task failed")?
    }
}
