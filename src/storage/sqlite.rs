use crate::sentiment::Sentiment;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS reviews (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text TEXT NOT NULL,
        sentiment TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_sentiment ON reviews(sentiment);
";

/// Failure raised by the durable store during insert or scan
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A persisted review
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: i64,
    pub text: String,
    pub sentiment: Sentiment,
    pub created_at: String,
}

impl Review {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Review {
            id: row.get(0)?,
            text: row.get(1)?,
            sentiment: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

impl ToSql for Sentiment {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Sentiment {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// SQLite-backed review table.
///
/// The store only remembers where the database lives. Every operation opens
/// its own connection, which is closed when the operation returns.
#[derive(Debug, Clone)]
pub struct ReviewStore {
    path: PathBuf,
    busy_timeout: Duration,
}

impl ReviewStore {
    pub fn new(path: impl Into<PathBuf>, busy_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            busy_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the table and sentiment index if they do not exist yet
    pub fn initialize(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute_batch(SCHEMA)?;
        info!(path = ?self.path, "Review table ready");
        Ok(())
    }

    /// Append a review and return the id assigned to it
    pub fn insert(
        &self,
        text: &str,
        sentiment: Sentiment,
        created_at: &str,
    ) -> Result<i64, StoreError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO reviews (text, sentiment, created_at) VALUES (?1, ?2, ?3)",
            params![text, sentiment, created_at],
        )?;
        let id = conn.last_insert_rowid();
        debug!(id, %sentiment, "Inserted review row");
        Ok(id)
    }

    /// All reviews in insertion order, optionally restricted to one sentiment
    /// value. The filter is compared verbatim, so an unknown label matches
    /// nothing.
    pub fn list(&self, sentiment: Option<&str>) -> Result<Vec<Review>, StoreError> {
        let conn = self.connect()?;

        let reviews = match sentiment {
            Some(sentiment) => {
                let mut stmt = conn.prepare(
                    "SELECT id, text, sentiment, created_at FROM reviews
                     WHERE sentiment = ?1 ORDER BY id",
                )?;
                let rows = stmt.query_map([sentiment], Review::from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt =
                    conn.prepare("SELECT id, text, sentiment, created_at FROM reviews ORDER BY id")?;
                let rows = stmt.query_map([], Review::from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        debug!(filter = ?sentiment, found = reviews.len(), "Scanned reviews");
        Ok(reviews)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM reviews", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, ReviewStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ReviewStore::new(dir.path().join("reviews.db"), Duration::from_millis(500));
        store.initialize().unwrap();
        (dir, store)
    }

    #[test]
    fn schema_has_table_and_index() {
        let (_dir, store) = create_test_store();

        let conn = Connection::open(store.path()).unwrap();
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type IN ('table', 'index')")
            .unwrap();
        let names: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert!(names.contains(&"reviews".to_string()));
        assert!(names.contains(&"idx_sentiment".to_string()));
    }

    #[test]
    fn initialize_is_idempotent() {
        let (_dir, store) = create_test_store();
        store
            .insert("first", Sentiment::Neutral, "2024-01-01T00:00:00Z")
            .unwrap();

        store.initialize().unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn ids_increase_and_list_keeps_insertion_order() {
        let (_dir, store) = create_test_store();

        let a = store.insert("a", Sentiment::Positive, "t1").unwrap();
        let b = store.insert("b", Sentiment::Negative, "t2").unwrap();
        let c = store.insert("c", Sentiment::Positive, "t3").unwrap();
        assert!(a < b && b < c);

        let all = store.list(None).unwrap();
        let ids: Vec<i64> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a, b, c]);
        assert_eq!(
            all[1],
            Review {
                id: b,
                text: "b".into(),
                sentiment: Sentiment::Negative,
                created_at: "t2".into(),
            }
        );
    }

    #[test]
    fn filter_returns_matching_subset() {
        let (_dir, store) = create_test_store();
        store.insert("a", Sentiment::Positive, "t1").unwrap();
        store.insert("b", Sentiment::Negative, "t2").unwrap();
        store.insert("c", Sentiment::Positive, "t3").unwrap();

        let positive = store.list(Some("positive")).unwrap();
        assert_eq!(positive.len(), 2);
        assert!(positive.iter().all(|r| r.sentiment == Sentiment::Positive));

        assert!(store.list(Some("neutral")).unwrap().is_empty());
        assert!(store.list(Some("furious")).unwrap().is_empty());
    }

    #[test]
    fn reviews_survive_reopening() {
        let (dir, store) = create_test_store();
        let id = store.insert("durable", Sentiment::Neutral, "t").unwrap();
        drop(store);

        let reopened = ReviewStore::new(dir.path().join("reviews.db"), Duration::from_millis(500));
        reopened.initialize().unwrap();
        let all = reopened.list(None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
    }

    #[test]
    fn unreachable_database_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReviewStore::new(
            dir.path().join("missing").join("reviews.db"),
            Duration::from_millis(500),
        );

        assert!(matches!(
            store.insert("x", Sentiment::Neutral, "t"),
            Err(StoreError::Sqlite(_))
        ));
        assert!(store.list(None).is_err());
    }

    #[test]
    fn unknown_stored_label_fails_the_scan() {
        let (_dir, store) = create_test_store();
        let conn = Connection::open(store.path()).unwrap();
        conn.execute(
            "INSERT INTO reviews (text, sentiment, created_at) VALUES ('x', 'mixed', 't')",
            [],
        )
        .unwrap();

        assert!(store.list(None).is_err());
    }

    #[test]
    fn locked_database_fails_after_busy_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReviewStore::new(dir.path().join("reviews.db"), Duration::from_millis(100));
        store.initialize().unwrap();

        let holder = Connection::open(store.path()).unwrap();
        holder.execute_batch("BEGIN EXCLUSIVE").unwrap();

        let started = std::time::Instant::now();
        assert!(matches!(
            store.insert("blocked", Sentiment::Neutral, "t1"),
            Err(StoreError::Sqlite(_))
        ));
        assert!(started.elapsed() >= Duration::from_millis(100));

        holder.execute_batch("COMMIT").unwrap();

        let id = store.insert("after", Sentiment::Neutral, "t2").unwrap();
        let all = store.list(None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
    }
}
