use crate::db::connection::Database;
use crate::errors::ServerError;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

/// A durable string key/value surface.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, ServerError>;
    fn set(&self, key: &str, value: &str) -> Result<(), ServerError>;
    fn remove(&self, key: &str) -> Result<(), ServerError>;
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, ServerError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| ServerError::DbError(e.to_string()))
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ServerError> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
                params![key, value, Utc::now().naive_utc()],
            )?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<(), ServerError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::init_db;

    #[test]
    fn set_get_overwrite_remove() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("kv.sqlite3").to_string_lossy().to_string());
        init_db(&db).unwrap();

        assert_eq!(db.get("k").unwrap(), None);
        db.set("k", "1").unwrap();
        db.set("k", "2").unwrap();
        assert_eq!(db.get("k").unwrap().as_deref(), Some("2"));
        db.remove("k").unwrap();
        assert_eq!(db.get("k").unwrap(), None);
        // Removing again is fine.
        db.remove("k").unwrap();
    }
}
