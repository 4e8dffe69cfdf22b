//! Preference (key-value) database operations.

use std::collections::HashMap;

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};

impl Database {
    /// Get a preference value.
    pub fn get_preference(&self, key: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Set a single preference value.
    pub fn set_preference(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO preferences (key, value, updated_at) VALUES (?, ?, datetime('now'))",
            params![key, value],
        )?;
        Ok(())
    }

    /// Read the given keys in one snapshot. Absent keys are omitted.
    pub fn get_preferences(&self, keys: &[&str]) -> DbResult<HashMap<String, String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM preferences")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut values = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            if keys.contains(&key.as_str()) {
                values.insert(key, value);
            }
        }
        Ok(values)
    }

    /// Replace the given entries atomically.
    ///
    /// Keys mapped to `None` are removed. Either every change lands or none do.
    pub fn put_preferences(&mut self, entries: &[(&str, Option<&str>)]) -> DbResult<()> {
        let tx = self.transaction()?;
        for (key, value) in entries {
            match value {
                Some(value) => {
                    tx.execute(
                        "INSERT OR REPLACE INTO preferences (key, value, updated_at) VALUES (?, ?, datetime('now'))",
                        params![key, value],
                    )?;
                }
                None => {
                    tx.execute("DELETE FROM preferences WHERE key = ?", [key])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_get_and_set() {
        let db = setup_db();

        assert_eq!(db.get_preference("token").unwrap(), None);

        db.set_preference("token", "abc").unwrap();
        assert_eq!(db.get_preference("token").unwrap(), Some("abc".into()));

        db.set_preference("token", "def").unwrap();
        assert_eq!(db.get_preference("token").unwrap(), Some("def".into()));
    }

    #[test]
    fn test_put_preferences_sets_and_removes() {
        let mut db = setup_db();
        db.set_preference("role", "patient").unwrap();

        db.put_preferences(&[("token", Some("abc")), ("user_id", Some("u-1")), ("role", None)])
            .unwrap();

        let values = db.get_preferences(&["token", "user_id", "role"]).unwrap();
        assert_eq!(values.get("token"), Some(&"abc".to_string()));
        assert_eq!(values.get("user_id"), Some(&"u-1".to_string()));
        assert!(!values.contains_key("role"));
    }

    #[test]
    fn test_get_preferences_filters_keys() {
        let db = setup_db();
        db.set_preference("token", "abc").unwrap();
        db.set_preference("theme", "dark").unwrap();

        let values = db.get_preferences(&["token"]).unwrap();
        assert_eq!(values.len(), 1);
    }
}
