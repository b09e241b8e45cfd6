use anyhow::Result;
use chrono::Local;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// One persisted exchange row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: i32,
    pub session_id: String,
    pub role: String,
    pub content: String,
    /// Which path produced the reply: "remote" or "fallback".
    pub model: String,
    pub timestamp: String,
}

/// SQLite-backed conversation log. Write-only from the engine's point of
/// view; stored rows are never fed back into the request window.
pub struct ConversationStore {
    conn: Connection,
    session_id: String,
}

impl ConversationStore {
    /// Opens (or creates) the database. `None` selects the per-user default.
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = db_path.unwrap_or_else(|| {
            let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            home.join(".config/sprout/sprout.db")
        });

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;
        log::info!("conversation store opened: {}", db_path.display());

        Self::init_schema(&conn)?;

        let session_id = Uuid::new_v4().to_string();
        log::info!("session id: {}", session_id);

        Ok(Self { conn, session_id })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS conversations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                model TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_session_id ON conversations(session_id)",
            [],
        )?;

        Ok(())
    }

    pub fn save_message(&self, role: &str, content: &str, model: &str) -> Result<()> {
        let timestamp = Local::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO conversations (session_id, role, content, model, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![&self.session_id, role, content, model, &timestamp],
        )?;

        log::debug!("saved {} message ({} bytes)", role, content.len());
        Ok(())
    }

    /// All messages of the current session, oldest first.
    pub fn load_session_history(&self) -> Result<Vec<StoredMessage>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, role, content, model, timestamp
             FROM conversations
             WHERE session_id = ?1
             ORDER BY id ASC",
        )?;

        let rows = stmt.query_map(params![&self.session_id], |row| {
            Ok(StoredMessage {
                id: row.get(0)?,
                session_id: row.get(1)?,
                role: row.get(2)?,
                content: row.get(3)?,
                model: row.get(4)?,
                timestamp: row.get(5)?,
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// The most recently active sessions with their message counts.
    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<(String, usize)>> {
        let mut stmt = self.conn.prepare(
            "SELECT session_id, COUNT(*) as count
             FROM conversations
             GROUP BY session_id
             ORDER BY MAX(id) DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i32], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    pub fn clear_session(&self) -> Result<()> {
        let affected = self.conn.execute(
            "DELETE FROM conversations WHERE session_id = ?1",
            params![&self.session_id],
        )?;
        log::info!("cleared {} messages from current session", affected);
        Ok(())
    }

    pub fn message_count(&self) -> Result<usize> {
        let count: usize =
            self.conn
                .query_row("SELECT COUNT(*) FROM conversations", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn stats(&self) -> Result<String> {
        let total = self.message_count()?;

        let sessions: usize = self.conn.query_row(
            "SELECT COUNT(DISTINCT session_id) FROM conversations",
            [],
            |row| row.get(0),
        )?;

        let current: usize = self.conn.query_row(
            "SELECT COUNT(*) FROM conversations WHERE session_id = ?1",
            params![&self.session_id],
            |row| row.get(0),
        )?;

        Ok(format!(
            "{} messages total, {} sessions, {} in current session",
            total, sessions, current
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, ConversationStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConversationStore::new(Some(dir.path().join("test.db"))).unwrap();
        (dir, store)
    }

    #[test]
    fn saved_messages_round_trip_in_order() {
        let (_dir, store) = temp_store();
        store.save_message("user", "How often to water?", "remote").unwrap();
        store.save_message("assistant", "Weekly.", "remote").unwrap();

        let history = store.load_session_history().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, "user");
        assert_eq!(history[1].content, "Weekly.");
        assert_eq!(history[1].model, "remote");
    }

    #[test]
    fn clear_session_removes_only_current_session() {
        let (_dir, store) = temp_store();
        store.save_message("user", "hi", "fallback").unwrap();
        assert_eq!(store.message_count().unwrap(), 1);

        store.clear_session().unwrap();
        assert_eq!(store.message_count().unwrap(), 0);
        assert!(store.load_session_history().unwrap().is_empty());
    }

    #[test]
    fn stats_counts_sessions() {
        let (_dir, store) = temp_store();
        store.save_message("user", "hi", "remote").unwrap();

        let stats = store.stats().unwrap();
        assert!(stats.contains("1 messages total"));
        assert!(stats.contains("1 sessions"));

        let sessions = store.recent_sessions(5).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].1, 1);
    }
}
