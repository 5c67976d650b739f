use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::persist::SlotStorage;

pub const DB_FILE_NAME: &str = "gradebook.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_slots(
            slot TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;

    // Workspaces created before slot timestamps existed lack updated_at.
    ensure_kv_slots_updated_at(&conn)?;

    Ok(conn)
}

fn ensure_kv_slots_updated_at(conn: &Connection) -> anyhow::Result<()> {
    let mut stmt = conn.prepare("PRAGMA table_info(kv_slots)")?;
    let cols = stmt
        .query_map([], |r| r.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    if !cols.iter().any(|c| c == "updated_at") {
        conn.execute("ALTER TABLE kv_slots ADD COLUMN updated_at TEXT", [])?;
    }
    Ok(())
}

pub fn slot_get(conn: &Connection, slot: &str) -> anyhow::Result<Option<String>> {
    let v = conn
        .query_row("SELECT value FROM kv_slots WHERE slot = ?", [slot], |r| {
            r.get::<_, String>(0)
        })
        .optional()?;
    Ok(v)
}

pub fn slot_set(conn: &Connection, slot: &str, value: &str) -> anyhow::Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO kv_slots(slot, value, updated_at) VALUES(?, ?, ?)
         ON CONFLICT(slot) DO UPDATE SET
           value = excluded.value,
           updated_at = excluded.updated_at",
        (slot, value, &now),
    )?;
    Ok(())
}

/// `SlotStorage` over the workspace database.
pub struct SqliteSlots {
    conn: Connection,
}

impl SqliteSlots {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl SlotStorage for SqliteSlots {
    fn read_slot(&self, name: &str) -> anyhow::Result<Option<String>> {
        slot_get(&self.conn, name)
    }

    fn write_slot(&mut self, name: &str, blob: &str) -> anyhow::Result<()> {
        slot_set(&self.conn, name, blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!(
            "{}-{}",
            prefix,
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    #[test]
    fn slots_overwrite_and_survive_reopen() {
        let workspace = temp_dir("gradebook-db-slots");
        {
            let mut slots = SqliteSlots::new(open_db(&workspace).expect("open db"));
            assert_eq!(slots.read_slot("a").expect("read"), None);
            slots.write_slot("a", "one").expect("write");
            slots.write_slot("a", "two").expect("overwrite");
        }
        let slots = SqliteSlots::new(open_db(&workspace).expect("reopen db"));
        assert_eq!(slots.read_slot("a").expect("read"), Some("two".to_string()));
        let _ = std::fs::remove_dir_all(workspace);
    }

    #[test]
    fn old_slot_table_gets_updated_at_column() {
        let workspace = temp_dir("gradebook-db-migrate");
        {
            let conn = Connection::open(workspace.join(DB_FILE_NAME)).expect("open raw");
            conn.execute(
                "CREATE TABLE kv_slots(slot TEXT PRIMARY KEY, value TEXT NOT NULL)",
                [],
            )
            .expect("create old table");
            conn.execute(
                "INSERT INTO kv_slots(slot, value) VALUES('gradebook.state', '{}')",
                [],
            )
            .expect("seed");
        }
        let conn = open_db(&workspace).expect("open db");
        slot_set(&conn, "gradebook.state", "{\"cells\":{}}").expect("set");
        let stamped: Option<String> = conn
            .query_row(
                "SELECT updated_at FROM kv_slots WHERE slot = 'gradebook.state'",
                [],
                |r| r.get(0),
            )
            .expect("query");
        assert!(stamped.is_some());
        let _ = std::fs::remove_dir_all(workspace);
    }
}
