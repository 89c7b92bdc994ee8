// 🗄️ Record Store - SQLite persistence for SWIFT code records
//
// The UNIQUE constraint on swift_code is the real uniqueness guarantee.
// Application-level existence checks are a courtesy that concurrent writers can race past.

use crate::error::{RegistryError, Result};
use crate::model::SwiftCodeRecord;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// STORE CONTRACT
// ============================================================================

/// Persistence operations the registry needs.
///
/// Every lookup is an exact match on the stored (already upper-cased) value.
pub trait SwiftCodeStore {
    fn find_by_code(&self, code: &str) -> Result<Option<SwiftCodeRecord>>;

    fn find_by_country(&self, country_iso2: &str) -> Result<Vec<SwiftCodeRecord>>;

    /// Records whose code starts with `prefix`, except `excluded_code` itself
    fn find_by_prefix_excluding(
        &self,
        prefix: &str,
        excluded_code: &str,
    ) -> Result<Vec<SwiftCodeRecord>>;

    fn exists_by_code(&self, code: &str) -> Result<bool>;

    /// Insert a new record. A duplicate code is a `Conflict`, never an overwrite.
    fn save(&self, record: &SwiftCodeRecord) -> Result<SwiftCodeRecord>;

    /// Delete by exact code; returns the number of rows removed.
    fn delete_by_code(&self, code: &str) -> Result<usize>;

    fn count(&self) -> Result<i64>;

    /// Append to the audit trail
    fn append_event(&self, event: &Event) -> Result<()>;

    /// Run `f` as one transaction: commit on `Ok`, roll back on `Err`.
    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
        Self: Sized;
}

// ============================================================================
// AUDIT EVENTS
// ============================================================================

/// Event for the audit trail ("every change is an event")
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }

    /// A record was inserted
    pub fn swift_code_added(record: &SwiftCodeRecord, actor: &str) -> Self {
        Event::new(
            "swift_code_added",
            "swift_code",
            &record.swift_code,
            serde_json::json!({
                "bank_name": record.bank_name,
                "country_iso2": record.country_iso2,
                "is_headquarter": record.is_headquarter,
            }),
            actor,
        )
    }

    /// A record was deleted
    pub fn swift_code_deleted(code: &str, actor: &str) -> Self {
        Event::new(
            "swift_code_deleted",
            "swift_code",
            code,
            serde_json::json!({}),
            actor,
        )
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // SWIFT codes table
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS swift_codes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            swift_code TEXT UNIQUE NOT NULL,
            bank_name TEXT NOT NULL,
            address TEXT NOT NULL,
            town_name TEXT,
            is_headquarter INTEGER NOT NULL,
            country_iso2 TEXT NOT NULL,
            country_name TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Events Table (audit trail)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_country_iso2 ON swift_codes(country_iso2)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id)",
        [],
    )?;

    Ok(())
}

/// Insert event into audit trail
pub fn insert_event(conn: &Connection, event: &Event) -> Result<()> {
    let data_json = serde_json::to_string(&event.data)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    conn.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_type, entity_id, data, actor
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            event.entity_id,
            data_json,
            event.actor,
        ],
    )?;

    Ok(())
}

/// Get events for a specific entity, oldest first
pub fn get_events_for_entity(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY id ASC",
    )?;

    let events = stmt
        .query_map(params![entity_type, entity_id], |row| {
            let timestamp_str: String = row.get(1)?;
            let data_json: String = row.get(5)?;

            Ok(Event {
                event_id: row.get(0)?,
                timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?
                    .with_timezone(&Utc),
                event_type: row.get(2)?,
                entity_type: row.get(3)?,
                entity_id: row.get(4)?,
                data: serde_json::from_str(&data_json)
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?,
                actor: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(events)
}

const RECORD_COLUMNS: &str =
    "swift_code, bank_name, address, town_name, is_headquarter, country_iso2, country_name";

fn row_to_record(row: &Row) -> rusqlite::Result<SwiftCodeRecord> {
    Ok(SwiftCodeRecord {
        swift_code: row.get(0)?,
        bank_name: row.get(1)?,
        address: row.get(2)?,
        town_name: row.get(3)?,
        is_headquarter: row.get(4)?,
        country_iso2: row.get(5)?,
        country_name: row.get(6)?,
    })
}

// ============================================================================
// SQLITE STORE
// ============================================================================

/// `SwiftCodeStore` backed by a single SQLite connection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database file and make sure the schema exists.
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::from_connection(conn)
    }

    /// Private database, mostly for tests and one-off CLI runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(SqliteStore { conn })
    }

    /// Audit trail for one code
    pub fn events_for(&self, code: &str) -> Result<Vec<Event>> {
        get_events_for_entity(&self.conn, "swift_code", code)
    }

    fn query_records(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<SwiftCodeRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let records = stmt
            .query_map(params, row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }
}

impl SwiftCodeStore for SqliteStore {
    fn find_by_code(&self, code: &str) -> Result<Option<SwiftCodeRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {} FROM swift_codes WHERE swift_code = ?1", RECORD_COLUMNS),
                params![code],
                row_to_record,
            )
            .optional()?;

        Ok(record)
    }

    fn find_by_country(&self, country_iso2: &str) -> Result<Vec<SwiftCodeRecord>> {
        self.query_records(
            &format!(
                "SELECT {} FROM swift_codes WHERE country_iso2 = ?1 ORDER BY swift_code",
                RECORD_COLUMNS
            ),
            params![country_iso2],
        )
    }

    fn find_by_prefix_excluding(
        &self,
        prefix: &str,
        excluded_code: &str,
    ) -> Result<Vec<SwiftCodeRecord>> {
        // Literal prefix comparison; LIKE would treat % and _ as wildcards
        let prefix_len = prefix.chars().count() as i64;

        self.query_records(
            &format!(
                "SELECT {} FROM swift_codes
                 WHERE substr(swift_code, 1, ?1) = ?2 AND swift_code <> ?3
                 ORDER BY swift_code",
                RECORD_COLUMNS
            ),
            params![prefix_len, prefix, excluded_code],
        )
    }

    fn exists_by_code(&self, code: &str) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM swift_codes WHERE swift_code = ?1)",
            params![code],
            |row| row.get(0),
        )?;

        Ok(exists)
    }

    fn save(&self, record: &SwiftCodeRecord) -> Result<SwiftCodeRecord> {
        let result = self.conn.execute(
            "INSERT INTO swift_codes (
                swift_code, bank_name, address, town_name,
                is_headquarter, country_iso2, country_name
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.swift_code,
                record.bank_name,
                record.address,
                record.town_name,
                record.is_headquarter,
                record.country_iso2,
                record.country_name,
            ],
        );

        match result {
            Ok(_) => Ok(record.clone()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(RegistryError::Conflict("SWIFT code already exists.".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn delete_by_code(&self, code: &str) -> Result<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM swift_codes WHERE swift_code = ?1", params![code])?;

        Ok(deleted)
    }

    fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM swift_codes", [], |row| row.get(0))?;

        Ok(count)
    }

    fn append_event(&self, event: &Event) -> Result<()> {
        insert_event(&self.conn, event)
    }

    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        let tx = self.conn.unchecked_transaction()?;

        // Dropping tx without commit rolls back
        let value = f(self)?;
        tx.commit()?;

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, iso2: &str, country: &str) -> SwiftCodeRecord {
        SwiftCodeRecord::new(code, "TEST BANK", "TEST ADDRESS", None, iso2, country).normalized()
    }

    fn seeded_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.save(&record("AAISALTRXXX", "AL", "ALBANIA")).unwrap();
        store.save(&record("AAISALTRAL1", "AL", "ALBANIA")).unwrap();
        store.save(&record("AAISALTRAL2", "AL", "ALBANIA")).unwrap();
        store.save(&record("BCCSCLR1XXX", "CL", "CHILE")).unwrap();
        store
    }

    #[test]
    fn test_save_and_find_by_code() {
        let store = seeded_store();

        let found = store.find_by_code("AAISALTRXXX").unwrap().unwrap();
        assert_eq!(found.swift_code, "AAISALTRXXX");
        assert!(found.is_headquarter);
        assert_eq!(found.country_name, "ALBANIA");

        assert!(store.find_by_code("ZZZZZZZZXXX").unwrap().is_none());
        assert_eq!(store.count().unwrap(), 4);
    }

    #[test]
    fn test_duplicate_save_is_conflict() {
        let store = seeded_store();

        let err = store.save(&record("AAISALTRXXX", "AL", "ALBANIA")).unwrap_err();
        assert!(matches!(err, RegistryError::Conflict(_)));
        assert_eq!(store.count().unwrap(), 4);
    }

    #[test]
    fn test_find_by_country() {
        let store = seeded_store();

        let albania = store.find_by_country("AL").unwrap();
        assert_eq!(albania.len(), 3);
        assert_eq!(albania[0].swift_code, "AAISALTRAL1");

        assert!(store.find_by_country("PL").unwrap().is_empty());
    }

    #[test]
    fn test_find_by_prefix_excluding_self() {
        let store = seeded_store();

        let branches = store
            .find_by_prefix_excluding("AAISALTR", "AAISALTRXXX")
            .unwrap();
        let codes: Vec<_> = branches.iter().map(|r| r.swift_code.as_str()).collect();
        assert_eq!(codes, vec!["AAISALTRAL1", "AAISALTRAL2"]);

        let none = store
            .find_by_prefix_excluding("BCCSCLR1", "BCCSCLR1XXX")
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_prefix_is_literal() {
        let store = seeded_store();

        let wildcard = store.find_by_prefix_excluding("AAIS%", "NONE").unwrap();
        assert!(wildcard.is_empty());
    }

    #[test]
    fn test_exists_and_delete() {
        let store = seeded_store();

        assert!(store.exists_by_code("BCCSCLR1XXX").unwrap());
        assert_eq!(store.delete_by_code("BCCSCLR1XXX").unwrap(), 1);
        assert!(!store.exists_by_code("BCCSCLR1XXX").unwrap());
        assert_eq!(store.delete_by_code("BCCSCLR1XXX").unwrap(), 0);
    }

    #[test]
    fn test_delete_does_not_cascade() {
        let store = seeded_store();

        store.delete_by_code("AAISALTRXXX").unwrap();
        assert!(store.exists_by_code("AAISALTRAL1").unwrap());
        assert!(store.exists_by_code("AAISALTRAL2").unwrap());
    }

    #[test]
    fn test_atomically_commits_on_ok() {
        let store = SqliteStore::open_in_memory().unwrap();

        store
            .atomically(|s| {
                s.save(&record("AAISALTRXXX", "AL", "ALBANIA"))?;
                s.save(&record("AAISALTRAL1", "AL", "ALBANIA"))?;
                Ok(())
            })
            .unwrap();

        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_atomically_rolls_back_on_err() {
        let store = SqliteStore::open_in_memory().unwrap();

        let result: Result<()> = store.atomically(|s| {
            s.save(&record("AAISALTRXXX", "AL", "ALBANIA"))?;
            Err(RegistryError::Io("source vanished".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_event_log() {
        let store = SqliteStore::open_in_memory().unwrap();
        let rec = record("AAISALTRXXX", "AL", "ALBANIA");

        store.append_event(&Event::swift_code_added(&rec, "test_actor")).unwrap();
        store
            .append_event(&Event::swift_code_deleted("AAISALTRXXX", "test_actor"))
            .unwrap();

        let events = store.events_for("AAISALTRXXX").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "swift_code_added");
        assert_eq!(events[0].data["country_iso2"], "AL");
        assert_eq!(events[1].event_type, "swift_code_deleted");
        assert_eq!(events[1].actor, "test_actor");
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swift.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.save(&record("BCCSCLR1XXX", "CL", "CHILE")).unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert!(reopened.exists_by_code("BCCSCLR1XXX").unwrap());
    }
}
