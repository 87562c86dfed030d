use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use rem_core::{ExperientialRecord, import_json};

use crate::error::{Result, StoreError};
use crate::schema;

/// Characters of normalized text kept in the summary column.
const NARRATIVE_PREVIEW_CHARS: usize = 80;

/// Indexed columns of a stored record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecordSummary {
    pub rem_id: String,
    pub created_at: String,
    pub intentional_mode: String,
    pub qualia_type: String,
    pub clause_count: u64,
    pub anchor_count: u64,
    pub narrative: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StoreStats {
    pub total: u64,
    /// Record count per intentional mode.
    pub by_mode: BTreeMap<String, u64>,
}

/// Archive of forged records, stored by value as JSON.
pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // --- Metadata ---

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM metadata WHERE key = ?1")?;
        let result = stmt.query_row([key], |row| row.get(0)).optional()?;
        Ok(result)
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    // --- Records ---

    /// Insert or replace a record under its `rem_id`.
    pub fn save_record(&self, record: &ExperientialRecord) -> Result<()> {
        self.save_record_on(&self.conn, record)
    }

    /// Save several records in one transaction.
    pub fn save_records(&self, records: &[ExperientialRecord]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for record in records {
            self.save_record_on(&tx, record)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn save_record_on(&self, conn: &Connection, record: &ExperientialRecord) -> Result<()> {
        if record.header.rem_id.is_empty() {
            return Err(StoreError::InvalidData("record has an empty rem_id".into()));
        }
        let body = serde_json::to_string(record)?;
        let narrative: String = record
            .experiential_stream
            .narrative_normalized
            .chars()
            .take(NARRATIVE_PREVIEW_CHARS)
            .collect();

        conn.execute(
            "INSERT OR REPLACE INTO records
             (rem_id, schema_version, created_at, intentional_mode, qualia_type,
              clause_count, anchor_count, narrative, body)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.header.rem_id,
                record.header.schema_version,
                record.header.timestamp_created,
                record.noetic_layer.intentional_mode.as_str(),
                record.phenomenal_core.qualia_signature.qualia_type,
                record.experiential_stream.clause_boundaries.len() as i64,
                record.semantic_contamination.lexical_anchors.len() as i64,
                narrative,
                body,
            ],
        )?;
        tracing::debug!(rem_id = %record.header.rem_id, "record saved");
        Ok(())
    }

    pub fn get_record(&self, rem_id: &str) -> Result<Option<ExperientialRecord>> {
        let body: Option<String> = self
            .conn
            .query_row("SELECT body FROM records WHERE rem_id = ?1", [rem_id], |row| {
                row.get(0)
            })
            .optional()?;

        match body {
            Some(json) => Ok(Some(import_json(&json)?)),
            None => Ok(None),
        }
    }

    /// Like [`get_record`](Self::get_record), but a missing id is an error.
    pub fn require_record(&self, rem_id: &str) -> Result<ExperientialRecord> {
        self.get_record(rem_id)?
            .ok_or_else(|| StoreError::NotFound(rem_id.to_string()))
    }

    /// Summaries, newest first.
    pub fn list_records(&self, limit: usize) -> Result<Vec<RecordSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT rem_id, created_at, intentional_mode, qualia_type,
                    clause_count, anchor_count, narrative
             FROM records
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?1",
        )?;
        let summaries = stmt
            .query_map([limit as i64], |row| {
                Ok(RecordSummary {
                    rem_id: row.get(0)?,
                    created_at: row.get(1)?,
                    intentional_mode: row.get(2)?,
                    qualia_type: row.get(3)?,
                    clause_count: row.get::<_, i64>(4)? as u64,
                    anchor_count: row.get::<_, i64>(5)? as u64,
                    narrative: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<_, _>>()?;
        Ok(summaries)
    }

    /// Returns whether a record was removed.
    pub fn delete_record(&self, rem_id: &str) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM records WHERE rem_id = ?1", [rem_id])?;
        Ok(n > 0)
    }

    pub fn count(&self) -> Result<u64> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(n as u64)
    }

    pub fn stats(&self) -> Result<StoreStats> {
        let mut stmt = self.conn.prepare(
            "SELECT intentional_mode, COUNT(*) FROM records GROUP BY intentional_mode",
        )?;
        let by_mode: BTreeMap<String, u64> = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<std::result::Result<_, _>>()?;
        Ok(StoreStats {
            total: by_mode.values().sum(),
            by_mode,
        })
    }

    /// Fold the WAL into the main database file and truncate it.
    pub fn checkpoint_truncate(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}

impl Drop for RecordStore {
    fn drop(&mut self) {
        if let Err(e) = self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);") {
            tracing::debug!("checkpoint on close failed: {e}");
        }
    }
}
