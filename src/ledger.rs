// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Append-only transaction ledger.
//!
//! The core only defines the write contract: records are inserted at most
//! once per confirmed action and never updated or deleted. The production
//! implementation is an embedded redb database (pure Rust, ACID); an
//! in-memory implementation backs tests and ephemeral deployments.
//!
//! ## redb Table Layout
//!
//! - `records`: tx_hash → serialized TransactionRecord (JSON bytes)
//! - `identity_index`: composite key (identity_id|!timestamp|tx_hash) → tx_hash,
//!   inverted timestamp for newest-first range scans

use std::path::Path;
use std::sync::Mutex;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use uuid::Uuid;

use crate::models::TransactionRecord;

/// Primary table: tx_hash → serialized TransactionRecord (JSON bytes).
const RECORDS: TableDefinition<&str, &[u8]> = TableDefinition::new("records");

/// Index: composite key `identity_id|!timestamp_be|tx_hash` → tx_hash.
const IDENTITY_INDEX: TableDefinition<&[u8], &str> = TableDefinition::new("identity_index");

/// Errors from ledger persistence.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A record for this transaction hash already exists. Records are
    /// immutable; this insert is rejected, the existing row is untouched.
    #[error("record already exists for transaction {0}")]
    AlreadyExists(String),

    /// The in-memory store's lock was poisoned by a panicking holder.
    #[error("ledger state lock poisoned")]
    Poisoned,
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Append-only persistence for executed-action outcomes.
pub trait TransactionLedger: Send + Sync {
    /// Insert a new record. Never updates or deletes existing rows;
    /// a duplicate transaction hash fails with [`LedgerError::AlreadyExists`].
    fn record(&self, record: &TransactionRecord) -> LedgerResult<()>;

    /// All records owned by an identity, newest first.
    fn records_for(&self, identity_id: Uuid) -> LedgerResult<Vec<TransactionRecord>>;
}

/// Build a composite index key: `identity_id | inverted_timestamp_be | tx_hash`.
///
/// The inverted timestamp yields newest-first ordering on a forward scan.
fn make_index_key(identity_id: Uuid, timestamp: i64, tx_hash: &str) -> Vec<u8> {
    let id = identity_id.as_bytes();
    let mut key = Vec::with_capacity(id.len() + 1 + 8 + 1 + tx_hash.len());
    key.extend_from_slice(id);
    key.push(b'|');
    key.extend_from_slice(&(!timestamp as u64).to_be_bytes());
    key.push(b'|');
    key.extend_from_slice(tx_hash.as_bytes());
    key
}

/// Range bounds covering every index key of one identity.
fn make_prefix_range(identity_id: Uuid) -> (Vec<u8>, Vec<u8>) {
    let id = identity_id.as_bytes();
    let mut start = Vec::with_capacity(id.len() + 1);
    start.extend_from_slice(id);
    start.push(b'|');

    let mut end = start.clone();
    end.extend_from_slice(&[0xFF; 20]);
    (start, end)
}

/// Embedded ACID ledger backed by redb.
pub struct RedbLedger {
    db: Database,
}

impl RedbLedger {
    /// Open (or create) the ledger database at the given path.
    pub fn open(path: &Path) -> LedgerResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create tables so later read transactions don't fail.
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(RECORDS)?;
            let _ = write_txn.open_table(IDENTITY_INDEX)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}

impl TransactionLedger for RedbLedger {
    fn record(&self, record: &TransactionRecord) -> LedgerResult<()> {
        let json = serde_json::to_vec(record)?;
        let timestamp = record.created_at.timestamp();

        let write_txn = self.db.begin_write()?;
        {
            let mut records = write_txn.open_table(RECORDS)?;
            if records.get(record.tx_hash.as_str())?.is_some() {
                return Err(LedgerError::AlreadyExists(record.tx_hash.clone()));
            }
            records.insert(record.tx_hash.as_str(), json.as_slice())?;

            let mut index = write_txn.open_table(IDENTITY_INDEX)?;
            let key = make_index_key(record.identity_id, timestamp, &record.tx_hash);
            index.insert(key.as_slice(), record.tx_hash.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn records_for(&self, identity_id: Uuid) -> LedgerResult<Vec<TransactionRecord>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(IDENTITY_INDEX)?;
        let records = read_txn.open_table(RECORDS)?;

        let (start, end) = make_prefix_range(identity_id);
        let mut out = Vec::new();

        for entry in index.range(start.as_slice()..end.as_slice())? {
            let entry = entry?;
            let tx_hash = entry.1.value();
            if let Some(value) = records.get(tx_hash)? {
                let record: TransactionRecord = serde_json::from_slice(value.value())?;
                out.push(record);
            }
        }
        Ok(out)
    }
}

/// In-memory ledger for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryLedger {
    records: Mutex<Vec<TransactionRecord>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionLedger for MemoryLedger {
    fn record(&self, record: &TransactionRecord) -> LedgerResult<()> {
        let mut records = self.records.lock().map_err(|_| LedgerError::Poisoned)?;
        if records.iter().any(|r| r.tx_hash == record.tx_hash) {
            return Err(LedgerError::AlreadyExists(record.tx_hash.clone()));
        }
        records.push(record.clone());
        Ok(())
    }

    fn records_for(&self, identity_id: Uuid) -> LedgerResult<Vec<TransactionRecord>> {
        let records = self.records.lock().map_err(|_| LedgerError::Poisoned)?;
        let mut out: Vec<TransactionRecord> = records
            .iter()
            .filter(|r| r.identity_id == identity_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActionKind, Protocol};
    use chrono::{Duration, Utc};

    fn sample_record(identity_id: Uuid, tx_hash: &str) -> TransactionRecord {
        TransactionRecord {
            tx_hash: tx_hash.to_string(),
            protocol: Protocol::Aave,
            kind: ActionKind::Supply,
            token: "USDC".into(),
            amount: "100".into(),
            success: true,
            created_at: Utc::now(),
            identity_id,
        }
    }

    fn temp_ledger() -> (RedbLedger, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let ledger = RedbLedger::open(&dir.path().join("ledger.redb")).unwrap();
        (ledger, dir)
    }

    #[test]
    fn record_and_read_back() {
        let (ledger, _dir) = temp_ledger();
        let identity = Uuid::new_v4();

        let record = sample_record(identity, "0xaaa");
        ledger.record(&record).unwrap();

        let read = ledger.records_for(identity).unwrap();
        assert_eq!(read, vec![record]);
    }

    #[test]
    fn duplicate_hash_is_rejected_and_original_untouched() {
        let (ledger, _dir) = temp_ledger();
        let identity = Uuid::new_v4();

        let original = sample_record(identity, "0xaaa");
        ledger.record(&original).unwrap();

        let mut conflicting = sample_record(identity, "0xaaa");
        conflicting.amount = "999999".into();
        assert!(matches!(
            ledger.record(&conflicting),
            Err(LedgerError::AlreadyExists(_))
        ));

        let read = ledger.records_for(identity).unwrap();
        assert_eq!(read, vec![original], "existing record must not change");
    }

    #[test]
    fn records_are_scoped_per_identity() {
        let (ledger, _dir) = temp_ledger();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        ledger.record(&sample_record(alice, "0xa1")).unwrap();
        ledger.record(&sample_record(alice, "0xa2")).unwrap();
        ledger.record(&sample_record(bob, "0xb1")).unwrap();

        assert_eq!(ledger.records_for(alice).unwrap().len(), 2);
        assert_eq!(ledger.records_for(bob).unwrap().len(), 1);
        assert!(ledger.records_for(Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn records_come_back_newest_first() {
        let (ledger, _dir) = temp_ledger();
        let identity = Uuid::new_v4();

        let mut older = sample_record(identity, "0xold");
        older.created_at = Utc::now() - Duration::hours(2);
        let newer = sample_record(identity, "0xnew");

        ledger.record(&older).unwrap();
        ledger.record(&newer).unwrap();

        let read = ledger.records_for(identity).unwrap();
        assert_eq!(read[0].tx_hash, "0xnew");
        assert_eq!(read[1].tx_hash, "0xold");
    }

    #[test]
    fn memory_ledger_enforces_same_contract() {
        let ledger = MemoryLedger::new();
        let identity = Uuid::new_v4();

        ledger.record(&sample_record(identity, "0x1")).unwrap();
        assert!(matches!(
            ledger.record(&sample_record(identity, "0x1")),
            Err(LedgerError::AlreadyExists(_))
        ));
        assert_eq!(ledger.records_for(identity).unwrap().len(), 1);
    }

    #[test]
    fn memory_ledger_surfaces_poisoned_lock() {
        let ledger = std::sync::Arc::new(MemoryLedger::new());
        let identity = Uuid::new_v4();
        ledger.record(&sample_record(identity, "0x1")).unwrap();

        let poisoner = std::sync::Arc::clone(&ledger);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.records.lock().unwrap();
            panic!("poison the store");
        })
        .join();

        assert!(matches!(
            ledger.records_for(identity),
            Err(LedgerError::Poisoned)
        ));
        assert!(matches!(
            ledger.record(&sample_record(identity, "0x2")),
            Err(LedgerError::Poisoned)
        ));
    }

    #[test]
    fn ledger_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.redb");
        let identity = Uuid::new_v4();

        {
            let ledger = RedbLedger::open(&path).unwrap();
            ledger.record(&sample_record(identity, "0xpersist")).unwrap();
        }

        let reopened = RedbLedger::open(&path).unwrap();
        let read = reopened.records_for(identity).unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].tx_hash, "0xpersist");
    }
}
