//! Record store for student rows
//!
//! The store owns the single student table. It is either purely in-memory or
//! backed by an append-only mutation log under `<data_dir>/data/`.
//!
//! # Invariants Enforced
//!
//! - At most one row per email value (checked under the write lock)
//! - Ids are assigned by the store and never reused
//! - A mutation is in the log before it is visible to readers
//! - Any checksum failure on replay aborts the open

mod checksum;
mod errors;
mod log;
mod record;
mod table;

pub use checksum::compute_checksum;
pub use errors::{Severity, StoreError, StoreErrorCode, StoreResult};
pub use log::{log_path, LogReader, LogWriter, LOG_FILE_NAME};
pub use record::{Mutation, MIN_RECORD_SIZE};
pub use table::StudentTable;

use std::path::Path;
use std::sync::{Mutex, RwLock};

use serde::Serialize;

use crate::observability::{log_event_with_fields, Event};
use crate::students::{NewStudent, Student, StudentId};

/// Outcome of replaying a log into a fresh table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Log records read
    pub records: u64,
    /// Live rows after replay
    pub students: u64,
    /// Id the next insert will receive
    pub next_id: StudentId,
}

/// Thread-safe student table with optional durability.
#[derive(Debug)]
pub struct RecordStore {
    table: RwLock<StudentTable>,
    log: Option<Mutex<LogWriter>>,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl RecordStore {
    /// A store that keeps nothing across restarts
    pub fn in_memory() -> Self {
        Self {
            table: RwLock::new(StudentTable::new()),
            log: None,
        }
    }

    /// Open a durable store, replaying any existing log.
    pub fn open(data_dir: &Path, sync_writes: bool) -> StoreResult<Self> {
        let writer = LogWriter::open(data_dir, sync_writes)?;
        let (table, summary) = Self::replay(writer.path())?;

        log_event_with_fields(
            Event::StoreReplayComplete,
            &[
                ("next_id", &summary.next_id.to_string()),
                ("path", &writer.path().display().to_string()),
                ("records", &summary.records.to_string()),
                ("students", &summary.students.to_string()),
            ],
        );

        Ok(Self {
            table: RwLock::new(table),
            log: Some(Mutex::new(writer)),
        })
    }

    /// Rebuild a table from the log at `path`, verifying every record.
    pub fn replay(path: &Path) -> StoreResult<(StudentTable, ReplaySummary)> {
        let mut reader = LogReader::open(path)?;
        let mut table = StudentTable::new();
        let mut records = 0u64;

        loop {
            let offset = reader.current_offset();
            let Some(mutation) = reader.read_next()? else {
                break;
            };

            if let Mutation::Put(ref student) = mutation {
                if let Some(owner) = table.conflicting_owner(&student.email, student.id) {
                    return Err(StoreError::corruption_at_offset(
                        offset,
                        format!(
                            "student {} reuses email already owned by student {}",
                            student.id, owner
                        ),
                    ));
                }
            }

            table.apply(mutation);
            records += 1;
        }

        let summary = ReplaySummary {
            records,
            students: table.len() as u64,
            next_id: table.next_id(),
        };
        Ok((table, summary))
    }

    /// Whether mutations are written to a log
    pub fn is_durable(&self) -> bool {
        self.log.is_some()
    }

    /// Run `f` against a consistent view of the table.
    pub fn read<T>(&self, f: impl FnOnce(&StudentTable) -> T) -> StoreResult<T> {
        let table = self.table.read().map_err(|_| StoreError::lock_poisoned())?;
        Ok(f(&table))
    }

    /// Insert a new row. Fails with a unique violation if the email is taken.
    pub fn insert(&self, candidate: NewStudent) -> StoreResult<Student> {
        let mut table = self.table.write().map_err(|_| StoreError::lock_poisoned())?;
        let student = table.prepare_insert(candidate)?;
        self.commit(&mut table, Mutation::Put(student.clone()))?;
        Ok(student)
    }

    /// Overwrite the mutable fields of row `id`. `None` if absent.
    pub fn update(&self, id: StudentId, details: NewStudent) -> StoreResult<Option<Student>> {
        let mut table = self.table.write().map_err(|_| StoreError::lock_poisoned())?;
        let Some(student) = table.prepare_update(id, details)? else {
            return Ok(None);
        };
        self.commit(&mut table, Mutation::Put(student.clone()))?;
        Ok(Some(student))
    }

    /// Remove row `id`, returning it if it existed.
    pub fn delete(&self, id: StudentId) -> StoreResult<Option<Student>> {
        let mut table = self.table.write().map_err(|_| StoreError::lock_poisoned())?;
        let Some(existing) = table.get(id).cloned() else {
            return Ok(None);
        };
        self.commit(&mut table, Mutation::Delete(id))?;
        Ok(Some(existing))
    }

    /// Remove the row owning `email`, returning it if it existed.
    pub fn delete_by_email(&self, email: &str) -> StoreResult<Option<Student>> {
        let mut table = self.table.write().map_err(|_| StoreError::lock_poisoned())?;
        let Some(existing) = table.get_by_email(email).cloned() else {
            return Ok(None);
        };
        self.commit(&mut table, Mutation::Delete(existing.id))?;
        Ok(Some(existing))
    }

    /// Remove every row. Returns how many were removed.
    pub fn clear(&self) -> StoreResult<usize> {
        let mut table = self.table.write().map_err(|_| StoreError::lock_poisoned())?;
        let removed = table.len();
        self.commit(&mut table, Mutation::Clear)?;
        Ok(removed)
    }

    /// Log (if durable) then apply. Caller holds the table write lock.
    fn commit(&self, table: &mut StudentTable, mutation: Mutation) -> StoreResult<()> {
        if let Some(ref log) = self.log {
            let mut writer = log.lock().map_err(|_| StoreError::lock_poisoned())?;
            writer.append(&mutation)?;
        }
        table.apply(mutation);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn candidate(email: &str) -> NewStudent {
        NewStudent::new("Ana", "Lee", email, 20)
    }

    #[test]
    fn test_in_memory_store_is_not_durable() {
        let store = RecordStore::in_memory();
        assert!(!store.is_durable());
        assert_eq!(store.read(|t| t.len()).unwrap(), 0);
    }

    #[test]
    fn test_delete_returns_removed_row() {
        let store = RecordStore::in_memory();
        let student = store.insert(candidate("a@x.com")).unwrap();

        assert_eq!(store.delete(student.id).unwrap(), Some(student.clone()));
        assert_eq!(store.delete(student.id).unwrap(), None);
        assert_eq!(store.delete_by_email("a@x.com").unwrap(), None);
    }

    #[test]
    fn test_clear_reports_removed_count() {
        let store = RecordStore::in_memory();
        store.insert(candidate("a@x.com")).unwrap();
        store.insert(candidate("b@x.com")).unwrap();

        assert_eq!(store.clear().unwrap(), 2);
        assert_eq!(store.clear().unwrap(), 0);
    }

    #[test]
    fn test_concurrent_inserts_same_email_one_wins() {
        let store = Arc::new(RecordStore::in_memory());
        let mut handles = Vec::new();

        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || store.insert(candidate("race@x.com")).is_ok()));
        }

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(store.read(|t| t.len()).unwrap(), 1);
    }
}
