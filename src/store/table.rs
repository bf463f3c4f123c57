//! In-memory student table
//!
//! Rows are keyed by id in a `BTreeMap`, so scans come back in ascending id
//! order. A hash index maps each email to the id that owns it; the index is
//! the unique constraint on `email`.
//!
//! Writes are two-phase: `prepare_*` checks constraints against the current
//! state and returns the row to commit, `apply` installs the mutation. The owner
//! of the table holds the write lock across both phases.

use std::collections::{BTreeMap, HashMap};

use super::errors::{StoreError, StoreResult};
use super::record::Mutation;
use crate::students::{NewStudent, Student, StudentId};

#[derive(Debug)]
pub struct StudentTable {
    rows: BTreeMap<StudentId, Student>,
    email_index: HashMap<String, StudentId>,
    next_id: StudentId,
}

impl Default for StudentTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StudentTable {
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            email_index: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Id the next insert will receive
    pub fn next_id(&self) -> StudentId {
        self.next_id
    }

    pub fn get(&self, id: StudentId) -> Option<&Student> {
        self.rows.get(&id)
    }

    pub fn get_by_email(&self, email: &str) -> Option<&Student> {
        self.email_index.get(email).and_then(|id| self.rows.get(id))
    }

    pub fn contains_email(&self, email: &str) -> bool {
        self.email_index.contains_key(email)
    }

    /// All rows in ascending id order
    pub fn rows(&self) -> impl Iterator<Item = &Student> {
        self.rows.values()
    }

    /// Id of a *different* row already holding `email`, if any
    pub fn conflicting_owner(&self, email: &str, id: StudentId) -> Option<StudentId> {
        self.email_index
            .get(email)
            .copied()
            .filter(|owner| *owner != id)
    }

    /// Check constraints for an insert and build the row to commit.
    pub fn prepare_insert(&self, candidate: NewStudent) -> StoreResult<Student> {
        if self.contains_email(&candidate.email) {
            return Err(StoreError::unique_violation("email", &candidate.email));
        }
        Ok(Student::from_candidate(self.next_id, candidate))
    }

    /// Check constraints for an update. `None` when the row is absent.
    pub fn prepare_update(
        &self,
        id: StudentId,
        details: NewStudent,
    ) -> StoreResult<Option<Student>> {
        let Some(existing) = self.rows.get(&id) else {
            return Ok(None);
        };

        if self.conflicting_owner(&details.email, id).is_some() {
            return Err(StoreError::unique_violation("email", &details.email));
        }

        let mut updated = existing.clone();
        updated.apply(details);
        Ok(Some(updated))
    }

    /// Install a committed mutation.
    pub fn apply(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::Put(student) => {
                if let Some(previous) = self.rows.get(&student.id) {
                    self.email_index.remove(&previous.email);
                }
                self.next_id = self.next_id.max(student.id + 1);
                self.email_index.insert(student.email.clone(), student.id);
                self.rows.insert(student.id, student);
            }
            Mutation::Delete(id) => {
                if let Some(removed) = self.rows.remove(&id) {
                    self.email_index.remove(&removed.email);
                }
            }
            Mutation::Clear => {
                // next_id survives so ids are never handed out twice
                self.rows.clear();
                self.email_index.clear();
            }
        }
    }
}
