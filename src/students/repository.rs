//! # Student Repository
//!
//! Translates named query intents into record store operations.
//! Absent records are `None`, `false` or an empty list, never an error.

use std::sync::Arc;

use super::model::{NewStudent, Student, StudentId};
use super::query::{self, StudentFilter, StudentOrder};
use crate::store::{RecordStore, StoreResult};

/// Student repository trait
///
/// The required methods are the primitive store operations; the provided
/// methods are the named single-predicate queries built on top of them.
pub trait StudentRepository: Send + Sync {
    /// All students in ascending id order
    fn find_all(&self) -> StoreResult<Vec<Student>>;

    fn find_by_id(&self, id: StudentId) -> StoreResult<Option<Student>>;

    fn find_by_email(&self, email: &str) -> StoreResult<Option<Student>>;

    fn exists_by_id(&self, id: StudentId) -> StoreResult<bool>;

    fn exists_by_email(&self, email: &str) -> StoreResult<bool>;

    /// Students matching a single predicate, ascending id order
    fn find_where(&self, filter: &StudentFilter) -> StoreResult<Vec<Student>>;

    fn count_where(&self, filter: &StudentFilter) -> StoreResult<u64>;

    /// All students in the given order
    fn find_all_ordered(&self, order: StudentOrder) -> StoreResult<Vec<Student>>;

    fn count(&self) -> StoreResult<u64>;

    fn average_age(&self) -> StoreResult<Option<f64>>;

    fn find_oldest(&self) -> StoreResult<Option<Student>>;

    fn find_youngest(&self) -> StoreResult<Option<Student>>;

    /// Persist a new student; the store assigns the id
    fn insert(&self, candidate: NewStudent) -> StoreResult<Student>;

    fn update(&self, id: StudentId, details: NewStudent) -> StoreResult<Option<Student>>;

    fn delete_by_id(&self, id: StudentId) -> StoreResult<bool>;

    fn delete_by_email(&self, email: &str) -> StoreResult<bool>;

    fn delete_all(&self) -> StoreResult<u64>;

    // ==================
    // Named Queries
    // ==================

    fn find_by_last_name(&self, last_name: &str) -> StoreResult<Vec<Student>> {
        self.find_where(&StudentFilter::LastName(last_name.to_string()))
    }

    fn find_by_first_name_ignore_case(&self, first_name: &str) -> StoreResult<Vec<Student>> {
        self.find_where(&StudentFilter::FirstNameIgnoreCase(first_name.to_string()))
    }

    fn find_by_first_name_starting_with(&self, prefix: &str) -> StoreResult<Vec<Student>> {
        self.find_where(&StudentFilter::FirstNameStartsWith(prefix.to_string()))
    }

    fn find_by_age_greater_than(&self, age: i32) -> StoreResult<Vec<Student>> {
        self.find_where(&StudentFilter::AgeGreaterThan(age))
    }

    fn find_by_age_less_than(&self, age: i32) -> StoreResult<Vec<Student>> {
        self.find_where(&StudentFilter::AgeLessThan(age))
    }

    fn find_by_age_between(&self, min: i32, max: i32) -> StoreResult<Vec<Student>> {
        self.find_where(&StudentFilter::AgeBetween { min, max })
    }

    /// Students whose email ends with `suffix` (e.g. `@uni.edu`)
    fn find_by_email_suffix(&self, suffix: &str) -> StoreResult<Vec<Student>> {
        self.find_where(&StudentFilter::EmailEndsWith(suffix.to_string()))
    }

    fn search_by_name(&self, term: &str) -> StoreResult<Vec<Student>> {
        self.find_where(&StudentFilter::NameContains(term.to_string()))
    }

    fn count_by_last_name(&self, last_name: &str) -> StoreResult<u64> {
        self.count_where(&StudentFilter::LastName(last_name.to_string()))
    }

    fn find_all_ordered_by_last_name(&self) -> StoreResult<Vec<Student>> {
        self.find_all_ordered(StudentOrder::LastNameAsc)
    }

    fn find_all_ordered_by_age_desc(&self) -> StoreResult<Vec<Student>> {
        self.find_all_ordered(StudentOrder::AgeDesc)
    }
}

/// Repository backed by the record store
#[derive(Debug, Clone)]
pub struct StoreStudentRepository {
    store: Arc<RecordStore>,
}

impl StoreStudentRepository {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    /// Repository over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(RecordStore::in_memory()))
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }
}

impl StudentRepository for StoreStudentRepository {
    fn find_all(&self) -> StoreResult<Vec<Student>> {
        self.store.read(|table| table.rows().cloned().collect())
    }

    fn find_by_id(&self, id: StudentId) -> StoreResult<Option<Student>> {
        self.store.read(|table| table.get(id).cloned())
    }

    fn find_by_email(&self, email: &str) -> StoreResult<Option<Student>> {
        self.store.read(|table| table.get_by_email(email).cloned())
    }

    fn exists_by_id(&self, id: StudentId) -> StoreResult<bool> {
        self.store.read(|table| table.get(id).is_some())
    }

    fn exists_by_email(&self, email: &str) -> StoreResult<bool> {
        self.store.read(|table| table.contains_email(email))
    }

    fn find_where(&self, filter: &StudentFilter) -> StoreResult<Vec<Student>> {
        self.store.read(|table| {
            table
                .rows()
                .filter(|student| filter.matches(student))
                .cloned()
                .collect()
        })
    }

    fn count_where(&self, filter: &StudentFilter) -> StoreResult<u64> {
        self.store
            .read(|table| table.rows().filter(|student| filter.matches(student)).count() as u64)
    }

    fn find_all_ordered(&self, order: StudentOrder) -> StoreResult<Vec<Student>> {
        let mut students = self.find_all()?;
        order.sort(&mut students);
        Ok(students)
    }

    fn count(&self) -> StoreResult<u64> {
        self.store.read(|table| table.len() as u64)
    }

    fn average_age(&self) -> StoreResult<Option<f64>> {
        self.store.read(|table| query::average_age(table.rows()))
    }

    fn find_oldest(&self) -> StoreResult<Option<Student>> {
        self.store
            .read(|table| query::extreme_by_age(table.rows(), true).cloned())
    }

    fn find_youngest(&self) -> StoreResult<Option<Student>> {
        self.store
            .read(|table| query::extreme_by_age(table.rows(), false).cloned())
    }

    fn insert(&self, candidate: NewStudent) -> StoreResult<Student> {
        self.store.insert(candidate)
    }

    fn update(&self, id: StudentId, details: NewStudent) -> StoreResult<Option<Student>> {
        self.store.update(id, details)
    }

    fn delete_by_id(&self, id: StudentId) -> StoreResult<bool> {
        Ok(self.store.delete(id)?.is_some())
    }

    fn delete_by_email(&self, email: &str) -> StoreResult<bool> {
        Ok(self.store.delete_by_email(email)?.is_some())
    }

    fn delete_all(&self) -> StoreResult<u64> {
        Ok(self.store.clear()? as u64)
    }
}
