//! # Student Service
//!
//! Orchestrates repository calls and enforces the one business rule of the
//! directory: an email belongs to at most one student.
//!
//! The existence check before a write gives callers a fast, explicit
//! `DuplicateEmail`. The check is not what guarantees uniqueness: the store
//! re-checks under its write lock at commit, so concurrent adds racing past
//! the pre-check still resolve to exactly one winner.

use std::sync::Arc;

use super::errors::{StudentError, StudentResult};
use super::model::{NewStudent, Student, StudentId};
use super::repository::StudentRepository;
use crate::observability::{Event, Logger, MetricsRegistry, Severity};
use crate::store::StoreResult;

/// Student service
pub struct StudentService<R: StudentRepository> {
    repository: R,
    metrics: Arc<MetricsRegistry>,
}

impl<R: StudentRepository> StudentService<R> {
    pub fn new(repository: R, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            repository,
            metrics,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    // ==================
    // Reads
    // ==================

    pub fn find_all_students(&self) -> StudentResult<Vec<Student>> {
        self.track("find_all", self.repository.find_all())
    }

    pub fn find_student_by_id(&self, id: StudentId) -> StudentResult<Option<Student>> {
        self.track("find_by_id", self.repository.find_by_id(id))
    }

    pub fn find_student_by_email(&self, email: &str) -> StudentResult<Option<Student>> {
        self.track("find_by_email", self.repository.find_by_email(email))
    }

    pub fn find_students_by_last_name(&self, last_name: &str) -> StudentResult<Vec<Student>> {
        self.track("find_by_last_name", self.repository.find_by_last_name(last_name))
    }

    pub fn find_students_by_first_name(&self, first_name: &str) -> StudentResult<Vec<Student>> {
        self.track(
            "find_by_first_name",
            self.repository.find_by_first_name_ignore_case(first_name),
        )
    }

    pub fn find_students_by_first_name_prefix(&self, prefix: &str) -> StudentResult<Vec<Student>> {
        self.track(
            "find_by_first_name_prefix",
            self.repository.find_by_first_name_starting_with(prefix),
        )
    }

    pub fn find_students_older_than(&self, age: i32) -> StudentResult<Vec<Student>> {
        self.track("find_older_than", self.repository.find_by_age_greater_than(age))
    }

    pub fn find_students_younger_than(&self, age: i32) -> StudentResult<Vec<Student>> {
        self.track("find_younger_than", self.repository.find_by_age_less_than(age))
    }

    pub fn find_students_between_ages(&self, min: i32, max: i32) -> StudentResult<Vec<Student>> {
        self.track("find_between_ages", self.repository.find_by_age_between(min, max))
    }

    /// Students whose email is at `domain` (given without the `@`)
    pub fn find_students_by_email_domain(&self, domain: &str) -> StudentResult<Vec<Student>> {
        let suffix = format!("@{}", domain);
        self.track("find_by_email_domain", self.repository.find_by_email_suffix(&suffix))
    }

    pub fn search_by_name(&self, term: &str) -> StudentResult<Vec<Student>> {
        self.track("search_by_name", self.repository.search_by_name(term))
    }

    pub fn find_all_ordered_by_last_name(&self) -> StudentResult<Vec<Student>> {
        self.track(
            "ordered_by_last_name",
            self.repository.find_all_ordered_by_last_name(),
        )
    }

    pub fn find_all_ordered_by_age_desc(&self) -> StudentResult<Vec<Student>> {
        self.track(
            "ordered_by_age_desc",
            self.repository.find_all_ordered_by_age_desc(),
        )
    }

    pub fn student_count(&self) -> StudentResult<u64> {
        self.track("count", self.repository.count())
    }

    pub fn count_by_last_name(&self, last_name: &str) -> StudentResult<u64> {
        self.track("count_by_last_name", self.repository.count_by_last_name(last_name))
    }

    pub fn exists_by_id(&self, id: StudentId) -> StudentResult<bool> {
        self.track("exists_by_id", self.repository.exists_by_id(id))
    }

    /// Mean age, `None` when the directory is empty
    pub fn average_age(&self) -> StudentResult<Option<f64>> {
        self.track("average_age", self.repository.average_age())
    }

    pub fn oldest_student(&self) -> StudentResult<Option<Student>> {
        self.track("oldest", self.repository.find_oldest())
    }

    pub fn youngest_student(&self) -> StudentResult<Option<Student>> {
        self.track("youngest", self.repository.find_youngest())
    }

    // ==================
    // Writes
    // ==================

    /// Add a new student. Fails with `DuplicateEmail` if the email is taken.
    pub fn add_student(&self, candidate: NewStudent) -> StudentResult<Student> {
        self.validate(&candidate)?;

        if self.track("exists_by_email", self.repository.exists_by_email(&candidate.email))? {
            return Err(self.reject_duplicate(&candidate.email));
        }

        let email = candidate.email.clone();
        let student = self
            .track("insert", self.repository.insert(candidate))
            .map_err(|e| self.observe_write_error(e, &email))?;

        self.metrics.increment_students_created();
        Logger::info(
            Event::StudentCreated.as_str(),
            &[("email", &student.email), ("id", &student.id.to_string())],
        );
        Ok(student)
    }

    /// Overwrite a student's details. `Ok(None)` if `id` is absent.
    pub fn update_student(
        &self,
        id: StudentId,
        details: NewStudent,
    ) -> StudentResult<Option<Student>> {
        self.validate(&details)?;

        let Some(existing) = self.track("find_by_id", self.repository.find_by_id(id))? else {
            return Ok(None);
        };

        if existing.email != details.email
            && self.track("exists_by_email", self.repository.exists_by_email(&details.email))?
        {
            return Err(self.reject_duplicate(&details.email));
        }

        let email = details.email.clone();
        let updated = self
            .track("update", self.repository.update(id, details))
            .map_err(|e| self.observe_write_error(e, &email))?;

        if let Some(ref student) = updated {
            self.metrics.increment_students_updated();
            Logger::info(
                Event::StudentUpdated.as_str(),
                &[("email", &student.email), ("id", &student.id.to_string())],
            );
        }
        Ok(updated)
    }

    /// Returns whether a student was found and removed
    pub fn delete_student(&self, id: StudentId) -> StudentResult<bool> {
        let deleted = self.track("delete_by_id", self.repository.delete_by_id(id))?;
        if deleted {
            self.metrics.increment_students_deleted();
            Logger::info(Event::StudentDeleted.as_str(), &[("id", &id.to_string())]);
        }
        Ok(deleted)
    }

    /// Returns whether a student was found and removed
    pub fn delete_student_by_email(&self, email: &str) -> StudentResult<bool> {
        let deleted = self.track("delete_by_email", self.repository.delete_by_email(email))?;
        if deleted {
            self.metrics.increment_students_deleted();
            Logger::info(Event::StudentDeleted.as_str(), &[("email", email)]);
        }
        Ok(deleted)
    }

    /// Empty the directory unconditionally
    pub fn delete_all_students(&self) -> StudentResult<()> {
        let removed = self.track("delete_all", self.repository.delete_all())?;
        self.metrics.increment_clears();
        Logger::info(
            Event::StudentsCleared.as_str(),
            &[("removed", &removed.to_string())],
        );
        Ok(())
    }

    // ==================
    // Helpers
    // ==================

    fn validate(&self, candidate: &NewStudent) -> StudentResult<()> {
        candidate.validate().map_err(|e| {
            self.metrics.increment_invalid_input();
            Logger::info(
                Event::InvalidInputRejected.as_str(),
                &[("reason", &e.to_string())],
            );
            e
        })
    }

    fn reject_duplicate(&self, email: &str) -> StudentError {
        self.metrics.increment_duplicate_rejections();
        Logger::info(Event::DuplicateEmailRejected.as_str(), &[("email", email)]);
        StudentError::DuplicateEmail(email.to_string())
    }

    /// A unique violation at commit means a concurrent writer won the email
    fn observe_write_error(&self, err: StudentError, email: &str) -> StudentError {
        match err {
            StudentError::DuplicateEmail(_) => self.reject_duplicate(email),
            other => other,
        }
    }

    /// Map store failures into the service taxonomy, logging real failures
    fn track<T>(&self, operation: &str, result: StoreResult<T>) -> StudentResult<T> {
        result.map_err(|e| {
            let err = StudentError::from(e);
            if let StudentError::Store(ref store_err) = err {
                self.metrics.increment_store_failures();
                let severity = if store_err.is_fatal() {
                    Severity::Fatal
                } else {
                    Severity::Error
                };
                Logger::log(
                    severity,
                    Event::StoreFailure.as_str(),
                    &[("error", &store_err.to_string()), ("operation", operation)],
                );
            }
            err
        })
    }
}
