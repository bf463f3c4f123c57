//! # Student Model
//!
//! The sole entity of the directory, plus the candidate shape accepted by
//! add and update.

use serde::{Deserialize, Serialize};

use super::errors::{StudentError, StudentResult};

/// Store-assigned student identifier. Never reused.
pub type StudentId = u64;

/// A stored student record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Unique identifier, assigned by the store
    pub id: StudentId,

    pub first_name: String,

    pub last_name: String,

    /// Email address (unique across all students)
    pub email: String,

    pub age: i32,
}

impl Student {
    /// Build a stored record from a candidate and its assigned id
    pub fn from_candidate(id: StudentId, candidate: NewStudent) -> Self {
        Self {
            id,
            first_name: candidate.first_name,
            last_name: candidate.last_name,
            email: candidate.email,
            age: candidate.age,
        }
    }

    /// Overwrite every mutable field, keeping the id
    pub fn apply(&mut self, details: NewStudent) {
        self.first_name = details.first_name;
        self.last_name = details.last_name;
        self.email = details.email;
        self.age = details.age;
    }
}

/// Student fields minus the id, as accepted by add and update.
///
/// Any `id` present in a request body is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: i32,
}

impl NewStudent {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        age: i32,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            age,
        }
    }

    /// Reject candidates that could never form a valid record
    pub fn validate(&self) -> StudentResult<()> {
        if self.first_name.trim().is_empty() {
            return Err(StudentError::InvalidInput(
                "firstName must not be empty".to_string(),
            ));
        }

        if self.last_name.trim().is_empty() {
            return Err(StudentError::InvalidInput(
                "lastName must not be empty".to_string(),
            ));
        }

        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(StudentError::InvalidInput(format!(
                "email '{}' is not a valid address",
                self.email
            )));
        }

        if self.age < 0 {
            return Err(StudentError::InvalidInput(format!(
                "age must not be negative, got {}",
                self.age
            )));
        }

        Ok(())
    }
}
