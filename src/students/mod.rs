//! Student directory domain
//!
//! - `model`: the student record and the candidate accepted on writes
//! - `query`: single-predicate filters, orderings and aggregates
//! - `repository`: named queries over the record store
//! - `service`: business rules (validation, email uniqueness)
//! - `errors`: error taxonomy and its HTTP mapping

mod errors;
mod model;
mod query;
mod repository;
mod service;

pub use errors::{ErrorResponse, StudentError, StudentResult};
pub use model::{NewStudent, Student, StudentId};
pub use query::{average_age, extreme_by_age, StudentFilter, StudentOrder};
pub use repository::{StoreStudentRepository, StudentRepository};
pub use service::StudentService;
