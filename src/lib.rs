//! student-directory - a small, durable student records service
//!
//! Layers, bottom-up:
//! - `store`: the student table and its optional append-only mutation log
//! - `students`: model, named queries, repository and service rules
//! - `http_server`: axum routes under `/api/v1/students`
//! - `cli`: `serve` and `verify` commands

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod store;
pub mod students;
