//! # HTTP Server Module
//!
//! Axum server exposing the student directory.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/metrics` - Operational counters
//! - `/api/v1/students/*` - Student CRUD and queries

pub mod config;
pub mod observability_routes;
pub mod server;
pub mod student_routes;

pub use config::HttpServerConfig;
pub use server::{HttpServer, STUDENTS_BASE_PATH};
pub use student_routes::StudentState;
