//! # HTTP Server
//!
//! Composition root for the HTTP surface: student routes under
//! `/api/v1/students`, plus `/health` and `/metrics` at the root.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::config::HttpServerConfig;
use super::observability_routes::observability_routes;
use super::student_routes::{student_routes, StudentState};
use crate::observability::{log_event, log_event_with_fields, Event};

/// Base path of the student API
pub const STUDENTS_BASE_PATH: &str = "/api/v1/students";

/// HTTP server for the student directory
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Server over a fresh in-memory store
    pub fn new() -> Self {
        Self::with_config(HttpServerConfig::default(), Arc::new(StudentState::in_memory()))
    }

    pub fn with_config(config: HttpServerConfig, state: Arc<StudentState>) -> Self {
        let router = Self::build_router(&config, state);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &HttpServerConfig, state: Arc<StudentState>) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let metrics = state.metrics();

        Router::new()
            .merge(observability_routes(metrics))
            .nest(STUDENTS_BASE_PATH, student_routes(state))
            .layer(cors)
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C, then drain in-flight requests
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr = self
            .config
            .bind_addr()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let listener = TcpListener::bind(addr).await?;

        log_event_with_fields(
            Event::Serving,
            &[
                ("addr", &addr.to_string()),
                ("base_path", STUDENTS_BASE_PATH),
            ],
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        log_event(Event::ShutdownComplete);
        Ok(())
    }
}

impl Default for HttpServer {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    // if the handler cannot be installed, serve until the process is killed
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    log_event(Event::ShutdownStart);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_creation() {
        let server = HttpServer::new();
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_server_with_custom_port() {
        let config = HttpServerConfig::with_port(9090);
        let server = HttpServer::with_config(config, Arc::new(StudentState::in_memory()));
        assert_eq!(server.socket_addr(), "0.0.0.0:9090");
    }

    #[test]
    fn test_router_builds_with_cors_origins() {
        let config = HttpServerConfig {
            cors_origins: vec!["http://localhost:5173".to_string()],
            ..Default::default()
        };
        let _router = HttpServer::with_config(config, Arc::new(StudentState::in_memory())).router();
    }
}
