//! # HTTP Server Module
//!
//! Axum server hosting the bootcamp directory API.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/v1/bootcamps` - Bootcamps, plus `/:id/courses` and `/:id/reviews`
//! - `/api/v1/courses`, `/api/v1/reviews`, `/api/v1/users`

pub mod config;
pub mod health_routes;
pub mod request_log;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;
