//! devcamp - bootcamp directory REST API
//!
//! Bootcamps, courses, reviews and users served over HTTP. Every list
//! endpoint shares one engine: query parameters are translated into a
//! [`rest_api::QueryPlan`] and executed by the [`rest_api::ResultAssembler`]
//! into a paginated envelope.

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod rest_api;
