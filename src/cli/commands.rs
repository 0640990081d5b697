//! CLI command implementations

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::Path;

use axum::extract::Query;
use axum::http::Uri;

use crate::http_server::HttpServer;
use crate::observability::{log_event, log_event_with_fields, Event, Logger};
use crate::rest_api::{DirectoryHandler, Resource, RestHandler, ResultEnvelope};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Start { config } => start(&config),
        Command::Query {
            config,
            collection,
            query: qs,
        } => {
            let envelope = query(&config, &collection, &qs)?;
            write_json(&serde_json::to_value(&envelope)?)
        }
    }
}

fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);

    let path = config_path.display().to_string();
    log_event_with_fields(Event::ConfigLoaded, &[("config", path.as_str())]);
    Ok(config)
}

/// Start the HTTP server
///
/// 1. Load configuration
/// 2. Import seed data
/// 3. Bind and serve until the listener fails
pub fn start(config_path: &Path) -> CliResult<()> {
    log_event(Event::ServerStart);

    let config = load_config(config_path)?;
    let (store, imported) = config.open_store()?;

    let documents = imported.to_string();
    log_event_with_fields(Event::SeedImported, &[("documents", documents.as_str())]);

    let server = HttpServer::new(config.server.clone(), store);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async { server.start().await }).map_err(|e| {
        let message = e.to_string();
        log_event_with_fields(Event::ServerFailed, &[("error", message.as_str())]);
        CliError::boot_failed(format!("HTTP server failed: {}", message))
    })
}

/// Run one list query against the seeded store
///
/// `qs` is a URL query string without the leading `?`, decoded the same way
/// the HTTP listing endpoints decode theirs.
pub fn query(config_path: &Path, collection: &str, qs: &str) -> CliResult<ResultEnvelope> {
    let config = load_config(config_path)?;

    let resource = Resource::from_collection(collection).ok_or_else(|| {
        CliError::query_failed(format!(
            "Unknown collection '{}'. Expected one of: {}",
            collection,
            Resource::ALL
                .iter()
                .map(Resource::collection)
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })?;

    let params = parse_query_string(qs)?;
    let (store, _) = config.open_store()?;

    let handler = DirectoryHandler::new(store);
    Ok(handler.list(resource, &params)?)
}

fn parse_query_string(qs: &str) -> CliResult<HashMap<String, String>> {
    let uri: Uri = format!("/?{}", qs)
        .parse()
        .map_err(|e| CliError::query_failed(format!("Invalid query string '{}': {}", qs, e)))?;

    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(&uri)
        .map_err(|e| CliError::query_failed(format!("Invalid query string '{}': {}", qs, e)))?;
    Ok(params)
}

/// Write a JSON value to stdout
fn write_json(value: &serde_json::Value) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}
