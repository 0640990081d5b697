//! CLI Query Tests
//!
//! `devcamp query` against config and seed files written to a temp dir.

use std::fs;
use std::path::PathBuf;

use serde_json::json;
use tempfile::TempDir;

use devcamp::cli::{self, CliErrorCode, Config};

fn write_config(dir: &TempDir, seed: serde_json::Value) -> PathBuf {
    let seed_path = dir.path().join("seed.json");
    fs::write(&seed_path, seed.to_string()).unwrap();

    let config_path = dir.path().join("devcamp.json");
    let config = json!({
        "server": {"port": 5050},
        "seed_file": seed_path,
        "log_level": "error"
    });
    fs::write(&config_path, config.to_string()).unwrap();
    config_path
}

#[test]
fn test_config_round_trip_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, json!({}));

    let config = Config::load(&path).unwrap();
    assert_eq!(config.server.socket_addr(), "0.0.0.0:5050");
    assert!(config.seed_file.is_some());
}

#[test]
fn test_query_reviews_by_rating() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        json!({
            "bootcamps": [{"_id": "b1", "name": "Devworks", "description": "Web"}],
            "reviews": [
                {"_id": "r1", "title": "Great", "rating": 9, "bootcamp": "b1"},
                {"_id": "r2", "title": "Fine", "rating": 6, "bootcamp": "b1"},
                {"_id": "r3", "title": "Superb", "rating": 10, "bootcamp": "b1"}
            ]
        }),
    );

    let envelope = cli::query(
        &path,
        "reviews",
        "rating[gte]=8&sort=-rating&select=title,bootcamp",
    )
    .unwrap();

    assert_eq!(envelope.count, 2);
    assert_eq!(envelope.data[0]["title"], "Superb");
    assert_eq!(envelope.data[1]["bootcamp"]["name"], "Devworks");
    assert!(envelope.data[0].get("rating").is_none());
}

#[test]
fn test_query_with_broken_seed() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, json!(["not", "an", "object"]));

    let err = cli::query(&path, "bootcamps", "").unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::SeedError);
}
