//! End-to-end tests for the movies-etl binary
//!
//! These tests run the compiled binary and check:
//! - Argument validation
//! - Output layout under the configured root
//! - Error log contents on clean, messy and failed runs

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod helpers;

use assert_cmd::Command;
use helpers::*;
use predicates::prelude::*;
use std::path::Path;

/// Binary invocation writing under `root/processed_data`
fn etl_command(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("movies-etl").unwrap();
    cmd.current_dir(root)
        .env("MOVIES_ETL_OUTPUT_DIR", root.join("processed_data"))
        .env("MOVIES_ETL_HTTP_TIMEOUT_SECS", "10")
        .env_remove("LOG_OUTPUT")
        .env_remove("LOG_DIR")
        .env_remove("LOG_FILE_PREFIX")
        .env_remove("LOG_LEVEL")
        .env_remove("LOG_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_url_argument_required() {
    let dir = tempfile::tempdir().unwrap();

    etl_command(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("<URL>"));
}

#[tokio::test]
async fn test_clean_run_leaves_empty_error_log() {
    let server = serve_archive(dataset_archive(&clean_movies_csv())).await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("processed_data");

    etl_command(dir.path())
        .arg(archive_url(&server))
        .assert()
        .success()
        .stdout(predicate::str::contains("Data processing complete"));

    for table in [
        "movies.csv",
        "genres.csv",
        "production_companies.csv",
        "movie_genres.csv",
        "movie_production_companies.csv",
    ] {
        assert!(output.join("data").join(table).is_file(), "missing {table}");
    }
    assert!(output.join("revenue_by_genre_by_year.sql").is_file());
    assert_eq!(std::fs::read_to_string(output.join("error_log.txt")).unwrap(), "");
}

#[tokio::test]
async fn test_skipped_input_is_logged() {
    let server = serve_archive(dataset_archive(&messy_movies_csv())).await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("processed_data");

    etl_command(dir.path())
        .arg(archive_url(&server))
        .assert()
        .success();

    let log = std::fs::read_to_string(output.join("error_log.txt")).unwrap();
    assert!(log.contains("Skipping record without an integer movie id"));
    assert!(log.contains("Malformed embedded field"));
    assert!(log.contains("movie_id=949"));
    assert!(!log.contains("Wrote table"));
}

#[test]
fn test_unreachable_url_fails_with_error_log() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("processed_data");

    // Leftovers from an earlier run are cleared
    std::fs::create_dir_all(output.join("data")).unwrap();
    std::fs::write(output.join("data").join("movies.csv"), "stale\n").unwrap();

    etl_command(dir.path())
        .arg(unreachable_url())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to download"));

    let log = std::fs::read_to_string(output.join("error_log.txt")).unwrap();
    assert!(log.contains("An unrecoverable error occurred"));
    assert!(!output.join("data").exists());
    assert!(!output.join("revenue_by_genre_by_year.sql").exists());
}
