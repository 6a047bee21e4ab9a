//! Movies ETL - command line entry point

use anyhow::Result;
use clap::Parser;
use movies_common::logging::{init_logging, LogConfig, LogLevel, LogOutput, LogRotation};
use movies_etl::config::{EtlConfig, ERROR_LOG_FILE_NAME};
use movies_etl::pipeline;
use std::process;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "movies-etl")]
#[command(author, version, about = "Normalize a zipped movie metadata dataset into CSV tables")]
struct Cli {
    /// URL of the zipped dataset
    url: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Error: failed to read .env: {}", e);
            process::exit(1);
        }
    }

    // Logging isn't up yet, so these failures only reach stderr
    let config = match prepare() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        },
    };

    let log_config = LogConfig::builder()
        .level(LogLevel::Info)
        .output(LogOutput::Both)
        .log_dir(&config.output_dir)
        .log_file_prefix(ERROR_LOG_FILE_NAME)
        .rotation(LogRotation::Never)
        .file_level(LogLevel::Warn)
        .build();

    let guard = match log_config.apply_env().and_then(|c| init_logging(&c)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to initialize logging: {:#}", e);
            process::exit(1);
        },
    };

    let result = pipeline::run(&cli.url, &config).await;

    match result {
        Ok(summary) => {
            if !summary.is_clean() {
                warn!(
                    skipped_rows = summary.skipped_rows,
                    skipped_records = summary.normalize.skipped_records,
                    skipped_fields = summary.normalize.skipped_fields,
                    rejected_entities = summary.normalize.rejected_entities,
                    "Some input was skipped"
                );
            }
            info!(
                data = %summary.written.data_dir.display(),
                sql = %summary.sql_query_path.display(),
                error_log = %config.error_log_path().display(),
                "Processed data saved"
            );
            drop(guard);
        },
        Err(e) => {
            let message = format!("{:#}", e);
            error!(error = %message, "An unrecoverable error occurred");
            // flush the error log before exiting
            drop(guard);
            eprintln!("Error: {:#}", e);
            process::exit(1);
        },
    }
}

fn prepare() -> Result<EtlConfig> {
    let config = EtlConfig::from_env()?;
    pipeline::reset_output_dir(&config.output_dir)?;
    Ok(config)
}
