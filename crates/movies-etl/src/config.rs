//! Run configuration
//!
//! Output location, archive entry and HTTP timeout, read from the
//! environment (a `.env` file is loaded first by the binary).

use movies_common::{EtlError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default output root, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "processed_data";

/// Default file extracted from the downloaded archive
pub const DEFAULT_ARCHIVE_ENTRY: &str = "movies_metadata.csv";

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 300;

/// Subdirectory of the output root holding one CSV per table
pub const DATA_DIR_NAME: &str = "data";

pub const ERROR_LOG_FILE_NAME: &str = "error_log.txt";

pub const SQL_QUERY_FILE_NAME: &str = "revenue_by_genre_by_year.sql";

/// ETL run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtlConfig {
    /// Root of everything the run writes
    pub output_dir: PathBuf,

    /// Name of the CSV to extract from the archive, matched by basename
    pub archive_entry: String,

    pub http_timeout: Duration,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            archive_entry: DEFAULT_ARCHIVE_ENTRY.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl EtlConfig {
    /// Defaults overridden by environment variables
    ///
    /// - `MOVIES_ETL_OUTPUT_DIR`
    /// - `MOVIES_ETL_ARCHIVE_ENTRY`
    /// - `MOVIES_ETL_HTTP_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("MOVIES_ETL_OUTPUT_DIR") {
            if dir.trim().is_empty() {
                return Err(EtlError::config("MOVIES_ETL_OUTPUT_DIR is empty"));
            }
            config.output_dir = PathBuf::from(dir);
        }

        if let Ok(entry) = std::env::var("MOVIES_ETL_ARCHIVE_ENTRY") {
            if entry.trim().is_empty() {
                return Err(EtlError::config("MOVIES_ETL_ARCHIVE_ENTRY is empty"));
            }
            config.archive_entry = entry;
        }

        if let Ok(secs) = std::env::var("MOVIES_ETL_HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                EtlError::config(format!("MOVIES_ETL_HTTP_TIMEOUT_SECS is not a number: {secs}"))
            })?;
            config.http_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Config writing under `output_dir`, other settings default
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.output_dir.join(DATA_DIR_NAME)
    }

    pub fn error_log_path(&self) -> PathBuf {
        self.output_dir.join(ERROR_LOG_FILE_NAME)
    }

    pub fn sql_query_path(&self) -> PathBuf {
        self.output_dir.join(SQL_QUERY_FILE_NAME)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
