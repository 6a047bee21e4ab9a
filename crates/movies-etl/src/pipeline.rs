//! End-to-end run: fetch, load, normalize, write, report
//!
//! Steps run strictly one after another. The download is the only async
//! step; everything after it works on the in-memory archive and local
//! files.

use crate::config::EtlConfig;
use crate::normalize::{normalize, NormalizeStats};
use crate::writer::{write_tables, WrittenTables};
use crate::{fetch, loader, report};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    /// CSV rows the loader could not decode
    pub skipped_rows: usize,
    pub normalize: NormalizeStats,
    pub written: WrittenTables,
    pub sql_query_path: PathBuf,
}

impl PipelineSummary {
    /// True when nothing was skipped anywhere in the run
    pub fn is_clean(&self) -> bool {
        self.skipped_rows == 0
            && self.normalize.skipped_records == 0
            && self.normalize.skipped_fields == 0
            && self.normalize.rejected_entities == 0
    }
}

/// Delete the output root if present and create it empty
pub fn reset_output_dir(output_dir: &Path) -> Result<()> {
    if output_dir.exists() {
        std::fs::remove_dir_all(output_dir)
            .with_context(|| format!("Failed to remove {}", output_dir.display()))?;
    }
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    Ok(())
}

/// Download the archive at `url` and process it
#[instrument(skip(config), fields(output = %config.output_dir.display()))]
pub async fn run(url: &str, config: &EtlConfig) -> Result<PipelineSummary> {
    info!("Starting data processing pipeline");

    let client = fetch::http_client(config.http_timeout)?;
    let archive = fetch::download_archive(&client, url).await?;

    process_archive(&archive, config)
}

/// Process an already downloaded zip archive
///
/// The query is staged before the tables are written and moved into place
/// after `data/` is. If that last step fails, `data/` is removed again, so
/// a run leaves both outputs or neither.
pub fn process_archive(archive: &[u8], config: &EtlConfig) -> Result<PipelineSummary> {
    // Holds the extracted CSV; removed on return
    let work_dir = tempfile::tempdir().context("Failed to create working directory")?;
    let csv_path = fetch::extract_entry(archive, &config.archive_entry, work_dir.path())?;

    let loaded = loader::load_movies(&csv_path).context("Failed to load movie metadata")?;
    let (tables, stats) = normalize(&loaded.records);
    tables
        .verify_integrity()
        .context("Normalized tables are inconsistent")?;

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;
    let staged_sql =
        report::stage_revenue_query(&config.output_dir).context("Failed to write SQL query")?;

    let written = write_tables(&tables, &config.data_dir()).context("Failed to write tables")?;

    let sql_query_path = config.sql_query_path();
    if let Err(e) = report::commit_revenue_query(staged_sql, &sql_query_path) {
        // data/ is only kept together with its query
        if let Err(cleanup) = std::fs::remove_dir_all(&written.data_dir) {
            warn!(error = %cleanup, "Failed to remove data directory after SQL write failure");
        }
        return Err(anyhow::Error::new(e).context("Failed to write SQL query"));
    }

    info!(
        data_dir = %written.data_dir.display(),
        sql = %sql_query_path.display(),
        "Data processing complete"
    );

    Ok(PipelineSummary {
        skipped_rows: loaded.skipped_rows,
        normalize: stats,
        written,
        sql_query_path,
    })
}
