//! CSV table writer
//!
//! All tables are written into a staging directory next to the final
//! `data/` directory and the staging directory is renamed into place only
//! after every file is complete. A failed run therefore never leaves a
//! half-written `data/` behind.

use crate::models::{Genre, Movie, MovieGenre, MovieProductionCompany, ProductionCompany};
use crate::normalize::NormalizedTables;
use movies_common::checksum::sha256_file;
use movies_common::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const MOVIES_CSV: &str = "movies.csv";
pub const GENRES_CSV: &str = "genres.csv";
pub const PRODUCTION_COMPANIES_CSV: &str = "production_companies.csv";
pub const MOVIE_GENRES_CSV: &str = "movie_genres.csv";
pub const MOVIE_PRODUCTION_COMPANIES_CSV: &str = "movie_production_companies.csv";

/// Row type with a fixed CSV header
///
/// Headers are written explicitly so empty tables still get one.
pub trait CsvRow: Serialize {
    const HEADERS: &'static [&'static str];
}

impl CsvRow for Movie {
    const HEADERS: &'static [&'static str] = &[
        "movie_id",
        "title",
        "release_date",
        "budget",
        "revenue",
        "popularity",
        "year",
    ];
}

impl CsvRow for &Movie {
    const HEADERS: &'static [&'static str] = Movie::HEADERS;
}

impl CsvRow for Genre {
    const HEADERS: &'static [&'static str] = &["genre_id", "name"];
}

impl CsvRow for ProductionCompany {
    const HEADERS: &'static [&'static str] = &["company_id", "name"];
}

impl CsvRow for MovieGenre {
    const HEADERS: &'static [&'static str] = &["movie_id", "genre_id"];
}

impl CsvRow for MovieProductionCompany {
    const HEADERS: &'static [&'static str] = &["movie_id", "company_id"];
}

/// Description of one written table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenTable {
    pub rows: usize,
    /// Hex SHA-256 of the file contents
    pub sha256: String,
}

/// Result of [`write_tables`]: final directory and per-file details
#[derive(Debug, Clone)]
pub struct WrittenTables {
    pub data_dir: PathBuf,
    pub tables: BTreeMap<&'static str, WrittenTable>,
}

/// Write every table as CSV into `data_dir`, replacing it atomically
pub fn write_tables(tables: &NormalizedTables, data_dir: &Path) -> Result<WrittenTables> {
    let parent = match data_dir.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    // Removed automatically if anything below fails
    let staging = tempfile::Builder::new()
        .prefix(".data-staging-")
        .tempdir_in(&parent)?;
    debug!(staging = %staging.path().display(), "Writing tables to staging directory");

    let mut row_counts = BTreeMap::new();
    row_counts.insert(MOVIES_CSV, write_csv(&staging.path().join(MOVIES_CSV), tables.movies())?);
    row_counts.insert(GENRES_CSV, write_csv(&staging.path().join(GENRES_CSV), tables.genres())?);
    row_counts.insert(
        PRODUCTION_COMPANIES_CSV,
        write_csv(
            &staging.path().join(PRODUCTION_COMPANIES_CSV),
            tables.production_companies(),
        )?,
    );
    row_counts.insert(
        MOVIE_GENRES_CSV,
        write_csv(&staging.path().join(MOVIE_GENRES_CSV), tables.movie_genres())?,
    );
    row_counts.insert(
        MOVIE_PRODUCTION_COMPANIES_CSV,
        write_csv(
            &staging.path().join(MOVIE_PRODUCTION_COMPANIES_CSV),
            tables.movie_production_companies(),
        )?,
    );

    if data_dir.exists() {
        std::fs::remove_dir_all(data_dir)?;
    }
    std::fs::rename(staging.path(), data_dir)?;
    // The staging path is gone now; dropping the handle is a no-op.
    drop(staging);

    let mut written = BTreeMap::new();
    for (name, rows) in row_counts {
        let sha256 = sha256_file(data_dir.join(name))?;
        info!(table = name, rows, %sha256, "Wrote table");
        written.insert(name, WrittenTable { rows, sha256 });
    }

    Ok(WrittenTables {
        data_dir: data_dir.to_path_buf(),
        tables: written,
    })
}

/// Serialize rows to a CSV file with a header row; returns the row count
fn write_csv<T, I>(path: &Path, rows: I) -> Result<usize>
where
    T: CsvRow,
    I: IntoIterator<Item = T>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(T::HEADERS)?;

    let mut count = 0;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}
