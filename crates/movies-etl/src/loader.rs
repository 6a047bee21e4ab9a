//! Movie metadata CSV loader
//!
//! Reads the extracted `movies_metadata.csv` into [`RawMovieRecord`]s.
//! The real file has short and misaligned rows, so the reader is flexible
//! and rows it cannot decode are logged and skipped.

use crate::models::RawMovieRecord;
use movies_common::{EtlError, Result};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Columns the normalizer cannot work without
pub const REQUIRED_COLUMNS: &[&str] = &["id", "genres", "production_companies"];

/// Loaded records plus the number of rows that could not be decoded
#[derive(Debug, Default)]
pub struct LoadedMovies {
    pub records: Vec<RawMovieRecord>,
    pub skipped_rows: usize,
}

/// Load raw records from a CSV file on disk
pub fn load_movies(path: &Path) -> Result<LoadedMovies> {
    info!(path = %path.display(), "Loading movie metadata");
    let file = std::fs::File::open(path)?;
    load_movies_from_reader(file)
}

/// Load raw records from any CSV source with a header row
pub fn load_movies_from_reader<R: Read>(reader: R) -> Result<LoadedMovies> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(EtlError::MissingColumn((*column).to_string()));
        }
    }

    let mut loaded = LoadedMovies::default();

    for (index, result) in csv_reader.records().enumerate() {
        // header is line 1
        let line = index + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(line, error = %e, "Skipping unreadable CSV row");
                loaded.skipped_rows += 1;
                continue;
            },
        };

        match record.deserialize::<RawMovieRecord>(Some(&headers)) {
            Ok(raw) => loaded.records.push(raw),
            Err(e) => {
                warn!(line, error = %e, "Skipping undecodable CSV row");
                loaded.skipped_rows += 1;
            },
        }
    }

    debug!(
        records = loaded.records.len(),
        skipped = loaded.skipped_rows,
        "Finished reading movie metadata"
    );

    Ok(loaded)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const HEADER: &str = "adult,budget,genres,id,popularity,production_companies,release_date,revenue,title\n";

    #[test]
    fn test_load_typical_rows() {
        let csv = format!(
            "{HEADER}False,30000000,\"[{{'id': 16, 'name': 'Animation'}}]\",862,21.946943,\"[{{'name': 'Pixar Animation Studios', 'id': 3}}]\",1995-10-30,373554033.0,Toy Story\n"
        );

        let loaded = load_movies_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(loaded.skipped_rows, 0);
        assert_eq!(loaded.records.len(), 1);

        let raw = &loaded.records[0];
        assert_eq!(raw.id.as_deref(), Some("862"));
        assert_eq!(raw.title.as_deref(), Some("Toy Story"));
        assert_eq!(raw.budget.as_deref(), Some("30000000"));
        assert_eq!(raw.revenue.as_deref(), Some("373554033.0"));
        assert_eq!(raw.genres.as_deref(), Some("[{'id': 16, 'name': 'Animation'}]"));
        assert_eq!(
            raw.production_companies.as_deref(),
            Some("[{'name': 'Pixar Animation Studios', 'id': 3}]")
        );
    }

    #[test]
    fn test_short_rows_and_empty_cells() {
        let csv = format!("{HEADER}False,,[],7,,\n");

        let loaded = load_movies_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(loaded.records.len(), 1);
        let raw = &loaded.records[0];
        assert_eq!(raw.id.as_deref(), Some("7"));
        assert_eq!(raw.budget, None);
        assert_eq!(raw.genres.as_deref(), Some("[]"));
        assert_eq!(raw.production_companies, None);
        assert_eq!(raw.title, None);
    }

    #[test]
    fn test_padded_headers_still_decode() {
        let csv = " id , title,genres ,production_companies\n862,Toy Story,[],[]\n";

        let loaded = load_movies_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(loaded.skipped_rows, 0);
        assert_eq!(loaded.records[0].id.as_deref(), Some("862"));
        assert_eq!(loaded.records[0].title.as_deref(), Some("Toy Story"));
        assert_eq!(loaded.records[0].genres.as_deref(), Some("[]"));
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "id,title,genres\n1,A,[]\n";
        let err = load_movies_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, EtlError::MissingColumn(ref c) if c == "production_companies"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies_metadata.csv");
        std::fs::write(&path, format!("{HEADER}False,0,[],1,0.5,[],2001-01-01,0,A\n")).unwrap();

        let loaded = load_movies(&path).unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert!(load_movies(&dir.path().join("absent.csv")).is_err());
    }
}
