//! Revenue-by-genre-by-year query
//!
//! The query is a fixed artifact over the written tables; nothing in it is
//! generated from the data.

use movies_common::{EtlError, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Release year, genre name and total revenue, grouped by year and genre
pub const REVENUE_BY_GENRE_BY_YEAR_SQL: &str = "\
SELECT
    EXTRACT(YEAR FROM M.release_date) AS release_year,
    G.name AS genre_name,
    SUM(M.revenue) AS total_revenue
FROM
    movies M
JOIN
    movie_genres MG ON M.movie_id = MG.movie_id
JOIN
    genres G ON MG.genre_id = G.genre_id
GROUP BY
    release_year, genre_name
ORDER BY
    release_year, total_revenue DESC;
";

/// Write the query text to a hidden temporary file in `dir`
///
/// Nothing is visible at the final path until [`commit_revenue_query`].
pub fn stage_revenue_query(dir: &Path) -> Result<NamedTempFile> {
    let mut staged = tempfile::Builder::new()
        .prefix(".sql-staging-")
        .tempfile_in(dir)?;
    staged.write_all(REVENUE_BY_GENRE_BY_YEAR_SQL.as_bytes())?;
    staged.flush()?;
    Ok(staged)
}

/// Move a staged query to `path`, replacing any file there
pub fn commit_revenue_query(staged: NamedTempFile, path: &Path) -> Result<()> {
    staged.persist(path).map_err(|e| EtlError::Io(e.error))?;
    info!(path = %path.display(), "Wrote revenue query");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_query_shape() {
        let sql = REVENUE_BY_GENRE_BY_YEAR_SQL;
        assert!(sql.starts_with("SELECT\n"));
        assert!(sql.contains("SUM(M.revenue) AS total_revenue"));
        assert!(sql.contains("JOIN\n    movie_genres MG ON M.movie_id = MG.movie_id"));
        assert!(sql.ends_with("ORDER BY\n    release_year, total_revenue DESC;\n"));
    }

    #[test]
    fn test_written_file_matches_constant() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("revenue_by_genre_by_year.sql");

        for _ in 0..2 {
            commit_revenue_query(stage_revenue_query(dir.path()).unwrap(), &path).unwrap();
        }
        assert_eq!(std::fs::read(&path).unwrap(), REVENUE_BY_GENRE_BY_YEAR_SQL.as_bytes());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_staged_query_is_invisible_until_committed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("revenue_by_genre_by_year.sql");

        let staged = stage_revenue_query(dir.path()).unwrap();
        assert!(!path.exists());

        commit_revenue_query(staged, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), REVENUE_BY_GENRE_BY_YEAR_SQL);
    }

    #[test]
    fn test_dropped_stage_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        drop(stage_revenue_query(dir.path()).unwrap());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
