//! Movies ETL Library
//!
//! Downloads a zipped movie metadata dataset, normalizes it into movies,
//! genres, production companies and their junction tables, and writes each
//! table as CSV together with a revenue-by-genre-by-year SQL query.
//!
//! # Pipeline
//!
//! 1. [`fetch`]: HTTP download and zip extraction
//! 2. [`loader`]: `movies_metadata.csv` into [`models::RawMovieRecord`]s
//! 3. [`normalize`]: entity and junction tables, see [`embedded`] for the
//!    list-field format
//! 4. [`writer`]: one CSV per table, swapped into place atomically
//! 5. [`report`]: the fixed SQL query
//!
//! # Example
//!
//! ```no_run
//! use movies_etl::{config::EtlConfig, pipeline};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = EtlConfig::from_env()?;
//!     pipeline::reset_output_dir(&config.output_dir)?;
//!     let summary = pipeline::run("https://example.com/the-movies-dataset.zip", &config).await?;
//!     tracing::info!(movies = summary.written.tables["movies.csv"].rows, "done");
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod embedded;
pub mod fetch;
pub mod loader;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod writer;
