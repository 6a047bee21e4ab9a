//! Movies ETL Common Library
//!
//! Shared error handling, logging and checksum utilities for the movies ETL.
//!
//! # Overview
//!
//! - **Error Handling**: [`EtlError`] and the [`Result`] alias
//! - **Logging**: tracing subscriber setup driven by [`logging::LogConfig`]
//! - **Checksums**: SHA-256 of written tables, used to compare runs
//!
//! # Example
//!
//! ```no_run
//! use movies_common::checksum::sha256_file;
//! use movies_common::Result;
//!
//! fn fingerprint(path: &str) -> Result<()> {
//!     let checksum = sha256_file(path)?;
//!     tracing::info!(%checksum, path, "Table fingerprint");
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod checksum;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{EtlError, Result};
