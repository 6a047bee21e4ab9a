//! Raw and normalized movie data models

use serde::{Deserialize, Serialize};

/// One row of `movies_metadata.csv` as distributed
///
/// Only the columns the normalizer reads are kept; everything stays text
/// until normalization so one bad cell never rejects the whole row.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawMovieRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub budget: Option<String>,
    pub revenue: Option<String>,
    pub popularity: Option<String>,
    /// Python-literal list of `{'id': .., 'name': ..}` objects
    pub genres: Option<String>,
    /// Python-literal list of `{'name': .., 'id': ..}` objects
    pub production_companies: Option<String>,
}

/// One object from an embedded list field
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmbeddedEntity {
    pub id: i64,
    pub name: String,
}

/// A row of `movies.csv`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movie {
    pub movie_id: i64,
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub budget: Option<i64>,
    pub revenue: Option<f64>,
    pub popularity: Option<f64>,
    /// Year of `release_date`, empty when the date doesn't parse
    pub year: Option<i32>,
}

impl Movie {
    /// Movie with only an id and title set
    pub fn new(movie_id: i64, title: impl Into<String>) -> Self {
        Self {
            movie_id,
            title: Some(title.into()),
            release_date: None,
            budget: None,
            revenue: None,
            popularity: None,
            year: None,
        }
    }
}

/// A row of `genres.csv`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Genre {
    pub genre_id: i64,
    pub name: String,
}

/// A row of `production_companies.csv`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductionCompany {
    pub company_id: i64,
    pub name: String,
}

/// A row of `movie_genres.csv`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MovieGenre {
    pub movie_id: i64,
    pub genre_id: i64,
}

/// A row of `movie_production_companies.csv`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MovieProductionCompany {
    pub movie_id: i64,
    pub company_id: i64,
}
