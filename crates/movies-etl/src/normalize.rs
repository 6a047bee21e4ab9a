//! Normalization of raw movie records into relational tables
//!
//! Each raw record becomes one [`Movie`]; its embedded genre and
//! production-company lists become entity rows (deduplicated by id, first
//! name wins) and junction rows pointing at them.
//!
//! # Invariants
//!
//! - Every junction row references an existing movie and entity. Links are
//!   only recorded after both parents are in their tables.
//! - A later record with an already-seen movie id replaces the earlier
//!   movie and its links.
//! - Tables are ordered maps, so iteration (and therefore CSV output) is
//!   sorted by key and identical between runs.

use crate::embedded::parse_entity_list;
use crate::models::{
    Genre, Movie, MovieGenre, MovieProductionCompany, ProductionCompany, RawMovieRecord,
};
use chrono::{Datelike, NaiveDate};
use movies_common::{EtlError, Result};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Counters reported after a normalization pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub records_seen: usize,
    /// Records dropped entirely because their id is not an integer
    pub skipped_records: usize,
    /// Embedded fields that were missing or not a list
    pub skipped_fields: usize,
    /// List elements without a usable id or name
    pub rejected_entities: usize,
    /// Records whose movie id had been seen before
    pub duplicate_movies: usize,
}

/// Normalized table set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTables {
    movies: BTreeMap<i64, Movie>,
    genres: BTreeMap<i64, String>,
    production_companies: BTreeMap<i64, String>,
    movie_genres: BTreeMap<i64, BTreeSet<i64>>,
    movie_production_companies: BTreeMap<i64, BTreeSet<i64>>,
}

impl NormalizedTables {
    pub fn movies(&self) -> impl Iterator<Item = &Movie> + '_ {
        self.movies.values()
    }

    pub fn movie(&self, movie_id: i64) -> Option<&Movie> {
        self.movies.get(&movie_id)
    }

    pub fn genres(&self) -> impl Iterator<Item = Genre> + '_ {
        self.genres.iter().map(|(&genre_id, name)| Genre {
            genre_id,
            name: name.clone(),
        })
    }

    pub fn production_companies(&self) -> impl Iterator<Item = ProductionCompany> + '_ {
        self.production_companies
            .iter()
            .map(|(&company_id, name)| ProductionCompany {
                company_id,
                name: name.clone(),
            })
    }

    pub fn movie_genres(&self) -> impl Iterator<Item = MovieGenre> + '_ {
        self.movie_genres.iter().flat_map(|(&movie_id, genre_ids)| {
            genre_ids
                .iter()
                .map(move |&genre_id| MovieGenre { movie_id, genre_id })
        })
    }

    pub fn movie_production_companies(&self) -> impl Iterator<Item = MovieProductionCompany> + '_ {
        self.movie_production_companies
            .iter()
            .flat_map(|(&movie_id, company_ids)| {
                company_ids
                    .iter()
                    .map(move |&company_id| MovieProductionCompany {
                        movie_id,
                        company_id,
                    })
            })
    }

    pub fn movie_count(&self) -> usize {
        self.movies.len()
    }

    pub fn genre_count(&self) -> usize {
        self.genres.len()
    }

    pub fn production_company_count(&self) -> usize {
        self.production_companies.len()
    }

    /// Check that every junction row points at existing parent rows
    pub fn verify_integrity(&self) -> Result<()> {
        check_links("movie_genres", &self.movies, &self.genres, &self.movie_genres)?;
        check_links(
            "movie_production_companies",
            &self.movies,
            &self.production_companies,
            &self.movie_production_companies,
        )
    }
}

fn check_links(
    table: &str,
    movies: &BTreeMap<i64, Movie>,
    entities: &BTreeMap<i64, String>,
    links: &BTreeMap<i64, BTreeSet<i64>>,
) -> Result<()> {
    for (movie_id, entity_ids) in links {
        if !movies.contains_key(movie_id) {
            return Err(EtlError::integrity(format!("{table}: movie {movie_id} does not exist")));
        }
        if let Some(missing) = entity_ids.iter().find(|id| !entities.contains_key(id)) {
            return Err(EtlError::integrity(format!(
                "{table}: movie {movie_id} references missing entity {missing}"
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum EmbeddedKind {
    Genre,
    ProductionCompany,
}

impl EmbeddedKind {
    fn field(self) -> &'static str {
        match self {
            EmbeddedKind::Genre => "genres",
            EmbeddedKind::ProductionCompany => "production_companies",
        }
    }
}

/// Incremental normalizer; feed records in input order
#[derive(Debug, Default)]
pub struct Normalizer {
    tables: NormalizedTables,
    stats: NormalizeStats,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one raw record
    pub fn push(&mut self, raw: &RawMovieRecord) {
        self.stats.records_seen += 1;

        let Some(movie_id) = raw.id.as_deref().and_then(parse_int) else {
            warn!(
                id = raw.id.as_deref().unwrap_or(""),
                title = raw.title.as_deref().unwrap_or(""),
                "Skipping record without an integer movie id"
            );
            self.stats.skipped_records += 1;
            return;
        };

        if self
            .tables
            .movies
            .insert(movie_id, movie_from_raw(movie_id, raw))
            .is_some()
        {
            debug!(movie_id, "Duplicate movie id, replacing earlier record");
            self.stats.duplicate_movies += 1;
        }

        self.link(movie_id, EmbeddedKind::Genre, raw.genres.as_deref());
        self.link(
            movie_id,
            EmbeddedKind::ProductionCompany,
            raw.production_companies.as_deref(),
        );
    }

    pub fn finish(self) -> (NormalizedTables, NormalizeStats) {
        info!(
            records = self.stats.records_seen,
            movies = self.tables.movie_count(),
            genres = self.tables.genre_count(),
            production_companies = self.tables.production_company_count(),
            skipped_records = self.stats.skipped_records,
            skipped_fields = self.stats.skipped_fields,
            "Normalization complete"
        );
        (self.tables, self.stats)
    }

    fn link(&mut self, movie_id: i64, kind: EmbeddedKind, field: Option<&str>) {
        let (entities, links) = match kind {
            EmbeddedKind::Genre => (&mut self.tables.genres, &mut self.tables.movie_genres),
            EmbeddedKind::ProductionCompany => (
                &mut self.tables.production_companies,
                &mut self.tables.movie_production_companies,
            ),
        };

        // Links from an earlier record with this id are replaced, even when
        // this record's field turns out to be unusable.
        links.remove(&movie_id);

        let Some(field) = field else {
            warn!(movie_id, field = kind.field(), "Missing embedded field, skipping it");
            self.stats.skipped_fields += 1;
            return;
        };

        let list = match parse_entity_list(field) {
            Ok(list) => list,
            Err(e) => {
                warn!(movie_id, field = kind.field(), error = %e, "Malformed embedded field, skipping it");
                self.stats.skipped_fields += 1;
                return;
            },
        };

        if list.rejected > 0 {
            warn!(
                movie_id,
                field = kind.field(),
                rejected = list.rejected,
                "Skipping embedded objects without an integer id and a name"
            );
            self.stats.rejected_entities += list.rejected;
        }

        let mut linked = BTreeSet::new();
        for entity in list.entities {
            let name = entities.entry(entity.id).or_insert_with(|| entity.name.clone());
            if *name != entity.name {
                debug!(
                    id = entity.id,
                    kept = %name,
                    ignored = %entity.name,
                    field = kind.field(),
                    "Conflicting name for entity, keeping the first"
                );
            }
            linked.insert(entity.id);
        }

        if !linked.is_empty() {
            links.insert(movie_id, linked);
        }
    }
}

/// Normalize a full record set
pub fn normalize<'a, I>(records: I) -> (NormalizedTables, NormalizeStats)
where
    I: IntoIterator<Item = &'a RawMovieRecord>,
{
    let mut normalizer = Normalizer::new();
    for raw in records {
        normalizer.push(raw);
    }
    normalizer.finish()
}

fn movie_from_raw(movie_id: i64, raw: &RawMovieRecord) -> Movie {
    let release_date = non_empty(raw.release_date.as_deref());
    let year = release_date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .map(|d| d.year());

    Movie {
        movie_id,
        title: non_empty(raw.title.as_deref()),
        release_date,
        budget: raw.budget.as_deref().and_then(parse_int),
        revenue: raw.revenue.as_deref().and_then(parse_float),
        popularity: raw.popularity.as_deref().and_then(parse_float),
        year,
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Integer cell; whole-valued floats such as `"30000000.0"` are accepted
fn parse_int(value: &str) -> Option<i64> {
    let value = value.trim();
    value.parse::<i64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn parse_float(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}
