pub mod models;
pub mod table;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::FEATURE_AXES;
use crate::features::{FeatureError, FeatureVector};
use models::{RecipeRecord, TrackRecord};
use table::{Row, TableError};

/// Columns in the recipe table: name, image, then the three features.
const RECIPE_COLUMNS: usize = 2 + FEATURE_AXES;
/// Columns in the track table: name, the three features, then the audio path.
const TRACK_COLUMNS: usize = 1 + FEATURE_AXES + 1;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{table} table: {source}")]
    Table {
        table: &'static str,
        #[source]
        source: TableError,
    },
    #[error("{table} table, line {line}: {message}")]
    Row {
        table: &'static str,
        line: usize,
        message: String,
    },
    #[error("{table} table, line {line}: {source}")]
    Feature {
        table: &'static str,
        line: usize,
        #[source]
        source: FeatureError,
    },
    #[error("{0} table has no rows")]
    EmptyTable(&'static str),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Read-only recipe and track catalog, loaded once and shared by reference.
#[derive(Debug, Clone)]
pub struct FeatureStore {
    recipes: Vec<RecipeRecord>,
    tracks: Vec<TrackRecord>,
    track_features: Vec<FeatureVector>,
}

impl FeatureStore {
    /// Load both tables from disk.
    pub fn load(recipes_path: &Path, tracks_path: &Path) -> Result<Self> {
        log::debug!(
            "Loading recipes from {}, tracks from {}",
            recipes_path.display(),
            tracks_path.display()
        );
        let recipes = open(recipes_path)?;
        let tracks = open(tracks_path)?;
        let store = Self::from_readers(recipes, tracks)?;
        log::info!(
            "Loaded {} recipes and {} tracks",
            store.recipes.len(),
            store.tracks.len()
        );
        Ok(store)
    }

    /// Parse both tables from arbitrary readers.
    pub fn from_readers<R1: Read, R2: Read>(recipes: R1, tracks: R2) -> Result<Self> {
        let recipes = parse_recipes(recipes)?;
        let tracks = parse_tracks(tracks)?;
        Ok(Self::new(recipes, tracks))
    }

    /// Build a store from already-parsed records.
    pub fn new(recipes: Vec<RecipeRecord>, tracks: Vec<TrackRecord>) -> Self {
        let track_features = tracks.iter().map(|t| t.features).collect();
        Self {
            recipes,
            tracks,
            track_features,
        }
    }

    pub fn recipes(&self) -> &[RecipeRecord] {
        &self.recipes
    }

    pub fn tracks(&self) -> &[TrackRecord] {
        &self.tracks
    }

    /// Track feature vectors, aligned by index with [`tracks`](Self::tracks).
    pub fn track_features(&self) -> &[FeatureVector] {
        &self.track_features
    }

    /// Look up a recipe by exact name. With duplicate names the first row wins.
    pub fn find_recipe(&self, name: &str) -> Option<(usize, &RecipeRecord)> {
        self.recipes.iter().enumerate().find(|(_, r)| r.name == name)
    }

    pub fn recipe_at(&self, index: usize) -> Option<&RecipeRecord> {
        self.recipes.get(index)
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_table<R: Read>(table: &'static str, reader: R, columns: usize) -> Result<Vec<Row>> {
    let rows = table::read_rows(BufReader::new(reader))
        .map_err(|source| StoreError::Table { table, source })?;

    // Every column besides the features is a single text field, so a count mismatch means
    // the feature part has the wrong dimension.
    let text_columns = columns - FEATURE_AXES;
    for row in &rows {
        if row.fields.len() != columns {
            return Err(StoreError::Feature {
                table,
                line: row.line,
                source: FeatureError::DimensionMismatch {
                    expected: FEATURE_AXES,
                    actual: row.fields.len().saturating_sub(text_columns),
                },
            });
        }
    }
    Ok(rows)
}

fn parse_features(table: &'static str, row: &Row, fields: &[String]) -> Result<FeatureVector> {
    let mut values = Vec::with_capacity(fields.len());
    for field in fields {
        let value: f64 = field.parse().map_err(|_| StoreError::Row {
            table,
            line: row.line,
            message: format!("'{}' is not a number", field),
        })?;
        values.push(value);
    }
    FeatureVector::from_slice(&values).map_err(|source| StoreError::Feature {
        table,
        line: row.line,
        source,
    })
}

/// Parse the recipe table: name, imagePath, sentiment, saturation, brightness.
pub fn parse_recipes<R: Read>(reader: R) -> Result<Vec<RecipeRecord>> {
    const TABLE: &str = "recipe";
    let rows = read_table(TABLE, reader, RECIPE_COLUMNS)?;
    if rows.is_empty() {
        return Err(StoreError::EmptyTable(TABLE));
    }

    rows.iter()
        .map(|row| {
            Ok(RecipeRecord {
                name: row.fields[0].clone(),
                image_path: row.fields[1].clone(),
                features: parse_features(TABLE, row, &row.fields[2..])?,
            })
        })
        .collect()
}

/// Parse the track table: name, sentiment, saturation, brightness, audioRelativePath.
///
/// An empty table is accepted here; ranking against it is what fails.
pub fn parse_tracks<R: Read>(reader: R) -> Result<Vec<TrackRecord>> {
    const TABLE: &str = "track";
    let rows = read_table(TABLE, reader, TRACK_COLUMNS)?;

    rows.iter()
        .map(|row| {
            Ok(TrackRecord {
                name: row.fields[0].clone(),
                features: parse_features(TABLE, row, &row.fields[1..1 + FEATURE_AXES])?,
                audio_path: row.fields[1 + FEATURE_AXES].clone(),
            })
        })
        .collect()
}
