use serde::Serialize;

use crate::features::FeatureVector;

/// A dish the user can pick, read from the recipe table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeRecord {
    pub name: String,
    /// Image path as stored in the data file (not yet resolved).
    pub image_path: String,
    pub features: FeatureVector,
}

/// A candidate track, read from the track table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackRecord {
    pub name: String,
    pub features: FeatureVector,
    /// Audio path as stored in the data file (not yet resolved).
    pub audio_path: String,
}
