use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::features::Weights;
use crate::similarity::{self, RankError, Ranked};
use crate::store::models::TrackRecord;
use crate::store::FeatureStore;

/// Number of tracks shown per recommendation by default.
pub const DEFAULT_TOP_K: usize = 5;
/// Directory audio files are resolved into by default.
pub const DEFAULT_MUSIC_DIR: &str = "music";

#[derive(Error, Debug, PartialEq)]
pub enum RecommendError {
    #[error("No recipe named \"{0}\"")]
    UnknownSelection(String),
    #[error(transparent)]
    Rank(#[from] RankError),
}

/// Knobs for turning a ranking into results.
#[derive(Debug, Clone)]
pub struct RecommendOptions {
    pub top_k: usize,
    pub music_dir: PathBuf,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            music_dir: PathBuf::from(DEFAULT_MUSIC_DIR),
        }
    }
}

/// A track picked for a recipe, with its score and playable path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation<'a> {
    pub track: &'a TrackRecord,
    pub similarity: f64,
    /// `None` when the stored path has no usable file name.
    pub audio_path: Option<PathBuf>,
}

impl Recommendation<'_> {
    /// Similarity as shown to users: two decimals.
    pub fn display_similarity(&self) -> String {
        format!("{:.2}", self.similarity)
    }
}

/// Take the first `k` entries of a ranking and attach track metadata.
///
/// `k` larger than the ranking is clamped. Asset paths are resolved but not checked
/// for existence.
pub fn top_k<'a>(
    ranking: &[Ranked],
    k: usize,
    tracks: &'a [TrackRecord],
    music_dir: &Path,
) -> Vec<Recommendation<'a>> {
    ranking
        .iter()
        .take(k)
        .filter_map(|r| {
            let track = tracks.get(r.index)?;
            Some(Recommendation {
                track,
                similarity: r.score,
                audio_path: resolve_asset_path(music_dir, &track.audio_path),
            })
        })
        .collect()
}

/// Re-root a stored path under `dir`, keeping only its final file name.
///
/// Both `/` and `\` count as separators, so any directory prefix in the data (absolute,
/// relative, or Windows-style) is dropped. Returns `None` when nothing usable remains
/// (empty, `.` or `..`).
pub fn resolve_asset_path(dir: &Path, stored: &str) -> Option<PathBuf> {
    let name = stored
        .trim()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    match name {
        "" | "." | ".." => None,
        _ => Some(dir.join(name)),
    }
}

/// Full pipeline: look up the recipe, rank every track, and assemble the top results.
pub fn recommend<'a>(
    store: &'a FeatureStore,
    recipe_name: &str,
    weights: &Weights,
    options: &RecommendOptions,
) -> Result<Vec<Recommendation<'a>>, RecommendError> {
    let (_, recipe) = store
        .find_recipe(recipe_name)
        .ok_or_else(|| RecommendError::UnknownSelection(recipe_name.to_string()))?;

    let ranking = similarity::rank(&recipe.features, weights, store.track_features())?;
    Ok(top_k(&ranking, options.top_k, store.tracks(), &options.music_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;
    use crate::store::models::RecipeRecord;

    fn track(name: &str, features: [f64; 3], audio: &str) -> TrackRecord {
        TrackRecord {
            name: name.to_string(),
            features: FeatureVector(features),
            audio_path: audio.to_string(),
        }
    }

    fn recipe(name: &str, features: [f64; 3]) -> RecipeRecord {
        RecipeRecord {
            name: name.to_string(),
            image_path: format!("img/{name}.jpg"),
            features: FeatureVector(features),
        }
    }

    fn abc_store() -> FeatureStore {
        FeatureStore::new(
            vec![recipe("Lemon Tart", [1.0, 0.0, 0.0])],
            vec![
                track("A", [1.0, 0.0, 0.0], "songs/a.mp3"),
                track("B", [0.0, 1.0, 0.0], "songs/b.mp3"),
                track("C", [-1.0, 0.0, 0.0], "songs/c.mp3"),
            ],
        )
    }

    fn many_tracks(n: usize) -> Vec<TrackRecord> {
        (0..n)
            .map(|i| track(&format!("T{i}"), [i as f64, 1.0, (n - i) as f64], "x.mp3"))
            .collect()
    }

    #[test]
    fn test_resolve_strips_absolute_prefix() {
        assert_eq!(
            resolve_asset_path(Path::new("music"), "/abs/path/foo.mp3"),
            Some(PathBuf::from("music/foo.mp3"))
        );
    }

    #[test]
    fn test_resolve_blocks_traversal() {
        let dir = Path::new("music");
        assert_eq!(
            resolve_asset_path(dir, "../../etc/passwd"),
            Some(PathBuf::from("music/passwd"))
        );
        assert_eq!(
            resolve_asset_path(dir, r"C:\Users\me\Music\bar.mp3"),
            Some(PathBuf::from("music/bar.mp3"))
        );
        assert_eq!(resolve_asset_path(dir, "plain.mp3"), Some(PathBuf::from("music/plain.mp3")));
        assert_eq!(resolve_asset_path(dir, ".."), None);
        assert_eq!(resolve_asset_path(dir, "songs/"), None);
        assert_eq!(resolve_asset_path(dir, ""), None);
    }

    #[test]
    fn test_abc_recommendation() {
        let store = abc_store();
        let recs = recommend(&store, "Lemon Tart", &Weights::UNIFORM, &RecommendOptions::default())
            .unwrap();

        let names: Vec<&str> = recs.iter().map(|r| r.track.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!((recs[0].similarity - 1.0).abs() < 1e-9);
        assert!(recs[1].similarity.abs() < 1e-9);
        assert!((recs[2].similarity + 1.0).abs() < 1e-9);
        assert_eq!(recs[0].audio_path, Some(PathBuf::from("music/a.mp3")));
    }

    #[test]
    fn test_k_larger_than_catalog_is_clamped() {
        let store = abc_store();
        let options = RecommendOptions {
            top_k: 10,
            ..Default::default()
        };
        let recs = recommend(&store, "Lemon Tart", &Weights::UNIFORM, &options).unwrap();
        assert_eq!(recs.len(), 3);
    }

    #[test]
    fn test_top_k_is_prefix_of_ranking() {
        let tracks = many_tracks(9);
        let features: Vec<FeatureVector> = tracks.iter().map(|t| t.features).collect();
        let query = FeatureVector::new(3.0, 1.0, 5.0);
        let ranking = similarity::rank(&query, &Weights::UNIFORM, &features).unwrap();

        for k in 0..=9 {
            let recs = top_k(&ranking, k, &tracks, Path::new("music"));
            assert_eq!(recs.len(), k);
            for (rec, ranked) in recs.iter().zip(ranking.iter()) {
                assert_eq!(rec.track, &tracks[ranked.index]);
                assert_eq!(rec.similarity, ranked.score);
            }
        }
    }

    #[test]
    fn test_unknown_recipe() {
        let store = abc_store();
        let err = recommend(&store, "Ramen", &Weights::UNIFORM, &RecommendOptions::default())
            .unwrap_err();
        assert_eq!(err, RecommendError::UnknownSelection("Ramen".to_string()));
    }

    #[test]
    fn test_empty_catalog_fails() {
        let store = FeatureStore::new(vec![recipe("Toast", [0.5, 0.5, 0.5])], Vec::new());
        let err = recommend(&store, "Toast", &Weights::UNIFORM, &RecommendOptions::default())
            .unwrap_err();
        assert_eq!(err, RecommendError::Rank(RankError::EmptyCandidateSet));
    }

    #[test]
    fn test_custom_music_dir() {
        let store = abc_store();
        let options = RecommendOptions {
            top_k: 1,
            music_dir: PathBuf::from("/srv/audio"),
        };
        let recs = recommend(&store, "Lemon Tart", &Weights::UNIFORM, &options).unwrap();
        assert_eq!(recs[0].audio_path, Some(PathBuf::from("/srv/audio/a.mp3")));
    }

    #[test]
    fn test_display_similarity_rounds() {
        let store = abc_store();
        let rec = Recommendation {
            track: &store.tracks()[0],
            similarity: 0.98765,
            audio_path: None,
        };
        assert_eq!(rec.display_similarity(), "0.99");
    }
}
