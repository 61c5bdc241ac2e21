use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::recommend::{DEFAULT_MUSIC_DIR, DEFAULT_TOP_K, RecommendOptions};
use crate::ui::SelectionStyle;

/// Application configuration loaded from TOML config file.
/// All fields have sensible defaults, so the config file is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Recipe table (name, image, sentiment, saturation, brightness).
    pub recipes_path: PathBuf,
    /// Track table (name, sentiment, saturation, brightness, audio file).
    pub tracks_path: PathBuf,
    /// Directory audio files are resolved into.
    pub music_dir: PathBuf,
    /// Directory recipe images are resolved into.
    pub image_dir: PathBuf,
    /// Number of recommendations to show.
    pub top_k: usize,
    /// How recipes are presented for selection.
    pub style: SelectionStyle,
    /// Starting weights for each feature axis.
    pub weights: WeightConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            recipes_path: PathBuf::from("data/recipes.csv"),
            tracks_path: PathBuf::from("data/tracks.csv"),
            music_dir: PathBuf::from(DEFAULT_MUSIC_DIR),
            image_dir: PathBuf::from("images"),
            top_k: DEFAULT_TOP_K,
            style: SelectionStyle::default(),
            weights: WeightConfig::default(),
        }
    }
}

/// Default slider positions.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    pub sentiment: f64,
    pub saturation: f64,
    pub brightness: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            sentiment: 1.0,
            saturation: 1.0,
            brightness: 1.0,
        }
    }
}

impl AppConfig {
    /// Load config from `~/.config/dishtune/config.toml`.
    /// Returns default config if file doesn't exist.
    /// Logs a warning if the file exists but can't be parsed.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match config_path {
            Some(path) if path.exists() => {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => {
                        match Self::parse(&contents) {
                            Ok(config) => {
                                log::info!("Loaded config from {}", path.display());
                                config
                            }
                            Err(e) => {
                                log::warn!(
                                    "Failed to parse {}: {}. Using defaults.",
                                    path.display(),
                                    e
                                );
                                Self::default()
                            }
                        }
                    }
                    Err(e) => {
                        log::warn!(
                            "Failed to read {}: {}. Using defaults.",
                            path.display(),
                            e
                        );
                        Self::default()
                    }
                }
            }
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn recommend_options(&self) -> RecommendOptions {
        RecommendOptions {
            top_k: self.top_k,
            music_dir: self.music_dir.clone(),
        }
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.top_k, 5);
        assert_eq!(config.music_dir, PathBuf::from("music"));
        assert_eq!(config.image_dir, PathBuf::from("images"));
        assert_eq!(config.recipes_path, PathBuf::from("data/recipes.csv"));
        assert_eq!(config.tracks_path, PathBuf::from("data/tracks.csv"));
        assert_eq!(config.style, SelectionStyle::Dropdown);
        assert_eq!(config.weights.sentiment, 1.0);
        assert_eq!(config.weights.saturation, 1.0);
        assert_eq!(config.weights.brightness, 1.0);
    }

    #[test]
    fn test_partial_config() {
        let config = AppConfig::parse(
            r#"
            music_dir = "/srv/music"
            top_k = 3
            style = "gallery"

            [weights]
            brightness = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.style, SelectionStyle::Gallery);
        assert_eq!(config.recipes_path, PathBuf::from("data/recipes.csv"));
        assert_eq!(config.weights.sentiment, 1.0);
        assert_eq!(config.weights.brightness, 0.5);

        let options = config.recommend_options();
        assert_eq!(options.top_k, 3);
        assert_eq!(options.music_dir, PathBuf::from("/srv/music"));
    }

    #[test]
    fn test_default_catalog_parses() {
        let config = AppConfig::default();
        let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let store = crate::store::FeatureStore::load(
            &manifest.join(&config.recipes_path),
            &manifest.join(&config.tracks_path),
        )
        .unwrap();
        assert!(store.find_recipe("Tomato Curry").is_some());
        assert!(!store.tracks().is_empty());
    }

    #[test]
    fn test_unknown_style_is_an_error() {
        assert!(AppConfig::parse("style = \"carousel\"").is_err());
    }
}
