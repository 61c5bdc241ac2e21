pub mod config;
pub mod features;
pub mod recommend;
pub mod similarity;
pub mod store;
pub mod ui;

/// Feature axes shared by recipes and tracks: sentiment, saturation, brightness.
pub const FEATURE_AXES: usize = 3;

/// Application name for XDG paths
pub const APP_NAME: &str = "dishtune";
