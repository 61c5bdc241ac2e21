use lofty::prelude::*;
use std::path::Path;

/// Availability of a resolved audio asset.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetStatus {
    /// File exists. Duration is known when its tags/properties could be read.
    Playable { duration_secs: Option<f64> },
    Missing,
}

/// Check whether an audio file is present and read its duration if possible.
/// Unreadable files still count as playable (e.g., formats lofty doesn't parse).
pub fn probe_audio(path: &Path) -> AssetStatus {
    if !path.is_file() {
        return AssetStatus::Missing;
    }

    let tagged_file = match lofty::read_from_path(path) {
        Ok(f) => f,
        Err(e) => {
            log::debug!("Could not read properties of {}: {}", path.display(), e);
            return AssetStatus::Playable { duration_secs: None };
        }
    };

    let secs = tagged_file.properties().duration().as_secs_f64();
    AssetStatus::Playable {
        duration_secs: if secs > 0.0 { Some(secs) } else { None },
    }
}

/// Format seconds as m:ss.
pub fn format_duration(secs: f64) -> String {
    let total = secs.round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
