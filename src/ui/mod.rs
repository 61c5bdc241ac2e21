//! Terminal presentation: recipe selection, weight sliders and result rendering.
//!
//! There is one code path for both selection styles; `SelectionStyle` only changes how the
//! recipe list is drawn.

pub mod asset;
pub mod session;

use std::io::Write;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::features::{Axis, Weights};
use crate::recommend::{Recommendation, resolve_asset_path};
use crate::store::models::RecipeRecord;
use asset::AssetStatus;

/// Slider range and step for each weight.
pub const WEIGHT_MIN: f64 = 0.0;
pub const WEIGHT_MAX: f64 = 2.0;
pub const WEIGHT_STEP: f64 = 0.1;
const STEPS_PER_UNIT: f64 = 10.0;

/// Gallery cards per row.
const GALLERY_COLUMNS: usize = 5;
const CARD_WIDTH: usize = 22;

#[derive(Error, Debug, PartialEq)]
pub enum UiError {
    #[error("Weight {0} is outside 0.0..=2.0")]
    WeightOutOfRange(f64),
}

/// How the recipe list is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SelectionStyle {
    /// Numbered list, one recipe per line
    #[default]
    Dropdown,
    /// Image cards in rows, followed by a radio list
    Gallery,
}

/// Validate a slider value and snap it to the 0.1 step.
pub fn snap_weight(value: f64) -> Result<f64, UiError> {
    if !value.is_finite() || !(WEIGHT_MIN..=WEIGHT_MAX).contains(&value) {
        return Err(UiError::WeightOutOfRange(value));
    }
    Ok((value * STEPS_PER_UNIT).round() / STEPS_PER_UNIT)
}

/// Truncate to `width` characters, marking the cut with "...".
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}

/// Resolved image for a recipe, or a note when it can't be shown.
fn image_label(image_dir: &Path, recipe: &RecipeRecord) -> String {
    match resolve_asset_path(image_dir, &recipe.image_path) {
        Some(p) if p.is_file() => p.display().to_string(),
        Some(p) => format!("[missing] {}", p.display()),
        None => "(no image)".to_string(),
    }
}

/// Draw the recipe picker, marking `selected`.
pub fn render_selector<W: Write>(
    out: &mut W,
    recipes: &[RecipeRecord],
    image_dir: &Path,
    style: SelectionStyle,
    selected: usize,
) -> std::io::Result<()> {
    writeln!(out, "Choose a recipe:")?;
    match style {
        SelectionStyle::Dropdown => {
            for (i, recipe) in recipes.iter().enumerate() {
                let marker = if i == selected { '>' } else { ' ' };
                writeln!(out, "  {} {:>2}. {}", marker, i + 1, recipe.name)?;
            }
            if let Some(recipe) = recipes.get(selected) {
                writeln!(out)?;
                writeln!(out, "  {}: {}", recipe.name, image_label(image_dir, recipe))?;
            }
        }
        SelectionStyle::Gallery => {
            for row in recipes.chunks(GALLERY_COLUMNS) {
                let names: Vec<String> = row
                    .iter()
                    .map(|r| format!("{:<w$}", truncate(&r.name, CARD_WIDTH), w = CARD_WIDTH))
                    .collect();
                let images: Vec<String> = row
                    .iter()
                    .map(|r| {
                        let label = image_label(image_dir, r);
                        format!("{:<w$}", truncate(&label, CARD_WIDTH), w = CARD_WIDTH)
                    })
                    .collect();
                writeln!(out, "  {}", names.join(" ").trim_end())?;
                writeln!(out, "  {}", images.join(" ").trim_end())?;
                writeln!(out)?;
            }
            for (i, recipe) in recipes.iter().enumerate() {
                let radio = if i == selected { "(*)" } else { "( )" };
                writeln!(out, "  {} {:>2}. {}", radio, i + 1, recipe.name)?;
            }
        }
    }
    Ok(())
}

/// Print current weight for every axis.
pub fn render_weights<W: Write>(out: &mut W, weights: &Weights) -> std::io::Result<()> {
    writeln!(out, "Feature weights ({:.1}-{:.1}):", WEIGHT_MIN, WEIGHT_MAX)?;
    for axis in Axis::ALL {
        let value = weights.get(axis);
        let filled = (value / WEIGHT_STEP).round() as usize;
        let total = (WEIGHT_MAX / WEIGHT_STEP).round() as usize;
        writeln!(
            out,
            "  {:<11} [{}{}] {:.1}",
            axis.label(),
            "=".repeat(filled.min(total)),
            "-".repeat(total.saturating_sub(filled)),
            value
        )?;
    }
    Ok(())
}

/// Print recommendations with asset availability. Missing files produce a warning line
/// but never stop the listing.
pub fn render_recommendations<W: Write>(
    out: &mut W,
    recipe: &str,
    recs: &[Recommendation<'_>],
) -> std::io::Result<()> {
    writeln!(out, "Recommended tracks for \"{}\":", recipe)?;
    for rec in recs {
        writeln!(
            out,
            "  ♪ {} (Similarity: {})",
            rec.track.name,
            rec.display_similarity()
        )?;
        match &rec.audio_path {
            Some(path) => match asset::probe_audio(path) {
                AssetStatus::Playable { duration_secs: Some(secs) } => {
                    writeln!(out, "      {} [{}]", path.display(), asset::format_duration(secs))?;
                }
                AssetStatus::Playable { duration_secs: None } => {
                    writeln!(out, "      {}", path.display())?;
                }
                AssetStatus::Missing => {
                    log::warn!("Audio file not found: {}", path.display());
                    writeln!(out, "      warning: audio file not found: {}", path.display())?;
                }
            },
            None => {
                log::warn!("No playable file name in \"{}\"", rec.track.audio_path);
                writeln!(
                    out,
                    "      warning: no playable file for \"{}\"",
                    rec.track.audio_path
                )?;
            }
        }
    }
    Ok(())
}

/// Print recommendations as a JSON array.
pub fn render_json<W: Write>(out: &mut W, recs: &[Recommendation<'_>]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, recs)?;
    writeln!(out)?;
    Ok(())
}
