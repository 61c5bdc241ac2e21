use std::cmp::Ordering;

use serde::Serialize;
use thiserror::Error;

use crate::features::{FeatureVector, Weights};

#[derive(Error, Debug, PartialEq)]
pub enum RankError {
    #[error("Cannot rank against an empty track catalog")]
    EmptyCandidateSet,
}

/// One candidate's position in a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ranked {
    /// Row index into the candidate slice that was ranked.
    pub index: usize,
    /// Weighted cosine similarity in [-1, 1].
    pub score: f64,
}

/// Rank every candidate by weighted cosine similarity to `query`.
///
/// Both the query and each candidate are scaled elementwise by `weights` before the cosine
/// is taken, so a weight changes an axis' share of the dot product and of both norms.
/// Returns all N candidates, highest score first; equal scores keep ascending index order.
pub fn rank(
    query: &FeatureVector,
    weights: &Weights,
    candidates: &[FeatureVector],
) -> Result<Vec<Ranked>, RankError> {
    if candidates.is_empty() {
        return Err(RankError::EmptyCandidateSet);
    }

    let q = query.weighted(weights);
    let mut ranking: Vec<Ranked> = candidates
        .iter()
        .enumerate()
        .map(|(index, c)| Ranked {
            index,
            score: cosine_similarity(&q, &c.weighted(weights)),
        })
        .collect();

    ranking.sort_by(by_score_desc);
    Ok(ranking)
}

/// Weighted cosine similarity between two feature vectors.
pub fn weighted_cosine(a: &FeatureVector, b: &FeatureVector, weights: &Weights) -> f64 {
    cosine_similarity(&a.weighted(weights), &b.weighted(weights))
}

fn by_score_desc(a: &Ranked, b: &Ranked) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then(a.index.cmp(&b.index))
}

/// Cosine similarity between two vectors. A zero-norm side yields 0.0.
///
/// Each side is divided by its largest magnitude first, so sums of squares stay in range
/// for very large or very small components.
fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let scale_a = max_abs(a);
    let scale_b = max_abs(b);
    // Overflowed weighting counts as undefined, same as a zero vector
    if scale_a == 0.0 || scale_b == 0.0 || !scale_a.is_finite() || !scale_b.is_finite() {
        return 0.0;
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;

    for i in 0..a.len() {
        let x = a[i] / scale_a;
        let y = b[i] / scale_b;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0_f64, |m, x| m.max(x.abs()))
}
