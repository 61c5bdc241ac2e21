use serde::Serialize;
use thiserror::Error;

use crate::FEATURE_AXES;

#[derive(Error, Debug, PartialEq)]
pub enum FeatureError {
    #[error("Expected {expected} feature components, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Invalid {axis} weight {value}: weights must be finite and non-negative")]
    InvalidWeight { axis: Axis, value: f64 },
    #[error("Non-finite {axis} feature value")]
    NonFinite { axis: Axis },
}

/// One semantic axis of the shared recipe/track feature space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Sentiment,
    Saturation,
    Brightness,
}

impl Axis {
    pub const ALL: [Axis; FEATURE_AXES] = [Axis::Sentiment, Axis::Saturation, Axis::Brightness];

    pub fn index(self) -> usize {
        match self {
            Self::Sentiment => 0,
            Self::Saturation => 1,
            Self::Brightness => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Sentiment => "sentiment",
            Self::Saturation => "saturation",
            Self::Brightness => "brightness",
        }
    }

    /// Parse an axis name, accepting unambiguous prefixes ("sent", "sat", "b").
    pub fn parse(name: &str) -> Option<Axis> {
        let n = name.trim().to_lowercase();
        if n.is_empty() {
            return None;
        }
        let mut matches = Self::ALL.iter().filter(|a| a.label().starts_with(&n));
        match (matches.next(), matches.next()) {
            (Some(a), None) => Some(*a),
            _ => None,
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A (sentiment, saturation, brightness) triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector(pub [f64; FEATURE_AXES]);

impl FeatureVector {
    pub fn new(sentiment: f64, saturation: f64, brightness: f64) -> Self {
        Self([sentiment, saturation, brightness])
    }

    /// Build from an arbitrary slice, rejecting wrong lengths and NaN/inf.
    pub fn from_slice(values: &[f64]) -> Result<Self, FeatureError> {
        let arr: [f64; FEATURE_AXES] =
            values.try_into().map_err(|_| FeatureError::DimensionMismatch {
                expected: FEATURE_AXES,
                actual: values.len(),
            })?;
        for axis in Axis::ALL {
            if !arr[axis.index()].is_finite() {
                return Err(FeatureError::NonFinite { axis });
            }
        }
        Ok(Self(arr))
    }

    pub fn get(&self, axis: Axis) -> f64 {
        self.0[axis.index()]
    }

    /// Elementwise product with a weight vector.
    pub fn weighted(&self, weights: &Weights) -> [f64; FEATURE_AXES] {
        let mut out = self.0;
        for (v, w) in out.iter_mut().zip(weights.0.iter()) {
            *v *= w;
        }
        out
    }

    /// Multiply every component by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self(self.0.map(|v| v * factor))
    }
}

/// Per-axis importance applied to both sides of the similarity.
///
/// Components are finite and non-negative; the interactive [0.0, 2.0] slider range is
/// enforced by the presentation layer, not here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Weights([f64; FEATURE_AXES]);

impl Weights {
    pub const UNIFORM: Weights = Weights([1.0; FEATURE_AXES]);

    pub fn new(sentiment: f64, saturation: f64, brightness: f64) -> Result<Self, FeatureError> {
        Self::from_array([sentiment, saturation, brightness])
    }

    pub fn from_array(values: [f64; FEATURE_AXES]) -> Result<Self, FeatureError> {
        for axis in Axis::ALL {
            let value = values[axis.index()];
            if !value.is_finite() || value < 0.0 {
                return Err(FeatureError::InvalidWeight { axis, value });
            }
        }
        Ok(Self(values))
    }

    pub fn from_slice(values: &[f64]) -> Result<Self, FeatureError> {
        let arr: [f64; FEATURE_AXES] =
            values.try_into().map_err(|_| FeatureError::DimensionMismatch {
                expected: FEATURE_AXES,
                actual: values.len(),
            })?;
        Self::from_array(arr)
    }

    pub fn get(&self, axis: Axis) -> f64 {
        self.0[axis.index()]
    }

    /// Copy with one axis replaced.
    pub fn with(&self, axis: Axis, value: f64) -> Result<Self, FeatureError> {
        let mut values = self.0;
        values[axis.index()] = value;
        Self::from_array(values)
    }

    pub fn as_array(&self) -> [f64; FEATURE_AXES] {
        self.0
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self::UNIFORM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_rejects_wrong_length() {
        assert_eq!(
            FeatureVector::from_slice(&[1.0, 2.0]),
            Err(FeatureError::DimensionMismatch { expected: 3, actual: 2 })
        );
        assert_eq!(
            FeatureVector::from_slice(&[1.0, 2.0, 3.0, 4.0]),
            Err(FeatureError::DimensionMismatch { expected: 3, actual: 4 })
        );
        assert!(FeatureVector::from_slice(&[0.5, 0.2, 0.9]).is_ok());
    }

    #[test]
    fn test_from_slice_rejects_nan() {
        assert_eq!(
            FeatureVector::from_slice(&[0.1, f64::NAN, 0.3]),
            Err(FeatureError::NonFinite { axis: Axis::Saturation })
        );
    }

    #[test]
    fn test_negative_weight_rejected() {
        let err = Weights::new(1.0, -0.1, 1.0).unwrap_err();
        assert!(matches!(err, FeatureError::InvalidWeight { axis: Axis::Saturation, .. }));
        assert!(Weights::new(f64::INFINITY, 1.0, 1.0).is_err());
        // Zero is a legal weight (axis switched off)
        assert!(Weights::new(0.0, 0.0, 2.0).is_ok());
    }

    #[test]
    fn test_weights_from_slice_dimension() {
        assert!(matches!(
            Weights::from_slice(&[1.0, 1.0]),
            Err(FeatureError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_weighted_product() {
        let v = FeatureVector::new(2.0, 3.0, 4.0);
        let w = Weights::new(0.5, 0.0, 2.0).unwrap();
        assert_eq!(v.weighted(&w), [1.0, 0.0, 8.0]);
    }

    #[test]
    fn test_axis_parse() {
        assert_eq!(Axis::parse("sentiment"), Some(Axis::Sentiment));
        assert_eq!(Axis::parse("Bright"), Some(Axis::Brightness));
        assert_eq!(Axis::parse("sat"), Some(Axis::Saturation));
        // "s" is ambiguous between sentiment and saturation
        assert_eq!(Axis::parse("s"), None);
        assert_eq!(Axis::parse("tempo"), None);
        assert_eq!(Axis::parse(""), None);
    }

    #[test]
    fn test_with_replaces_one_axis() {
        let w = Weights::UNIFORM.with(Axis::Brightness, 1.5).unwrap();
        assert_eq!(w.as_array(), [1.0, 1.0, 1.5]);
        assert!(Weights::UNIFORM.with(Axis::Sentiment, -1.0).is_err());
    }
}
