//! Fusion scorer: a calibrated logistic combination of the component
//! signals into one truth probability, thresholded into a binary label.
//!
//! Artifacts (JSON, produced by the training job):
//! - `fusion_lr.json` — `{"features": {name: coefficient}, "intercept": f}`;
//!   required, missing file is fatal.
//! - `fusion_threshold.json` — `{"threshold": f}` (legacy key
//!   `best_threshold` accepted); optional, default 0.5.
//! - `fusion_feature_schema.json` — `{"features": [name, ...]}`; optional,
//!   defaults to the five-feature vector below.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::error::LoadError;
use crate::verdict::BinaryLabel;

/// Clamp bound for the log-odds transform.
pub const LOGIT_EPS: f64 = 1e-6;

pub const DEFAULT_THRESHOLD: f64 = 0.5;

pub const DEFAULT_FEATURES: [&str; 5] = [
    "logit_p_true_content",
    "logit_p_not_clickbait",
    "source_score",
    "text_len",
    "has_source",
];

/// Clamp a probability into `[ε, 1-ε]` so the logit stays finite.
pub fn clamp_prob(p: f64) -> f64 {
    p.clamp(LOGIT_EPS, 1.0 - LOGIT_EPS)
}

/// Log-odds with boundary clamping; never returns an infinity.
pub fn logit(p: f64) -> f64 {
    let p = clamp_prob(p);
    (p / (1.0 - p)).ln()
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Raw signals the engine hands to the fusion scorer.
#[derive(Debug, Clone)]
pub struct FusionInputs {
    pub p_true_content: f64,
    pub p_clickbait: f64,
    pub source_score: f64,
    pub text_len: usize,
    pub has_source: bool,
}

/// Fusion output, including the exact feature vector for auditability.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionResult {
    pub final_p_true: f64,
    pub threshold: f64,
    pub binary_label: BinaryLabel,
    pub features: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct ModelFile {
    features: HashMap<String, f64>,
    #[serde(default)]
    intercept: f64,
}

#[derive(Debug, Deserialize)]
struct ThresholdFile {
    threshold: Option<f64>,
    best_threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    features: Vec<String>,
}

#[derive(Debug)]
pub struct FusionScorer {
    coefficients: HashMap<String, f64>,
    intercept: f64,
    pub threshold: f64,
    features: Vec<String>,
}

impl FusionScorer {
    pub fn load(
        model_path: &Path,
        threshold_path: &Path,
        feature_schema_path: &Path,
    ) -> Result<Self, LoadError> {
        if !model_path.exists() {
            return Err(LoadError::MissingFusionModel {
                path: model_path.to_path_buf(),
            });
        }

        let model: ModelFile = read_json(model_path)?;

        let threshold = if threshold_path.exists() {
            let t: ThresholdFile = read_json(threshold_path)?;
            t.threshold.or(t.best_threshold).unwrap_or(DEFAULT_THRESHOLD)
        } else {
            DEFAULT_THRESHOLD
        };

        let features = if feature_schema_path.exists() {
            let s: SchemaFile = read_json(feature_schema_path)?;
            if s.features.is_empty() {
                default_features()
            } else {
                s.features
            }
        } else {
            default_features()
        };

        Ok(Self {
            coefficients: model.features,
            intercept: model.intercept,
            threshold,
            features,
        })
    }

    /// Build-for-tests constructor with explicit parameters.
    pub fn from_parts(
        coefficients: HashMap<String, f64>,
        intercept: f64,
        threshold: f64,
    ) -> Self {
        Self {
            coefficients,
            intercept,
            threshold,
            features: default_features(),
        }
    }

    pub fn predict(&self, inp: &FusionInputs) -> FusionResult {
        let mut feat = BTreeMap::new();
        feat.insert("logit_p_true_content".to_string(), logit(inp.p_true_content));
        feat.insert(
            "logit_p_not_clickbait".to_string(),
            logit(1.0 - inp.p_clickbait),
        );
        feat.insert("source_score".to_string(), inp.source_score);
        feat.insert("text_len".to_string(), inp.text_len as f64);
        feat.insert(
            "has_source".to_string(),
            if inp.has_source { 1.0 } else { 0.0 },
        );

        let mut z = self.intercept;
        for name in &self.features {
            let x = feat.get(name).copied().unwrap_or(0.0);
            let w = self.coefficients.get(name).copied().unwrap_or(0.0);
            z += w * x;
        }

        let p = sigmoid(z);
        let binary_label = if p >= self.threshold {
            BinaryLabel::True
        } else {
            BinaryLabel::False
        };

        FusionResult {
            final_p_true: p,
            threshold: self.threshold,
            binary_label,
            features: feat,
        }
    }
}

fn default_features() -> Vec<String> {
    DEFAULT_FEATURES.iter().map(|s| s.to_string()).collect()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> FusionInputs {
        FusionInputs {
            p_true_content: 0.8,
            p_clickbait: 0.2,
            source_score: 0.5,
            text_len: 100,
            has_source: true,
        }
    }

    #[test]
    fn logit_of_half_is_zero() {
        assert!(logit(0.5).abs() < 1e-12);
    }

    #[test]
    fn logit_is_finite_at_boundaries() {
        let lo = logit(0.0);
        let hi = logit(1.0);
        assert!(lo.is_finite() && hi.is_finite());
        assert!(lo < -10.0 && hi > 10.0);
        assert!((lo + hi).abs() < 1e-9); // symmetric clamp
    }

    #[test]
    fn zero_model_scores_half_and_labels_true_at_default_threshold() {
        let scorer = FusionScorer::from_parts(HashMap::new(), 0.0, DEFAULT_THRESHOLD);
        let out = scorer.predict(&inputs());
        assert!((out.final_p_true - 0.5).abs() < 1e-12);
        assert_eq!(out.binary_label, BinaryLabel::True); // p >= threshold
    }

    #[test]
    fn negative_intercept_labels_false() {
        let scorer = FusionScorer::from_parts(HashMap::new(), -2.0, DEFAULT_THRESHOLD);
        let out = scorer.predict(&inputs());
        assert!(out.final_p_true < 0.2);
        assert_eq!(out.binary_label, BinaryLabel::False);
    }

    #[test]
    fn feature_vector_is_complete_and_audit_ready() {
        let scorer = FusionScorer::from_parts(HashMap::new(), 0.0, DEFAULT_THRESHOLD);
        let out = scorer.predict(&inputs());
        for name in DEFAULT_FEATURES {
            assert!(out.features.contains_key(name), "missing feature {name}");
        }
        assert!((out.features["text_len"] - 100.0).abs() < 1e-12);
        assert!((out.features["has_source"] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn coefficients_shift_the_probability() {
        let coeffs: HashMap<String, f64> =
            [("source_score".to_string(), 4.0)].into_iter().collect();
        let scorer = FusionScorer::from_parts(coeffs, 0.0, DEFAULT_THRESHOLD);
        let out = scorer.predict(&inputs());
        assert!(out.final_p_true > 0.8);
        assert_eq!(out.binary_label, BinaryLabel::True);
    }
}
