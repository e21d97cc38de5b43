//! Label taxonomy and the nested prediction report returned by `/predict`.
//!
//! Wire names keep the classifier's original spelling (`"PARTIAL TRUE"`),
//! so the report is directly comparable with offline evaluation dumps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fine-grained 6-way label set, in the classifier's output order.
///
/// Variant order is load-bearing: candidate selection in the gating cascade
/// breaks ties by first-listed-wins, which falls out of iterating `ALL` (and
/// the candidate slices) in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Fine6Label {
    #[serde(rename = "TRUE")]
    True,
    #[serde(rename = "FALSE")]
    False,
    #[serde(rename = "PARTIAL TRUE")]
    PartialTrue,
    #[serde(rename = "MISLEADING")]
    Misleading,
    #[serde(rename = "PROPAGANDA")]
    Propaganda,
    #[serde(rename = "SATIRE")]
    Satire,
}

impl Fine6Label {
    pub const ALL: [Fine6Label; 6] = [
        Fine6Label::True,
        Fine6Label::False,
        Fine6Label::PartialTrue,
        Fine6Label::Misleading,
        Fine6Label::Propaganda,
        Fine6Label::Satire,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Fine6Label::True => "TRUE",
            Fine6Label::False => "FALSE",
            Fine6Label::PartialTrue => "PARTIAL TRUE",
            Fine6Label::Misleading => "MISLEADING",
            Fine6Label::Propaganda => "PROPAGANDA",
            Fine6Label::Satire => "SATIRE",
        }
    }
}

/// Binary verdict thresholded from the fusion probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BinaryLabel {
    True,
    False,
}

/// Final output label after gating: the six fine-grained labels plus
/// INCONCLUSIVE for distrusted signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatedLabel {
    #[serde(rename = "TRUE")]
    True,
    #[serde(rename = "FALSE")]
    False,
    #[serde(rename = "PARTIAL TRUE")]
    PartialTrue,
    #[serde(rename = "MISLEADING")]
    Misleading,
    #[serde(rename = "PROPAGANDA")]
    Propaganda,
    #[serde(rename = "SATIRE")]
    Satire,
    #[serde(rename = "INCONCLUSIVE")]
    Inconclusive,
}

impl GatedLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            GatedLabel::True => "TRUE",
            GatedLabel::False => "FALSE",
            GatedLabel::PartialTrue => "PARTIAL TRUE",
            GatedLabel::Misleading => "MISLEADING",
            GatedLabel::Propaganda => "PROPAGANDA",
            GatedLabel::Satire => "SATIRE",
            GatedLabel::Inconclusive => "INCONCLUSIVE",
        }
    }
}

impl From<Fine6Label> for GatedLabel {
    fn from(l: Fine6Label) -> Self {
        match l {
            Fine6Label::True => GatedLabel::True,
            Fine6Label::False => GatedLabel::False,
            Fine6Label::PartialTrue => GatedLabel::PartialTrue,
            Fine6Label::Misleading => GatedLabel::Misleading,
            Fine6Label::Propaganda => GatedLabel::Propaganda,
            Fine6Label::Satire => GatedLabel::Satire,
        }
    }
}

/// Echo of the request after composition, for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEcho {
    pub text_len: usize,
    pub source_url: String,
    pub source_domain: String,
}

/// Raw component signals before fusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentOutputs {
    pub p_clickbait: f64,
    pub p_true_content: f64,
    pub source_score: f64,
    pub p_true_source: f64,
    pub source_evidence: String,
}

/// Fusion stage output. `features` is the exact vector fed to the fusion
/// scorer, or `{"neutral_override": true}` when the short-circuit fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionReport {
    pub final_p_true: f64,
    pub threshold: f64,
    pub binary_label: BinaryLabel,
    pub features: serde_json::Value,
}

/// Fine-grained stage output. `fine6_label` may be overridden to
/// INCONCLUSIVE on low confidence; `raw_fine6_label` keeps the arg-max.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fine6Report {
    pub fine6_label: GatedLabel,
    pub raw_fine6_label: Fine6Label,
    pub top_prob: f64,
    pub probs: BTreeMap<Fine6Label, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatedReport {
    pub gated_label: GatedLabel,
}

/// Complete response of a single prediction, with provenance for every
/// intermediate signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub input: InputEcho,
    pub component_outputs: ComponentOutputs,
    pub fusion: FusionReport,
    pub fine6: Fine6Report,
    pub gated: GatedReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn labels_serialize_with_original_spelling() {
        assert_eq!(
            serde_json::to_value(Fine6Label::PartialTrue).unwrap(),
            json!("PARTIAL TRUE")
        );
        assert_eq!(
            serde_json::to_value(GatedLabel::Inconclusive).unwrap(),
            json!("INCONCLUSIVE")
        );
        assert_eq!(serde_json::to_value(BinaryLabel::False).unwrap(), json!("FALSE"));
    }

    #[test]
    fn report_shape_matches_contract() {
        let report = PredictionReport {
            input: InputEcho {
                text_len: 42,
                source_url: "https://example.com/a".into(),
                source_domain: "example.com".into(),
            },
            component_outputs: ComponentOutputs {
                p_clickbait: 0.1,
                p_true_content: 0.8,
                source_score: 0.5,
                p_true_source: 0.7,
                source_evidence: "default".into(),
            },
            fusion: FusionReport {
                final_p_true: 0.82,
                threshold: 0.5,
                binary_label: BinaryLabel::True,
                features: json!({"text_len": 42.0}),
            },
            fine6: Fine6Report {
                fine6_label: GatedLabel::True,
                raw_fine6_label: Fine6Label::True,
                top_prob: 0.9,
                probs: [(Fine6Label::True, 0.9), (Fine6Label::False, 0.1)]
                    .into_iter()
                    .collect(),
            },
            gated: GatedReport {
                gated_label: GatedLabel::True,
            },
        };

        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["input"]["text_len"], json!(42));
        assert_eq!(v["fusion"]["binary_label"], json!("TRUE"));
        assert_eq!(v["fine6"]["probs"]["TRUE"], json!(0.9));
        assert_eq!(v["gated"]["gated_label"], json!("TRUE"));
    }
}
