//! Runtime configuration.
//!
//! Thresholds and artifact locations come from the environment with the
//! documented defaults; domain lists come from a TOML file with a built-in
//! seed fallback so the engine is testable with alternate lists.

use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domains::normalize_domain;

// --- env names & defaults ---
pub const ENV_ARTIFACTS_DIR: &str = "ARTIFACTS_DIR";
pub const ENV_DOMAIN_LISTS_PATH: &str = "DOMAIN_LISTS_PATH";
pub const DEFAULT_DOMAIN_LISTS_PATH: &str = "config/domains.toml";

pub const DEFAULT_INCONCLUSIVE_MIN_TOP_PROB: f64 = 0.45;
pub const DEFAULT_NEUTRAL_MAX_TEXT_LEN: usize = 120;
pub const DEFAULT_NEUTRAL_CONTENT_MAX_P_TRUE: f64 = 0.05;
pub const DEFAULT_HIGH_TRUST_MIN_P_TRUE: f64 = 0.80;

/// Which scorer implementations to build at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScorerMode {
    /// HTTP calls against the configured inference endpoints.
    #[default]
    Remote,
    /// Deterministic stub scorers (tests, local runs without models).
    Mock,
}

#[derive(Debug, Clone, Default)]
pub struct ScorerConfig {
    pub mode: ScorerMode,
    pub clickbait_url: Option<String>,
    pub veracity_url: Option<String>,
    pub fine6_url: Option<String>,
}

impl ScorerConfig {
    pub fn from_env() -> Self {
        let mode = match env::var("SCORER_MODE").unwrap_or_default().trim() {
            "mock" => ScorerMode::Mock,
            _ => ScorerMode::Remote,
        };
        Self {
            mode,
            clickbait_url: env_nonempty("CLICKBAIT_SCORER_URL"),
            veracity_url: env_nonempty("VERACITY_SCORER_URL"),
            fine6_url: env_nonempty("FINE6_SCORER_URL"),
        }
    }
}

/// Immutable pipeline configuration, passed into the decision engine at
/// construction rather than read as ambient globals.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub artifacts_dir: PathBuf,
    pub inconclusive_min_top_prob: f64,
    pub neutral_max_text_len: usize,
    pub neutral_content_max_p_true: f64,
    pub high_trust_min_p_true: f64,
    pub platform_neutral: bool,
    pub scorers: ScorerConfig,
    pub domains: DomainLists,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from("artifacts"),
            inconclusive_min_top_prob: DEFAULT_INCONCLUSIVE_MIN_TOP_PROB,
            neutral_max_text_len: DEFAULT_NEUTRAL_MAX_TEXT_LEN,
            neutral_content_max_p_true: DEFAULT_NEUTRAL_CONTENT_MAX_P_TRUE,
            high_trust_min_p_true: DEFAULT_HIGH_TRUST_MIN_P_TRUE,
            platform_neutral: true,
            scorers: ScorerConfig::default(),
            domains: DomainLists::default_seed(),
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let domain_lists_path = env::var(ENV_DOMAIN_LISTS_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DOMAIN_LISTS_PATH));

        Self {
            artifacts_dir: env::var(ENV_ARTIFACTS_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("artifacts")),
            inconclusive_min_top_prob: env_f64(
                "INCONCLUSIVE_MIN_TOP_PROB",
                DEFAULT_INCONCLUSIVE_MIN_TOP_PROB,
            ),
            neutral_max_text_len: env_usize("NEUTRAL_MAX_TEXT_LEN", DEFAULT_NEUTRAL_MAX_TEXT_LEN),
            neutral_content_max_p_true: env_f64(
                "NEUTRAL_CONTENT_MAX_P_TRUE",
                DEFAULT_NEUTRAL_CONTENT_MAX_P_TRUE,
            ),
            high_trust_min_p_true: env_f64("HIGH_TRUST_MIN_P_TRUE", DEFAULT_HIGH_TRUST_MIN_P_TRUE),
            platform_neutral: env_bool("PLATFORM_NEUTRAL", true),
            scorers: ScorerConfig::from_env(),
            domains: DomainLists::load_from_file(&domain_lists_path),
        }
    }

    // Artifact layout mirrors the training pipeline's output tree.
    pub fn fusion_model_path(&self) -> PathBuf {
        self.artifacts_dir.join("fusion").join("fusion_lr.json")
    }
    pub fn fusion_threshold_path(&self) -> PathBuf {
        self.artifacts_dir.join("fusion").join("fusion_threshold.json")
    }
    pub fn fusion_feature_schema_path(&self) -> PathBuf {
        self.artifacts_dir
            .join("fusion")
            .join("fusion_feature_schema.json")
    }
    pub fn source_table_path(&self) -> PathBuf {
        self.artifacts_dir
            .join("source_veracity")
            .join("source_veracity_table.csv")
    }
}

/// Static domain sets: social platforms (reputation-neutral), satire and
/// propaganda outlets (gating evidence), plus a high-trust list kept for
/// operator reference only — the engine reads trust from the prior table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomainLists {
    #[serde(default)]
    pub platform: HashSet<String>,
    #[serde(default)]
    pub high_trust: HashSet<String>,
    #[serde(default)]
    pub satire: HashSet<String>,
    #[serde(default)]
    pub propaganda: HashSet<String>,
}

impl DomainLists {
    /// Load from TOML; falls back to `default_seed()` when the file is
    /// missing or unparsable. Entries are normalized on load.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let lists = match fs::read_to_string(path.as_ref()) {
            Ok(s) => toml::from_str(&s).unwrap_or_else(|_| Self::default_seed()),
            Err(_) => Self::default_seed(),
        };
        lists.normalized()
    }

    fn normalized(self) -> Self {
        fn norm(set: HashSet<String>) -> HashSet<String> {
            set.iter()
                .map(|d| normalize_domain(d))
                .filter(|d| !d.is_empty())
                .collect()
        }
        Self {
            platform: norm(self.platform),
            high_trust: norm(self.high_trust),
            satire: norm(self.satire),
            propaganda: norm(self.propaganda),
        }
    }

    /// Built-in seed covering the major platforms and the known satire and
    /// propaganda outlets for the Romanian media space.
    pub fn default_seed() -> Self {
        fn set(items: &[&str]) -> HashSet<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            platform: set(&[
                "facebook.com",
                "m.facebook.com",
                "instagram.com",
                "whatsapp.com",
                "wa.me",
                "youtube.com",
                "youtu.be",
                "tiktok.com",
                "rumble.com",
                "bitchute.com",
                "odysee.com",
                "twitter.com",
                "x.com",
                "reddit.com",
                "telegram.org",
                "t.me",
                "discord.com",
                "discord.gg",
                "vk.com",
                "ok.ru",
                "medium.com",
                "substack.com",
                "wordpress.com",
                "blogspot.com",
                "tumblr.com",
                "quora.com",
            ]),
            high_trust: set(&[
                "gov.ro",
                "agerpres.ro",
                "mapn.ro",
                "mai.gov.ro",
                "ms.ro",
                "europa.eu",
                "ec.europa.eu",
                "ema.europa.eu",
                "ecdc.europa.eu",
                "consilium.europa.eu",
                "who.int",
                "cdc.gov",
                "nih.gov",
                "fda.gov",
                "nhs.uk",
                "un.org",
                "nato.int",
                "worldbank.org",
                "imf.org",
                "oecd.org",
                "gov.uk",
                "usa.gov",
                "canada.ca",
                "gouv.fr",
                "bund.de",
                "veridica.ro",
                "factcheck.org",
                "politifact.com",
                "snopes.com",
                "reuters.com",
                "apnews.com",
            ]),
            satire: set(&[
                "timesnewroman.ro",
                "catavencii.ro",
                "academiacatavencu.com",
                "kamikazeonline.ro",
                "theonion.com",
                "babylonbee.com",
                "thedailymash.co.uk",
                "waterfordwhispersnews.com",
                "thebeaverton.com",
                "clickhole.com",
            ]),
            propaganda: set(&[
                "activenews.ro",
                "national.ro",
                "flux24.ro",
                "solidnews.ro",
                "ortodoxinfo.ro",
                "stiripesurse.ro",
                "r3media.ro",
                "sputniknews.com",
                "ria.ru",
                "tass.ru",
                "rt.com",
                "pravda.ru",
                "news-pravda.com",
                "topwar.ru",
                "infowars.com",
                "globalresearch.ca",
                "naturalnews.com",
                "newspunch.com",
                "beforeitsnews.com",
                "oann.com",
                "theepochtimes.com",
                "breitbart.com",
            ]),
        }
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    env::var(name).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn env_f64(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_bool(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => matches!(v.trim(), "1" | "true" | "TRUE" | "yes"),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_lists_are_populated_and_disjoint_where_expected() {
        let d = DomainLists::default_seed();
        assert!(d.platform.contains("facebook.com"));
        assert!(d.satire.contains("theonion.com"));
        assert!(d.propaganda.contains("sputniknews.com"));
        assert!(d.satire.is_disjoint(&d.propaganda));
    }

    #[test]
    fn load_from_missing_file_falls_back_to_seed() {
        let d = DomainLists::load_from_file("definitely/not/here.toml");
        assert!(d.platform.contains("x.com"));
    }

    #[test]
    fn toml_entries_are_normalized() {
        let raw = r#"
            platform = ["WWW.Example.COM", "  x.com "]
            satire = ["TheOnion.com"]
        "#;
        let lists: DomainLists = toml::from_str(raw).unwrap();
        let lists = lists.normalized();
        assert!(lists.platform.contains("example.com"));
        assert!(lists.platform.contains("x.com"));
        assert!(lists.satire.contains("theonion.com"));
        assert!(lists.propaganda.is_empty());
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = PipelineConfig::default();
        assert!((cfg.inconclusive_min_top_prob - 0.45).abs() < 1e-12);
        assert_eq!(cfg.neutral_max_text_len, 120);
        assert!((cfg.neutral_content_max_p_true - 0.05).abs() < 1e-12);
        assert!((cfg.high_trust_min_p_true - 0.80).abs() < 1e-12);
        assert!(cfg.platform_neutral);
    }
}
