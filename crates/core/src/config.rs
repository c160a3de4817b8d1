//! Experiment configuration via `clir.toml`
//!
//! One file describes an experiment: the fusion weight and method, metric
//! cutoffs, the missing-topic policy for evaluation and the translation error
//! policy. Every field has a default, so an empty file is a valid config.
//! Command-line flags override whatever the file says.

use crate::error::{ClirError, ClirResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "clir.toml";

// ============================================================================
// Policy enums
// ============================================================================

/// Score fusion method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionMethod {
    /// `alpha * norm_a + (1 - alpha) * norm_b`
    #[default]
    Linear,
    /// Reciprocal rank fusion, ignores scores
    Rrf,
}

/// What the evaluator does with judged topics that a run never retrieved for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTopicPolicy {
    /// Leave them out of the mean (denominator = topics scored)
    #[default]
    Skip,
    /// Score them 0.0 on every metric (denominator = all judged topics)
    Zero,
}

/// What a translation wrapper does when the translator fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslateErrorPolicy {
    /// Log and reuse the untranslated text
    #[default]
    KeepOriginal,
    /// Propagate the failure
    Fail,
}

macro_rules! policy_str {
    ($ty:ty, $($variant:path => $name:literal),+ $(,)?) => {
        impl $ty {
            /// Name as written in `clir.toml` and on the command line
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ClirError;

            fn from_str(s: &str) -> ClirResult<Self> {
                match s.to_ascii_lowercase().as_str() {
                    $($name => Ok($variant),)+
                    other => Err(ClirError::InvalidConfig(format!(
                        "unknown {} '{}', expected one of: {}",
                        stringify!($ty),
                        other,
                        [$($name),+].join(", ")
                    ))),
                }
            }
        }
    };
}

policy_str!(FusionMethod, FusionMethod::Linear => "linear", FusionMethod::Rrf => "rrf");
policy_str!(MissingTopicPolicy, MissingTopicPolicy::Skip => "skip", MissingTopicPolicy::Zero => "zero");
policy_str!(
    TranslateErrorPolicy,
    TranslateErrorPolicy::KeepOriginal => "keep_original",
    TranslateErrorPolicy::Fail => "fail",
);

// ============================================================================
// Sections
// ============================================================================

/// `[fusion]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionSection {
    /// Weight of run A; run B gets `1 - alpha`
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Maximum fused list length per topic, 0 = no truncation
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Fusion method
    #[serde(default)]
    pub method: FusionMethod,
    /// RRF smoothing constant
    #[serde(default = "default_rrf_k")]
    pub rrf_k: u32,
    /// Method tag written to fused run files
    #[serde(default = "default_fused_tag")]
    pub tag: String,
}

fn default_alpha() -> f64 {
    0.7
}

fn default_top_k() -> usize {
    1000
}

fn default_rrf_k() -> u32 {
    60
}

fn default_fused_tag() -> String {
    "Hybrid".to_string()
}

impl FusionSection {
    /// Truncation limit, `None` when `top_k = 0`
    pub fn top_k(&self) -> Option<usize> {
        (self.top_k > 0).then_some(self.top_k)
    }
}

impl Default for FusionSection {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            top_k: default_top_k(),
            method: FusionMethod::default(),
            rrf_k: default_rrf_k(),
            tag: default_fused_tag(),
        }
    }
}

/// `[evaluation]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSection {
    /// Cutoff for Precision@k
    #[serde(default = "default_precision_k")]
    pub precision_k: usize,
    /// Cutoff for Recall@k
    #[serde(default = "default_recall_k")]
    pub recall_k: usize,
    /// Cutoffs for NDCG@k
    #[serde(default = "default_ndcg_k")]
    pub ndcg_k: Vec<usize>,
    /// Treatment of judged topics with no retrieved results
    #[serde(default)]
    pub missing_topics: MissingTopicPolicy,
}

fn default_precision_k() -> usize {
    5
}

fn default_recall_k() -> usize {
    1000
}

fn default_ndcg_k() -> Vec<usize> {
    vec![5, 100]
}

impl Default for EvaluationSection {
    fn default() -> Self {
        Self {
            precision_k: default_precision_k(),
            recall_k: default_recall_k(),
            ndcg_k: default_ndcg_k(),
            missing_topics: MissingTopicPolicy::default(),
        }
    }
}

/// `[translation]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationSection {
    /// Behaviour when the translator fails
    #[serde(default)]
    pub on_error: TranslateErrorPolicy,
}

// ============================================================================
// ExperimentConfig
// ============================================================================

/// Experiment configuration loaded from `clir.toml`.
///
/// # Example
///
/// ```toml
/// strict_parsing = false
///
/// [fusion]
/// alpha = 0.7
/// top_k = 1000
///
/// [evaluation]
/// ndcg_k = [5, 100]
/// missing_topics = "skip"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Fail on the first malformed input line instead of skipping it
    #[serde(default)]
    pub strict_parsing: bool,
    /// Fusion settings
    #[serde(default)]
    pub fusion: FusionSection,
    /// Evaluation settings
    #[serde(default)]
    pub evaluation: EvaluationSection,
    /// Translation settings
    #[serde(default)]
    pub translation: TranslationSection,
}

impl ExperimentConfig {
    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// `InvalidWeight` for an alpha outside `[0, 1]`; `InvalidConfig` for a
    /// zero cutoff or zero `rrf_k`.
    pub fn validate(&self) -> ClirResult<()> {
        let alpha = self.fusion.alpha;
        if !(0.0..=1.0).contains(&alpha) {
            return Err(ClirError::InvalidWeight { alpha });
        }
        if self.fusion.rrf_k == 0 {
            return Err(ClirError::InvalidConfig("fusion.rrf_k must be at least 1".into()));
        }
        let eval = &self.evaluation;
        if eval.precision_k == 0 || eval.recall_k == 0 || eval.ndcg_k.contains(&0) {
            return Err(ClirError::InvalidConfig(
                "evaluation cutoffs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# CLIR experiment configuration
#
# Fail on the first malformed run/qrel line instead of logging and skipping it.
strict_parsing = false

[fusion]
# Weight of the first (lexical) run; the second (dense) run gets 1 - alpha.
alpha = 0.7
# Keep at most this many fused documents per topic. 0 = no limit.
top_k = 1000
# "linear" (min-max normalize, weighted sum) or "rrf" (reciprocal rank fusion)
method = "linear"
# Smoothing constant for "rrf"
rrf_k = 60
# Method tag written in the last column of the fused run file
tag = "Hybrid"

[evaluation]
precision_k = 5
recall_k = 1000
ndcg_k = [5, 100]
# Judged topics the run retrieved nothing for:
#   "skip" = leave out of the mean
#   "zero" = count as 0.0 on every metric
missing_topics = "skip"

[translation]
# When query translation fails: "keep_original" or "fail"
on_error = "keep_original"
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> ClirResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClirError::InvalidConfig(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_toml_str(&content).map_err(|e| match e {
            ClirError::InvalidConfig(msg) => ClirError::InvalidConfig(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                msg
            )),
            other => other,
        })?;
        Ok(config)
    }

    /// Parse and validate config text
    pub fn from_toml_str(content: &str) -> ClirResult<Self> {
        let config: ExperimentConfig =
            toml::from_str(content).map_err(|e| ClirError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `true` if a file was created.
    pub fn write_default_if_missing(path: &Path) -> ClirResult<bool> {
        if path.exists() {
            return Ok(false);
        }
        std::fs::write(path, Self::default_toml())?;
        Ok(true)
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> ClirResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ClirError::InvalidConfig(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
