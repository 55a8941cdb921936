//! Entropy classification.
//!
//! A [`ThresholdLadder`] holds two ordered tier tables, one for the repository
//! root and one for every other directory. Tiers are consulted top-down and
//! the first whose lower bound is met wins; entropy below every bound falls
//! into the last tier.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::domain::{EntropyLevel, ROOT_DIR};
use crate::error::{BulkheadError, Result};
use crate::project::ProjectType;

const ROOT_HIGH: &str =
    "Root mixes many file types; consider refactoring loose files into dedicated directories";
const ROOT_MEDIUM: &str = "Mixed root is acceptable for configuration and tooling files";
const ROOT_LOW: &str = "Well organized root directory";
const DIR_CRITICAL: &str = "Urgent: refactor needed, directory mixes too many responsibilities";
const DIR_HIGH: &str = "Consider refactoring: split files by responsibility";
const DIR_MEDIUM: &str = "Monitor: directory is starting to mix file types";
const DIR_LOW: &str = "Well organized: clear single responsibility";

static STANDARD: LazyLock<ThresholdLadder> = LazyLock::new(ThresholdLadder::standard);

/// Level and hint assigned to a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Assigned level.
    pub level: EntropyLevel,
    /// Canned recommendation for the level.
    pub recommendation: String,
}

/// One rung of a threshold ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdTier {
    /// Inclusive lower bound in bits.
    pub min_entropy: f64,
    /// Level assigned when the bound is met.
    pub level: EntropyLevel,
    /// Recommendation attached to the level.
    pub recommendation: String,
}

impl ThresholdTier {
    fn new(min_entropy: f64, level: EntropyLevel, recommendation: &str) -> Self {
        Self {
            min_entropy,
            level,
            recommendation: recommendation.to_string(),
        }
    }
}

/// Absolute entropy thresholds for the root and for subdirectories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdLadder {
    /// Tiers applied to the `root` directory, highest bound first.
    pub root: Vec<ThresholdTier>,
    /// Tiers applied to every other directory, highest bound first.
    pub subdirectory: Vec<ThresholdTier>,
}

impl Default for ThresholdLadder {
    fn default() -> Self {
        Self::standard()
    }
}

impl ThresholdLadder {
    /// Default thresholds.
    ///
    /// Root: High from 3.0, Medium from 2.0. Subdirectories: Critical from
    /// 2.0, High from 1.5, Medium from 0.8.
    pub fn standard() -> Self {
        Self::with_bounds([3.0, 2.0], [2.0, 1.5, 0.8])
    }

    /// Tighter thresholds for repositories that keep directories single-purpose.
    ///
    /// Root: High from 2.0, Medium from 1.5. Subdirectories: Critical from
    /// 1.5, High from 1.0, Medium from 0.5.
    pub fn strict() -> Self {
        Self::with_bounds([2.0, 1.5], [1.5, 1.0, 0.5])
    }

    fn with_bounds(root: [f64; 2], subdirectory: [f64; 3]) -> Self {
        Self {
            root: vec![
                ThresholdTier::new(root[0], EntropyLevel::High, ROOT_HIGH),
                ThresholdTier::new(root[1], EntropyLevel::Medium, ROOT_MEDIUM),
                ThresholdTier::new(0.0, EntropyLevel::Low, ROOT_LOW),
            ],
            subdirectory: vec![
                ThresholdTier::new(subdirectory[0], EntropyLevel::Critical, DIR_CRITICAL),
                ThresholdTier::new(subdirectory[1], EntropyLevel::High, DIR_HIGH),
                ThresholdTier::new(subdirectory[2], EntropyLevel::Medium, DIR_MEDIUM),
                ThresholdTier::new(0.0, EntropyLevel::Low, DIR_LOW),
            ],
        }
    }

    /// Parse and validate a ladder from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let ladder: Self = serde_json::from_str(json)?;
        ladder.validate()?;
        Ok(ladder)
    }

    /// Check that both tables are usable.
    pub fn validate(&self) -> Result<()> {
        validate_tiers("root", &self.root)?;
        validate_tiers("subdirectory", &self.subdirectory)?;
        if self
            .root
            .iter()
            .any(|tier| tier.level == EntropyLevel::Critical)
        {
            return Err(BulkheadError::InvalidThresholds(
                "root tiers cannot use the Critical level".to_string(),
            ));
        }
        Ok(())
    }

    /// Classify a directory.
    ///
    /// Only `entropy` and whether `path` is the root select the tier; the
    /// average entropy and project type are accepted for context.
    pub fn classify(
        &self,
        entropy: f64,
        _avg_entropy: f64,
        path: &str,
        _project: &ProjectType,
    ) -> Classification {
        let tiers = if path == ROOT_DIR {
            &self.root
        } else {
            &self.subdirectory
        };

        tiers
            .iter()
            .find(|tier| entropy >= tier.min_entropy)
            .or_else(|| tiers.last())
            .map(|tier| Classification {
                level: tier.level,
                recommendation: tier.recommendation.clone(),
            })
            .unwrap_or_else(|| Classification {
                level: EntropyLevel::Low,
                recommendation: String::new(),
            })
    }
}

fn validate_tiers(name: &str, tiers: &[ThresholdTier]) -> Result<()> {
    if tiers.is_empty() {
        return Err(BulkheadError::InvalidThresholds(format!(
            "{name} tiers are empty"
        )));
    }
    if let Some(tier) = tiers.iter().find(|tier| !tier.min_entropy.is_finite()) {
        return Err(BulkheadError::InvalidThresholds(format!(
            "{name} tier {} has a non-finite bound",
            tier.level
        )));
    }
    for pair in tiers.windows(2) {
        if pair[1].min_entropy >= pair[0].min_entropy {
            return Err(BulkheadError::InvalidThresholds(format!(
                "{name} tiers must be strictly descending ({} then {})",
                pair[0].min_entropy, pair[1].min_entropy
            )));
        }
    }
    Ok(())
}

/// Classify a directory with the standard ladder.
pub fn classify(
    entropy: f64,
    avg_entropy: f64,
    path: &str,
    project: &ProjectType,
) -> Classification {
    STANDARD.classify(entropy, avg_entropy, path, project)
}
