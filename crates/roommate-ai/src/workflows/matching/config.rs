use serde::{Deserialize, Serialize};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Scoring weights, hard gates, and search limits for a matching run.
///
/// Loaded once per process and shared read-only across runs. The search limits are part of the
/// configuration so callers can run an exhaustive search on small pools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub practical_weight: f64,
    pub compatibility_weight: f64,
    pub trust_weight: f64,
    pub min_budget_overlap_percent: f64,
    pub max_date_difference_days: u32,
    pub verified_boost: f64,
    pub trusted_boost: f64,
    pub max_candidates: usize,
    pub max_combinations_evaluated: usize,
    pub default_max_suggestions: usize,
    pub active_suggestion_limit: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            practical_weight: 0.4,
            compatibility_weight: 0.4,
            trust_weight: 0.2,
            min_budget_overlap_percent: 20.0,
            max_date_difference_days: 45,
            verified_boost: 1.1,
            trusted_boost: 1.2,
            max_candidates: 30,
            max_combinations_evaluated: 50,
            default_max_suggestions: 10,
            active_suggestion_limit: 20,
        }
    }
}

impl MatchingConfig {
    pub fn weight_sum(&self) -> f64 {
        self.practical_weight + self.compatibility_weight + self.trust_weight
    }

    /// Reject configurations the combiner cannot score meaningfully.
    pub fn validate(&self) -> Result<(), MatchingConfigError> {
        let numeric = [
            ("practical_weight", self.practical_weight),
            ("compatibility_weight", self.compatibility_weight),
            ("trust_weight", self.trust_weight),
            ("min_budget_overlap_percent", self.min_budget_overlap_percent),
            ("verified_boost", self.verified_boost),
            ("trusted_boost", self.trusted_boost),
        ];
        for (field, value) in numeric {
            if !value.is_finite() {
                return Err(MatchingConfigError::NotFinite { field });
            }
        }

        for &(field, value) in &numeric[..3] {
            if value < 0.0 {
                return Err(MatchingConfigError::NegativeWeight { field, value });
            }
        }

        let sum = self.weight_sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(MatchingConfigError::WeightSum { sum });
        }

        for (field, value) in [
            ("verified_boost", self.verified_boost),
            ("trusted_boost", self.trusted_boost),
        ] {
            if value < 1.0 {
                return Err(MatchingConfigError::BoostBelowOne { field, value });
            }
        }

        for (field, value) in [
            ("max_candidates", self.max_candidates),
            ("max_combinations_evaluated", self.max_combinations_evaluated),
            ("default_max_suggestions", self.default_max_suggestions),
            ("active_suggestion_limit", self.active_suggestion_limit),
        ] {
            if value == 0 {
                return Err(MatchingConfigError::ZeroLimit { field });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchingConfigError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must not be negative (got {value})")]
    NegativeWeight { field: &'static str, value: f64 },
    #[error("score weights must sum to 1.0 (got {sum:.4})")]
    WeightSum { sum: f64 },
    #[error("{field} must be at least 1.0 (got {value})")]
    BoostBelowOne { field: &'static str, value: f64 },
    #[error("{field} must be greater than zero")]
    ZeroLimit { field: &'static str },
}
