use super::config::MatchingConfig;
use super::domain::VerificationLevel;

/// Multiplier applied once to the weighted score for the group's average tier.
pub fn tier_boost(tier: VerificationLevel, config: &MatchingConfig) -> f64 {
    match tier {
        VerificationLevel::Trusted => config.trusted_boost,
        VerificationLevel::Verified => config.verified_boost,
        VerificationLevel::Basic => 1.0,
    }
}

/// `round(clamp(weighted * boost, 0, 100))` over the three component scores.
pub fn combine_scores(
    practical: u8,
    compatibility: u8,
    trust: u8,
    tier: VerificationLevel,
    config: &MatchingConfig,
) -> u8 {
    let weighted = f64::from(practical) * config.practical_weight
        + f64::from(compatibility) * config.compatibility_weight
        + f64::from(trust) * config.trust_weight;
    (weighted * tier_boost(tier, config)).clamp(0.0, 100.0).round() as u8
}
