use super::domain::{CandidateGroup, VerificationLevel};

impl VerificationLevel {
    /// Contribution of a single member to the group trust score.
    pub fn trust_points(&self) -> u32 {
        match self {
            VerificationLevel::Trusted => 100,
            VerificationLevel::Verified => 70,
            VerificationLevel::Basic => 30,
        }
    }
}

/// Mean of the members' trust points, rounded; `0` for an empty group.
pub fn trust_score(group: &CandidateGroup<'_>) -> u8 {
    if group.is_empty() {
        return 0;
    }
    let total: u32 = group
        .members()
        .iter()
        .map(|member| member.verification_level.trust_points())
        .sum();
    (f64::from(total) / group.len() as f64).round() as u8
}

/// Tier used to pick the score boost: `trusted` when at least half the members are trusted,
/// `verified` when at least half are verified or trusted, otherwise `basic`.
pub fn average_verification(group: &CandidateGroup<'_>) -> VerificationLevel {
    let size = group.len();
    if size == 0 {
        return VerificationLevel::Basic;
    }

    let trusted = group
        .members()
        .iter()
        .filter(|member| member.verification_level == VerificationLevel::Trusted)
        .count();
    let verified_or_better = group
        .members()
        .iter()
        .filter(|member| member.verification_level >= VerificationLevel::Verified)
        .count();

    if trusted * 2 >= size {
        VerificationLevel::Trusted
    } else if verified_or_better * 2 >= size {
        VerificationLevel::Verified
    } else {
        VerificationLevel::Basic
    }
}
