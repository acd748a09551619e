use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for people known to the profile store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for persisted suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuggestionId(pub String);

/// Ordinal trust tiers; ordering follows `basic < verified < trusted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationLevel {
    Basic,
    Verified,
    Trusted,
}

impl VerificationLevel {
    pub fn label(&self) -> &'static str {
        match self {
            VerificationLevel::Basic => "basic",
            VerificationLevel::Verified => "verified",
            VerificationLevel::Trusted => "trusted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "basic" => Some(Self::Basic),
            "verified" => Some(Self::Verified),
            "trusted" => Some(Self::Trusted),
            _ => None,
        }
    }
}

/// Filter applied to the candidate pool before any grouping happens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationPreference {
    #[default]
    Any,
    VerifiedOnly,
    TrustedOnly,
}

impl VerificationPreference {
    pub fn admits(&self, level: VerificationLevel) -> bool {
        match self {
            VerificationPreference::Any => true,
            VerificationPreference::VerifiedOnly => level >= VerificationLevel::Verified,
            VerificationPreference::TrustedOnly => level == VerificationLevel::Trusted,
        }
    }
}

/// What a person is looking for in a shared rental.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeekingPreferences {
    pub budget_min: u32,
    pub budget_max: u32,
    pub move_in_date: NaiveDate,
    pub preferred_cities: BTreeSet<String>,
}

impl SeekingPreferences {
    pub fn budget_width(&self) -> u32 {
        self.budget_max.saturating_sub(self.budget_min)
    }
}

/// One person eligible for grouping. Read-only to the matching engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub user_id: UserId,
    pub verification_level: VerificationLevel,
    pub seeking: SeekingPreferences,
}

/// Rendering-only details; never consulted while scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayProfile {
    pub user_id: UserId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub city: String,
    pub province: String,
}

/// Working value passed between stages: the target first, then the other members.
#[derive(Debug, Clone)]
pub struct CandidateGroup<'a> {
    members: Vec<&'a CandidateProfile>,
}

impl<'a> CandidateGroup<'a> {
    pub fn new(members: Vec<&'a CandidateProfile>) -> Self {
        Self { members }
    }

    pub fn with_target(target: &'a CandidateProfile, others: Vec<&'a CandidateProfile>) -> Self {
        let mut members = Vec::with_capacity(others.len() + 1);
        members.push(target);
        members.extend(others);
        Self { members }
    }

    pub fn members(&self) -> &[&'a CandidateProfile] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn user_ids(&self) -> Vec<UserId> {
        self.members
            .iter()
            .map(|member| member.user_id.clone())
            .collect()
    }
}

/// Intersection of every member's budget range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: u32,
    pub max: u32,
}

impl BudgetRange {
    pub fn width(&self) -> u32 {
        self.max.saturating_sub(self.min)
    }
}

/// Span of move-in dates across a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
    pub is_compatible: bool,
}

impl DateRange {
    pub fn spread_days(&self) -> i64 {
        (self.latest - self.earliest).num_days()
    }
}

/// Outcome of the hard gates plus the 0-100 practical score.
///
/// When `passes` is true, `budget_overlap` and `date_range` are present, `common_cities` is
/// non-empty and the date range is compatible. A failed gate leaves the later fields unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticalMatchResult {
    pub passes: bool,
    pub score: u8,
    pub budget_overlap: Option<BudgetRange>,
    pub common_cities: BTreeSet<String>,
    pub date_range: Option<DateRange>,
}

impl PracticalMatchResult {
    pub(crate) fn rejected(
        budget_overlap: Option<BudgetRange>,
        common_cities: BTreeSet<String>,
        date_range: Option<DateRange>,
    ) -> Self {
        Self {
            passes: false,
            score: 0,
            budget_overlap,
            common_cities,
            date_range,
        }
    }

    /// Criteria recorded alongside a suggestion; `None` unless every gate passed.
    pub fn criteria(&self) -> Option<MatchCriteria> {
        if !self.passes || self.common_cities.is_empty() {
            return None;
        }
        let budget_overlap = self.budget_overlap?;
        let date_range = self.date_range.filter(|range| range.is_compatible)?;
        Some(MatchCriteria {
            budget_overlap,
            common_cities: self.common_cities.clone(),
            date_range,
        })
    }
}

/// Why a group was considered a practical fit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCriteria {
    pub budget_overlap: BudgetRange,
    pub common_cities: BTreeSet<String>,
    pub date_range: DateRange,
}

/// Scored output unit of a generation run. `members` starts with the target user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedGroup {
    pub members: Vec<UserId>,
    pub practical_score: u8,
    pub compatibility_score: u8,
    pub trust_score: u8,
    pub combined_score: u8,
    pub match_criteria: MatchCriteria,
}

/// Lifecycle of a persisted suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    Active,
    Dismissed,
    Converted,
}

impl SuggestionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SuggestionStatus::Active => "active",
            SuggestionStatus::Dismissed => "dismissed",
            SuggestionStatus::Converted => "converted",
        }
    }
}

/// Durable record of a suggestion for one target user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSuggestion {
    pub id: SuggestionId,
    pub target_user_id: UserId,
    pub suggested_users: Vec<UserId>,
    pub practical_score: u8,
    pub compatibility_score: u8,
    pub trust_score: u8,
    pub combined_score: u8,
    pub match_criteria: MatchCriteria,
    pub status: SuggestionStatus,
    pub created_at: DateTime<Utc>,
}
