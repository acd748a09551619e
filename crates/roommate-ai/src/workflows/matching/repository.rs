use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::domain::{
    CandidateProfile, DisplayProfile, PersistedSuggestion, SuggestionId, SuggestionStatus, UserId,
};

/// Read surface of the profile store consumed by the matching engine.
pub trait ProfileStore: Send + Sync {
    /// Target's profile, present only while they have an active seeking profile.
    fn seeking_profile(&self, user_id: &UserId)
        -> Result<Option<CandidateProfile>, ProfileStoreError>;

    /// Active seekers other than `excluded`, at most `limit` of them.
    fn seeking_profiles_excluding(
        &self,
        excluded: &UserId,
        limit: usize,
    ) -> Result<Vec<CandidateProfile>, ProfileStoreError>;

    /// Discoverability flags for a whole pool in one lookup. Users without a stored flag are
    /// omitted from the map.
    fn discoverability(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, bool>, ProfileStoreError>;

    fn display_profiles(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, DisplayProfile>, ProfileStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileStoreError {
    #[error("profile store unavailable: {0}")]
    Unavailable(String),
}

/// Durable storage for generated suggestions.
pub trait SuggestionStore: Send + Sync {
    fn delete_active(&self, target: &UserId) -> Result<usize, SuggestionStoreError>;

    fn insert_all(&self, suggestions: Vec<PersistedSuggestion>)
        -> Result<(), SuggestionStoreError>;

    /// Active suggestions for `target`, highest combined score first.
    fn active_for(
        &self,
        target: &UserId,
        limit: usize,
    ) -> Result<Vec<PersistedSuggestion>, SuggestionStoreError>;

    fn fetch(&self, id: &SuggestionId) -> Result<Option<PersistedSuggestion>, SuggestionStoreError>;

    fn update_status(
        &self,
        id: &SuggestionId,
        status: SuggestionStatus,
    ) -> Result<PersistedSuggestion, SuggestionStoreError>;

    /// Swap the target's active set for `suggestions`.
    ///
    /// The default runs delete then insert as two calls, so a crash in between leaves the user
    /// with no active suggestions until the next run. Stores with transactions should override
    /// this to make the swap atomic.
    fn replace_active(
        &self,
        target: &UserId,
        suggestions: Vec<PersistedSuggestion>,
    ) -> Result<(), SuggestionStoreError> {
        self.delete_active(target)?;
        self.insert_all(suggestions)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SuggestionStoreError {
    #[error("suggestion already exists")]
    Conflict,
    #[error("suggestion not found")]
    NotFound,
    #[error("suggestion store unavailable: {0}")]
    Unavailable(String),
}

/// External lifestyle-compatibility capability scoring many groups in one call.
pub trait CompatibilityScorer: Send + Sync {
    /// Scores are correlated to `groups` by `group_index`. Groups may be missing from the
    /// response.
    fn score_groups(&self, groups: &[Vec<UserId>]) -> Result<Vec<GroupScore>, CompatibilityError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupScore {
    pub group_index: usize,
    pub score: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum CompatibilityError {
    #[error("compatibility scorer unavailable: {0}")]
    Unavailable(String),
}
