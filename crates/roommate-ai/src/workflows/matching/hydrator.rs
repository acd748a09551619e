use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    DisplayProfile, MatchCriteria, PersistedSuggestion, SuggestionId, SuggestionStatus, UserId,
};
use super::repository::{ProfileStore, ProfileStoreError};

/// Persisted suggestion with its members' display profiles attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HydratedSuggestion {
    pub suggestion_id: SuggestionId,
    pub members: Vec<DisplayProfile>,
    pub practical_score: u8,
    pub compatibility_score: u8,
    pub trust_score: u8,
    pub combined_score: u8,
    pub match_criteria: MatchCriteria,
    pub status: SuggestionStatus,
    pub created_at: DateTime<Utc>,
}

/// Attaches display profiles to stored suggestions with a single batched profile lookup.
pub struct SuggestionHydrator<P> {
    profiles: Arc<P>,
}

impl<P> SuggestionHydrator<P>
where
    P: ProfileStore,
{
    pub fn new(profiles: Arc<P>) -> Self {
        Self { profiles }
    }

    /// Members without a display profile are left out; suggestion order is preserved.
    pub fn hydrate(
        &self,
        suggestions: Vec<PersistedSuggestion>,
    ) -> Result<Vec<HydratedSuggestion>, ProfileStoreError> {
        if suggestions.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<UserId> = suggestions
            .iter()
            .flat_map(|suggestion| suggestion.suggested_users.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let display = self.profiles.display_profiles(&ids)?;

        Ok(suggestions
            .into_iter()
            .map(|suggestion| {
                let members = suggestion
                    .suggested_users
                    .iter()
                    .filter_map(|id| display.get(id).cloned())
                    .collect();
                HydratedSuggestion {
                    suggestion_id: suggestion.id,
                    members,
                    practical_score: suggestion.practical_score,
                    compatibility_score: suggestion.compatibility_score,
                    trust_score: suggestion.trust_score,
                    combined_score: suggestion.combined_score,
                    match_criteria: suggestion.match_criteria,
                    status: suggestion.status,
                    created_at: suggestion.created_at,
                }
            })
            .collect())
    }
}
