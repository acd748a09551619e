use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::candidates::CandidateSelector;
use super::combinations::combinations;
use super::combiner::combine_scores;
use super::compatibility::CompatibilityBatchClient;
use super::config::{MatchingConfig, MatchingConfigError};
use super::domain::{
    CandidateGroup, CandidateProfile, MatchCriteria, PersistedSuggestion, SuggestedGroup,
    SuggestionId, SuggestionStatus, UserId, VerificationLevel, VerificationPreference,
};
use super::hydrator::{HydratedSuggestion, SuggestionHydrator};
use super::practical::evaluate_practical;
use super::repository::{
    CompatibilityScorer, ProfileStore, ProfileStoreError, SuggestionStore, SuggestionStoreError,
};
use super::trust::{average_verification, trust_score};

const DEFAULT_GROUP_SIZE: usize = 2;

/// Service composing candidate selection, local scoring, the batched compatibility call, and
/// suggestion persistence.
pub struct SuggestionService<P, C, S> {
    profiles: Arc<P>,
    suggestions: Arc<S>,
    selector: CandidateSelector<P>,
    compatibility: CompatibilityBatchClient<C>,
    hydrator: SuggestionHydrator<P>,
    config: Arc<MatchingConfig>,
}

static SUGGESTION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_suggestion_id() -> SuggestionId {
    let id = SUGGESTION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SuggestionId(format!("sug-{id:06}"))
}

/// Parameters of one "generate suggestions for user X" run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationRequest {
    #[serde(default = "default_group_size")]
    pub group_size: usize,
    #[serde(default)]
    pub max_suggestions: Option<usize>,
    #[serde(default)]
    pub verification_preference: VerificationPreference,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            group_size: DEFAULT_GROUP_SIZE,
            max_suggestions: None,
            verification_preference: VerificationPreference::Any,
        }
    }
}

fn default_group_size() -> usize {
    DEFAULT_GROUP_SIZE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStage {
    LoadTarget,
    SelectCandidates,
    GenerateAndFilterCombinations,
}

struct PassingGroup<'a> {
    group: CandidateGroup<'a>,
    practical_score: u8,
    criteria: MatchCriteria,
    trust_score: u8,
    tier: VerificationLevel,
}

impl<P, C, S> SuggestionService<P, C, S>
where
    P: ProfileStore + 'static,
    C: CompatibilityScorer + 'static,
    S: SuggestionStore + 'static,
{
    /// Build a service over the given stores. Rejects configurations that fail
    /// [`MatchingConfig::validate`].
    pub fn new(
        profiles: Arc<P>,
        scorer: Arc<C>,
        suggestions: Arc<S>,
        config: MatchingConfig,
    ) -> Result<Self, MatchingConfigError> {
        config.validate()?;
        let selector = CandidateSelector::new(profiles.clone(), config.max_candidates);
        let hydrator = SuggestionHydrator::new(profiles.clone());

        Ok(Self {
            profiles,
            suggestions,
            selector,
            compatibility: CompatibilityBatchClient::new(scorer),
            hydrator,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Generate, rank, and persist suggestions for `target`.
    ///
    /// Missing seeking profiles, empty pools, and groups that all fail the practical gates end
    /// the run with an empty list and leave stored suggestions untouched. Profile or suggestion
    /// store failures abort the run before anything is written.
    pub fn generate(
        &self,
        target: &UserId,
        request: &GenerationRequest,
    ) -> Result<Vec<SuggestedGroup>, SuggestionServiceError> {
        let max_suggestions = request
            .max_suggestions
            .unwrap_or(self.config.default_max_suggestions);
        if request.group_size < 2 {
            return Err(SuggestionServiceError::InvalidRequest(format!(
                "group size must be at least 2 (got {})",
                request.group_size
            )));
        }
        if max_suggestions == 0 {
            return Err(SuggestionServiceError::InvalidRequest(
                "max suggestions must be greater than zero".to_string(),
            ));
        }

        info!(
            target_user = %target,
            group_size = request.group_size,
            max_suggestions,
            preference = ?request.verification_preference,
            "generating suggestions"
        );

        let Some(profile) = self.profiles.seeking_profile(target)? else {
            debug!(target_user = %target, stage = ?RunStage::LoadTarget, "no active seeking profile");
            return Ok(Vec::new());
        };

        let pool = self
            .selector
            .select_for(&profile, request.verification_preference)?;
        if pool.is_empty() {
            debug!(target_user = %target, stage = ?RunStage::SelectCandidates, "no eligible candidates");
            return Ok(Vec::new());
        }

        let companions = request.group_size - 1;
        if companions > pool.len() {
            debug!(
                target_user = %target,
                stage = ?RunStage::SelectCandidates,
                pool = pool.len(),
                group_size = request.group_size,
                "pool too small for the requested group size"
            );
            return Ok(Vec::new());
        }

        let (passing, inspected) =
            self.collect_passing(&profile, &pool, companions, max_suggestions);
        if passing.is_empty() {
            debug!(
                target_user = %target,
                stage = ?RunStage::GenerateAndFilterCombinations,
                inspected,
                "no combination passed the practical gates"
            );
            return Ok(Vec::new());
        }

        let groups: Vec<Vec<UserId>> = passing
            .iter()
            .map(|candidate| candidate.group.user_ids())
            .collect();
        let compatibility = self.compatibility.score_all(&groups);

        let ranked = self.combine_and_rank(passing, compatibility, max_suggestions);
        let persisted = self.persist(target, &ranked)?;

        info!(
            target_user = %target,
            pool = pool.len(),
            inspected,
            scored = groups.len(),
            persisted,
            "suggestions generated"
        );

        Ok(ranked)
    }

    /// Enumerate groups lazily, keeping those that pass the practical gates. Stops after
    /// `max_combinations_evaluated` inspections or `2 * max_suggestions` passes.
    fn collect_passing<'a>(
        &self,
        target: &'a CandidateProfile,
        pool: &'a [CandidateProfile],
        companions: usize,
        max_suggestions: usize,
    ) -> (Vec<PassingGroup<'a>>, usize) {
        let wanted = max_suggestions.saturating_mul(2);
        let mut passing = Vec::new();
        let mut inspected = 0;
        let mut remaining = combinations(pool, companions);

        while inspected < self.config.max_combinations_evaluated && passing.len() < wanted {
            let Some(others) = remaining.next() else {
                break;
            };
            inspected += 1;

            let group = CandidateGroup::with_target(target, others);
            let practical = evaluate_practical(&group, &self.config);
            let Some(criteria) = practical.criteria() else {
                continue;
            };

            passing.push(PassingGroup {
                practical_score: practical.score,
                criteria,
                trust_score: trust_score(&group),
                tier: average_verification(&group),
                group,
            });
        }

        (passing, inspected)
    }

    fn combine_and_rank(
        &self,
        passing: Vec<PassingGroup<'_>>,
        compatibility: Vec<u8>,
        max_suggestions: usize,
    ) -> Vec<SuggestedGroup> {
        let mut ranked: Vec<SuggestedGroup> = passing
            .into_iter()
            .zip(compatibility)
            .map(|(candidate, compatibility_score)| SuggestedGroup {
                members: candidate.group.user_ids(),
                practical_score: candidate.practical_score,
                compatibility_score,
                trust_score: candidate.trust_score,
                combined_score: combine_scores(
                    candidate.practical_score,
                    compatibility_score,
                    candidate.trust_score,
                    candidate.tier,
                    &self.config,
                ),
                match_criteria: candidate.criteria,
            })
            .collect();

        ranked.sort_by(|a, b| b.combined_score.cmp(&a.combined_score));
        ranked.truncate(max_suggestions);
        ranked
    }

    fn persist(
        &self,
        target: &UserId,
        ranked: &[SuggestedGroup],
    ) -> Result<usize, SuggestionStoreError> {
        let created_at = Utc::now();
        let records: Vec<PersistedSuggestion> = ranked
            .iter()
            .map(|group| PersistedSuggestion {
                id: next_suggestion_id(),
                target_user_id: target.clone(),
                suggested_users: group
                    .members
                    .iter()
                    .filter(|member| *member != target)
                    .cloned()
                    .collect(),
                practical_score: group.practical_score,
                compatibility_score: group.compatibility_score,
                trust_score: group.trust_score,
                combined_score: group.combined_score,
                match_criteria: group.match_criteria.clone(),
                status: SuggestionStatus::Active,
                created_at,
            })
            .collect();

        let count = records.len();
        self.suggestions.replace_active(target, records)?;
        Ok(count)
    }

    /// Active suggestions for `target`, best first, capped at `active_suggestion_limit`.
    pub fn active_suggestions(
        &self,
        target: &UserId,
    ) -> Result<Vec<PersistedSuggestion>, SuggestionServiceError> {
        let records = self
            .suggestions
            .active_for(target, self.config.active_suggestion_limit)?;
        Ok(records)
    }

    /// Active suggestions with display profiles attached for rendering.
    pub fn suggestions_with_profiles(
        &self,
        target: &UserId,
    ) -> Result<Vec<HydratedSuggestion>, SuggestionServiceError> {
        let records = self.active_suggestions(target)?;
        let hydrated = self.hydrator.hydrate(records)?;
        Ok(hydrated)
    }

    /// Move an active suggestion to `dismissed` or `converted`.
    pub fn update_status(
        &self,
        id: &SuggestionId,
        status: SuggestionStatus,
    ) -> Result<PersistedSuggestion, SuggestionServiceError> {
        let current = self
            .suggestions
            .fetch(id)?
            .ok_or(SuggestionStoreError::NotFound)?;

        if current.status != SuggestionStatus::Active || status == SuggestionStatus::Active {
            return Err(SuggestionServiceError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        let updated = self.suggestions.update_status(id, status)?;
        info!(suggestion = %id.0, status = status.label(), "suggestion status updated");
        Ok(updated)
    }
}

/// Error raised by the suggestion service.
#[derive(Debug, thiserror::Error)]
pub enum SuggestionServiceError {
    #[error("invalid suggestion request: {0}")]
    InvalidRequest(String),
    #[error("cannot move suggestion from {} to {}", .from.label(), .to.label())]
    InvalidTransition {
        from: SuggestionStatus,
        to: SuggestionStatus,
    },
    #[error(transparent)]
    Profiles(#[from] ProfileStoreError),
    #[error(transparent)]
    Suggestions(#[from] SuggestionStoreError),
}
