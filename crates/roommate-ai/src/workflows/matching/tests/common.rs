use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::workflows::matching::config::MatchingConfig;
use crate::workflows::matching::domain::{
    CandidateProfile, DisplayProfile, PersistedSuggestion, SeekingPreferences, SuggestionId,
    SuggestionStatus, UserId, VerificationLevel,
};
use crate::workflows::matching::repository::{
    CompatibilityError, CompatibilityScorer, GroupScore, ProfileStore, ProfileStoreError,
    SuggestionStore, SuggestionStoreError,
};
use crate::workflows::matching::service::SuggestionService;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn profile(
    id: &str,
    level: VerificationLevel,
    budget: (u32, u32),
    move_in: NaiveDate,
    cities: &[&str],
) -> CandidateProfile {
    CandidateProfile {
        user_id: UserId::new(id),
        verification_level: level,
        seeking: SeekingPreferences {
            budget_min: budget.0,
            budget_max: budget.1,
            move_in_date: move_in,
            preferred_cities: cities.iter().map(|city| city.to_string()).collect(),
        },
    }
}

/// Target from the worked example: [1000, 1800], 2024-06-01, Toronto.
pub(super) fn target() -> CandidateProfile {
    profile(
        "target",
        VerificationLevel::Verified,
        (1000, 1800),
        date(2024, 6, 1),
        &["Toronto"],
    )
}

/// Candidate A from the worked example: [1200, 2000], 2024-06-20, Toronto + Ottawa.
pub(super) fn candidate_a() -> CandidateProfile {
    profile(
        "cand-a",
        VerificationLevel::Basic,
        (1200, 2000),
        date(2024, 6, 20),
        &["Toronto", "Ottawa"],
    )
}

/// A pool member compatible with `target()`; `offset` shifts budget and move-in date.
pub(super) fn compatible(id: &str, level: VerificationLevel, offset: u32) -> CandidateProfile {
    profile(
        id,
        level,
        (1000 + offset * 10, 1800 + offset * 10),
        date(2024, 6, 1 + offset.min(20)),
        &["Toronto"],
    )
}

pub(super) fn display(id: &str) -> DisplayProfile {
    DisplayProfile {
        user_id: UserId::new(id),
        name: format!("Name {id}"),
        photo_url: None,
        city: "Toronto".to_string(),
        province: "ON".to_string(),
    }
}

pub(super) fn matching_config() -> MatchingConfig {
    MatchingConfig::default()
}

pub(super) type TestService = SuggestionService<MemoryProfiles, ScriptedScorer, MemorySuggestions>;

pub(super) fn build_service(
    profiles: MemoryProfiles,
    scorer: ScriptedScorer,
    config: MatchingConfig,
) -> (TestService, Arc<MemoryProfiles>, Arc<ScriptedScorer>, Arc<MemorySuggestions>) {
    let profiles = Arc::new(profiles);
    let scorer = Arc::new(scorer);
    let suggestions = Arc::new(MemorySuggestions::default());
    let service = SuggestionService::new(
        profiles.clone(),
        scorer.clone(),
        suggestions.clone(),
        config,
    )
    .expect("valid matching config");
    (service, profiles, scorer, suggestions)
}

#[derive(Default)]
pub(super) struct MemoryProfiles {
    pub(super) seekers: Vec<CandidateProfile>,
    pub(super) hidden: BTreeSet<UserId>,
    pub(super) unflagged: BTreeSet<UserId>,
    pub(super) display: HashMap<UserId, DisplayProfile>,
    pub(super) discoverability_calls: Mutex<usize>,
    pub(super) display_calls: Mutex<usize>,
}

impl MemoryProfiles {
    pub(super) fn with(seekers: Vec<CandidateProfile>) -> Self {
        let display = seekers
            .iter()
            .map(|seeker| (seeker.user_id.clone(), display(&seeker.user_id.0)))
            .collect();
        Self {
            seekers,
            display,
            ..Self::default()
        }
    }

    pub(super) fn discoverability_calls(&self) -> usize {
        *self.discoverability_calls.lock().expect("mutex poisoned")
    }

    pub(super) fn display_calls(&self) -> usize {
        *self.display_calls.lock().expect("mutex poisoned")
    }
}

impl ProfileStore for MemoryProfiles {
    fn seeking_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<CandidateProfile>, ProfileStoreError> {
        Ok(self
            .seekers
            .iter()
            .find(|seeker| &seeker.user_id == user_id)
            .cloned())
    }

    fn seeking_profiles_excluding(
        &self,
        excluded: &UserId,
        limit: usize,
    ) -> Result<Vec<CandidateProfile>, ProfileStoreError> {
        Ok(self
            .seekers
            .iter()
            .filter(|seeker| &seeker.user_id != excluded)
            .take(limit)
            .cloned()
            .collect())
    }

    fn discoverability(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, bool>, ProfileStoreError> {
        *self.discoverability_calls.lock().expect("mutex poisoned") += 1;
        Ok(user_ids
            .iter()
            .filter(|id| !self.unflagged.contains(*id))
            .map(|id| (id.clone(), !self.hidden.contains(id)))
            .collect())
    }

    fn display_profiles(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, DisplayProfile>, ProfileStoreError> {
        *self.display_calls.lock().expect("mutex poisoned") += 1;
        Ok(user_ids
            .iter()
            .filter_map(|id| self.display.get(id).map(|profile| (id.clone(), profile.clone())))
            .collect())
    }
}

pub(super) struct UnavailableProfiles;

impl ProfileStore for UnavailableProfiles {
    fn seeking_profile(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<CandidateProfile>, ProfileStoreError> {
        Err(ProfileStoreError::Unavailable("profile db offline".to_string()))
    }

    fn seeking_profiles_excluding(
        &self,
        _excluded: &UserId,
        _limit: usize,
    ) -> Result<Vec<CandidateProfile>, ProfileStoreError> {
        Err(ProfileStoreError::Unavailable("profile db offline".to_string()))
    }

    fn discoverability(
        &self,
        _user_ids: &[UserId],
    ) -> Result<HashMap<UserId, bool>, ProfileStoreError> {
        Err(ProfileStoreError::Unavailable("profile db offline".to_string()))
    }

    fn display_profiles(
        &self,
        _user_ids: &[UserId],
    ) -> Result<HashMap<UserId, DisplayProfile>, ProfileStoreError> {
        Err(ProfileStoreError::Unavailable("profile db offline".to_string()))
    }
}

/// Scores each group from a per-user table and records every batch it receives.
#[derive(Default)]
pub(super) struct ScriptedScorer {
    pub(super) per_user: HashMap<UserId, f64>,
    pub(super) fail: bool,
    pub(super) skip_indices: BTreeSet<usize>,
    pub(super) batches: Mutex<Vec<Vec<Vec<UserId>>>>,
}

impl ScriptedScorer {
    pub(super) fn with_scores(scores: &[(&str, f64)]) -> Self {
        Self {
            per_user: scores
                .iter()
                .map(|(id, score)| (UserId::new(*id), *score))
                .collect(),
            ..Self::default()
        }
    }

    pub(super) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(super) fn batches(&self) -> Vec<Vec<Vec<UserId>>> {
        self.batches.lock().expect("mutex poisoned").clone()
    }

    /// Mean of the non-target members' table scores.
    pub(super) fn score_for(&self, group: &[UserId]) -> f64 {
        let scored: Vec<f64> = group
            .iter()
            .filter_map(|id| self.per_user.get(id).copied())
            .collect();
        if scored.is_empty() {
            return 50.0;
        }
        scored.iter().sum::<f64>() / scored.len() as f64
    }
}

impl CompatibilityScorer for ScriptedScorer {
    fn score_groups(&self, groups: &[Vec<UserId>]) -> Result<Vec<GroupScore>, CompatibilityError> {
        self.batches
            .lock()
            .expect("mutex poisoned")
            .push(groups.to_vec());
        if self.fail {
            return Err(CompatibilityError::Unavailable("lifestyle service timeout".to_string()));
        }
        Ok(groups
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.skip_indices.contains(index))
            .map(|(group_index, group)| GroupScore {
                group_index,
                score: self.score_for(group),
            })
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemorySuggestions {
    pub(super) records: Mutex<Vec<PersistedSuggestion>>,
}

impl MemorySuggestions {
    pub(super) fn all(&self) -> Vec<PersistedSuggestion> {
        self.records.lock().expect("mutex poisoned").clone()
    }
}

impl SuggestionStore for MemorySuggestions {
    fn delete_active(&self, target: &UserId) -> Result<usize, SuggestionStoreError> {
        let mut guard = self.records.lock().expect("mutex poisoned");
        let before = guard.len();
        guard.retain(|record| {
            !(record.target_user_id == *target && record.status == SuggestionStatus::Active)
        });
        Ok(before - guard.len())
    }

    fn insert_all(
        &self,
        suggestions: Vec<PersistedSuggestion>,
    ) -> Result<(), SuggestionStoreError> {
        let mut guard = self.records.lock().expect("mutex poisoned");
        if suggestions
            .iter()
            .any(|new| guard.iter().any(|existing| existing.id == new.id))
        {
            return Err(SuggestionStoreError::Conflict);
        }
        guard.extend(suggestions);
        Ok(())
    }

    fn active_for(
        &self,
        target: &UserId,
        limit: usize,
    ) -> Result<Vec<PersistedSuggestion>, SuggestionStoreError> {
        let guard = self.records.lock().expect("mutex poisoned");
        let mut active: Vec<PersistedSuggestion> = guard
            .iter()
            .filter(|record| {
                record.target_user_id == *target && record.status == SuggestionStatus::Active
            })
            .cloned()
            .collect();
        active.sort_by(|a, b| b.combined_score.cmp(&a.combined_score));
        active.truncate(limit);
        Ok(active)
    }

    fn fetch(&self, id: &SuggestionId) -> Result<Option<PersistedSuggestion>, SuggestionStoreError> {
        let guard = self.records.lock().expect("mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn update_status(
        &self,
        id: &SuggestionId,
        status: SuggestionStatus,
    ) -> Result<PersistedSuggestion, SuggestionStoreError> {
        let mut guard = self.records.lock().expect("mutex poisoned");
        let record = guard
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or(SuggestionStoreError::NotFound)?;
        record.status = status;
        Ok(record.clone())
    }
}

/// Accepts reads but fails every write.
#[derive(Default)]
pub(super) struct ReadOnlySuggestions;

impl SuggestionStore for ReadOnlySuggestions {
    fn delete_active(&self, _target: &UserId) -> Result<usize, SuggestionStoreError> {
        Err(SuggestionStoreError::Unavailable("read only".to_string()))
    }

    fn insert_all(
        &self,
        _suggestions: Vec<PersistedSuggestion>,
    ) -> Result<(), SuggestionStoreError> {
        Err(SuggestionStoreError::Unavailable("read only".to_string()))
    }

    fn active_for(
        &self,
        _target: &UserId,
        _limit: usize,
    ) -> Result<Vec<PersistedSuggestion>, SuggestionStoreError> {
        Ok(Vec::new())
    }

    fn fetch(
        &self,
        _id: &SuggestionId,
    ) -> Result<Option<PersistedSuggestion>, SuggestionStoreError> {
        Ok(None)
    }

    fn update_status(
        &self,
        _id: &SuggestionId,
        _status: SuggestionStatus,
    ) -> Result<PersistedSuggestion, SuggestionStoreError> {
        Err(SuggestionStoreError::Unavailable("read only".to_string()))
    }
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
