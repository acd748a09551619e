use crate::lifestyle::LifestyleScorer;
use metrics_exporter_prometheus::PrometheusHandle;
use roommate_ai::config::ConfigError;
use roommate_ai::error::AppError;
use roommate_ai::workflows::matching::{
    CandidateProfile, DisplayProfile, ImportedProfile, MatchingConfig, PersistedSuggestion,
    ProfileImportError, ProfileImporter, ProfileStore, ProfileStoreError, SuggestionId,
    SuggestionService, SuggestionStatus, SuggestionStore, SuggestionStoreError, UserId,
    VerificationPreference,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

pub(crate) const SAMPLE_PROFILES: &str = include_str!("../data/profiles.csv");
pub(crate) const SAMPLE_LIFESTYLE: &str = include_str!("../data/lifestyle.csv");

pub(crate) type MatchingService =
    SuggestionService<InMemoryProfileStore, LifestyleScorer, InMemorySuggestionStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Seeker profiles held in memory after an import. Read-only once built.
#[derive(Debug, Default, Clone)]
pub(crate) struct InMemoryProfileStore {
    seekers: Vec<CandidateProfile>,
    discoverable: HashMap<UserId, bool>,
    display: HashMap<UserId, DisplayProfile>,
}

impl InMemoryProfileStore {
    pub(crate) fn from_imported(profiles: Vec<ImportedProfile>) -> Self {
        let mut store = Self::default();
        for profile in profiles {
            let user_id = profile.candidate.user_id.clone();
            store.discoverable.insert(user_id.clone(), profile.discoverable);
            store.display.insert(user_id, profile.display);
            store.seekers.push(profile.candidate);
        }
        store
    }

    /// Reads `path` when given, otherwise the bundled sample export.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, ProfileImportError> {
        let imported = match path {
            Some(path) => ProfileImporter::from_path(path)?,
            None => ProfileImporter::from_reader(SAMPLE_PROFILES.as_bytes())?,
        };
        Ok(Self::from_imported(imported))
    }

    pub(crate) fn len(&self) -> usize {
        self.seekers.len()
    }
}

impl ProfileStore for InMemoryProfileStore {
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
        Ok(user_ids
            .iter()
            .filter_map(|id| self.discoverable.get(id).map(|flag| (id.clone(), *flag)))
            .collect())
    }

    fn display_profiles(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, DisplayProfile>, ProfileStoreError> {
        Ok(user_ids
            .iter()
            .filter_map(|id| self.display.get(id).map(|profile| (id.clone(), profile.clone())))
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySuggestionStore {
    records: Arc<Mutex<Vec<PersistedSuggestion>>>,
}

impl InMemorySuggestionStore {
    fn records(&self) -> Result<MutexGuard<'_, Vec<PersistedSuggestion>>, SuggestionStoreError> {
        self.records
            .lock()
            .map_err(|_| SuggestionStoreError::Unavailable("suggestion store poisoned".to_string()))
    }
}

fn is_active_for(record: &PersistedSuggestion, target: &UserId) -> bool {
    record.target_user_id == *target && record.status == SuggestionStatus::Active
}

impl SuggestionStore for InMemorySuggestionStore {
    fn delete_active(&self, target: &UserId) -> Result<usize, SuggestionStoreError> {
        let mut guard = self.records()?;
        let before = guard.len();
        guard.retain(|record| !is_active_for(record, target));
        Ok(before - guard.len())
    }

    fn insert_all(
        &self,
        suggestions: Vec<PersistedSuggestion>,
    ) -> Result<(), SuggestionStoreError> {
        let mut guard = self.records()?;
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
        let guard = self.records()?;
        let mut active: Vec<PersistedSuggestion> = guard
            .iter()
            .filter(|record| is_active_for(record, target))
            .cloned()
            .collect();
        active.sort_by(|a, b| b.combined_score.cmp(&a.combined_score));
        active.truncate(limit);
        Ok(active)
    }

    fn fetch(&self, id: &SuggestionId) -> Result<Option<PersistedSuggestion>, SuggestionStoreError> {
        let guard = self.records()?;
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn update_status(
        &self,
        id: &SuggestionId,
        status: SuggestionStatus,
    ) -> Result<PersistedSuggestion, SuggestionStoreError> {
        let mut guard = self.records()?;
        let record = guard
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or(SuggestionStoreError::NotFound)?;
        record.status = status;
        Ok(record.clone())
    }

    /// Delete and insert under one lock so readers never observe an empty active set.
    fn replace_active(
        &self,
        target: &UserId,
        suggestions: Vec<PersistedSuggestion>,
    ) -> Result<(), SuggestionStoreError> {
        let mut guard = self.records()?;
        guard.retain(|record| !is_active_for(record, target));
        if suggestions
            .iter()
            .any(|new| guard.iter().any(|existing| existing.id == new.id))
        {
            return Err(SuggestionStoreError::Conflict);
        }
        guard.extend(suggestions);
        Ok(())
    }
}

/// Wire the in-memory stores and the lifestyle scorer into a suggestion service.
pub(crate) fn build_service(
    profiles_csv: Option<&Path>,
    lifestyle_csv: Option<&Path>,
    config: MatchingConfig,
) -> Result<MatchingService, AppError> {
    let profiles = InMemoryProfileStore::load(profiles_csv)?;
    let scorer = LifestyleScorer::load(lifestyle_csv)?;
    tracing::debug!(
        seekers = profiles.len(),
        answered = scorer.len(),
        "matching stores loaded"
    );

    let service = SuggestionService::new(
        Arc::new(profiles),
        Arc::new(scorer),
        Arc::new(InMemorySuggestionStore::default()),
        config,
    )
    .map_err(ConfigError::from)?;
    Ok(service)
}

pub(crate) fn parse_verification(raw: &str) -> Result<VerificationPreference, String> {
    match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "any" => Ok(VerificationPreference::Any),
        "verified" | "verified_only" => Ok(VerificationPreference::VerifiedOnly),
        "trusted" | "trusted_only" => Ok(VerificationPreference::TrustedOnly),
        other => Err(format!(
            "unknown verification preference '{other}' (expected any, verified_only, trusted_only)"
        )),
    }
}
