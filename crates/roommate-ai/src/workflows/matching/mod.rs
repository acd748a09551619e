//! Group compatibility matching: builds ranked co-renter groups for a target seeker.
//!
//! A run selects a bounded candidate pool, enumerates groups lazily, filters them with the
//! practical gates and trust scoring locally, scores every surviving group with one batched
//! compatibility call, then ranks and persists the result.

pub mod candidates;
pub mod combinations;
pub mod combiner;
pub mod compatibility;
pub mod config;
pub mod domain;
pub mod hydrator;
pub mod import;
pub mod practical;
pub mod repository;
pub mod router;
pub mod service;
pub mod trust;

#[cfg(test)]
mod tests;

pub use candidates::CandidateSelector;
pub use combinations::{combinations, Combinations};
pub use combiner::{combine_scores, tier_boost};
pub use compatibility::CompatibilityBatchClient;
pub use config::{MatchingConfig, MatchingConfigError};
pub use domain::{
    BudgetRange, CandidateGroup, CandidateProfile, DateRange, DisplayProfile, MatchCriteria,
    PersistedSuggestion, PracticalMatchResult, SeekingPreferences, SuggestedGroup, SuggestionId,
    SuggestionStatus, UserId, VerificationLevel, VerificationPreference,
};
pub use hydrator::{HydratedSuggestion, SuggestionHydrator};
pub use import::{ImportedProfile, ProfileImportError, ProfileImporter};
pub use practical::evaluate_practical;
pub use repository::{
    CompatibilityError, CompatibilityScorer, GroupScore, ProfileStore, ProfileStoreError,
    SuggestionStore, SuggestionStoreError,
};
pub use router::{matching_router, StatusUpdate};
pub use service::{GenerationRequest, SuggestionService, SuggestionServiceError};
pub use trust::{average_verification, trust_score};
