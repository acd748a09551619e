use std::sync::Arc;

use tracing::debug;

use super::domain::{CandidateProfile, UserId, VerificationPreference};
use super::repository::{ProfileStore, ProfileStoreError};

/// Pulls a bounded, filtered pool of seekers who could share a rental with the target.
pub struct CandidateSelector<P> {
    profiles: Arc<P>,
    max_candidates: usize,
}

impl<P> CandidateSelector<P>
where
    P: ProfileStore,
{
    pub fn new(profiles: Arc<P>, max_candidates: usize) -> Self {
        Self {
            profiles,
            max_candidates,
        }
    }

    /// Load the target's seeking profile, then select candidates for it. An inactive target
    /// yields an empty pool.
    pub fn select(
        &self,
        target: &UserId,
        preference: VerificationPreference,
    ) -> Result<Vec<CandidateProfile>, ProfileStoreError> {
        match self.profiles.seeking_profile(target)? {
            Some(profile) => self.select_for(&profile, preference),
            None => Ok(Vec::new()),
        }
    }

    /// Discoverable seekers other than `target` admitted by `preference`, at most
    /// `max_candidates` of them. Discoverability is fetched for the whole pool in one call and
    /// a missing flag counts as not discoverable.
    pub fn select_for(
        &self,
        target: &CandidateProfile,
        preference: VerificationPreference,
    ) -> Result<Vec<CandidateProfile>, ProfileStoreError> {
        let pool = self
            .profiles
            .seeking_profiles_excluding(&target.user_id, self.max_candidates)?;
        if pool.is_empty() {
            return Ok(pool);
        }

        let ids: Vec<UserId> = pool.iter().map(|profile| profile.user_id.clone()).collect();
        let discoverable = self.profiles.discoverability(&ids)?;

        let fetched = pool.len();
        let selected: Vec<CandidateProfile> = pool
            .into_iter()
            .filter(|profile| profile.user_id != target.user_id)
            .filter(|profile| discoverable.get(&profile.user_id).copied().unwrap_or(false))
            .filter(|profile| preference.admits(profile.verification_level))
            .take(self.max_candidates)
            .collect();

        debug!(
            target_user = %target.user_id,
            fetched,
            selected = selected.len(),
            ?preference,
            "candidate pool selected"
        );

        Ok(selected)
    }
}
