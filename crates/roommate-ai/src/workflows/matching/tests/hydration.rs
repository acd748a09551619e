use super::common::*;
use crate::workflows::matching::domain::{
    BudgetRange, DateRange, MatchCriteria, PersistedSuggestion, SuggestionId, SuggestionStatus,
    UserId,
};
use crate::workflows::matching::hydrator::SuggestionHydrator;
use crate::workflows::matching::repository::SuggestionStore;
use chrono::{TimeZone, Utc};
use std::sync::Arc;

fn criteria() -> MatchCriteria {
    MatchCriteria {
        budget_overlap: BudgetRange {
            min: 1200,
            max: 1800,
        },
        common_cities: ["Toronto".to_string()].into_iter().collect(),
        date_range: DateRange {
            earliest: date(2024, 6, 1),
            latest: date(2024, 6, 20),
            is_compatible: true,
        },
    }
}

fn record(id: &str, members: &[&str], combined: u8) -> PersistedSuggestion {
    PersistedSuggestion {
        id: SuggestionId(id.to_string()),
        target_user_id: UserId::new("target"),
        suggested_users: members.iter().map(|member| UserId::new(*member)).collect(),
        practical_score: 57,
        compatibility_score: 70,
        trust_score: 50,
        combined_score: combined,
        match_criteria: criteria(),
        status: SuggestionStatus::Active,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

fn profiles_for(ids: &[&str]) -> MemoryProfiles {
    let mut profiles = MemoryProfiles::default();
    for id in ids {
        profiles.display.insert(UserId::new(*id), display(id));
    }
    profiles
}

#[test]
fn hydrates_all_suggestions_with_one_profile_lookup() {
    let profiles = Arc::new(profiles_for(&["a", "b", "c"]));
    let hydrator = SuggestionHydrator::new(profiles.clone());

    let hydrated = hydrator
        .hydrate(vec![
            record("sug-1", &["a", "b"], 80),
            record("sug-2", &["b", "c"], 70),
        ])
        .expect("hydration succeeds");

    assert_eq!(profiles.display_calls(), 1);
    assert_eq!(hydrated.len(), 2);
    assert_eq!(hydrated[0].suggestion_id, SuggestionId("sug-1".to_string()));
    let names: Vec<&str> = hydrated[1]
        .members
        .iter()
        .map(|member| member.name.as_str())
        .collect();
    assert_eq!(names, vec!["Name b", "Name c"]);
    assert_eq!(hydrated[0].combined_score, 80);
    assert_eq!(hydrated[0].match_criteria, criteria());
}

#[test]
fn members_without_display_profile_are_omitted() {
    let profiles = Arc::new(profiles_for(&["a"]));
    let hydrator = SuggestionHydrator::new(profiles);

    let hydrated = hydrator
        .hydrate(vec![record("sug-1", &["a", "gone"], 80)])
        .expect("hydration succeeds");

    assert_eq!(hydrated[0].members.len(), 1);
    assert_eq!(hydrated[0].members[0].user_id, UserId::new("a"));
}

#[test]
fn empty_input_skips_the_profile_lookup() {
    let profiles = Arc::new(profiles_for(&["a"]));
    let hydrator = SuggestionHydrator::new(profiles.clone());

    let hydrated = hydrator.hydrate(Vec::new()).expect("hydration succeeds");

    assert!(hydrated.is_empty());
    assert_eq!(profiles.display_calls(), 0);
}

#[test]
fn retrieval_returns_best_active_suggestions_up_to_the_limit() {
    let mut profiles = profiles_for(&[]);
    let ids: Vec<String> = (0..25).map(|n| format!("m-{n}")).collect();
    for id in &ids {
        profiles.display.insert(UserId::new(id.as_str()), display(id));
    }
    let (service, profiles, _, suggestions) =
        build_service(profiles, ScriptedScorer::default(), matching_config());

    let records: Vec<PersistedSuggestion> = ids
        .iter()
        .enumerate()
        .map(|(n, id)| record(&format!("sug-{n}"), &[id.as_str()], n as u8))
        .collect();
    suggestions.insert_all(records).expect("seed suggestions");
    let dismissed = SuggestionId("sug-24".to_string());
    suggestions
        .update_status(&dismissed, SuggestionStatus::Dismissed)
        .expect("dismiss seed");

    let hydrated = service
        .suggestions_with_profiles(&UserId::new("target"))
        .expect("retrieval succeeds");

    assert_eq!(hydrated.len(), 20);
    assert_eq!(hydrated[0].combined_score, 23);
    assert!(hydrated
        .windows(2)
        .all(|pair| pair[0].combined_score >= pair[1].combined_score));
    assert!(hydrated.iter().all(|item| item.suggestion_id != dismissed));
    assert_eq!(profiles.display_calls(), 1);
}
