use std::collections::BTreeSet;

use super::config::MatchingConfig;
use super::domain::{BudgetRange, CandidateGroup, CandidateProfile, DateRange, PracticalMatchResult};

const BUDGET_SHARE: f64 = 0.4;
const CITY_SHARE: f64 = 0.3;
const DATE_SHARE: f64 = 0.3;
const SATURATING_CITY_COUNT: f64 = 3.0;

/// Apply the budget, city, and move-in gates to a group and score the survivors.
///
/// Gates run in order and the first failure short-circuits: an empty or too-narrow budget
/// overlap, no shared preferred city, then a move-in spread wider than
/// `max_date_difference_days`.
pub fn evaluate_practical(
    group: &CandidateGroup<'_>,
    config: &MatchingConfig,
) -> PracticalMatchResult {
    let members = group.members();

    let Some(overlap) = budget_overlap(members) else {
        return PracticalMatchResult::rejected(None, BTreeSet::new(), None);
    };
    let overlap_percent = overlap_percent(&overlap, members);
    if overlap_percent < config.min_budget_overlap_percent {
        return PracticalMatchResult::rejected(Some(overlap), BTreeSet::new(), None);
    }

    let shared = common_cities(members);
    if shared.is_empty() {
        return PracticalMatchResult::rejected(Some(overlap), shared, None);
    }

    let Some(dates) = date_range(members, config.max_date_difference_days) else {
        return PracticalMatchResult::rejected(Some(overlap), shared, None);
    };
    if !dates.is_compatible {
        return PracticalMatchResult::rejected(Some(overlap), shared, Some(dates));
    }

    let budget_score = overlap_percent.min(100.0);
    let city_score = (shared.len() as f64 / SATURATING_CITY_COUNT * 100.0).min(100.0);
    let date_score = date_score(dates.spread_days(), config.max_date_difference_days);
    let weighted = BUDGET_SHARE * budget_score + CITY_SHARE * city_score + DATE_SHARE * date_score;

    PracticalMatchResult {
        passes: true,
        score: weighted.round().clamp(0.0, 100.0) as u8,
        budget_overlap: Some(overlap),
        common_cities: shared,
        date_range: Some(dates),
    }
}

/// `[max(mins), min(maxes)]` across the group, or `None` when the ranges do not meet.
pub fn budget_overlap(members: &[&CandidateProfile]) -> Option<BudgetRange> {
    let min = members.iter().map(|m| m.seeking.budget_min).max()?;
    let max = members.iter().map(|m| m.seeking.budget_max).min()?;
    (min <= max).then_some(BudgetRange { min, max })
}

/// Overlap width as a percentage of the narrowest member range; 100 for a zero-width range.
pub fn overlap_percent(overlap: &BudgetRange, members: &[&CandidateProfile]) -> f64 {
    let narrowest = members
        .iter()
        .map(|member| member.seeking.budget_width())
        .min()
        .unwrap_or(0);
    if narrowest == 0 {
        return 100.0;
    }
    overlap.width() as f64 / narrowest as f64 * 100.0
}

/// Cities every member prefers. Comparison ignores case and surrounding whitespace; the
/// spelling of the first member (the target) is kept.
pub fn common_cities(members: &[&CandidateProfile]) -> BTreeSet<String> {
    let Some((first, rest)) = members.split_first() else {
        return BTreeSet::new();
    };

    let folded: Vec<BTreeSet<String>> = rest
        .iter()
        .map(|member| {
            member
                .seeking
                .preferred_cities
                .iter()
                .map(|city| fold_city(city))
                .collect()
        })
        .collect();

    first
        .seeking
        .preferred_cities
        .iter()
        .filter(|city| {
            let key = fold_city(city);
            !key.is_empty() && folded.iter().all(|cities| cities.contains(&key))
        })
        .map(|city| city.trim().to_string())
        .collect()
}

fn fold_city(city: &str) -> String {
    city.trim().to_lowercase()
}

/// Earliest and latest move-in dates; the boundary spread equal to the limit is compatible.
pub fn date_range(members: &[&CandidateProfile], max_difference_days: u32) -> Option<DateRange> {
    let earliest = members.iter().map(|m| m.seeking.move_in_date).min()?;
    let latest = members.iter().map(|m| m.seeking.move_in_date).max()?;
    let spread = (latest - earliest).num_days();
    Some(DateRange {
        earliest,
        latest,
        is_compatible: spread <= i64::from(max_difference_days),
    })
}

fn date_score(spread_days: i64, max_difference_days: u32) -> f64 {
    if max_difference_days == 0 {
        return 100.0;
    }
    (100.0 - spread_days as f64 / f64::from(max_difference_days) * 100.0).max(0.0)
}
