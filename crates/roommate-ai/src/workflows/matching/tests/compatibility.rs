use super::common::*;
use crate::workflows::matching::compatibility::CompatibilityBatchClient;
use crate::workflows::matching::domain::UserId;
use std::sync::Arc;

fn group(ids: &[&str]) -> Vec<UserId> {
    ids.iter().map(|id| UserId::new(*id)).collect()
}

#[test]
fn scores_are_correlated_by_position_across_shuffles() {
    let scorer = Arc::new(ScriptedScorer::with_scores(&[("a", 90.0), ("b", 40.0), ("c", 10.0)]));
    let client = CompatibilityBatchClient::new(scorer.clone());

    let ordered = vec![group(&["t", "a"]), group(&["t", "b"]), group(&["t", "c"])];
    let shuffled = vec![group(&["t", "c"]), group(&["t", "a"]), group(&["t", "b"])];

    assert_eq!(client.score_all(&ordered), vec![90, 40, 10]);
    assert_eq!(client.score_all(&shuffled), vec![10, 90, 40]);
    assert_eq!(scorer.batches().len(), 2, "one remote call per batch");
}

#[test]
fn failed_batch_defaults_every_group_to_zero() {
    let scorer = Arc::new(ScriptedScorer::failing());
    let client = CompatibilityBatchClient::new(scorer.clone());

    let scores = client.score_all(&[group(&["t", "a"]), group(&["t", "b"])]);

    assert_eq!(scores, vec![0, 0]);
    assert_eq!(scorer.batches().len(), 1);
}

#[test]
fn missing_indices_default_to_zero() {
    let mut scorer = ScriptedScorer::with_scores(&[("a", 80.0), ("b", 70.0), ("c", 60.0)]);
    scorer.skip_indices.insert(1);
    let client = CompatibilityBatchClient::new(Arc::new(scorer));

    let scores = client.score_all(&[group(&["a"]), group(&["b"]), group(&["c"])]);

    assert_eq!(scores, vec![80, 0, 60]);
}

#[test]
fn out_of_range_scores_are_clamped() {
    let scorer = ScriptedScorer::with_scores(&[("a", 150.0), ("b", -20.0), ("c", 66.6)]);
    let client = CompatibilityBatchClient::new(Arc::new(scorer));

    let scores = client.score_all(&[group(&["a"]), group(&["b"]), group(&["c"])]);

    assert_eq!(scores, vec![100, 0, 67]);
}

#[test]
fn empty_batch_skips_the_remote_call() {
    let scorer = Arc::new(ScriptedScorer::default());
    let client = CompatibilityBatchClient::new(scorer.clone());

    assert!(client.score_all(&[]).is_empty());
    assert!(scorer.batches().is_empty());
}
