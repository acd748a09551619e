//! Local stand-in for the lifestyle compatibility service.
//!
//! Each seeker answers the same short questionnaire on a 1-5 scale. A group's score is the mean
//! pairwise similarity of its members' answers, scaled to 0-100.

use roommate_ai::workflows::matching::{
    CompatibilityError, CompatibilityScorer, GroupScore, ProfileImportError, UserId,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::infra::SAMPLE_LIFESTYLE;

const ANSWER_MIN: u8 = 1;
const ANSWER_MAX: u8 = 5;

type Answers = [u8; 5];

#[derive(Debug, Default, Clone)]
pub(crate) struct LifestyleScorer {
    answers: HashMap<UserId, Answers>,
}

#[derive(Debug, Deserialize)]
struct LifestyleRow {
    #[serde(rename = "User ID")]
    user_id: String,
    #[serde(rename = "Cleanliness")]
    cleanliness: u8,
    #[serde(rename = "Noise")]
    noise: u8,
    #[serde(rename = "Schedule")]
    schedule: u8,
    #[serde(rename = "Guests")]
    guests: u8,
    #[serde(rename = "Pets")]
    pets: u8,
}

impl LifestyleScorer {
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, ProfileImportError> {
        match path {
            Some(path) => Self::from_reader(std::fs::File::open(path)?),
            None => Self::from_reader(SAMPLE_LIFESTYLE.as_bytes()),
        }
    }

    pub(crate) fn from_reader<R: Read>(reader: R) -> Result<Self, ProfileImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut answers = HashMap::new();

        for (index, record) in csv_reader.deserialize::<LifestyleRow>().enumerate() {
            let row = record?;
            let line = index as u64 + 2;
            let values = [row.cleanliness, row.noise, row.schedule, row.guests, row.pets];
            if let Some(value) = values
                .iter()
                .find(|value| !(ANSWER_MIN..=ANSWER_MAX).contains(*value))
            {
                return Err(ProfileImportError::InvalidRow {
                    line,
                    reason: format!("lifestyle answer {value} outside {ANSWER_MIN}-{ANSWER_MAX}"),
                });
            }
            answers.insert(UserId(row.user_id), values);
        }

        Ok(Self { answers })
    }

    pub(crate) fn len(&self) -> usize {
        self.answers.len()
    }

    /// `None` when any member skipped the questionnaire.
    fn group_score(&self, members: &[UserId]) -> Option<f64> {
        let answers: Vec<&Answers> = members
            .iter()
            .map(|member| self.answers.get(member))
            .collect::<Option<_>>()?;
        if answers.len() < 2 {
            return None;
        }

        let mut total = 0.0;
        let mut pairs = 0u32;
        for (index, left) in answers.iter().enumerate() {
            for right in &answers[index + 1..] {
                total += similarity(left, right);
                pairs += 1;
            }
        }
        Some(total / f64::from(pairs) * 100.0)
    }
}

fn similarity(left: &Answers, right: &Answers) -> f64 {
    let distance: u32 = left
        .iter()
        .zip(right)
        .map(|(a, b)| u32::from(a.abs_diff(*b)))
        .sum();
    let max_distance = u32::from(ANSWER_MAX - ANSWER_MIN) * left.len() as u32;
    1.0 - f64::from(distance) / f64::from(max_distance)
}

impl CompatibilityScorer for LifestyleScorer {
    fn score_groups(&self, groups: &[Vec<UserId>]) -> Result<Vec<GroupScore>, CompatibilityError> {
        Ok(groups
            .iter()
            .enumerate()
            .filter_map(|(group_index, members)| {
                self.group_score(members)
                    .map(|score| GroupScore { group_index, score })
            })
            .collect())
    }
}
