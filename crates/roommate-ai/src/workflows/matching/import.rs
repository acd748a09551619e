use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::domain::{
    CandidateProfile, DisplayProfile, SeekingPreferences, UserId, VerificationLevel,
};

/// Seeker record recovered from a profile export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedProfile {
    pub candidate: CandidateProfile,
    pub display: DisplayProfile,
    pub discoverable: bool,
}

#[derive(Debug)]
pub enum ProfileImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: u64, reason: String },
}

impl std::fmt::Display for ProfileImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileImportError::Io(err) => write!(f, "failed to read profile export: {}", err),
            ProfileImportError::Csv(err) => write!(f, "invalid profile CSV data: {}", err),
            ProfileImportError::InvalidRow { line, reason } => {
                write!(f, "invalid profile on line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for ProfileImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProfileImportError::Io(err) => Some(err),
            ProfileImportError::Csv(err) => Some(err),
            ProfileImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for ProfileImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ProfileImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct ProfileImporter;

impl ProfileImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ImportedProfile>, ProfileImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ImportedProfile>, ProfileImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut profiles = Vec::new();

        for (index, record) in csv_reader.deserialize::<ProfileRow>().enumerate() {
            let row = record?;
            // header occupies line 1
            profiles.push(row.into_profile(index as u64 + 2)?);
        }

        Ok(profiles)
    }
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    #[serde(rename = "User ID")]
    user_id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Photo", default, deserialize_with = "empty_string_as_none")]
    photo: Option<String>,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "Province")]
    province: String,
    #[serde(rename = "Verification")]
    verification: String,
    #[serde(rename = "Budget Min")]
    budget_min: u32,
    #[serde(rename = "Budget Max")]
    budget_max: u32,
    #[serde(rename = "Move In")]
    move_in: String,
    #[serde(rename = "Preferred Cities")]
    preferred_cities: String,
    #[serde(
        rename = "Discoverable",
        default = "visible_by_default",
        deserialize_with = "flag"
    )]
    discoverable: bool,
}

impl ProfileRow {
    fn into_profile(self, line: u64) -> Result<ImportedProfile, ProfileImportError> {
        let invalid = |reason: String| ProfileImportError::InvalidRow { line, reason };

        if self.user_id.is_empty() {
            return Err(invalid("missing user id".to_string()));
        }
        let verification_level = VerificationLevel::parse(&self.verification)
            .ok_or_else(|| invalid(format!("unknown verification tier '{}'", self.verification)))?;
        if self.budget_min > self.budget_max {
            return Err(invalid(format!(
                "budget min {} exceeds budget max {}",
                self.budget_min, self.budget_max
            )));
        }
        let move_in_date = NaiveDate::parse_from_str(&self.move_in, "%Y-%m-%d")
            .map_err(|err| invalid(format!("move-in date '{}': {err}", self.move_in)))?;
        let preferred_cities: BTreeSet<String> = self
            .preferred_cities
            .split(';')
            .map(str::trim)
            .filter(|city| !city.is_empty())
            .map(str::to_string)
            .collect();
        if preferred_cities.is_empty() {
            return Err(invalid("no preferred cities".to_string()));
        }

        let user_id = UserId(self.user_id);
        Ok(ImportedProfile {
            candidate: CandidateProfile {
                user_id: user_id.clone(),
                verification_level,
                seeking: SeekingPreferences {
                    budget_min: self.budget_min,
                    budget_max: self.budget_max,
                    move_in_date,
                    preferred_cities,
                },
            },
            display: DisplayProfile {
                user_id,
                name: self.name,
                photo_url: self.photo,
                city: self.city,
                province: self.province,
            },
            discoverable: self.discoverable,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn visible_by_default() -> bool {
    true
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        None | Some("") | Some("true") | Some("yes") | Some("1") => Ok(true),
        Some("false") | Some("no") | Some("0") => Ok(false),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a yes/no flag, got '{other}'"
        ))),
    }
}
