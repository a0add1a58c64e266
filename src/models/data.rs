use crate::models::ClaimField;
use serde::{Serialize, Serializer};
use std::fmt;

/// Rendered in place of a field value the extractor could not find.
pub const NOT_FOUND: &str = "Tidak ditemukan";

/// The five values a user asserts about their card, trimmed of surrounding whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClaimSet {
    pub name: String,
    pub place_date_of_birth: String,
    pub address: String,
    pub religion: String,
    pub blood_type: String,
}

impl ClaimSet {
    pub fn new(
        name: &str,
        place_date_of_birth: &str,
        address: &str,
        religion: &str,
        blood_type: &str,
    ) -> Self {
        ClaimSet {
            name: name.trim().to_string(),
            place_date_of_birth: place_date_of_birth.trim().to_string(),
            address: address.trim().to_string(),
            religion: religion.trim().to_string(),
            blood_type: blood_type.trim().to_string(),
        }
    }

    pub fn get(&self, field: ClaimField) -> &str {
        match field {
            ClaimField::Name => &self.name,
            ClaimField::PlaceDateOfBirth => &self.place_date_of_birth,
            ClaimField::Address => &self.address,
            ClaimField::Religion => &self.religion,
            ClaimField::BloodType => &self.blood_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedField {
    pub label: String,
    #[serde(serialize_with = "serialize_or_not_found")]
    pub value: Option<String>,
}

fn serialize_or_not_found<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or(NOT_FOUND))
}

impl ExtractedField {
    pub fn display_value(&self) -> &str {
        self.value.as_deref().unwrap_or(NOT_FOUND)
    }
}

/// One entry per extraction rule, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtractedFields {
    pub fields: Vec<ExtractedField>,
}

impl ExtractedFields {
    pub fn get(&self, label: &str) -> Option<&ExtractedField> {
        self.fields.iter().find(|field| field.label == label)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn found_count(&self) -> usize {
        self.fields.iter().filter(|field| field.value.is_some()).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchStatus {
    #[serde(rename = "Cocok")]
    Matched,
    #[serde(rename = "Tidak Cocok")]
    Unmatched,
}

impl MatchStatus {
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchStatus::Matched)
    }
}

impl From<bool> for MatchStatus {
    fn from(matched: bool) -> Self {
        if matched {
            MatchStatus::Matched
        } else {
            MatchStatus::Unmatched
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MatchStatus::Matched => write!(f, "Cocok"),
            MatchStatus::Unmatched => write!(f, "Tidak Cocok"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimCheck {
    pub field: ClaimField,
    pub label: &'static str,
    pub claim: String,
    pub status: MatchStatus,
}

/// Per-claim results, always one entry for each of [`ClaimField::ALL`] in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MatchVerdict {
    pub checks: Vec<ClaimCheck>,
}

impl MatchVerdict {
    pub fn status(&self, field: ClaimField) -> Option<MatchStatus> {
        self.checks
            .iter()
            .find(|check| check.field == field)
            .map(|check| check.status)
    }

    pub fn matched_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|check| check.status.is_matched())
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub matched: usize,
    pub threshold: usize,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub extracted_fields: ExtractedFields,
    pub identifiers: Vec<String>,
    pub matches: MatchVerdict,
    pub verdict: Verdict,
    pub text: String,
}
