use serde::Serialize;

/// A labeled-line extraction rule: `pattern` must contain exactly one capture group
/// holding the field value.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub label: &'static str,
    pub pattern: &'static str,
}

/// Extraction rules for one document type.
#[derive(Debug, Clone)]
pub struct DocumentRules {
    pub document_type: &'static str,
    pub fields: Vec<FieldRule>,
}

impl DocumentRules {
    /// Indonesian national identity card (KTP).
    pub fn ktp() -> Self {
        let fields = vec![
            FieldRule {
                label: "Nama",
                pattern: r"(?i)Nama\s*:?\s*(.*)",
            },
            // Tempat/Tgl Lahir, TempatTgl Lahir and Tempat Tgl Lahir all occur in OCR output
            FieldRule {
                label: "Tempat/Tgl Lahir",
                pattern: r"(?i)Tempat[/ ]?Tgl Lahir\s*:?\s*(.*)",
            },
            FieldRule {
                label: "Jenis Kelamin",
                pattern: r"(?i)Jenis Kelamin\s*:?\s*(.*)",
            },
            FieldRule {
                label: "Agama",
                pattern: r"(?i)Agama\s*:?\s*(.*)",
            },
            FieldRule {
                label: "Status Perkawinan",
                pattern: r"(?i)Status Perkawinan\s*:?\s*(.*)",
            },
            FieldRule {
                label: "Pekerjaan",
                pattern: r"(?i)Pekerjaan\s*:?\s*(.*)",
            },
            FieldRule {
                label: "Gol Darah",
                pattern: r"(?i)Gol\.?\s?Darah\s*:?\s*(.*)",
            },
        ];

        DocumentRules {
            document_type: "KTP",
            fields,
        }
    }
}

/// Fields whose user-supplied claims are checked against the recognized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimField {
    Name,
    PlaceDateOfBirth,
    Address,
    Religion,
    BloodType,
}

impl ClaimField {
    pub const ALL: [ClaimField; 5] = [
        ClaimField::Name,
        ClaimField::PlaceDateOfBirth,
        ClaimField::Address,
        ClaimField::Religion,
        ClaimField::BloodType,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ClaimField::Name => "Nama",
            ClaimField::PlaceDateOfBirth => "Tempat/Tgl Lahir",
            ClaimField::Address => "Alamat",
            ClaimField::Religion => "Agama",
            ClaimField::BloodType => "Gol Darah",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_ktp_rules_compile_with_one_group() {
        let rules = DocumentRules::ktp();
        assert_eq!(rules.fields.len(), 7);
        for rule in &rules.fields {
            let regex = Regex::new(rule.pattern).unwrap();
            assert_eq!(regex.captures_len(), 2, "{} should capture one group", rule.label);
        }
    }

    #[test]
    fn test_claim_labels_are_distinct() {
        let mut labels: Vec<_> = ClaimField::ALL.iter().map(|f| f.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), 5);
    }
}
