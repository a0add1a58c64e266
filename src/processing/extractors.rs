// Field extraction from raw OCR text: labeled-line fields and NIK identifiers

use crate::models::{DocumentRules, ExtractedField, ExtractedFields};
use crate::utils::KtpError;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // A NIK is exactly 16 digits not touching another word character
    static ref NIK_PATTERN: Regex = Regex::new(r"\b([0-9]{16})\b").unwrap();

    static ref KTP_EXTRACTOR: FieldExtractor = FieldExtractor::new(&DocumentRules::ktp())
        .expect("built-in KTP rules are valid");
}

#[derive(Clone)]
struct CompiledRule {
    label: String,
    regex: Regex,
}

/// Applies a document's labeled-line rules to recognized text.
#[derive(Clone)]
pub struct FieldExtractor {
    rules: Vec<CompiledRule>,
}

impl FieldExtractor {
    pub fn new(rules: &DocumentRules) -> Result<Self, KtpError> {
        let rules = rules
            .fields
            .iter()
            .map(|rule| {
                let regex = Regex::new(rule.pattern).map_err(|e| {
                    KtpError::ConfigError(format!("Invalid pattern for {}: {}", rule.label, e))
                })?;
                if regex.captures_len() < 2 {
                    return Err(KtpError::ConfigError(format!(
                        "Pattern for {} has no capture group",
                        rule.label
                    )));
                }
                Ok(CompiledRule {
                    label: rule.label.to_string(),
                    regex,
                })
            })
            .collect::<Result<Vec<_>, KtpError>>()?;

        Ok(FieldExtractor { rules })
    }

    /// Extractor for the built-in KTP rules, compiled once per process.
    pub fn ktp() -> Self {
        KTP_EXTRACTOR.clone()
    }

    /// One entry per rule; the first match wins, a missing label yields `None`.
    pub fn extract_fields(&self, text: &str) -> ExtractedFields {
        let fields = self
            .rules
            .iter()
            .map(|rule| ExtractedField {
                label: rule.label.clone(),
                value: rule
                    .regex
                    .captures(text)
                    .and_then(|captures| captures.get(1))
                    .map(|value| value.as_str().trim().to_string()),
            })
            .collect();

        ExtractedFields { fields }
    }

    /// All 16-digit NIK candidates in document order, duplicates kept.
    pub fn extract_identifiers(text: &str) -> Vec<String> {
        NIK_PATTERN
            .captures_iter(text)
            .filter_map(|captures| captures.get(1))
            .map(|nik| nik.as_str().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldRule;

    const SAMPLE: &str = "PROVINSI JAWA BARAT\nKABUPATEN BANDUNG\nNIK : 3204123456789012\n\
        Nama : SITI AMINAH\nTempat/Tgl Lahir : BANDUNG, 17-08-1985\n\
        Jenis Kelamin : PEREMPUAN Gol. Darah : B\nAlamat : JL MERDEKA NO 5\n\
        Agama : ISLAM\nStatus Perkawinan : KAWIN\nPekerjaan : WIRASWASTA\n";

    #[test]
    fn test_extract_all_ktp_fields() {
        let fields = FieldExtractor::ktp().extract_fields(SAMPLE);
        let value = |label: &str| fields.get(label).unwrap().value.clone();

        assert_eq!(fields.len(), 7);
        assert_eq!(value("Nama").as_deref(), Some("SITI AMINAH"));
        assert_eq!(value("Tempat/Tgl Lahir").as_deref(), Some("BANDUNG, 17-08-1985"));
        assert_eq!(value("Jenis Kelamin").as_deref(), Some("PEREMPUAN Gol. Darah : B"));
        assert_eq!(value("Agama").as_deref(), Some("ISLAM"));
        assert_eq!(value("Status Perkawinan").as_deref(), Some("KAWIN"));
        assert_eq!(value("Pekerjaan").as_deref(), Some("WIRASWASTA"));
        assert_eq!(value("Gol Darah").as_deref(), Some("B"));
    }

    #[test]
    fn test_place_of_birth_label_variants() {
        for text in [
            "Tempat/Tgl Lahir: JAKARTA",
            "TempatTgl Lahir JAKARTA",
            "tempat tgl lahir : JAKARTA",
        ] {
            let fields = FieldExtractor::ktp().extract_fields(text);
            assert_eq!(
                fields.get("Tempat/Tgl Lahir").unwrap().value.as_deref(),
                Some("JAKARTA"),
                "label variant {:?}",
                text
            );
        }
    }

    #[test]
    fn test_blood_type_label_variants() {
        for text in ["Gol. Darah: AB", "Gol Darah AB", "GolDarah : AB", "gol.darah AB"] {
            let fields = FieldExtractor::ktp().extract_fields(text);
            assert_eq!(fields.get("Gol Darah").unwrap().value.as_deref(), Some("AB"));
        }
    }

    #[test]
    fn test_first_label_wins() {
        let fields = FieldExtractor::ktp().extract_fields("Agama: ISLAM\nAgama: KRISTEN");
        assert_eq!(fields.get("Agama").unwrap().value.as_deref(), Some("ISLAM"));
    }

    #[test]
    fn test_no_labels_gives_all_sentinels() {
        for text in ["", "PROVINSI DKI JAKARTA\n3171 0000", "\n\n\n"] {
            let fields = FieldExtractor::ktp().extract_fields(text);
            assert_eq!(fields.len(), 7);
            assert_eq!(fields.found_count(), 0);
            assert!(fields.fields.iter().all(|f| f.display_value() == "Tidak ditemukan"));
        }
    }

    #[test]
    fn test_identifiers_in_order_with_duplicates() {
        let text = "NIK 1234567812345678 lama 9999888877776666\nNIK 1234567812345678";
        let niks = FieldExtractor::extract_identifiers(text);
        assert_eq!(
            niks,
            vec!["1234567812345678", "9999888877776666", "1234567812345678"]
        );
        assert_eq!(FieldExtractor::extract_identifiers(text), niks);
    }

    #[test]
    fn test_identifier_length_must_be_exact() {
        assert!(FieldExtractor::extract_identifiers("123456781234567").is_empty());
        assert!(FieldExtractor::extract_identifiers("12345678123456789").is_empty());
        assert!(FieldExtractor::extract_identifiers("NIK: 3171-0123-4567-8901").is_empty());
        assert!(FieldExtractor::extract_identifiers("").is_empty());
        assert_eq!(
            FieldExtractor::extract_identifiers("NIK:3171012345678901."),
            vec!["3171012345678901"]
        );
    }

    #[test]
    fn test_custom_rules() {
        let rules = DocumentRules {
            document_type: "SIM",
            fields: vec![FieldRule {
                label: "No. SIM",
                pattern: r"(?i)No\.?\s*SIM\s*:?\s*(.*)",
            }],
        };
        let extractor = FieldExtractor::new(&rules).unwrap();
        let fields = extractor.extract_fields("no sim: 1234-5678");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("No. SIM").unwrap().value.as_deref(), Some("1234-5678"));
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let rules = DocumentRules {
            document_type: "broken",
            fields: vec![FieldRule {
                label: "Nama",
                pattern: r"Nama\s*:?\s*.*",
            }],
        };
        assert!(matches!(
            FieldExtractor::new(&rules),
            Err(KtpError::ConfigError(_))
        ));
    }
}
