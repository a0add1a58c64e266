use crate::models::ClaimField;
use crate::utils::KtpError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of matched claims required for a successful verdict.
pub const MATCH_THRESHOLD: usize = 3;
/// Images whose longer side is below this are upsampled before OCR.
pub const MIN_LONG_SIDE: u32 = 1000;
/// Longer side after upsampling.
pub const TARGET_LONG_SIDE: u32 = 1600;
/// Upload size limit enforced by the command-line front end.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub ocr: OcrConfig,
    pub image: ImageConfig,
    pub verdict: VerdictConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract language pack tried first.
    pub language: String,
    /// Language for the retry; `None` lets the engine pick its default model.
    pub fallback_language: Option<String>,
    /// Directory containing `*.traineddata`; `None` uses the engine's search path.
    pub tessdata_path: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        OcrConfig {
            language: "ind".to_string(),
            fallback_language: None,
            tessdata_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub min_long_side: u32,
    pub target_long_side: u32,
    /// Fraction of pixels ignored at each end of the histogram when stretching contrast.
    pub contrast_cutoff: f32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        ImageConfig {
            min_long_side: MIN_LONG_SIDE,
            target_long_side: TARGET_LONG_SIDE,
            contrast_cutoff: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerdictConfig {
    pub match_threshold: usize,
}

impl Default for VerdictConfig {
    fn default() -> Self {
        VerdictConfig {
            match_threshold: MATCH_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_file_size: u64,
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            max_file_size: MAX_FILE_SIZE,
            allowed_extensions: ["png", "jpg", "jpeg", "bmp"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl UploadConfig {
    pub fn is_allowed(&self, extension: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }
}

impl PipelineConfig {
    /// Load a JSON configuration file; missing keys fall back to defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, KtpError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| KtpError::ConfigError(format!("Failed to read {:?}: {}", path, e)))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, KtpError> {
        let config: PipelineConfig = serde_json::from_str(raw)
            .map_err(|e| KtpError::ConfigError(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), KtpError> {
        if self.ocr.language.trim().is_empty() {
            return Err(KtpError::ConfigError("ocr.language must not be empty".to_string()));
        }
        if self.image.target_long_side == 0 {
            return Err(KtpError::ConfigError(
                "image.target_long_side must be positive".to_string(),
            ));
        }
        if self.image.target_long_side < self.image.min_long_side {
            return Err(KtpError::ConfigError(format!(
                "image.target_long_side {} is below image.min_long_side {}",
                self.image.target_long_side, self.image.min_long_side
            )));
        }
        if !(0.0..0.5).contains(&self.image.contrast_cutoff) {
            return Err(KtpError::ConfigError(format!(
                "image.contrast_cutoff must be in [0.0, 0.5), got {}",
                self.image.contrast_cutoff
            )));
        }
        if self.verdict.match_threshold > ClaimField::ALL.len() {
            return Err(KtpError::ConfigError(format!(
                "verdict.match_threshold {} exceeds the {} checked fields",
                self.verdict.match_threshold,
                ClaimField::ALL.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_ktp_policy() {
        let config = PipelineConfig::default();
        assert_eq!(config.ocr.language, "ind");
        assert!(config.ocr.fallback_language.is_none());
        assert_eq!(config.image.min_long_side, 1000);
        assert_eq!(config.image.target_long_side, 1600);
        assert_eq!(config.verdict.match_threshold, 3);
        assert!(config.upload.is_allowed("JPG"));
        assert!(!config.upload.is_allowed("gif"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json(r#"{"verdict": {"match_threshold": 4}}"#).unwrap();
        assert_eq!(config.verdict.match_threshold, 4);
        assert_eq!(config.ocr.language, "ind");
        assert_eq!(config.upload.max_file_size, MAX_FILE_SIZE);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = PipelineConfig::from_json(r#"{"verdict": {"match_threshold": 6}}"#).unwrap_err();
        assert_eq!(err.kind(), "config");

        let err = PipelineConfig::from_json(r#"{"image": {"contrast_cutoff": 0.7}}"#).unwrap_err();
        assert_eq!(err.kind(), "config");

        let err = PipelineConfig::from_json(
            r#"{"image": {"min_long_side": 2000, "target_long_side": 1600}}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), "config");

        let err = PipelineConfig::from_json("not json").unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ktpcheck.json");
        std::fs::write(&path, r#"{"ocr": {"language": "eng", "fallback_language": "osd"}}"#)
            .unwrap();
        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.fallback_language.as_deref(), Some("osd"));

        let missing = PipelineConfig::from_file(dir.path().join("absent.json")).unwrap_err();
        assert_eq!(missing.kind(), "config");
    }
}
