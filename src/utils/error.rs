use thiserror::Error;

#[derive(Debug, Error)]
pub enum KtpError {
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Image decode error: {0}")]
    DecodeError(String),
    #[error("Image processing error: {0}")]
    ImageProcessingError(String),
    #[error("OCR error: {0}")]
    OcrError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl KtpError {
    /// Stable classification used by callers to pick a user-facing message.
    pub fn kind(&self) -> &'static str {
        match self {
            KtpError::UnsupportedFormat(_) => "unsupported_format",
            KtpError::DecodeError(_) => "decode",
            KtpError::ImageProcessingError(_) => "image_processing",
            KtpError::OcrError(_) => "ocr",
            KtpError::IoError(_) => "io",
            KtpError::ConfigError(_) => "config",
        }
    }
}

impl From<std::io::Error> for KtpError {
    fn from(err: std::io::Error) -> Self {
        KtpError::IoError(err.to_string())
    }
}
