use crate::processing::ImageProcessor;
use crate::utils::config::OcrConfig;
use crate::utils::KtpError;
use image::GrayImage;
use log::{debug, warn};
use std::path::PathBuf;
use tesseract::Tesseract;

/// An OCR capability: turns an encoded image into text using the requested language model,
/// or the engine's default model when `language` is `None`.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image_png: &[u8], language: Option<&str>) -> Result<String, KtpError>;
}

impl<R: TextRecognizer + ?Sized> TextRecognizer for Box<R> {
    fn recognize(&self, image_png: &[u8], language: Option<&str>) -> Result<String, KtpError> {
        (**self).recognize(image_png, language)
    }
}

/// Tesseract-backed recognizer. A fresh engine is initialized per call so the handle is never
/// shared between concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct TesseractEngine {
    datapath: Option<PathBuf>,
}

impl TesseractEngine {
    /// `datapath` is the tessdata directory; `None` uses the engine's own search path.
    pub fn new(datapath: Option<PathBuf>) -> Self {
        TesseractEngine { datapath }
    }
}

impl TextRecognizer for TesseractEngine {
    fn recognize(&self, image_png: &[u8], language: Option<&str>) -> Result<String, KtpError> {
        let datapath = match &self.datapath {
            Some(path) => Some(path.to_str().ok_or_else(|| {
                KtpError::OcrError(format!("Tessdata path is not valid UTF-8: {:?}", path))
            })?),
            None => None,
        };

        let text = Tesseract::new(datapath, language)
            .map_err(|e| KtpError::OcrError(format!("Tesseract init error: {}", e)))?
            .set_image_from_mem(image_png)
            .map_err(|e| KtpError::OcrError(format!("Tesseract set image error: {}", e)))?
            .get_text()
            .map_err(|e| KtpError::OcrError(format!("Tesseract error: {}", e)))?;

        Ok(text)
    }
}

/// OcrProcessor runs recognition with the document's language model and retries once with
/// the fallback model when that fails.
pub struct OcrProcessor<R> {
    recognizer: R,
    language: String,
    fallback_language: Option<String>,
}

impl<R: TextRecognizer> OcrProcessor<R> {
    pub fn new(recognizer: R, config: &OcrConfig) -> Self {
        OcrProcessor {
            recognizer,
            language: config.language.clone(),
            fallback_language: config.fallback_language.clone(),
        }
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    pub fn recognize(&self, image: &GrayImage) -> Result<String, KtpError> {
        let image_png = ImageProcessor::encode_png(image)?;

        let text = match self.recognizer.recognize(&image_png, Some(&self.language)) {
            Ok(text) => text,
            Err(err) => {
                warn!(
                    "OCR with lang='{}' failed: {}, trying {}",
                    self.language,
                    err,
                    self.fallback_language
                        .as_deref()
                        .map(|lang| format!("lang='{}'", lang))
                        .unwrap_or_else(|| "default lang".to_string())
                );
                self.recognizer
                    .recognize(&image_png, self.fallback_language.as_deref())
                    .map_err(|e| match e {
                        KtpError::OcrError(_) => e,
                        other => KtpError::OcrError(other.to_string()),
                    })?
            }
        };

        debug!("OCR result:\n{}", text);
        Ok(text)
    }
}
