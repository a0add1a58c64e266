use crate::models::*;
use crate::processing::*;
use crate::utils::{KtpError, PipelineConfig};
use crate::validation::*;
use log::info;

/// KtpValidator runs the whole pipeline for one card photo: normalize, recognize,
/// extract fields and identifiers, check claims, aggregate.
///
/// It holds no per-request state, so one instance can serve concurrent requests.
pub struct KtpValidator<R = TesseractEngine> {
    image_processor: ImageProcessor,
    ocr: OcrProcessor<R>,
    extractor: FieldExtractor,
    aggregator: VerdictAggregator,
}

impl KtpValidator<TesseractEngine> {
    pub fn new(config: &PipelineConfig) -> Result<Self, KtpError> {
        let engine = TesseractEngine::new(config.ocr.tessdata_path.clone());
        Self::with_recognizer(engine, config)
    }
}

impl<R: TextRecognizer> KtpValidator<R> {
    pub fn with_recognizer(recognizer: R, config: &PipelineConfig) -> Result<Self, KtpError> {
        config.validate()?;
        Ok(KtpValidator {
            image_processor: ImageProcessor::new(config.image.clone()),
            ocr: OcrProcessor::new(recognizer, &config.ocr),
            extractor: FieldExtractor::ktp(),
            aggregator: VerdictAggregator::new(config.verdict.match_threshold),
        })
    }

    /// Replace the built-in KTP extraction rules.
    pub fn with_rules(mut self, rules: &DocumentRules) -> Result<Self, KtpError> {
        self.extractor = FieldExtractor::new(rules)?;
        Ok(self)
    }

    // Main evaluation function that orchestrates the entire process
    pub fn evaluate(
        &self,
        image_bytes: &[u8],
        file_extension: &str,
        claims: &ClaimSet,
    ) -> Result<EvaluationReport, KtpError> {
        // Step 1: Normalize the image
        let normalized = self.image_processor.normalize(image_bytes, file_extension)?;

        // Step 2: Recognize text
        let text = self.ocr.recognize(&normalized)?;

        // Step 3: Extract and check
        Ok(self.evaluate_text(text, claims))
    }

    /// The text-only half of the pipeline, for callers that already hold OCR output.
    pub fn evaluate_text(&self, text: String, claims: &ClaimSet) -> EvaluationReport {
        let identifiers = FieldExtractor::extract_identifiers(&text);
        info!("NIK found: {:?}", identifiers);

        let extracted_fields = self.extractor.extract_fields(&text);
        let matches = ClaimMatcher::check(&text, claims);
        let verdict = self.aggregator.aggregate(&matches);

        EvaluationReport {
            extracted_fields,
            identifiers,
            matches,
            verdict,
            text,
        }
    }
}
