pub mod extractors;
pub mod image;
pub mod ocr;

pub use extractors::FieldExtractor;
pub use self::image::ImageProcessor;
pub use ocr::{OcrProcessor, TesseractEngine, TextRecognizer};
