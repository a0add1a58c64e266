use crate::utils::config::ImageConfig;
use crate::utils::KtpError;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, GrayImage, ImageEncoder, ImageFormat};
use imageproc::contrast::stretch_contrast;
use log::{debug, warn};
use std::io::Cursor;

/// Raster formats accepted for card photos.
pub const ACCEPTED_FORMATS: [ImageFormat; 3] = [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Bmp];

/// ImageProcessor turns an uploaded card photo into the grayscale image handed to OCR.
pub struct ImageProcessor {
    config: ImageConfig,
}

impl Default for ImageProcessor {
    fn default() -> Self {
        ImageProcessor::new(ImageConfig::default())
    }
}

impl ImageProcessor {
    pub fn new(config: ImageConfig) -> Self {
        ImageProcessor { config }
    }

    /// Decode, orient, grayscale, stretch contrast and upsample small images.
    pub fn normalize(&self, image_bytes: &[u8], extension: &str) -> Result<GrayImage, KtpError> {
        let img = Self::decode(image_bytes, extension)?;

        let orientation = Self::read_exif_orientation(image_bytes);
        if orientation != 1 {
            debug!("Applying EXIF orientation {}", orientation);
        }
        // Decoded pixels carry no metadata, so orienting here also strips it
        let img = Self::apply_orientation(img, orientation);

        let gray = img.to_luma8();
        let enhanced = Self::stretch_contrast(&gray, self.config.contrast_cutoff);
        let normalized = self.upsample(enhanced)?;

        debug!(
            "Normalized image {}x{} -> {}x{}",
            gray.width(),
            gray.height(),
            normalized.width(),
            normalized.height()
        );
        Ok(normalized)
    }

    /// Decode the byte stream, rejecting anything outside [`ACCEPTED_FORMATS`].
    pub fn decode(image_bytes: &[u8], extension: &str) -> Result<DynamicImage, KtpError> {
        let declared = ImageFormat::from_extension(extension)
            .filter(|format| ACCEPTED_FORMATS.contains(format))
            .ok_or_else(|| KtpError::UnsupportedFormat(format!("'.{}'", extension)))?;

        let actual = image::guess_format(image_bytes)
            .map_err(|e| KtpError::DecodeError(format!("Unrecognized image data: {}", e)))?;
        if !ACCEPTED_FORMATS.contains(&actual) {
            return Err(KtpError::DecodeError(format!(
                "Image content is {:?}, expected PNG, JPEG or BMP",
                actual
            )));
        }
        if actual != declared {
            warn!("Extension says {:?} but content is {:?}", declared, actual);
        }

        image::load_from_memory_with_format(image_bytes, actual)
            .map_err(|e| KtpError::DecodeError(format!("Failed to decode image: {}", e)))
    }

    /// Read EXIF tag 0x0112 (Orientation). Returns 1 (normal) when absent.
    pub fn read_exif_orientation(image_bytes: &[u8]) -> u32 {
        let mut cursor = Cursor::new(image_bytes);
        let reader = match exif::Reader::new().read_from_container(&mut cursor) {
            Ok(reader) => reader,
            Err(_) => return 1,
        };

        reader
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .unwrap_or(1)
    }

    // 1 = normal, 2 = mirrored, 3 = 180, 4 = flipped, 5 = mirrored + 90 CW,
    // 6 = 90 CW, 7 = mirrored + 270 CW, 8 = 270 CW
    pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
        match orientation {
            2 => img.fliph(),
            3 => img.rotate180(),
            4 => img.flipv(),
            5 => img.rotate90().fliph(),
            6 => img.rotate90(),
            7 => img.rotate270().fliph(),
            8 => img.rotate270(),
            _ => img,
        }
    }

    /// Map the darkest and brightest intensities to 0 and 255. `cutoff` is the fraction of
    /// pixels ignored at each end of the histogram. Flat images are returned unchanged.
    pub fn stretch_contrast(img: &GrayImage, cutoff: f32) -> GrayImage {
        let mut histogram = [0u64; 256];
        for pixel in img.pixels() {
            histogram[pixel[0] as usize] += 1;
        }

        let total: u64 = histogram.iter().sum();
        let skip = (total as f64 * cutoff.max(0.0) as f64).round() as u64;

        let mut seen = 0u64;
        let mut lower = 0u8;
        for (value, count) in histogram.iter().enumerate() {
            seen += count;
            if seen > skip {
                lower = value as u8;
                break;
            }
        }

        seen = 0;
        let mut upper = 255u8;
        for (value, count) in histogram.iter().enumerate().rev() {
            seen += count;
            if seen > skip {
                upper = value as u8;
                break;
            }
        }

        if upper <= lower {
            return img.clone();
        }
        stretch_contrast(img, lower, upper)
    }

    /// Enlarge so the longer side equals `target_long_side` when it is below `min_long_side`.
    pub fn upsample(&self, img: GrayImage) -> Result<GrayImage, KtpError> {
        let (width, height) = img.dimensions();
        let long_side = width.max(height);
        if long_side == 0 {
            return Err(KtpError::ImageProcessingError(
                "Image has zero width or height".to_string(),
            ));
        }
        if long_side >= self.config.min_long_side {
            return Ok(img);
        }

        let ratio = self.config.target_long_side as f64 / long_side as f64;
        let new_width = ((width as f64 * ratio).round() as u32).max(1);
        let new_height = ((height as f64 * ratio).round() as u32).max(1);

        Ok(image::imageops::resize(
            &img,
            new_width,
            new_height,
            FilterType::Lanczos3,
        ))
    }

    /// Lossless PNG encoding of a normalized image, the form handed to the OCR engine.
    pub fn encode_png(img: &GrayImage) -> Result<Vec<u8>, KtpError> {
        let mut buffer = Vec::with_capacity(img.as_raw().len() / 2);
        PngEncoder::new(&mut buffer)
            .write_image(img.as_raw(), img.width(), img.height(), ColorType::L8)
            .map_err(|e| {
                KtpError::ImageProcessingError(format!("Failed to encode processed image: {}", e))
            })?;
        Ok(buffer)
    }
}
