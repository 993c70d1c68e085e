use crate::config::OcrConfig;
use crate::error::{Result, RxError};
use image::{DynamicImage, GenericImageView, GrayImage, ImageFormat, ImageReader, Luma};

/// Single-channel, two-level image ready for the OCR engine.
#[derive(Debug, Clone)]
pub struct PreprocessedImage {
    png: Vec<u8>,
    width: u32,
    height: u32,
}

impl PreprocessedImage {
    /// PNG encoding of the binarized image.
    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Image format detected from magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Jpeg,
    Png,
    WebP,
    Tiff,
    Bmp,
}

impl UploadFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Tiff => "tiff",
            Self::Bmp => "bmp",
        }
    }
}

/// Detect image format from magic bytes
pub fn detect_image_format(bytes: &[u8]) -> Option<UploadFormat> {
    // JPEG: FF D8 FF
    if bytes.len() >= 3 && bytes[0..3] == [0xFF, 0xD8, 0xFF] {
        return Some(UploadFormat::Jpeg);
    }
    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if bytes.len() >= 8 && bytes[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        return Some(UploadFormat::Png);
    }
    // WebP: RIFF....WEBP
    if bytes.len() >= 12
        && bytes[0..4] == [0x52, 0x49, 0x46, 0x46]
        && bytes[8..12] == [0x57, 0x45, 0x42, 0x50]
    {
        return Some(UploadFormat::WebP);
    }
    // TIFF: II*\0 or MM\0*
    if bytes.len() >= 4
        && (bytes[0..4] == [0x49, 0x49, 0x2A, 0x00] || bytes[0..4] == [0x4D, 0x4D, 0x00, 0x2A])
    {
        return Some(UploadFormat::Tiff);
    }
    // BMP: 42 4D
    if bytes.len() >= 2 && bytes[0..2] == [0x42, 0x4D] {
        return Some(UploadFormat::Bmp);
    }
    None
}

/// Preprocess image bytes for OCR
///
/// 1. Decodes the image (any format the `image` crate can guess)
/// 2. Downscales images above the maximum dimension, keeping aspect ratio
/// 3. Converts to 8-bit grayscale, dropping alpha
/// 4. Binarizes with the configured global threshold
///
/// Any decodable raster is accepted regardless of size. Undecodable input
/// fails with [`RxError::ImageDecode`]; nothing partial is returned.
pub fn preprocess_image(bytes: &[u8], config: &OcrConfig) -> Result<PreprocessedImage> {
    let reader = ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| RxError::ImageDecode(format!("Failed to read image: {e}")))?;

    let img = reader
        .decode()
        .map_err(|e| RxError::ImageDecode(format!("Failed to decode image: {e}")))?;

    let img = resize_if_needed(img, config.max_image_dimension);
    let gray = img.to_luma8();
    let binary = binarize(&gray, config.binarize_threshold);
    let (width, height) = binary.dimensions();

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(binary)
        .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| RxError::Processing(format!("Failed to encode image: {e}")))?;

    tracing::debug!(width, height, bytes = png.len(), "Image preprocessed for OCR");

    Ok(PreprocessedImage { png, width, height })
}

/// Map every pixel to pure black or white. `p >= threshold` becomes 255.
pub fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] >= threshold {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Resize image if it exceeds maximum dimension while maintaining aspect ratio
///
/// Uses Lanczos3 filter for high-quality downscaling
fn resize_if_needed(img: DynamicImage, max_dim: u32) -> DynamicImage {
    let (width, height) = img.dimensions();

    if width <= max_dim && height <= max_dim {
        return img;
    }

    let ratio = if width > height {
        max_dim as f32 / width as f32
    } else {
        max_dim as f32 / height as f32
    };

    let new_width = ((width as f32 * ratio) as u32).max(1);
    let new_height = ((height as f32 * ratio) as u32).max(1);

    tracing::debug!(
        from_width = width,
        from_height = height,
        new_width,
        new_height,
        "Downscaling oversized image"
    );
    img.resize(new_width, new_height, image::imageops::FilterType::Lanczos3)
}
