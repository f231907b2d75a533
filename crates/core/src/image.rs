//! Image normalization for step photos.
//!
//! Every photo attached to a step is decoded, bounded to
//! [`MAX_DIMENSION`] on its longer side and re-encoded as JPEG within
//! [`MAX_ENCODED_BYTES`] before it is uploaded. The raw file is never
//! uploaded: a photo that cannot be normalized is an error.
//!
//! Decoding and encoding are CPU bound, so [`ImageNormalizer::normalize`]
//! runs them on tokio's blocking pool.

use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader, RgbImage};
use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Longest side, in pixels, of a normalized image.
pub const MAX_DIMENSION: u32 = 1200;

/// Encoded size budget of a normalized image (1 MiB).
pub const MAX_ENCODED_BYTES: usize = 1024 * 1024;

/// Initial JPEG quality (0.8 on a 0..1 scale).
pub const DEFAULT_QUALITY: u8 = 80;

/// Content type of every normalized image.
pub const OUTPUT_CONTENT_TYPE: &str = "image/jpeg";

/// File extension matching [`OUTPUT_CONTENT_TYPE`].
pub const OUTPUT_EXTENSION: &str = "jpg";

/// Input formats accepted for step photos.
pub const ALLOWED_FORMATS: &[ImageFormat] =
    &[ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::WebP];

/// Quality is never lowered below this before the image is shrunk instead.
const MIN_QUALITY: u8 = 40;

const QUALITY_STEP: u8 = 10;

/// Below this bound the image is considered impossible to fit the budget.
const MIN_DIMENSION: u32 = 64;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures while normalizing a photo.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Failed to read image: {0}")]
    Read(String),

    #[error("Could not detect image format")]
    UnknownFormat,

    #[error("Unsupported image format: {0}. Allowed: JPEG, PNG, WebP")]
    UnsupportedFormat(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Image cannot be compressed below {max_bytes} bytes")]
    OverBudget { max_bytes: usize },

    #[error("Image worker failed: {0}")]
    Worker(String),
}

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// A photo exactly as the user picked it.
///
/// The bytes are shared, so cloning a step that carries a photo is cheap.
#[derive(Clone, PartialEq, Eq)]
pub struct RawImage {
    bytes: Arc<[u8]>,
    file_name: Option<String>,
}

impl RawImage {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: None,
        }
    }

    /// Attach the original file name (informational only).
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for RawImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawImage")
            .field("len", &self.bytes.len())
            .field("file_name", &self.file_name)
            .finish()
    }
}

/// Local handle used to display a picked photo before it is uploaded.
///
/// Derived from the photo content only; it never refers to storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewRef(String);

impl PreviewRef {
    pub fn for_image(raw: &RawImage) -> Self {
        let digest = Sha256::digest(raw.bytes());
        Self(format!("preview:{digest:x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A JPEG ready for upload.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// JPEG quality the bytes were finally encoded with.
    pub quality: u8,
}

impl NormalizedImage {
    pub fn content_type(&self) -> &'static str {
        OUTPUT_CONTENT_TYPE
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Bounds applied by [`normalize_bytes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub max_dimension: u32,
    pub max_bytes: usize,
    pub quality: u8,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_dimension: MAX_DIMENSION,
            max_bytes: MAX_ENCODED_BYTES,
            quality: DEFAULT_QUALITY,
        }
    }
}

/// Async front for [`normalize_bytes`] that keeps the work off the
/// calling task.
#[derive(Debug, Clone, Default)]
pub struct ImageNormalizer {
    options: NormalizeOptions,
}

impl ImageNormalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> NormalizeOptions {
        self.options
    }

    /// Normalize `raw` on the blocking thread pool.
    pub async fn normalize(&self, raw: &RawImage) -> Result<NormalizedImage, ImageError> {
        let options = self.options;
        let bytes = Arc::clone(&raw.bytes);
        tokio::task::spawn_blocking(move || normalize_bytes(&bytes, options))
            .await
            .map_err(|e| ImageError::Worker(e.to_string()))?
    }
}

/// Decode `data` and re-encode it as a JPEG that satisfies `options`.
///
/// The image is first fitted within `max_dimension`. If the encoding
/// exceeds `max_bytes`, quality is lowered step by step down to a floor,
/// then the bound is shrunk by a quarter and the qualities are retried.
/// Images are never upscaled.
pub fn normalize_bytes(
    data: &[u8],
    options: NormalizeOptions,
) -> Result<NormalizedImage, ImageError> {
    let img = decode(data)?;

    let longest = img.width().max(img.height());
    let mut bound = longest.min(options.max_dimension.max(1));
    let start_quality = options.quality.clamp(1, 100);

    loop {
        let rgb = fit_within(&img, bound);

        let mut quality = start_quality;
        loop {
            let bytes = encode_jpeg(&rgb, quality)?;
            if bytes.len() <= options.max_bytes {
                return Ok(NormalizedImage {
                    width: rgb.width(),
                    height: rgb.height(),
                    bytes,
                    quality,
                });
            }
            if quality <= MIN_QUALITY {
                break;
            }
            quality = quality.saturating_sub(QUALITY_STEP).max(MIN_QUALITY);
        }

        let next = bound * 3 / 4;
        if next < MIN_DIMENSION {
            return Err(ImageError::OverBudget {
                max_bytes: options.max_bytes,
            });
        }
        tracing::debug!(bound, next, "Shrinking image to meet size budget");
        bound = next;
    }
}

/// Detect the format from magic bytes, check it is allowed, decode, and
/// turn the pixels upright according to the EXIF orientation.
fn decode(data: &[u8]) -> Result<DynamicImage, ImageError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::Read(e.to_string()))?;

    let format = reader.format().ok_or(ImageError::UnknownFormat)?;
    if !ALLOWED_FORMATS.contains(&format) {
        return Err(ImageError::UnsupportedFormat(format!("{format:?}")));
    }

    let mut decoder = reader
        .into_decoder()
        .map_err(|e| ImageError::Decode(e.to_string()))?;
    // The JPEG re-encode drops EXIF, so the rotation has to be baked in.
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut img =
        DynamicImage::from_decoder(decoder).map_err(|e| ImageError::Decode(e.to_string()))?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Scale `img` so its longer side is at most `bound`, dropping alpha.
fn fit_within(img: &DynamicImage, bound: u32) -> RgbImage {
    if img.width().max(img.height()) <= bound {
        img.to_rgb8()
    } else {
        // resize() preserves aspect ratio, fitting within the given box
        img.resize(bound, bound, FilterType::Triangle).to_rgb8()
    }
}

fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(rgb)
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(buf)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
