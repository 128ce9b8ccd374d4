use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageReader, Limits};
use sz_geometry::{NormalizedZone, PixelCrop};
use thiserror::Error;

const MAX_BYTES_PER_PIXEL: u64 = 16;

/// Rasterization / decoding errors.
#[derive(Debug, Error)]
pub enum RasterError {
    /// The source has no pixels yet (zero natural width or height).
    #[error("source image is not ready")]
    SourceNotReady,

    #[error("image is too large: {actual} {unit} exceeds the limit of {limit}")]
    TooLarge {
        unit: &'static str,
        actual: u64,
        limit: u64,
    },

    #[error("image decoding failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Upper bounds applied before an image reaches recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageLimits {
    /// Maximum encoded size in bytes.
    pub max_bytes: u64,
    /// Maximum decoded pixel count (width * height).
    pub max_pixels: u64,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            max_pixels: 40_000_000,
        }
    }
}

/// Decoded source image. Read-only: cropping never mutates it.
#[derive(Debug, Clone)]
pub struct SourceImage {
    image: DynamicImage,
}

impl SourceImage {
    pub fn from_image(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Decode encoded image bytes (format sniffed from content) within `limits`.
    pub fn decode(bytes: &[u8], limits: &ImageLimits) -> Result<Self, RasterError> {
        let len = bytes.len() as u64;
        if len > limits.max_bytes {
            return Err(RasterError::TooLarge {
                unit: "bytes",
                actual: len,
                limit: limits.max_bytes,
            });
        }

        let (width, height) = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .into_dimensions()?;
        let pixels = u64::from(width) * u64::from(height);
        if pixels > limits.max_pixels {
            return Err(RasterError::TooLarge {
                unit: "pixels",
                actual: pixels,
                limit: limits.max_pixels,
            });
        }

        let mut reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        let mut decoder_limits = Limits::default();
        decoder_limits.max_image_width = Some(width);
        decoder_limits.max_image_height = Some(height);
        // Widest sample layout is Rgba32F.
        decoder_limits.max_alloc = Some(limits.max_pixels.saturating_mul(MAX_BYTES_PER_PIXEL));
        reader.limits(decoder_limits);

        Ok(Self::from_image(reader.decode()?))
    }

    #[inline]
    pub fn natural_width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn natural_height(&self) -> u32 {
        self.image.height()
    }

    #[inline]
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.natural_width()) * u64::from(self.natural_height())
    }

    pub fn is_ready(&self) -> bool {
        self.natural_width() > 0 && self.natural_height() > 0
    }

    /// Fail fast if the image has no pixels.
    pub fn ensure_ready(&self) -> Result<(), RasterError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(RasterError::SourceNotReady)
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

/// Pixel crop for `zone` against the source's natural size.
pub fn crop_for(source: &SourceImage, zone: &NormalizedZone) -> Result<PixelCrop, RasterError> {
    PixelCrop::from_zone(zone, source.natural_width(), source.natural_height())
        .ok_or(RasterError::SourceNotReady)
}

/// Copy `crop` out of `source` into a new surface of exactly the crop size.
pub fn rasterize_crop(source: &SourceImage, crop: &PixelCrop) -> DynamicImage {
    let cropped = source
        .image()
        .crop_imm(crop.x, crop.y, crop.width, crop.height);
    debug_assert_eq!(cropped.dimensions(), (crop.width, crop.height));
    cropped
}

/// Crop `zone` out of `source` into a new surface of exactly the crop size.
pub fn rasterize(source: &SourceImage, zone: &NormalizedZone) -> Result<DynamicImage, RasterError> {
    let crop = crop_for(source, zone)?;
    Ok(rasterize_crop(source, &crop))
}

#[cfg(test)]
mod tests {
    use image::{ImageBuffer, ImageFormat, Rgba, RgbaImage};

    use super::*;

    fn gradient(width: u32, height: u32) -> SourceImage {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 0, 255])
        });
        SourceImage::from_image(DynamicImage::ImageRgba8(img))
    }

    #[test]
    fn out_of_bounds_request_is_clamped() {
        let source = gradient(200, 100);
        let zone = NormalizedZone::new(50.0, 50.0, 60.0, 60.0);

        let crop = rasterize(&source, &zone).unwrap();
        assert!(crop.width() <= 100);
        assert!(crop.height() <= 50);
        assert_eq!(crop.dimensions(), (100, 50));
    }

    #[test]
    fn crop_copies_source_pixels_at_origin() {
        let source = gradient(100, 100);
        let zone = NormalizedZone::new(10.0, 20.0, 30.0, 40.0);

        let crop = rasterize(&source, &zone).unwrap();
        assert_eq!(crop.dimensions(), (30, 40));
        assert_eq!(crop.get_pixel(0, 0), Rgba([10, 20, 0, 255]));
        assert_eq!(crop.get_pixel(29, 39), Rgba([39, 59, 0, 255]));

        // Source untouched.
        assert_eq!(source.image().dimensions(), (100, 100));
    }

    #[test]
    fn empty_source_is_not_ready() {
        let source = SourceImage::from_image(DynamicImage::new_rgba8(0, 10));
        assert!(!source.is_ready());
        assert!(matches!(
            rasterize(&source, &NormalizedZone::FULL),
            Err(RasterError::SourceNotReady)
        ));
        assert!(matches!(
            source.ensure_ready(),
            Err(RasterError::SourceNotReady)
        ));
    }

    #[test]
    fn decode_round_trips_png() {
        let mut png = Vec::new();
        gradient(8, 4)
            .image()
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let decoded = SourceImage::decode(&png, &ImageLimits::default()).unwrap();
        assert_eq!((decoded.natural_width(), decoded.natural_height()), (8, 4));
    }

    #[test]
    fn decode_enforces_limits() {
        let mut png = Vec::new();
        gradient(8, 4)
            .image()
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let tight_bytes = ImageLimits {
            max_bytes: 4,
            max_pixels: 1_000,
        };
        assert!(matches!(
            SourceImage::decode(&png, &tight_bytes),
            Err(RasterError::TooLarge { unit: "bytes", .. })
        ));

        let tight_pixels = ImageLimits {
            max_bytes: 1 << 20,
            max_pixels: 16,
        };
        assert!(matches!(
            SourceImage::decode(&png, &tight_pixels),
            Err(RasterError::TooLarge {
                unit: "pixels",
                actual: 32,
                limit: 16
            })
        ));
    }

    #[test]
    fn sixteen_bit_png_within_pixel_budget_decodes() {
        let mut png = Vec::new();
        DynamicImage::ImageRgba16(ImageBuffer::new(100, 100))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let limits = ImageLimits {
            max_bytes: 1 << 20,
            max_pixels: 15_000,
        };
        let decoded = SourceImage::decode(&png, &limits).unwrap();
        assert_eq!((decoded.natural_width(), decoded.natural_height()), (100, 100));
        assert!(matches!(decoded.image(), DynamicImage::ImageRgba16(_)));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let result = SourceImage::decode(b"definitely not an image", &ImageLimits::default());
        assert!(result.is_err());
    }
}
