use image::{DynamicImage, GenericImageView, GrayImage, ImageFormat, ImageReader};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

use super::backend::SlipImage;
use crate::config::OcrConfig;
use crate::error::{Result, SlipError};

/// Pixels trimmed from every edge; slip screenshots carry phone UI chrome
/// and scanned slips carry scanner shadow there.
const BORDER_SIZE: u32 = 10;

/// Turns uploaded bytes into the image handed to recognition backends.
pub trait Preprocessor: Send + Sync {
    fn normalize(&self, bytes: &[u8]) -> Result<SlipImage>;
}

/// Cleans up slip photos and screenshots for OCR.
///
/// Applies, in order:
/// 1. Dimension validation (min/max checks)
/// 2. Downscaling of oversized images, keeping the aspect ratio
/// 3. Grayscale conversion and alpha removal
/// 4. Contrast stretching
/// 5. Global (Otsu) binarisation
/// 6. Border trimming
#[derive(Debug, Clone)]
pub struct SlipPreprocessor {
    min_dimension: u32,
    max_dimension: u32,
}

impl SlipPreprocessor {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            min_dimension: config.min_image_dimension,
            max_dimension: config.max_image_dimension,
        }
    }
}

impl Preprocessor for SlipPreprocessor {
    fn normalize(&self, bytes: &[u8]) -> Result<SlipImage> {
        let img = load(bytes)?;

        let (width, height) = img.dimensions();
        if width < self.min_dimension || height < self.min_dimension {
            return Err(SlipError::Image(format!(
                "Image too small: {}x{}, minimum {}x{}",
                width, height, self.min_dimension, self.min_dimension
            )));
        }

        let img = resize_if_needed(img, self.max_dimension);
        let img = remove_alpha(img.grayscale());
        let gray = enhance_contrast(img).to_luma8();
        let gray = binarize(gray);
        let gray = trim_border(gray, BORDER_SIZE);

        encode(DynamicImage::ImageLuma8(gray))
    }
}

/// Decodes an upload without applying any filter.
pub fn decode_image(bytes: &[u8]) -> Result<SlipImage> {
    encode(load(bytes)?)
}

fn load(bytes: &[u8]) -> Result<DynamicImage> {
    let reader = ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| SlipError::Image(format!("Failed to read image: {e}")))?;

    reader
        .decode()
        .map_err(|e| SlipError::Image(format!("Failed to decode image: {e}")))
}

fn encode(img: DynamicImage) -> Result<SlipImage> {
    let (width, height) = img.dimensions();
    let mut png = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| SlipError::Image(format!("Failed to encode image: {e}")))?;

    Ok(SlipImage { png, width, height })
}

/// Uses Lanczos3 for downscaling.
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

    img.resize(new_width, new_height, image::imageops::FilterType::Lanczos3)
}

fn remove_alpha(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageRgba8(_) => DynamicImage::ImageRgb8(img.to_rgb8()),
        DynamicImage::ImageLumaA8(_) => DynamicImage::ImageLuma8(img.to_luma8()),
        _ => img,
    }
}

fn enhance_contrast(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(gray) => {
            DynamicImage::ImageLuma8(enhance_grayscale_contrast(gray))
        }
        other => DynamicImage::ImageLuma8(enhance_grayscale_contrast(other.to_luma8())),
    }
}

/// Histogram stretch: darkest pixel to 0, lightest to 255.
fn enhance_grayscale_contrast(gray: GrayImage) -> GrayImage {
    let (min_val, max_val) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));

    if max_val <= min_val {
        return gray;
    }

    let range = (max_val - min_val) as f32;
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let pixel = gray.get_pixel(x, y);
        let normalized = (pixel[0] - min_val) as f32 / range;
        image::Luma([(normalized * 255.0) as u8])
    })
}

/// Global binarisation at the Otsu level of the image.
fn binarize(gray: GrayImage) -> GrayImage {
    let level = otsu_level(&gray);
    threshold(&gray, level, ThresholdType::Binary)
}

/// Crops `border` pixels from each edge. Images too small to lose the
/// border are returned unchanged.
fn trim_border(gray: GrayImage, border: u32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width <= border * 4 || height <= border * 4 {
        return gray;
    }
    image::imageops::crop_imm(&gray, border, border, width - 2 * border, height - 2 * border)
        .to_image()
}
