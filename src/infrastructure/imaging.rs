use bytes::Bytes;
use derive_more::Display;
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// Shrink to fit inside the box, keeping aspect ratio. Never enlarges.
    Inside,
    /// Scale to cover the box and center-crop the overflow.
    Cover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeSpec {
    pub width: u32,
    pub height: u32,
    pub fit: Fit,
    pub quality: u8,
}

pub const MAIN_IMAGE: ResizeSpec = ResizeSpec {
    width: 1920,
    height: 1920,
    fit: Fit::Inside,
    quality: 85,
};

pub const THUMBNAIL: ResizeSpec = ResizeSpec {
    width: 300,
    height: 300,
    fit: Fit::Cover,
    quality: 70,
};

#[derive(Debug, Display)]
pub enum ImageTransformError {
    #[display("Failed to decode image: {_0}")]
    Decode(String),

    #[display("Failed to encode image: {_0}")]
    Encode(String),

    #[display("Image worker failed: {_0}")]
    Worker(String),
}

impl std::error::Error for ImageTransformError {}

/// Decodes `source`, resizes it per `spec` and re-encodes it as JPEG.
pub fn transform(source: &[u8], spec: &ResizeSpec) -> Result<Vec<u8>, ImageTransformError> {
    let img = image::load_from_memory(source)
        .map_err(|e| ImageTransformError::Decode(e.to_string()))?;

    let resized = resize(img, spec);

    // JPEG has no alpha channel
    let rgb = resized.to_rgb8();
    let mut out = Vec::with_capacity(source.len() / 2);
    JpegEncoder::new_with_quality(&mut out, spec.quality)
        .encode_image(&rgb)
        .map_err(|e| ImageTransformError::Encode(e.to_string()))?;

    Ok(out)
}

fn resize(img: DynamicImage, spec: &ResizeSpec) -> DynamicImage {
    match spec.fit {
        Fit::Inside if img.width() <= spec.width && img.height() <= spec.height => img,
        Fit::Inside => img.resize(spec.width, spec.height, FilterType::Lanczos3),
        Fit::Cover => img.resize_to_fill(spec.width, spec.height, FilterType::Lanczos3),
    }
}

/// Runs [`transform`] on the blocking thread pool.
pub async fn transform_blocking(source: Bytes, spec: ResizeSpec) -> Result<Bytes, ImageTransformError> {
    tokio::task::spawn_blocking(move || transform(&source, &spec))
        .await
        .map_err(|e| ImageTransformError::Worker(e.to_string()))?
        .map(Bytes::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 120, 80]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn decode(bytes: &[u8]) -> DynamicImage {
        assert_eq!(image::guess_format(bytes).unwrap(), ImageFormat::Jpeg);
        image::load_from_memory(bytes).unwrap()
    }

    #[test]
    fn downscales_to_fit_bounding_box() {
        let out = decode(&transform(&png(3840, 2160), &MAIN_IMAGE).unwrap());
        assert_eq!((out.width(), out.height()), (1920, 1080));
    }

    #[test]
    fn portrait_images_are_bounded_by_height() {
        let out = decode(&transform(&png(1000, 4000), &MAIN_IMAGE).unwrap());
        assert_eq!((out.width(), out.height()), (480, 1920));
    }

    #[test]
    fn never_upscales_small_images() {
        let out = decode(&transform(&png(640, 480), &MAIN_IMAGE).unwrap());
        assert_eq!((out.width(), out.height()), (640, 480));
    }

    #[test]
    fn thumbnail_is_square_crop() {
        let out = decode(&transform(&png(1200, 800), &THUMBNAIL).unwrap());
        assert_eq!((out.width(), out.height()), (300, 300));
    }

    #[test]
    fn rejects_non_image_bytes() {
        let err = transform(b"definitely not an image", &MAIN_IMAGE).unwrap_err();
        assert!(matches!(err, ImageTransformError::Decode(_)));
    }

    #[actix_rt::test]
    async fn blocking_wrapper_returns_jpeg() {
        let out = transform_blocking(Bytes::from(png(400, 400)), THUMBNAIL).await.unwrap();
        assert_eq!((decode(&out).width(), decode(&out).height()), (300, 300));
    }
}
