//! End-to-end helpers over `image` crate buffers.

use crate::core::{self, RgbaImage};
use crate::finder::{ArenaError, BarCodePattern, FrameSummary, PatternError, SearchRequest, GROUP_PIXELS};
use crate::io::DetectConfig;
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error(transparent)]
    Image(#[from] core::ImageError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Arena(#[from] ArenaError),

    #[error("failed to decode image: {0}")]
    Decode(#[from] ::image::ImageError),
}

/// Convert to RGBA8 and pad on the right with transparent black up to a
/// multiple of 8 pixels. Padding never classifies as anchor color.
pub fn rgba_padded(img: &::image::DynamicImage) -> Result<RgbaImage, DetectError> {
    let rgba = img.to_rgba8();
    let (w, h) = (rgba.width() as usize, rgba.height() as usize);
    let padded_w = w.div_ceil(GROUP_PIXELS) * GROUP_PIXELS;
    if padded_w == w {
        return Ok(RgbaImage::from_raw(w, h, rgba.into_raw())?);
    }

    let src_stride = w * core::CHANNELS;
    let dst_stride = padded_w * core::CHANNELS;
    let mut data = vec![0u8; dst_stride * h];
    for (dst, src) in data
        .chunks_exact_mut(dst_stride)
        .zip(rgba.as_raw().chunks_exact(src_stride))
    {
        dst[..src_stride].copy_from_slice(src);
    }
    Ok(RgbaImage::from_raw(padded_w, h, data)?)
}

/// Decode an image file into a padded RGBA buffer.
pub fn load_rgba(path: impl AsRef<Path>) -> Result<RgbaImage, DetectError> {
    let img = ::image::open(path.as_ref())?;
    rgba_padded(&img)
}

/// Crop a padded buffer back to `width` columns for saving.
pub fn to_image_buffer(img: &RgbaImage, width: usize) -> Result<::image::RgbaImage, DetectError> {
    let width = width.min(img.width);
    let src_stride = img.width * core::CHANNELS;
    let mut data = Vec::with_capacity(width * img.height * core::CHANNELS);
    for row in img.data.chunks_exact(src_stride) {
        data.extend_from_slice(&row[..width * core::CHANNELS]);
    }
    ::image::RgbaImage::from_raw(width as u32, img.height as u32, data).ok_or(
        DetectError::Image(core::ImageError::Dimensions {
            width,
            height: img.height,
        }),
    )
}

/// Run one detection pass for `patterns` with a freshly allocated arena.
///
/// Convenient for still images; video loops should keep the arena and the
/// requests around instead.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(width = img.width, height = img.height))
)]
pub fn detect_patterns(
    img: &RgbaImage,
    config: &DetectConfig,
    patterns: &[BarCodePattern],
) -> Result<(FrameSummary, Vec<SearchRequest>), DetectError> {
    let finder = config.build_finder();
    let mut arena = config.build_arena()?;
    let mut requests = patterns
        .iter()
        .map(|p| config.build_request(*p))
        .collect::<Result<Vec<_>, _>>()?;
    let summary = finder.detect(&img.view(), &mut requests, &mut arena);
    Ok((summary, requests))
}
