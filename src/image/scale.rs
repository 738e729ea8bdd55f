//! Downscaling of high-density reference images.
//!
//! A pattern saved as `name@2x.png` holds twice as many pixels per logical
//! pixel as the screen it will be matched against. Integer factors use an
//! NxN box filter with integer rounding, `dst = (sum + n/2) / n`, which is the
//! exact area average. Fractional factors fall back to triangle filtering.

use crate::image::io::{owned_from_rgb_image, rgb_image_from_owned};
use crate::image::{ImageView, OwnedImage};
use crate::util::{FinderError, FinderResult};
use ::image::imageops::{self, FilterType};
use ::image::RgbImage;

/// Returns the logical size of an image stored at `scale` density:
/// `(floor(width / scale), floor(height / scale))`.
pub fn scaled_size(width: u32, height: u32, scale: f64) -> (u32, u32) {
    if scale <= 1.0 || !scale.is_finite() {
        return (width, height);
    }
    (
        (f64::from(width) / scale).floor() as u32,
        (f64::from(height) / scale).floor() as u32,
    )
}

/// Resamples an RGB image down to its logical size for `scale`.
///
/// Scales at or below 1 return the input unchanged.
pub fn downscale_rgb(img: &RgbImage, scale: f64) -> FinderResult<RgbImage> {
    let (width, height) = scaled_size(img.width(), img.height(), scale);
    if width == 0 || height == 0 {
        return Err(FinderError::InvalidDimensions {
            width: width as usize,
            height: height as usize,
        });
    }
    if (width, height) == img.dimensions() {
        return Ok(img.clone());
    }

    if scale.fract() == 0.0 {
        let owned = owned_from_rgb_image(img)?;
        let reduced = box_downsample(owned.view(), scale as usize)?;
        return rgb_image_from_owned(&reduced);
    }
    Ok(imageops::resize(img, width, height, FilterType::Triangle))
}

/// Averages `factor x factor` blocks; trailing rows/columns that do not fill a
/// whole block are dropped.
pub fn box_downsample(src: ImageView<'_>, factor: usize) -> FinderResult<OwnedImage> {
    if factor <= 1 {
        return OwnedImage::from_view(src);
    }
    let dst_width = src.width() / factor;
    let dst_height = src.height() / factor;
    let channels = src.channels();
    let dst_len = dst_width
        .checked_mul(dst_height)
        .and_then(|v| v.checked_mul(channels))
        .ok_or(FinderError::InvalidDimensions {
            width: dst_width,
            height: dst_height,
        })?;
    if dst_len == 0 {
        return Err(FinderError::InvalidDimensions {
            width: dst_width,
            height: dst_height,
        });
    }

    let area = (factor * factor) as u32;
    let mut dst = vec![0u8; dst_len];
    let mut sums = [0u32; super::MAX_CHANNELS];
    for y in 0..dst_height {
        for x in 0..dst_width {
            sums[..channels].fill(0);
            for dy in 0..factor {
                let row = src.row(y * factor + dy).ok_or(FinderError::BufferTooSmall {
                    needed: (y * factor + dy + 1) * src.stride(),
                    got: src.as_slice().len(),
                })?;
                let start = x * factor * channels;
                for px in row[start..start + factor * channels].chunks_exact(channels) {
                    for (sum, &value) in sums.iter_mut().zip(px) {
                        *sum += u32::from(value);
                    }
                }
            }
            let base = (y * dst_width + x) * channels;
            for c in 0..channels {
                dst[base + c] = ((sums[c] + area / 2) / area) as u8;
            }
        }
    }

    OwnedImage::new(dst, dst_width, dst_height, channels)
}
