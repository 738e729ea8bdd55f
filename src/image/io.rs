//! Conversions between `image` crate buffers and owned pixel buffers.

use crate::image::{ImageView, OwnedImage};
use crate::util::{FinderError, FinderResult};
use ::image::{GrayImage, RgbImage};
use std::path::Path;

/// Creates a borrowed 3-channel view from an RGB image buffer.
pub fn view_from_rgb_image(img: &RgbImage) -> FinderResult<ImageView<'_>> {
    ImageView::from_slice(img.as_raw(), img.width() as usize, img.height() as usize, 3)
}

/// Creates an owned 3-channel image from an RGB image buffer.
pub fn owned_from_rgb_image(img: &RgbImage) -> FinderResult<OwnedImage> {
    OwnedImage::new(
        img.as_raw().clone(),
        img.width() as usize,
        img.height() as usize,
        3,
    )
}

/// Creates an owned single-channel image from a grayscale image buffer.
pub fn owned_from_gray_image(img: &GrayImage) -> FinderResult<OwnedImage> {
    OwnedImage::new(
        img.as_raw().clone(),
        img.width() as usize,
        img.height() as usize,
        1,
    )
}

/// Converts an owned buffer back into an RGB image, expanding gray input.
pub fn rgb_image_from_owned(img: &OwnedImage) -> FinderResult<RgbImage> {
    let (width, height) = (img.width(), img.height());
    let data = match img.channels() {
        3 => img.data().to_vec(),
        1 => img.data().iter().flat_map(|&v| [v, v, v]).collect(),
        4 => img
            .data()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect(),
        channels => return Err(FinderError::InvalidChannels { channels }),
    };
    RgbImage::from_raw(width as u32, height as u32, data)
        .ok_or(FinderError::InvalidDimensions { width, height })
}

/// Loads an image from disk as 8-bit RGB; alpha is dropped.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> FinderResult<RgbImage> {
    let path = path.as_ref();
    let img = ::image::open(path).map_err(|err| FinderError::ImageIo {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    Ok(img.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::{owned_from_rgb_image, rgb_image_from_owned};
    use crate::image::OwnedImage;
    use ::image::{Rgb, RgbImage};

    #[test]
    fn gray_buffers_expand_to_rgb() {
        let gray = OwnedImage::new(vec![7, 200], 2, 1, 1).unwrap();
        let rgb = rgb_image_from_owned(&gray).unwrap();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([7, 7, 7]));
        assert_eq!(rgb.get_pixel(1, 0), &Rgb([200, 200, 200]));
    }

    #[test]
    fn rgb_buffers_keep_channel_order() {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(1, 1, Rgb([1, 2, 3]));
        let owned = owned_from_rgb_image(&img).unwrap();
        assert_eq!(owned.view().pixel(1, 1), Some(&[1u8, 2, 3][..]));
    }
}
