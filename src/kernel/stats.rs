//! Per-placement window statistics from integral images.
//!
//! Every kernel needs the centered energy `sum((I - mean)^2)` of the window
//! under each placement. Summed-area tables make that O(1) per placement, so
//! only the correlation numerator depends on the template size.

use crate::image::ImageView;
use crate::kernel::placement_range;
use crate::template::TemplatePlan;
use crate::util::{FinderError, FinderResult};
use ::image::{GrayImage, ImageBuffer, Luma};
use imageproc::integral_image::{integral_image, integral_squared_image};

type Integral = ImageBuffer<Luma<u64>, Vec<u64>>;

/// Centered window energy summed over channels, one entry per placement.
#[derive(Clone, Debug)]
pub(crate) struct WindowStats {
    width: usize,
    energy: Vec<f64>,
}

impl WindowStats {
    pub(crate) fn compute(image: ImageView<'_>, plan: &TemplatePlan) -> FinderResult<Self> {
        let (map_width, map_height) = placement_range(image, plan)?;
        let count = (plan.width() * plan.height()) as u64;
        let mut energy = vec![0.0f64; map_width * map_height];

        for c in 0..image.channels() {
            let plane = channel_plane(image, c)?;
            let sums: Integral = integral_image::<_, u64>(&plane);
            let squares: Integral = integral_squared_image::<_, u64>(&plane);
            for y in 0..map_height {
                let row = &mut energy[y * map_width..(y + 1) * map_width];
                for (x, slot) in row.iter_mut().enumerate() {
                    let sum = window_sum(&sums, x, y, plan.width(), plan.height());
                    let sum_sq = window_sum(&squares, x, y, plan.width(), plan.height());
                    *slot += centered_energy(count, sum, sum_sq);
                }
            }
        }

        Ok(Self {
            width: map_width,
            energy,
        })
    }

    /// Energy of the window at placement `(x, y)`; the placement must be valid.
    pub(crate) fn energy(&self, x: usize, y: usize) -> f64 {
        self.energy[y * self.width + x]
    }
}

/// `sum_sq - sum^2 / count`, evaluated in integers so flat windows are exactly 0.
pub(crate) fn centered_energy(count: u64, sum: u64, sum_sq: u64) -> f64 {
    let scaled = u128::from(count) * u128::from(sum_sq);
    let squared = u128::from(sum) * u128::from(sum);
    scaled.saturating_sub(squared) as f64 / count as f64
}

fn window_sum(integral: &Integral, x: usize, y: usize, width: usize, height: usize) -> u64 {
    let at = |px: usize, py: usize| integral.get_pixel(px as u32, py as u32)[0];
    let (right, bottom) = (x + width, y + height);
    at(right, bottom) + at(x, y) - at(x, bottom) - at(right, y)
}

fn channel_plane(image: ImageView<'_>, c: usize) -> FinderResult<GrayImage> {
    let (width, height) = (image.width(), image.height());
    let invalid = FinderError::InvalidDimensions { width, height };
    let w = u32::try_from(width).map_err(|_| invalid.clone())?;
    let h = u32::try_from(height).map_err(|_| invalid.clone())?;

    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = image.row(y).ok_or_else(|| invalid.clone())?;
        data.extend(row.iter().skip(c).step_by(image.channels()));
    }
    GrayImage::from_raw(w, h, data).ok_or(invalid)
}
