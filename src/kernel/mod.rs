//! Correlation kernel implementations.
//!
//! A kernel turns a haystack view and a template plan into a dense score map
//! with one entry per valid top-left placement, laid out row-major. Scores are
//! zero-mean normalized cross-correlation values in approximately `[-1, 1]`;
//! windows without variance score `0.0`.
//!
//! The direct kernels cost one multiply-add per template pixel per placement;
//! [`fft::ZnccFft`] trades that for a handful of screen-sized transforms.

use crate::image::ImageView;
use crate::template::TemplatePlan;
use crate::util::{FinderError, FinderResult};

pub mod fft;
pub mod scalar;
pub(crate) mod stats;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Dense correlation scores, one per top-left placement.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreMap {
    width: usize,
    height: usize,
    scores: Vec<f32>,
}

impl ScoreMap {
    pub(crate) fn new(scores: Vec<f32>, width: usize, height: usize) -> FinderResult<Self> {
        if width.checked_mul(height) != Some(scores.len()) {
            return Err(FinderError::BufferTooSmall {
                needed: width.saturating_mul(height),
                got: scores.len(),
            });
        }
        Ok(Self {
            width,
            height,
            scores,
        })
    }

    /// Number of horizontal placements (`image_width - template_width + 1`).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of vertical placements (`image_height - template_height + 1`).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the score at placement `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width {
            return None;
        }
        self.scores.get(y.checked_mul(self.width)?.checked_add(x)?).copied()
    }

    /// Returns all scores in row-major order.
    pub fn as_slice(&self) -> &[f32] {
        &self.scores
    }
}

/// Kernel trait for scoring and scan operations.
pub trait Kernel {
    /// Computes the score at a single placement (top-left coordinates).
    ///
    /// Placements outside the valid range score `f32::NEG_INFINITY`.
    fn score_at(image: ImageView<'_>, plan: &TemplatePlan, x: usize, y: usize) -> f32;

    /// Scores every valid placement of `plan` over `image`.
    fn score_map(image: ImageView<'_>, plan: &TemplatePlan) -> FinderResult<ScoreMap>;
}

/// Validates that `plan` fits inside `image` and returns the score map size.
pub(crate) fn placement_range(
    image: ImageView<'_>,
    plan: &TemplatePlan,
) -> FinderResult<(usize, usize)> {
    if image.channels() != plan.channels() {
        return Err(FinderError::InvalidChannels {
            channels: image.channels(),
        });
    }
    let img_width = image.width();
    let img_height = image.height();
    if img_width < plan.width() || img_height < plan.height() {
        return Err(FinderError::RoiOutOfBounds {
            x: 0,
            y: 0,
            width: plan.width(),
            height: plan.height(),
            img_width,
            img_height,
        });
    }
    Ok((img_width - plan.width() + 1, img_height - plan.height() + 1))
}
