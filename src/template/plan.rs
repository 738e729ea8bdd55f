//! Template plan precomputation for zero-mean normalized cross-correlation.

use crate::image::{ImageView, MAX_CHANNELS};
use crate::util::{FinderError, FinderResult};

/// Templates whose summed per-channel variance falls below this are flat.
const MIN_TEMPLATE_VARIANCE: f64 = 1e-8;

/// Precomputed statistics and zero-mean buffer for ZNCC matching.
///
/// Multi-channel templates are centered per channel and correlated over all
/// channels at once, so a color plan scores hue differences a gray plan would
/// miss.
#[derive(Clone, Debug)]
pub struct TemplatePlan {
    width: usize,
    height: usize,
    channels: usize,
    means: [f64; MAX_CHANNELS],
    var_t: f64,
    zero_mean: Vec<f64>,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    pub fn from_view(tpl: ImageView<'_>) -> FinderResult<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let channels = tpl.channels();
        let count = width
            .checked_mul(height)
            .ok_or(FinderError::InvalidDimensions { width, height })?;

        let mut sums = [0.0f64; MAX_CHANNELS];
        for y in 0..height {
            let row = template_row(tpl, y)?;
            for px in row.chunks_exact(channels) {
                for (sum, &value) in sums.iter_mut().zip(px) {
                    *sum += f64::from(value);
                }
            }
        }

        let count_f = count as f64;
        let mut means = [0.0f64; MAX_CHANNELS];
        for c in 0..channels {
            means[c] = sums[c] / count_f;
        }

        let mut var_t = 0.0f64;
        let mut zero_mean = Vec::with_capacity(count * channels);
        for y in 0..height {
            let row = template_row(tpl, y)?;
            for px in row.chunks_exact(channels) {
                for (c, &value) in px.iter().enumerate() {
                    let centered = f64::from(value) - means[c];
                    var_t += centered * centered;
                    zero_mean.push(centered);
                }
            }
        }

        if var_t <= MIN_TEMPLATE_VARIANCE {
            return Err(FinderError::DegenerateTemplate {
                reason: "zero variance",
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            means,
            var_t,
            zero_mean,
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the mean intensity of channel `c`.
    pub fn mean(&self, c: usize) -> Option<f64> {
        (c < self.channels).then(|| self.means[c])
    }

    /// Sum of squared zero-mean values over all channels.
    pub fn var_t(&self) -> f64 {
        self.var_t
    }

    /// Returns the zero-mean template buffer, row-major and interleaved.
    pub fn zero_mean(&self) -> &[f64] {
        &self.zero_mean
    }
}

fn template_row<'a>(tpl: ImageView<'a>, y: usize) -> FinderResult<&'a [u8]> {
    tpl.row(y).ok_or_else(|| {
        let needed = y
            .checked_mul(tpl.stride())
            .and_then(|v| v.checked_add(tpl.width() * tpl.channels()))
            .unwrap_or(usize::MAX);
        FinderError::BufferTooSmall {
            needed,
            got: tpl.as_slice().len(),
        }
    })
}
