//! FFT cross-correlation kernel.
//!
//! The numerator of every placement comes from one frequency-domain product
//! per channel, so the cost depends on the screen size rather than on the
//! screen size times the template size. Window energies come from the same
//! integral-image statistics the direct kernels use.

use crate::image::ImageView;
use crate::kernel::scalar::{normalize, ZnccScalar};
use crate::kernel::stats::WindowStats;
use crate::kernel::{placement_range, Kernel, ScoreMap};
use crate::template::TemplatePlan;
use crate::util::{FinderError, FinderResult};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

const ZERO: Complex<f64> = Complex { re: 0.0, im: 0.0 };

/// ZNCC kernel computing correlation numerators with 2D FFTs.
pub struct ZnccFft;

/// Separable 2D transform over a `rows x cols` grid.
///
/// `forward` takes a row-major buffer and returns the spectrum column-major;
/// `inverse` undoes that layout. Output is unnormalized.
struct Transform2d {
    cols: usize,
    rows: usize,
    row_forward: Arc<dyn Fft<f64>>,
    col_forward: Arc<dyn Fft<f64>>,
    row_inverse: Arc<dyn Fft<f64>>,
    col_inverse: Arc<dyn Fft<f64>>,
}

impl Transform2d {
    fn new(cols: usize, rows: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        Self {
            cols,
            rows,
            row_forward: planner.plan_fft_forward(cols),
            col_forward: planner.plan_fft_forward(rows),
            row_inverse: planner.plan_fft_inverse(cols),
            col_inverse: planner.plan_fft_inverse(rows),
        }
    }

    fn forward(&self, mut buffer: Vec<Complex<f64>>) -> Vec<Complex<f64>> {
        run_chunks(self.row_forward.as_ref(), self.cols, &mut buffer);
        let mut spectrum = transpose(&buffer, self.rows, self.cols);
        run_chunks(self.col_forward.as_ref(), self.rows, &mut spectrum);
        spectrum
    }

    fn inverse(&self, mut spectrum: Vec<Complex<f64>>) -> Vec<Complex<f64>> {
        run_chunks(self.col_inverse.as_ref(), self.rows, &mut spectrum);
        let mut buffer = transpose(&spectrum, self.cols, self.rows);
        run_chunks(self.row_inverse.as_ref(), self.cols, &mut buffer);
        buffer
    }
}

#[cfg(feature = "rayon")]
fn run_chunks(fft: &dyn Fft<f64>, len: usize, buffer: &mut [Complex<f64>]) {
    use rayon::prelude::*;
    buffer.par_chunks_mut(len).for_each(|chunk| fft.process(chunk));
}

#[cfg(not(feature = "rayon"))]
fn run_chunks(fft: &dyn Fft<f64>, _len: usize, buffer: &mut [Complex<f64>]) {
    fft.process(buffer);
}

fn transpose(buffer: &[Complex<f64>], rows: usize, cols: usize) -> Vec<Complex<f64>> {
    let mut out = vec![ZERO; buffer.len()];
    for (r, row) in buffer.chunks_exact(cols).enumerate() {
        for (c, &value) in row.iter().enumerate() {
            out[c * rows + r] = value;
        }
    }
    out
}

/// Smallest length `>= n` whose only prime factors are 2, 3 and 5.
fn transform_len(n: usize) -> usize {
    let mut len = n.max(1);
    while !is_smooth(len) {
        len += 1;
    }
    len
}

fn is_smooth(mut n: usize) -> bool {
    for p in [2, 3, 5] {
        while n % p == 0 {
            n /= p;
        }
    }
    n == 1
}

/// Channel `c` of `image`, centered on its mean and zero-padded to the grid.
fn screen_plane(
    image: ImageView<'_>,
    c: usize,
    cols: usize,
    rows: usize,
) -> FinderResult<Vec<Complex<f64>>> {
    let (width, height) = (image.width(), image.height());
    let mut plane = vec![ZERO; cols * rows];
    let mut sum = 0.0f64;
    for y in 0..height {
        let row = image
            .row(y)
            .ok_or(FinderError::InvalidDimensions { width, height })?;
        let dst = &mut plane[y * cols..y * cols + width];
        for (slot, &value) in dst.iter_mut().zip(row.iter().skip(c).step_by(image.channels())) {
            slot.re = f64::from(value);
            sum += f64::from(value);
        }
    }
    let mean = sum / (width * height) as f64;
    for y in 0..height {
        for slot in &mut plane[y * cols..y * cols + width] {
            slot.re -= mean;
        }
    }
    Ok(plane)
}

fn template_plane(plan: &TemplatePlan, c: usize, cols: usize, rows: usize) -> Vec<Complex<f64>> {
    let mut plane = vec![ZERO; cols * rows];
    let row_len = plan.width() * plan.channels();
    for (ty, tpl_row) in plan.zero_mean().chunks_exact(row_len).enumerate() {
        let dst = &mut plane[ty * cols..ty * cols + plan.width()];
        for (slot, &value) in dst.iter_mut().zip(tpl_row.iter().skip(c).step_by(plan.channels())) {
            slot.re = value;
        }
    }
    plane
}

impl Kernel for ZnccFft {
    fn score_at(image: ImageView<'_>, plan: &TemplatePlan, x: usize, y: usize) -> f32 {
        ZnccScalar::score_at(image, plan, x, y)
    }

    fn score_map(image: ImageView<'_>, plan: &TemplatePlan) -> FinderResult<ScoreMap> {
        let (map_width, map_height) = placement_range(image, plan)?;
        let stats = WindowStats::compute(image, plan)?;
        let cols = transform_len(image.width());
        let rows = transform_len(image.height());
        let transform = Transform2d::new(cols, rows);

        let mut product = vec![ZERO; cols * rows];
        for c in 0..plan.channels() {
            let screen = transform.forward(screen_plane(image, c, cols, rows)?);
            let template = transform.forward(template_plane(plan, c, cols, rows));
            for ((acc, s), t) in product.iter_mut().zip(&screen).zip(&template) {
                *acc += *s * t.conj();
            }
        }
        let correlation = transform.inverse(product);

        let scale = 1.0 / (cols * rows) as f64;
        let mut scores = Vec::with_capacity(map_width * map_height);
        for y in 0..map_height {
            for x in 0..map_width {
                let dot = correlation[y * cols + x].re * scale;
                scores.push(normalize(dot, plan.var_t(), stats.energy(x, y)));
            }
        }
        ScoreMap::new(scores, map_width, map_height)
    }
}
