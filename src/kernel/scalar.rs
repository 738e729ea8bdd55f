//! Scalar reference kernel for score evaluation.

use crate::image::ImageView;
use crate::kernel::stats::{centered_energy, WindowStats};
use crate::kernel::{placement_range, Kernel, ScoreMap};
use crate::template::TemplatePlan;
use crate::util::FinderResult;

/// Windows whose summed variance falls below this carry no structure.
const MIN_WINDOW_VARIANCE: f64 = 1e-6;

/// Scalar ZNCC kernel over interleaved 8-bit channels.
pub struct ZnccScalar;

/// Turns a correlation numerator and the two energies into a score.
pub(crate) fn normalize(dot: f64, var_t: f64, var_i: f64) -> f32 {
    if var_i <= MIN_WINDOW_VARIANCE {
        return 0.0;
    }
    let score = dot / (var_t * var_i).sqrt();
    if score.is_finite() {
        score as f32
    } else {
        0.0
    }
}

/// Dot product of the zero-mean template with the window at `(x, y)`.
fn dot_at(image: ImageView<'_>, plan: &TemplatePlan, x: usize, y: usize) -> Option<f64> {
    let row_len = plan.width() * plan.channels();
    let start = x * plan.channels();
    let mut dot = 0.0f64;
    for (ty, tpl_row) in plan.zero_mean().chunks_exact(row_len).enumerate() {
        let window = image.row(y + ty)?.get(start..start + row_len)?;
        dot += tpl_row
            .iter()
            .zip(window)
            .map(|(&t, &v)| t * f64::from(v))
            .sum::<f64>();
    }
    Some(dot)
}

/// Scores one row of placements against precomputed window statistics.
pub(crate) fn score_row(
    image: ImageView<'_>,
    plan: &TemplatePlan,
    stats: &WindowStats,
    y: usize,
    map_width: usize,
) -> Vec<f32> {
    (0..map_width)
        .map(|x| match dot_at(image, plan, x, y) {
            Some(dot) => normalize(dot, plan.var_t(), stats.energy(x, y)),
            None => 0.0,
        })
        .collect()
}

/// ZNCC at a placement already known to be in range.
pub(crate) fn zncc_at(image: ImageView<'_>, plan: &TemplatePlan, x: usize, y: usize) -> f32 {
    let Some(dot) = dot_at(image, plan, x, y) else {
        return 0.0;
    };
    let count = (plan.width() * plan.height()) as u64;
    let mut var_i = 0.0f64;
    for c in 0..plan.channels() {
        let (mut sum, mut sum_sq) = (0u64, 0u64);
        for ty in 0..plan.height() {
            for tx in 0..plan.width() {
                if let Some(px) = image.pixel(x + tx, y + ty) {
                    let value = u64::from(px[c]);
                    sum += value;
                    sum_sq += value * value;
                }
            }
        }
        var_i += centered_energy(count, sum, sum_sq);
    }
    normalize(dot, plan.var_t(), var_i)
}

impl Kernel for ZnccScalar {
    fn score_at(image: ImageView<'_>, plan: &TemplatePlan, x: usize, y: usize) -> f32 {
        match placement_range(image, plan) {
            Ok((map_width, map_height)) if x < map_width && y < map_height => {
                zncc_at(image, plan, x, y)
            }
            _ => f32::NEG_INFINITY,
        }
    }

    fn score_map(image: ImageView<'_>, plan: &TemplatePlan) -> FinderResult<ScoreMap> {
        let (map_width, map_height) = placement_range(image, plan)?;
        let stats = WindowStats::compute(image, plan)?;
        let mut scores = Vec::with_capacity(map_width * map_height);
        for y in 0..map_height {
            scores.extend(score_row(image, plan, &stats, y, map_width));
        }
        ScoreMap::new(scores, map_width, map_height)
    }
}

#[cfg(test)]
mod tests {
    use super::ZnccScalar;
    use crate::image::ImageView;
    use crate::kernel::Kernel;
    use crate::template::TemplatePlan;
    use crate::util::FinderError;

    fn pattern_image(width: usize, height: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(((x * 17 + y * 9 + x * y) & 0xFF) as u8);
            }
        }
        data
    }

    #[test]
    fn zncc_map_matches_bruteforce() {
        let (img_width, img_height) = (7, 6);
        let image = pattern_image(img_width, img_height);
        let (tpl_width, tpl_height) = (3, 2);
        let tpl: Vec<u8> = (0..tpl_width * tpl_height)
            .map(|i| ((i * 37 + 11) & 0xFF) as u8)
            .collect();

        let image_view = ImageView::from_slice(&image, img_width, img_height, 1).unwrap();
        let tpl_view = ImageView::from_slice(&tpl, tpl_width, tpl_height, 1).unwrap();
        let plan = TemplatePlan::from_view(tpl_view).unwrap();
        let map = ZnccScalar::score_map(image_view, &plan).unwrap();
        assert_eq!((map.width(), map.height()), (5, 5));

        let n = (tpl_width * tpl_height) as f64;
        let t_mean = tpl.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
        for y in 0..map.height() {
            for x in 0..map.width() {
                let window: Vec<f64> = (0..tpl_height)
                    .flat_map(|ty| {
                        let row = image_view.row(y + ty).unwrap();
                        row[x..x + tpl_width].iter().map(|&v| f64::from(v)).collect::<Vec<_>>()
                    })
                    .collect();
                let i_mean = window.iter().sum::<f64>() / n;
                let mut num = 0.0;
                let mut den_t = 0.0;
                let mut den_i = 0.0;
                for (i, &value) in window.iter().enumerate() {
                    let t = f64::from(tpl[i]) - t_mean;
                    let v = value - i_mean;
                    num += t * v;
                    den_t += t * t;
                    den_i += v * v;
                }
                let expected = if den_i <= 1e-6 {
                    0.0
                } else {
                    num / (den_t * den_i).sqrt()
                };
                let got = map.get(x, y).unwrap();
                assert!(
                    (f64::from(got) - expected).abs() < 1e-5,
                    "({x},{y}): expected {expected}, got {got}"
                );
            }
        }
    }

    #[test]
    fn identical_window_scores_one() {
        let image = pattern_image(8, 8);
        let view = ImageView::from_slice(&image, 8, 8, 1).unwrap();
        let tpl = view.roi(2, 3, 4, 4).unwrap();
        let plan = TemplatePlan::from_view(tpl).unwrap();
        let score = ZnccScalar::score_at(view, &plan, 2, 3);
        assert!((score - 1.0).abs() < 1e-6);
        assert_eq!(ZnccScalar::score_at(view, &plan, 5, 0), f32::NEG_INFINITY);
    }

    #[test]
    fn flat_window_scores_zero() {
        let image = vec![9u8; 36];
        let view = ImageView::from_slice(&image, 6, 6, 1).unwrap();
        let tpl = pattern_image(3, 3);
        let plan = TemplatePlan::from_view(ImageView::from_slice(&tpl, 3, 3, 1).unwrap()).unwrap();
        let map = ZnccScalar::score_map(view, &plan).unwrap();
        assert!(map.as_slice().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn channel_mismatch_is_rejected() {
        let image = vec![0u8; 4 * 4 * 3];
        let view = ImageView::from_slice(&image, 4, 4, 3).unwrap();
        let tpl = pattern_image(2, 2);
        let plan = TemplatePlan::from_view(ImageView::from_slice(&tpl, 2, 2, 1).unwrap()).unwrap();
        let err = ZnccScalar::score_map(view, &plan).unwrap_err();
        assert_eq!(err, FinderError::InvalidChannels { channels: 3 });
    }

    #[test]
    fn score_at_agrees_with_score_map() {
        let (width, height) = (12, 9);
        let image: Vec<u8> = (0..width * height * 3)
            .map(|i| ((i * 97 + i / 7 * 13) & 0xFF) as u8)
            .collect();
        let view = ImageView::from_slice(&image, width, height, 3).unwrap();
        let plan = TemplatePlan::from_view(view.roi(3, 2, 5, 4).unwrap()).unwrap();
        let map = ZnccScalar::score_map(view, &plan).unwrap();
        for y in 0..map.height() {
            for x in 0..map.width() {
                let single = ZnccScalar::score_at(view, &plan, x, y);
                assert!((map.get(x, y).unwrap() - single).abs() < 1e-6, "({x},{y})");
            }
        }
        assert!(map.get(3, 2).unwrap() > 0.999);
    }
}
