//! Rayon-parallel kernel (feature-gated).
//!
//! Window statistics are built once, then score-map rows are scored in
//! parallel with the scalar routine, so results are bit-identical to
//! [`ZnccScalar`](crate::kernel::scalar::ZnccScalar).

use crate::image::ImageView;
use crate::kernel::scalar::{score_row, ZnccScalar};
use crate::kernel::stats::WindowStats;
use crate::kernel::{placement_range, Kernel, ScoreMap};
use crate::template::TemplatePlan;
use crate::util::FinderResult;
use rayon::prelude::*;

/// Row-parallel ZNCC kernel.
pub struct ZnccRayon;

impl Kernel for ZnccRayon {
    fn score_at(image: ImageView<'_>, plan: &TemplatePlan, x: usize, y: usize) -> f32 {
        ZnccScalar::score_at(image, plan, x, y)
    }

    fn score_map(image: ImageView<'_>, plan: &TemplatePlan) -> FinderResult<ScoreMap> {
        let (map_width, map_height) = placement_range(image, plan)?;
        let stats = WindowStats::compute(image, plan)?;

        let rows: Vec<Vec<f32>> = (0..map_height)
            .into_par_iter()
            .map(|y| score_row(image, plan, &stats, y, map_width))
            .collect();

        let mut scores = Vec::with_capacity(map_width * map_height);
        for row in rows {
            scores.extend(row);
        }
        ScoreMap::new(scores, map_width, map_height)
    }
}
