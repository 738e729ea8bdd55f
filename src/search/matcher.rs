//! Pattern-to-screenshot correlation.
//!
//! Exact patterns (similarity 0.99) are compared color-to-color; every other
//! threshold compares luma-to-luma. Scores are zero-mean normalized
//! cross-correlation, so a threshold of 0.8 tolerates moderate contrast and
//! brightness drift while 0.99 effectively demands identical pixels.

use crate::candidate::{best_peak, peaks_at_least, Peak};
use crate::geometry::{Location, Rectangle};
use crate::image::ImageView;
use crate::kernel::fft::ZnccFft;
use crate::kernel::{placement_range, Kernel, ScoreMap};
use crate::pattern::{PatternImage, EXACT_SIMILARITY};
use crate::screen::ScreenshotImage;
use crate::search::MatchMode;
use crate::template::TemplatePlan;
use crate::util::FinderResult;
use tracing::{debug, debug_span, warn};

#[cfg(not(feature = "rayon"))]
use crate::kernel::scalar::ZnccScalar as Zncc;
#[cfg(feature = "rayon")]
use crate::kernel::rayon::ZnccRayon as Zncc;

/// Direct-kernel multiply-adds above which the FFT kernel is cheaper.
const FFT_CROSSOVER: usize = 1 << 24;

/// Checks that a pattern of `size` fits inside `region`, warning once per
/// offending dimension.
pub fn is_pattern_size_correct(size: (u32, u32), region: &Rectangle) -> bool {
    let (width, height) = size;
    let mut fits = true;
    if width > region.width() {
        warn!(
            pattern_width = width,
            region_width = region.width(),
            "pattern width exceeds region width"
        );
        fits = false;
    }
    if height > region.height() {
        warn!(
            pattern_height = height,
            region_height = region.height(),
            "pattern height exceeds region height"
        );
        fits = false;
    }
    fits
}

/// Scores every placement with whichever kernel does less work.
fn score_map(image: ImageView<'_>, plan: &TemplatePlan) -> FinderResult<ScoreMap> {
    let (map_width, map_height) = placement_range(image, plan)?;
    let direct = (map_width * map_height)
        .saturating_mul(plan.width() * plan.height())
        .saturating_mul(plan.channels());
    if direct > FFT_CROSSOVER {
        debug!(direct, "using fft kernel");
        ZnccFft::score_map(image, plan)
    } else {
        <Zncc as Kernel>::score_map(image, plan)
    }
}

/// Locates `pattern` in `shot` and returns absolute top-left corners.
///
/// Fails with `DegenerateTemplate` when the selected pattern buffer has no
/// variance, and with `RoiOutOfBounds` when the pattern is larger than the
/// screenshot.
pub fn locate(
    pattern: &PatternImage,
    similarity: f64,
    shot: &ScreenshotImage,
    mode: MatchMode,
) -> FinderResult<Vec<Location>> {
    let color = similarity == EXACT_SIMILARITY;
    let _span = debug_span!(
        "locate",
        pattern = pattern.name(),
        similarity,
        color,
        mode = mode.as_str()
    )
    .entered();

    let (needle, haystack) = if color {
        (pattern.color(), shot.color())
    } else {
        (pattern.gray(), shot.gray())
    };
    let plan = TemplatePlan::from_view(needle.view())?;
    let map = score_map(haystack.view(), &plan)?;

    let peaks: Vec<Peak> = match mode {
        MatchMode::Single => best_peak(&map)
            .filter(|peak| f64::from(peak.score) >= similarity)
            .into_iter()
            .collect(),
        MatchMode::Multiple => peaks_at_least(&map, similarity),
    };

    let origin = shot.region().top_left();
    let found: Vec<Location> = peaks
        .iter()
        .map(|peak| origin.offset(peak.x as i32, peak.y as i32))
        .collect();
    debug!(matches = found.len(), "match complete");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::is_pattern_size_correct;
    use crate::geometry::Rectangle;

    #[test]
    fn size_check_flags_each_dimension() {
        let region = Rectangle::new(0, 0, 40, 50);
        assert!(!is_pattern_size_correct((50, 50), &region));
        assert!(!is_pattern_size_correct((10, 60), &region));
        assert!(is_pattern_size_correct((40, 50), &region));
    }
}
