//! Candidate extraction from score maps.
//!
//! Both selectors walk the map in row-major order. The single-best selector
//! breaks score ties toward the earliest placement (smaller y, then smaller
//! x), so repeated runs over the same pixels pick the same location.

use crate::kernel::ScoreMap;
use std::cmp::Ordering;

/// Candidate placement in score-map (buffer-local) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// X coordinate (column) of the placement's top-left corner.
    pub x: usize,
    /// Y coordinate (row) of the placement's top-left corner.
    pub y: usize,
    /// ZNCC score at the placement.
    pub score: f32,
}

fn peak_cmp_desc(a: &Peak, b: &Peak) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.y.cmp(&b.y))
        .then_with(|| a.x.cmp(&b.x))
}

/// Returns the global maximum of the map.
pub fn best_peak(map: &ScoreMap) -> Option<Peak> {
    let width = map.width();
    let mut best: Option<Peak> = None;
    for (idx, &score) in map.as_slice().iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        let peak = Peak {
            x: idx % width,
            y: idx / width,
            score,
        };
        match best {
            Some(current) if peak_cmp_desc(&peak, &current) != Ordering::Less => {}
            _ => best = Some(peak),
        }
    }
    best
}

/// Returns every placement scoring at least `threshold`, row-major.
pub fn peaks_at_least(map: &ScoreMap, threshold: f64) -> Vec<Peak> {
    let width = map.width();
    map.as_slice()
        .iter()
        .enumerate()
        .filter(|(_, &score)| f64::from(score) >= threshold)
        .map(|(idx, &score)| Peak {
            x: idx % width,
            y: idx / width,
            score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{best_peak, peaks_at_least, Peak};
    use crate::kernel::ScoreMap;

    fn map(scores: Vec<f32>, width: usize, height: usize) -> ScoreMap {
        ScoreMap::new(scores, width, height).unwrap()
    }

    #[test]
    fn best_peak_prefers_earliest_tie() {
        let map = map(vec![0.1, 0.9, 0.2, 0.9, 0.3, 0.5], 3, 2);
        assert_eq!(
            best_peak(&map),
            Some(Peak {
                x: 1,
                y: 0,
                score: 0.9
            })
        );
    }

    #[test]
    fn peaks_at_least_is_row_major() {
        let map = map(vec![0.95, 0.1, 0.8, 0.99, 0.5, 0.8], 3, 2);
        let peaks = peaks_at_least(&map, 0.8);
        let coords: Vec<(usize, usize)> = peaks.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(coords, vec![(0, 0), (2, 0), (0, 1), (2, 1)]);
    }
}
