//! Cumulative-solve curves.

use serde::Serialize;

/// One step of a cumulative-solve curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurvePoint {
    /// Cases solved in strictly less than `time_secs`.
    pub solved: usize,
    pub time_secs: u64,
}

/// Step function of solved cases over time for one solver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateCurve {
    pub solver: String,
    pub points: Vec<CurvePoint>,
}

impl AggregateCurve {
    /// Count at the last emitted step.
    pub fn total_solved(&self) -> usize {
        self.points.last().map(|p| p.solved).unwrap_or(0)
    }
}

/// Builds the step function over integer edges `0..horizon_secs`.
///
/// A point is emitted only where the count differs from the previous edge,
/// so the first point is always `(0, 0)`.
pub fn cumulative_curve(times: &[f64], horizon_secs: u64) -> Vec<CurvePoint> {
    let mut sorted = times.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut points = Vec::new();
    let mut last = None;
    for edge in 0..horizon_secs {
        let solved = sorted.partition_point(|&t| t < edge as f64);
        if last != Some(solved) {
            points.push(CurvePoint {
                solved,
                time_secs: edge,
            });
            last = Some(solved);
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(solved: usize, time_secs: u64) -> CurvePoint {
        CurvePoint { solved, time_secs }
    }

    #[test]
    fn test_curve_steps() {
        let points = cumulative_curve(&[0.5, 2.0, 2.5, 7.1], 3600);
        assert_eq!(points, vec![pt(0, 0), pt(1, 1), pt(3, 3), pt(4, 8)]);
    }

    #[test]
    fn test_curve_edge_is_exclusive() {
        // 2.0 is not counted at edge 2, only at edge 3.
        let points = cumulative_curve(&[2.0], 10);
        assert_eq!(points, vec![pt(0, 0), pt(1, 3)]);
    }

    #[test]
    fn test_curve_empty_times() {
        assert_eq!(cumulative_curve(&[], 3600), vec![pt(0, 0)]);
        assert!(cumulative_curve(&[1.0], 0).is_empty());
    }

    #[test]
    fn test_curve_ignores_times_past_horizon() {
        let points = cumulative_curve(&[1.5, 4000.0], 3600);
        assert_eq!(points, vec![pt(0, 0), pt(1, 2)]);
    }

    #[test]
    fn test_curve_last_edge_is_horizon_minus_one() {
        // The last edge is 3599, so only times below 3599 are counted.
        assert_eq!(
            cumulative_curve(&[1.0, 3598.5], 3600),
            vec![pt(0, 0), pt(1, 2), pt(2, 3599)]
        );
        assert_eq!(cumulative_curve(&[1.0, 3599.5], 3600), vec![pt(0, 0), pt(1, 2)]);
    }

    #[test]
    fn test_curve_is_strictly_monotonic() {
        let times: Vec<f64> = (0..200).map(|i| (i * 37 % 500) as f64 / 7.0).collect();
        let points = cumulative_curve(&times, 3600);
        for pair in points.windows(2) {
            assert!(pair[0].solved < pair[1].solved);
            assert!(pair[0].time_secs < pair[1].time_secs);
        }
        let last = points.last().unwrap();
        assert_eq!(last.solved, times.iter().filter(|&&t| t < 3600.0).count());
    }
}
