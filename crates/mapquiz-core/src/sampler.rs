//! Uniform random points inside a polygon.
//!
//! Points are drawn by rejection sampling: draw uniformly from the polygon's
//! bounding box and keep the first draw the polygon contains. The accepted
//! point is uniform over the polygon interior. Each trial succeeds with
//! probability `area(polygon) / area(bounding box)`, so the loop ends almost
//! surely for any positive-area polygon but has no hard bound unless a trial
//! cap is configured.

use crate::error::QuizError;
use crate::geometry::BoundingBox;
use geo::{Area, Contains, MultiPolygon, Point};
use rand::Rng;

/// A sampled point together with the number of draws it took
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub point: Point<f64>,
    /// Bounding-box draws used, including the accepted one (>= 1)
    pub trials: u64,
}

/// Rejection sampler with an optional diagnostic trial cap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sampler {
    max_trials: Option<u64>,
}

impl Sampler {
    /// Sampler that retries until a point is accepted
    pub const fn unbounded() -> Self {
        Self { max_trials: None }
    }

    /// Sampler that gives up with `DegenerateRegion` after `max_trials`
    /// rejected draws. The distribution of accepted points is unchanged.
    pub const fn with_trial_cap(max_trials: u64) -> Self {
        Self {
            max_trials: Some(max_trials),
        }
    }

    pub fn max_trials(&self) -> Option<u64> {
        self.max_trials
    }

    /// Draw a point uniformly distributed over `polygon`'s interior
    pub fn sample<R: Rng>(
        &self,
        polygon: &MultiPolygon<f64>,
        rng: &mut R,
    ) -> Result<Point<f64>, QuizError> {
        self.sample_with_stats(polygon, rng).map(|s| s.point)
    }

    /// Like [`Sampler::sample`], also reporting how many draws were needed
    pub fn sample_with_stats<R: Rng>(
        &self,
        polygon: &MultiPolygon<f64>,
        rng: &mut R,
    ) -> Result<Sample, QuizError> {
        let bbox = checked_bounds(polygon)?;

        let mut trials: u64 = 0;
        loop {
            if let Some(cap) = self.max_trials {
                if trials >= cap {
                    return Err(QuizError::degenerate(format!(
                        "no point accepted after {} trials",
                        cap
                    )));
                }
            }
            trials += 1;

            let x = rng.gen_range(bbox.min_x..=bbox.max_x);
            let y = rng.gen_range(bbox.min_y..=bbox.max_y);
            let candidate = Point::new(x, y);
            if polygon.contains(&candidate) {
                return Ok(Sample {
                    point: candidate,
                    trials,
                });
            }
        }
    }
}

/// Draw a point uniformly inside `polygon` with no trial cap
pub fn sample<R: Rng>(
    polygon: &MultiPolygon<f64>,
    rng: &mut R,
) -> Result<Point<f64>, QuizError> {
    Sampler::unbounded().sample(polygon, rng)
}

/// Bounding box of a samplable polygon; fails on empty, zero-area or
/// non-finite input.
fn checked_bounds(polygon: &MultiPolygon<f64>) -> Result<BoundingBox, QuizError> {
    let bbox = BoundingBox::of(polygon).ok_or_else(|| QuizError::degenerate("empty polygon"))?;
    if !bbox.is_finite() {
        return Err(QuizError::degenerate("non-finite bounding box"));
    }

    let area = polygon.unsigned_area();
    if !area.is_finite() || area <= 0.0 || bbox.area() <= 0.0 {
        return Err(QuizError::degenerate("zero area"));
    }

    Ok(bbox)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::fixtures::square;
    use geo::{polygon, LineString, Polygon};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn triangle() -> MultiPolygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 0.0, y: 10.0),
            (x: 0.0, y: 0.0),
        ]
        .into()
    }

    #[test]
    fn test_triangle_points_inside_and_acceptance_rate() {
        let mut rng = StdRng::seed_from_u64(7);
        let polygon = triangle();
        let sampler = Sampler::unbounded();

        let mut total_trials = 0u64;
        let mut outside = 0;
        for _ in 0..10_000 {
            let sample = sampler.sample_with_stats(&polygon, &mut rng).unwrap();
            total_trials += sample.trials;
            // Strictly inside the triangle: x > 0, y > 0, x + y < 10
            let (x, y) = (sample.point.x(), sample.point.y());
            if !(x > 0.0 && y > 0.0 && x + y < 10.0) {
                outside += 1;
            }
        }

        assert_eq!(outside, 0);
        let acceptance = 10_000.0 / total_trials as f64;
        assert!(
            (acceptance - 0.5).abs() < 0.02,
            "acceptance rate {} too far from 0.5",
            acceptance
        );
    }

    #[test]
    fn test_every_sample_is_contained() {
        let mut rng = StdRng::seed_from_u64(11);
        // L-shaped region, concave
        let polygon: MultiPolygon<f64> = polygon![
            (x: 0.0, y: 0.0),
            (x: 4.0, y: 0.0),
            (x: 4.0, y: 1.0),
            (x: 1.0, y: 1.0),
            (x: 1.0, y: 4.0),
            (x: 0.0, y: 4.0),
            (x: 0.0, y: 0.0),
        ]
        .into();

        for _ in 0..2_000 {
            let point = sample(&polygon, &mut rng).unwrap();
            assert!(polygon.contains(&point));
        }
    }

    #[test]
    fn test_multi_part_polygon() {
        let mut rng = StdRng::seed_from_u64(3);
        let polygon = MultiPolygon::new(vec![square(0.0, 0.0, 1.0), square(9.0, 9.0, 1.0)]);

        let mut near_origin = 0;
        for _ in 0..1_000 {
            let point = sample(&polygon, &mut rng).unwrap();
            assert!(polygon.contains(&point));
            if point.x() < 5.0 {
                near_origin += 1;
            }
        }

        // Both parts have equal area
        assert!((400..=600).contains(&near_origin), "{}", near_origin);
    }

    #[test]
    fn test_zero_area_fails_fast() {
        let mut rng = StdRng::seed_from_u64(0);
        let flat: MultiPolygon<f64> = polygon![
            (x: 0.0, y: 0.0),
            (x: 5.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 0.0, y: 0.0),
        ]
        .into();

        assert!(matches!(
            sample(&flat, &mut rng),
            Err(QuizError::DegenerateRegion { .. })
        ));
    }

    #[test]
    fn test_empty_polygon_fails_fast() {
        let mut rng = StdRng::seed_from_u64(0);
        let empty = MultiPolygon::<f64>::new(vec![]);

        assert!(matches!(
            sample(&empty, &mut rng),
            Err(QuizError::DegenerateRegion { .. })
        ));
    }

    #[test]
    fn test_non_finite_bounds_fail_fast() {
        let mut rng = StdRng::seed_from_u64(0);
        let exterior = LineString::from(vec![
            (0.0, 0.0),
            (f64::INFINITY, 0.0),
            (0.0, 1.0),
            (0.0, 0.0),
        ]);
        let polygon: MultiPolygon<f64> = Polygon::new(exterior, vec![]).into();

        assert!(matches!(
            sample(&polygon, &mut rng),
            Err(QuizError::DegenerateRegion { .. })
        ));
    }

    #[test]
    fn test_trial_cap_exhausted() {
        let mut rng = StdRng::seed_from_u64(5);
        // Thin diagonal sliver: almost every bounding-box draw misses
        let sliver: MultiPolygon<f64> = polygon![
            (x: 0.0, y: 0.0),
            (x: 1000.0, y: 1000.0),
            (x: 1000.0, y: 1000.001),
            (x: 0.0, y: 0.0),
        ]
        .into();

        let sampler = Sampler::with_trial_cap(1);
        let result = (0..50).find_map(|_| sampler.sample(&sliver, &mut rng).err());
        assert!(matches!(result, Some(QuizError::DegenerateRegion { .. })));
    }

    #[test]
    fn test_trial_cap_does_not_affect_easy_polygons() {
        let mut rng = StdRng::seed_from_u64(9);
        let polygon: MultiPolygon<f64> = square(0.0, 0.0, 1.0).into();
        let sampler = Sampler::with_trial_cap(1_000);

        for _ in 0..100 {
            let sample = sampler.sample_with_stats(&polygon, &mut rng).unwrap();
            assert!(sample.trials <= 1_000);
            assert!(polygon.contains(&sample.point));
        }
    }
}
