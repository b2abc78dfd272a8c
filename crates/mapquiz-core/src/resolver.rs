//! Find the region a point falls in.

use crate::error::QuizError;
use crate::geometry::{Region, RegionSet};
use geo::Point;

/// Return the unique region containing `point`.
///
/// Zero or several matches is a `GeometryConsistency` error: the point sits
/// on a shared border, lies outside the country, or the regions overlap.
/// Boundary points are never resolved to either neighbour.
pub fn resolve<'a>(point: &Point<f64>, regions: &'a RegionSet) -> Result<&'a Region, QuizError> {
    let mut matches = regions.iter().filter(|r| r.contains(point));

    match (matches.next(), matches.next()) {
        (Some(region), None) => Ok(region),
        (first, second) => {
            let names = first
                .into_iter()
                .chain(second)
                .chain(matches)
                .map(|r| r.name.clone())
                .collect();
            Err(QuizError::GeometryConsistency {
                x: point.x(),
                y: point.y(),
                matches: names,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::fixtures::{quadrants, square};
    use crate::sampler::sample;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_resolve_interior_point() {
        let regions = RegionSet::new(quadrants()).unwrap();

        assert_eq!(resolve(&Point::new(1.0, 1.0), &regions).unwrap().name, "South West");
        assert_eq!(resolve(&Point::new(9.0, 1.0), &regions).unwrap().name, "South East");
        assert_eq!(resolve(&Point::new(9.0, 9.0), &regions).unwrap().name, "North East");
        assert_eq!(resolve(&Point::new(1.0, 9.0), &regions).unwrap().name, "North West");
    }

    #[test]
    fn test_outside_point_is_inconsistent() {
        let regions = RegionSet::new(quadrants()).unwrap();

        assert_eq!(
            resolve(&Point::new(20.0, 20.0), &regions),
            Err(QuizError::GeometryConsistency {
                x: 20.0,
                y: 20.0,
                matches: vec![],
            })
        );
    }

    #[test]
    fn test_shared_border_is_inconsistent() {
        let regions = RegionSet::new(quadrants()).unwrap();

        assert!(matches!(
            resolve(&Point::new(5.0, 2.0), &regions),
            Err(QuizError::GeometryConsistency { .. })
        ));
    }

    #[test]
    fn test_overlapping_regions_are_inconsistent() {
        let regions = RegionSet::new(vec![
            Region::new("A", "A", square(0.0, 0.0, 2.0)),
            Region::new("B", "B", square(1.0, 1.0, 2.0)),
            Region::new("C", "C", square(0.5, 0.5, 2.0)),
        ])
        .unwrap();

        match resolve(&Point::new(1.5, 1.5), &regions) {
            Err(QuizError::GeometryConsistency { matches, .. }) => {
                assert_eq!(matches, vec!["A", "B", "C"]);
            }
            other => panic!("expected inconsistency, got {:?}", other),
        }
    }

    #[test]
    fn test_sampled_points_resolve_to_origin() {
        let mut rng = StdRng::seed_from_u64(42);
        let regions = RegionSet::new(quadrants()).unwrap();

        for region in &regions {
            for _ in 0..250 {
                let point = sample(&region.polygon, &mut rng).unwrap();
                assert_eq!(resolve(&point, &regions).unwrap().name, region.name);
            }
        }
    }
}
