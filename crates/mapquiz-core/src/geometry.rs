//! Regions, region sets and the country they partition.
//!
//! This module provides the geometry types the rest of the engine reads:
//! - `Region`: one named administrative subdivision with its polygon
//! - `RegionSet`: the ordered, name-unique collection of regions
//! - `Atlas`: the region set together with the dissolved country outline
//!
//! Polygons are `geo::MultiPolygon<f64>` so that regions made of several
//! islands are handled by the same containment test as single-part ones.

use crate::error::QuizError;
use geo::{Area, BooleanOps, BoundingRect, Centroid, Contains, MultiPolygon, Point};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Axis-aligned bounding box `(min_x, min_y, max_x, max_y)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounding box of a polygon, or `None` when it has no coordinates
    pub fn of(polygon: &MultiPolygon<f64>) -> Option<Self> {
        polygon.bounding_rect().map(|rect| {
            let (min, max) = (rect.min(), rect.max());
            Self::new(min.x, min.y, max.x, max.y)
        })
    }

    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Closed containment test (edges included)
    pub fn contains(&self, point: &Point<f64>) -> bool {
        (self.min_x..=self.max_x).contains(&point.x())
            && (self.min_y..=self.max_y).contains(&point.y())
    }

    /// Smallest box covering both boxes
    pub fn merge(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }
}

/// One named administrative region
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Display name, the value players guess
    pub name: String,
    /// Short label drawn on the region map
    pub abbreviation: String,
    pub polygon: MultiPolygon<f64>,
}

impl Region {
    pub fn new(
        name: impl Into<String>,
        abbreviation: impl Into<String>,
        polygon: impl Into<MultiPolygon<f64>>,
    ) -> Self {
        Self {
            name: name.into(),
            abbreviation: abbreviation.into(),
            polygon: polygon.into(),
        }
    }

    /// Strict containment: points on the boundary are not contained
    pub fn contains(&self, point: &Point<f64>) -> bool {
        self.polygon.contains(point)
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::of(&self.polygon)
    }

    pub fn area(&self) -> f64 {
        self.polygon.unsigned_area()
    }

    /// Where the region's label is drawn (its centroid)
    pub fn label_point(&self) -> Option<Point<f64>> {
        self.polygon.centroid()
    }
}

/// Ordered collection of regions with unique names
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    /// Build a region set, rejecting empty input and repeated names
    pub fn new(regions: Vec<Region>) -> Result<Self, QuizError> {
        if regions.is_empty() {
            return Err(QuizError::EmptyRegionSet);
        }

        let mut seen = HashSet::new();
        for region in &regions {
            if !seen.insert(region.name.as_str()) {
                return Err(QuizError::DuplicateRegion(region.name.clone()));
            }
        }

        Ok(Self { regions })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    pub fn by_name(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Region names in ascending order
    pub fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.regions.iter().map(|r| r.name.clone()).collect();
        names.sort();
        names
    }
}

impl<'a> IntoIterator for &'a RegionSet {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

/// Union of all region polygons
pub fn dissolve(regions: &RegionSet) -> MultiPolygon<f64> {
    let mut iter = regions.iter();
    let first = match iter.next() {
        Some(region) => region.polygon.clone(),
        None => return MultiPolygon::new(Vec::new()),
    };
    iter.fold(first, |country, region| country.union(&region.polygon))
}

/// The country outline together with the regions partitioning it.
///
/// Built once at startup and shared read-only by every session.
#[derive(Debug, Clone)]
pub struct Atlas {
    country: MultiPolygon<f64>,
    regions: RegionSet,
}

impl Atlas {
    /// Build an atlas, dissolving the regions into the country outline
    pub fn new(regions: Vec<Region>) -> Result<Self, QuizError> {
        let regions = RegionSet::new(regions)?;
        let country = dissolve(&regions);
        if country.0.is_empty() {
            return Err(QuizError::EmptyRegionSet);
        }
        Ok(Self { country, regions })
    }

    pub fn country(&self) -> &MultiPolygon<f64> {
        &self.country
    }

    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }

    pub fn country_bounds(&self) -> Option<BoundingBox> {
        BoundingBox::of(&self.country)
    }

    pub fn contains(&self, point: &Point<f64>) -> bool {
        self.country.contains(point)
    }
}
