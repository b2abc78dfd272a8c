//! Serializable map views.
//!
//! The engine does not draw anything itself. A `MapView` carries everything a
//! client needs to plot one of the two maps of a round:
//! - the country map, shown while the player is guessing: the dissolved
//!   country outline and the red point marker
//! - the region map, shown with the answer: every region outline, the marker,
//!   and each region's abbreviation at its centroid

use crate::geometry::{Atlas, BoundingBox};
use geo::{LineString, MultiPolygon, Point};
use serde::{Deserialize, Serialize};

/// Plain `{x, y}` coordinate on the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

impl From<Point<f64>> for MapPoint {
    fn from(point: Point<f64>) -> Self {
        Self {
            x: point.x(),
            y: point.y(),
        }
    }
}

/// Which of the two maps a view describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapKind {
    Country,
    Regions,
}

/// All rings (exteriors and holes) of one shape, to be filled even-odd
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// Region name, `None` for the country outline
    pub name: Option<String>,
    pub rings: Vec<Vec<MapPoint>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub at: MapPoint,
}

/// Drawing style shared by both maps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapStyle {
    pub fill_color: String,
    pub edge_color: String,
    pub line_width: f64,
    pub marker_color: String,
    pub marker_size: f64,
    pub label_font_size: f64,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            fill_color: "white".to_string(),
            edge_color: "black".to_string(),
            line_width: 0.5,
            marker_color: "red".to_string(),
            marker_size: 5.0,
            label_font_size: 5.0,
        }
    }
}

/// Everything needed to plot one map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub kind: MapKind,
    /// Extent covering every outline and the marker
    pub bounds: BoundingBox,
    pub outlines: Vec<Outline>,
    pub marker: MapPoint,
    /// Labels are centred on their anchor
    pub labels: Vec<Label>,
    pub style: MapStyle,
}

impl MapView {
    /// The country outline with the point, shown before the answer
    pub fn country(atlas: &Atlas, point: Point<f64>) -> Self {
        Self {
            kind: MapKind::Country,
            bounds: view_bounds(atlas, point),
            outlines: vec![Outline {
                name: None,
                rings: rings(atlas.country()),
            }],
            marker: point.into(),
            labels: Vec::new(),
            style: MapStyle::default(),
        }
    }

    /// Every region outline and label with the point, shown with the answer
    pub fn regions(atlas: &Atlas, point: Point<f64>) -> Self {
        let outlines = atlas
            .regions()
            .iter()
            .map(|region| Outline {
                name: Some(region.name.clone()),
                rings: rings(&region.polygon),
            })
            .collect();

        let labels = atlas
            .regions()
            .iter()
            .filter_map(|region| {
                region.label_point().map(|at| Label {
                    text: region.abbreviation.clone(),
                    at: at.into(),
                })
            })
            .collect();

        Self {
            kind: MapKind::Regions,
            bounds: view_bounds(atlas, point),
            outlines,
            marker: point.into(),
            labels,
            style: MapStyle::default(),
        }
    }
}

fn view_bounds(atlas: &Atlas, point: Point<f64>) -> BoundingBox {
    let marker = BoundingBox::new(point.x(), point.y(), point.x(), point.y());
    match atlas.country_bounds() {
        Some(country) if country.contains(&point) => country,
        Some(country) => country.merge(&marker),
        None => marker,
    }
}

fn rings(polygon: &MultiPolygon<f64>) -> Vec<Vec<MapPoint>> {
    polygon
        .0
        .iter()
        .flat_map(|part| std::iter::once(part.exterior()).chain(part.interiors()))
        .map(ring)
        .collect()
}

fn ring(line: &LineString<f64>) -> Vec<MapPoint> {
    line.points().map(MapPoint::from).collect()
}
