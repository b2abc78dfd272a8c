//! Shapefile loading.
//!
//! Each polygon feature becomes one `Region`, named from two attributes of its
//! dBase record: the display name and the abbreviation. The defaults match
//! the IBGE BC250 state layer (`nome`, `sigla`).

use crate::error::QuizError;
use crate::geometry::{Atlas, Region};
use geo::MultiPolygon;
use shapefile::dbase::{FieldValue, Record};
use shapefile::Shape;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read shapefile: {0}")]
    Shapefile(#[from] shapefile::Error),

    #[error("Feature {index} has no usable '{field}' attribute")]
    MissingField { index: usize, field: String },

    #[error("Feature {index} is a {shape_type} shape, expected a polygon")]
    UnsupportedShape { index: usize, shape_type: String },

    #[error(transparent)]
    Atlas(#[from] QuizError),
}

/// Which record attributes name a region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub name_field: String,
    pub abbreviation_field: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            name_field: "nome".to_string(),
            abbreviation_field: "sigla".to_string(),
        }
    }
}

/// Read every feature of a polygon shapefile and build the atlas
pub fn load_atlas(path: impl AsRef<Path>, config: &LoaderConfig) -> Result<Atlas, LoadError> {
    let features = shapefile::read_as::<_, Shape, Record>(path)?;

    let regions = features
        .into_iter()
        .enumerate()
        .map(|(index, (shape, record))| region_from_feature(index, shape, &record, config))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Atlas::new(regions)?)
}

/// Convert one shapefile feature into a region
pub fn region_from_feature(
    index: usize,
    shape: Shape,
    record: &Record,
    config: &LoaderConfig,
) -> Result<Region, LoadError> {
    let polygon: MultiPolygon<f64> = match shape {
        Shape::Polygon(p) => p.into(),
        Shape::PolygonM(p) => p.into(),
        Shape::PolygonZ(p) => p.into(),
        other => {
            return Err(LoadError::UnsupportedShape {
                index,
                shape_type: format!("{:?}", other.shapetype()),
            })
        }
    };

    let name = text_field(index, record, &config.name_field)?;
    let abbreviation = text_field(index, record, &config.abbreviation_field)?;
    Ok(Region::new(name, abbreviation, polygon))
}

fn text_field(index: usize, record: &Record, field: &str) -> Result<String, LoadError> {
    let value = match record.get(field) {
        Some(FieldValue::Character(Some(text))) => text.trim(),
        Some(FieldValue::Memo(text)) => text.trim(),
        _ => "",
    };

    if value.is_empty() {
        return Err(LoadError::MissingField {
            index,
            field: field.to_string(),
        });
    }
    Ok(value.to_string())
}
