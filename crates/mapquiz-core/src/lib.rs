//! mapquiz - guess which region a random point falls in
//!
//! This crate provides the core engine of the quiz, including:
//! - Region geometry and the dissolved country outline
//! - Shapefile loading
//! - Uniform random point sampling inside a region
//! - Resolving the region that contains a point
//! - The per-session round state machine
//! - Serializable map views for the client to draw
//!
//! # Architecture
//!
//! The engine is synchronous and holds no global state. An [`Atlas`] is built
//! once (usually with [`load_atlas`]) and shared read-only; every player gets
//! their own [`Session`] which stores at most one active point.
//!
//! # Modules
//!
//! - [`geometry`]: regions, region sets, bounding boxes, the atlas
//! - [`loader`]: shapefile to atlas
//! - [`sampler`]: rejection sampling inside a polygon
//! - [`resolver`]: point to containing region
//! - [`round`]: round state machine and guess checking
//! - [`map`]: map views

pub mod actions;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod map;
pub mod resolver;
pub mod round;
pub mod sampler;

// Re-export commonly used types
pub use actions::{RoundAction, RoundEvent};
pub use error::QuizError;
pub use geometry::{dissolve, Atlas, BoundingBox, Region, RegionSet};
pub use loader::{load_atlas, LoadError, LoaderConfig};
pub use map::{Label, MapKind, MapPoint, MapStyle, MapView, Outline};
pub use resolver::resolve;
pub use round::{check_guess, random_round_point, GuessOutcome, RoundPhase, Score, Session};
pub use sampler::{sample, Sample, Sampler};

pub use geo::{MultiPolygon, Point, Polygon};
