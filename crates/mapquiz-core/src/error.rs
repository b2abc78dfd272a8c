//! Errors raised by the quiz engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building an atlas or playing a round
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum QuizError {
    #[error("Region set is empty")]
    EmptyRegionSet,

    #[error("Duplicate region name: {0}")]
    DuplicateRegion(String),

    /// The region cannot be sampled: zero area, non-finite bounds, or the
    /// diagnostic trial cap was exhausted.
    #[error("Degenerate region: {reason}")]
    DegenerateRegion { reason: String },

    /// A point resolved to zero or several regions.
    #[error("Point ({x}, {y}) lies in {} regions {matches:?}, expected exactly one", .matches.len())]
    GeometryConsistency {
        x: f64,
        y: f64,
        matches: Vec<String>,
    },

    #[error("Invalid action for current phase")]
    InvalidPhase,
}

impl QuizError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        QuizError::DegenerateRegion {
            reason: reason.into(),
        }
    }
}
