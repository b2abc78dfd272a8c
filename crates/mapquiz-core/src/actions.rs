//! Player actions and the events they produce.

use crate::round::{GuessOutcome, Score};
use geo::Point;
use serde::{Deserialize, Serialize};

/// Everything a player can do during a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundAction {
    /// Place a new random point (only when no point is active)
    NewRound,
    /// Submit a region name; an empty name means no answer yet
    Guess(String),
    /// Clear the answered round
    PlayAgain,
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoundEvent {
    /// A new point was placed on the map
    RoundStarted { point: Point<f64> },

    /// An empty guess was submitted; the round continues
    AwaitingGuess,

    /// The guess was compared with the region holding the point
    GuessChecked { outcome: GuessOutcome, score: Score },

    /// The stored point was cleared
    RoundCleared,
}
