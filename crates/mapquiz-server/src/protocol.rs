//! WebSocket protocol messages for mapquiz.

use mapquiz_core::{MapPoint, MapView, Score};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Place a new point (only when no point is active)
    NewRound,

    /// Submit a guess; an empty region means no answer yet
    Guess { region: String },

    /// Clear the answered round and start the next one
    PlayAgain,

    /// Request the selectable region names
    ListRegions,

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with the session ID and the guess choices
    Welcome {
        session_id: Uuid,
        choices: Vec<String>,
    },

    /// A new point is on the country map
    RoundStarted { point: MapPoint, map: MapView },

    /// The guess was empty; the current point stays
    AwaitingGuess,

    /// The guess was checked; `map` shows every region
    GuessResult {
        correct_region: String,
        is_correct: bool,
        message: String,
        map: MapView,
        score: Score,
    },

    /// The answered round was cleared
    RoundCleared,

    /// Selectable region names, empty entry first
    Regions { choices: Vec<String> },

    /// Error occurred
    Error { message: String },

    /// Pong response
    Pong,
}
