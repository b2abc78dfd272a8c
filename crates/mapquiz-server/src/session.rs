//! Player session management.

use mapquiz_core::{
    Atlas, GuessOutcome, MapView, QuizError, RoundAction, RoundEvent, Sampler, Score, Session,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::protocol::{ClientMessage, ServerMessage};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Quiz(#[from] QuizError),

    #[error("Session not found")]
    SessionNotFound,

    #[error("Unexpected events: {0:?}")]
    UnexpectedEvents(Vec<RoundEvent>),
}

/// One connected player and their round state.
///
/// Every connection owns its session; nothing here is shared between players
/// except the read-only atlas.
pub struct PlayerSession {
    pub id: Uuid,
    session: Session,
    atlas: Arc<Atlas>,
    rng: StdRng,
}

impl PlayerSession {
    pub fn new(id: Uuid, atlas: Arc<Atlas>, sampler: Sampler) -> Self {
        Self::with_rng(id, atlas, sampler, StdRng::from_entropy())
    }

    pub fn with_rng(id: Uuid, atlas: Arc<Atlas>, sampler: Sampler, rng: StdRng) -> Self {
        Self {
            id,
            session: Session::with_sampler(sampler),
            atlas,
            rng,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn welcome(&self) -> ServerMessage {
        ServerMessage::Welcome {
            session_id: self.id,
            choices: Session::choices(&self.atlas),
        }
    }

    /// Handle a client message, returning the replies in order.
    ///
    /// Failures are logged and turned into an `Error` reply. A guess on a
    /// point that resolves to no single region abandons the round, so a new
    /// round is started right after the error.
    pub fn handle(&mut self, msg: ClientMessage) -> Vec<ServerMessage> {
        let result = match msg {
            ClientMessage::NewRound => self.start_round().map(|m| vec![m]),
            ClientMessage::Guess { region } => return self.guess_replies(region),
            ClientMessage::PlayAgain => self.play_again(),
            ClientMessage::ListRegions => Ok(vec![ServerMessage::Regions {
                choices: Session::choices(&self.atlas),
            }]),
            ClientMessage::Ping => Ok(vec![ServerMessage::Pong]),
        };

        result.unwrap_or_else(|e| vec![self.error_reply(&e)])
    }

    fn guess_replies(&mut self, region: String) -> Vec<ServerMessage> {
        match self.guess(region) {
            Ok(reply) => vec![reply],
            Err(e @ SessionError::Quiz(QuizError::GeometryConsistency { .. })) => {
                let abandoned = self.error_reply(&e);
                let next = self
                    .start_round()
                    .unwrap_or_else(|e| self.error_reply(&e));
                vec![abandoned, next]
            }
            Err(e) => vec![self.error_reply(&e)],
        }
    }

    /// Place a new point and describe the country map
    pub fn start_round(&mut self) -> Result<ServerMessage, SessionError> {
        let events = self.apply(RoundAction::NewRound)?;
        if let [RoundEvent::RoundStarted { point }] = events.as_slice() {
            debug!("Session {} started a round", self.id);
            return Ok(ServerMessage::RoundStarted {
                point: (*point).into(),
                map: MapView::country(&self.atlas, *point),
            });
        }
        Err(SessionError::UnexpectedEvents(events))
    }

    /// Check a guess and describe the region map
    pub fn guess(&mut self, region: String) -> Result<ServerMessage, SessionError> {
        let events = self.apply(RoundAction::Guess(region))?;
        if let [RoundEvent::GuessChecked { outcome, score }] = events.as_slice() {
            return self.guess_result(outcome, *score);
        }
        if events == [RoundEvent::AwaitingGuess] {
            return Ok(ServerMessage::AwaitingGuess);
        }
        Err(SessionError::UnexpectedEvents(events))
    }

    /// Clear the answered round and immediately start the next one.
    ///
    /// The round is cleared even if the next one cannot start; that failure
    /// follows `RoundCleared` as an `Error` reply.
    pub fn play_again(&mut self) -> Result<Vec<ServerMessage>, SessionError> {
        let events = self.apply(RoundAction::PlayAgain)?;
        if events != [RoundEvent::RoundCleared] {
            return Err(SessionError::UnexpectedEvents(events));
        }
        let next = self
            .start_round()
            .unwrap_or_else(|e| self.error_reply(&e));
        Ok(vec![ServerMessage::RoundCleared, next])
    }

    fn apply(&mut self, action: RoundAction) -> Result<Vec<RoundEvent>, SessionError> {
        Ok(self
            .session
            .apply_action(&self.atlas, action, &mut self.rng)?)
    }

    fn guess_result(
        &self,
        outcome: &GuessOutcome,
        score: Score,
    ) -> Result<ServerMessage, SessionError> {
        let message = if outcome.is_correct {
            format!("Correct! It was {}", outcome.correct_region)
        } else {
            format!("Wrong! It was {}", outcome.correct_region)
        };

        // The point stays stored until the player asks for another round
        let point = self
            .session
            .current_point()
            .ok_or(QuizError::InvalidPhase)?;

        Ok(ServerMessage::GuessResult {
            correct_region: outcome.correct_region.clone(),
            is_correct: outcome.is_correct,
            message,
            map: MapView::regions(&self.atlas, point),
            score,
        })
    }

    fn error_reply(&self, e: &SessionError) -> ServerMessage {
        match e {
            SessionError::Quiz(QuizError::InvalidPhase) => {
                warn!("Session {}: {}", self.id, e)
            }
            _ => error!("Session {}: {}", self.id, e),
        }
        ServerMessage::Error {
            message: e.to_string(),
        }
    }
}
