//! Per-session round state machine.
//!
//! A round moves through three phases:
//!
//! ```text
//! NoActivePoint --start_new_round--> PointRevealed --submit_guess--> AnswerChecked
//!       ^                                                                  |
//!       +-------------------------------play_again-------------------------+
//! ```
//!
//! Each player owns one `Session`; sessions never share a point. The atlas is
//! passed in by reference on every call rather than stored, so one atlas
//! can back any number of sessions.

use crate::actions::{RoundAction, RoundEvent};
use crate::error::QuizError;
use crate::geometry::{Atlas, RegionSet};
use crate::resolver::resolve;
use crate::sampler::Sampler;
use geo::Point;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Where the current round stands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// No point stored; a new round must be started
    NoActivePoint,

    /// A point is on the map, waiting for the player's guess
    PointRevealed { point: Point<f64> },

    /// The guess was checked and the answer shown
    AnswerChecked {
        point: Point<f64>,
        outcome: GuessOutcome,
    },
}

/// Result of comparing a guess with the region that contains the point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessOutcome {
    pub guess: String,
    pub correct_region: String,
    pub is_correct: bool,
}

/// Running tally for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Rounds whose guess has been checked
    pub answered: u32,
    pub correct: u32,
}

impl Score {
    fn record(&mut self, is_correct: bool) {
        self.answered += 1;
        if is_correct {
            self.correct += 1;
        }
    }
}

/// Pick a region uniformly at random and sample a point inside it
pub fn random_round_point<R: Rng>(
    regions: &RegionSet,
    sampler: &Sampler,
    rng: &mut R,
) -> Result<Point<f64>, QuizError> {
    if regions.is_empty() {
        return Err(QuizError::EmptyRegionSet);
    }
    let index = rng.gen_range(0..regions.len());
    let region = regions.get(index).ok_or(QuizError::EmptyRegionSet)?;
    sampler.sample(&region.polygon, rng)
}

/// Resolve the region holding `point` and compare it with `guessed_name`.
///
/// The comparison is an exact, case-sensitive string match.
pub fn check_guess(
    point: &Point<f64>,
    regions: &RegionSet,
    guessed_name: &str,
) -> Result<(String, bool), QuizError> {
    let region = resolve(point, regions)?;
    Ok((region.name.clone(), region.name == guessed_name))
}

/// State of one player's game
#[derive(Debug, Clone)]
pub struct Session {
    phase: RoundPhase,
    score: Score,
    sampler: Sampler,
}

impl Session {
    /// Create a session with no active point and an unbounded sampler
    pub fn new() -> Self {
        Self::with_sampler(Sampler::unbounded())
    }

    pub fn with_sampler(sampler: Sampler) -> Self {
        Self {
            phase: RoundPhase::NoActivePoint,
            score: Score::default(),
            sampler,
        }
    }

    pub fn phase(&self) -> &RoundPhase {
        &self.phase
    }

    pub fn score(&self) -> Score {
        self.score
    }

    /// The point of the current round, if any
    pub fn current_point(&self) -> Option<Point<f64>> {
        match &self.phase {
            RoundPhase::NoActivePoint => None,
            RoundPhase::PointRevealed { point } | RoundPhase::AnswerChecked { point, .. } => {
                Some(*point)
            }
        }
    }

    /// The last checked guess, while its answer is on screen
    pub fn outcome(&self) -> Option<&GuessOutcome> {
        match &self.phase {
            RoundPhase::AnswerChecked { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    /// Options for the guess selector: an empty entry, then sorted names
    pub fn choices(atlas: &Atlas) -> Vec<String> {
        let mut choices = vec![String::new()];
        choices.extend(atlas.regions().sorted_names());
        choices
    }

    /// Place a new random point. Only valid when no point is active.
    pub fn start_new_round<R: Rng>(
        &mut self,
        atlas: &Atlas,
        rng: &mut R,
    ) -> Result<Point<f64>, QuizError> {
        if self.phase != RoundPhase::NoActivePoint {
            return Err(QuizError::InvalidPhase);
        }

        let point = random_round_point(atlas.regions(), &self.sampler, rng)?;
        self.phase = RoundPhase::PointRevealed { point };
        Ok(point)
    }

    /// Check the player's guess against the current point.
    ///
    /// An empty guess means no answer yet: `Ok(None)` and nothing changes.
    /// If the point does not resolve to exactly one region the round is
    /// abandoned: the point is dropped, the score is untouched and the
    /// `GeometryConsistency` error is returned.
    pub fn submit_guess(
        &mut self,
        atlas: &Atlas,
        guess: &str,
    ) -> Result<Option<GuessOutcome>, QuizError> {
        let point = match &self.phase {
            RoundPhase::PointRevealed { point } => *point,
            _ => return Err(QuizError::InvalidPhase),
        };
        if guess.is_empty() {
            return Ok(None);
        }

        let (correct_region, is_correct) = match check_guess(&point, atlas.regions(), guess) {
            Ok(checked) => checked,
            Err(e) => {
                self.phase = RoundPhase::NoActivePoint;
                return Err(e);
            }
        };
        let outcome = GuessOutcome {
            guess: guess.to_string(),
            correct_region,
            is_correct,
        };

        self.score.record(is_correct);
        self.phase = RoundPhase::AnswerChecked {
            point,
            outcome: outcome.clone(),
        };
        Ok(Some(outcome))
    }

    /// Clear the answered round. Only valid once the answer was shown.
    pub fn play_again(&mut self) -> Result<(), QuizError> {
        if !matches!(self.phase, RoundPhase::AnswerChecked { .. }) {
            return Err(QuizError::InvalidPhase);
        }
        self.phase = RoundPhase::NoActivePoint;
        Ok(())
    }

    /// Apply a player action, returning the resulting events
    pub fn apply_action<R: Rng>(
        &mut self,
        atlas: &Atlas,
        action: RoundAction,
        rng: &mut R,
    ) -> Result<Vec<RoundEvent>, QuizError> {
        match action {
            RoundAction::NewRound => {
                let point = self.start_new_round(atlas, rng)?;
                Ok(vec![RoundEvent::RoundStarted { point }])
            }
            RoundAction::Guess(guess) => match self.submit_guess(atlas, &guess)? {
                Some(outcome) => Ok(vec![RoundEvent::GuessChecked {
                    outcome,
                    score: self.score,
                }]),
                None => Ok(vec![RoundEvent::AwaitingGuess]),
            },
            RoundAction::PlayAgain => {
                self.play_again()?;
                Ok(vec![RoundEvent::RoundCleared])
            }
        }
    }

    /// Actions accepted in the current phase
    pub fn valid_actions(&self) -> Vec<RoundAction> {
        match self.phase {
            RoundPhase::NoActivePoint => vec![RoundAction::NewRound],
            RoundPhase::PointRevealed { .. } => vec![RoundAction::Guess(String::new())],
            RoundPhase::AnswerChecked { .. } => vec![RoundAction::PlayAgain],
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
