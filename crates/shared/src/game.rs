use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geo::{self, Bounds, LatLng, PLAY_AREA};
use crate::models::{ChallengeRound, DailyChallenge, GameSettings};
use crate::scoring::{self, ROUNDS};
use crate::viewport::MapHandle;

/// Photo map zoom for randomly generated rounds.
pub const DEFAULT_VIEW_ZOOM: u8 = 17;

/// Progress of one game.
///
/// `guesses[i]` is `None` when round `i` was skipped or ran out of time.
/// Between rounds `guesses.len() == score.len() == round_id`; while a round
/// is being played `guesses` may already hold the current guess.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundState {
    pub round_id: usize,
    pub locations: Vec<LatLng>,
    pub guesses: Vec<Option<LatLng>>,
    pub score: Vec<u32>,
    pub distance_moved: f64,
    pub picked: bool,
    pub skipped: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingGuess { round_id: usize },
    RoundEnded { round_id: usize },
    GameComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundError {
    /// Select was pressed before a guess was placed.
    NoGuess,
    NotAwaitingGuess,
    RoundNotEnded,
}

impl std::fmt::Display for RoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundError::NoGuess => write!(f, "Click the small map to make a guess before selecting"),
            RoundError::NotAwaitingGuess => write!(f, "The round is not accepting guesses"),
            RoundError::RoundNotEnded => write!(f, "The round has not ended yet"),
        }
    }
}

impl std::error::Error for RoundError {}

/// Where and how close the photo map opens for a round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundTarget {
    pub latlng: LatLng,
    pub zoom: u8,
}

/// Supplies the target of each round as the round starts.
pub trait TargetSource {
    fn target(&mut self, round_id: usize) -> RoundTarget;
}

/// Uniform random targets inside a box.
pub struct RandomTargets<R> {
    bounds: Bounds,
    rng: R,
}

impl<R: Rng> RandomTargets<R> {
    pub fn new(rng: R) -> Self {
        Self::within(PLAY_AREA, rng)
    }

    pub fn within(bounds: Bounds, rng: R) -> Self {
        RandomTargets { bounds, rng }
    }
}

impl<R: Rng> TargetSource for RandomTargets<R> {
    fn target(&mut self, _round_id: usize) -> RoundTarget {
        RoundTarget {
            latlng: geo::random_point(&self.bounds, &mut self.rng),
            zoom: DEFAULT_VIEW_ZOOM,
        }
    }
}

/// The pre-authored rounds of a daily challenge, in play order.
pub struct ChallengeTargets {
    rounds: Vec<ChallengeRound>,
}

impl ChallengeTargets {
    pub fn new(challenge: &DailyChallenge) -> Self {
        ChallengeTargets {
            rounds: challenge.daily_challenge.clone(),
        }
    }
}

impl TargetSource for ChallengeTargets {
    fn target(&mut self, round_id: usize) -> RoundTarget {
        match self.rounds.get(round_id) {
            Some(r) => RoundTarget {
                latlng: r.latlng,
                zoom: r.zoom,
            },
            None => RoundTarget {
                latlng: PLAY_AREA.center(),
                zoom: DEFAULT_VIEW_ZOOM,
            },
        }
    }
}

/// Everything the round-end dialog shows.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundResult {
    pub round_id: usize,
    pub target: LatLng,
    pub guess: Option<LatLng>,
    pub score: u32,
    pub guess_distance_m: Option<f64>,
    pub drift_m: f64,
    pub total: u32,
}

/// Drives a five-round game.
pub struct RoundController {
    state: RoundState,
    phase: Phase,
    settings: GameSettings,
    is_challenge: bool,
    view_zoom: u8,
    time_left: Option<u32>,
    targets: Box<dyn TargetSource>,
}

impl std::fmt::Debug for RoundController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundController")
            .field("state", &self.state)
            .field("phase", &self.phase)
            .field("settings", &self.settings)
            .field("is_challenge", &self.is_challenge)
            .field("time_left", &self.time_left)
            .finish_non_exhaustive()
    }
}

impl RoundController {
    /// Start a game; round 0 is generated immediately.
    pub fn new(settings: GameSettings, targets: impl TargetSource + 'static, is_challenge: bool) -> Self {
        let mut controller = RoundController {
            state: RoundState::default(),
            phase: Phase::AwaitingGuess { round_id: 0 },
            settings,
            is_challenge,
            view_zoom: DEFAULT_VIEW_ZOOM,
            time_left: None,
            targets: Box::new(targets),
        };
        controller.begin_round();
        controller
    }

    /// A normal game on random locations.
    pub fn random<R: Rng + 'static>(settings: GameSettings, rng: R) -> Self {
        Self::new(settings, RandomTargets::new(rng), false)
    }

    /// A daily challenge; its own settings override any chosen ones.
    pub fn challenge(challenge: &DailyChallenge) -> Self {
        Self::new(challenge.settings(), ChallengeTargets::new(challenge), true)
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn is_challenge(&self) -> bool {
        self.is_challenge
    }

    /// Seconds left in a timed round.
    pub fn time_left(&self) -> Option<u32> {
        self.time_left
    }

    pub fn current_target(&self) -> LatLng {
        // locations always holds the current round
        self.state.locations[self.state.round_id]
    }

    pub fn current_zoom(&self) -> u8 {
        self.view_zoom
    }

    pub fn total_score(&self) -> u32 {
        scoring::total_score(&self.state.score)
    }

    /// Current guess, if one has been placed this round.
    pub fn current_guess(&self) -> Option<LatLng> {
        match self.phase {
            Phase::AwaitingGuess { round_id } => self.state.guesses.get(round_id).copied().flatten(),
            _ => None,
        }
    }

    /// Place or replace the guess for the current round.
    pub fn register_guess(&mut self, guess: LatLng) -> Result<(), RoundError> {
        self.require_awaiting()?;
        let round_id = self.state.round_id;
        self.state.guesses.truncate(round_id);
        self.state.guesses.push(Some(guess));
        self.state.picked = true;
        Ok(())
    }

    /// Record the photo map's center. Returns the new maximum drift if it grew.
    pub fn track_viewport(&mut self, center: LatLng) -> Option<f64> {
        if !self.settings.dragging || self.require_awaiting().is_err() {
            return None;
        }
        let drift = geo::distance_meters(self.current_target(), center);
        if drift > self.state.distance_moved {
            self.state.distance_moved = drift;
            Some(drift)
        } else {
            None
        }
    }

    /// End the round with the placed guess.
    pub fn select(&mut self) -> Result<RoundResult, RoundError> {
        self.require_awaiting()?;
        if !self.state.picked {
            return Err(RoundError::NoGuess);
        }
        Ok(self.end_round())
    }

    /// Advance the round timer by one second. Returns the result when time runs out.
    pub fn tick(&mut self) -> Option<RoundResult> {
        if self.require_awaiting().is_err() {
            return None;
        }
        let left = self.time_left?;
        let left = left.saturating_sub(1);
        self.time_left = Some(left);
        if left > 0 {
            return None;
        }
        if !self.state.picked {
            self.state.guesses.truncate(self.state.round_id);
            self.state.guesses.push(None);
        }
        Some(self.end_round())
    }

    /// Give up on the current round. The last round ends normally; earlier
    /// rounds go straight on to the next one.
    pub fn skip(&mut self) -> Result<Phase, RoundError> {
        self.require_awaiting()?;
        let round_id = self.state.round_id;
        self.state.guesses.truncate(round_id);
        self.state.guesses.push(None);
        self.state.picked = false;
        self.state.skipped += 1;
        self.end_round();
        if round_id + 1 < ROUNDS {
            self.next_round();
        }
        Ok(self.phase)
    }

    /// Continue from the round-end dialog.
    pub fn advance(&mut self) -> Result<Phase, RoundError> {
        match self.phase {
            Phase::RoundEnded { round_id } if round_id + 1 < ROUNDS => self.next_round(),
            Phase::RoundEnded { .. } => self.phase = Phase::GameComplete,
            _ => return Err(RoundError::RoundNotEnded),
        }
        Ok(self.phase)
    }

    /// Point `map` back at the current target. Game state is not touched.
    pub fn recenter<M: MapHandle + ?Sized>(&self, map: &mut M) {
        map.set_view(self.current_target(), self.view_zoom);
    }

    /// Summary of the most recently ended round.
    pub fn round_result(&self) -> Option<RoundResult> {
        let round_id = match self.phase {
            Phase::RoundEnded { round_id } => round_id,
            Phase::GameComplete => ROUNDS - 1,
            Phase::AwaitingGuess { .. } => return None,
        };
        let target = *self.state.locations.get(round_id)?;
        let guess = self.state.guesses.get(round_id).copied().flatten();
        Some(RoundResult {
            round_id,
            target,
            guess,
            score: self.state.score.get(round_id).copied().unwrap_or(0),
            guess_distance_m: guess.map(|g| geo::distance_meters(target, g)),
            drift_m: self.state.distance_moved,
            total: self.total_score(),
        })
    }

    fn require_awaiting(&self) -> Result<(), RoundError> {
        match self.phase {
            Phase::AwaitingGuess { .. } => Ok(()),
            _ => Err(RoundError::NotAwaitingGuess),
        }
    }

    fn begin_round(&mut self) {
        let target = self.targets.target(self.state.round_id);
        self.state.locations.push(target.latlng);
        self.view_zoom = target.zoom;
        self.state.distance_moved = 0.0;
        self.state.picked = false;
        self.time_left = self.settings.timed;
        self.phase = Phase::AwaitingGuess {
            round_id: self.state.round_id,
        };
    }

    fn next_round(&mut self) {
        self.state.round_id += 1;
        self.begin_round();
    }

    /// Score the current round from its recorded guess and close it.
    fn end_round(&mut self) -> RoundResult {
        let round_id = self.state.round_id;
        let guess = self.state.guesses.get(round_id).copied().flatten();
        let score = scoring::round_score(self.current_target(), guess, self.state.distance_moved);
        self.state.score.push(score);
        self.phase = Phase::RoundEnded { round_id };
        RoundResult {
            round_id,
            target: self.current_target(),
            guess,
            score,
            guess_distance_m: guess.map(|g| geo::distance_meters(self.current_target(), g)),
            drift_m: self.state.distance_moved,
            total: self.total_score(),
        }
    }
}
