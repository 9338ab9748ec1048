use crate::geo::{self, LatLng};

/// Rounds in one game.
pub const ROUNDS: usize = 5;

/// Best possible score for a single round.
pub const MAX_ROUND_SCORE: u32 = 10_000;

/// Best possible score for a whole game.
pub const MAX_GAME_SCORE: u32 = MAX_ROUND_SCORE * ROUNDS as u32;

/// Points lost per meter between the guess and the target.
const GUESS_PENALTY_PER_M: f64 = 2.0;

/// Points lost per meter of viewport drift away from the target.
const DRIFT_PENALTY_PER_M: f64 = 2.5;

/// Score a single round.
///
/// `guess` is `None` for a skipped or timed-out round, which always scores 0.
/// `drift_m` is the farthest the photo map was panned from the target.
pub fn round_score(target: LatLng, guess: Option<LatLng>, drift_m: f64) -> u32 {
    let Some(guess) = guess else {
        return 0;
    };
    let d = geo::distance_meters(target, guess);
    let raw = MAX_ROUND_SCORE as f64 - d * GUESS_PENALTY_PER_M - drift_m.max(0.0) * DRIFT_PENALTY_PER_M;
    raw.max(0.0).round() as u32
}

pub fn total_score(scores: &[u32]) -> u32 {
    scores.iter().sum()
}

/// Colour bands for a `<meter>` showing `rounds` worth of points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreRating {
    pub max: u32,
    pub low: u32,
    pub high: u32,
    pub optimum: u32,
}

impl ScoreRating {
    pub fn for_rounds(rounds: usize) -> Self {
        let n = rounds.max(1) as u32;
        ScoreRating {
            max: MAX_ROUND_SCORE * n,
            low: 4_000 * n,
            high: 8_000 * n,
            optimum: 9_000 * n,
        }
    }
}

/// Format a score with a space as thousands separator ("50 000").
pub fn format_points(points: u32) -> String {
    let digits = points.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}
