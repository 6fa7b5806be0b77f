//! Race score generation
//!
//! Every mutation assigns each car a fresh score drawn from the same
//! inclusive range. The source is a trait so the daemon can run with
//! real randomness while tests substitute a fixed sequence.

use rand::Rng;

/// Lowest score a race can assign
pub const SCORE_MIN: i64 = 1000;

/// Highest score a race can assign (inclusive)
pub const SCORE_MAX: i64 = 3000;

/// Source of race scores
pub trait ScoreSource: Send {
    /// Next score, in `[SCORE_MIN, SCORE_MAX]`
    fn next_score(&mut self) -> i64;
}

/// Uniform random scores, used by the daemon
#[derive(Debug, Default)]
pub struct RandomScores;

impl ScoreSource for RandomScores {
    fn next_score(&mut self) -> i64 {
        rand::rng().random_range(SCORE_MIN..=SCORE_MAX)
    }
}

/// Cycles through a fixed score sequence; for tests and benches
#[derive(Debug)]
pub struct FixedScores {
    seq: Vec<i64>,
    pos: usize,
}

impl FixedScores {
    /// Create a cycling source over `seq`
    ///
    /// # Panics
    /// Panics if `seq` is empty.
    pub fn new(seq: Vec<i64>) -> Self {
        assert!(!seq.is_empty(), "score sequence must not be empty");
        Self { seq, pos: 0 }
    }
}

impl ScoreSource for FixedScores {
    fn next_score(&mut self) -> i64 {
        let score = self.seq[self.pos % self.seq.len()];
        self.pos += 1;
        score
    }
}
