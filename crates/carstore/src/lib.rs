//! # carstore
//!
//! Backing store for the car roster: the source of truth that the
//! cache layer sits in front of.
//!
//! ## Architecture
//! - **Roster**: in-process `Vec<Car>` behind a `parking_lot::RwLock`
//! - **Reads**: full scan ordered by descending score
//! - **Writes**: single-car CRUD, one-batch score write-back, reseed
//! - **Scores**: pluggable `ScoreSource` so races stay testable

#![warn(missing_docs)]

mod error;
mod model;
mod score;
mod store;

pub use error::{Error, Result};
pub use model::{Car, SEED_NAMES};
pub use score::{FixedScores, RandomScores, ScoreSource, SCORE_MAX, SCORE_MIN};
pub use store::CarStore;
