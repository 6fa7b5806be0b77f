//! In-process backing store for the car roster
//!
//! Plays the part of the relational database: it is the source of
//! truth the caches are populated from, and every ranked read that
//! misses the cache falls back to `all_by_score_desc` here.

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::model::{Car, SEED_NAMES};
use crate::score::ScoreSource;

/// Roster contents plus the id counter
#[derive(Debug, Default)]
struct Roster {
    cars: Vec<Car>,
    next_id: u64,
}

impl Roster {
    fn assign_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Thread-safe car store; share via `Arc` across connections
#[derive(Debug, Default)]
pub struct CarStore {
    inner: RwLock<Roster>,
}

impl CarStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with the fixed roster
    ///
    /// # Arguments
    /// * `scores` - Source for the initial score of each car
    pub fn seeded(scores: &mut dyn ScoreSource) -> Self {
        let store = Self::new();
        store.reseed(scores);
        store
    }

    /// Full scan ordered by descending score
    ///
    /// The sort is stable, so cars with equal scores come back in
    /// insertion order. Callers must not rely on any particular tie
    /// order.
    pub fn all_by_score_desc(&self) -> Vec<Car> {
        let roster = self.inner.read();
        let mut cars = roster.cars.clone();
        cars.sort_by(|a, b| b.score.cmp(&a.score));
        cars
    }

    /// Look up a single car by id
    pub fn get(&self, id: u64) -> Result<Car> {
        let roster = self.inner.read();
        roster
            .cars
            .iter()
            .find(|car| car.id == id)
            .cloned()
            .ok_or(Error::NotFound(id))
    }

    /// Insert a new car, assigning the next id
    pub fn insert(&self, name: &str, score: i64) -> Car {
        let mut roster = self.inner.write();
        let car = Car {
            id: roster.assign_id(),
            name: name.to_string(),
            score,
        };
        roster.cars.push(car.clone());
        car
    }

    /// Overwrite an existing car's name and score
    pub fn update(&self, id: u64, name: &str, score: i64) -> Result<Car> {
        let mut roster = self.inner.write();
        let car = roster
            .cars
            .iter_mut()
            .find(|car| car.id == id)
            .ok_or(Error::NotFound(id))?;
        car.name = name.to_string();
        car.score = score;
        Ok(car.clone())
    }

    /// Remove a car by id, returning it
    pub fn remove(&self, id: u64) -> Result<Car> {
        let mut roster = self.inner.write();
        let pos = roster
            .cars
            .iter()
            .position(|car| car.id == id)
            .ok_or(Error::NotFound(id))?;
        Ok(roster.cars.remove(pos))
    }

    /// Write back a batch of cars by id in one locked pass
    ///
    /// Used by the race path to persist every reassigned score at
    /// once. Fails with `NotFound` on the first id that no longer
    /// exists; nothing before it is rolled back.
    pub fn put_all(&self, cars: &[Car]) -> Result<()> {
        let mut roster = self.inner.write();
        for updated in cars {
            let car = roster
                .cars
                .iter_mut()
                .find(|car| car.id == updated.id)
                .ok_or(Error::NotFound(updated.id))?;
            car.name = updated.name.clone();
            car.score = updated.score;
        }
        Ok(())
    }

    /// Delete everything and recreate the fixed roster
    ///
    /// Ids restart from 1, matching a database drop-and-recreate.
    pub fn reseed(&self, scores: &mut dyn ScoreSource) {
        let mut roster = self.inner.write();
        roster.cars.clear();
        roster.next_id = 0;
        for name in SEED_NAMES {
            let car = Car {
                id: roster.assign_id(),
                name: name.to_string(),
                score: scores.next_score(),
            };
            roster.cars.push(car);
        }
    }

    /// Number of cars in the roster
    pub fn len(&self) -> usize {
        self.inner.read().cars.len()
    }

    /// Check if the roster is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().cars.is_empty()
    }
}
