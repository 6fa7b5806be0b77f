//! Car entity and the fixed seed roster

use serde::{Deserialize, Serialize};

/// A car in the roster.
///
/// `id` is assigned by the store and never reused within one roster
/// generation. `score` is the only mutable attribute and drives every
/// ranked read. Field order matters: the JSON codec emits fields in
/// declaration order, so re-serializing a deserialized car reproduces
/// the original bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    /// Store-assigned unique id
    pub id: u64,
    /// Display name
    pub name: String,
    /// Performance score, reassigned on every race
    pub score: i64,
}

/// Names used when (re)seeding the roster
pub const SEED_NAMES: [&str; 6] = [
    "BMW",
    "Mercedes",
    "Ferrari",
    "Lamborghini",
    "Aston Martin",
    "Porsche",
];
