//! Wire protocol: one JSON request per line, one JSON response per
//! line
//!
//! Selectors are closed enums deserialized at the boundary, so an
//! unknown action, unknown strategy, or missing id is rejected as a
//! bad request before any store access happens.

use carstore::Car;
use serde::{Deserialize, Serialize};

/// Mutating action applied before the read strategy runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MutateAction {
    /// No mutation
    #[default]
    None,
    /// Reassign every car's score, then invalidate
    MutateScores,
    /// Drop and reseed the roster, then invalidate
    RebuildStore,
    /// Invalidate without touching the store
    ClearCache,
}

/// Where the timed read comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadStrategy {
    /// Single serialized blob of the full roster
    ListCache,
    /// Score-ranked sorted set, full extent
    RankedCache,
    /// Top five of the ranked set
    RankedTop5Cache,
    /// Straight from the backing store, cache untouched
    DirectStore,
}

/// A client request, tagged by `cmd`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "kebab-case")]
pub enum Request {
    /// Run an optional mutation, then a timed read
    Cars {
        /// Mutation to apply first; defaults to none
        #[serde(default)]
        action: MutateAction,
        /// Read strategy to time
        strategy: ReadStrategy,
    },
    /// Fetch one car by id
    CarGet {
        /// Car id
        id: u64,
    },
    /// Add a car to the roster
    CarCreate {
        /// Display name
        name: String,
        /// Initial score
        score: i64,
    },
    /// Overwrite a car's name and score
    CarUpdate {
        /// Car id
        id: u64,
        /// New name
        name: String,
        /// New score
        score: i64,
    },
    /// Remove a car from the roster
    CarDelete {
        /// Car id
        id: u64,
    },
    /// Cache hit/miss counters
    Stats,
    /// Liveness probe
    Ping,
}

/// Error classification surfaced to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// The requested car does not exist
    NotFound,
    /// The request was malformed or missed required fields
    BadRequest,
    /// Codec or cache failure; fatal to this request
    Internal,
}

/// A server response, tagged by `status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Response {
    /// Result of a `cars` read
    Cars {
        /// Cars in the order the strategy produced them
        cars: Vec<Car>,
        /// Wall time of the read alone, in milliseconds
        elapsed_ms: f64,
    },
    /// A single car
    Car {
        /// The car
        car: Car,
    },
    /// Confirmation of a delete
    Deleted {
        /// Id of the removed car
        id: u64,
    },
    /// Cache counters
    Stats {
        /// Cache hits
        hits: u64,
        /// Cache misses
        misses: u64,
        /// Miss-driven populations
        populates: u64,
        /// Full invalidations
        invalidations: u64,
        /// hits / (hits + misses)
        hit_ratio: f64,
    },
    /// Reply to `ping`
    Pong,
    /// Request failed
    Error {
        /// Classification
        kind: ErrorKind,
        /// Human-readable detail
        message: String,
    },
}
