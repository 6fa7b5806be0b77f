//! Request dispatch for the daemon
//!
//! The mutation (if any) runs first; the read strategy runs second
//! under its own timer, so `elapsed_ms` covers the read alone.

use std::sync::Arc;
use std::time::Instant;

use carcache::CacheManager;
use carstore::{Car, CarStore, ScoreSource};
use parking_lot::Mutex;
use tracing::debug;

use crate::protocol::{ErrorKind, MutateAction, ReadStrategy, Request, Response};

/// Maps each parsed request onto the store and cache manager
pub struct Dispatcher {
    store: Arc<CarStore>,
    manager: CacheManager,
    scores: Mutex<Box<dyn ScoreSource>>,
}

impl Dispatcher {
    /// Create a dispatcher over shared store, manager, and score
    /// source
    pub fn new(store: Arc<CarStore>, manager: CacheManager, scores: Box<dyn ScoreSource>) -> Self {
        Self {
            store,
            manager,
            scores: Mutex::new(scores),
        }
    }

    /// Parse one request line and dispatch it
    ///
    /// A line that fails to parse never reaches the store; it comes
    /// back as a bad request.
    pub fn handle_line(&self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(req) => self.dispatch(req),
            Err(e) => Response::Error {
                kind: ErrorKind::BadRequest,
                message: e.to_string(),
            },
        }
    }

    /// Dispatch a parsed request
    pub fn dispatch(&self, req: Request) -> Response {
        debug!(?req, "dispatching");
        match req {
            Request::Cars { action, strategy } => match self.run_cars(action, strategy) {
                Ok((cars, elapsed_ms)) => Response::Cars { cars, elapsed_ms },
                Err(e) => error_response(e),
            },
            Request::CarGet { id } => {
                self.car_response(self.manager.get_car(&self.store, id))
            }
            Request::CarCreate { name, score } => {
                self.car_response(self.manager.create_car(&self.store, &name, score))
            }
            Request::CarUpdate { id, name, score } => {
                self.car_response(self.manager.update_car(&self.store, id, &name, score))
            }
            Request::CarDelete { id } => {
                match self.manager.delete_car(&self.store, id) {
                    Ok(car) => Response::Deleted { id: car.id },
                    Err(e) => error_response(e),
                }
            }
            Request::Stats => {
                let stats = self.manager.stats();
                Response::Stats {
                    hits: stats.hits(),
                    misses: stats.misses(),
                    populates: stats.populates(),
                    invalidations: stats.invalidations(),
                    hit_ratio: stats.hit_ratio(),
                }
            }
            Request::Ping => Response::Pong,
        }
    }

    fn run_cars(
        &self,
        action: MutateAction,
        strategy: ReadStrategy,
    ) -> carcache::Result<(Vec<Car>, f64)> {
        match action {
            MutateAction::None => {}
            MutateAction::MutateScores => {
                let mut scores = self.scores.lock();
                self.manager.mutate_scores(&self.store, scores.as_mut())?;
            }
            MutateAction::RebuildStore => {
                let mut scores = self.scores.lock();
                self.manager.rebuild(&self.store, scores.as_mut())?;
            }
            MutateAction::ClearCache => self.manager.invalidate_all(),
        }

        let started = Instant::now();
        let cars = match strategy {
            ReadStrategy::ListCache => self.manager.get_list(&self.store)?,
            ReadStrategy::RankedCache => self.manager.get_ranked(&self.store)?,
            ReadStrategy::RankedTop5Cache => self.manager.get_ranked_top5(&self.store)?,
            ReadStrategy::DirectStore => self.store.all_by_score_desc(),
        };
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        Ok((cars, elapsed_ms))
    }

    fn car_response(&self, result: carcache::Result<Car>) -> Response {
        match result {
            Ok(car) => Response::Car { car },
            Err(e) => error_response(e),
        }
    }
}

fn error_response(err: carcache::Error) -> Response {
    let kind = match &err {
        carcache::Error::Store(carstore::Error::NotFound(_)) => ErrorKind::NotFound,
        carcache::Error::Codec(_) => ErrorKind::Internal,
    };
    Response::Error {
        kind,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carcache::{CacheConn, CARS_LIST_KEY, CARS_RANKED_KEY};
    use carstore::{FixedScores, SCORE_MAX, SCORE_MIN, SEED_NAMES};

    fn dispatcher() -> Dispatcher {
        let mut seed = FixedScores::new(vec![2600, 1400, 2900, 1100, 2200, 1700]);
        let store = Arc::new(CarStore::seeded(&mut seed));
        let manager = CacheManager::new(CacheConn::new());
        let scores = Box::new(FixedScores::new(vec![1010, 1020, 1030, 1040, 1050, 1060]));
        Dispatcher::new(store, manager, scores)
    }

    fn cars_of(resp: Response) -> Vec<Car> {
        match resp {
            Response::Cars { cars, .. } => cars,
            other => panic!("expected cars response, got {:?}", other),
        }
    }

    #[test]
    fn test_seeded_scenario_end_to_end() {
        let d = dispatcher();

        // Direct store read: all six, descending, cache untouched
        let cars = cars_of(d.handle_line(r#"{"cmd":"cars","strategy":"direct-store"}"#));
        assert_eq!(cars.len(), 6);
        for pair in cars.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(d.manager.conn().get(CARS_LIST_KEY), None);
        assert_eq!(d.manager.conn().zcard(CARS_RANKED_KEY), 0);

        // Ranked read on an empty cache: populates six members
        let cars = cars_of(d.handle_line(r#"{"cmd":"cars","strategy":"ranked-cache"}"#));
        assert_eq!(cars.len(), 6);
        assert_eq!(d.manager.conn().zcard(CARS_RANKED_KEY), 6);

        // Top five next: exactly the five highest, hit path
        let hits_before = d.manager.stats().hits();
        let top = cars_of(d.handle_line(r#"{"cmd":"cars","strategy":"ranked-top5-cache"}"#));
        assert_eq!(top.len(), 5);
        assert!(top.iter().all(|c| c.score >= 1400));
        assert_eq!(d.manager.stats().hits(), hits_before + 1);

        // Clear cache, then list read: miss, then a populated blob
        let cars = cars_of(
            d.handle_line(r#"{"cmd":"cars","action":"clear-cache","strategy":"list-cache"}"#),
        );
        assert_eq!(cars.len(), 6);
        assert!(d.manager.conn().get(CARS_LIST_KEY).is_some());

        // Rebuild: fixed names, fresh scores, both keys gone
        let cars = cars_of(
            d.handle_line(r#"{"cmd":"cars","action":"rebuild-store","strategy":"direct-store"}"#),
        );
        assert_eq!(cars.len(), 6);
        let mut names: Vec<&str> = cars.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        let mut expected: Vec<&str> = SEED_NAMES.to_vec();
        expected.sort_unstable();
        assert_eq!(names, expected);
        for car in &cars {
            assert!((SCORE_MIN..=SCORE_MAX).contains(&car.score));
        }
        assert_eq!(d.manager.conn().get(CARS_LIST_KEY), None);
        assert_eq!(d.manager.conn().zcard(CARS_RANKED_KEY), 0);
    }

    #[test]
    fn test_mutate_scores_round() {
        let d = dispatcher();

        let before = cars_of(d.handle_line(r#"{"cmd":"cars","strategy":"list-cache"}"#));
        let cars = cars_of(
            d.handle_line(r#"{"cmd":"cars","action":"mutate-scores","strategy":"ranked-cache"}"#),
        );

        // Scores came from the fixed source, not the seed
        let mut scores: Vec<i64> = cars.iter().map(|c| c.score).collect();
        scores.sort_unstable();
        assert_eq!(scores, vec![1010, 1020, 1030, 1040, 1050, 1060]);
        assert_ne!(
            scores,
            before.iter().map(|c| c.score).collect::<Vec<i64>>()
        );
    }

    #[test]
    fn test_elapsed_is_reported() {
        let d = dispatcher();
        match d.handle_line(r#"{"cmd":"cars","strategy":"list-cache"}"#) {
            Response::Cars { elapsed_ms, .. } => assert!(elapsed_ms >= 0.0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_crud_round_trip() {
        let d = dispatcher();

        let created = d.handle_line(r#"{"cmd":"car-create","name":"McLaren","score":2750}"#);
        let id = match created {
            Response::Car { car } => {
                assert_eq!(car.name, "McLaren");
                car.id
            }
            other => panic!("unexpected {:?}", other),
        };

        let fetched = d.dispatch(Request::CarGet { id });
        assert!(matches!(fetched, Response::Car { car } if car.score == 2750));

        let updated = d.dispatch(Request::CarUpdate {
            id,
            name: "McLaren F1".to_string(),
            score: 2950,
        });
        assert!(matches!(updated, Response::Car { car } if car.name == "McLaren F1"));

        let deleted = d.dispatch(Request::CarDelete { id });
        assert_eq!(deleted, Response::Deleted { id });

        let gone = d.dispatch(Request::CarGet { id });
        assert!(matches!(
            gone,
            Response::Error { kind: ErrorKind::NotFound, .. }
        ));
    }

    #[test]
    fn test_writes_invalidate() {
        let d = dispatcher();

        d.handle_line(r#"{"cmd":"cars","strategy":"list-cache"}"#);
        assert!(d.manager.conn().get(CARS_LIST_KEY).is_some());

        d.handle_line(r#"{"cmd":"car-create","name":"Bugatti","score":2990}"#);
        assert_eq!(d.manager.conn().get(CARS_LIST_KEY), None);
    }

    #[test]
    fn test_bad_request_lines() {
        let d = dispatcher();

        // Not JSON at all
        assert!(matches!(
            d.handle_line("GET cars"),
            Response::Error { kind: ErrorKind::BadRequest, .. }
        ));

        // Missing id
        assert!(matches!(
            d.handle_line(r#"{"cmd":"car-delete"}"#),
            Response::Error { kind: ErrorKind::BadRequest, .. }
        ));

        // Unknown strategy
        assert!(matches!(
            d.handle_line(r#"{"cmd":"cars","strategy":"warp-cache"}"#),
            Response::Error { kind: ErrorKind::BadRequest, .. }
        ));
    }

    #[test]
    fn test_ping_and_stats() {
        let d = dispatcher();

        assert_eq!(d.handle_line(r#"{"cmd":"ping"}"#), Response::Pong);

        d.handle_line(r#"{"cmd":"cars","strategy":"list-cache"}"#);
        d.handle_line(r#"{"cmd":"cars","strategy":"list-cache"}"#);

        match d.handle_line(r#"{"cmd":"stats"}"#) {
            Response::Stats { hits, misses, populates, .. } => {
                assert_eq!(hits, 1);
                assert_eq!(misses, 1);
                assert_eq!(populates, 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
