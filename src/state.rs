//! Application context, passed into handlers via axum's `State` extractor
//! rather than a process-wide singleton. Holds the read-only graph/index
//! snapshot plus the two mutable shared resources (session registry, daily
//! puzzle selector).

use std::sync::Arc;

use crate::daily_puzzle::DailyPuzzleSelector;
use crate::graph::{ActorMovieIndex, GraphStore};
use crate::index::Indexes;
use crate::registry::SessionRegistry;

/// The immutable part of application state, built once at load time.
/// Absent until a graph artifact is available — the server still starts
/// and answers `/health`, but graph-dependent endpoints return 503 until
/// the next restart with a valid artifact.
pub struct Loaded {
    pub graph: GraphStore,
    pub actor_movie_index: ActorMovieIndex,
    pub indexes: Indexes,
    pub checksum: String,
}

#[derive(Clone)]
pub struct AppState {
    pub loaded: Option<Arc<Loaded>>,
    pub registry: Arc<SessionRegistry>,
    pub daily_puzzle: Arc<DailyPuzzleSelector>,
}

impl AppState {
    pub fn new(
        loaded: Option<Loaded>,
        registry: SessionRegistry,
        daily_puzzle: DailyPuzzleSelector,
    ) -> Self {
        Self {
            loaded: loaded.map(Arc::new),
            registry: Arc::new(registry),
            daily_puzzle: Arc::new(daily_puzzle),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.loaded.is_some()
    }
}
