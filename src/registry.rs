//! Session registry: a concurrency-safe `session_id -> (game, created_at)`
//! map with TTL eviction and a capacity cap. The registry map has its own
//! lock, separate from each game's lock — we never hold the registry lock
//! while mutating a game.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::game::Game;

struct Entry {
    game: Arc<Mutex<Game>>,
    created_at: Instant,
}

pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Entry>>,
    ttl: Duration,
    max_games: usize,
}

impl SessionRegistry {
    pub fn new(ttl: Duration, max_games: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
            max_games,
        }
    }

    /// Inserts a freshly created game, evicting expired entries first and,
    /// if still over capacity, the oldest entries until under the cap.
    pub fn create(&self, game: Game) -> String {
        let id = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.lock().expect("session registry lock poisoned");

        evict_expired(&mut sessions, self.ttl);
        if sessions.len() >= self.max_games {
            evict_oldest_until_under_cap(&mut sessions, self.max_games.saturating_sub(1));
        }

        sessions.insert(
            id.clone(),
            Entry {
                game: Arc::new(Mutex::new(game)),
                created_at: Instant::now(),
            },
        );
        id
    }

    pub fn get(&self, id: &str) -> Option<Arc<Mutex<Game>>> {
        let sessions = self.sessions.lock().expect("session registry lock poisoned");
        sessions.get(id).map(|e| e.game.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session registry lock poisoned").len()
    }

    /// Background sweep: creation-time eviction alone never reclaims memory
    /// in a registry that stops receiving new games. Intended to run on a
    /// `tokio::time::interval`.
    pub fn sweep_expired(&self) {
        let mut sessions = self.sessions.lock().expect("session registry lock poisoned");
        evict_expired(&mut sessions, self.ttl);
    }
}

fn evict_expired(sessions: &mut HashMap<String, Entry>, ttl: Duration) {
    let now = Instant::now();
    sessions.retain(|_, entry| now.duration_since(entry.created_at) <= ttl);
}

fn evict_oldest_until_under_cap(sessions: &mut HashMap<String, Entry>, target_len: usize) {
    if sessions.len() <= target_len {
        return;
    }
    let mut by_age: Vec<(String, Instant)> = sessions
        .iter()
        .map(|(id, e)| (id.clone(), e.created_at))
        .collect();
    by_age.sort_by_key(|(_, created_at)| *created_at);
    let to_remove = sessions.len() - target_len;
    for (id, _) in by_age.into_iter().take(to_remove) {
        sessions.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        Game::new("actor_1".into(), "actor_2".into(), 3)
    }

    #[test]
    fn create_then_get_round_trips() {
        let registry = SessionRegistry::new(Duration::from_secs(7200), 5000);
        let id = registry.create(game());
        assert!(registry.get(&id).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_id_returns_none() {
        let registry = SessionRegistry::new(Duration::from_secs(7200), 5000);
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn capacity_cap_evicts_oldest_on_create() {
        let registry = SessionRegistry::new(Duration::from_secs(7200), 2);
        let first = registry.create(game());
        std::thread::sleep(Duration::from_millis(5));
        let _second = registry.create(game());
        std::thread::sleep(Duration::from_millis(5));
        // creating a third while at cap=2 must evict the oldest (first)
        let _third = registry.create(game());
        assert!(registry.get(&first).is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn ttl_eviction_on_sweep() {
        let registry = SessionRegistry::new(Duration::from_millis(10), 5000);
        let id = registry.create(game());
        std::thread::sleep(Duration::from_millis(30));
        registry.sweep_expired();
        assert!(registry.get(&id).is_none());
    }
}
