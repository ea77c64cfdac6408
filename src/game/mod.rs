//! Per-session game state: progressive movie-then-actor guessing, one-shot
//! guessing, give-up, and swap. All mutation happens through
//! `engine::validate_and_advance` and its thin wrappers — there is exactly
//! one state-mutating primitive.

pub mod engine;

use crate::graph::MovieConnector;

/// The two-state progressive machine plus its three terminal states. Kept
/// as a tagged enum rather than an optional two-field dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    AwaitingMove,
    AwaitingActor,
    CompletedWin,
    CompletedLossOutOfTries,
    CompletedGaveUp,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::AwaitingMove | GameStatus::AwaitingActor)
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    pub start: String,
    pub target: String,
    pub current: String,
    pub visited_actors: Vec<String>,
    pub movies_used: Vec<MovieConnector>,
    pub total_guesses: u32,
    pub incorrect_guesses: u32,
    pub max_incorrect: u32,
    pub completed: bool,
    pub gave_up: bool,
    pub pending_movie: Option<MovieConnector>,
}

pub const DEFAULT_MAX_INCORRECT: u32 = 3;

impl Game {
    pub fn new(start: String, target: String, max_incorrect: u32) -> Self {
        Self {
            current: start.clone(),
            visited_actors: vec![start.clone()],
            movies_used: Vec::new(),
            total_guesses: 0,
            incorrect_guesses: 0,
            max_incorrect,
            completed: false,
            gave_up: false,
            pending_movie: None,
            start,
            target,
        }
    }

    pub fn status(&self) -> GameStatus {
        if self.gave_up {
            GameStatus::CompletedGaveUp
        } else if self.completed && self.current == self.target {
            GameStatus::CompletedWin
        } else if self.completed {
            GameStatus::CompletedLossOutOfTries
        } else if self.pending_movie.is_some() {
            GameStatus::AwaitingActor
        } else {
            GameStatus::AwaitingMove
        }
    }

    /// Give up. Legal only in a non-terminal state.
    pub fn give_up(&mut self) -> Result<(), &'static str> {
        if self.completed {
            return Err("Game is already complete.");
        }
        self.completed = true;
        self.incorrect_guesses = self.max_incorrect;
        self.gave_up = true;
        Ok(())
    }

    /// Swap start/target. Legal only before the first move.
    pub fn swap_actors(&mut self) -> Result<(), &'static str> {
        if !self.movies_used.is_empty() {
            return Err("Cannot swap actors after making a move");
        }
        std::mem::swap(&mut self.start, &mut self.target);
        self.current = self.start.clone();
        self.visited_actors = vec![self.start.clone()];
        self.pending_movie = None;
        Ok(())
    }

    fn record_incorrect(&mut self) {
        self.incorrect_guesses += 1;
        if self.incorrect_guesses >= self.max_incorrect {
            self.completed = true;
        }
    }

    /// Appends `candidate` and `movie` to the path, advances `current`, and
    /// flips to `CompletedWin` if the target was reached. Shared by every
    /// accepting branch of `engine::validate_and_advance`.
    fn advance(&mut self, candidate: String, movie: MovieConnector) {
        self.current = candidate.clone();
        self.visited_actors.push(candidate);
        self.movies_used.push(movie);
        self.pending_movie = None;
        if self.current == self.target {
            self.completed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i64) -> MovieConnector {
        MovieConnector {
            id,
            title: "M".into(),
            poster_path: None,
            popularity: 1.0,
            cast_size: 2,
            release_date: "2000-01-01".into(),
        }
    }

    #[test]
    fn invariant_current_equals_last_visited() {
        let mut g = Game::new("actor_1".into(), "actor_3".into(), 3);
        g.advance("actor_2".to_string(), movie(1));
        assert_eq!(&g.current, g.visited_actors.last().unwrap());
        assert_eq!(g.visited_actors.len(), g.movies_used.len() + 1);
    }

    #[test]
    fn give_up_sets_terminal_fields() {
        let mut g = Game::new("actor_1".into(), "actor_2".into(), 3);
        g.give_up().unwrap();
        assert!(g.completed);
        assert!(g.gave_up);
        assert_eq!(g.incorrect_guesses, g.max_incorrect);
        assert_eq!(g.status(), GameStatus::CompletedGaveUp);
    }

    #[test]
    fn give_up_twice_is_an_error() {
        let mut g = Game::new("actor_1".into(), "actor_2".into(), 3);
        g.give_up().unwrap();
        assert!(g.give_up().is_err());
    }

    #[test]
    fn swap_then_swap_is_identity() {
        let mut g = Game::new("actor_1".into(), "actor_2".into(), 3);
        g.swap_actors().unwrap();
        assert_eq!(g.start, "actor_2");
        assert_eq!(g.target, "actor_1");
        g.swap_actors().unwrap();
        assert_eq!(g.start, "actor_1");
        assert_eq!(g.target, "actor_2");
        assert_eq!(g.current, "actor_1");
    }

    #[test]
    fn swap_after_a_move_is_rejected() {
        let mut g = Game::new("actor_1".into(), "actor_3".into(), 3);
        g.advance("actor_2".to_string(), movie(1));
        assert!(g.swap_actors().is_err());
    }

    #[test]
    fn record_incorrect_forces_completion_at_max() {
        let mut g = Game::new("actor_1".into(), "actor_2".into(), 2);
        g.record_incorrect();
        assert!(!g.completed);
        g.record_incorrect();
        assert!(g.completed);
        assert_eq!(g.incorrect_guesses, 2);
    }
}
