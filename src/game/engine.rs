//! The move-validation state machine. One primitive,
//! `validate_and_advance`, is shared by the second step of progressive
//! guessing and by the one-shot guess path — both resolve a candidate
//! actor against a single movie id and, on success, advance the game the
//! same way.

use crate::graph::{external_id_of, ActorMovieIndex, GraphStore, MovieConnector};
use crate::index::LookupMaps;
use crate::resolver::resolve_actor;

use super::Game;

#[derive(Debug, Clone, PartialEq)]
pub struct GuessOutcome {
    pub success: bool,
    pub message: String,
}

impl GuessOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Dispatches a guess call by argument shape: a movie id alone, an actor
/// name alone (resolved against the pending movie), or both at once.
pub fn guess(
    game: &mut Game,
    graph: &GraphStore,
    index: &ActorMovieIndex,
    lookup: &LookupMaps,
    movie_id: Option<i64>,
    actor_name: Option<&str>,
) -> GuessOutcome {
    if game.completed {
        return GuessOutcome::err("Game is already complete.");
    }

    match (movie_id, actor_name) {
        (Some(movie_id), None) => guess_movie(game, graph, index, movie_id),
        (None, Some(actor_name)) => guess_actor(game, graph, index, lookup, actor_name),
        (Some(movie_id), Some(actor_name)) => {
            guess_pair(game, graph, index, lookup, movie_id, actor_name)
        }
        (None, None) => GuessOutcome::err("You must provide either a movie or an actor."),
    }
}

/// §4.5.1: first step of progressive guessing.
fn guess_movie(
    game: &mut Game,
    graph: &GraphStore,
    index: &ActorMovieIndex,
    movie_id: i64,
) -> GuessOutcome {
    game.total_guesses += 1;

    if !index.has_movie(movie_id) {
        game.record_incorrect();
        return GuessOutcome::err("Movie not found in database.");
    }

    let current_ext = match external_id_of(&game.current) {
        Some(id) => id,
        None => return GuessOutcome::err("Invalid actor id format."),
    };

    if !index.actor_has_movie(current_ext, movie_id) {
        game.record_incorrect();
        let title = &index.movies[&movie_id].title;
        return GuessOutcome::err(format!(
            "{} was not in this movie (\"{}\").",
            label(graph, &game.current),
            title
        ));
    }

    game.pending_movie = Some(movie_connector_from_index(index, movie_id));
    let title = index.movies[&movie_id].title.clone();
    GuessOutcome::ok(format!("Valid movie: \"{title}\". Now guess an actor."))
}

/// §4.5.2: second step of progressive guessing.
fn guess_actor(
    game: &mut Game,
    graph: &GraphStore,
    index: &ActorMovieIndex,
    lookup: &LookupMaps,
    actor_name: &str,
) -> GuessOutcome {
    let pending = match &game.pending_movie {
        Some(p) => p.clone(),
        None => return GuessOutcome::err("You must guess a movie first."),
    };

    game.total_guesses += 1;

    let candidates = resolve_actor(lookup, actor_name);
    if candidates.is_empty() {
        game.record_incorrect();
        return GuessOutcome::err(format!(
            "I couldn't find an actor matching \"{actor_name}\". Try the autocomplete."
        ));
    }

    match validate_and_advance(graph, index, &game.current, &candidates, pending.id) {
        Ok((movie, next_actor)) => {
            let label_next = label(graph, &next_actor);
            game.advance(next_actor, movie);
            GuessOutcome::ok(win_or_advance_message(game, &label_next))
        }
        Err(_) => {
            game.record_incorrect();
            GuessOutcome::err(format!(
                "{actor_name} didn't appear in \"{}\" with {}.",
                pending.title,
                label(graph, &game.current)
            ))
        }
    }
}

/// §4.5.3: legacy one-shot guess (both movie and actor in the same call).
fn guess_pair(
    game: &mut Game,
    graph: &GraphStore,
    index: &ActorMovieIndex,
    lookup: &LookupMaps,
    movie_id: i64,
    actor_name: &str,
) -> GuessOutcome {
    game.total_guesses += 1;

    let candidates = resolve_actor(lookup, actor_name);
    if candidates.is_empty() {
        game.record_incorrect();
        return GuessOutcome::err(format!(
            "I couldn't find an actor matching \"{actor_name}\". Try the autocomplete."
        ));
    }

    match validate_and_advance(graph, index, &game.current, &candidates, movie_id) {
        Ok((movie, next_actor)) => {
            let label_next = label(graph, &next_actor);
            game.advance(next_actor, movie);
            GuessOutcome::ok(win_or_advance_message(game, &label_next))
        }
        Err(PairFailure::NotConnected) => {
            game.record_incorrect();
            GuessOutcome::err(format!(
                "{} and {actor_name} aren't directly connected in this graph. Try a different actor.",
                label(graph, &game.current)
            ))
        }
        Err(PairFailure::WrongMovie) => {
            game.record_incorrect();
            let title = movie_title_for_error(game, graph, movie_id);
            GuessOutcome::err(format!(
                "\"{title}\" doesn't connect {} and {actor_name}. They might have worked together in a different movie.",
                label(graph, &game.current)
            ))
        }
    }
}

fn win_or_advance_message(game: &Game, next_label: &str) -> String {
    if game.completed {
        format!("Connected to {next_label} — you win!")
    } else {
        format!("Valid move to {next_label}.")
    }
}

enum PairFailure {
    NotConnected,
    WrongMovie,
}

/// The one shared state-mutating validation primitive: given a list of
/// actor-name candidates, finds the first one connected to `current` that
/// shares `movie_id`, preferring the actor-movie index and falling back to
/// edge metadata.
fn validate_and_advance(
    graph: &GraphStore,
    index: &ActorMovieIndex,
    current: &str,
    candidates: &[String],
    movie_id: i64,
) -> Result<(MovieConnector, String), PairFailure> {
    let mut any_connected = false;
    for candidate in candidates {
        if !graph.has_edge(current, candidate) {
            continue;
        }
        any_connected = true;
        if let Some(movie) = shared_movie(graph, index, current, candidate, movie_id) {
            return Ok((movie, candidate.clone()));
        }
    }
    if any_connected {
        Err(PairFailure::WrongMovie)
    } else {
        Err(PairFailure::NotConnected)
    }
}

fn shared_movie(
    graph: &GraphStore,
    index: &ActorMovieIndex,
    current: &str,
    candidate: &str,
    movie_id: i64,
) -> Option<MovieConnector> {
    if let (Some(cur_ext), Some(cand_ext)) = (external_id_of(current), external_id_of(candidate)) {
        if index.has_movie(movie_id)
            && index.actor_has_movie(cur_ext, movie_id)
            && index.actor_has_movie(cand_ext, movie_id)
        {
            return Some(movie_connector_from_index(index, movie_id));
        }
    }
    graph
        .edge_movies(current, candidate)
        .iter()
        .find(|m| m.id == movie_id)
        .cloned()
}

fn movie_connector_from_index(index: &ActorMovieIndex, movie_id: i64) -> MovieConnector {
    let meta = &index.movies[&movie_id];
    MovieConnector {
        id: movie_id,
        title: meta.title.clone(),
        poster_path: meta.poster_path.clone(),
        popularity: meta.popularity,
        cast_size: meta.cast_size,
        release_date: meta.release_date.clone(),
    }
}

/// Movie title for an error message: checks movies already used in this
/// game, then falls back to a full edge scan (spec's `_get_movie_title`).
fn movie_title_for_error(game: &Game, graph: &GraphStore, movie_id: i64) -> String {
    if let Some(m) = game.movies_used.iter().find(|m| m.id == movie_id) {
        return m.title.clone();
    }
    for actor in graph.actors() {
        for neighbor in graph.neighbors(&actor.id) {
            if let Some(m) = graph
                .edge_movies(&actor.id, neighbor)
                .iter()
                .find(|m| m.id == movie_id)
            {
                return m.title.clone();
            }
        }
    }
    format!("Movie #{movie_id}")
}

fn label(graph: &GraphStore, actor_id: &str) -> String {
    graph
        .actor(actor_id)
        .map(|a| a.name.clone())
        .unwrap_or_else(|| actor_id.rsplit('_').next().unwrap_or(actor_id).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Actor, Credit, MovieMeta};
    use std::collections::HashMap;

    fn build_graph() -> (GraphStore, ActorMovieIndex, LookupMaps) {
        // A -(m1)- B -(m2)- C, max_incorrect=3
        let actor = |id: &str, name: &str| Actor {
            id: id.to_string(),
            name: name.to_string(),
            image_path: None,
            in_playable_graph: true,
            in_starting_pool: true,
            external_id: external_id_of(id).unwrap(),
        };
        let nodes = HashMap::from([
            ("actor_1".to_string(), actor("actor_1", "A")),
            ("actor_2".to_string(), actor("actor_2", "B")),
            ("actor_3".to_string(), actor("actor_3", "C")),
        ]);
        let movie = |id, title: &str| MovieConnector {
            id,
            title: title.to_string(),
            poster_path: None,
            popularity: 5.0,
            cast_size: 2,
            release_date: "2000-01-01".to_string(),
        };
        let graph = GraphStore::from_parts(
            nodes,
            vec![
                (
                    "actor_1".to_string(),
                    "actor_2".to_string(),
                    vec![movie(1, "M1")],
                ),
                (
                    "actor_2".to_string(),
                    "actor_3".to_string(),
                    vec![movie(2, "M2")],
                ),
            ],
        );

        let mut movies = HashMap::new();
        movies.insert(
            1,
            MovieMeta {
                title: "M1".into(),
                popularity: 5.0,
                vote_count: 10,
                poster_path: None,
                release_date: "2000-01-01".into(),
                cast_size: 2,
            },
        );
        movies.insert(
            2,
            MovieMeta {
                title: "M2".into(),
                popularity: 5.0,
                vote_count: 10,
                poster_path: None,
                release_date: "2001-01-01".into(),
                cast_size: 2,
            },
        );
        let mut actor_movies = HashMap::new();
        actor_movies.insert(
            1,
            vec![Credit {
                movie_id: 1,
                cast_order: 0,
                vote_count: 10,
                title: "M1".into(),
                language: "en".into(),
                character: "x".into(),
            }],
        );
        actor_movies.insert(
            2,
            vec![
                Credit {
                    movie_id: 1,
                    cast_order: 0,
                    vote_count: 10,
                    title: "M1".into(),
                    language: "en".into(),
                    character: "x".into(),
                },
                Credit {
                    movie_id: 2,
                    cast_order: 0,
                    vote_count: 10,
                    title: "M2".into(),
                    language: "en".into(),
                    character: "x".into(),
                },
            ],
        );
        actor_movies.insert(
            3,
            vec![Credit {
                movie_id: 2,
                cast_order: 0,
                vote_count: 10,
                title: "M2".into(),
                language: "en".into(),
                character: "x".into(),
            }],
        );
        let index = ActorMovieIndex {
            movies,
            actor_movies,
        };

        let mut actor_by_norm = HashMap::new();
        actor_by_norm.insert("a".to_string(), vec!["actor_1".to_string()]);
        actor_by_norm.insert("b".to_string(), vec!["actor_2".to_string()]);
        actor_by_norm.insert("c".to_string(), vec!["actor_3".to_string()]);
        let lookup = LookupMaps {
            actor_by_norm,
            movie_by_norm: HashMap::new(),
        };

        (graph, index, lookup)
    }

    #[test]
    fn scenario_two_step_win() {
        let (graph, index, lookup) = build_graph();
        let mut game = Game::new("actor_1".into(), "actor_3".into(), 3);

        let r1 = guess(&mut game, &graph, &index, &lookup, Some(1), None);
        assert!(r1.success);
        assert_eq!(game.status(), super::super::GameStatus::AwaitingActor);

        let r2 = guess(&mut game, &graph, &index, &lookup, None, Some("b"));
        assert!(r2.success);
        assert_eq!(game.current, "actor_2");

        let r3 = guess(&mut game, &graph, &index, &lookup, Some(2), Some("c"));
        assert!(r3.success);
        assert!(game.completed);
        assert_eq!(game.visited_actors, vec!["actor_1", "actor_2", "actor_3"]);
        assert_eq!(game.movies_used.len(), 2);
    }

    #[test]
    fn scenario_wrong_movie_then_correct() {
        let (graph, index, lookup) = build_graph();
        let mut game = Game::new("actor_1".into(), "actor_3".into(), 3);

        let wrong = guess(&mut game, &graph, &index, &lookup, Some(99), None);
        assert!(!wrong.success);
        assert_eq!(game.incorrect_guesses, 1);
        assert_eq!(game.current, "actor_1");

        let right = guess(&mut game, &graph, &index, &lookup, Some(1), None);
        assert!(right.success);
    }

    #[test]
    fn terminal_game_rejects_further_guesses() {
        let (graph, index, lookup) = build_graph();
        let mut game = Game::new("actor_1".into(), "actor_2".into(), 3);
        game.give_up().unwrap();
        let r = guess(&mut game, &graph, &index, &lookup, Some(1), None);
        assert!(!r.success);
        assert_eq!(r.message, "Game is already complete.");
    }

    #[test]
    fn incorrect_guesses_never_exceed_max() {
        let (graph, index, lookup) = build_graph();
        let mut game = Game::new("actor_1".into(), "actor_3".into(), 2);
        guess(&mut game, &graph, &index, &lookup, Some(404), None);
        guess(&mut game, &graph, &index, &lookup, Some(404), None);
        assert!(game.completed);
        assert_eq!(game.incorrect_guesses, 2);
        let after = guess(&mut game, &graph, &index, &lookup, Some(404), None);
        assert_eq!(after.message, "Game is already complete.");
        assert_eq!(game.incorrect_guesses, 2);
    }

    #[test]
    fn neither_argument_is_an_error_without_counting() {
        let (graph, index, lookup) = build_graph();
        let mut game = Game::new("actor_1".into(), "actor_3".into(), 3);
        let r = guess(&mut game, &graph, &index, &lookup, None, None);
        assert!(!r.success);
        assert_eq!(game.total_guesses, 0);
    }

    #[test]
    fn actor_only_before_any_movie_guess_is_rejected() {
        let (graph, index, lookup) = build_graph();
        let mut game = Game::new("actor_1".into(), "actor_3".into(), 3);
        let r = guess(&mut game, &graph, &index, &lookup, None, Some("b"));
        assert!(!r.success);
        assert_eq!(r.message, "You must guess a movie first.");
    }

    #[test]
    fn one_shot_not_connected_vs_wrong_movie_messages_differ() {
        let (graph, index, lookup) = build_graph();
        let mut game = Game::new("actor_1".into(), "actor_3".into(), 3);

        let not_connected = guess(&mut game, &graph, &index, &lookup, Some(1), Some("c"));
        assert!(!not_connected.success);
        assert!(not_connected.message.contains("aren't directly connected"));

        let wrong_movie = guess(&mut game, &graph, &index, &lookup, Some(2), Some("b"));
        assert!(!wrong_movie.success);
        assert!(wrong_movie.message.contains("doesn't connect"));
    }
}
