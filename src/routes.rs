//! HTTP handlers. Thin dispatch: validate presence, delegate to the domain
//! modules, shape the response. `State<AppState>` extraction,
//! `Result<_, AppError>` returns, `#[utoipa::path]` documentation on every
//! handler.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::instrument;

use crate::dto::*;
use crate::error::AppError;
use crate::game::{engine, Game, DEFAULT_MAX_INCORRECT};
use crate::path_engine;
use crate::resolver;
use crate::state::{AppState, Loaded};

#[utoipa::path(get, path = "/health", responses((status = 200, description = "Service liveness")))]
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[utoipa::path(get, path = "/meta", responses((status = 200, body = MetaDto), (status = 503)))]
#[instrument(skip(state))]
pub async fn meta(State(state): State<AppState>) -> Result<Json<MetaDto>, AppError> {
    let loaded = require_loaded(&state)?;
    Ok(Json(MetaDto {
        actors: loaded.graph.node_count(),
        playable_actors: loaded.graph.playable_actors().count(),
        starting_pool_actors: loaded.graph.starting_pool().len(),
        movies: loaded.indexes.movies.len(),
        edges: loaded.graph.edge_count(),
        checksum: loaded.checksum.clone(),
    }))
}

#[utoipa::path(get, path = "/api/daily-pair", responses((status = 200, body = DailyPairDto), (status = 503)))]
#[instrument(skip(state))]
pub async fn daily_pair(State(state): State<AppState>) -> Result<Json<DailyPairDto>, AppError> {
    let loaded = require_loaded(&state)?;
    let key = state.daily_puzzle.today_key();
    let (start, target) = state.daily_puzzle.get_or_generate(&loaded.graph, &key);
    Ok(Json(DailyPairDto {
        puzzle_id: key,
        start_actor: ActorRef::lookup(&loaded.graph, &start),
        target_actor: ActorRef::lookup(&loaded.graph, &target),
    }))
}

#[utoipa::path(post, path = "/api/game", request_body = CreateGameRequest, responses((status = 200, body = GameStateDto), (status = 400), (status = 503)))]
#[instrument(skip(state, req))]
pub async fn create_game(
    State(state): State<AppState>,
    Json(req): Json<CreateGameRequest>,
) -> Result<Json<GameStateDto>, AppError> {
    let loaded = require_loaded(&state)?;

    let (start, target) = match (req.start_actor_id, req.target_actor_id) {
        (Some(s), Some(t)) => {
            if !loaded.graph.contains_actor(&s) {
                return Err(AppError::validation(format!("unknown startActorId {s}")));
            }
            if !loaded.graph.contains_actor(&t) {
                return Err(AppError::validation(format!("unknown targetActorId {t}")));
            }
            (s, t)
        }
        (None, None) => random_pair(&loaded)?,
        _ => {
            return Err(AppError::validation(
                "startActorId and targetActorId must be supplied together or not at all",
            ))
        }
    };

    let game = Game::new(start, target, DEFAULT_MAX_INCORRECT);
    let session_id = state.registry.create(game.clone());
    Ok(Json(GameStateDto::build(&session_id, &loaded.graph, &game)))
}

/// Random distinct, non-directly-connected pair from the starting pool
/// (100 attempts, then fall back to any distinct pair).
fn random_pair(loaded: &Loaded) -> Result<(String, String), AppError> {
    let pool = loaded.graph.starting_pool();
    if pool.len() < 2 {
        return Err(AppError::fatal("starting pool has fewer than two actors"));
    }
    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        let (a, b) = sample_two(&pool, &mut rng);
        if a != b && !loaded.graph.has_edge(a, b) {
            return Ok((a.to_string(), b.to_string()));
        }
    }
    let (a, b) = sample_two(&pool, &mut rng);
    Ok((a.to_string(), b.to_string()))
}

fn sample_two<'a>(pool: &[&'a str], rng: &mut impl rand::Rng) -> (&'a str, &'a str) {
    let i = rng.gen_range(0..pool.len());
    let mut j = rng.gen_range(0..pool.len() - 1);
    if j >= i {
        j += 1;
    }
    (pool[i], pool[j])
}

#[utoipa::path(post, path = "/api/game/{id}/guess", request_body = GuessRequest, responses((status = 200, body = GuessResponseDto), (status = 404), (status = 503)))]
#[instrument(skip(state, req))]
pub async fn guess(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<GuessRequest>,
) -> Result<Json<GuessResponseDto>, AppError> {
    let loaded = require_loaded(&state)?;
    let session = state
        .registry
        .get(&id)
        .ok_or_else(|| AppError::not_found(format!("session {id}")))?;

    let mut game = session.lock().expect("game lock poisoned");
    let outcome = engine::guess(
        &mut game,
        &loaded.graph,
        &loaded.actor_movie_index,
        &loaded.indexes.lookup,
        req.movie_id,
        req.actor_name.as_deref(),
    );
    Ok(Json(GuessResponseDto {
        success: outcome.success,
        message: outcome.message,
        game: GameStateDto::build(&id, &loaded.graph, &game),
    }))
}

#[utoipa::path(post, path = "/api/game/{id}/swap-actors", responses((status = 200, body = GameStateDto), (status = 400), (status = 404), (status = 503)))]
#[instrument(skip(state))]
pub async fn swap_actors(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GameStateDto>, AppError> {
    let loaded = require_loaded(&state)?;
    let session = state
        .registry
        .get(&id)
        .ok_or_else(|| AppError::not_found(format!("session {id}")))?;

    let mut game = session.lock().expect("game lock poisoned");
    game.swap_actors().map_err(AppError::validation)?;
    Ok(Json(GameStateDto::build(&id, &loaded.graph, &game)))
}

#[utoipa::path(post, path = "/api/game/{id}/give-up", responses((status = 200, body = GameStateDto), (status = 400), (status = 404), (status = 503)))]
#[instrument(skip(state))]
pub async fn give_up(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GameStateDto>, AppError> {
    let loaded = require_loaded(&state)?;
    let session = state
        .registry
        .get(&id)
        .ok_or_else(|| AppError::not_found(format!("session {id}")))?;

    let mut game = session.lock().expect("game lock poisoned");
    game.give_up().map_err(AppError::validation)?;
    Ok(Json(GameStateDto::build(&id, &loaded.graph, &game)))
}

#[utoipa::path(get, path = "/api/game/{id}/optimal-path", responses((status = 200, body = PathDto), (status = 404), (status = 500), (status = 503)))]
#[instrument(skip(state))]
pub async fn optimal_path(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PathDto>, AppError> {
    let loaded = require_loaded(&state)?;
    let session = state
        .registry
        .get(&id)
        .ok_or_else(|| AppError::not_found(format!("session {id}")))?;

    let game = session.lock().expect("game lock poisoned");
    let path = path_engine::best_path(&loaded.graph, &game.start, &game.target)
        .map_err(|e| AppError::fatal(e.0))?;
    Ok(Json(PathDto::build(&loaded.graph, &path)?))
}

#[utoipa::path(get, path = "/api/game/{id}/optimal-paths", params(("max_paths" = Option<usize>, Query)), responses((status = 200, body = [PathDto]), (status = 404), (status = 500), (status = 503)))]
#[instrument(skip(state))]
pub async fn optimal_paths(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<MaxPathsQuery>,
) -> Result<Json<Vec<PathDto>>, AppError> {
    let loaded = require_loaded(&state)?;
    let session = state
        .registry
        .get(&id)
        .ok_or_else(|| AppError::not_found(format!("session {id}")))?;

    let game = session.lock().expect("game lock poisoned");
    let max_paths = q.max_paths.unwrap_or(3).clamp(1, 3);
    let paths = path_engine::diverse_paths(&loaded.graph, &game.start, &game.target, max_paths)
        .map_err(|e| AppError::fatal(e.0))?;
    let paths: Vec<PathDto> = paths
        .iter()
        .map(|p| PathDto::build(&loaded.graph, p))
        .collect::<Result<_, _>>()?;
    Ok(Json(paths))
}

#[utoipa::path(get, path = "/autocomplete/actors", params(("q" = Option<String>, Query), ("limit" = Option<usize>, Query)), responses((status = 200, body = [ActorSuggestion]), (status = 400), (status = 503)))]
#[instrument(skip(state))]
pub async fn autocomplete_actors(
    State(state): State<AppState>,
    Query(q): Query<AutocompleteQuery>,
) -> Result<Json<Vec<ActorSuggestion>>, AppError> {
    let loaded = require_loaded(&state)?;
    let query = require_query(&q)?;
    let limit = clamp_limit(q.limit);

    let ids = resolver::resolve_actor_playable(&loaded.indexes.lookup, &loaded.graph, query);
    Ok(Json(
        ids.into_iter()
            .take(limit)
            .filter_map(|id| loaded.graph.actor(&id))
            .map(|a| ActorSuggestion {
                id: a.id.clone(),
                name: a.name.clone(),
                image_url: a.image_path.clone(),
            })
            .collect(),
    ))
}

#[utoipa::path(get, path = "/autocomplete/movies", params(("q" = Option<String>, Query), ("limit" = Option<usize>, Query)), responses((status = 200, body = [MovieSuggestion]), (status = 400), (status = 503)))]
#[instrument(skip(state))]
pub async fn autocomplete_movies(
    State(state): State<AppState>,
    Query(q): Query<AutocompleteQuery>,
) -> Result<Json<Vec<MovieSuggestion>>, AppError> {
    let loaded = require_loaded(&state)?;
    let query = require_query(&q)?;
    let limit = clamp_limit(q.limit);

    let ids = resolver::resolve_movie(&loaded.indexes.lookup, query);
    let by_id: std::collections::HashMap<i64, &crate::index::MovieEntry> =
        loaded.indexes.movies.iter().map(|m| (m.movie_id, m)).collect();
    Ok(Json(
        ids.into_iter()
            .take(limit)
            .filter_map(|id| by_id.get(&id))
            .map(|m| MovieSuggestion {
                movie_id: m.movie_id,
                title: m.title.clone(),
                poster_url: m.poster_path.clone(),
            })
            .collect(),
    ))
}

fn require_loaded(state: &AppState) -> Result<std::sync::Arc<Loaded>, AppError> {
    state.loaded.clone().ok_or_else(AppError::not_ready)
}

fn require_query(q: &AutocompleteQuery) -> Result<&str, AppError> {
    match q.q.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(AppError::validation("q must not be empty")),
    }
}

fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(10).clamp(1, 50)
}
