//! HTTP request/response shapes. Kept separate from the domain types in
//! `graph`/`game` so the wire format can diverge from the in-memory
//! representation without touching engine code.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::game::{Game, GameStatus};
use crate::graph::{GraphStore, MovieConnector as DomainMovieConnector};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActorRef {
    pub id: String,
    pub name: String,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

impl ActorRef {
    pub fn lookup(graph: &GraphStore, actor_id: &str) -> Self {
        match graph.actor(actor_id) {
            Some(a) => Self {
                id: a.id.clone(),
                name: a.name.clone(),
                image_url: a.image_path.clone(),
            },
            None => Self {
                id: actor_id.to_string(),
                name: actor_id.to_string(),
                image_url: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MovieConnectorDto {
    pub id: i64,
    pub title: String,
    #[serde(rename = "posterUrl")]
    pub poster_url: Option<String>,
}

impl From<&DomainMovieConnector> for MovieConnectorDto {
    fn from(m: &DomainMovieConnector) -> Self {
        Self {
            id: m.id,
            title: m.title.clone(),
            poster_url: m.poster_path.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameStateDto {
    pub session_id: String,
    pub start_actor: ActorRef,
    pub target_actor: ActorRef,
    pub current_actor: ActorRef,
    pub visited_actors: Vec<ActorRef>,
    pub movies_used: Vec<MovieConnectorDto>,
    pub total_guesses: u32,
    pub incorrect_guesses: u32,
    pub max_incorrect: u32,
    pub status: &'static str,
    pub pending_movie: Option<MovieConnectorDto>,
}

impl GameStateDto {
    pub fn build(session_id: &str, graph: &GraphStore, game: &Game) -> Self {
        Self {
            session_id: session_id.to_string(),
            start_actor: ActorRef::lookup(graph, &game.start),
            target_actor: ActorRef::lookup(graph, &game.target),
            current_actor: ActorRef::lookup(graph, &game.current),
            visited_actors: game
                .visited_actors
                .iter()
                .map(|id| ActorRef::lookup(graph, id))
                .collect(),
            movies_used: game.movies_used.iter().map(MovieConnectorDto::from).collect(),
            total_guesses: game.total_guesses,
            incorrect_guesses: game.incorrect_guesses,
            max_incorrect: game.max_incorrect,
            status: status_label(game.status()),
            pending_movie: game.pending_movie.as_ref().map(MovieConnectorDto::from),
        }
    }
}

fn status_label(status: GameStatus) -> &'static str {
    match status {
        GameStatus::AwaitingMove => "AWAITING_MOVE",
        GameStatus::AwaitingActor => "AWAITING_ACTOR",
        GameStatus::CompletedWin => "COMPLETED_WIN",
        GameStatus::CompletedLossOutOfTries => "COMPLETED_LOSS_OUT_OF_TRIES",
        GameStatus::CompletedGaveUp => "COMPLETED_GAVE_UP",
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateGameRequest {
    #[serde(rename = "startActorId")]
    pub start_actor_id: Option<String>,
    #[serde(rename = "targetActorId")]
    pub target_actor_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GuessRequest {
    #[serde(rename = "movieId")]
    pub movie_id: Option<i64>,
    #[serde(rename = "actorName")]
    pub actor_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuessResponseDto {
    pub success: bool,
    pub message: String,
    pub game: GameStateDto,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyPairDto {
    pub puzzle_id: String,
    pub start_actor: ActorRef,
    pub target_actor: ActorRef,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetaDto {
    pub actors: usize,
    pub playable_actors: usize,
    pub starting_pool_actors: usize,
    pub movies: usize,
    pub edges: usize,
    pub checksum: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AutocompleteQuery {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActorSuggestion {
    pub id: String,
    pub name: String,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MovieSuggestion {
    #[serde(rename = "movieId")]
    pub movie_id: i64,
    pub title: String,
    #[serde(rename = "posterUrl")]
    pub poster_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PathSegmentDto {
    pub movie: MovieConnectorDto,
    pub actor: ActorRef,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PathDto {
    pub start_actor: ActorRef,
    pub target_actor: ActorRef,
    pub segments: Vec<PathSegmentDto>,
}

impl PathDto {
    /// Builds a response path from a sequence of actor ids, reifying each
    /// consecutive pair's most-popular shared movie as a segment.
    ///
    /// A schema-valid but malformed artifact could carry an edge with an
    /// empty `movies` list; that is a server-side data error, not a panic,
    /// so it is surfaced as `AppError::fatal` the same way the sibling
    /// "no path exists" failure is.
    pub fn build(graph: &GraphStore, path: &[String]) -> Result<Self, AppError> {
        let mut segments = Vec::with_capacity(path.len().saturating_sub(1));
        for pair in path.windows(2) {
            let movie = graph
                .edge_movies(&pair[0], &pair[1])
                .iter()
                .max_by(|a, b| a.popularity.partial_cmp(&b.popularity).unwrap())
                .ok_or_else(|| {
                    AppError::fatal(format!(
                        "edge {}-{} has no movie connectors",
                        pair[0], pair[1]
                    ))
                })?;
            segments.push(PathSegmentDto {
                movie: MovieConnectorDto::from(movie),
                actor: ActorRef::lookup(graph, &pair[1]),
            });
        }
        Ok(Self {
            start_actor: ActorRef::lookup(graph, &path[0]),
            target_actor: ActorRef::lookup(graph, path.last().unwrap()),
            segments,
        })
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MaxPathsQuery {
    pub max_paths: Option<usize>,
}
