mod config;
mod daily_puzzle;
mod dto;
mod error;
mod game;
mod graph;
mod index;
mod normalize;
mod path_engine;
mod registry;
mod resolver;
mod routes;
mod state;

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, COOKIE, SET_COOKIE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::{serve, Router};
use axum_prometheus::PrometheusMetricLayer;
use color_eyre::eyre::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{error, info, Level};
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use config::AppConfig;
use daily_puzzle::{DailyPuzzleSelector, JsonFileStore};
use registry::SessionRegistry;
use state::{AppState, Loaded};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=info,axum::rejection=trace".into()))
        .with(tracing_subscriber::fmt::layer())
        .with(ErrorLayer::default())
        .init();

    let cfg = AppConfig::default();

    let prom_handle: PrometheusHandle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install prometheus recorder");
    let prom_layer = PrometheusMetricLayer::new();

    let loaded = load_state(&cfg)?;
    if loaded.is_none() {
        error!(path = %cfg.graph_path, "starting not-ready: graph artifact missing");
    }

    let registry = SessionRegistry::new(Duration::from_secs(cfg.game_ttl_seconds), cfg.max_games);
    let daily_puzzle = DailyPuzzleSelector::new(
        Box::new(JsonFileStore::new(cfg.puzzle_state_path.clone())),
        cfg.tz_offset_hours,
    );
    let app_state = AppState::new(loaded, registry, daily_puzzle);

    spawn_ttl_sweeper(app_state.clone());

    let cors = build_cors(&cfg);

    let mut app = Router::new()
        .route("/health", get(routes::health))
        .route("/meta", get(routes::meta))
        .route("/metrics", get({
            let handle = prom_handle.clone();
            move || async move { handle.render() }
        }))
        .route("/api/daily-pair", get(routes::daily_pair))
        .route("/api/game", post(routes::create_game))
        .route("/api/game/:id/guess", post(routes::guess))
        .route("/api/game/:id/swap-actors", post(routes::swap_actors))
        .route("/api/game/:id/give-up", post(routes::give_up))
        .route("/api/game/:id/optimal-path", get(routes::optimal_path))
        .route("/api/game/:id/optimal-paths", get(routes::optimal_paths))
        .route("/autocomplete/actors", get(routes::autocomplete_actors))
        .route("/autocomplete/movies", get(routes::autocomplete_movies));

    if !cfg.is_production() {
        app = app.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    let app = app
        .with_state(app_state)
        .layer(prom_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
        .layer(SetSensitiveHeadersLayer::new([AUTHORIZATION, COOKIE, SET_COOKIE]))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static("x-request-id")))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(tower::util::option_layer(cfg.is_production().then(|| {
            SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("strict-transport-security"),
                HeaderValue::from_static("max-age=63072000; includeSubDomains"),
            )
        })))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(ConcurrencyLimitLayer::new(cfg.max_concurrency))
        .layer(RequestBodyLimitLayer::new(cfg.max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(cfg.request_timeout_secs)));

    let addr = SocketAddr::from((cfg.bind_host, cfg.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr().unwrap());

    serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn build_cors(cfg: &AppConfig) -> CorsLayer {
    if cfg.cors_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any);
    }
    let origins: Vec<HeaderValue> = cfg
        .cors_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

fn load_state(cfg: &AppConfig) -> Result<Option<Loaded>> {
    let path = std::path::Path::new(&cfg.graph_path);
    let Some((graph, actor_movie_index)) = graph::artifact::load_graph(path)? else {
        return Ok(None);
    };
    let indexes = index::build(&graph, &actor_movie_index);
    let checksum = graph::checksum::compute(&graph);
    Ok(Some(Loaded {
        graph,
        actor_movie_index,
        indexes,
        checksum,
    }))
}

/// Background TTL sweep: creation-time eviction alone never reclaims a
/// registry that stops receiving new games.
fn spawn_ttl_sweeper(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            state.registry.sweep_expired();
        }
    });
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("shutdown signal received, stopping server...");
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CineLinks API",
        version = "1.0.0",
        description = "Six-degrees actor-connection game service"
    ),
    paths(
        routes::health,
        routes::meta,
        routes::daily_pair,
        routes::create_game,
        routes::guess,
        routes::swap_actors,
        routes::give_up,
        routes::optimal_path,
        routes::optimal_paths,
        routes::autocomplete_actors,
        routes::autocomplete_movies,
    ),
    components(schemas(
        dto::ActorRef,
        dto::MovieConnectorDto,
        dto::GameStateDto,
        dto::CreateGameRequest,
        dto::GuessRequest,
        dto::GuessResponseDto,
        dto::DailyPairDto,
        dto::MetaDto,
        dto::AutocompleteQuery,
        dto::ActorSuggestion,
        dto::MovieSuggestion,
        dto::PathSegmentDto,
        dto::PathDto,
        dto::MaxPathsQuery,
    )),
    tags((name = "cinelinks", description = "Actor-connection game endpoints"))
)]
struct ApiDoc;
