//! Startup configuration, read from the process environment with a
//! fallback default for every field.

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_host: [u8; 4],
    pub port: u16,
    pub graph_path: String,
    pub puzzle_state_path: String,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub tz_offset_hours: i32,
    pub request_timeout_secs: u64,
    pub max_concurrency: usize,
    pub max_body_bytes: usize,
    pub game_ttl_seconds: u64,
    pub max_games: usize,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_host: [0, 0, 0, 0],
            port: env_or("PORT", 8080),
            graph_path: std::env::var("CINELINKS_GRAPH_PATH")
                .unwrap_or_else(|_| "global_actor_actor_graph.gpickle".to_string()),
            puzzle_state_path: std::env::var("CINELINKS_PUZZLE_STATE_PATH")
                .unwrap_or_else(|_| "daily_puzzle_state.json".to_string()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| vec!["http://localhost:5173".to_string()]),
            environment: std::env::var("ENV").unwrap_or_else(|_| "dev".to_string()),
            tz_offset_hours: env_or("CINELINKS_TZ_OFFSET_HOURS", -6),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 20),
            max_concurrency: env_or("MAX_CONCURRENCY", 512),
            max_body_bytes: env_or("MAX_BODY_BYTES", 1_048_576),
            game_ttl_seconds: env_or("GAME_TTL_SECONDS", 7200),
            max_games: env_or("MAX_GAMES", 5000),
        }
    }
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}
