//! Index builder: at load time, builds the normalized name/title lookup
//! maps and the deduplicated autocomplete catalogs.

use std::collections::HashMap;

use crate::graph::{ActorMovieIndex, GraphStore};
use crate::normalize::normalize;

#[derive(Debug, Clone, serde::Serialize)]
pub struct ActorEntry {
    pub id: String,
    pub name: String,
    pub normalized_name: String,
    pub image_url: Option<String>,
    pub external_id: i64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MovieEntry {
    pub movie_id: i64,
    pub title: String,
    pub normalized_title: String,
    pub poster_path: Option<String>,
}

/// Normalized name/title -> candidate ids, in first-seen order.
pub struct LookupMaps {
    pub actor_by_norm: HashMap<String, Vec<String>>,
    pub movie_by_norm: HashMap<String, Vec<i64>>,
}

pub struct Indexes {
    pub actors: Vec<ActorEntry>,
    pub movies: Vec<MovieEntry>,
    pub lookup: LookupMaps,
}

pub fn build(graph: &GraphStore, actor_movie_index: &ActorMovieIndex) -> Indexes {
    let actors: Vec<ActorEntry> = graph
        .actors()
        .map(|a| ActorEntry {
            id: a.id.clone(),
            name: a.name.clone(),
            normalized_name: normalize(&a.name),
            image_url: a.image_path.clone(),
            external_id: a.external_id,
        })
        .collect();

    let movies = build_movie_catalog(graph, actor_movie_index);

    let mut actor_by_norm: HashMap<String, Vec<String>> = HashMap::new();
    for a in &actors {
        actor_by_norm
            .entry(a.normalized_name.clone())
            .or_default()
            .push(a.id.clone());
    }

    let mut movie_by_norm: HashMap<String, Vec<i64>> = HashMap::new();
    for m in &movies {
        movie_by_norm
            .entry(m.normalized_title.clone())
            .or_default()
            .push(m.movie_id);
    }

    Indexes {
        actors,
        movies,
        lookup: LookupMaps {
            actor_by_norm,
            movie_by_norm,
        },
    }
}

/// Builds the movie autocomplete catalog, primarily from edge `movies`
/// lists, supplemented by the actor-movie index. When two distinct movie
/// ids share a title, each is disambiguated with `" (YYYY)"` from its
/// release-date year.
fn build_movie_catalog(
    graph: &GraphStore,
    actor_movie_index: &ActorMovieIndex,
) -> Vec<MovieEntry> {
    struct Raw {
        title: String,
        poster_path: Option<String>,
        release_date: String,
    }

    let mut by_id: HashMap<i64, Raw> = HashMap::new();

    for actor in graph.actors() {
        for neighbor in graph.neighbors(&actor.id) {
            if actor.id.as_str() >= neighbor {
                continue; // each undirected edge only once
            }
            for movie in graph.edge_movies(&actor.id, neighbor) {
                by_id.entry(movie.id).or_insert_with(|| Raw {
                    title: movie.title.clone(),
                    poster_path: movie.poster_path.clone(),
                    release_date: movie.release_date.clone(),
                });
            }
        }
    }

    for (id, meta) in &actor_movie_index.movies {
        by_id.entry(*id).or_insert_with(|| Raw {
            title: meta.title.clone(),
            poster_path: meta.poster_path.clone(),
            release_date: meta.release_date.clone(),
        });
    }

    // Count how many distinct ids share each raw title so we know which
    // ones need the "(YYYY)" disambiguator.
    let mut title_counts: HashMap<&str, usize> = HashMap::new();
    for raw in by_id.values() {
        *title_counts.entry(raw.title.as_str()).or_insert(0) += 1;
    }

    by_id
        .into_iter()
        .map(|(movie_id, raw)| {
            let title = if title_counts.get(raw.title.as_str()).copied().unwrap_or(0) > 1 {
                let year = raw.release_date.split('-').next().filter(|y| !y.is_empty());
                match year {
                    Some(year) => format!("{} ({})", raw.title, year),
                    None => raw.title.clone(),
                }
            } else {
                raw.title.clone()
            };
            MovieEntry {
                movie_id,
                normalized_title: normalize(&title),
                title,
                poster_path: raw.poster_path,
            }
        })
        .collect()
}
