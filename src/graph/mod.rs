//! In-memory actor-actor graph: nodes (actors), undirected co-star edges
//! carrying movie connectors, and the side-table actor-movie index used for
//! guess validation. Built once at load time, read-only thereafter — safe
//! for concurrent readers without synchronization.

pub mod artifact;
pub mod checksum;

use std::collections::HashMap;

/// An actor node. Identifiers are of the form `actor_<external_id>`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub image_path: Option<String>,
    pub in_playable_graph: bool,
    pub in_starting_pool: bool,
    pub external_id: i64,
}

/// A single movie connecting two co-starring actors.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MovieConnector {
    pub id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub popularity: f64,
    pub cast_size: u32,
    pub release_date: String,
}

/// Metadata for one movie, keyed by its id, in the actor-movie index.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MovieMeta {
    pub title: String,
    pub popularity: f64,
    pub vote_count: u64,
    pub poster_path: Option<String>,
    pub release_date: String,
    pub cast_size: u32,
}

/// One credit in an actor's filmography, as stored in the actor-movie index.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Credit {
    pub movie_id: i64,
    pub cast_order: u32,
    pub vote_count: u64,
    pub title: String,
    pub language: String,
    pub character: String,
}

/// Side structure supporting guess validation and autocomplete scoring.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ActorMovieIndex {
    pub movies: HashMap<i64, MovieMeta>,
    pub actor_movies: HashMap<i64, Vec<Credit>>,
}

impl ActorMovieIndex {
    pub fn has_movie(&self, movie_id: i64) -> bool {
        self.movies.contains_key(&movie_id)
    }

    /// Whether `actor_external_id`'s filmography (per this index) includes `movie_id`.
    pub fn actor_has_movie(&self, actor_external_id: i64, movie_id: i64) -> bool {
        self.actor_movies
            .get(&actor_external_id)
            .map(|credits| credits.iter().any(|c| c.movie_id == movie_id))
            .unwrap_or(false)
    }
}

/// The actor-actor graph: nodes plus a symmetric adjacency of co-star edges.
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: HashMap<String, Actor>,
    adjacency: HashMap<String, HashMap<String, std::sync::Arc<Vec<MovieConnector>>>>,
}

/// Extracts the numeric external (e.g. TMDb) id from an `actor_<id>` node id.
pub fn external_id_of(actor_node: &str) -> Option<i64> {
    actor_node.split('_').nth(1)?.parse().ok()
}

impl GraphStore {
    pub fn from_parts(
        nodes: HashMap<String, Actor>,
        edges: Vec<(String, String, Vec<MovieConnector>)>,
    ) -> Self {
        let mut adjacency: HashMap<String, HashMap<String, std::sync::Arc<Vec<MovieConnector>>>> =
            HashMap::new();
        for (u, v, mut movies) in edges {
            movies.sort_by(|a, b| b.popularity.partial_cmp(&a.popularity).unwrap());
            movies.truncate(100);
            let shared = std::sync::Arc::new(movies);
            adjacency
                .entry(u.clone())
                .or_default()
                .insert(v.clone(), shared.clone());
            adjacency.entry(v).or_default().insert(u, shared);
        }
        Self { nodes, adjacency }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency
            .values()
            .map(|neighbors| neighbors.len())
            .sum::<usize>()
            / 2
    }

    pub fn contains_actor(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn actor(&self, id: &str) -> Option<&Actor> {
        self.nodes.get(id)
    }

    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.nodes.values()
    }

    pub fn playable_actors(&self) -> impl Iterator<Item = &Actor> {
        self.nodes.values().filter(|a| a.in_playable_graph)
    }

    pub fn starting_pool(&self) -> Vec<&str> {
        self.nodes
            .values()
            .filter(|a| a.in_starting_pool)
            .map(|a| a.id.as_str())
            .collect()
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.adjacency
            .get(a)
            .map(|n| n.contains_key(b))
            .unwrap_or(false)
    }

    pub fn neighbors(&self, a: &str) -> impl Iterator<Item = &str> {
        self.adjacency
            .get(a)
            .into_iter()
            .flat_map(|n| n.keys().map(|s| s.as_str()))
    }

    pub fn degree(&self, a: &str) -> usize {
        self.adjacency.get(a).map(|n| n.len()).unwrap_or(0)
    }

    /// Movie connectors shared between `a` and `b`, sorted by popularity
    /// descending. Empty if there's no edge.
    pub fn edge_movies(&self, a: &str, b: &str) -> &[MovieConnector] {
        self.adjacency
            .get(a)
            .and_then(|n| n.get(b))
            .map(|movies| movies.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(id: &str, name: &str) -> Actor {
        Actor {
            id: id.to_string(),
            name: name.to_string(),
            image_path: None,
            in_playable_graph: true,
            in_starting_pool: true,
            external_id: external_id_of(id).unwrap_or(0),
        }
    }

    fn movie(id: i64, title: &str, popularity: f64) -> MovieConnector {
        MovieConnector {
            id,
            title: title.to_string(),
            poster_path: None,
            popularity,
            cast_size: 2,
            release_date: "2000-01-01".to_string(),
        }
    }

    #[test]
    fn edges_are_symmetric_and_sorted_by_popularity() {
        let nodes = HashMap::from([
            ("actor_1".to_string(), actor("actor_1", "A")),
            ("actor_2".to_string(), actor("actor_2", "B")),
        ]);
        let graph = GraphStore::from_parts(
            nodes,
            vec![(
                "actor_1".to_string(),
                "actor_2".to_string(),
                vec![movie(10, "Low", 1.0), movie(20, "High", 9.0)],
            )],
        );

        assert!(graph.has_edge("actor_1", "actor_2"));
        assert!(graph.has_edge("actor_2", "actor_1"));
        let movies = graph.edge_movies("actor_1", "actor_2");
        assert_eq!(movies[0].id, 20);
        assert_eq!(graph.edge_movies("actor_2", "actor_1")[0].id, 20);
    }

    #[test]
    fn truncates_to_one_hundred_movies() {
        let nodes = HashMap::from([
            ("actor_1".to_string(), actor("actor_1", "A")),
            ("actor_2".to_string(), actor("actor_2", "B")),
        ]);
        let movies: Vec<_> = (0..150).map(|i| movie(i, "M", i as f64)).collect();
        let graph = GraphStore::from_parts(
            nodes,
            vec![("actor_1".to_string(), "actor_2".to_string(), movies)],
        );
        assert_eq!(graph.edge_movies("actor_1", "actor_2").len(), 100);
    }

    #[test]
    fn external_id_parses_from_node_id() {
        assert_eq!(external_id_of("actor_123"), Some(123));
        assert_eq!(external_id_of("not-an-actor-id"), None);
    }
}
