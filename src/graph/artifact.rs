//! On-disk shape of the two startup artifacts produced by the offline graph
//! build pipeline (out of scope for this service): the actor-actor graph
//! and the actor-movie index. This service reads a `serde_json` encoding
//! and leaves producing that encoding as the build tool's job.

use std::path::Path;

use super::{Actor, ActorMovieIndex, GraphStore, MovieConnector};

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct GraphArtifact {
    pub nodes: Vec<Actor>,
    pub edges: Vec<EdgeArtifact>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct EdgeArtifact {
    pub a: String,
    pub b: String,
    pub movies: Vec<MovieConnector>,
}

impl GraphArtifact {
    pub fn into_store(self) -> GraphStore {
        let nodes = self.nodes.into_iter().map(|a| (a.id.clone(), a)).collect();
        let edges = self
            .edges
            .into_iter()
            .map(|e| (e.a, e.b, e.movies))
            .collect();
        GraphStore::from_parts(nodes, edges)
    }
}

/// Loads the graph artifact and the actor-movie index from disk.
///
/// Returns `Ok(None)` — not an error — when the graph file is absent, which
/// callers map to the service's not-ready state.
pub fn load_graph(graph_path: &Path) -> color_eyre::Result<Option<(GraphStore, ActorMovieIndex)>> {
    if !graph_path.exists() {
        tracing::warn!(path = %graph_path.display(), "graph artifact not found, starting not-ready");
        return Ok(None);
    }

    let raw = std::fs::read(graph_path)?;
    let artifact: GraphArtifact = serde_json::from_slice(&raw)?;
    let graph = artifact.into_store();

    let index_path = sibling_index_path(graph_path);
    let index = if index_path.exists() {
        let raw = std::fs::read(&index_path)?;
        serde_json::from_slice(&raw)?
    } else {
        tracing::warn!(
            path = %index_path.display(),
            "actor-movie index not found, movie autocomplete/validation coverage will be limited"
        );
        ActorMovieIndex::default()
    };

    Ok(Some((graph, index)))
}

fn sibling_index_path(graph_path: &Path) -> std::path::PathBuf {
    let stem = graph_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("graph");
    graph_path.with_file_name(format!("{stem}_actor_movie_index.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_graph_file_is_not_an_error() {
        let result = load_graph(Path::new("/nonexistent/path/graph.gpickle")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn sibling_index_path_replaces_extension() {
        let p = sibling_index_path(Path::new("data/global_actor_actor_graph.gpickle"));
        assert_eq!(
            p,
            std::path::PathBuf::from("data/global_actor_actor_graph_actor_movie_index.json")
        );
    }
}
