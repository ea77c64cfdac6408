//! Checksum contract: hex SHA-256 over a canonical JSON encoding
//! of `{nodes: sorted [node|type], edges: sorted [u->v] with u <= v}`. Used
//! by fleet-diff tooling to compare datasets across environments — all
//! nodes in this graph are actors, so `type` is always `"actor"`.

use sha2::{Digest, Sha256};

use super::GraphStore;

pub fn compute(graph: &GraphStore) -> String {
    let mut nodes: Vec<String> = graph.actors().map(|a| format!("{}|actor", a.id)).collect();
    nodes.sort();

    let mut edges: Vec<String> = Vec::new();
    for actor in graph.actors() {
        for neighbor in graph.neighbors(&actor.id) {
            let (u, v) = if actor.id.as_str() <= neighbor {
                (actor.id.as_str(), neighbor)
            } else {
                (neighbor, actor.id.as_str())
            };
            edges.push(format!("{u}->{v}"));
        }
    }
    edges.sort();
    edges.dedup();

    let canonical = serde_json::json!({ "nodes": nodes, "edges": edges });
    let blob =
        serde_json::to_vec(&canonical).expect("canonical checksum payload is always valid json");

    let mut hasher = Sha256::new();
    hasher.update(&blob);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Actor, GraphStore};
    use std::collections::HashMap;

    fn actor(id: &str) -> Actor {
        Actor {
            id: id.to_string(),
            name: id.to_string(),
            image_path: None,
            in_playable_graph: true,
            in_starting_pool: true,
            external_id: 1,
        }
    }

    #[test]
    fn checksum_is_deterministic_and_hex() {
        let nodes = HashMap::from([
            ("actor_1".to_string(), actor("actor_1")),
            ("actor_2".to_string(), actor("actor_2")),
        ]);
        let graph = GraphStore::from_parts(
            nodes,
            vec![("actor_1".to_string(), "actor_2".to_string(), vec![])],
        );
        let a = compute(&graph);
        let b = compute(&graph);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn checksum_changes_when_an_edge_is_added() {
        let nodes = HashMap::from([
            ("actor_1".to_string(), actor("actor_1")),
            ("actor_2".to_string(), actor("actor_2")),
            ("actor_3".to_string(), actor("actor_3")),
        ]);
        let without_extra_edge = GraphStore::from_parts(
            nodes.clone(),
            vec![("actor_1".to_string(), "actor_2".to_string(), vec![])],
        );
        let with_extra_edge = GraphStore::from_parts(
            nodes,
            vec![
                ("actor_1".to_string(), "actor_2".to_string(), vec![]),
                ("actor_2".to_string(), "actor_3".to_string(), vec![]),
            ],
        );
        assert_ne!(compute(&without_extra_edge), compute(&with_extra_edge));
    }
}
