//! Path engine: enumerate all shortest actor-actor paths via BFS, pick the
//! single best by total edge popularity, and greedily select up to *k*
//! diverse paths by a weighted Jaccard similarity.

use std::collections::{HashSet, VecDeque};

use crate::graph::GraphStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathError(pub &'static str);

/// All shortest paths between `start` and `target`, each a sequence of
/// actor ids starting with `start` and ending with `target`. Capped at 100
/// paths.
pub fn all_shortest_paths(
    graph: &GraphStore,
    start: &str,
    target: &str,
) -> Result<Vec<Vec<String>>, PathError> {
    const MAX_PATHS: usize = 100;

    if start == target {
        return Ok(vec![vec![start.to_string()]]);
    }

    // BFS from start, recording each node's distance and *all* predecessors
    // at the shortest distance, then backtrack from target.
    let mut distance: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    let mut predecessors: std::collections::HashMap<&str, Vec<&str>> =
        std::collections::HashMap::new();

    distance.insert(start, 0);
    let mut queue = VecDeque::new();
    queue.push_back(start);

    while let Some(node) = queue.pop_front() {
        let d = distance[node];
        for neighbor in graph.neighbors(node) {
            match distance.get(neighbor) {
                None => {
                    distance.insert(neighbor, d + 1);
                    predecessors.insert(neighbor, vec![node]);
                    queue.push_back(neighbor);
                }
                Some(&nd) if nd == d + 1 => {
                    predecessors.entry(neighbor).or_default().push(node);
                }
                _ => {}
            }
        }
    }

    if !distance.contains_key(target) {
        return Err(PathError("No path exists"));
    }

    let mut paths = Vec::new();
    let mut stack: Vec<Vec<&str>> = vec![vec![target]];
    while let Some(partial) = stack.pop() {
        if paths.len() >= MAX_PATHS {
            break;
        }
        let head = *partial.last().unwrap();
        if head == start {
            let mut path: Vec<String> = partial.iter().rev().map(|s| s.to_string()).collect();
            path.dedup();
            paths.push(path);
            continue;
        }
        for &pred in &predecessors[head] {
            let mut next = partial.clone();
            next.push(pred);
            stack.push(next);
        }
    }
    paths.truncate(MAX_PATHS);
    Ok(paths)
}

/// Sum, over consecutive pairs, of the max movie popularity on that edge.
fn path_popularity_score(graph: &GraphStore, path: &[String]) -> f64 {
    path.windows(2)
        .map(|pair| {
            graph
                .edge_movies(&pair[0], &pair[1])
                .iter()
                .map(|m| m.popularity)
                .fold(0.0, f64::max)
        })
        .sum()
}

/// The most popular movie id on each edge of `path`, one per edge.
fn path_movie_ids(graph: &GraphStore, path: &[String]) -> HashSet<i64> {
    path.windows(2)
        .filter_map(|pair| {
            graph
                .edge_movies(&pair[0], &pair[1])
                .iter()
                .max_by(|a, b| a.popularity.partial_cmp(&b.popularity).unwrap())
                .map(|m| m.id)
        })
        .collect()
}

fn intermediates(path: &[String]) -> HashSet<&str> {
    if path.len() <= 2 {
        HashSet::new()
    } else {
        path[1..path.len() - 1].iter().map(|s| s.as_str()).collect()
    }
}

fn jaccard<T: Eq + std::hash::Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// Weighted Jaccard similarity: movies 70%, intermediate actors 30%.
fn path_similarity(graph: &GraphStore, a: &[String], b: &[String]) -> f64 {
    let movie_j = jaccard(&path_movie_ids(graph, a), &path_movie_ids(graph, b));
    let actor_j = jaccard(&intermediates(a), &intermediates(b));
    0.7 * movie_j + 0.3 * actor_j
}

/// The single best shortest path: unique if there's only one, else the
/// candidate with the highest total edge popularity (ties broken by
/// insertion order).
pub fn best_path(graph: &GraphStore, start: &str, target: &str) -> Result<Vec<String>, PathError> {
    let candidates = all_shortest_paths(graph, start, target)?;
    if candidates.len() == 1 {
        return Ok(candidates.into_iter().next().unwrap());
    }
    let mut best = candidates.into_iter();
    let mut chosen = best.next().expect("all_shortest_paths returns at least one path");
    let mut best_score = path_popularity_score(graph, &chosen);
    for candidate in best {
        let score = path_popularity_score(graph, &candidate);
        if score > best_score {
            best_score = score;
            chosen = candidate;
        }
    }
    Ok(chosen)
}

/// Up to `max_paths` (clamped to <= 3) diverse shortest paths, greedily
/// selected by maximizing the minimum similarity to the already-selected
/// set.
///
/// NOTE: this deliberately maximizes the *minimum* similarity, which tends
/// to pick the candidate *most* like the current set rather than the most
/// different one. Mirrored intentionally rather than silently corrected —
/// see DESIGN.md.
pub fn diverse_paths(
    graph: &GraphStore,
    start: &str,
    target: &str,
    max_paths: usize,
) -> Result<Vec<Vec<String>>, PathError> {
    let max_paths = max_paths.clamp(1, 3);
    let all_paths = all_shortest_paths(graph, start, target)?;

    if all_paths.len() <= max_paths {
        return Ok(all_paths);
    }

    let mut remaining = all_paths;
    let seed_idx = remaining
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| {
            path_popularity_score(graph, a)
                .partial_cmp(&path_popularity_score(graph, b))
                .unwrap()
        })
        .map(|(i, _)| i)
        .unwrap();
    let mut selected = vec![remaining.remove(seed_idx)];

    while selected.len() < max_paths && !remaining.is_empty() {
        let best_idx = remaining
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                let min_a = selected
                    .iter()
                    .map(|s| path_similarity(graph, a, s))
                    .fold(f64::INFINITY, f64::min);
                let min_b = selected
                    .iter()
                    .map(|s| path_similarity(graph, b, s))
                    .fold(f64::INFINITY, f64::min);
                min_a.partial_cmp(&min_b).unwrap()
            })
            .map(|(i, _)| i)
            .unwrap();
        selected.push(remaining.remove(best_idx));
    }

    Ok(selected)
}
