//! Resolver: exact-then-contains name/title lookup, capped results,
//! order-preserving within a key and first-key-wins across keys. An empty
//! normalized query is a substring of every key, so it falls through to the
//! contains loop and matches everything (up to the cap) rather than being
//! special-cased to no results, matching the reference `resolve_from_map_loose`
//! behavior.

use crate::graph::GraphStore;
use crate::index::LookupMaps;
use crate::normalize::normalize;

const MAX_RESULTS: usize = 50;

pub fn resolve_actor(lookup: &LookupMaps, name: &str) -> Vec<String> {
    resolve(&lookup.actor_by_norm, name, MAX_RESULTS)
}

pub fn resolve_movie(lookup: &LookupMaps, title: &str) -> Vec<i64> {
    resolve(&lookup.movie_by_norm, title, MAX_RESULTS)
}

/// Autocomplete resolution additionally filters actors by
/// `in_playable_graph` (default true).
pub fn resolve_actor_playable(lookup: &LookupMaps, graph: &GraphStore, name: &str) -> Vec<String> {
    resolve(&lookup.actor_by_norm, name, MAX_RESULTS)
        .into_iter()
        .filter(|id| graph.actor(id).map(|a| a.in_playable_graph).unwrap_or(true))
        .collect()
}

fn resolve<K, V>(map: &std::collections::HashMap<K, Vec<V>>, query: &str, limit: usize) -> Vec<V>
where
    K: std::borrow::Borrow<str> + std::hash::Hash + Eq,
    V: Clone,
{
    let key = normalize(query);

    if let Some(exact) = map.get(key.as_str()) {
        return exact.iter().take(limit).cloned().collect();
    }

    let mut out = Vec::new();
    for (idx_key, values) in map {
        if idx_key.borrow().contains(&key) {
            for v in values {
                out.push(v.clone());
                if out.len() >= limit {
                    return out;
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup() -> LookupMaps {
        let mut actor_by_norm = HashMap::new();
        actor_by_norm.insert("tom hanks".to_string(), vec!["actor_1".to_string()]);
        actor_by_norm.insert("tom cruise".to_string(), vec!["actor_2".to_string()]);
        actor_by_norm.insert("denzel washington".to_string(), vec!["actor_3".to_string()]);
        LookupMaps {
            actor_by_norm,
            movie_by_norm: HashMap::new(),
        }
    }

    #[test]
    fn exact_match_wins_over_substring() {
        let lut = lookup();
        let result = resolve_actor(&lut, "Tom Hanks");
        assert_eq!(result, vec!["actor_1".to_string()]);
    }

    #[test]
    fn substring_fallback_collects_multiple_keys() {
        let lut = lookup();
        let mut result = resolve_actor(&lut, "tom");
        result.sort();
        assert_eq!(result, vec!["actor_1".to_string(), "actor_2".to_string()]);
    }

    #[test]
    fn caps_results_at_fifty() {
        let mut actor_by_norm = HashMap::new();
        let ids: Vec<String> = (0..80).map(|i| format!("actor_{i}")).collect();
        actor_by_norm.insert("a".to_string(), ids);
        let lut = LookupMaps {
            actor_by_norm,
            movie_by_norm: HashMap::new(),
        };
        assert_eq!(resolve_actor(&lut, "a").len(), 50);
    }

    #[test]
    fn no_match_returns_empty() {
        let lut = lookup();
        assert!(resolve_actor(&lut, "nobody").is_empty());
    }

    #[test]
    fn empty_query_matches_every_key_as_a_substring() {
        let lut = lookup();
        let mut result = resolve_actor(&lut, "");
        result.sort();
        let mut expected = vec![
            "actor_1".to_string(),
            "actor_2".to_string(),
            "actor_3".to_string(),
        ];
        expected.sort();
        assert_eq!(result, expected);
    }
}
