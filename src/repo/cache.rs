//! Process-lifetime entity cache.
//!
//! Keeps decoded records keyed by id and by canonical name, plus a bounded
//! recently-stored list ordered most-recent-first and unique by id. All
//! maps live behind one lock so the two key spaces and the recent list can
//! never disagree; no await happens while it is held.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use crate::{normalize_name, Pokemon};

/// Capacity of the recently-stored list.
pub const RECENT_CAPACITY: usize = 10;

#[derive(Debug, Default)]
struct Inner {
    by_id: HashMap<u32, Pokemon>,
    by_name: HashMap<String, Pokemon>,
    recent_ids: VecDeque<u32>,
}

/// In-memory cache of decoded records, keyed by id and canonical name.
#[derive(Debug, Default)]
pub struct EntityCache {
    inner: Mutex<Inner>,
}

impl EntityCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a record by id.
    pub fn get_by_id(&self, id: u32) -> Option<Pokemon> {
        self.lock().by_id.get(&id).cloned()
    }

    /// Look up a record by name. The key is normalized before lookup, so
    /// "Bulbasaur", "BULBASAUR" and "bulbasaur" all resolve identically.
    pub fn get_by_name(&self, name: &str) -> Option<Pokemon> {
        let key = normalize_name(name);
        self.lock().by_name.get(&key).cloned()
    }

    /// Store a record under both its id and its normalized name,
    /// overwriting any prior value, and promote it to the front of the
    /// recent list.
    pub fn put(&self, pokemon: Pokemon) {
        let mut inner = self.lock();

        inner.recent_ids.retain(|&id| id != pokemon.id);
        inner.recent_ids.push_front(pokemon.id);
        inner.recent_ids.truncate(RECENT_CAPACITY);

        inner
            .by_name
            .insert(normalize_name(&pokemon.name), pokemon.clone());
        inner.by_id.insert(pokemon.id, pokemon);
    }

    /// Recently stored records, most recent first, at most
    /// [`RECENT_CAPACITY`] entries, unique by id.
    pub fn recent(&self) -> Vec<Pokemon> {
        let inner = self.lock();
        inner
            .recent_ids
            .iter()
            .filter_map(|id| inner.by_id.get(id).cloned())
            .collect()
    }

    /// Number of cached records.
    pub fn len(&self) -> usize {
        self.lock().by_id.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().by_id.is_empty()
    }

    /// Number of entries on the recent list.
    pub fn recent_len(&self) -> usize {
        self.lock().recent_ids.len()
    }

    /// Drop all cached records and the recent list.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.by_id.clear();
        inner.by_name.clear();
        inner.recent_ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NamedResource, TypeSlot};

    fn pokemon(id: u32, name: &str) -> Pokemon {
        Pokemon {
            id,
            name: name.to_string(),
            height: 7,
            weight: 69,
            base_experience: Some(64),
            stats: vec![],
            types: vec![TypeSlot {
                slot: 1,
                type_ref: NamedResource {
                    name: "normal".to_string(),
                    url: "https://pokeapi.co/api/v2/type/1/".to_string(),
                },
            }],
            abilities: vec![],
            moves: vec![],
        }
    }

    #[test]
    fn test_put_and_get_by_both_keys() {
        let cache = EntityCache::new();
        cache.put(pokemon(1, "bulbasaur"));

        assert_eq!(cache.get_by_id(1).map(|p| p.name), Some("bulbasaur".into()));
        assert_eq!(cache.get_by_name("bulbasaur").map(|p| p.id), Some(1));
        assert_eq!(cache.get_by_name("Bulbasaur").map(|p| p.id), Some(1));
        assert_eq!(cache.get_by_name("BULBASAUR").map(|p| p.id), Some(1));
        assert!(cache.get_by_id(2).is_none());
    }

    #[test]
    fn test_put_overwrites_same_id() {
        let cache = EntityCache::new();
        cache.put(pokemon(1, "bulbasaur"));

        let mut updated = pokemon(1, "bulbasaur");
        updated.weight = 70;
        cache.put(updated);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_by_id(1).map(|p| p.weight), Some(70));
        assert_eq!(cache.recent_len(), 1);
    }

    #[test]
    fn test_recent_ordering_and_eviction() {
        let cache = EntityCache::new();
        for id in 1..=12 {
            cache.put(pokemon(id, &format!("poke-{id}")));
        }

        let recent_ids: Vec<u32> = cache.recent().iter().map(|p| p.id).collect();
        assert_eq!(recent_ids, vec![12, 11, 10, 9, 8, 7, 6, 5, 4, 3]);
    }

    #[test]
    fn test_recent_promotes_reinserted_id() {
        let cache = EntityCache::new();
        cache.put(pokemon(1, "bulbasaur"));
        cache.put(pokemon(2, "ivysaur"));
        cache.put(pokemon(1, "bulbasaur"));

        let recent_ids: Vec<u32> = cache.recent().iter().map(|p| p.id).collect();
        assert_eq!(recent_ids, vec![1, 2]);
    }

    #[test]
    fn test_clear() {
        let cache = EntityCache::new();
        cache.put(pokemon(1, "bulbasaur"));
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.recent_len(), 0);
        assert!(cache.get_by_name("bulbasaur").is_none());
    }
}
