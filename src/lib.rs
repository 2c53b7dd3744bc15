//! # Pokefetch Library
//!
//! A rate-limited client library for acquiring Pokémon records from the
//! PokeAPI REST service, with tiered in-memory caching and bulk import
//! support. Designed for offline-capable Pokédex applications that need
//! predictable network behavior against a shared public API.
//!
//! ## Features
//!
//! - **Typed API Client**: Single decoded request with a full HTTP error taxonomy
//! - **Global Rate Limiting**: One limiter instance gates every outbound call
//! - **Tiered Caching**: Entity cache (by id and name), response cache, search cache
//! - **Bulk Import**: One-shot import of the full listing with progress reporting
//! - **Graceful Degradation**: Embedded fallback dataset when the listing call fails
//! - **Cancellation**: Bulk runs halt promptly on a shared shutdown signal
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use pokefetch::api::ApiClient;
//! use pokefetch::importer::rate_limit::RateLimiter;
//! use pokefetch::repo::Repository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // One limiter shared by all outbound calls
//! let limiter = RateLimiter::shared();
//! let client = Arc::new(ApiClient::new(limiter)?);
//!
//! // Cache-first facade
//! let repo = Repository::new(client);
//! let bulbasaur = repo.fetch_by_name("Bulbasaur").await?;
//! assert_eq!(bulbasaur.id, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`api`] - HTTP client, error taxonomy, and response caching
//! - [`repo`] - Cache-first repository facade over the API client
//! - [`importer`] - Bulk import orchestration, rate limiting, progress
//! - [`fallback`] - Embedded fallback dataset for degraded operation
//! - [`store`] - Storage collaborator interface for decoded records
//! - [`shutdown`] - Graceful cancellation shared across modules
//!
//! ## Data Types
//!
//! - [`Pokemon`] - Fully decoded Pokémon record with stats, types, abilities
//! - [`NamedResource`] - Lightweight name+URL reference from listing endpoints
//! - [`ResourcePage`] - One page of a paginated listing response
//! - [`MoveDetail`] - Decoded move record resolved for learnset queries

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};

/// HTTP client, error taxonomy, and response caching
pub mod api;

/// CLI command implementations
pub mod cli;

/// Embedded fallback dataset
pub mod fallback;

/// Bulk import orchestration, rate limiting, and progress tracking
pub mod importer;

/// Production observability metrics
pub mod metrics;

/// Cache-first repository facade
pub mod repo;

/// Graceful shutdown coordination shared across modules
pub mod shutdown;

/// Storage collaborator interface
pub mod store;

/// Normalize a user-supplied name to the canonical wire form.
///
/// The API identifies resources by lowercase hyphenated names
/// ("mr-mime", "tapu-koko"); lookups must be case-insensitive and
/// tolerate spaces.
pub fn normalize_name(input: &str) -> String {
    input.trim().to_lowercase().replace(' ', "-")
}

/// Lightweight reference to an API resource: a name plus the URL of its
/// full record. Returned by paginated listing endpoints and embedded in
/// nested structures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamedResource {
    /// Canonical resource name (lowercase, hyphenated)
    pub name: String,
    /// URL of the full resource record
    pub url: String,
}

impl NamedResource {
    /// Derive the numeric id from the trailing path segment of the URL.
    ///
    /// Listing URLs have the shape `{base}/pokemon/25/`; the derived id
    /// must match the id of the record the reference points at.
    pub fn id(&self) -> Option<u32> {
        self.url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .and_then(|segment| segment.parse::<u32>().ok())
    }
}

/// One page of a paginated listing response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourcePage {
    /// Total number of resources behind this listing
    pub count: u32,
    /// URL of the next page, if any
    pub next: Option<String>,
    /// URL of the previous page, if any
    pub previous: Option<String>,
    /// The references on this page
    pub results: Vec<NamedResource>,
}

/// A single base-stat entry on a Pokémon record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatSlot {
    /// Base value of the stat
    pub base_stat: u32,
    /// Effort points granted when this Pokémon is defeated
    pub effort: u32,
    /// Reference to the stat kind ("hp", "attack", ...)
    pub stat: NamedResource,
}

/// A type tag on a Pokémon record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeSlot {
    /// Ordering of this type on the record (1 = primary)
    pub slot: u8,
    /// Reference to the type ("grass", "poison", ...)
    #[serde(rename = "type")]
    pub type_ref: NamedResource,
}

/// An ability slot on a Pokémon record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AbilitySlot {
    /// Whether the ability is hidden
    pub is_hidden: bool,
    /// Ordering of this ability on the record
    pub slot: u8,
    /// Reference to the ability
    pub ability: NamedResource,
}

/// The context in which a move can be learned in one version group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionGroupDetail {
    /// Level at which the move is learned (0 when not level-based)
    pub level_learned_at: u32,
    /// Reference to the learn method ("level-up", "machine", "egg", ...)
    pub move_learn_method: NamedResource,
    /// Reference to the game version group
    pub version_group: NamedResource,
}

/// A learnable-move entry on a Pokémon record, with the contexts in which
/// it qualifies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveSlot {
    /// Reference to the move record
    #[serde(rename = "move")]
    pub move_ref: NamedResource,
    /// Qualifying contexts across version groups
    pub version_group_details: Vec<VersionGroupDetail>,
}

/// Fully decoded Pokémon record.
///
/// Immutable once fetched: a re-fetch produces a new value that may
/// overwrite the cache entry for the same key. The id is stable and
/// globally unique; the name is the canonical lowercase-hyphenated form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pokemon {
    /// Stable, globally unique positive id
    pub id: u32,
    /// Canonical lowercase-hyphenated name
    pub name: String,
    /// Height in decimetres
    pub height: u32,
    /// Weight in hectograms
    pub weight: u32,
    /// Base experience granted when defeated
    pub base_experience: Option<u32>,
    /// Base stats
    pub stats: Vec<StatSlot>,
    /// Type tags, primary first
    pub types: Vec<TypeSlot>,
    /// Ability slots
    pub abilities: Vec<AbilitySlot>,
    /// Learnable moves with their version-group contexts
    #[serde(default)]
    pub moves: Vec<MoveSlot>,
}

impl Pokemon {
    /// Validate record integrity after decode.
    pub fn validate(&self) -> Result<(), String> {
        if self.id == 0 {
            return Err("Pokemon id must be positive".to_string());
        }

        if self.name.is_empty() {
            return Err("Pokemon name cannot be empty".to_string());
        }

        if self.name != normalize_name(&self.name) {
            return Err(format!(
                "Pokemon name must be canonical (lowercase, hyphenated), got {:?}",
                self.name
            ));
        }

        if self.types.is_empty() {
            return Err(format!("Pokemon {} must have at least one type", self.name));
        }

        Ok(())
    }

    /// Name of the primary type (lowest slot number).
    pub fn primary_type(&self) -> Option<&str> {
        self.types
            .iter()
            .min_by_key(|t| t.slot)
            .map(|t| t.type_ref.name.as_str())
    }
}

/// Fully decoded move record, resolved when building learnsets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveDetail {
    /// Stable move id
    pub id: u32,
    /// Canonical move name
    pub name: String,
    /// Base power, absent for status moves
    pub power: Option<u32>,
    /// Accuracy percentage, absent for moves that never miss
    pub accuracy: Option<u32>,
    /// Power points
    pub pp: Option<u32>,
    /// Reference to the move's type
    #[serde(rename = "type")]
    pub type_ref: NamedResource,
    /// Reference to the damage class ("physical", "special", "status")
    pub damage_class: Option<NamedResource>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, url: &str) -> NamedResource {
        NamedResource {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Bulbasaur"), "bulbasaur");
        assert_eq!(normalize_name("BULBASAUR"), "bulbasaur");
        assert_eq!(normalize_name("Mr Mime"), "mr-mime");
        assert_eq!(normalize_name("  Tapu Koko  "), "tapu-koko");
        assert_eq!(normalize_name("mr-mime"), "mr-mime");
    }

    #[test]
    fn test_named_resource_id_from_url() {
        let r = named("pikachu", "https://pokeapi.co/api/v2/pokemon/25/");
        assert_eq!(r.id(), Some(25));

        let no_slash = named("pikachu", "https://pokeapi.co/api/v2/pokemon/25");
        assert_eq!(no_slash.id(), Some(25));

        let bad = named("pikachu", "https://pokeapi.co/api/v2/pokemon/abc/");
        assert_eq!(bad.id(), None);
    }

    #[test]
    fn test_pokemon_decodes_from_wire_format() {
        let json = r#"{
            "id": 25,
            "name": "pikachu",
            "height": 4,
            "weight": 60,
            "base_experience": 112,
            "stats": [
                {"base_stat": 35, "effort": 0, "stat": {"name": "hp", "url": "https://pokeapi.co/api/v2/stat/1/"}}
            ],
            "types": [
                {"slot": 1, "type": {"name": "electric", "url": "https://pokeapi.co/api/v2/type/13/"}}
            ],
            "abilities": [
                {"is_hidden": false, "slot": 1, "ability": {"name": "static", "url": "https://pokeapi.co/api/v2/ability/9/"}}
            ],
            "moves": [
                {
                    "move": {"name": "thunder-shock", "url": "https://pokeapi.co/api/v2/move/84/"},
                    "version_group_details": [
                        {
                            "level_learned_at": 1,
                            "move_learn_method": {"name": "level-up", "url": "https://pokeapi.co/api/v2/move-learn-method/1/"},
                            "version_group": {"name": "red-blue", "url": "https://pokeapi.co/api/v2/version-group/1/"}
                        }
                    ]
                }
            ]
        }"#;

        let pokemon: Pokemon = serde_json::from_str(json).expect("wire format should decode");
        assert_eq!(pokemon.id, 25);
        assert_eq!(pokemon.name, "pikachu");
        assert_eq!(pokemon.primary_type(), Some("electric"));
        assert_eq!(pokemon.moves[0].move_ref.name, "thunder-shock");
        assert_eq!(
            pokemon.moves[0].version_group_details[0]
                .move_learn_method
                .name,
            "level-up"
        );
        assert!(pokemon.validate().is_ok());
    }

    #[test]
    fn test_pokemon_validate() {
        let mut pokemon = Pokemon {
            id: 1,
            name: "bulbasaur".to_string(),
            height: 7,
            weight: 69,
            base_experience: Some(64),
            stats: vec![],
            types: vec![TypeSlot {
                slot: 1,
                type_ref: named("grass", "https://pokeapi.co/api/v2/type/12/"),
            }],
            abilities: vec![],
            moves: vec![],
        };

        assert!(pokemon.validate().is_ok());

        pokemon.id = 0;
        assert!(pokemon.validate().is_err());
        pokemon.id = 1;

        pokemon.name = "Bulbasaur".to_string();
        assert!(pokemon.validate().is_err());
        pokemon.name = "bulbasaur".to_string();

        pokemon.types.clear();
        assert!(pokemon.validate().is_err());
    }

    #[test]
    fn test_resource_page_decodes() {
        let json = r#"{
            "count": 1302,
            "next": "https://pokeapi.co/api/v2/pokemon?offset=20&limit=20",
            "previous": null,
            "results": [
                {"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/"},
                {"name": "ivysaur", "url": "https://pokeapi.co/api/v2/pokemon/2/"}
            ]
        }"#;

        let page: ResourcePage = serde_json::from_str(json).expect("listing should decode");
        assert_eq!(page.count, 1302);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[1].id(), Some(2));
    }
}
