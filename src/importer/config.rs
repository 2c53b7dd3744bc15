//! Pacing configuration for outbound request smoothing.
//!
//! The pauses here are empirical anti-throttling heuristics layered on top
//! of the rate limiter's own guarantee, so every one of them is
//! overridable rather than baked into call sites.

use std::time::Duration;

/// Minimum interval between any two dispatched requests.
/// 100 ms keeps a full bulk import of ~1000 records under two minutes
/// while staying far below the remote service's fair-use threshold.
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

/// Pause inserted between items of a batch fetch.
/// Belt-and-suspenders smoothing on top of the rate limiter, not a
/// substitute for it.
pub const BATCH_ITEM_PAUSE: Duration = Duration::from_millis(50);

/// A bulk import pauses after every this many items.
pub const BULK_PAUSE_EVERY: usize = 10;

/// Duration of the periodic bulk-import pause.
pub const BULK_PAUSE: Duration = Duration::from_millis(20);

/// Item cap requested from the listing endpoint during a bulk import.
pub const BULK_LIST_LIMIT: u32 = 1000;

/// Cap on related-move references resolved per Pokémon.
pub const MAX_RELATED_MOVES: usize = 50;

/// Tunable pacing for one [`BulkImporter`](crate::importer::BulkImporter).
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Item cap requested from the listing endpoint
    pub list_limit: u32,
    /// Pause after every `pause_every` items (0 disables pausing)
    pub pause_every: usize,
    /// Duration of the periodic pause
    pub pause: Duration,
    /// Cap on related-move references resolved per Pokémon
    pub max_related_moves: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            list_limit: BULK_LIST_LIMIT,
            pause_every: BULK_PAUSE_EVERY,
            pause: BULK_PAUSE,
            max_related_moves: MAX_RELATED_MOVES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_constants() {
        let config = ImportConfig::default();
        assert_eq!(config.list_limit, BULK_LIST_LIMIT);
        assert_eq!(config.pause_every, BULK_PAUSE_EVERY);
        assert_eq!(config.pause, BULK_PAUSE);
        assert_eq!(config.max_related_moves, MAX_RELATED_MOVES);
    }
}
