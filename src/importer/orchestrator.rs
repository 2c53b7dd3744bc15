//! Bulk import orchestration.
//!
//! Drives the one-shot import of the full Pokémon listing: one listing
//! call, then sequential detail fetches with per-item failure recovery,
//! progress updates after every item, and periodic smoothing pauses.
//! A listing failure degrades to the embedded fallback dataset so
//! dependent surfaces never observe an empty result set.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiResult};
use crate::fallback::FallbackCatalog;
use crate::importer::config::ImportConfig;
use crate::importer::progress::{ImportProgress, ProgressState};
use crate::metrics;
use crate::shutdown::{self, SharedShutdown};
use crate::{MoveDetail, Pokemon, VersionGroupDetail};

/// Learn method treated as the primary context for a move.
const LEVEL_UP_METHOD: &str = "level-up";

/// Phases of a bulk import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportPhase {
    /// No run has started (or state was cleared)
    #[default]
    Idle,
    /// The listing call is in flight
    Listing,
    /// Sequential detail fetches are in progress
    FetchingItems,
    /// The run finished; results are published (possibly partial after
    /// cancellation)
    Done,
    /// The listing call failed; results hold the fallback dataset
    Failed,
}

/// Outcome summary of a bulk import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    /// Phase the importer ended in
    pub phase: ImportPhase,
    /// Number of records in the published result set
    pub imported: usize,
    /// Number of listing items skipped after fetch failures
    pub skipped: usize,
    /// Whether the embedded fallback dataset was used
    pub fell_back: bool,
}

/// A move resolved for a Pokémon's learnset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnedMove {
    /// Canonical move name
    pub name: String,
    /// Learn method of the selected context
    pub learn_method: String,
    /// Level of the selected context (0 when not level-based)
    pub level: u32,
    /// Base power, absent for status moves
    pub power: Option<u32>,
    /// Name of the move's type
    pub move_type: String,
}

#[derive(Debug, Default)]
struct ImportState {
    phase: ImportPhase,
    by_id: HashMap<u32, Pokemon>,
    by_name: HashMap<String, Pokemon>,
    results: Vec<Pokemon>,
    move_cache: HashMap<String, MoveDetail>,
    skipped: usize,
    fell_back: bool,
}

/// One-shot bulk importer.
///
/// All mutable state is confined to a single serialized context (an async
/// mutex); observers read phase and progress through separate snapshots
/// that stay readable while a run is in flight.
pub struct BulkImporter {
    client: Arc<ApiClient>,
    config: ImportConfig,
    shutdown: Option<SharedShutdown>,
    state: Mutex<ImportState>,
    progress: StdMutex<ProgressState>,
    phase_view: StdMutex<ImportPhase>,
}

impl BulkImporter {
    /// Create an importer over a shared API client.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            config: ImportConfig::default(),
            shutdown: shutdown::get_global_shutdown(),
            state: Mutex::new(ImportState::default()),
            progress: StdMutex::new(ProgressState::idle()),
            phase_view: StdMutex::new(ImportPhase::Idle),
        }
    }

    /// Override pacing configuration.
    pub fn with_config(mut self, config: ImportConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a shared shutdown handle for cancellation.
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Current phase.
    pub fn phase(&self) -> ImportPhase {
        *self
            .phase_view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a run is currently in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self.phase(), ImportPhase::Listing | ImportPhase::FetchingItems)
    }

    /// Progress snapshot; indeterminate between runs.
    pub fn progress(&self) -> ImportProgress {
        self.with_progress(|p| p.snapshot())
    }

    /// The published result set, sorted by ascending id. Waits for any
    /// in-flight run to finish.
    pub async fn results(&self) -> Vec<Pokemon> {
        self.state.lock().await.results.clone()
    }

    /// Reset all run state, allowing a fresh import.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        *state = ImportState::default();
        *self
            .phase_view
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = ImportPhase::Idle;
        self.with_progress(|p| p.reset());
    }

    /// Run the bulk import.
    ///
    /// A no-op when a run is already in flight or a prior run published a
    /// non-empty result set; the importer fetches its full target set at
    /// most once per process lifetime unless [`clear`](Self::clear)ed.
    /// Individual item failures are skipped; only a failure of the initial
    /// listing call is fatal and triggers the fallback dataset.
    pub async fn run(&self) -> ImportSummary {
        let mut state = match self.state.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("bulk import already in flight");
                return ImportSummary {
                    phase: self.phase(),
                    imported: 0,
                    skipped: 0,
                    fell_back: false,
                };
            }
        };

        if state.phase != ImportPhase::Idle || !state.results.is_empty() {
            debug!(phase = ?state.phase, "bulk import already ran; skipping");
            return Self::summarize(&state);
        }

        self.set_phase(&mut state, ImportPhase::Listing);
        self.with_progress(|p| p.begin_indeterminate("requesting listing"));
        info!(limit = self.config.list_limit, "starting bulk import");

        let page = match self.client.list_pokemon(self.config.list_limit, 0).await {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "listing call failed; degrading to fallback dataset");
                self.populate_fallback(&mut state);
                return Self::summarize(&state);
            }
        };

        let total = page.results.len();
        self.set_phase(&mut state, ImportPhase::FetchingItems);
        self.with_progress(|p| p.begin(total, format!("fetching {total} records")));
        info!(total, "listing received");

        let mut cancelled = false;
        for (index, item) in page.results.iter().enumerate() {
            if self.shutdown_requested() {
                cancelled = true;
                info!(
                    completed = index,
                    total, "bulk import cancelled; keeping partial results"
                );
                break;
            }

            match self.client.fetch_pokemon(&item.name).await {
                Ok(pokemon) => {
                    if let Some(listed) = item.id() {
                        if listed != pokemon.id {
                            warn!(
                                listed,
                                fetched = pokemon.id,
                                name = %item.name,
                                "listing id does not match fetched record"
                            );
                        }
                    }
                    metrics::record_bulk_item(true);
                    state.by_name.insert(pokemon.name.clone(), pokemon.clone());
                    state.by_id.insert(pokemon.id, pokemon);
                }
                Err(e) => {
                    metrics::record_bulk_item(false);
                    state.skipped += 1;
                    warn!(name = %item.name, error = %e, "skipping record after fetch failure");
                }
            }

            self.with_progress(|p| p.advance(format!("fetched {} of {total}", index + 1)));

            if self.config.pause_every > 0 && (index + 1) % self.config.pause_every == 0 {
                sleep(self.config.pause).await;
            }
        }

        let mut results: Vec<Pokemon> = state.by_id.values().cloned().collect();
        results.sort_by_key(|p| p.id);
        state.results = results;

        self.set_phase(&mut state, ImportPhase::Done);
        if cancelled {
            let imported = state.results.len();
            self.with_progress(|p| {
                p.note(format!("cancelled after {imported} of {total} records"))
            });
        } else {
            let imported = state.results.len();
            self.with_progress(|p| p.finish(format!("imported {imported} records")));
        }
        info!(
            imported = state.results.len(),
            skipped = state.skipped,
            cancelled,
            "bulk import finished"
        );
        Self::summarize(&state)
    }

    /// Resolve the learnset for one Pokémon.
    ///
    /// The parent record is resolved through the bulk run's dedup caches
    /// when possible; up to `max_related_moves` unique move references are
    /// then resolved through a process-lifetime move cache, fetching
    /// individually on miss and skipping per-move failures. The result is
    /// sorted by (context preference, level ascending, name ascending).
    pub async fn moves_for(&self, parent_id: u32) -> ApiResult<Vec<LearnedMove>> {
        let mut state = self.state.lock().await;

        let parent = match state.by_id.get(&parent_id) {
            Some(pokemon) => {
                metrics::record_cache_hit("bulk");
                pokemon.clone()
            }
            None => {
                metrics::record_cache_miss("bulk");
                let fetched = self.client.fetch_pokemon(&parent_id.to_string()).await?;
                state.by_name.insert(fetched.name.clone(), fetched.clone());
                state.by_id.insert(fetched.id, fetched.clone());
                fetched
            }
        };

        let mut seen = HashSet::new();
        let mut picked = Vec::new();
        for slot in &parent.moves {
            if picked.len() >= self.config.max_related_moves {
                debug!(
                    parent = %parent.name,
                    cap = self.config.max_related_moves,
                    "related-move cap reached"
                );
                break;
            }
            if !seen.insert(slot.move_ref.name.clone()) {
                continue;
            }
            let (method, level) = select_context(&slot.version_group_details);
            picked.push((slot.move_ref.name.clone(), method, level));
        }

        let mut resolved = Vec::with_capacity(picked.len());
        for (name, learn_method, level) in picked {
            let detail = if let Some(cached) = state.move_cache.get(&name) {
                metrics::record_cache_hit("move");
                cached.clone()
            } else {
                metrics::record_cache_miss("move");
                match self.client.fetch_move(&name).await {
                    Ok(detail) => {
                        state.move_cache.insert(name.clone(), detail.clone());
                        detail
                    }
                    Err(e) => {
                        warn!(move_name = %name, error = %e, "skipping move after fetch failure");
                        continue;
                    }
                }
            };

            resolved.push(LearnedMove {
                name,
                learn_method,
                level,
                power: detail.power,
                move_type: detail.type_ref.name,
            });
        }

        resolved.sort_by(|a, b| {
            context_rank(a)
                .cmp(&context_rank(b))
                .then(a.level.cmp(&b.level))
                .then(a.name.cmp(&b.name))
        });
        Ok(resolved)
    }

    fn populate_fallback(&self, state: &mut ImportState) {
        match FallbackCatalog::load() {
            Ok(catalog) => {
                for pokemon in catalog.entries() {
                    state.by_name.insert(pokemon.name.clone(), pokemon.clone());
                    state.by_id.insert(pokemon.id, pokemon.clone());
                }
                let mut results: Vec<Pokemon> = state.by_id.values().cloned().collect();
                results.sort_by_key(|p| p.id);
                state.results = results;
                state.fell_back = true;

                self.set_phase(state, ImportPhase::Failed);
                let count = state.results.len();
                self.with_progress(|p| {
                    p.begin(count, "loading fallback dataset");
                    p.finish(format!("offline fallback: {count} records"));
                });
                info!(count, "fallback dataset published");
            }
            Err(e) => {
                error!(error = %e, "fallback dataset unavailable");
                self.set_phase(state, ImportPhase::Failed);
                self.with_progress(|p| p.finish("import failed"));
            }
        }
    }

    fn with_progress<R>(&self, f: impl FnOnce(&mut ProgressState) -> R) -> R {
        let mut guard = self.progress.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    fn set_phase(&self, state: &mut ImportState, phase: ImportPhase) {
        state.phase = phase;
        *self
            .phase_view
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = phase;
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .map(|s| s.is_requested())
            .unwrap_or(false)
    }

    fn summarize(state: &ImportState) -> ImportSummary {
        ImportSummary {
            phase: state.phase,
            imported: state.results.len(),
            skipped: state.skipped,
            fell_back: state.fell_back,
        }
    }
}

fn context_rank(learned: &LearnedMove) -> u8 {
    if learned.learn_method == LEVEL_UP_METHOD && learned.level > 0 {
        0
    } else {
        1
    }
}

/// Select one qualifying context: prefer a level-up context with a
/// positive level, otherwise take the first available.
fn select_context(details: &[VersionGroupDetail]) -> (String, u32) {
    if let Some(primary) = details
        .iter()
        .find(|d| d.move_learn_method.name == LEVEL_UP_METHOD && d.level_learned_at > 0)
    {
        return (
            primary.move_learn_method.name.clone(),
            primary.level_learned_at,
        );
    }

    details
        .first()
        .map(|d| (d.move_learn_method.name.clone(), d.level_learned_at))
        .unwrap_or_else(|| ("unknown".to_string(), 0))
}
