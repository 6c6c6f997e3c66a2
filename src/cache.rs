//! Whole-table cache with single-flight loading.
//!
//! The slot is `Empty`, `Loading` or `Ready`. A miss installs one shared
//! load future in the slot; every caller that arrives before it resolves
//! awaits the same future, so the backing file is read once per population.
//!
//! The mutex guards slot transitions only and is never held across an await.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::data::loader::TableSource;
use crate::data::model::Dataset;
use crate::error::{DataError, Result};

type SharedLoad = Shared<BoxFuture<'static, std::result::Result<Arc<Dataset>, DataError>>>;

enum Slot {
    Empty,
    Loading { id: u64, load: SharedLoad },
    Ready(Arc<Dataset>),
}

struct State {
    slot: Slot,
    next_load_id: u64,
}

/// Process-lifetime cache of the full price table.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct DatasetCache {
    source: Arc<dyn TableSource>,
    state: Mutex<State>,
    loads: AtomicUsize,
}

impl DatasetCache {
    pub fn new(source: impl TableSource + 'static) -> Self {
        Self::from_arc(Arc::new(source))
    }

    pub fn from_arc(source: Arc<dyn TableSource>) -> Self {
        Self {
            source,
            state: Mutex::new(State {
                slot: Slot::Empty,
                next_load_id: 0,
            }),
            loads: AtomicUsize::new(0),
        }
    }

    /// Return the cached table, loading it on a miss.
    ///
    /// Concurrent callers during a load share its outcome. A failed load
    /// leaves the cache empty so the next call retries.
    pub async fn get(&self) -> Result<Arc<Dataset>> {
        let (id, load) = {
            let mut state = self.lock();
            match &state.slot {
                Slot::Ready(dataset) => {
                    log::debug!("price table cache hit");
                    return Ok(Arc::clone(dataset));
                }
                Slot::Loading { id, load } => {
                    log::debug!("joining in-flight price table load #{id}");
                    (*id, load.clone())
                }
                Slot::Empty => {
                    let id = state.next_load_id;
                    state.next_load_id += 1;
                    self.loads.fetch_add(1, Ordering::Relaxed);
                    log::debug!(
                        "price table cache miss, starting load #{id} from {}",
                        self.source.describe()
                    );

                    let source = Arc::clone(&self.source);
                    let load = async move { source.load().await.map(Arc::new) }
                        .boxed()
                        .shared();
                    state.slot = Slot::Loading {
                        id,
                        load: load.clone(),
                    };
                    (id, load)
                }
            }
        };

        let outcome = load.await;

        let mut state = self.lock();
        // Only the load still installed may settle the slot; one that was
        // invalidated (or already settled by another waiter) is left alone.
        if matches!(&state.slot, Slot::Loading { id: current, .. } if *current == id) {
            state.slot = match &outcome {
                Ok(dataset) => Slot::Ready(Arc::clone(dataset)),
                Err(e) => {
                    log::warn!("price table load #{id} failed: {e}");
                    Slot::Empty
                }
            };
        }
        outcome
    }

    /// Drop the cached table (or forget an in-flight load). Idempotent.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        if !matches!(state.slot, Slot::Empty) {
            log::debug!("price table cache invalidated");
        }
        state.slot = Slot::Empty;
    }

    /// True when a loaded table is held.
    pub fn is_populated(&self) -> bool {
        matches!(self.lock().slot, Slot::Ready(_))
    }

    /// Number of loads started since construction.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Slot transitions are single assignments, so a poisoned guard still
        // holds a consistent state.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
