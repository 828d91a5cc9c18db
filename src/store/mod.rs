//! Holds the current rate table and decides when to reload it.

pub mod clock;
#[cfg(test)]
pub(crate) mod testing;

use crate::core::error::ServiceResult;
use crate::core::rates::RateTable;
use crate::core::source::RateSource;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clock::Clock;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use tracing::{debug, error, info, warn};

pub use clock::SystemClock;

struct StoreState {
    table: Arc<RateTable>,
    loaded_at: Option<DateTime<Utc>>,
    last_checked: DateTime<Utc>,
    degraded: bool,
}

/// Point-in-time view of the store for logs and diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreStatus {
    pub base: String,
    pub currencies: usize,
    pub as_of: Option<NaiveDate>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub last_checked: DateTime<Utc>,
    pub degraded: bool,
}

/// Thread-safe owner of the current [`RateTable`].
///
/// Readers get an `Arc` snapshot and keep using it for the whole request, so a
/// refresh that swaps in a new table never affects a computation in progress.
///
/// A refresh is attempted by the first reader that finds the table older than
/// the refresh interval. Only one load runs at a time: readers arriving while
/// it is in flight are served the current table instead of waiting. A failed
/// load keeps the last-known-good table and still advances the check time, so
/// the next attempt happens one interval later.
pub struct RateStore {
    source: Arc<dyn RateSource>,
    clock: Arc<dyn Clock>,
    refresh_interval: Duration,
    state: RwLock<StoreState>,
    refresh_guard: tokio::sync::Mutex<()>,
}

impl RateStore {
    /// Loads the initial table. If that fails the store starts in degraded
    /// mode with [`RateTable::fallback`] rather than refusing to start.
    pub async fn new(
        source: Arc<dyn RateSource>,
        clock: Arc<dyn Clock>,
        refresh_interval: std::time::Duration,
    ) -> Self {
        let started_at = clock.now();
        let state = match source.load().await {
            Ok(table) => {
                info!(
                    source = %source.describe(),
                    base = %table.base(),
                    currencies = table.len(),
                    "Loaded exchange rates"
                );
                StoreState {
                    table: Arc::new(table),
                    loaded_at: Some(started_at),
                    last_checked: started_at,
                    degraded: false,
                }
            }
            Err(e) => {
                error!(
                    source = %source.describe(),
                    error = %e,
                    "Initial rate load failed, serving fallback table"
                );
                StoreState {
                    table: Arc::new(RateTable::fallback()),
                    loaded_at: None,
                    last_checked: started_at,
                    degraded: true,
                }
            }
        };

        Self {
            source,
            clock,
            refresh_interval: Duration::from_std(refresh_interval).unwrap_or(Duration::MAX),
            state: RwLock::new(state),
            refresh_guard: tokio::sync::Mutex::new(()),
        }
    }

    /// Returns the current table, reloading it first when the refresh interval
    /// has elapsed since the last attempt.
    pub async fn get(&self) -> Arc<RateTable> {
        if self.refresh_due() {
            self.refresh_if_due().await;
        }
        self.current()
    }

    /// Current table without any refresh check.
    pub fn current(&self) -> Arc<RateTable> {
        Arc::clone(&self.read_state().table)
    }

    /// Reloads immediately, waiting for any refresh already in flight.
    pub async fn refresh(&self) -> ServiceResult<()> {
        let _guard = self.refresh_guard.lock().await;
        self.reload().await
    }

    pub fn status(&self) -> StoreStatus {
        let state = self.read_state();
        StoreStatus {
            base: state.table.base().to_string(),
            currencies: state.table.len(),
            as_of: state.table.as_of(),
            loaded_at: state.loaded_at,
            last_checked: state.last_checked,
            degraded: state.degraded,
        }
    }

    fn refresh_due(&self) -> bool {
        let last_checked = self.read_state().last_checked;
        self.clock.now() - last_checked > self.refresh_interval
    }

    async fn refresh_if_due(&self) {
        let Ok(_guard) = self.refresh_guard.try_lock() else {
            debug!("Refresh already in progress, serving current table");
            return;
        };
        // Another reader may have completed a refresh before we got the guard
        if !self.refresh_due() {
            return;
        }
        if let Err(e) = self.reload().await {
            warn!(
                source = %self.source.describe(),
                error = %e,
                "Rate refresh failed, keeping last-known-good table"
            );
        }
    }

    /// Callers must hold `refresh_guard`.
    async fn reload(&self) -> ServiceResult<()> {
        let attempted_at = self.clock.now();
        let result = self.source.load().await;

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.last_checked = attempted_at;
        let table = result?;

        info!(
            base = %table.base(),
            currencies = table.len(),
            "Reloaded exchange rates"
        );
        state.table = Arc::new(table);
        state.loaded_at = Some(attempted_at);
        state.degraded = false;
        Ok(())
    }

    fn read_state(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}
