//! Deterministic clock and source doubles for store and service tests.

use super::clock::Clock;
use crate::core::currency::CurrencyCode;
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::rates::RateTable;
use crate::core::source::RateSource;
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Clock that only moves when told to.
pub struct FakeClock {
    now: Mutex<DateTime<Utc>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// USD-based table with the given EUR rate plus GBP at 0.8.
pub fn usd_table(eur: f64) -> RateTable {
    RateTable::new(
        CurrencyCode::normalize("USD"),
        vec![
            (CurrencyCode::normalize("EUR"), eur),
            (CurrencyCode::normalize("GBP"), 0.8),
        ],
    )
    .unwrap()
}

/// Source whose next result is set by the test. Once gated, `load` blocks
/// until [`ScriptedSource::release`] is called.
pub struct ScriptedSource {
    next: Mutex<Option<RateTable>>,
    loads: AtomicUsize,
    gated: AtomicBool,
    pub started: Notify,
    release: Notify,
}

impl ScriptedSource {
    pub fn new(table: Option<RateTable>) -> Self {
        Self {
            next: Mutex::new(table),
            loads: AtomicUsize::new(0),
            gated: AtomicBool::new(false),
            started: Notify::new(),
            release: Notify::new(),
        }
    }

    pub fn gate(&self) {
        self.gated.store(true, Ordering::SeqCst);
    }

    pub fn set_next(&self, table: Option<RateTable>) {
        *self.next.lock().unwrap() = table;
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl RateSource for ScriptedSource {
    fn describe(&self) -> String {
        "scripted".to_string()
    }

    async fn load(&self) -> ServiceResult<RateTable> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.gated.load(Ordering::SeqCst) {
            self.started.notify_one();
            self.release.notified().await;
        }
        let next = self.next.lock().unwrap().clone();
        next.ok_or_else(|| ServiceError::source_unavailable(anyhow!("scripted failure")))
    }
}
