//! Daily completion ledger.
//!
//! Counts work intervals completed on the current local calendar day and
//! keeps that count in a single key-value record:
//!
//! ```text
//! tomato-timer-daily-stats = {"date":"2026-10-17","count":3}
//! ```
//!
//! The record is read once at startup. A record from another day is
//! discarded at that point; a day boundary crossed later in the same process
//! does not reset the in-memory count. Store failures never reach the
//! caller: they are logged and the in-memory count stays authoritative.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LedgerError;

/// Fixed key of the ledger record.
pub const LEDGER_KEY: &str = "tomato-timer-daily-stats";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Durable string key-value storage.
pub trait KvStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError>;
    fn set(&self, key: &str, value: &str) -> Result<(), LedgerError>;
    fn remove(&self, key: &str) -> Result<(), LedgerError>;
}

/// In-process store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, LedgerError> {
        self.inner
            .lock()
            .map_err(|_| LedgerError::Unavailable("memory store poisoned".into()))
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
        Ok(self.map()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LedgerError> {
        self.map()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), LedgerError> {
        self.map()?.remove(key);
        Ok(())
    }
}

/// The persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Local calendar day, `YYYY-MM-DD`.
    pub date: String,
    pub count: u32,
}

type DaySource = Box<dyn Fn() -> NaiveDate + Send>;

/// Today's completed work intervals, backed by a [`KvStore`].
pub struct DailyLedger {
    store: Box<dyn KvStore>,
    today: DaySource,
    count: u32,
}

impl DailyLedger {
    /// Ledger over `store` using the host's local calendar day.
    pub fn new(store: impl KvStore + 'static) -> Self {
        Self::with_day_source(store, || Local::now().date_naive())
    }

    /// Ledger with an explicit notion of "today".
    pub fn with_day_source(
        store: impl KvStore + 'static,
        today: impl Fn() -> NaiveDate + Send + 'static,
    ) -> Self {
        Self {
            store: Box::new(store),
            today: Box::new(today),
            count: 0,
        }
    }

    /// Ledger over a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    fn today_key(&self) -> String {
        (self.today)().format(DATE_FORMAT).to_string()
    }

    /// In-memory count.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Read the persisted record and adopt its count if it is from today.
    ///
    /// Missing, stale, corrupt or unreadable records all yield 0. A stale
    /// record is removed.
    pub fn load(&mut self) -> u32 {
        self.count = match self.read_record() {
            Ok(Some(record)) if record.date == self.today_key() => record.count,
            Ok(Some(record)) => {
                debug!(date = %record.date, "discarding daily record from another day");
                if let Err(e) = self.store.remove(LEDGER_KEY) {
                    warn!(error = %e, "failed to remove stale daily record");
                }
                0
            }
            Ok(None) => 0,
            Err(e) => {
                warn!(error = %e, "daily stats unavailable, starting at 0");
                0
            }
        };
        self.count
    }

    /// Count one more completed work interval and persist it under today's date.
    pub fn increment(&mut self) -> u32 {
        self.count = self.count.saturating_add(1);
        let record = DailyRecord {
            date: self.today_key(),
            count: self.count,
        };
        if let Err(e) = self.write_record(&record) {
            warn!(error = %e, count = self.count, "failed to persist daily stats");
        }
        self.count
    }

    fn read_record(&self) -> Result<Option<DailyRecord>, LedgerError> {
        match self.store.get(LEDGER_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn write_record(&self, record: &DailyRecord) -> Result<(), LedgerError> {
        let raw = serde_json::to_string(record)?;
        self.store.set(LEDGER_KEY, &raw)
    }
}

impl std::fmt::Debug for DailyLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DailyLedger")
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Store whose every operation fails.
    #[derive(Debug, Default)]
    pub struct BrokenStore;

    impl KvStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, LedgerError> {
            Err(LedgerError::Unavailable("offline".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), LedgerError> {
            Err(LedgerError::Unavailable("offline".into()))
        }

        fn remove(&self, _key: &str) -> Result<(), LedgerError> {
            Err(LedgerError::Unavailable("offline".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::testing::BrokenStore;
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    /// Day source the test can move forward.
    fn movable_day(start: u32) -> (Arc<AtomicI64>, impl Fn() -> NaiveDate + Send + 'static) {
        let offset = Arc::new(AtomicI64::new(0));
        let handle = offset.clone();
        let source = move || day(start) + chrono::Days::new(handle.load(Ordering::SeqCst) as u64);
        (offset, source)
    }

    #[test]
    fn empty_store_loads_zero() {
        let mut ledger = DailyLedger::in_memory();
        assert_eq!(ledger.load(), 0);
    }

    #[test]
    fn increments_round_trip_on_same_day() {
        let store = MemoryStore::new();
        let mut ledger = DailyLedger::with_day_source(store.clone(), || day(17));
        ledger.load();
        for expected in 1..=5 {
            assert_eq!(ledger.increment(), expected);
        }

        let mut fresh = DailyLedger::with_day_source(store.clone(), || day(17));
        assert_eq!(fresh.load(), 5);

        let raw = store.get(LEDGER_KEY).unwrap().unwrap();
        let record: DailyRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            record,
            DailyRecord {
                date: "2026-10-17".into(),
                count: 5
            }
        );
    }

    #[test]
    fn stale_record_is_discarded_on_load() {
        let store = MemoryStore::new();
        let mut ledger = DailyLedger::with_day_source(store.clone(), || day(17));
        ledger.load();
        ledger.increment();
        ledger.increment();

        let mut fresh = DailyLedger::with_day_source(store.clone(), || day(18));
        assert_eq!(fresh.load(), 0);
        assert!(store.get(LEDGER_KEY).unwrap().is_none());
    }

    #[test]
    fn midnight_does_not_reset_running_count() {
        let store = MemoryStore::new();
        let (offset, source) = movable_day(17);
        let mut ledger = DailyLedger::with_day_source(store.clone(), source);
        ledger.load();
        ledger.increment();

        offset.store(1, Ordering::SeqCst);
        assert_eq!(ledger.increment(), 2);

        let raw = store.get(LEDGER_KEY).unwrap().unwrap();
        let record: DailyRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(record.date, "2026-10-18");
    }

    #[test]
    fn corrupt_record_loads_zero() {
        let store = MemoryStore::new();
        store.set(LEDGER_KEY, "{not json").unwrap();
        let mut ledger = DailyLedger::with_day_source(store, || day(17));
        assert_eq!(ledger.load(), 0);
    }

    #[test]
    fn broken_store_keeps_in_memory_count() {
        let mut ledger = DailyLedger::with_day_source(BrokenStore, || day(17));
        assert_eq!(ledger.load(), 0);
        assert_eq!(ledger.increment(), 1);
        assert_eq!(ledger.increment(), 2);
        assert_eq!(ledger.count(), 2);
    }

    #[test]
    fn sqlite_backed_ledger_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tomato.db");
        {
            let db = crate::storage::Database::open_at(&path).unwrap();
            let mut ledger = DailyLedger::with_day_source(db, || day(17));
            ledger.load();
            ledger.increment();
            ledger.increment();
            ledger.increment();
        }
        let db = crate::storage::Database::open_at(&path).unwrap();
        let mut ledger = DailyLedger::with_day_source(db, || day(17));
        assert_eq!(ledger.load(), 3);
    }
}
