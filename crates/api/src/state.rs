use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use timetrack_core::types::DbId;
use tokio::sync::OwnedMutexGuard;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: timetrack_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Serializes time-entry writes per user and day.
    pub entry_locks: Arc<EntryLocks>,
}

impl AppState {
    pub fn new(pool: timetrack_db::DbPool, config: ServerConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            entry_locks: Arc::new(EntryLocks::default()),
        }
    }
}

/// Key of the entry lock table.
pub type DayKey = (DbId, NaiveDate);

/// Exclusive async locks keyed by `(user_id, date)`.
///
/// Time-entry validation reads the user's other entries for the day and then
/// writes; holding the key's lock across both steps keeps two concurrent
/// submissions from both passing the overlap and daily-cap checks.
#[derive(Default)]
pub struct EntryLocks {
    slots: Mutex<HashMap<DayKey, Arc<tokio::sync::Mutex<()>>>>,
}

/// Guards held for the duration of a validated write.
pub struct DayGuards {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl EntryLocks {
    /// Acquire the locks for every key, in a fixed order so that two writers
    /// needing overlapping key sets cannot deadlock.
    pub async fn acquire(&self, keys: &[DayKey]) -> DayGuards {
        let mut keys = keys.to_vec();
        keys.sort_unstable();
        keys.dedup();

        let slots: Vec<_> = {
            let mut map = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            // Drop slots nobody holds or waits on.
            map.retain(|_, slot| Arc::strong_count(slot) > 1);
            keys.iter()
                .map(|key| Arc::clone(map.entry(*key).or_default()))
                .collect()
        };

        let mut guards = Vec::with_capacity(slots.len());
        for slot in slots {
            guards.push(slot.lock_owned().await);
        }
        DayGuards { _guards: guards }
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = Arc::new(EntryLocks::default());
        let guard = locks.acquire(&[(3, d(10))]).await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _g = locks.acquire(&[(3, d(10))]).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished(), "second writer must wait");

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .expect("second writer should proceed once the first releases")
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_keys_do_not_contend() {
        let locks = EntryLocks::default();
        let _a = locks.acquire(&[(3, d(10))]).await;
        let _b = tokio::time::timeout(Duration::from_secs(1), locks.acquire(&[(3, d(11))]))
            .await
            .expect("different day must not block");
        let _c = tokio::time::timeout(Duration::from_secs(1), locks.acquire(&[(4, d(10))]))
            .await
            .expect("different user must not block");
    }

    #[tokio::test]
    async fn test_duplicate_keys_do_not_self_deadlock() {
        let locks = EntryLocks::default();
        let _g = tokio::time::timeout(
            Duration::from_secs(1),
            locks.acquire(&[(3, d(10)), (3, d(10))]),
        )
        .await
        .expect("duplicate keys are collapsed");
    }

    #[tokio::test]
    async fn test_released_slots_are_pruned() {
        let locks = EntryLocks::default();
        drop(locks.acquire(&[(3, d(10)), (4, d(11))]).await);
        assert_eq!(locks.len(), 2);
        drop(locks.acquire(&[(5, d(12))]).await);
        assert_eq!(locks.len(), 1);
    }
}
