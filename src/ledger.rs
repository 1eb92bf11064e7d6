//! Typed view of the per-week entries (and the lifetime golden counter)
//! on top of a raw [`KeyValueStore`].
//!
//! Every entry is lazily defaulted: flags read as unset, the reroll balance
//! as [`DEFAULT_REROLLS`], the golden counter as zero. Values that fail to
//! parse fall back to the same defaults.

use crate::board::Board;
use crate::store::{KeyValueStore, StorageKey, StoreError};
use crate::week::WeekKey;

pub const DEFAULT_REROLLS: u32 = 3;

const FLAG_SET: &str = "1";

pub struct WeekLedger<'s, S: KeyValueStore + ?Sized> {
    store: &'s mut S,
    week: WeekKey,
}

impl<'s, S: KeyValueStore + ?Sized> WeekLedger<'s, S> {
    pub fn new(store: &'s mut S, week: WeekKey) -> Self {
        WeekLedger { store, week }
    }

    pub fn week(&self) -> WeekKey {
        self.week
    }

    pub fn board(&self) -> Result<Option<Board>, StoreError> {
        let key = StorageKey::Board(self.week).to_string();
        let Some(raw) = self.store.get(&key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(board) => Ok(Some(board)),
            Err(e) => {
                tracing::warn!(%key, error = %e, "discarding unreadable board");
                Ok(None)
            }
        }
    }

    pub fn save_board(&mut self, board: &Board) -> Result<(), StoreError> {
        let key = StorageKey::Board(self.week).to_string();
        let encoded = serde_json::to_string(board).map_err(|source| StoreError::Encode {
            what: key.clone(),
            source,
        })?;
        self.store.set(&key, &encoded)?;
        tracing::debug!(%key, "saved board");
        Ok(())
    }

    pub fn is_won(&self) -> Result<bool, StoreError> {
        self.flag(StorageKey::Won(self.week))
    }

    pub fn mark_won(&mut self) -> Result<(), StoreError> {
        self.set_flag(StorageKey::Won(self.week))
    }

    pub fn is_golden(&self) -> Result<bool, StoreError> {
        self.flag(StorageKey::Golden(self.week))
    }

    pub fn mark_golden(&mut self) -> Result<(), StoreError> {
        self.set_flag(StorageKey::Golden(self.week))
    }

    pub fn bingo_rewarded(&self) -> Result<bool, StoreError> {
        self.flag(StorageKey::BingoRewarded(self.week))
    }

    pub fn mark_bingo_rewarded(&mut self) -> Result<(), StoreError> {
        self.set_flag(StorageKey::BingoRewarded(self.week))
    }

    pub fn golden_rewarded(&self) -> Result<bool, StoreError> {
        self.flag(StorageKey::GoldenRewarded(self.week))
    }

    pub fn mark_golden_rewarded(&mut self) -> Result<(), StoreError> {
        self.set_flag(StorageKey::GoldenRewarded(self.week))
    }

    pub fn rerolls(&self) -> Result<u32, StoreError> {
        self.counter(StorageKey::Rerolls(self.week), DEFAULT_REROLLS)
    }

    pub fn set_rerolls(&mut self, balance: u32) -> Result<(), StoreError> {
        self.set_counter(StorageKey::Rerolls(self.week), balance)
    }

    /// Lifetime number of golden bingos, shared by all weeks.
    pub fn golden_count(&self) -> Result<u32, StoreError> {
        self.counter(StorageKey::GoldenCount, 0)
    }

    pub fn set_golden_count(&mut self, count: u32) -> Result<(), StoreError> {
        self.set_counter(StorageKey::GoldenCount, count)
    }

    fn flag(&self, key: StorageKey) -> Result<bool, StoreError> {
        Ok(self.store.get(&key.to_string())?.as_deref() == Some(FLAG_SET))
    }

    fn set_flag(&mut self, key: StorageKey) -> Result<(), StoreError> {
        self.store.set(&key.to_string(), FLAG_SET)
    }

    fn counter(&self, key: StorageKey, default: u32) -> Result<u32, StoreError> {
        let key = key.to_string();
        Ok(match self.store.get(&key)? {
            None => default,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(%key, value = %raw, default, "unreadable counter, using default");
                default
            }),
        })
    }

    fn set_counter(&mut self, key: StorageKey, value: u32) -> Result<(), StoreError> {
        self.store.set(&key.to_string(), &value.to_string())
    }
}
