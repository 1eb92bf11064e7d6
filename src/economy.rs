//! Reroll credits and the one-time weekly rewards.
//!
//! Per week: 3 rerolls to start, +1 the first time a line is completed,
//! +3 the first time the whole board is. The won/golden flags only ever go
//! from unset to set; a reroll that breaks a finished line leaves them alone.

use crate::board::{Board, TILE_COUNT};
use crate::events::{Celebration, EngineEvent, EventSink};
use crate::ledger::WeekLedger;
use crate::pool::CandidatePool;
use crate::store::{KeyValueStore, StoreError};
use crate::week::WeekKey;
use rand::Rng;
use rand::seq::IndexedRandom;
use thiserror::Error;

pub const BINGO_REWARD: u32 = 1;
pub const GOLDEN_REWARD: u32 = 3;

#[derive(Debug, Error)]
pub enum RerollError {
    #[error("no rerolls left this week")]
    NoRerollsLeft,
    #[error("every candidate text is already on the board")]
    NoCandidatesLeft,
    #[error("tile index {0} is outside the board (0..{max})", max = TILE_COUNT)]
    InvalidTile(usize),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rerolled {
    pub index: usize,
    pub previous: String,
    pub text: String,
    pub balance: u32,
}

/// First line bingo of the week: mark won, celebrate, grant the reward once.
///
/// Returns `false` (and does nothing) when the week is already won, so it is
/// safe to call after every change.
pub fn on_win_detected<S, E>(week: WeekKey, store: &mut S, events: &mut E) -> Result<bool, StoreError>
where
    S: KeyValueStore + ?Sized,
    E: EventSink + ?Sized,
{
    let mut ledger = WeekLedger::new(store, week);
    if ledger.is_won()? {
        return Ok(false);
    }
    ledger.mark_won()?;
    tracing::info!(%week, "bingo");
    events.emit(EngineEvent::Celebrate(Celebration::Bingo));

    if !ledger.bingo_rewarded()? {
        ledger.mark_bingo_rewarded()?;
        let balance = ledger.rerolls()?.saturating_add(BINGO_REWARD);
        ledger.set_rerolls(balance)?;
        tracing::info!(%week, balance, "granted bingo reroll reward");
        events.emit(EngineEvent::RerollBalanceChanged(balance));
    }
    Ok(true)
}

/// First full board of the week: mark golden, bump the lifetime counter,
/// celebrate harder, grant the golden reward once.
pub fn on_golden_detected<S, E>(week: WeekKey, store: &mut S, events: &mut E) -> Result<bool, StoreError>
where
    S: KeyValueStore + ?Sized,
    E: EventSink + ?Sized,
{
    let mut ledger = WeekLedger::new(store, week);
    if ledger.is_golden()? {
        return Ok(false);
    }
    ledger.mark_golden()?;
    let count = ledger.golden_count()?.saturating_add(1);
    ledger.set_golden_count(count)?;
    tracing::info!(%week, lifetime = count, "golden bingo");
    events.emit(EngineEvent::GoldenCountChanged(count));
    events.emit(EngineEvent::Celebrate(Celebration::Golden));

    if !ledger.golden_rewarded()? {
        ledger.mark_golden_rewarded()?;
        let balance = ledger.rerolls()?.saturating_add(GOLDEN_REWARD);
        ledger.set_rerolls(balance)?;
        tracing::info!(%week, balance, "granted golden reroll reward");
        events.emit(EngineEvent::RerollBalanceChanged(balance));
    }
    Ok(true)
}

/// Swaps the text of tile `index` for a random candidate that is not on the
/// board, unmarks the tile and spends one reroll.
///
/// A reroll always changes the text: with a pool of exactly 25 texts there is
/// nothing to swap in. Nothing is written unless every precondition holds, and
/// on a store failure `board` still matches what is stored.
pub fn request_reroll<S, R>(
    board: &mut Board,
    index: usize,
    week: WeekKey,
    pool: &CandidatePool,
    store: &mut S,
    rng: &mut R,
) -> Result<Rerolled, RerollError>
where
    S: KeyValueStore + ?Sized,
    R: Rng + ?Sized,
{
    let current = board.tile(index).ok_or(RerollError::InvalidTile(index))?.text.clone();

    let mut ledger = WeekLedger::new(store, week);
    let balance = ledger.rerolls()?;
    if balance == 0 {
        return Err(RerollError::NoRerollsLeft);
    }

    let unused: Vec<&String> = pool.as_slice().iter().filter(|text| !board.contains_text(text)).collect();
    let text = unused.choose(rng).ok_or(RerollError::NoCandidatesLeft)?.to_string();

    let mut next = board.clone();
    next.replace_text(index, text.clone());
    // Balance is written first; a failed board write restores it.
    ledger.set_rerolls(balance - 1)?;
    if let Err(e) = ledger.save_board(&next) {
        if let Err(undo) = ledger.set_rerolls(balance) {
            tracing::warn!(%week, error = %undo, "could not refund reroll after failed board write");
        }
        return Err(e.into());
    }
    *board = next;

    tracing::info!(%week, index, from = %current, to = %text, balance = balance - 1, "rerolled tile");
    Ok(Rerolled {
        index,
        previous: current,
        text,
        balance: balance - 1,
    })
}
