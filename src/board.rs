use crate::ledger::WeekLedger;
use crate::pool::CandidatePool;
use crate::store::{KeyValueStore, StoreError};
use crate::week::WeekKey;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BOARD_SIZE: usize = 5;
pub const TILE_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

#[derive(Debug, Error)]
pub enum BingoError {
    /// `size` counts distinct texts; exact repeats in the source list are
    /// collapsed when the pool is built.
    #[error("candidate pool has {size} texts, a board needs at least {min}", min = TILE_COUNT)]
    PoolTooSmall { size: usize },
    #[error("tile index {0} is outside the board (0..{max})", max = TILE_COUNT)]
    InvalidTile(usize),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub text: String,
    pub checked: bool,
}

impl Tile {
    pub fn new(text: impl Into<String>) -> Self {
        Tile { text: text.into(), checked: false }
    }
}

/// Exactly 25 tiles in row-major order; index `r * 5 + c` is row `r`,
/// column `c`. Serialized as a bare JSON array of `{text, checked}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tile>", into = "Vec<Tile>")]
pub struct Board {
    tiles: Vec<Tile>,
}

#[derive(Debug, Error)]
#[error("a board has {expected} tiles, got {0}", expected = TILE_COUNT)]
pub struct WrongTileCount(pub usize);

impl TryFrom<Vec<Tile>> for Board {
    type Error = WrongTileCount;

    fn try_from(tiles: Vec<Tile>) -> Result<Self, Self::Error> {
        if tiles.len() != TILE_COUNT {
            return Err(WrongTileCount(tiles.len()));
        }
        Ok(Board { tiles })
    }
}

impl From<Board> for Vec<Tile> {
    fn from(board: Board) -> Self {
        board.tiles
    }
}

impl Board {
    /// Shuffles the whole pool (Fisher-Yates) and keeps the first 25 texts,
    /// so every 25-subset and every ordering is equally likely.
    pub fn generate<R: Rng + ?Sized>(pool: &CandidatePool, rng: &mut R) -> Result<Self, BingoError> {
        if pool.len() < TILE_COUNT {
            return Err(BingoError::PoolTooSmall { size: pool.len() });
        }
        let mut texts: Vec<&String> = pool.as_slice().iter().collect();
        texts.shuffle(rng);
        let tiles = texts.into_iter().take(TILE_COUNT).map(|t| Tile::new(t.as_str())).collect();
        Ok(Board { tiles })
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    /// Panics when `index >= 25`.
    pub fn set_checked(&mut self, index: usize, checked: bool) {
        self.tiles[index].checked = checked;
    }

    /// Replaces the text of one tile and unmarks it. Panics when `index >= 25`.
    pub fn replace_text(&mut self, index: usize, text: impl Into<String>) {
        self.tiles[index] = Tile::new(text);
    }

    pub fn checked(&self) -> [bool; TILE_COUNT] {
        let mut mask = [false; TILE_COUNT];
        for (slot, tile) in mask.iter_mut().zip(&self.tiles) {
            *slot = tile.checked;
        }
        mask
    }

    pub fn checked_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.checked).count()
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.tiles.iter().any(|t| t.text == text)
    }
}

/// Returns the saved board for `week`, or draws, saves and returns a new one.
///
/// A stored board that cannot be parsed counts as missing. No write happens
/// when the pool is too small.
pub fn load_or_create<S, R>(
    week: WeekKey,
    pool: &CandidatePool,
    store: &mut S,
    rng: &mut R,
) -> Result<Board, BingoError>
where
    S: KeyValueStore + ?Sized,
    R: Rng + ?Sized,
{
    let mut ledger = WeekLedger::new(store, week);
    if let Some(board) = ledger.board()? {
        tracing::debug!(%week, "loaded saved board");
        return Ok(board);
    }
    let board = Board::generate(pool, rng)?;
    ledger.save_board(&board)?;
    tracing::info!(%week, pool = pool.len(), "created new board");
    Ok(board)
}

/// Marks or unmarks one tile and persists the board.
pub fn set_tile_checked<S>(
    board: &mut Board,
    index: usize,
    checked: bool,
    week: WeekKey,
    store: &mut S,
) -> Result<(), StoreError>
where
    S: KeyValueStore + ?Sized,
{
    board.set_checked(index, checked);
    WeekLedger::new(store, week).save_board(board)
}
