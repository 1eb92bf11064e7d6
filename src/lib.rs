//! Weekly bingo: one 5x5 board of random texts per ISO week, marked by
//! tapping, with line and full-board (golden) wins and a small reroll economy.
//! All state lives in a local key-value store.

pub mod board;
pub mod config;
pub mod economy;
pub mod events;
pub mod ledger;
pub mod pool;
pub mod renderer;
pub mod session;
pub mod store;
pub mod week;
pub mod win;

pub use board::{BOARD_SIZE, BingoError, Board, TILE_COUNT, Tile};
pub use economy::RerollError;
pub use events::{Celebration, EngineEvent};
pub use pool::CandidatePool;
pub use session::{BingoSession, InteractionState, TapOutcome};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use week::{WeekKey, current_week_key, next_monday_at};
