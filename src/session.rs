//! The weekly board engine as one object: open the week's board, apply
//! taps and rerolls, re-run win detection after every change, and buffer the
//! resulting events for whatever is drawing the board.

use crate::board::{self, BingoError, Board, TILE_COUNT};
use crate::economy::{self, RerollError, Rerolled};
use crate::events::{EngineEvent, EventSink, messages};
use crate::ledger::WeekLedger;
use crate::pool::CandidatePool;
use crate::store::{KeyValueStore, StoreError};
use crate::week::{WeekKey, current_week_key};
use crate::win;
use chrono::{DateTime, TimeZone};
use rand::Rng;
use rand::rngs::ThreadRng;

/// Interaction state owned by the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionState {
    /// The next tap rerolls the tapped tile instead of marking it.
    pub reroll_mode: bool,
}

impl InteractionState {
    pub fn toggle_reroll_mode(&mut self) {
        self.reroll_mode = !self.reroll_mode;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    Toggled { index: usize, checked: bool },
    Rerolled(Rerolled),
    /// Reroll mode was on but the reroll was refused; nothing changed.
    RerollRefused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WinState {
    pub line: bool,
    pub golden: bool,
}

pub struct BingoSession<S: KeyValueStore, R: Rng = ThreadRng> {
    week: WeekKey,
    board: Board,
    pool: CandidatePool,
    store: S,
    rng: R,
    status: String,
    events: Vec<EngineEvent>,
}

impl<S: KeyValueStore> BingoSession<S, ThreadRng> {
    /// Opens the board for the week `now` falls in.
    pub fn open<Tz: TimeZone>(now: &DateTime<Tz>, pool: CandidatePool, store: S) -> Result<Self, BingoError> {
        Self::open_week(current_week_key(now), pool, store, rand::rng())
    }
}

impl<S: KeyValueStore, R: Rng> BingoSession<S, R> {
    /// Loads or creates the board, announces it, and evaluates it once so a
    /// reloaded board shows its status. Rewards already granted stay granted.
    pub fn open_week(week: WeekKey, pool: CandidatePool, mut store: S, mut rng: R) -> Result<Self, BingoError> {
        let board = board::load_or_create(week, &pool, &mut store, &mut rng)?;
        let mut session = BingoSession {
            week,
            board,
            pool,
            store,
            rng,
            status: String::new(),
            events: Vec::new(),
        };
        let (rerolls, golden_count) = {
            let ledger = WeekLedger::new(&mut session.store, week);
            (ledger.rerolls()?, ledger.golden_count()?)
        };
        session.events.emit(EngineEvent::BoardChanged(session.board.clone()));
        session.events.emit(EngineEvent::RerollBalanceChanged(rerolls));
        session.events.emit(EngineEvent::GoldenCountChanged(golden_count));
        session.evaluate()?;
        Ok(session)
    }

    pub fn week(&self) -> WeekKey {
        self.week
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn pool(&self) -> &CandidatePool {
        &self.pool
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn rerolls(&mut self) -> Result<u32, StoreError> {
        WeekLedger::new(&mut self.store, self.week).rerolls()
    }

    pub fn golden_count(&mut self) -> Result<u32, StoreError> {
        WeekLedger::new(&mut self.store, self.week).golden_count()
    }

    /// Events produced since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// A tile tap. In reroll mode it spends the mode on one reroll attempt;
    /// otherwise it flips the tile's mark.
    pub fn tap(&mut self, interaction: &mut InteractionState, index: usize) -> Result<TapOutcome, BingoError> {
        if index >= TILE_COUNT {
            return Err(BingoError::InvalidTile(index));
        }
        if !interaction.reroll_mode {
            let checked = !self.board.tiles()[index].checked;
            self.set_tile_checked(index, checked)?;
            return Ok(TapOutcome::Toggled { index, checked });
        }
        interaction.reroll_mode = false;
        match self.reroll(index) {
            Ok(done) => Ok(TapOutcome::Rerolled(done)),
            Err(RerollError::NoRerollsLeft | RerollError::NoCandidatesLeft) => Ok(TapOutcome::RerollRefused),
            Err(RerollError::InvalidTile(i)) => Err(BingoError::InvalidTile(i)),
            Err(RerollError::Store(e)) => Err(e.into()),
        }
    }

    pub fn set_tile_checked(&mut self, index: usize, checked: bool) -> Result<(), BingoError> {
        if index >= TILE_COUNT {
            return Err(BingoError::InvalidTile(index));
        }
        board::set_tile_checked(&mut self.board, index, checked, self.week, &mut self.store)?;
        self.events.emit(EngineEvent::BoardChanged(self.board.clone()));
        self.evaluate()?;
        Ok(())
    }

    /// One reroll of tile `index`. Refusals are reported both as the error
    /// and as a status message.
    pub fn reroll(&mut self, index: usize) -> Result<Rerolled, RerollError> {
        let result = economy::request_reroll(
            &mut self.board,
            index,
            self.week,
            &self.pool,
            &mut self.store,
            &mut self.rng,
        );
        match result {
            Ok(done) => {
                self.events.emit(EngineEvent::BoardChanged(self.board.clone()));
                self.events.emit(EngineEvent::RerollBalanceChanged(done.balance));
                self.set_status(messages::REROLLED);
                self.evaluate()?;
                Ok(done)
            }
            Err(e) => {
                match e {
                    RerollError::NoRerollsLeft => self.set_status(messages::NO_REROLLS),
                    RerollError::NoCandidatesLeft => self.set_status(messages::NO_CANDIDATES),
                    _ => {}
                }
                Err(e)
            }
        }
    }

    /// Boards never regenerate mid-week; asking for one only says so.
    pub fn request_new_board(&mut self) {
        self.set_status(messages::NEW_BOARD_NEXT_WEEK);
    }

    /// Recomputes both win conditions from the current marks and fires the
    /// first-time handlers. The status line follows what is currently on the
    /// board, the stored flags stay set once set.
    pub fn evaluate(&mut self) -> Result<WinState, StoreError> {
        let checked = self.board.checked();
        let state = WinState {
            line: win::has_line_bingo(&checked),
            golden: win::has_golden_bingo(&checked),
        };
        if state.line {
            economy::on_win_detected(self.week, &mut self.store, &mut self.events)?;
        }
        if state.golden {
            economy::on_golden_detected(self.week, &mut self.store, &mut self.events)?;
        }

        if state.golden {
            self.set_status(messages::GOLDEN);
        } else if state.line {
            self.set_status(messages::BINGO);
        } else if self.status == messages::BINGO || self.status == messages::GOLDEN {
            self.set_status("");
        }
        Ok(state)
    }

    fn set_status(&mut self, message: &str) {
        if self.status != message {
            self.status = message.to_string();
            self.events.emit(EngineEvent::StatusChanged(self.status.clone()));
        }
    }
}
