use crate::board::Board;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Celebration {
    Bingo,
    Golden,
}

/// Outbound notifications for the rendering, animation and notification
/// layers. The engine never draws anything itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    BoardChanged(Board),
    StatusChanged(String),
    Celebrate(Celebration),
    GoldenCountChanged(u32),
    RerollBalanceChanged(u32),
}

pub trait EventSink {
    fn emit(&mut self, event: EngineEvent);
}

impl EventSink for Vec<EngineEvent> {
    fn emit(&mut self, event: EngineEvent) {
        tracing::trace!(?event, "engine event");
        self.push(event);
    }
}

/// Fixed user-facing status lines.
pub mod messages {
    pub const BINGO: &str = "🎉 BINGO! You won. Wait for the new week 😄";
    pub const GOLDEN: &str = "🏆 GOLDEN BINGO! The whole board is marked!";
    pub const NO_REROLLS: &str = "No rerolls left this week.";
    pub const NO_CANDIDATES: &str = "No unused texts left to reroll into.";
    pub const REROLLED: &str = "Tile rerolled.";
    pub const NEW_BOARD_NEXT_WEEK: &str = "You'll get a new board next week 🙂";
}
