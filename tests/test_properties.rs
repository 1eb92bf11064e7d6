//! Property-based tests for board generation, win detection and week keys.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use weekly_bingo::board::{self, TILE_COUNT};
use weekly_bingo::economy::{self, RerollError};
use weekly_bingo::ledger::{DEFAULT_REROLLS, WeekLedger};
use weekly_bingo::win::{LINES, has_golden_bingo, has_line_bingo};
use weekly_bingo::{Board, CandidatePool, EngineEvent, MemoryStore, WeekKey, current_week_key, next_monday_at};

fn pool(n: usize) -> CandidatePool {
    CandidatePool::new((0..n).map(|i| format!("Card {i}")))
}

fn week() -> WeekKey {
    "2024-W10".parse().unwrap()
}

/// Strategy: a checked-mask for all 25 tiles.
fn mask_strategy() -> impl Strategy<Value = [bool; TILE_COUNT]> {
    prop::collection::vec(any::<bool>(), TILE_COUNT).prop_map(|v| {
        let mut m = [false; TILE_COUNT];
        m.copy_from_slice(&v);
        m
    })
}

/// Strategy: any date between 1990 and 2100.
fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..40_000).prop_map(|days| NaiveDate::from_ymd_opt(1990, 1, 1).unwrap() + Duration::days(days))
}

proptest! {
    // 1. Fresh boards hold 25 distinct, unmarked texts from the pool
    #[test]
    fn fresh_board_is_distinct_and_unmarked(size in 25usize..80, seed in any::<u64>()) {
        let pool = pool(size);
        let mut store = MemoryStore::new();
        let board = board::load_or_create(week(), &pool, &mut store, &mut StdRng::seed_from_u64(seed)).unwrap();
        let texts: HashSet<&str> = board.tiles().iter().map(|t| t.text.as_str()).collect();
        prop_assert_eq!(texts.len(), TILE_COUNT);
        prop_assert!(board.tiles().iter().all(|t| !t.checked && pool.contains(&t.text)));
    }

    // 2. Pools below 25 never produce a board or a write
    #[test]
    fn small_pool_never_writes(size in 0usize..25, seed in any::<u64>()) {
        let mut store = MemoryStore::new();
        let result = board::load_or_create(week(), &pool(size), &mut store, &mut StdRng::seed_from_u64(seed));
        let is_too_small = matches!(result, Err(weekly_bingo::BingoError::PoolTooSmall { size: s }) if s == size);
        prop_assert!(is_too_small);
        prop_assert_eq!(store.write_count(), 0);
    }

    // 3. Line bingo matches a brute-force check over the 12 lines
    #[test]
    fn line_bingo_matches_line_table(m in mask_strategy()) {
        let expected = LINES.iter().any(|line| line.iter().all(|&i| m[i]));
        prop_assert_eq!(has_line_bingo(&m), expected);
    }

    // 4. Golden bingo means every tile, and implies line bingo
    #[test]
    fn golden_implies_line(m in mask_strategy()) {
        prop_assert_eq!(has_golden_bingo(&m), m.iter().all(|&c| c));
        if has_golden_bingo(&m) {
            prop_assert!(has_line_bingo(&m));
        }
    }

    // 5. A reroll keeps the board distinct and touches only one tile
    #[test]
    fn reroll_keeps_board_distinct(size in 26usize..60, seed in any::<u64>(), index in 0usize..TILE_COUNT) {
        let pool = pool(size);
        let mut store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board: Board = board::load_or_create(week(), &pool, &mut store, &mut rng).unwrap();
        let before = board.clone();

        let done = economy::request_reroll(&mut board, index, week(), &pool, &mut store, &mut rng).unwrap();
        let texts: HashSet<&str> = board.tiles().iter().map(|t| t.text.as_str()).collect();
        prop_assert_eq!(texts.len(), TILE_COUNT);
        prop_assert_ne!(&done.text, &done.previous);
        for i in (0..TILE_COUNT).filter(|&i| i != index) {
            prop_assert_eq!(&board.tiles()[i], &before.tiles()[i]);
        }
        prop_assert_eq!(WeekLedger::new(&mut store, week()).rerolls().unwrap(), DEFAULT_REROLLS - 1);
    }

    // 6. Week keys agree with chrono's ISO week and round-trip through text
    #[test]
    fn week_key_is_iso_week(date in date_strategy(), hour in 0u32..24) {
        let now = Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap());
        let key = current_week_key(&now);
        prop_assert_eq!(key.week(), date.iso_week().week());
        let text = key.to_string();
        prop_assert_eq!(text.len(), 8);
        prop_assert_eq!(text.parse::<WeekKey>().unwrap(), key);
    }

    // 7. Next Monday reminder is a Monday, strictly later, within a week
    #[test]
    fn next_monday_is_future_monday(date in date_strategy(), secs in 0u32..86_400, hour in 0u32..24, minute in 0u32..60) {
        let now = Utc.from_utc_datetime(&date.and_hms_opt(secs / 3600, (secs / 60) % 60, secs % 60).unwrap());
        let next = next_monday_at(&now, hour, minute).unwrap();
        prop_assert_eq!(next.weekday(), Weekday::Mon);
        prop_assert!(next > now);
        prop_assert!(next - now <= Duration::days(7));
    }
}

#[test]
fn end_to_end_first_row_bingo() {
    let pool = pool(30);
    let mut store = MemoryStore::new();
    let mut events: Vec<EngineEvent> = Vec::new();
    let mut board = board::load_or_create(week(), &pool, &mut store, &mut StdRng::seed_from_u64(2024)).unwrap();

    for i in 0..5 {
        board::set_tile_checked(&mut board, i, true, week(), &mut store).unwrap();
        let won = has_line_bingo(&board.checked());
        assert_eq!(won, i == 4, "after marking tile {i}");
        if won {
            economy::on_win_detected(week(), &mut store, &mut events).unwrap();
        }
    }

    let ledger = WeekLedger::new(&mut store, week());
    assert!(ledger.is_won().unwrap());
    assert_eq!(ledger.rerolls().unwrap(), 4);
}

#[test]
fn zero_balance_reroll_leaves_everything() {
    let pool = pool(30);
    let mut store = MemoryStore::new();
    let mut rng = StdRng::seed_from_u64(5);
    let mut board = board::load_or_create(week(), &pool, &mut store, &mut rng).unwrap();
    WeekLedger::new(&mut store, week()).set_rerolls(0).unwrap();
    let before = board.clone();

    let err = economy::request_reroll(&mut board, 0, week(), &pool, &mut store, &mut rng).unwrap_err();
    assert!(matches!(err, RerollError::NoRerollsLeft));
    assert_eq!(board, before);
    assert_eq!(WeekLedger::new(&mut store, week()).rerolls().unwrap(), 0);
}
