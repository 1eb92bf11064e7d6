//! Line and full-board detection. Recomputed from scratch after every
//! change; there is no incremental state to keep in sync.

use crate::board::{BOARD_SIZE, TILE_COUNT};

pub type Line = [usize; BOARD_SIZE];

/// 5 rows, 5 columns, main diagonal, anti-diagonal.
pub const LINES: [Line; 2 * BOARD_SIZE + 2] = build_lines();

const fn build_lines() -> [Line; 2 * BOARD_SIZE + 2] {
    let mut lines = [[0; BOARD_SIZE]; 2 * BOARD_SIZE + 2];
    let mut i = 0;
    while i < BOARD_SIZE {
        let mut j = 0;
        while j < BOARD_SIZE {
            lines[i][j] = i * BOARD_SIZE + j;
            lines[BOARD_SIZE + i][j] = j * BOARD_SIZE + i;
            j += 1;
        }
        lines[2 * BOARD_SIZE][i] = i * (BOARD_SIZE + 1);
        lines[2 * BOARD_SIZE + 1][i] = (i + 1) * (BOARD_SIZE - 1);
        i += 1;
    }
    lines
}

pub fn is_line_complete(checked: &[bool; TILE_COUNT], line: &Line) -> bool {
    line.iter().all(|&i| checked[i])
}

pub fn has_line_bingo(checked: &[bool; TILE_COUNT]) -> bool {
    LINES.iter().any(|line| is_line_complete(checked, line))
}

/// Golden bingo: every tile marked.
pub fn has_golden_bingo(checked: &[bool; TILE_COUNT]) -> bool {
    checked.iter().all(|&c| c)
}

pub fn completed_lines(checked: &[bool; TILE_COUNT]) -> impl Iterator<Item = &'static Line> + '_ {
    LINES.iter().filter(move |line| is_line_complete(checked, line))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(indices: &[usize]) -> [bool; TILE_COUNT] {
        let mut m = [false; TILE_COUNT];
        for &i in indices {
            m[i] = true;
        }
        m
    }

    #[test]
    fn line_table() {
        assert_eq!(LINES[0], [0, 1, 2, 3, 4]);
        assert_eq!(LINES[4], [20, 21, 22, 23, 24]);
        assert_eq!(LINES[5], [0, 5, 10, 15, 20]);
        assert_eq!(LINES[9], [4, 9, 14, 19, 24]);
        assert_eq!(LINES[10], [0, 6, 12, 18, 24]);
        assert_eq!(LINES[11], [4, 8, 12, 16, 20]);
    }

    #[test]
    fn first_row_is_bingo() {
        assert!(has_line_bingo(&mask(&[0, 1, 2, 3, 4])));
        assert!(!has_golden_bingo(&mask(&[0, 1, 2, 3, 4])));
    }

    #[test]
    fn every_line_alone_is_bingo() {
        for line in &LINES {
            let m = mask(line);
            assert!(has_line_bingo(&m), "{line:?}");
            assert_eq!(completed_lines(&m).count(), 1);
        }
    }

    #[test]
    fn one_per_row_and_column_without_diagonal_is_not_bingo() {
        // Permutation (1, 3, 0, 4, 2): one per row and column, off both diagonals.
        let m = mask(&[1, 8, 10, 19, 22]);
        assert!(!has_line_bingo(&m));
        assert_eq!(completed_lines(&m).count(), 0);
    }

    #[test]
    fn four_of_a_row_is_not_bingo() {
        assert!(!has_line_bingo(&mask(&[5, 6, 7, 8])));
        assert!(!has_line_bingo(&[false; TILE_COUNT]));
    }

    #[test]
    fn golden_needs_all_25() {
        let mut m = [true; TILE_COUNT];
        assert!(has_golden_bingo(&m));
        assert_eq!(completed_lines(&m).count(), LINES.len());
        m[13] = false;
        assert!(!has_golden_bingo(&m));
        assert!(has_line_bingo(&m));
    }
}
