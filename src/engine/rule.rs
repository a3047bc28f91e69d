use std::sync::OnceLock;

use crate::{BitBoard, Pos2};

/// The number of arrangements of a 3x3 neighbourhood
const PERMUTATIONS: usize = 1 << 9;
/// Bit of the center cell in a neighbourhood value
const CENTER: usize = 0b000_010_000;

pub(super) type RuleTable = [bool; PERMUTATIONS];

/// Returns the shared lookup table for the B3/S23 rule
///
/// Equivalent to calling [`build_rule_table`] once and storing the result
pub(super) fn rule_table() -> &'static RuleTable {
    static TABLE: OnceLock<RuleTable> = OnceLock::new();
    TABLE.get_or_init(build_rule_table)
}

/// Creates the lookup table for the B3/S23 rule
///
/// The table is indexed by a 9-bit neighbourhood value (see [`neighbourhood`])
/// and holds whether the center cell is alive in the next generation.
pub(super) fn build_rule_table() -> RuleTable {
    let mut table = [false; PERMUTATIONS];
    for (i, next) in table.iter_mut().enumerate() {
        let neighbors = (i & !CENTER).count_ones();
        let alive = i & CENTER != 0;
        *next = matches!((alive, neighbors), (true, 2) | (_, 3));
    }
    table
}

/// Packs the 3x3 block around `center` into 9 bits, row-major from the top
/// left, so the center cell lands on bit 4
#[inline]
pub(super) fn neighbourhood(board: &BitBoard, center: Pos2) -> usize {
    let mut value = 0;
    let mut bit = 0;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if board.get(center.x + dx, center.y + dy) {
                value |= 1 << bit;
            }
            bit += 1;
        }
    }
    value
}
