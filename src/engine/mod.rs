mod rule;

use crate::{BitBoard, Pos2};
use rayon::prelude::*;

/// Bytes of output handled by one rayon task (2048 cells)
const BAND_BYTES: usize = 256;

/// Computes the generation after `current` into `next`
///
/// `next` is fully overwritten and every cell is computed from `current`
/// alone, so no cell observes another's already-updated state.
///
/// ## Panics
/// If the boards have different dimensions
pub fn step(current: &BitBoard, next: &mut BitBoard) {
    check_dimensions(current, next);
    for (i, byte) in next.bytes_mut().iter_mut().enumerate() {
        *byte = next_byte(current, i);
    }
}

/// Same as [`step`], but with the output split into bands computed on the
/// rayon thread pool
///
/// The result is bit-identical to [`step`].
pub fn step_parallel(current: &BitBoard, next: &mut BitBoard) {
    check_dimensions(current, next);
    next.bytes_mut()
        .par_chunks_mut(BAND_BYTES)
        .enumerate()
        .for_each(|(band, chunk)| {
            let first = band * BAND_BYTES;
            for (i, byte) in chunk.iter_mut().enumerate() {
                *byte = next_byte(current, first + i);
            }
        });
}

/// Returns the generation after `board` in a freshly allocated board
pub fn next_generation(board: &BitBoard) -> BitBoard {
    let mut next = BitBoard::new(board.width(), board.height());
    step(board, &mut next);
    next
}

fn check_dimensions(current: &BitBoard, next: &BitBoard) {
    assert_eq!(
        (current.width(), current.height()),
        (next.width(), next.height()),
        "generation buffers must share dimensions"
    );
}

/// Computes the 8 cells packed into output byte `byte_idx`
///
/// Bits past the last cell are left dead.
#[inline]
fn next_byte(current: &BitBoard, byte_idx: usize) -> u8 {
    let table = rule::rule_table();
    let width = current.width();
    let first = byte_idx * 8;
    let last = (first + 8).min(current.len());

    let mut byte = 0;
    for idx in first..last {
        let center = Pos2::new((idx % width) as i32, (idx / width) as i32);
        if table[rule::neighbourhood(current, center)] {
            byte |= 1 << (idx - first);
        }
    }
    byte
}
