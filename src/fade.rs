use crate::{
    BitBoard,
    palette::{Color, Palette},
};

/// Per-cell afterglow levels
///
/// One byte per cell, `0..levels`. A live cell always sits at `levels - 1`;
/// a dead cell loses one level per generation until it reaches 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FadeBuffer {
    width: usize,
    levels: u8,
    cells: Vec<u8>,
}

impl FadeBuffer {
    pub fn new(width: usize, height: usize, levels: u8) -> Self {
        debug_assert!(levels >= 2, "need at least an alive and a dead level");
        Self {
            width,
            levels,
            cells: vec![0; width * height],
        }
    }

    #[inline]
    fn max_level(&self) -> u8 {
        self.levels - 1
    }

    /// Fade level of the cell at `(x, y)`, which must be on the board
    #[inline]
    pub fn level(&self, x: usize, y: usize) -> u8 {
        self.cells[y * self.width + x]
    }

    /// Folds one generation of `board` into the trail
    pub fn advance(&mut self, board: &BitBoard) {
        let max = self.max_level();
        for (level, alive) in self.cells.iter_mut().zip(cells(board)) {
            *level = if alive { max } else { level.saturating_sub(1) };
        }
    }

    /// Drops any trail so the buffer mirrors `board` exactly
    pub fn reset(&mut self, board: &BitBoard) {
        let max = self.max_level();
        for (level, alive) in self.cells.iter_mut().zip(cells(board)) {
            *level = if alive { max } else { 0 };
        }
    }

    /// Colour of the cell at `(x, y)` under `palette`
    #[inline]
    pub fn color_at(&self, x: usize, y: usize, palette: &Palette) -> Color {
        color_for(self.level(x, y), self.levels, palette)
    }
}

/// Maps a fade level directly onto `palette`: 0 is background, `levels - 1`
/// is a live cell
#[inline]
pub fn color_for(level: u8, levels: u8, palette: &Palette) -> Color {
    palette.color_for(level, levels)
}

fn cells(board: &BitBoard) -> impl Iterator<Item = bool> + '_ {
    let width = board.width();
    (0..board.len()).map(move |idx| board.get((idx % width) as i32, (idx / width) as i32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Pos2, palette::PALETTES};

    const LEVELS: u8 = 8;

    #[test]
    fn live_cells_are_always_max() {
        let board = BitBoard::from_alive(4, 4, [Pos2::new(1, 2)]);
        let mut fade = FadeBuffer::new(4, 4, LEVELS);

        fade.advance(&board);
        assert_eq!(fade.level(1, 2), LEVELS - 1);
        fade.advance(&board);
        assert_eq!(fade.level(1, 2), LEVELS - 1);
        assert_eq!(fade.level(0, 0), 0);
    }

    #[test]
    fn dead_cell_decays_one_level_per_generation() {
        let alive = BitBoard::from_alive(3, 3, [Pos2::new(1, 1)]);
        let dead = BitBoard::new(3, 3);
        let mut fade = FadeBuffer::new(3, 3, LEVELS);
        fade.reset(&alive);

        for expected in (0..LEVELS - 1).rev() {
            fade.advance(&dead);
            assert_eq!(fade.level(1, 1), expected);
        }
        // floor at zero
        fade.advance(&dead);
        assert_eq!(fade.level(1, 1), 0);
    }

    #[test]
    fn rebirth_jumps_back_to_max() {
        let alive = BitBoard::from_alive(3, 3, [Pos2::new(0, 0)]);
        let dead = BitBoard::new(3, 3);
        let mut fade = FadeBuffer::new(3, 3, LEVELS);
        fade.reset(&alive);

        fade.advance(&dead);
        fade.advance(&dead);
        fade.advance(&dead);
        assert_eq!(fade.level(0, 0), LEVELS - 4);

        fade.advance(&alive);
        assert_eq!(fade.level(0, 0), LEVELS - 1);
    }

    #[test]
    fn reset_mirrors_board() {
        let board = BitBoard::from_alive(5, 2, [Pos2::new(4, 1), Pos2::new(0, 0)]);
        let mut fade = FadeBuffer::new(5, 2, LEVELS);
        fade.advance(&BitBoard::from_alive(5, 2, [Pos2::new(2, 0)]));

        fade.reset(&board);
        for y in 0..2 {
            for x in 0..5 {
                let expected = if board.get(x as i32, y as i32) { LEVELS - 1 } else { 0 };
                assert_eq!(fade.level(x, y), expected);
            }
        }
    }

    #[test]
    fn colors_follow_levels() {
        let ember = &PALETTES[0];
        let board = BitBoard::from_alive(2, 1, [Pos2::new(0, 0)]);
        let mut fade = FadeBuffer::new(2, 1, LEVELS);
        fade.reset(&board);

        assert_eq!(fade.color_at(0, 0, ember), Color(0xFF0000));
        assert_eq!(fade.color_at(1, 0, ember), Color::BLACK);
        assert_eq!(color_for(LEVELS - 2, LEVELS, ember), Color(0x000F00));
    }
}
