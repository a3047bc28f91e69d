//! Stagnancy detection: noticing when a run has stopped being interesting.
//!
//! Two signals are tracked side by side:
//!
//! - **exact repeat**: the new board equals one of the last few boards, which
//!   proves a cycle (still lifes and short-period oscillators)
//! - **population pattern**: the last `pattern_len` population counts equal
//!   the `pattern_len` counts before them, which catches repeating patterns
//!   that drift across the board and so never repeat exactly
//!
//! Each signal keeps its own streak of consecutive hits and its own threshold.

use tracing::debug;

use crate::{BitBoard, SessionConfig};

/// A fixed-capacity ring of owned board snapshots
#[derive(Debug, Clone)]
pub struct BoardHistory {
    slots: Vec<BitBoard>,
    next: usize,
    filled: usize,
}

impl BoardHistory {
    pub fn new(capacity: usize, width: usize, height: usize) -> Self {
        Self {
            slots: vec![BitBoard::new(width, height); capacity],
            next: 0,
            filled: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.filled
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Whether any stored snapshot equals `board`
    ///
    /// Slots that have not been written since the last reset never match.
    pub fn contains(&self, board: &BitBoard) -> bool {
        self.slots[..self.filled].iter().any(|s| s.equals(board))
    }

    /// Copies `board` over the oldest snapshot
    pub fn push(&mut self, board: &BitBoard) {
        self.slots[self.next].copy_from(board);
        self.next = (self.next + 1) % self.slots.len();
        self.filled = (self.filled + 1).min(self.slots.len());
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.clear_all();
        }
        self.next = 0;
        self.filled = 0;
    }
}

/// A fixed-capacity ring of population counts
#[derive(Debug, Clone)]
pub struct PopulationHistory {
    counts: Vec<usize>,
    next: usize,
    recorded: usize,
}

impl PopulationHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            counts: vec![0; capacity],
            next: 0,
            recorded: 0,
        }
    }

    /// Generations recorded since the last reset (not capped at capacity)
    #[inline]
    pub fn recorded(&self) -> usize {
        self.recorded
    }

    pub fn push(&mut self, population: usize) {
        self.counts[self.next] = population;
        self.next = (self.next + 1) % self.counts.len();
        self.recorded += 1;
    }

    /// The count recorded `age` generations ago, 0 being the newest
    #[inline]
    pub fn get(&self, age: usize) -> usize {
        let len = self.counts.len();
        debug_assert!(age < len);
        self.counts[(self.next + len - 1 - age) % len]
    }

    /// Whether the newest `len` counts equal the `len` counts before them
    ///
    /// Always false until `2 * len` generations have been recorded.
    pub fn repeats(&self, len: usize) -> bool {
        debug_assert!(2 * len < self.counts.len());
        if len == 0 || self.recorded < 2 * len {
            return false;
        }
        (0..len).all(|age| self.get(age) == self.get(age + len))
    }

    pub fn clear(&mut self) {
        self.counts.fill(0);
        self.next = 0;
        self.recorded = 0;
    }
}

/// What the detector concluded about the newest generation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Consecutive generations that matched a stored board
    pub exact_streak: u32,
    /// Consecutive generations whose population window repeated
    pub pattern_streak: u32,
    /// The exact-repeat streak reached its threshold
    pub exact_repeat: bool,
    /// The population-pattern streak reached its threshold
    pub population_pattern: bool,
}

impl Verdict {
    #[inline]
    pub fn is_stagnant(&self) -> bool {
        self.exact_repeat || self.population_pattern
    }
}

#[derive(Debug, Clone)]
pub struct StagnancyDetector {
    boards: BoardHistory,
    populations: PopulationHistory,
    pattern_len: usize,
    exact_threshold: u32,
    pattern_threshold: u32,
    exact_streak: u32,
    pattern_streak: u32,
}

impl StagnancyDetector {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            boards: BoardHistory::new(config.board_history, config.width, config.height),
            populations: PopulationHistory::new(config.population_history),
            pattern_len: config.pattern_len,
            exact_threshold: config.exact_threshold,
            pattern_threshold: config.pattern_threshold,
            exact_streak: 0,
            pattern_streak: 0,
        }
    }

    /// Compares `board` against the stored snapshots, then stores it
    ///
    /// The ring advances whether or not there was a match.
    pub fn check_exact_repeat(&mut self, board: &BitBoard) -> bool {
        let seen = self.boards.contains(board);
        self.boards.push(board);
        seen
    }

    /// Records `population`, then reports whether the newest window repeats
    /// the one before it
    pub fn check_population_pattern(&mut self, population: usize) -> bool {
        self.populations.push(population);
        self.populations.repeats(self.pattern_len)
    }

    /// Runs both checks on a freshly computed generation
    pub fn observe(&mut self, board: &BitBoard) -> Verdict {
        let population = board.population();

        self.exact_streak = match self.check_exact_repeat(board) {
            true => self.exact_streak + 1,
            false => 0,
        };
        self.pattern_streak = match self.check_population_pattern(population) {
            true => self.pattern_streak + 1,
            false => 0,
        };

        let verdict = Verdict {
            exact_streak: self.exact_streak,
            pattern_streak: self.pattern_streak,
            exact_repeat: self.exact_streak >= self.exact_threshold,
            population_pattern: self.pattern_streak >= self.pattern_threshold,
        };
        if verdict.exact_repeat {
            debug!(population, streak = self.exact_streak, "board repeated exactly");
        }
        if verdict.population_pattern {
            debug!(population, streak = self.pattern_streak, "population pattern repeated");
        }
        verdict
    }

    /// Forgets every stored board, population and streak
    pub fn reset(&mut self) {
        self.boards.clear();
        self.populations.clear();
        self.exact_streak = 0;
        self.pattern_streak = 0;
    }

    #[inline]
    pub fn boards(&self) -> &BoardHistory {
        &self.boards
    }
    #[inline]
    pub fn populations(&self) -> &PopulationHistory {
        &self.populations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Pos2, engine};

    fn config(w: usize, h: usize) -> SessionConfig {
        SessionConfig {
            width: w,
            height: h,
            board_history: 4,
            pattern_len: 3,
            population_history: 8,
            exact_threshold: 1,
            pattern_threshold: 4,
            ..Default::default()
        }
    }

    #[test]
    fn board_history_overwrites_oldest() {
        let boards: Vec<_> = (0..4)
            .map(|i| BitBoard::from_alive(4, 4, [Pos2::new(i, 0)]))
            .collect();
        let mut history = BoardHistory::new(3, 4, 4);

        for board in &boards[..3] {
            history.push(board);
        }
        assert!(history.contains(&boards[0]));

        history.push(&boards[3]);
        assert_eq!(history.len(), 3);
        assert!(!history.contains(&boards[0]));
        assert!(boards[1..].iter().all(|b| history.contains(b)));
    }

    #[test]
    fn unwritten_slots_never_match() {
        let history = BoardHistory::new(3, 4, 4);

        assert!(!history.contains(&BitBoard::new(4, 4)));
    }

    #[test]
    fn population_get_is_newest_first() {
        let mut history = PopulationHistory::new(5);
        for pop in [1, 2, 3, 4, 5, 6, 7] {
            history.push(pop);
        }

        assert_eq!(history.get(0), 7);
        assert_eq!(history.get(1), 6);
        assert_eq!(history.get(4), 3);
        assert_eq!(history.recorded(), 7);
    }

    #[test]
    fn still_life_flags_on_first_repeat() {
        let block = BitBoard::from_alive(
            6,
            6,
            [Pos2::new(1, 1), Pos2::new(2, 1), Pos2::new(1, 2), Pos2::new(2, 2)],
        );
        let mut detector = StagnancyDetector::new(&config(6, 6));

        assert!(!detector.observe(&block).exact_repeat);
        assert!(detector.observe(&block).exact_repeat);
    }

    #[test]
    fn blinker_flags_within_history_size() {
        let cfg = config(5, 5);
        let mut detector = StagnancyDetector::new(&cfg);
        let mut board = BitBoard::from_alive(
            5,
            5,
            [Pos2::new(1, 2), Pos2::new(2, 2), Pos2::new(3, 2)],
        );

        let mut flagged_at = None;
        for generation in 1..=cfg.board_history {
            board = engine::next_generation(&board);
            if detector.observe(&board).exact_repeat {
                flagged_at = Some(generation);
                break;
            }
        }
        // gen 1 vertical, gen 2 horizontal, gen 3 vertical again
        assert_eq!(flagged_at, Some(3));
    }

    #[test]
    fn population_pattern_needs_two_windows() {
        let mut detector = StagnancyDetector::new(&config(4, 4));
        let sequence = [5, 7, 9, 5, 7, 9];

        let results: Vec<_> = sequence
            .iter()
            .map(|&pop| detector.check_population_pattern(pop))
            .collect();
        assert_eq!(results, vec![false, false, false, false, false, true]);
    }

    #[test]
    fn population_pattern_breaks_on_mismatch() {
        let mut detector = StagnancyDetector::new(&config(4, 4));
        for pop in [5, 7, 9, 5, 7] {
            detector.check_population_pattern(pop);
        }

        assert!(!detector.check_population_pattern(10));
    }

    #[test]
    fn single_pattern_match_does_not_flag() {
        let cfg = config(8, 8);
        let mut detector = StagnancyDetector::new(&cfg);
        let mut populations = PopulationHistory::new(cfg.population_history);
        // distinct boards so the exact signal stays quiet
        let boards: Vec<_> = (0..8)
            .map(|i| BitBoard::from_alive(8, 8, [Pos2::new(i, i)]))
            .collect();

        let mut streaks = Vec::new();
        for (i, board) in boards.iter().enumerate().take(6) {
            let verdict = detector.observe(board);
            populations.push(board.population());
            streaks.push(verdict.pattern_streak);
            assert!(!verdict.exact_repeat, "board {i}");
            assert!(!verdict.population_pattern, "board {i}");
        }
        // every board has population 1, so windows repeat from the 6th on
        assert_eq!(streaks, vec![0, 0, 0, 0, 0, 1]);
        assert!(populations.repeats(cfg.pattern_len));
    }

    #[test]
    fn population_pattern_flags_at_threshold() {
        let cfg = config(16, 16);
        let mut detector = StagnancyDetector::new(&cfg);
        // a glider never repeats exactly within 4 snapshots on a 16x16 torus,
        // but always has 5 cells
        let mut board = BitBoard::from_alive(
            16,
            16,
            [Pos2::new(1, 0), Pos2::new(2, 1), Pos2::new(0, 2), Pos2::new(1, 2), Pos2::new(2, 2)],
        );

        let mut flagged_at = None;
        for generation in 1..=20 {
            board = engine::next_generation(&board);
            let verdict = detector.observe(&board);
            assert!(!verdict.exact_repeat);
            if verdict.population_pattern {
                flagged_at = Some(generation);
                break;
            }
        }
        // windows first repeat at generation 6; the 4th consecutive match is 9
        assert_eq!(flagged_at, Some(9));
    }

    #[test]
    fn reset_clears_everything() {
        let mut detector = StagnancyDetector::new(&config(4, 4));
        let board = BitBoard::from_alive(4, 4, [Pos2::new(0, 0)]);
        detector.observe(&board);
        detector.observe(&board);

        detector.reset();
        assert!(detector.boards().is_empty());
        assert_eq!(detector.populations().recorded(), 0);
        assert_eq!(detector.observe(&board), Verdict::default());
    }
}
