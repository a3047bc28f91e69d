use std::{ops::RangeInclusive, time::Duration};

use crate::{
    Error, Result,
    palette::{PaletteChoice, SpeedChoice},
};

/// Every tunable of a [`Session`](crate::Session)
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub width: usize,
    pub height: usize,
    /// Number of fade levels, including the live and fully faded levels
    pub fade_levels: u8,
    /// Board snapshots kept for exact-repeat detection
    pub board_history: usize,
    /// Length of the population window compared against the one before it
    pub pattern_len: usize,
    /// Population counts kept; must exceed `2 * pattern_len`
    pub population_history: usize,
    /// Consecutive exact repeats before reseeding
    pub exact_threshold: u32,
    /// Consecutive population-pattern matches before reseeding
    pub pattern_threshold: u32,
    /// Last generation a run may reach; the one after it always reseeds
    pub max_generations: u64,
    /// Probability of a cell being alive after a reseed
    pub density: f64,
    /// How long a settings notice pauses the simulation
    pub notice_duration: Duration,
    /// Bounds of a randomly chosen tick interval
    pub random_interval: RangeInclusive<Duration>,
    pub palette: PaletteChoice,
    pub speed: SpeedChoice,
    /// Step generations on the rayon thread pool
    pub parallel: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 32,
            fade_levels: 8,
            board_history: 8,
            pattern_len: 10,
            population_history: 32,
            exact_threshold: 1,
            pattern_threshold: 20,
            max_generations: 5000,
            density: 0.35,
            notice_duration: Duration::from_millis(1500),
            random_interval: Duration::from_millis(40)..=Duration::from_millis(400),
            palette: PaletteChoice::Random,
            speed: SpeedChoice::Fixed(1),
            parallel: false,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        let fail = |reason| Err(Error::InvalidConfig(reason));
        if self.width == 0 || self.height == 0 {
            return fail("board dimensions must be non-zero");
        }
        if i32::try_from(self.width).is_err() || i32::try_from(self.height).is_err() {
            return fail("board dimensions must fit in an i32");
        }
        if self.fade_levels < 2 {
            return fail("at least 2 fade levels are required");
        }
        if self.board_history == 0 {
            return fail("board history must hold at least one snapshot");
        }
        if self.pattern_len == 0 {
            return fail("population pattern length must be non-zero");
        }
        if self.population_history <= 2 * self.pattern_len {
            return fail("population history must exceed twice the pattern length");
        }
        if self.exact_threshold == 0 || self.pattern_threshold == 0 {
            return fail("stagnancy thresholds must be non-zero");
        }
        if self.max_generations == 0 {
            return fail("generation cap must be non-zero");
        }
        if !(0.0..=1.0).contains(&self.density) {
            return fail("density must be within 0..=1");
        }
        if self.random_interval.start() > self.random_interval.end() {
            return fail("random interval range is inverted");
        }
        if let PaletteChoice::Fixed(i) = self.palette {
            if i >= crate::palette::PALETTES.len() {
                return fail("palette index out of range");
            }
        }
        if let SpeedChoice::Fixed(i) = self.speed {
            if i >= crate::palette::SPEEDS.len() {
                return fail("speed index out of range");
            }
        }
        Ok(())
    }
}
