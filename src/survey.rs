//! Offline survey of how long random boards stay interesting.
//!
//! For every board size and seed density, many random boards are run until
//! they settle into a still life or period-2 oscillator (or hit a cap), and
//! the distribution of generations-until-stable is summarised. This is what
//! picks a good default seed density.

use std::io::{self, Write};

use rand::{SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use tracing::info;

use crate::{BitBoard, detect::BoardHistory, engine};

#[derive(Debug, Clone, PartialEq)]
pub struct Survey {
    /// Side lengths of the square boards to try
    pub sizes: Vec<usize>,
    /// Densities to try, in whole percent
    pub densities: Vec<u32>,
    pub samples: usize,
    pub max_generations: usize,
    pub seed: u64,
}

impl Default for Survey {
    fn default() -> Self {
        Self {
            sizes: vec![8, 16, 32, 64, 128, 256],
            densities: (20..=50).collect(),
            samples: 1000,
            max_generations: 10_000,
            seed: 0,
        }
    }
}

/// Statistics for one (size, density) configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyRow {
    pub size: usize,
    pub density_pct: u32,
    pub p10: usize,
    pub median: usize,
    pub mean: f64,
    /// Samples that hit the generation cap and were left out
    pub outliers: usize,
    pub samples: usize,
}

impl Survey {
    pub fn run(&self) -> Vec<SurveyRow> {
        let mut rows = Vec::with_capacity(self.sizes.len() * self.densities.len());
        for &size in &self.sizes {
            for &density_pct in &self.densities {
                let row = self.run_config(size, density_pct);
                info!(
                    size,
                    density_pct,
                    p10 = row.p10,
                    median = row.median,
                    outliers = row.outliers,
                    "surveyed"
                );
                rows.push(row);
            }
        }
        rows
    }

    fn run_config(&self, size: usize, density_pct: u32) -> SurveyRow {
        let density = density_pct as f64 / 100.0;
        let seed = self.seed ^ ((size as u64) << 32) ^ ((density_pct as u64) << 16);

        let generations: Vec<usize> = (0..self.samples)
            .into_par_iter()
            .map(|sample| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(sample as u64 * 100_000));
                let mut board = BitBoard::new(size, size);
                board.randomize(&mut rng, density);
                run_until_stable(board, self.max_generations)
            })
            .collect();

        summarize(size, density_pct, generations, self.max_generations)
    }
}

/// Evolves `board` until it matches one of its previous two states
///
/// Returns the generation at which that happened, or `max_generations` if it
/// never did.
pub fn run_until_stable(mut board: BitBoard, max_generations: usize) -> usize {
    let mut next = BitBoard::new(board.width(), board.height());
    let mut history = BoardHistory::new(2, board.width(), board.height());
    history.push(&board);

    for generation in 1..=max_generations {
        engine::step(&board, &mut next);
        std::mem::swap(&mut board, &mut next);
        if history.contains(&board) {
            return generation;
        }
        history.push(&board);
    }
    max_generations
}

fn percentile(sorted: &[usize], p: usize) -> usize {
    let index = (p * sorted.len() / 100).min(sorted.len() - 1);
    sorted[index]
}

fn summarize(
    size: usize,
    density_pct: u32,
    generations: Vec<usize>,
    max_generations: usize,
) -> SurveyRow {
    let samples = generations.len();
    let mut stable: Vec<usize> = generations
        .into_iter()
        .filter(|&g| g < max_generations)
        .collect();
    let outliers = samples - stable.len();

    if stable.is_empty() {
        return SurveyRow {
            size,
            density_pct,
            p10: max_generations,
            median: max_generations,
            mean: max_generations as f64,
            outliers,
            samples,
        };
    }

    stable.sort_unstable();
    SurveyRow {
        size,
        density_pct,
        p10: percentile(&stable, 10),
        median: percentile(&stable, 50),
        mean: stable.iter().sum::<usize>() as f64 / stable.len() as f64,
        outliers,
        samples,
    }
}

/// Writes survey rows as CSV
pub fn write_csv<W: Write>(rows: &[SurveyRow], mut out: W) -> io::Result<()> {
    out.write_all(b"Board Size,Density,P10,Median,Mean,Outliers Removed,Samples\n")?;
    for row in rows {
        writeln!(
            out,
            "{},{}%,{},{},{:.1},{},{}",
            row.size, row.density_pct, row.p10, row.median, row.mean, row.outliers, row.samples
        )?;
    }
    out.flush()
}
