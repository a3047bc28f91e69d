use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use lifeglow::{
    SessionConfig,
    palette::{PaletteChoice, SpeedChoice},
    survey::Survey,
};

pub struct Args {
    matches: getopts::Matches,
}

impl Args {
    fn new<T: AsRef<str>>(args: &[T]) -> Result<Option<Self>> {
        let mut opts = getopts::Options::new();
        opts.optflag("", "help", "print this help menu");
        opts.optflag("c", "console", "run in console mode");
        opts.optflag("t", "threads", "step generations on all cores");
        opts.optopt("o", "output", "write the final board as RLE", "FILE");
        opts.optopt("i", "input", "seed the first run from an RLE file", "FILE");
        opts.optopt("w", "width", "set grid width", "WIDTH");
        opts.optopt("h", "height", "set grid height", "HEIGHT");
        opts.optopt("d", "density", "live cell probability on reseed", "0..1");
        opts.optopt("p", "palette", "palette name or `random`", "NAME");
        opts.optopt("s", "speed", "speed table index or `random`", "INDEX");
        opts.optopt("g", "max-gens", "generations before a forced reseed", "COUNT");
        opts.optopt("", "frames", "generations to run headless", "COUNT");
        opts.optopt("", "seed", "random seed", "SEED");
        opts.optopt("", "survey", "run the stability survey, write csv", "FILE");
        opts.optopt("", "samples", "survey samples per configuration", "COUNT");

        let matches = opts
            .parse(args.iter().map(T::as_ref))
            .context("invalid arguments")?;
        if matches.opt_present("help") {
            println!("{}", opts.usage("usage: lifeglow [options]"));
            Ok(None)
        } else {
            Ok(Some(Self { matches }))
        }
    }
    pub fn from_env() -> Result<Option<Self>> {
        let env = std::env::args().collect::<Vec<_>>();
        Self::new(&env[1..])
    }

    fn get<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.matches
            .opt_get(name)
            .with_context(|| format!("invalid value for --{name}"))
    }

    pub fn console(&self) -> bool {
        self.matches.opt_present("console")
    }
    pub fn frames(&self) -> Result<u64> {
        Ok(self.get("frames")?.unwrap_or(1000))
    }
    pub fn seed(&self) -> Result<Option<u64>> {
        self.get("seed")
    }

    pub fn grid_size(&self) -> Result<(usize, usize)> {
        let default = if self.console() {
            let (cols, rows) = crossterm::terminal::size().context("query terminal size")?;
            // two columns per cell, one row for the footer
            ((cols as usize / 2).max(1), (rows as usize).saturating_sub(1).max(1))
        } else {
            (64, 32)
        };

        Ok((
            self.get("width")?.unwrap_or(default.0),
            self.get("height")?.unwrap_or(default.1),
        ))
    }

    pub fn session_config(&self) -> Result<SessionConfig> {
        let (width, height) = self.grid_size()?;
        let mut config = SessionConfig {
            width,
            height,
            parallel: self.matches.opt_present("threads"),
            ..Default::default()
        };
        if let Some(density) = self.get("density")? {
            config.density = density;
        }
        if let Some(max) = self.get("max-gens")? {
            config.max_generations = max;
        }
        if let Some(name) = self.matches.opt_str("palette") {
            config.palette =
                PaletteChoice::parse(&name).ok_or_else(|| anyhow!("unknown palette {name:?}"))?;
        }
        if let Some(speed) = self.matches.opt_str("speed") {
            config.speed =
                SpeedChoice::parse(&speed).ok_or_else(|| anyhow!("unknown speed {speed:?}"))?;
        }
        Ok(config)
    }

    pub fn survey(&self) -> Result<Option<(Survey, String)>> {
        let Some(file) = self.matches.opt_str("survey") else {
            return Ok(None);
        };
        let mut survey = Survey::default();
        if let Some(samples) = self.get("samples")? {
            survey.samples = samples;
        }
        if let Some(seed) = self.seed()? {
            survey.seed = seed;
        }
        Ok(Some((survey, file)))
    }

    pub fn output_file(&self) -> Option<String> {
        self.matches.opt_str("output")
    }
    pub fn input_file(&self) -> Option<String> {
        self.matches.opt_str("input")
    }
}
