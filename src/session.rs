use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{info, trace, warn};

use crate::{
    BitBoard, Error, Result, SessionConfig,
    detect::{StagnancyDetector, Verdict},
    enc::BoardCodec,
    engine,
    fade::FadeBuffer,
    palette::{PALETTES, Palette, PaletteChoice, SPEEDS, SpeedChoice},
    sink::DisplaySink,
};

/// Why a run was thrown away and a new one started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReseedReason {
    Initial,
    Manual,
    ExactRepeat,
    PopulationPattern,
    GenerationCap,
}

/// Operator input the session understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsEvent {
    NextPalette,
    NextSpeed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    /// A settings notice is on screen and the simulation is paused
    ShowingMessage { until: Instant },
}

/// Summary of one computed generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation {
    /// Generation number reached, before any reseed
    pub generation: u64,
    pub population: usize,
    pub verdict: Verdict,
    pub reseeded: Option<ReseedReason>,
}

/// Outcome of [`Session::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Not enough time has passed since the last generation
    Idle,
    /// A settings notice is still being shown
    ShowingMessage,
    Advanced(Generation),
}

/// A self-reseeding Game of Life run
///
/// The session owns both generation buffers, the fade trail and the
/// stagnancy histories. It is driven by calling [`Session::tick`] at least as
/// often as its tick interval; it never sleeps.
#[derive(Debug)]
pub struct Session<R> {
    config: SessionConfig,
    rng: R,
    current: BitBoard,
    next: BitBoard,
    fade: FadeBuffer,
    detector: StagnancyDetector,
    generation: u64,
    palette_choice: PaletteChoice,
    speed_choice: SpeedChoice,
    palette_index: usize,
    interval: Duration,
    state: SessionState,
    notice: Option<String>,
    last_tick: Option<Instant>,
}

impl<R: Rng> Session<R> {
    /// Allocates all buffers and seeds a random first run
    pub fn new(config: SessionConfig, rng: R) -> Result<Self> {
        let mut session = Self::allocate(config, rng)?;
        session.reseed(ReseedReason::Initial);
        Ok(session)
    }

    /// Allocates all buffers and starts the first run from `board`
    ///
    /// Later runs are seeded randomly as usual.
    pub fn with_board(config: SessionConfig, rng: R, board: &BitBoard) -> Result<Self> {
        if (board.width(), board.height()) != (config.width, config.height) {
            return Err(Error::BoardSize {
                got_w: board.width(),
                got_h: board.height(),
                want_w: config.width,
                want_h: config.height,
            });
        }

        if board.is_extinct() {
            warn!("seed board has no live cells");
        }

        let mut session = Self::allocate(config, rng)?;
        session.resolve_settings();
        session.current.copy_from(board);
        session.start_run();
        info!(
            population = session.current.population(),
            palette = session.palette().name,
            interval_ms = session.interval.as_millis() as u64,
            "seeded from board"
        );
        Ok(session)
    }

    /// Decodes `pattern` onto an empty board and starts the first run from it
    pub fn from_pattern<C: BoardCodec>(
        config: SessionConfig,
        rng: R,
        codec: &C,
        pattern: &str,
    ) -> Result<Self> {
        let board = codec.decode(pattern, config.width, config.height)?;
        Self::with_board(config, rng, &board)
    }

    fn allocate(config: SessionConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let (w, h) = (config.width, config.height);
        Ok(Self {
            current: BitBoard::new(w, h),
            next: BitBoard::new(w, h),
            fade: FadeBuffer::new(w, h, config.fade_levels),
            detector: StagnancyDetector::new(&config),
            generation: 0,
            palette_choice: config.palette,
            speed_choice: config.speed,
            palette_index: 0,
            interval: SPEEDS[0],
            state: SessionState::Running,
            notice: None,
            last_tick: None,
            config,
            rng,
        })
    }

    /// Advances simulation time to `now`
    ///
    /// Computes and renders one generation if at least the tick interval has
    /// passed since the last one (the first call always advances). Does
    /// nothing while a settings notice is showing.
    pub fn tick<S: DisplaySink>(&mut self, now: Instant, sink: &mut S) -> Result<Tick, S::Error> {
        if let SessionState::ShowingMessage { until } = self.state {
            if now < until {
                return Ok(Tick::ShowingMessage);
            }
            self.state = SessionState::Running;
            self.notice = None;
        }

        if let Some(last) = self.last_tick {
            if now.saturating_duration_since(last) < self.interval {
                return Ok(Tick::Idle);
            }
        }
        self.last_tick = Some(now);

        let generation = self.advance();
        self.render(sink)?;
        Ok(Tick::Advanced(generation))
    }

    /// Computes the next generation and reseeds if the run has gone stale
    pub fn advance(&mut self) -> Generation {
        if self.config.parallel {
            engine::step_parallel(&self.current, &mut self.next);
        } else {
            engine::step(&self.current, &mut self.next);
        }
        std::mem::swap(&mut self.current, &mut self.next);

        self.fade.advance(&self.current);
        let verdict = self.detector.observe(&self.current);
        self.generation += 1;

        let population = self.current.population();
        trace!(generation = self.generation, population, "generation");

        let reason = if verdict.exact_repeat {
            Some(ReseedReason::ExactRepeat)
        } else if verdict.population_pattern {
            Some(ReseedReason::PopulationPattern)
        } else if self.generation > self.config.max_generations {
            Some(ReseedReason::GenerationCap)
        } else {
            None
        };

        let generation = self.generation;
        if let Some(reason) = reason {
            self.reseed(reason);
        }
        Generation {
            generation,
            population,
            verdict,
            reseeded: reason,
        }
    }

    /// Writes every cell's faded colour to `sink`, then presents the frame
    pub fn render<S: DisplaySink>(&self, sink: &mut S) -> Result<(), S::Error> {
        let palette = self.palette();
        for y in 0..self.config.height {
            for x in 0..self.config.width {
                sink.set_pixel(x, y, self.fade.color_at(x, y, palette));
            }
        }
        sink.present()
    }

    /// Throws the current run away and starts a fresh random one
    ///
    /// Random palette and speed selections are re-rolled.
    pub fn reseed(&mut self, reason: ReseedReason) {
        let reached = self.generation;
        self.resolve_settings();
        self.current.randomize(&mut self.rng, self.config.density);
        self.start_run();
        info!(
            ?reason,
            generation = reached,
            population = self.current.population(),
            palette = self.palette().name,
            interval_ms = self.interval.as_millis() as u64,
            "reseeded"
        );
    }

    /// Applies an operator settings change and shows a notice about it
    ///
    /// Returns the notice text.
    pub fn handle(&mut self, event: SettingsEvent, now: Instant) -> &str {
        let text = match event {
            SettingsEvent::NextPalette => {
                let choice = self.palette_choice.next();
                self.palette_choice = choice;
                self.palette_index = self.pick_palette();
                match choice {
                    PaletteChoice::Random => format!("palette: {choice} ({})", self.palette().name),
                    PaletteChoice::Fixed(_) => format!("palette: {choice}"),
                }
            }
            SettingsEvent::NextSpeed => {
                let choice = self.speed_choice.next();
                self.speed_choice = choice;
                self.interval = self.pick_interval();
                match choice {
                    SpeedChoice::Random => {
                        format!("speed: {choice} ({}ms)", self.interval.as_millis())
                    }
                    SpeedChoice::Fixed(_) => format!("speed: {choice}"),
                }
            }
        };
        info!(?event, notice = %text, "settings changed");

        self.state = SessionState::ShowingMessage {
            until: now + self.config.notice_duration,
        };
        self.notice.insert(text).as_str()
    }

    fn resolve_settings(&mut self) {
        self.palette_index = self.pick_palette();
        self.interval = self.pick_interval();
    }

    fn pick_palette(&mut self) -> usize {
        match self.palette_choice {
            PaletteChoice::Fixed(i) => i,
            PaletteChoice::Random => self.rng.random_range(0..PALETTES.len()),
        }
    }

    fn pick_interval(&mut self) -> Duration {
        match self.speed_choice {
            SpeedChoice::Fixed(i) => SPEEDS[i],
            SpeedChoice::Random => self.rng.random_range(self.config.random_interval.clone()),
        }
    }

    /// Resets every per-run counter and history around the current board
    fn start_run(&mut self) {
        self.fade.reset(&self.current);
        self.detector.reset();
        self.generation = 0;
    }
}

impl<R> Session<R> {
    #[inline]
    pub fn current_palette_index(&self) -> usize {
        self.palette_index
    }
    #[inline]
    pub fn palette(&self) -> &'static Palette {
        &PALETTES[self.palette_index]
    }
    #[inline]
    pub fn current_interval(&self) -> Duration {
        self.interval
    }
    #[inline]
    pub fn generation_count(&self) -> u64 {
        self.generation
    }
    #[inline]
    pub fn population(&self) -> usize {
        self.current.population()
    }
    #[inline]
    pub fn board(&self) -> &BitBoard {
        &self.current
    }
    #[inline]
    pub fn fade(&self) -> &FadeBuffer {
        &self.fade
    }
    #[inline]
    pub fn detector(&self) -> &StagnancyDetector {
        &self.detector
    }
    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }
    /// Text of the settings notice being shown, if any
    #[inline]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
    #[inline]
    pub fn speed_choice(&self) -> SpeedChoice {
        self.speed_choice
    }
    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Pos2,
        enc::RunLengthEncoded,
        palette::Color,
        sink::{FrameBuffer, NullSink},
    };
    use rand::{SeedableRng, rngs::StdRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5EED)
    }

    fn small_config() -> SessionConfig {
        SessionConfig {
            width: 16,
            height: 16,
            palette: PaletteChoice::Fixed(0),
            speed: SpeedChoice::Fixed(1),
            ..Default::default()
        }
    }

    fn glider(w: usize, h: usize) -> BitBoard {
        BitBoard::from_alive(
            w,
            h,
            [Pos2::new(1, 0), Pos2::new(2, 1), Pos2::new(0, 2), Pos2::new(1, 2), Pos2::new(2, 2)],
        )
    }

    fn assert_fresh_run<R>(session: &Session<R>) {
        assert_eq!(session.generation_count(), 0);
        assert!(session.detector().boards().is_empty());
        assert_eq!(session.detector().populations().recorded(), 0);

        let max = session.config().fade_levels - 1;
        let board = session.board();
        for y in 0..board.height() {
            for x in 0..board.width() {
                let expected = if board.get(x as i32, y as i32) { max } else { 0 };
                assert_eq!(session.fade().level(x, y), expected, "({x}, {y})");
            }
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SessionConfig {
            population_history: 4,
            ..small_config()
        };

        assert!(matches!(
            Session::new(config, rng()),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn new_session_starts_fresh() {
        let session = Session::new(small_config(), rng()).unwrap();

        assert_fresh_run(&session);
        assert!(session.population() > 0);
        assert_eq!(session.current_palette_index(), 0);
        assert_eq!(session.current_interval(), SPEEDS[1]);
    }

    #[test]
    fn same_seed_same_run() {
        let mut a = Session::new(small_config(), rng()).unwrap();
        let mut b = Session::new(small_config(), rng()).unwrap();

        for _ in 0..10 {
            assert_eq!(a.advance(), b.advance());
            assert_eq!(a.board(), b.board());
        }
    }

    #[test]
    fn advance_counts_generations() {
        let mut session = Session::with_board(small_config(), rng(), &glider(16, 16)).unwrap();

        let generation = session.advance();
        assert_eq!(generation.generation, 1);
        assert_eq!(generation.population, 5);
        assert_eq!(generation.reseeded, None);
        assert_eq!(session.generation_count(), 1);
    }

    #[test]
    fn still_life_reseeds_on_exact_repeat() {
        let block = BitBoard::from_alive(
            16,
            16,
            [Pos2::new(4, 4), Pos2::new(5, 4), Pos2::new(4, 5), Pos2::new(5, 5)],
        );
        let mut session = Session::with_board(small_config(), rng(), &block).unwrap();

        assert_eq!(session.advance().reseeded, None);
        let second = session.advance();
        assert_eq!(second.reseeded, Some(ReseedReason::ExactRepeat));
        assert_eq!(second.generation, 2);
        assert_fresh_run(&session);
    }

    #[test]
    fn drifting_glider_reseeds_on_population_pattern() {
        let config = SessionConfig {
            board_history: 2,
            pattern_len: 4,
            population_history: 10,
            pattern_threshold: 3,
            ..small_config()
        };
        let mut session = Session::with_board(config, rng(), &glider(16, 16)).unwrap();

        // windows first repeat at generation 8, the 3rd consecutive match is 10
        for _ in 1..10 {
            assert_eq!(session.advance().reseeded, None);
        }
        assert_eq!(session.advance().reseeded, Some(ReseedReason::PopulationPattern));
        assert_fresh_run(&session);
    }

    #[test]
    fn generation_cap_forces_reseed() {
        let config = SessionConfig {
            board_history: 1,
            pattern_threshold: 1000,
            max_generations: 15,
            ..small_config()
        };
        let mut session = Session::with_board(config, rng(), &glider(16, 16)).unwrap();

        // reaching the cap is allowed, only passing it reseeds
        for _ in 1..=15 {
            let generation = session.advance();
            assert!(!generation.verdict.is_stagnant());
            assert_eq!(generation.reseeded, None);
        }
        assert_eq!(session.generation_count(), 15);

        let last = session.advance();
        assert!(!last.verdict.is_stagnant());
        assert_eq!(last.generation, 16);
        assert_eq!(last.reseeded, Some(ReseedReason::GenerationCap));
        assert_fresh_run(&session);
    }

    #[test]
    fn reseed_density_tracks_target() {
        let config = SessionConfig {
            width: 64,
            height: 32,
            density: 0.35,
            ..small_config()
        };
        let mut session = Session::new(config, rng()).unwrap();

        let mut total = 0;
        for _ in 0..50 {
            session.reseed(ReseedReason::Manual);
            assert_fresh_run(&session);
            total += session.population();
        }
        let density = total as f64 / (50.0 * 64.0 * 32.0);
        assert!((density - 0.35).abs() < 0.01, "density {density}");
    }

    #[test]
    fn random_settings_resolve_on_reseed() {
        let config = SessionConfig {
            palette: PaletteChoice::Random,
            speed: SpeedChoice::Random,
            ..small_config()
        };
        let range = config.random_interval.clone();
        let mut session = Session::new(config, rng()).unwrap();

        let mut palettes = std::collections::HashSet::new();
        for _ in 0..100 {
            session.reseed(ReseedReason::Manual);
            palettes.insert(session.current_palette_index());
            assert!(range.contains(&session.current_interval()));
        }
        assert_eq!(palettes.len(), PALETTES.len());
    }

    #[test]
    fn tick_waits_for_interval() {
        let mut session = Session::new(small_config(), rng()).unwrap();
        let mut sink = NullSink::default();
        let interval = session.current_interval();
        let t0 = Instant::now();

        assert!(matches!(session.tick(t0, &mut sink), Ok(Tick::Advanced(_))));
        assert_eq!(session.tick(t0 + interval / 2, &mut sink), Ok(Tick::Idle));
        assert!(matches!(
            session.tick(t0 + interval, &mut sink),
            Ok(Tick::Advanced(_))
        ));
        assert_eq!(sink.frames(), 2);
    }

    #[test]
    fn settings_notice_pauses_simulation() {
        let mut session = Session::new(small_config(), rng()).unwrap();
        let mut sink = NullSink::default();
        let t0 = Instant::now();

        let notice = session.handle(SettingsEvent::NextPalette, t0).to_owned();
        assert_eq!(notice, format!("palette: {}", PALETTES[1].name));
        assert_eq!(session.current_palette_index(), 1);
        assert_eq!(session.notice(), Some(notice.as_str()));

        let generation = session.generation_count();
        assert_eq!(
            session.tick(t0 + Duration::from_millis(1), &mut sink),
            Ok(Tick::ShowingMessage)
        );
        assert_eq!(session.generation_count(), generation);

        let done = t0 + session.config().notice_duration;
        assert!(matches!(session.tick(done, &mut sink), Ok(Tick::Advanced(_))));
        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(session.notice(), None);
    }

    #[test]
    fn speed_cycles_to_random_and_back() {
        let mut session = Session::new(small_config(), rng()).unwrap();
        let t0 = Instant::now();

        for i in 2..SPEEDS.len() {
            let notice = session.handle(SettingsEvent::NextSpeed, t0).to_owned();
            assert_eq!(notice, format!("speed: {}ms", SPEEDS[i].as_millis()));
            assert_eq!(session.current_interval(), SPEEDS[i]);
        }
        assert!(session.handle(SettingsEvent::NextSpeed, t0).starts_with("speed: random"));
        assert_eq!(session.speed_choice(), SpeedChoice::Random);

        session.handle(SettingsEvent::NextSpeed, t0);
        assert_eq!(session.current_interval(), SPEEDS[0]);
    }

    #[test]
    fn render_paints_fade_colors() {
        let board = BitBoard::from_alive(16, 16, [Pos2::new(3, 3)]);
        let mut session = Session::with_board(small_config(), rng(), &board).unwrap();
        let mut frame = FrameBuffer::new(16, 16);

        session.render(&mut frame).unwrap();
        assert_eq!(frame.pixel(3, 3), Color(0xFF0000));
        assert_eq!(frame.pixel(0, 0), Color::BLACK);

        // the lone cell dies and starts to fade
        session.advance();
        session.render(&mut frame).unwrap();
        assert_eq!(frame.pixel(3, 3), Color(0x000F00));
    }

    #[test]
    fn from_pattern_decodes_rle() {
        let session = Session::from_pattern(
            small_config(),
            rng(),
            &RunLengthEncoded::default(),
            "bo$2bo$3o!",
        )
        .unwrap();

        assert_eq!(session.board(), &glider(16, 16));
        assert_fresh_run(&session);
    }

    #[test]
    fn with_board_rejects_wrong_size() {
        let result = Session::with_board(small_config(), rng(), &BitBoard::new(8, 8));

        assert!(matches!(result, Err(Error::BoardSize { .. })));
    }
}
