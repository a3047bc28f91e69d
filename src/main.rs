use std::{
    fs, io, thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use lifeglow::{
    BoardCodec, ReseedReason, RunLengthEncoded, Session, SettingsEvent, Tick,
    sink::NullSink,
    survey::{self, Survey},
};
use rand::{SeedableRng, rngs::StdRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod console;
mod options;
mod stats;

use console::{ConsoleCommand, ConsoleSink};
use stats::RateRecord;

/// How long the console loop naps between polls
const POLL_INTERVAL: Duration = Duration::from_millis(5);

fn init_tracing(console: bool) {
    // the console owns the terminal, so stay quiet there unless asked
    let default = if console { "off" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run_survey(survey: Survey, file_name: &str) -> Result<()> {
    info!(
        sizes = ?survey.sizes,
        samples = survey.samples,
        threads = rayon::current_num_threads(),
        "starting survey"
    );
    let rows = survey.run();
    let file = fs::File::create(file_name).with_context(|| format!("create {file_name}"))?;
    survey::write_csv(&rows, io::BufWriter::new(file))
        .with_context(|| format!("write {file_name}"))?;
    info!(rows = rows.len(), file = file_name, "survey written");
    Ok(())
}

fn run_headless(session: &mut Session<StdRng>, frames: u64) -> Result<()> {
    let mut sink = NullSink::default();
    let mut record = RateRecord::new();
    while record.total() < frames {
        record.record(session.advance());
        session.render(&mut sink)?;

        if record.has_report() {
            let rate = record.roll();
            info!(
                gens_per_sec = rate,
                total = record.total(),
                reseeds = record.reseeds(),
                generation = session.generation_count(),
                population = session.population(),
                "progress"
            );
        }
    }
    info!(frames = sink.frames(), reseeds = record.reseeds(), "headless run done");
    Ok(())
}

fn footer(session: &Session<StdRng>, record: &RateRecord) -> String {
    if let Some(notice) = session.notice() {
        return notice.to_owned();
    }
    format!(
        "{:.02}gen/s gen:{} alive:{} palette:{} interval:{}ms reseeds:{}  [p]alette [s]peed [r]eseed [q]uit",
        record.rate(),
        session.generation_count(),
        session.population(),
        session.palette().name,
        session.current_interval().as_millis(),
        record.reseeds(),
    )
}

fn run_console(session: &mut Session<StdRng>) -> Result<()> {
    let config = session.config();
    let mut console = ConsoleSink::new(config.width, config.height).context("set up terminal")?;
    let mut record = RateRecord::new();
    let mut shown = String::new();

    'run: loop {
        while let Some(cmd) = console.poll_events()? {
            let now = Instant::now();
            match cmd {
                ConsoleCommand::Exit => break 'run,
                ConsoleCommand::NextPalette => {
                    session.handle(SettingsEvent::NextPalette, now);
                }
                ConsoleCommand::NextSpeed => {
                    session.handle(SettingsEvent::NextSpeed, now);
                }
                ConsoleCommand::Reseed => session.reseed(ReseedReason::Manual),
                ConsoleCommand::Handled => {}
            }
        }

        let tick = session.tick(Instant::now(), &mut console)?;
        if let Tick::Advanced(generation) = tick {
            record.record(generation);
        }
        if record.has_report() {
            record.roll();
        }

        let text = footer(session, &record);
        if text != shown {
            console.set_footer(text.clone());
            // a fresh frame draws the footer itself
            if !matches!(tick, Tick::Advanced(_)) {
                console.draw_footer()?;
            }
            shown = text;
        }
        thread::sleep(POLL_INTERVAL);
    }
    Ok(())
}

fn main() -> Result<()> {
    let Some(args) = options::Args::from_env()? else {
        return Ok(());
    };
    init_tracing(args.console());

    if let Some((survey, file_name)) = args.survey()? {
        return run_survey(survey, &file_name);
    }

    let config = args.session_config()?;
    let rng = match args.seed()? {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut session = match args.input_file() {
        Some(file_name) => {
            let pattern = fs::read_to_string(&file_name)
                .with_context(|| format!("read pattern {file_name}"))?;
            Session::from_pattern(config, rng, &RunLengthEncoded::default(), &pattern)
                .with_context(|| format!("seed from {file_name}"))?
        }
        None => Session::new(config, rng)?,
    };

    if args.console() {
        run_console(&mut session)?;
    } else {
        run_headless(&mut session, args.frames()?)?;
    }

    if let Some(file_name) = args.output_file() {
        let encoder = RunLengthEncoded::default().set_name("lifeglow final board");
        fs::write(&file_name, encoder.encode(session.board()))
            .with_context(|| format!("write {file_name}"))?;
    }

    Ok(())
}
