use std::io::{self, Write};

use crossterm::{
    cursor,
    event::{self, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{self, Color as TermColor},
    terminal,
};
use lifeglow::{DisplaySink, palette::Color};

pub enum ConsoleCommand {
    Exit,
    NextPalette,
    NextSpeed,
    Reseed,
    Handled,
}

/// Draws frames on a true-colour terminal, two characters per cell
pub struct ConsoleSink {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
    footer: String,
}
impl ConsoleSink {
    pub fn new(width: usize, height: usize) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(
            io::stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All)
        )?;
        Ok(Self {
            width,
            height,
            pixels: vec![Color::BLACK; width * height],
            footer: String::new(),
        })
    }

    pub fn poll_events(&mut self) -> io::Result<Option<ConsoleCommand>> {
        // make sure an event is present for us to take
        if !event::poll(std::time::Duration::from_secs(0))? {
            return Ok(None);
        }

        let command = match event::read()? {
            event::Event::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            }) => ConsoleCommand::Exit,
            event::Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => ConsoleCommand::Exit,
                KeyCode::Char('p') => ConsoleCommand::NextPalette,
                KeyCode::Char('s') => ConsoleCommand::NextSpeed,
                KeyCode::Char('r') => ConsoleCommand::Reseed,
                _ => ConsoleCommand::Handled,
            },
            _ => ConsoleCommand::Handled,
        };
        Ok(Some(command))
    }

    pub fn set_footer(&mut self, footer: String) {
        self.footer = footer;
    }

    /// Redraws only the footer line
    pub fn draw_footer(&self) -> io::Result<()> {
        let mut stdout = io::stdout();
        queue!(
            stdout,
            cursor::MoveTo(0, self.height as u16),
            style::ResetColor,
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::Print(&self.footer)
        )?;
        stdout.flush()
    }
}

impl DisplaySink for ConsoleSink {
    type Error = io::Error;

    fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        self.pixels[y * self.width + x] = color;
    }

    fn present(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        for (y, row) in self.pixels.chunks(self.width).enumerate() {
            queue!(stdout, cursor::MoveTo(0, y as u16))?;
            let mut last = None;
            for &color in row {
                // avoid re-sending the colour for runs of equal cells
                if last != Some(color) {
                    let (r, g, b) = color.to_rgb();
                    queue!(stdout, style::SetForegroundColor(TermColor::Rgb { r, g, b }))?;
                    last = Some(color);
                }
                stdout.write_all("██".as_bytes())?;
            }
        }
        drop(stdout);
        self.draw_footer()
    }
}

impl Drop for ConsoleSink {
    fn drop(&mut self) {
        // if we can enable it, we should be able to disable it
        let _ = execute!(
            io::stdout(),
            style::ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}
