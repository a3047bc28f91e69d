use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::BitBoard;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unexpected character {0:?} in pattern")]
    UnexpectedToken(char),
    #[error("run count {0} does not fit in a board")]
    InvalidRunCount(String),
    #[error("pattern reaches {width}x{height}, board is {board_w}x{board_h}")]
    PatternTooLarge {
        width: usize,
        height: usize,
        board_w: usize,
        board_h: usize,
    },
}

/// Converts boards to and from a text pattern format
pub trait BoardCodec {
    fn encode(&self, board: &BitBoard) -> String;
    fn decode(&self, value: &str, width: usize, height: usize) -> Result<BitBoard, CodecError>;
}

struct RunEncoder {
    sequence: String,
    line_len: usize,
    max_line_len: usize,
}
impl RunEncoder {
    fn new(max_line_len: usize) -> Self {
        Self {
            sequence: String::new(),
            line_len: 0,
            max_line_len,
        }
    }

    fn push_run(&mut self, run: usize, c: char) {
        let append = match run {
            0 => return,
            1 => c.to_string(),
            n => format!("{}{}", n, c),
        };
        if self.line_len + append.len() > self.max_line_len {
            self.sequence.push('\n');
            self.line_len = 0;
        }
        self.line_len += append.len();
        self.sequence.push_str(&append);
    }

    fn end(mut self) -> String {
        self.sequence.push('!');
        self.sequence
    }
}

/// The run-length encoded pattern format used by most Life software
///
/// ```text
/// #N blinker
/// x = 3, y = 1, rule = B3/S23
/// 3o!
/// ```
#[derive(Debug, Default)]
pub struct RunLengthEncoded {
    name: Option<String>,
}
impl RunLengthEncoded {
    pub fn set_name<T: AsRef<str>>(mut self, name: T) -> Self {
        self.name = Some(name.as_ref().to_owned());
        self
    }

    fn encode_header(&self, board: &BitBoard) -> String {
        let mut header = String::new();
        if let Some(name) = &self.name {
            header.push_str(&format!("#N {}\n", name));
        }
        header.push_str(&format!(
            "x = {}, y = {}, rule = B3/S23\n",
            board.width(),
            board.height()
        ));
        header
    }

    fn encode_cells(&self, board: &BitBoard) -> String {
        let mut seq = RunEncoder::new(70);
        // rows without live cells are folded into the next `$` run
        let mut last_row = 0;
        for y in 0..board.height() as i32 {
            let mut runs = Vec::new();
            let mut x = 0;
            while x < board.width() as i32 {
                let state = board.get(x, y);
                let start = x;
                while x < board.width() as i32 && board.get(x, y) == state {
                    x += 1;
                }
                runs.push(((x - start) as usize, if state { 'o' } else { 'b' }));
            }
            // trailing dead cells are implied
            if runs.last().is_some_and(|&(_, c)| c == 'b') {
                runs.pop();
            }

            if runs.is_empty() {
                continue;
            }
            seq.push_run((y - last_row) as usize, '$');
            last_row = y;
            for (run, c) in runs {
                seq.push_run(run, c);
            }
        }
        seq.end()
    }
}
fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d*)([bo$!])").expect("static pattern"))
}

impl BoardCodec for RunLengthEncoded {
    fn encode(&self, board: &BitBoard) -> String {
        format!("{}{}\n", self.encode_header(board), self.encode_cells(board))
    }

    fn decode(&self, value: &str, width: usize, height: usize) -> Result<BitBoard, CodecError> {
        let too_large = |w: usize, h: usize| CodecError::PatternTooLarge {
            width: w,
            height: h,
            board_w: width,
            board_h: height,
        };
        let mut board = BitBoard::new(width, height);
        let (mut x, mut y) = (0usize, 0usize);

        'lines_loop: for line in value.lines() {
            let line = line.trim();
            if line.starts_with('#') || line.starts_with('x') {
                continue;
            }
            if let Some(c) = line
                .chars()
                .find(|c| !(c.is_ascii_digit() || c.is_whitespace() || "bo$!".contains(*c)))
            {
                return Err(CodecError::UnexpectedToken(c));
            }

            for (_, [run_str, state]) in token_regex().captures_iter(line).map(|c| c.extract()) {
                let run = match run_str {
                    "" => 1,
                    digits => digits
                        .parse::<usize>()
                        .map_err(|_| CodecError::InvalidRunCount(digits.to_owned()))?,
                };
                // every run is bounds-checked before any cell is touched
                match state {
                    "!" => break 'lines_loop,
                    "o" => {
                        let end = x.saturating_add(run);
                        if end > width || y >= height {
                            return Err(too_large(end, y.saturating_add(1)));
                        }
                        for cx in x..end {
                            board.set(cx as i32, y as i32);
                        }
                        x = end;
                    }
                    "b" => {
                        x = x.saturating_add(run);
                        if x > width {
                            return Err(too_large(x, y.saturating_add(1)));
                        }
                    }
                    "$" => {
                        x = 0;
                        y = y.saturating_add(run);
                        if y > height {
                            return Err(too_large(width, y));
                        }
                    }
                    _ => unreachable!(),
                }
            }
        }

        Ok(board)
    }
}
