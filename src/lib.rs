//! A self-reseeding Game of Life display engine.
//!
//! A [`Session`] evolves a toroidal [`BitBoard`], renders each cell through a
//! fading afterglow, and starts a fresh random run whenever the current one
//! turns static, periodic, or settles into a repeating population cycle.

pub mod board;
pub mod config;
pub mod detect;
pub mod enc;
pub mod engine;
pub mod error;
pub mod fade;
pub mod palette;
pub mod pos;
pub mod session;
pub mod sink;
pub mod survey;

pub use board::BitBoard;
pub use config::SessionConfig;
pub use enc::{BoardCodec, RunLengthEncoded};
pub use error::{Error, Result};
pub use pos::Pos2;
pub use session::{ReseedReason, Session, SettingsEvent, Tick};
pub use sink::DisplaySink;
