//! Error types for lifeglow.

use thiserror::Error;

use crate::enc::CodecError;

/// Errors raised while building or feeding a session
#[derive(Debug, Error)]
pub enum Error {
    /// The session configuration cannot describe a working simulation
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// A seed pattern could not be decoded onto the board
    #[error("pattern error: {0}")]
    Codec(#[from] CodecError),

    /// A seed board has different dimensions than the configuration
    #[error("board is {got_w}x{got_h}, expected {want_w}x{want_h}")]
    BoardSize {
        got_w: usize,
        got_h: usize,
        want_w: usize,
        want_h: usize,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
