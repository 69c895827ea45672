// ABOUTME: Error taxonomy shared by every stage of the dispatcher pipeline
// ABOUTME: Distinguishes terminal transport failures from per-request protocol/backend errors

use std::io;

use thiserror::Error;

/// Every way a submission, or the dispatcher itself, can fail.
///
/// `Transport` is the only terminal variant: once one stage observes it, it
/// is latched (see [`crate::latch`]) and handed to every other pending and
/// future submission. The rest are per-request and never stop the pipeline.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// I/O failure or EOF on the socket. Terminal.
    #[error("transport error: {0}")]
    Transport(String),

    /// Malformed framing, an unrecognized discriminator, or a message-stream
    /// parser that consumed a frame and then failed.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// An `ErrorResponse` frame received while a processor was pending.
    #[error("backend error ({sqlstate}): {message}")]
    Backend { sqlstate: String, message: String },

    /// A [`crate::stream::MessageStream`] called `raise_error`.
    #[error("parse error: {0}")]
    Parsing(String),
}

impl Error {
    pub(crate) fn from_io(err: &io::Error) -> Self {
        Error::Transport(err.to_string())
    }

    pub(crate) fn eof() -> Self {
        Error::Transport("connection closed by peer".to_string())
    }

    /// The outcome `stop()` latches for every pending and future submission,
    /// per spec.md §4.8: "resolves every outstanding future with the
    /// transport error 'dispatcher stopped'".
    pub(crate) fn stopped() -> Self {
        Error::Transport("dispatcher stopped".to_string())
    }
}
