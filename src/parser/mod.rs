// ABOUTME: Single-frame parser combinators that decide whether one frame matches and decode it
// ABOUTME: One file per concrete parser, one message type per file

mod authentication;
mod command_complete;
mod data_row;
mod error_response;
mod parameter_status;
mod simple;

pub use authentication::{authentication, Authentication};
pub use command_complete::command_complete;
pub use data_row::data_row;
pub use error_response::{error_response, ErrorFields};
pub use parameter_status::parameter_status;
pub use simple::{bind_complete, empty_query, parse_complete, ready_for_query};

use bytes::Bytes;

use crate::error::Error;

/// The result of offering one frame to a [`ParseMessage`].
#[derive(Debug)]
pub enum MessageOutcome<R> {
    /// The frame matched this parser's tag and decoded successfully.
    Matched(R),
    /// The frame's tag does not belong to this parser; try an alternative.
    Rejected,
    /// The tag matched but the payload failed to decode.
    Err(Error),
}

/// A single-frame parser: given `(tag, payload)`, decide whether it matches.
pub trait ParseMessage<R>: Send + Sync {
    fn parse(&self, tag: u8, payload: &Bytes) -> MessageOutcome<R>;
}

impl<F, R> ParseMessage<R> for F
where
    F: Fn(u8, &Bytes) -> MessageOutcome<R> + Send + Sync,
{
    fn parse(&self, tag: u8, payload: &Bytes) -> MessageOutcome<R> {
        (self)(tag, payload)
    }
}

/// Reads a NUL-terminated string starting at `payload[*pos]`, advancing
/// `*pos` past the terminator. `Err` if no NUL is found.
pub(crate) fn read_cstr(payload: &Bytes, pos: &mut usize) -> Result<String, Error> {
    let rest = &payload[*pos..];
    let nul = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::Protocol("unterminated string in message payload".into()))?;
    let s = String::from_utf8_lossy(&rest[..nul]).into_owned();
    *pos += nul + 1;
    Ok(s)
}
