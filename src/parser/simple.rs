// ABOUTME: Zero-payload single-frame parsers that only need to match a tag
// ABOUTME: Grouped together since each is a one-line tag check with no payload to decode

use bytes::Bytes;

use super::MessageOutcome;
use crate::tags;

/// `I` — empty query response.
pub fn empty_query(tag: u8, _payload: &Bytes) -> MessageOutcome<()> {
    if tag == tags::EMPTY_QUERY_RESPONSE {
        MessageOutcome::Matched(())
    } else {
        MessageOutcome::Rejected
    }
}

/// `1` — parse complete.
pub fn parse_complete(tag: u8, _payload: &Bytes) -> MessageOutcome<()> {
    if tag == tags::PARSE_COMPLETE {
        MessageOutcome::Matched(())
    } else {
        MessageOutcome::Rejected
    }
}

/// `2` — bind complete.
pub fn bind_complete(tag: u8, _payload: &Bytes) -> MessageOutcome<()> {
    if tag == tags::BIND_COMPLETE {
        MessageOutcome::Matched(())
    } else {
        MessageOutcome::Rejected
    }
}

/// `Z` — ready for query. The status byte is ignored.
pub fn ready_for_query(tag: u8, _payload: &Bytes) -> MessageOutcome<()> {
    if tag == tags::READY_FOR_QUERY {
        MessageOutcome::Matched(())
    } else {
        MessageOutcome::Rejected
    }
}
