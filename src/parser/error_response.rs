// ABOUTME: Parses `E` ErrorResponse (and by extension `N` NoticeResponse) frames
// ABOUTME: Fields are a repeated (code byte, NUL-terminated string) list terminated by a zero code byte

use std::collections::HashMap;

use bytes::Bytes;

use super::{read_cstr, MessageOutcome};
use crate::error::Error;
use crate::tags;

/// The field codes this crate extracts by name; everything else is kept in
/// [`ErrorFields::other`] keyed by its raw code byte.
#[derive(Debug, Clone, Default)]
pub struct ErrorFields {
    pub severity: Option<String>,
    pub sqlstate: Option<String>,
    pub message: Option<String>,
    pub detail: Option<String>,
    pub other: HashMap<u8, String>,
}

/// `E` — error response. The field list is terminated by a zero code byte.
pub fn error_response(tag: u8, payload: &Bytes) -> MessageOutcome<ErrorFields> {
    if tag != tags::ERROR_RESPONSE {
        return MessageOutcome::Rejected;
    }
    match parse_fields(payload) {
        Ok(fields) => MessageOutcome::Matched(fields),
        Err(err) => MessageOutcome::Err(err),
    }
}

fn parse_fields(payload: &Bytes) -> Result<ErrorFields, Error> {
    let mut pos = 0;
    let mut fields = ErrorFields::default();

    loop {
        if pos >= payload.len() {
            return Err(Error::Protocol(
                "error response missing terminating zero byte".into(),
            ));
        }
        let code = payload[pos];
        pos += 1;
        if code == 0 {
            break;
        }
        let value = read_cstr(payload, &mut pos)?;
        match code {
            b'S' => fields.severity = Some(value),
            b'C' => fields.sqlstate = Some(value),
            b'M' => fields.message = Some(value),
            b'D' => fields.detail = Some(value),
            other => {
                fields.other.insert(other, value);
            }
        }
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Bytes {
        let mut buf = Vec::new();
        buf.push(b'S');
        buf.extend_from_slice(b"ERROR\0");
        buf.push(b'C');
        buf.extend_from_slice(b"42601\0");
        buf.push(b'M');
        buf.extend_from_slice(b"syntax error\0");
        buf.push(0);
        Bytes::from(buf)
    }

    #[test]
    fn parses_known_fields() {
        match error_response(tags::ERROR_RESPONSE, &sample()) {
            MessageOutcome::Matched(fields) => {
                assert_eq!(fields.severity.as_deref(), Some("ERROR"));
                assert_eq!(fields.sqlstate.as_deref(), Some("42601"));
                assert_eq!(fields.message.as_deref(), Some("syntax error"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn missing_terminator_is_protocol_error() {
        let payload = Bytes::from_static(b"SERROR\0");
        assert!(matches!(
            error_response(tags::ERROR_RESPONSE, &payload),
            MessageOutcome::Err(Error::Protocol(_))
        ));
    }
}
