// ABOUTME: Parses `S` ParameterStatus frames into a name/value pair
// ABOUTME: Both fields are NUL-terminated strings with nothing following the second

use bytes::Bytes;

use super::{read_cstr, MessageOutcome};
use crate::error::Error;
use crate::tags;

/// `S` — parameter status. Returns `(name, value)`.
pub fn parameter_status(tag: u8, payload: &Bytes) -> MessageOutcome<(String, String)> {
    if tag != tags::PARAMETER_STATUS {
        return MessageOutcome::Rejected;
    }

    let mut pos = 0;
    let name = match read_cstr(payload, &mut pos) {
        Ok(name) => name,
        Err(err) => return MessageOutcome::Err(err),
    };
    let value = match read_cstr(payload, &mut pos) {
        Ok(value) => value,
        Err(err) => return MessageOutcome::Err(err),
    };

    MessageOutcome::Matched((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_name_and_value() {
        let payload = Bytes::from_static(b"client_encoding\0UTF8\0");
        match parameter_status(tags::PARAMETER_STATUS, &payload) {
            MessageOutcome::Matched((name, value)) => {
                assert_eq!(name, "client_encoding");
                assert_eq!(value, "UTF8");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn missing_value_terminator_is_protocol_error() {
        let payload = Bytes::from_static(b"client_encoding\0UTF8");
        assert!(matches!(
            parameter_status(tags::PARAMETER_STATUS, &payload),
            MessageOutcome::Err(Error::Protocol(_))
        ));
    }
}
