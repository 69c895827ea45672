// ABOUTME: Parses `C` CommandComplete frames into the affected-row count
// ABOUTME: Row count is the last integer token of the command tag text; 0 if absent

use bytes::Bytes;

use super::MessageOutcome;
use crate::tags;

/// `C` — command complete. Returns the affected-row count parsed from the
/// textual command tag (e.g. `"SELECT 1"`, `"INSERT 0 5"`); `0` if the tag
/// carries no trailing integer.
pub fn command_complete(tag: u8, payload: &Bytes) -> MessageOutcome<u64> {
    if tag != tags::COMMAND_COMPLETE {
        return MessageOutcome::Rejected;
    }

    let text = String::from_utf8_lossy(payload);
    let text = text.trim_end_matches('\0');
    let count = text
        .split_whitespace()
        .next_back()
        .and_then(|tok| tok.parse::<u64>().ok())
        .unwrap_or(0);

    MessageOutcome::Matched(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trailing_count() {
        let payload = Bytes::from_static(b"INSERT 0 5\0");
        assert!(matches!(
            command_complete(tags::COMMAND_COMPLETE, &payload),
            MessageOutcome::Matched(5)
        ));
    }

    #[test]
    fn defaults_to_zero_without_trailing_integer() {
        let payload = Bytes::from_static(b"CREATE TABLE\0");
        assert!(matches!(
            command_complete(tags::COMMAND_COMPLETE, &payload),
            MessageOutcome::Matched(0)
        ));
    }

    #[test]
    fn select_tag_reports_row_count() {
        let payload = Bytes::from_static(b"SELECT 1\0");
        assert!(matches!(
            command_complete(tags::COMMAND_COMPLETE, &payload),
            MessageOutcome::Matched(1)
        ));
    }
}
