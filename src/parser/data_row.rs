// ABOUTME: Parses `D` DataRow frames, handing each field's raw bytes to a caller-supplied row parser
// ABOUTME: A NULL field (length -1) is passed through as `None` rather than an empty slice

use bytes::{Buf, Bytes};

use super::MessageOutcome;
use crate::error::Error;
use crate::tags;

/// `D` — data row. `row_parser` receives the fields of one row, in order, as
/// `Option<Bytes>` (`None` for SQL NULL), and produces the caller's row type.
///
/// This core does not interpret field contents; decoding the bytes of a
/// field into a typed value is the caller's responsibility, same as the
/// column decoders this crate treats as an external concern.
pub fn data_row<F, R>(row_parser: F) -> impl Fn(u8, &Bytes) -> MessageOutcome<R> + Send + Sync
where
    F: Fn(Vec<Option<Bytes>>) -> Result<R, Error> + Send + Sync,
{
    move |tag: u8, payload: &Bytes| -> MessageOutcome<R> {
        if tag != tags::DATA_ROW {
            return MessageOutcome::Rejected;
        }

        let mut buf = payload.clone();

        if buf.remaining() < 2 {
            return MessageOutcome::Err(Error::Protocol(
                "data row frame shorter than its field count".into(),
            ));
        }
        let field_count = buf.get_u16() as usize;

        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            if buf.remaining() < 4 {
                return MessageOutcome::Err(Error::Protocol(
                    "data row frame truncated before a field length".into(),
                ));
            }
            let len = buf.get_i32();
            if len < 0 {
                fields.push(None);
                continue;
            }
            let len = len as usize;
            if buf.remaining() < len {
                return MessageOutcome::Err(Error::Protocol(
                    "data row frame truncated before a field's bytes".into(),
                ));
            }
            fields.push(Some(buf.copy_to_bytes(len)));
        }

        match row_parser(fields) {
            Ok(row) => MessageOutcome::Matched(row),
            Err(err) => MessageOutcome::Err(err),
        }
    }
}
