// ABOUTME: Normative multi-frame streams built from the primitives in the parent module
// ABOUTME: These are examples a caller may use as-is or as a template for a domain-specific stream

use bytes::Bytes;

use super::{bind, lift, pure, MessageStream, StreamStep};
use crate::error::Error;
use crate::frame::Frame;
use crate::parser::{
    authentication, command_complete, empty_query, error_response, parameter_status,
    ready_for_query, Authentication, ParseMessage,
};

/// Collects rows until a terminator (`CommandComplete` or `EmptyQueryResponse`),
/// folding each decoded row into an accumulator with `fold`.
///
/// Equivalent to `alt(data_row(row_parser), alt(command_complete,
/// empty_query))` looped over frames; written as a dedicated state machine
/// rather than composed `alt`/`bind` nodes, since the repetition is unbounded
/// and a literal combinator composition would rebuild the `alt` tree on every
/// row.
pub fn rows<P, Row, Acc, F>(row_parser: P, init: Acc, fold: F) -> Box<dyn MessageStream<Acc>>
where
    P: ParseMessage<Row> + Send + 'static,
    Row: Send + 'static,
    Acc: Send + 'static,
    F: FnMut(Acc, Row) -> Acc + Send + 'static,
{
    Box::new(Rows {
        row_parser,
        acc: Some(init),
        fold,
    })
}

struct Rows<P, Acc, F> {
    row_parser: P,
    acc: Option<Acc>,
    fold: F,
}

impl<P, Row, Acc, F> MessageStream<Acc> for Rows<P, Acc, F>
where
    P: ParseMessage<Row> + Send,
    Row: Send,
    Acc: Send,
    F: FnMut(Acc, Row) -> Acc + Send,
{
    fn offer(&mut self, frame: Frame) -> StreamStep<Acc> {
        use crate::parser::MessageOutcome;

        match self.row_parser.parse(frame.tag, &frame.payload) {
            MessageOutcome::Matched(row) => {
                let acc = self.acc.take().expect("Rows polled after resolving");
                self.acc = Some((self.fold)(acc, row));
                StreamStep::NeedMore
            }
            MessageOutcome::Err(e) => StreamStep::Done(Err(e)),
            MessageOutcome::Rejected => match command_complete(frame.tag, &frame.payload) {
                MessageOutcome::Matched(_) => {
                    StreamStep::Done(Ok(self.acc.take().expect("Rows polled after resolving")))
                }
                MessageOutcome::Err(e) => StreamStep::Done(Err(e)),
                MessageOutcome::Rejected => match empty_query(frame.tag, &frame.payload) {
                    MessageOutcome::Matched(()) => {
                        StreamStep::Done(Ok(self.acc.take().expect("Rows polled after resolving")))
                    }
                    MessageOutcome::Err(e) => StreamStep::Done(Err(e)),
                    // None of the three alternatives matched: this is an
                    // uncommitted `alt`, so the frame is unaffiliated with
                    // this stream rather than a failure of it. The
                    // interpreter routes a `Rejected` frame to the
                    // unaffiliated sink and keeps this processor pending.
                    MessageOutcome::Rejected => StreamStep::Rejected,
                },
            },
        }
    }
}

/// The affected-row count for a command with no result set: either a
/// `CommandComplete` (count parsed from its tag text) or an
/// `EmptyQueryResponse` (`0`).
pub fn rows_affected() -> Box<dyn MessageStream<u64>> {
    super::alt(
        lift(command_complete),
        bind(lift(empty_query), |()| pure(0u64)),
    )
}

/// A parameter set accumulated over the startup/parameter-status phase.
#[derive(Debug, Clone, Default)]
pub struct ConnectionParams {
    pub settings: Vec<(String, String)>,
    pub integer_datetimes: bool,
}

/// Loops `alt(parameter_status, ready_for_query)`, threading whether
/// `integer_datetimes` was ever reported. Raises a parse error if
/// `ReadyForQuery` arrives without ever having seen it, since downstream
/// decoders need to know the wire format of timestamp columns.
pub fn params() -> Box<dyn MessageStream<ConnectionParams>> {
    Box::new(Params {
        acc: Some(ConnectionParams::default()),
        seen_integer_datetimes: false,
    })
}

struct Params {
    acc: Option<ConnectionParams>,
    seen_integer_datetimes: bool,
}

impl MessageStream<ConnectionParams> for Params {
    fn offer(&mut self, frame: Frame) -> StreamStep<ConnectionParams> {
        use crate::parser::MessageOutcome;

        match parameter_status(frame.tag, &frame.payload) {
            MessageOutcome::Matched((name, value)) => {
                let acc = self.acc.as_mut().expect("Params polled after resolving");
                if name == "integer_datetimes" {
                    acc.integer_datetimes = value == "on";
                    self.seen_integer_datetimes = true;
                }
                acc.settings.push((name, value));
                StreamStep::NeedMore
            }
            MessageOutcome::Err(e) => StreamStep::Done(Err(e)),
            MessageOutcome::Rejected => match ready_for_query(frame.tag, &frame.payload) {
                MessageOutcome::Matched(()) => {
                    if !self.seen_integer_datetimes {
                        return StreamStep::Done(Err(Error::Parsing(
                            "startup completed without an integer_datetimes parameter status"
                                .into(),
                        )));
                    }
                    StreamStep::Done(Ok(self.acc.take().expect("Params polled after resolving")))
                }
                MessageOutcome::Err(e) => StreamStep::Done(Err(e)),
                // Uncommitted `alt`: route to the unaffiliated sink and
                // keep waiting rather than failing the startup handshake.
                MessageOutcome::Rejected => StreamStep::Rejected,
            },
        }
    }
}

/// What the client must do after offering the first `AuthenticationRequest`
/// frame of a new connection.
#[derive(Debug)]
pub enum StartupStep {
    /// The backend wants a password in this form; the caller must encode and
    /// submit the reply, then offer a fresh `authentication_stream` for the
    /// frame that follows.
    NeedsPassword(Authentication),
    /// Authentication succeeded and the parameter-status/ready-for-query
    /// phase also completed.
    Ready(ConnectionParams),
}

/// Drives the connection startup handshake: one `AuthenticationRequest`,
/// and if it is `Ok`, the parameter-status loop through `ReadyForQuery`.
pub fn authentication_stream() -> Box<dyn MessageStream<StartupStep>> {
    bind(lift(authentication), |auth| match auth {
        Authentication::Ok => bind(params(), |p| pure(StartupStep::Ready(p))),
        other => pure(StartupStep::NeedsPassword(other)),
    })
}

/// Extracts the fields this crate surfaces from an `ErrorResponse`, falling
/// back to empty strings for a malformed one rather than failing the whole
/// stream — callers that need strict handling should use `error_response`
/// from [`crate::parser`] directly.
pub fn backend_error(payload: &Bytes) -> Error {
    match error_response(crate::tags::ERROR_RESPONSE, payload) {
        crate::parser::MessageOutcome::Matched(fields) => Error::Backend {
            sqlstate: fields.sqlstate.unwrap_or_default(),
            message: fields.message.unwrap_or_default(),
        },
        crate::parser::MessageOutcome::Err(e) => e,
        crate::parser::MessageOutcome::Rejected => {
            Error::Protocol("backend_error called with a non-ErrorResponse frame".into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags;

    #[test]
    fn rows_affected_reads_command_complete() {
        let mut node = rows_affected();
        let frame = Frame::new(tags::COMMAND_COMPLETE, Bytes::from_static(b"DELETE 3\0"));
        assert!(matches!(node.offer(frame), StreamStep::Done(Ok(3))));
    }

    #[test]
    fn rows_affected_treats_empty_query_as_zero() {
        let mut node = rows_affected();
        let frame = Frame::new(tags::EMPTY_QUERY_RESPONSE, Bytes::new());
        assert!(matches!(node.offer(frame), StreamStep::Done(Ok(0))));
    }

    #[test]
    fn params_raises_error_without_integer_datetimes() {
        let mut node = params();
        let frame = Frame::new(tags::READY_FOR_QUERY, Bytes::from_static(b"I"));
        assert!(matches!(
            node.offer(frame),
            StreamStep::Done(Err(Error::Parsing(_)))
        ));
    }

    #[test]
    fn params_collects_settings_then_ready() {
        let mut node = params();
        let frame = Frame::new(
            tags::PARAMETER_STATUS,
            Bytes::from_static(b"integer_datetimes\0on\0"),
        );
        assert!(matches!(node.offer(frame), StreamStep::NeedMore));

        let frame = Frame::new(tags::READY_FOR_QUERY, Bytes::from_static(b"I"));
        match node.offer(frame) {
            StreamStep::Done(Ok(params)) => {
                assert!(params.integer_datetimes);
                assert_eq!(params.settings.len(), 1);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn params_rejects_rather_than_fails_on_an_unexpected_tag() {
        let mut node = params();
        let frame = Frame::new(tags::COMMAND_COMPLETE, Bytes::from_static(b"SELECT 1\0"));
        assert!(matches!(node.offer(frame), StreamStep::Rejected));
    }

    #[test]
    fn rows_rejects_rather_than_fails_on_an_unexpected_tag() {
        let row_parser = crate::parser::data_row(|_fields| Ok::<_, Error>(()));
        let mut node = rows(row_parser, Vec::new(), |mut acc, row| {
            acc.push(row);
            acc
        });
        let frame = Frame::new(tags::AUTHENTICATION, Bytes::from_static(b"\0\0\0\0"));
        assert!(matches!(node.offer(frame), StreamStep::Rejected));
    }
}
