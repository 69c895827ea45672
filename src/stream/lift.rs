// ABOUTME: Wraps a single-frame `ParseMessage` as a one-shot `MessageStream` node
// ABOUTME: Resolves on the very first frame offered; never returns `NeedMore`

use std::marker::PhantomData;

use super::{MessageStream, StreamStep};
use crate::frame::Frame;
use crate::parser::{MessageOutcome, ParseMessage};

struct Lift<P, R> {
    parser: P,
    _marker: PhantomData<fn() -> R>,
}

impl<P, R> MessageStream<R> for Lift<P, R>
where
    P: ParseMessage<R> + Send,
    R: Send,
{
    fn offer(&mut self, frame: Frame) -> StreamStep<R> {
        match self.parser.parse(frame.tag, &frame.payload) {
            MessageOutcome::Matched(v) => StreamStep::Done(Ok(v)),
            MessageOutcome::Rejected => StreamStep::Rejected,
            MessageOutcome::Err(e) => StreamStep::Done(Err(e)),
        }
    }
}

/// Lift a single-frame [`ParseMessage`] into a [`MessageStream`] node.
pub fn lift<P, R>(parser: P) -> Box<dyn MessageStream<R>>
where
    P: ParseMessage<R> + Send + 'static,
    R: Send + 'static,
{
    Box::new(Lift {
        parser,
        _marker: PhantomData,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ready_for_query;
    use crate::tags;
    use bytes::Bytes;

    #[test]
    fn resolves_on_matching_tag() {
        let mut node = lift(ready_for_query);
        let frame = Frame::new(tags::READY_FOR_QUERY, Bytes::from_static(b"I"));
        assert!(matches!(node.offer(frame), StreamStep::Done(Ok(()))));
    }

    #[test]
    fn rejects_on_other_tags() {
        let mut node = lift(ready_for_query);
        let frame = Frame::new(tags::COMMAND_COMPLETE, Bytes::new());
        assert!(matches!(node.offer(frame), StreamStep::Rejected));
    }
}
