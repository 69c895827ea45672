// ABOUTME: Type-erases a typed `MessageStream<R>` so heterogeneous pending requests share one queue
// ABOUTME: Pairs an outbound request's encoder with a typed response future

use bytes::BytesMut;
use tokio::sync::oneshot;

use crate::error::Error;
use crate::frame::Frame;
use crate::stream::{MessageStream, StreamStep};

/// A closure that encodes one outbound message into a freshly sized buffer.
/// Boxed so the Serializer stage can hold heterogeneous jobs in one queue.
pub type EncoderJob = Box<dyn FnOnce(&mut BytesMut) + Send + 'static>;

/// What the Interpreter saw after offering a frame (or polling with none).
pub(crate) enum ProcessorStep {
    NeedMore,
    Rejected,
    Done,
}

trait ErasedStream: Send {
    fn offer(&mut self, frame: Frame) -> ProcessorStep;
    fn poll_ready(&mut self) -> Option<ProcessorStep>;
    fn fail(self: Box<Self>, err: Error);
}

struct Typed<R> {
    inner: Box<dyn MessageStream<R>>,
    reply: Option<oneshot::Sender<Result<R, Error>>>,
}

impl<R: Send + 'static> ErasedStream for Typed<R> {
    fn offer(&mut self, frame: Frame) -> ProcessorStep {
        match self.inner.offer(frame) {
            StreamStep::NeedMore => ProcessorStep::NeedMore,
            StreamStep::Rejected => ProcessorStep::Rejected,
            StreamStep::Done(result) => {
                if let Some(reply) = self.reply.take() {
                    let _ = reply.send(result);
                }
                ProcessorStep::Done
            }
        }
    }

    fn poll_ready(&mut self) -> Option<ProcessorStep> {
        self.inner.poll_ready().map(|step| match step {
            StreamStep::Done(result) => {
                if let Some(reply) = self.reply.take() {
                    let _ = reply.send(result);
                }
                ProcessorStep::Done
            }
            StreamStep::NeedMore => ProcessorStep::NeedMore,
            StreamStep::Rejected => ProcessorStep::Rejected,
        })
    }

    fn fail(mut self: Box<Self>, err: Error) {
        if let Some(reply) = self.reply.take() {
            let _ = reply.send(Err(err));
        }
    }
}

/// A pending request: a [`MessageStream`] waiting for frames, paired with
/// the means to deliver its eventual result back to the caller of `submit`.
///
/// `R` is erased at construction so the Interpreter's queue of pending
/// processors can hold requests of different result types side by side.
pub struct ResultProcessor {
    stream: Box<dyn ErasedStream>,
}

impl ResultProcessor {
    pub fn new<S, R>(stream: S, reply: oneshot::Sender<Result<R, Error>>) -> Self
    where
        S: MessageStream<R> + 'static,
        R: Send + 'static,
    {
        Self {
            stream: Box::new(Typed {
                inner: Box::new(stream),
                reply: Some(reply),
            }),
        }
    }

    pub(crate) fn offer(&mut self, frame: Frame) -> ProcessorStep {
        self.stream.offer(frame)
    }

    pub(crate) fn poll_ready(&mut self) -> Option<ProcessorStep> {
        self.stream.poll_ready()
    }

    pub(crate) fn fail(self, err: Error) {
        self.stream.fail(err)
    }
}
