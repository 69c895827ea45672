// ABOUTME: Terminal nodes that resolve without ever consuming a frame
// ABOUTME: `pure` and `raise_error` are the base cases every `bind` chain eventually bottoms out in

use super::{MessageStream, StreamStep};
use crate::error::Error;
use crate::frame::Frame;

struct Pure<R>(Option<R>);

impl<R: Send> MessageStream<R> for Pure<R> {
    fn offer(&mut self, _frame: Frame) -> StreamStep<R> {
        self.poll_ready()
            .expect("Pure::offer called after it already resolved")
    }

    fn poll_ready(&mut self) -> Option<StreamStep<R>> {
        let value = self.0.take()?;
        Some(StreamStep::Done(Ok(value)))
    }
}

/// Resolve immediately with `v`, consuming no frame.
pub fn pure<R: Send + 'static>(v: R) -> Box<dyn MessageStream<R>> {
    Box::new(Pure(Some(v)))
}

struct RaiseError<R> {
    text: Option<String>,
    _marker: std::marker::PhantomData<fn() -> R>,
}

impl<R: Send> MessageStream<R> for RaiseError<R> {
    fn offer(&mut self, _frame: Frame) -> StreamStep<R> {
        self.poll_ready()
            .expect("RaiseError::offer called after it already resolved")
    }

    fn poll_ready(&mut self) -> Option<StreamStep<R>> {
        let text = self.text.take()?;
        Some(StreamStep::Done(Err(Error::Parsing(text))))
    }
}

/// Resolve immediately with `Error::Parsing(text)`, consuming no frame.
pub fn raise_error<R: Send + 'static>(text: impl Into<String>) -> Box<dyn MessageStream<R>> {
    Box::new(RaiseError {
        text: Some(text.into()),
        _marker: std::marker::PhantomData,
    })
}
