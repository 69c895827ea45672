// ABOUTME: Sequences two message streams, switching to the continuation once the first resolves
// ABOUTME: Collapses eagerly when either side can resolve without a frame, so `pure` tails cost nothing

use super::{MessageStream, StreamStep};
use crate::error::Error;
use crate::frame::Frame;

enum State<R, T> {
    First(Box<dyn MessageStream<R>>),
    Second(Box<dyn MessageStream<T>>),
    Resolving,
}

struct Bind<R, T> {
    state: State<R, T>,
    cont: Option<Box<dyn FnOnce(R) -> Box<dyn MessageStream<T>> + Send>>,
}

impl<R, T> Bind<R, T>
where
    R: Send + 'static,
    T: Send + 'static,
{
    /// Advance from the first node to the continuation once `r` is in hand.
    /// Collapses immediately if the continuation resolves without a frame.
    fn advance(&mut self, r: R) -> Option<StreamStep<T>> {
        let cont = self
            .cont
            .take()
            .expect("Bind continuation invoked more than once");
        let mut second = cont(r);
        if let Some(step) = second.poll_ready() {
            self.state = State::Resolving;
            return Some(step);
        }
        self.state = State::Second(second);
        None
    }
}

impl<R, T> MessageStream<T> for Bind<R, T>
where
    R: Send + 'static,
    T: Send + 'static,
{
    fn offer(&mut self, frame: Frame) -> StreamStep<T> {
        match std::mem::replace(&mut self.state, State::Resolving) {
            State::First(mut first) => match first.offer(frame) {
                StreamStep::Rejected => {
                    self.state = State::First(first);
                    StreamStep::Rejected
                }
                StreamStep::NeedMore => {
                    self.state = State::First(first);
                    StreamStep::NeedMore
                }
                StreamStep::Done(Err(e)) => StreamStep::Done(Err(e)),
                StreamStep::Done(Ok(v)) => {
                    self.advance(v).unwrap_or(StreamStep::NeedMore)
                }
            },
            State::Second(mut second) => {
                let step = second.offer(frame);
                if !matches!(step, StreamStep::Done(_)) {
                    self.state = State::Second(second);
                }
                step
            }
            State::Resolving => {
                panic!("Bind::offer called again after resolving")
            }
        }
    }

    fn poll_ready(&mut self) -> Option<StreamStep<T>> {
        match std::mem::replace(&mut self.state, State::Resolving) {
            State::First(mut first) => match first.poll_ready() {
                Some(StreamStep::Done(Ok(v))) => self.advance(v),
                Some(StreamStep::Done(Err(e))) => Some(StreamStep::Done(Err(e))),
                Some(StreamStep::NeedMore) | Some(StreamStep::Rejected) | None => {
                    self.state = State::First(first);
                    None
                }
            },
            State::Second(mut second) => {
                let ready = second.poll_ready();
                if ready.is_none() {
                    self.state = State::Second(second);
                }
                ready
            }
            State::Resolving => None,
        }
    }
}

/// Sequence `s`; once it resolves with a value, hand that value to `f` and
/// continue with the [`MessageStream`] it returns. If `s` fails, `f` is never
/// called.
pub fn bind<R, T, F>(mut s: Box<dyn MessageStream<R>>, f: F) -> Box<dyn MessageStream<T>>
where
    R: Send + 'static,
    T: Send + 'static,
    F: FnOnce(R) -> Box<dyn MessageStream<T>> + Send + 'static,
{
    if let Some(step) = s.poll_ready() {
        return match step {
            StreamStep::Done(Ok(v)) => f(v),
            StreamStep::Done(Err(e)) => Box::new(Resolved(Some(Err(e)))),
            StreamStep::NeedMore | StreamStep::Rejected => {
                unreachable!("poll_ready must only return Done or None")
            }
        };
    }

    Box::new(Bind {
        state: State::First(s),
        cont: Some(Box::new(f)),
    })
}

struct Resolved<T>(Option<Result<T, Error>>);

impl<T: Send> MessageStream<T> for Resolved<T> {
    fn offer(&mut self, _frame: Frame) -> StreamStep<T> {
        self.poll_ready()
            .expect("Resolved::offer called after it already resolved")
    }

    fn poll_ready(&mut self) -> Option<StreamStep<T>> {
        self.0.take().map(StreamStep::Done)
    }
}
