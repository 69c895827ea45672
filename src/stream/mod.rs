// ABOUTME: Trampolined multi-frame parser combinators that consume more than one frame
// ABOUTME: Nodes drive themselves across frame boundaries; alt() tracks commitment to support backtracking

mod alt;
mod bind;
mod lift;
mod pure;

pub mod combinators;

pub use alt::alt;
pub use bind::bind;
pub use lift::lift;
pub use pure::{pure, raise_error};

use crate::error::Error;
use crate::frame::Frame;

/// The result of offering one frame to a [`MessageStream`].
pub enum StreamStep<R> {
    /// The frame was consumed; more frames are needed before this stream resolves.
    NeedMore,
    /// The frame was not consumed. Valid only on the very first frame offered
    /// to a branch; see [`alt`]'s commitment rule.
    Rejected,
    /// The stream has resolved, successfully or not. No further frames will
    /// be offered to it.
    Done(Result<R, Error>),
}

/// A multi-frame parser: a state machine driven one [`Frame`] at a time.
///
/// A node resolves after consuming zero or more frames, carrying an `R` on
/// success. The trampoline lives in the combinators ([`bind`], [`alt`]) rather than in
/// any single node, so a long chain of `bind`s does not recurse the call
/// stack on every frame.
pub trait MessageStream<R>: Send {
    /// Offer the next frame. Must not be called again after returning `Done`.
    fn offer(&mut self, frame: Frame) -> StreamStep<R>;

    /// Resolve without any frame at all, if this node already can (`pure`,
    /// `raise_error`, or a `bind` whose continuation immediately does so).
    /// Combinators that wrap another node must check this before the first
    /// `offer`, since a chain ending in `pure` needs zero frames to finish.
    fn poll_ready(&mut self) -> Option<StreamStep<R>> {
        None
    }
}

// Every combinator in this module returns `Box<dyn MessageStream<R>>` rather
// than a named type, so boxed trait objects need to satisfy `MessageStream`
// bounds directly (e.g. `Dispatcher::submit`'s `S: MessageStream<R>`), not
// just support method calls through autoderef.
impl<R: Send> MessageStream<R> for Box<dyn MessageStream<R>> {
    fn offer(&mut self, frame: Frame) -> StreamStep<R> {
        (**self).offer(frame)
    }

    fn poll_ready(&mut self) -> Option<StreamStep<R>> {
        (**self).poll_ready()
    }
}

impl<R> std::fmt::Debug for StreamStep<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamStep::NeedMore => write!(f, "NeedMore"),
            StreamStep::Rejected => write!(f, "Rejected"),
            StreamStep::Done(Ok(_)) => write!(f, "Done(Ok)"),
            StreamStep::Done(Err(e)) => write!(f, "Done(Err({e}))"),
        }
    }
}
