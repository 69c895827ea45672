// ABOUTME: Left-biased alternation with backtracking, committing once the left branch consumes a frame
// ABOUTME: After commitment a rejection from the left branch is a protocol error, not a fallback signal

use super::{MessageStream, StreamStep};
use crate::error::Error;
use crate::frame::Frame;

enum Committed {
    Neither,
    Left,
    Right,
}

struct Alt<R> {
    left: Option<Box<dyn MessageStream<R>>>,
    right: Option<Box<dyn MessageStream<R>>>,
    committed: Committed,
}

impl<R: Send> MessageStream<R> for Alt<R> {
    fn offer(&mut self, frame: Frame) -> StreamStep<R> {
        match self.committed {
            Committed::Neither => {
                let mut left = self.left.take().expect("alt polled with no left branch");
                match left.offer(frame.clone()) {
                    StreamStep::Rejected => {
                        // left never consumed anything: free to try right instead.
                        self.committed = Committed::Right;
                        let mut right = self.right.take().expect("alt polled with no right branch");
                        let step = right.offer(frame);
                        if !matches!(step, StreamStep::Done(_)) {
                            self.right = Some(right);
                        }
                        step
                    }
                    StreamStep::NeedMore => {
                        self.committed = Committed::Left;
                        self.right = None;
                        self.left = Some(left);
                        StreamStep::NeedMore
                    }
                    done @ StreamStep::Done(_) => {
                        self.right = None;
                        done
                    }
                }
            }
            Committed::Left => {
                let mut left = self.left.take().expect("alt committed left with no branch");
                match left.offer(frame) {
                    StreamStep::Rejected => StreamStep::Done(Err(Error::Protocol(
                        "alternation's left branch rejected a frame after already committing to it"
                            .into(),
                    ))),
                    other @ StreamStep::NeedMore => {
                        self.left = Some(left);
                        other
                    }
                    done @ StreamStep::Done(_) => done,
                }
            }
            Committed::Right => {
                let mut right = self.right.take().expect("alt committed right with no branch");
                let step = right.offer(frame);
                if !matches!(step, StreamStep::Done(_)) {
                    self.right = Some(right);
                }
                step
            }
        }
    }

    fn poll_ready(&mut self) -> Option<StreamStep<R>> {
        match self.committed {
            Committed::Neither => {
                // Only the left branch gets a zero-frame chance: `poll_ready`
                // has no frame to try the right branch against if the left
                // one rejects, since rejection is only observable from `offer`.
                let ready = self.left.as_mut()?.poll_ready();
                if let Some(StreamStep::Done(_)) = ready {
                    self.committed = Committed::Left;
                    self.right = None;
                }
                ready
            }
            Committed::Left => self.left.as_mut()?.poll_ready(),
            Committed::Right => self.right.as_mut()?.poll_ready(),
        }
    }
}

/// Left-biased choice. Offers each frame to `left` first; as long as `left`
/// has not yet consumed a frame, a `Rejected` reply rewinds and tries
/// `right` with the same frame instead. Once `left` has consumed at least
/// one frame, it is committed: a later rejection from it is promoted to a
/// fatal `Error::Protocol` rather than falling through to `right`.
pub fn alt<R>(left: Box<dyn MessageStream<R>>, right: Box<dyn MessageStream<R>>) -> Box<dyn MessageStream<R>>
where
    R: Send + 'static,
{
    Box::new(Alt {
        left: Some(left),
        right: Some(right),
        committed: Committed::Neither,
    })
}
