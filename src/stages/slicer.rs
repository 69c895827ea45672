// ABOUTME: Reassembles arbitrary-sized socket reads into whole frames, in wire order
// ABOUTME: Bytes in always equal bytes emitted as frames plus whatever remains buffered

use std::sync::Arc;

use bytes::{Buf, BytesMut};

use crate::error::Error;
use crate::frame::{Frame, HEADER_LEN, MIN_LENGTH};
use crate::latch::TransportErrorLatch;
use crate::queues::{FrameSender, InboundReceiver};

struct SlicerState {
    buf: BytesMut,
}

impl SlicerState {
    fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    fn push(&mut self, chunk: BytesMut) {
        self.buf.unsplit(chunk);
    }

    /// Extracts the next whole frame buffered so far, if any.
    ///
    /// `Ok(None)` means: keep reading, not enough bytes yet. `Err` is fatal
    /// and the caller must stop the stage after observing it.
    fn next_frame(&mut self) -> Result<Option<Frame>, Error> {
        if self.buf.len() < HEADER_LEN {
            return Ok(None);
        }
        let tag = self.buf[0];
        let length = u32::from_be_bytes([self.buf[1], self.buf[2], self.buf[3], self.buf[4]]);
        if length < MIN_LENGTH {
            return Err(Error::Protocol(format!(
                "frame length {length} is below the minimum of {MIN_LENGTH}"
            )));
        }
        let payload_len = (length - MIN_LENGTH) as usize;
        let total = HEADER_LEN + payload_len;
        if self.buf.len() < total {
            return Ok(None);
        }
        let mut frame_bytes = self.buf.split_to(total);
        frame_bytes.advance(HEADER_LEN);
        Ok(Some(Frame::new(tag, frame_bytes.freeze())))
    }
}

pub(crate) async fn run(
    mut inbound: InboundReceiver,
    frames: FrameSender,
    latch: Arc<TransportErrorLatch>,
) {
    let mut state = SlicerState::new();
    while let Some(chunk) = inbound.recv().await {
        state.push(chunk);
        loop {
            match state.next_frame() {
                Ok(Some(frame)) => {
                    if frames.send(frame).is_err() {
                        tracing::debug!("slicer: interpreter dropped, exiting");
                        return;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    tracing::error!(error = %err, "slicer: fatal framing error, latching");
                    latch.set(err);
                    return;
                }
            }
        }
    }
    tracing::debug!("slicer: inbound queue closed, exiting");
}
