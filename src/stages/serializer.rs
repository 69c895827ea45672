// ABOUTME: Executes queued encoder jobs into fresh buffers and hands them to the Sender
// ABOUTME: Never coalesces two jobs' output into one buffer, preserving one-write-per-job framing

use bytes::BytesMut;

use crate::queues::{OutboundSender, SerializerReceiver};

const INITIAL_BUFFER_CAPACITY: usize = 256;

pub(crate) async fn run(mut jobs: SerializerReceiver, outbound: OutboundSender) {
    while let Some(job) = jobs.recv().await {
        let mut buf = BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY);
        job(&mut buf);
        if outbound.send(buf.freeze()).await.is_err() {
            tracing::debug!("serializer: sender dropped, exiting");
            return;
        }
    }
    tracing::debug!("serializer: job queue closed, exiting");
}
