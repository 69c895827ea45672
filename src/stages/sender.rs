// ABOUTME: Drains the outbound byte queue onto the socket, one buffer written fully before the next
// ABOUTME: The first I/O error latches the transport and ends the stage

use std::sync::Arc;

use tokio::io::AsyncWriteExt;

use crate::error::Error;
use crate::latch::TransportErrorLatch;
use crate::queues::OutboundReceiver;

pub(crate) async fn run<W>(mut outbound: OutboundReceiver, mut socket: W, latch: Arc<TransportErrorLatch>)
where
    W: tokio::io::AsyncWrite + Unpin,
{
    while let Some(buf) = outbound.recv().await {
        if let Err(err) = socket.write_all(&buf).await {
            tracing::error!(error = %err, "sender: write failed, latching transport error");
            latch.set(Error::from_io(&err));
            return;
        }
    }
    tracing::debug!("sender: outbound queue closed, exiting");
}
