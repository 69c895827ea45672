// ABOUTME: Reads fixed-size chunks off the socket and pushes them to the Slicer's inbound queue
// ABOUTME: EOF and I/O errors both latch a terminal transport error

use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::AsyncReadExt;

use crate::error::Error;
use crate::latch::TransportErrorLatch;
use crate::queues::InboundSender;

pub(crate) async fn run<R>(
    mut socket: R,
    inbound: InboundSender,
    latch: Arc<TransportErrorLatch>,
    read_buffer_size: usize,
) where
    R: tokio::io::AsyncRead + Unpin,
{
    loop {
        let mut buf = BytesMut::zeroed(read_buffer_size);
        let n = match socket.read(&mut buf).await {
            Ok(0) => {
                tracing::warn!("receiver: connection closed by peer");
                latch.set(Error::eof());
                return;
            }
            Ok(n) => n,
            Err(err) => {
                tracing::error!(error = %err, "receiver: read failed, latching transport error");
                latch.set(Error::from_io(&err));
                return;
            }
        };
        buf.truncate(n);
        if inbound.send(buf).await.is_err() {
            tracing::debug!("receiver: slicer dropped, exiting");
            return;
        }
    }
}
