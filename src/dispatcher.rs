// ABOUTME: The public facade: wires up the five stages over a socket and exposes submit/stop
// ABOUTME: submit's dual-queue push is guarded by one mutex so EncoderJob and ResultProcessor stay paired

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{split, AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::Error;
use crate::latch::TransportErrorLatch;
use crate::queues::{
    FrameReceiver, FrameSender, InboundReceiver, InboundSender, OutboundReceiver, OutboundSender,
    ResultProcessorReceiver, ResultProcessorSender, SerializerReceiver, SerializerSender,
};
use crate::result_processor::{EncoderJob, ResultProcessor};
use crate::sink::UnaffiliatedSink;
use crate::stages::{interpreter, receiver, sender, serializer, slicer};
use crate::stream::MessageStream;

/// A running pipelined dispatcher over one duplex byte stream.
///
/// Dropping a `Dispatcher` does not stop it; call [`Dispatcher::stop`]
/// explicitly, or let the socket close and the Receiver's EOF tear the
/// pipeline down on its own.
pub struct Dispatcher {
    serializer_tx: SerializerSender,
    processor_tx: ResultProcessorSender,
    submit_lock: Mutex<()>,
    latch: Arc<TransportErrorLatch>,
    stopped: AtomicBool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Dispatcher {
    /// Spawn the five stages over `socket` and return a handle to submit
    /// requests against it. `sink` receives every frame or event with no
    /// affiliated request (async notifications, out-of-band errors).
    pub fn connect<S, F>(socket: S, config: Config, sink: F) -> Arc<Self>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
        F: UnaffiliatedSink,
    {
        let (read_half, write_half) = split(socket);

        let (serializer_tx, serializer_rx): (SerializerSender, SerializerReceiver) =
            mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx): (OutboundSender, OutboundReceiver) =
            mpsc::channel(config.outbound_queue_depth);
        let (inbound_tx, inbound_rx): (InboundSender, InboundReceiver) =
            mpsc::channel(config.outbound_queue_depth);
        let (frame_tx, frame_rx): (FrameSender, FrameReceiver) = mpsc::unbounded_channel();
        let (processor_tx, processor_rx): (ResultProcessorSender, ResultProcessorReceiver) =
            mpsc::unbounded_channel();

        let latch = Arc::new(TransportErrorLatch::new());
        let sink: Arc<dyn Fn(crate::sink::UnaffiliatedResult) + Send + Sync> = Arc::new(sink);

        let mut tasks = Vec::with_capacity(5);
        tasks.push(tokio::task::spawn(sender::run(
            outbound_rx,
            write_half,
            latch.clone(),
        )));
        tasks.push(tokio::task::spawn(receiver::run(
            read_half,
            inbound_tx,
            latch.clone(),
            config.read_buffer_size,
        )));
        tasks.push(tokio::task::spawn(serializer::run(serializer_rx, outbound_tx)));
        tasks.push(tokio::task::spawn(slicer::run(inbound_rx, frame_tx, latch.clone())));
        tasks.push(tokio::task::spawn(interpreter::run(
            frame_rx,
            processor_rx,
            latch.clone(),
            sink,
            config.strict_protocol,
        )));

        Arc::new(Self {
            serializer_tx,
            processor_tx,
            submit_lock: Mutex::new(()),
            latch,
            stopped: AtomicBool::new(false),
            tasks: Mutex::new(tasks),
        })
    }

    /// Submit one request: `encoder` is run by the Serializer to produce the
    /// outbound bytes, `stream` decodes the reply. Resolves once `stream`
    /// reaches a terminal state, or immediately with the latched transport
    /// error (including `Error::Transport("dispatcher stopped")` if the
    /// dispatcher cannot accept it).
    pub async fn submit<S, R>(&self, encoder: EncoderJob, stream: S) -> Result<R, Error>
    where
        S: MessageStream<R> + 'static,
        R: Send + 'static,
    {
        if let Some(err) = self.latch.get() {
            return Err(err);
        }
        if self.stopped.load(Ordering::Acquire) {
            return Err(Error::stopped());
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        let processor = ResultProcessor::new(stream, reply_tx);

        {
            // Held across both sends so the Interpreter never observes a
            // job with no matching processor, or vice versa.
            let _guard = self.submit_lock.lock().await;
            if self.serializer_tx.send(encoder).is_err() || self.processor_tx.send(processor).is_err()
            {
                return Err(self.latch.get().unwrap_or_else(Error::stopped));
            }
        }

        match reply_rx.await {
            Ok(result) => result,
            Err(_) => Err(self.latch.get().unwrap_or_else(Error::stopped)),
        }
    }

    /// Idempotent. Stops accepting new submissions, fails every processor
    /// currently pending in the Interpreter with `Error::Transport("dispatcher
    /// stopped")` (or the already-latched transport error, if one raced in
    /// first), and aborts the five stage tasks.
    pub async fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        self.latch.set(Error::stopped());
        for task in self.tasks.lock().await.drain(..) {
            task.abort();
        }
    }
}
