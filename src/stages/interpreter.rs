// ABOUTME: The routing core: matches incoming frames against the pending processor queue
// ABOUTME: ErrorResponse is intercepted and routed as a Backend error rather than offered to the parser

use std::collections::VecDeque;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::Error;
use crate::frame::Frame;
use crate::latch::TransportErrorLatch;
use crate::parser::{error_response, read_cstr, MessageOutcome};
use crate::queues::{FrameReceiver, ResultProcessorReceiver};
use crate::result_processor::{ProcessorStep, ResultProcessor};
use crate::sink::UnaffiliatedResult;
use crate::tags;

pub(crate) async fn run(
    mut frames: FrameReceiver,
    mut incoming_processors: ResultProcessorReceiver,
    latch: Arc<TransportErrorLatch>,
    sink: Arc<dyn Fn(UnaffiliatedResult) + Send + Sync>,
    strict_protocol: bool,
) {
    let mut pending: VecDeque<ResultProcessor> = VecDeque::new();

    // Dropping the `Dispatcher` handle (dispatcher.rs documents this as
    // supported) drops every `ResultProcessorSender`, so `recv()` on this
    // channel starts yielding `None` immediately and forever. Once that
    // happens stop polling it — the `if` guard below removes the branch
    // from the `select!` entirely instead of it winning every `biased`
    // round with a `None` that never gets handled.
    let mut processors_open = true;

    loop {
        tokio::select! {
            biased;

            err = latch.wait() => {
                tracing::debug!(pending = pending.len(), "interpreter: transport latched, failing pending requests");
                for processor in pending.drain(..) {
                    processor.fail(err.clone());
                }
                while let Ok(processor) = incoming_processors.try_recv() {
                    processor.fail(err.clone());
                }
                return;
            }

            maybe_processor = incoming_processors.recv(), if processors_open => {
                let Some(mut processor) = maybe_processor else {
                    tracing::debug!("interpreter: dispatcher dropped, no further submissions");
                    processors_open = false;
                    continue;
                };
                match processor.poll_ready() {
                    Some(ProcessorStep::Done) => {}
                    Some(ProcessorStep::NeedMore) | None => pending.push_back(processor),
                    Some(ProcessorStep::Rejected) => {
                        tracing::error!("interpreter: newly submitted processor rejected with no frame offered");
                    }
                }
            }

            maybe_frame = frames.recv() => {
                match maybe_frame {
                    Some(frame) => route_frame(frame, &mut pending, &sink, strict_protocol),
                    None => {
                        tracing::debug!("interpreter: slicer stopped, exiting");
                        return;
                    }
                }
            }
        }
    }
}

fn route_frame(
    frame: Frame,
    pending: &mut VecDeque<ResultProcessor>,
    sink: &Arc<dyn Fn(UnaffiliatedResult) + Send + Sync>,
    strict_protocol: bool,
) {
    if frame.tag == tags::NOTIFICATION_RESPONSE {
        match parse_notification(&frame.payload) {
            Some(notification) => sink(notification),
            None => sink(UnaffiliatedResult::ProtocolError(
                "malformed NotificationResponse".into(),
            )),
        }
        return;
    }

    if frame.tag == tags::ERROR_RESPONSE {
        let (sqlstate, message) = match error_response(frame.tag, &frame.payload) {
            MessageOutcome::Matched(fields) => (
                fields.sqlstate.unwrap_or_default(),
                fields.message.unwrap_or_default(),
            ),
            _ => (String::new(), "malformed ErrorResponse frame".to_string()),
        };
        if let Some(processor) = pending.pop_front() {
            processor.fail(Error::Backend { sqlstate, message });
        } else {
            sink(UnaffiliatedResult::BackendErrorOutsideRequest { sqlstate, message });
        }
        return;
    }

    if frame.tag == tags::NOTICE_RESPONSE {
        tracing::info!("interpreter: received NoticeResponse");
        return;
    }

    let Some(mut processor) = pending.pop_front() else {
        route_unaffiliated_tag(frame.tag, sink, strict_protocol);
        return;
    };

    let tag = frame.tag;
    match processor.offer(frame) {
        ProcessorStep::NeedMore => pending.push_front(processor),
        ProcessorStep::Done => {}
        // The frame is unaffiliated with *this* processor, not fatal to it:
        // spec.md's interpreter step 3 says "route to 4.5.1 but do not
        // retire the processor". It goes back to the front of the queue to
        // keep offering it the frames that follow.
        ProcessorStep::Rejected => {
            pending.push_front(processor);
            route_unaffiliated_tag(tag, sink, strict_protocol);
        }
    }
}

fn route_unaffiliated_tag(
    tag: u8,
    sink: &Arc<dyn Fn(UnaffiliatedResult) + Send + Sync>,
    strict_protocol: bool,
) {
    if strict_protocol {
        sink(UnaffiliatedResult::ProtocolError(format!(
            "unexpected tag {:?} with no request pending",
            tag as char
        )));
    } else {
        tracing::trace!(tag, "interpreter: dropping unaffiliated frame");
    }
}

fn parse_notification(payload: &Bytes) -> Option<UnaffiliatedResult> {
    if payload.len() < 4 {
        return None;
    }
    let pid = i32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
    let mut pos = 4usize;
    let channel = read_cstr(payload, &mut pos).ok()?;
    let message_payload = read_cstr(payload, &mut pos).ok()?;
    Some(UnaffiliatedResult::Notification {
        pid,
        channel,
        payload: message_payload,
    })
}
