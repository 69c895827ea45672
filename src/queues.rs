// ABOUTME: Channel type aliases wiring the five stages together
// ABOUTME: Centralized here so a change in queue depth or channel kind touches one file

use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc;

use crate::frame::Frame;
use crate::result_processor::{EncoderJob, ResultProcessor};

pub type SerializerSender = mpsc::UnboundedSender<EncoderJob>;
pub type SerializerReceiver = mpsc::UnboundedReceiver<EncoderJob>;

pub type OutboundSender = mpsc::Sender<Bytes>;
pub type OutboundReceiver = mpsc::Receiver<Bytes>;

pub type InboundSender = mpsc::Sender<BytesMut>;
pub type InboundReceiver = mpsc::Receiver<BytesMut>;

pub type FrameSender = mpsc::UnboundedSender<Frame>;
pub type FrameReceiver = mpsc::UnboundedReceiver<Frame>;

pub type ResultProcessorSender = mpsc::UnboundedSender<ResultProcessor>;
pub type ResultProcessorReceiver = mpsc::UnboundedReceiver<ResultProcessor>;
