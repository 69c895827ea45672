// ABOUTME: Destination for frames that belong to no pending request
// ABOUTME: A function-shaped collaborator, matching the row/value decoders this crate treats as external

/// A frame or event with no affiliated request.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum UnaffiliatedResult {
    /// An async `NOTIFY`.
    Notification {
        pid: i32,
        channel: String,
        payload: String,
    },
    /// An `ErrorResponse` frame received with no processor pending.
    BackendErrorOutsideRequest { sqlstate: String, message: String },
    /// An unrecognized tag, or a framing violation, with no processor pending.
    ProtocolError(String),
}

/// Receiver for [`UnaffiliatedResult`]s, supplied at [`crate::Dispatcher`] construction.
pub trait UnaffiliatedSink: Fn(UnaffiliatedResult) + Send + Sync + 'static {}

impl<F> UnaffiliatedSink for F where F: Fn(UnaffiliatedResult) + Send + Sync + 'static {}
