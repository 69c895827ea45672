pub mod config;
pub mod dispatcher;
pub mod error;
pub mod frame;
pub mod parser;
pub mod result_processor;
pub mod sink;
pub mod stream;
pub mod tags;

pub(crate) mod latch;
pub(crate) mod queues;
pub(crate) mod stages;

// Re-export the pieces a caller needs to construct and drive a dispatcher.
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use error::Error;
pub use frame::Frame;
pub use result_processor::{EncoderJob, ResultProcessor};
pub use sink::{UnaffiliatedResult, UnaffiliatedSink};

/// A specialized `Result` type for dispatcher operations.
///
/// # Examples
///
/// This example submits one request over an already-connected socket and
/// reads back the number of rows affected:
///
/// ```rust,no_run
/// use pgpipeline::{Config, Dispatcher, UnaffiliatedResult};
/// use pgpipeline::stream::combinators::rows_affected;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let socket = tokio::net::TcpStream::connect("127.0.0.1:5432").await?;
///
///     let dispatcher = Dispatcher::connect(socket, Config::default(), |event| match event {
///         UnaffiliatedResult::Notification { channel, payload, .. } => {
///             println!("notify {channel}: {payload}");
///         }
///         other => eprintln!("unaffiliated: {other:?}"),
///     });
///
///     let affected = dispatcher
///         .submit(
///             Box::new(|buf| {
///                 // A real caller encodes a well-formed frontend message here.
///                 buf.extend_from_slice(b"Q\0\0\0\x0eSELECT 1\0");
///             }),
///             rows_affected(),
///         )
///         .await?;
///
///     println!("rows affected: {affected}");
///     dispatcher.stop().await;
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;
