// ABOUTME: Example application demonstrating a pipelined query submission over an already-bound socket
// ABOUTME: Assumes the startup/authentication handshake already ran; that is out of this crate's scope

use std::error::Error;

use argh::FromArgs;
use pgpipeline::stream::combinators::rows_affected;
use pgpipeline::{Config, Dispatcher, UnaffiliatedResult};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Submit a simple-query message over a raw socket and print the affected-row count.
///
/// This demo skips TLS negotiation and the startup/authentication handshake
/// entirely: it assumes `host:port` is already speaking the post-handshake
/// protocol, e.g. a test fixture or a proxy that completed the handshake.
#[derive(FromArgs)]
struct CliArgs {
    /// whether or not to enable debug-level tracing
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// the backend host (default: localhost)
    #[argh(option)]
    host: Option<String>,

    /// the backend port (default: 5432)
    #[argh(option, short = 'p')]
    port: Option<u32>,

    /// the SQL text to submit as a simple-query message
    #[argh(option, short = 'q')]
    query: String,
}

fn encode_simple_query(sql: &str) -> pgpipeline::EncoderJob {
    let sql = sql.to_owned();
    Box::new(move |buf| {
        buf.extend_from_slice(b"Q");
        let body_len = sql.len() + 1 + 4; // NUL terminator + the length field itself
        buf.extend_from_slice(&(body_len as u32).to_be_bytes());
        buf.extend_from_slice(sql.as_bytes());
        buf.extend_from_slice(b"\0");
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = argh::from_env();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli_args.debugging { Level::TRACE } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let host = cli_args.host.unwrap_or_else(|| "localhost".to_owned());
    let port = cli_args.port.unwrap_or(5432);

    println!("Connecting to {host}:{port}");
    let socket = tokio::net::TcpStream::connect((host.as_str(), port as u16)).await?;

    let dispatcher = Dispatcher::connect(socket, Config::default(), |event| match event {
        UnaffiliatedResult::Notification { channel, payload, .. } => {
            println!("notify {channel}: {payload}");
        }
        UnaffiliatedResult::BackendErrorOutsideRequest { sqlstate, message } => {
            eprintln!("backend error outside request ({sqlstate}): {message}");
        }
        UnaffiliatedResult::ProtocolError(details) => {
            eprintln!("protocol error: {details}");
        }
        other => eprintln!("unaffiliated: {other:?}"),
    });

    match dispatcher.submit(encode_simple_query(&cli_args.query), rows_affected()).await {
        Ok(affected) => {
            println!("rows affected: {affected}");
            dispatcher.stop().await;
            Ok(())
        }
        Err(err) => {
            eprintln!("query failed: {err}");
            dispatcher.stop().await;
            Err(Box::new(err))
        }
    }
}
