// ABOUTME: Tunables for the dispatcher's I/O and routing behavior
// ABOUTME: A single Default-able struct bundling the dispatcher's tunables

/// Dispatcher configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Size of the fixed buffer the Receiver reads into. Default 8 KiB.
    pub read_buffer_size: usize,

    /// Depth of the bounded channel between Serializer and Sender. Large
    /// rather than truly unbounded, so a runaway producer gets backpressure
    /// instead of unbounded memory growth (see DESIGN.md).
    pub outbound_queue_depth: usize,

    /// When `true` (default), an unexpected tag arriving with no processor
    /// pending is a `ProtocolError` delivered to the unaffiliated sink.
    /// When `false`, it is silently dropped. Not recommended.
    pub strict_protocol: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            read_buffer_size: 8192,
            outbound_queue_depth: 1024,
            strict_protocol: true,
        }
    }
}
