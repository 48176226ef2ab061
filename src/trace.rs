use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global `tracing` subscriber.
///
/// `levels` is an env-filter directive such as `"info"` or
/// `"vector_vm=trace"`. Later calls are ignored, since tests can initialize
/// this multiple times.
pub fn init(color: bool, json: bool, levels: &str) {
    let filter = EnvFilter::try_new(levels).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);

    let _ = if json {
        builder.json().flatten_event(true).try_init()
    } else {
        builder.with_ansi(color).try_init()
    };
}
