//! Tracing subscriber setup for the binary.

/// Install the global subscriber. `RUST_LOG` wins when set; otherwise the
/// verbose flag picks between `warn` and `debug` for this crate.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("chama_chat={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
