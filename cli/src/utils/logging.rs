/// Initialize the global tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `debug` picks between debug and warn
/// output. Logs go to stderr so that machine-readable stdout stays clean.
/// Returns false when another subscriber was already installed.
pub fn init_logging(debug: bool) -> bool {
    let level = if debug { "debug" } else { "warn" };

    let result = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(debug)
        .with_file(debug)
        .try_init();

    match result {
        Ok(()) => {
            tracing::debug!("Logging initialized at {} level", level);
            true
        }
        Err(e) => {
            // Global subscriber already set; keep the caller's
            tracing::debug!("Keeping existing tracing subscriber: {}", e);
            false
        }
    }
}
