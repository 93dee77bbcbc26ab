use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Log filter variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "POSTDESK_LOG";

/// Installs the global fmt subscriber.
///
/// Output goes to stderr so command output on stdout stays machine-readable.
/// `POSTDESK_LOG` takes precedence over `RUST_LOG`; without either, `info`
/// and above are shown. Calling this twice is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_timer(UtcTime::rfc_3339())
        .try_init();
}
