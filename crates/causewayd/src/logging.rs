use tracing_subscriber::EnvFilter;

use crate::cli::LogFormat;

const DEFAULT_LOG_FILTER: &str = "warn";

/// Installs the stderr subscriber. `RUST_LOG` overrides the default filter;
/// stdout is left for command output.
pub fn init_logging(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let result = match format {
        LogFormat::Human => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(err) = result {
        eprintln!("causewayd: logging already initialized: {err}");
    }
}
