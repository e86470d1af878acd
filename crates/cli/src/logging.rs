//! Logging setup.
//!
//! Events go to stderr so `--json` output on stdout stays machine-readable.
//! `RUST_LOG` overrides the default `info` filter, e.g.
//! `RUST_LOG=rowmatch::progress=warn` silences progress messages.

use tracing_subscriber::{fmt, EnvFilter};

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
