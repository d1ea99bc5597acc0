use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
}

/// Human-readable logs on stdout, `RUST_LOG` overriding the `info` default.
pub fn init() {
    tracing_subscriber::fmt().with_env_filter(filter()).init();
}

/// Same as [`init`] but appending to `path`, for processes that own the terminal.
pub fn init_to_file(path: &Path) -> std::io::Result<()> {
    let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
