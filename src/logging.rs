//! Log setup. The terminal belongs to the dashboard, so everything goes to
//! a file; `RUST_LOG` overrides the default `info` filter.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub fn init(log_file: &Path) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init();

    Ok(())
}
