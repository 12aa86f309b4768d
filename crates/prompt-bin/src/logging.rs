//! Startup logging and panic-hook setup, grounded in the teacher's
//! `AppStartup::configure_logging`/`install_panic_hook` pattern. Logging
//! always targets a file: stdout/stderr are reserved for the terminal UI
//! and the final printed command line.

use std::sync::Once;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

static PANIC_HOOK: Once = Once::new();

fn log_dir() -> std::path::PathBuf {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("prompt")
}

/// Configure a non-blocking file appender and install it as the global
/// `tracing` subscriber. Returns the guard that must be held for the
/// lifetime of the process to flush buffered log lines on exit.
pub fn configure_logging() -> Result<WorkerGuard> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir)?;

    let file_appender = tracing_appender::rolling::never(&dir, "prompt.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(writer)
        .with_ansi(false)
        .try_init();

    Ok(guard)
}

/// Wrap the default panic hook with a `tracing::error!` call so panics are
/// recorded even though the terminal is in raw mode when they happen.
pub fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = crossterm::terminal::disable_raw_mode();
            tracing::error!(%info, "panic");
            default_hook(info);
        }));
    });
}
