//! Logger module
//!
//! Provides logging utilities for the dev server including:
//! - Startup banner
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::LogLevel;

use crate::config::{Config, LoggingConfig};

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    writer::init(
        config.access_log_file.as_deref(),
        config.error_log_file.as_deref(),
        LogLevel::parse(&config.level),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

fn write_warning(message: &str) {
    match writer::get() {
        Some(w) => w.write_warning(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(config: &Config) {
    let base = config.public_url();
    write_info(&format!("Starting CORS-enabled server on {base}"));
    write_info(&format!(
        "Proxy endpoint: {base}{}<target_url>",
        config.proxy.route_prefix()
    ));
}

pub fn log_serving_root(root: &std::path::Path, concurrent: bool) {
    write_info(&format!("[Static] Serving files from: {}", root.display()));
    if concurrent {
        write_info("[Server] Connections are served concurrently");
    }
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_warning(&format!("[WARN] {message}"));
}

/// Error reply sent to a client: `code 502, message Failed to fetch: ...`
pub fn log_error_reply(status: u16, message: &str) {
    write_warning(&format!("[WARN] code {status}, message {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
