//! Debug logging helpers gated by [`DebugOptions`]
//!
//! Everything is routed through the `log` facade. Messages are emitted at
//! `debug` level by default and promoted to `info` when the caller turned
//! debugging on for the search.

use crate::types::DebugOptions;

const TARGET: &str = "search_terminal";

fn enabled(options: &Option<DebugOptions>) -> bool {
    options.as_ref().map(|o| o.enabled).unwrap_or(false)
}

/// Log a message, louder when debugging is enabled
pub fn log(options: &Option<DebugOptions>, message: &str, data: &str) {
    if enabled(options) {
        log::info!(target: TARGET, "{message}: {data}");
    } else {
        log::debug!(target: TARGET, "{message}: {data}");
    }
}

/// Log request details if request logging is enabled
pub fn log_request(options: &Option<DebugOptions>, message: &str, data: &str) {
    match options {
        Some(opts) if opts.enabled && opts.log_requests => {
            log::info!(target: TARGET, "REQUEST: {message}: {data}");
        }
        _ => log::trace!(target: TARGET, "REQUEST: {message}: {data}"),
    }
}

/// Log response details if response logging is enabled
pub fn log_response(options: &Option<DebugOptions>, message: &str) {
    match options {
        Some(opts) if opts.enabled && opts.log_responses => {
            log::info!(target: TARGET, "RESPONSE: {message}");
        }
        _ => log::trace!(target: TARGET, "RESPONSE: {message}"),
    }
}

/// Create default debug options with all logging enabled
pub fn debug_all() -> DebugOptions {
    DebugOptions {
        enabled: true,
        log_requests: true,
        log_responses: true,
    }
}
