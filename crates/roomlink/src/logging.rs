//! Tracing bootstrap for applications built on roomlink.
//!
//! The library crates only emit `tracing` events; nothing is printed until
//! the application installs a subscriber. [`init`] is the usual one.

use std::env;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Installs a global `fmt` subscriber.
///
/// The filter comes from `RUST_LOG`, then `ROOMLINK_LOG`, then defaults to
/// `info`. Calling this more than once is harmless; later calls do nothing.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(filter_from_env())
        .try_init();
}

fn filter_from_env() -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    env::var("ROOMLINK_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}
