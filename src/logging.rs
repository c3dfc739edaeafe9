//! Tracing setup for host applications
//!
//! Builds an env-filtered subscriber with a reload handle, so
//! [`GraphSession::set_log_level`](crate::session::GraphSession::set_log_level)
//! can retune host-side verbosity at runtime with the same integer levels
//! the controller uses (0 = error .. 4 = trace, negative = off).

use std::sync::OnceLock;

use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

static RELOAD_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Map the controller's integer log level to a tracing filter directive
pub fn filter_directive(level: i32) -> &'static str {
    match level {
        i32::MIN..=-1 => "off",
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    }
}

/// Initialize logging, honoring `RUST_LOG` when set
///
/// Safe to call more than once; only the first call installs the global
/// subscriber.
pub fn init(level: i32) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));
    let (filter, handle) = reload::Layer::new(filter);
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok();
    if installed {
        let _ = RELOAD_HANDLE.set(handle);
    }
}

/// Retune the host-side filter installed by [`init`]
///
/// A no-op when [`init`] has not run (e.g. the host installed its own
/// subscriber).
pub fn set_level(level: i32) {
    if let Some(handle) = RELOAD_HANDLE.get() {
        let _ = handle.reload(EnvFilter::new(filter_directive(level)));
    }
}
