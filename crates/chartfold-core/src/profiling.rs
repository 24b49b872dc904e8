//! Profiling utilities based on the `puffin` crate.
//!
//! With the `profiling` feature disabled the scope macros expand to nothing,
//! so call sites never need their own `cfg` guards.

#[cfg(feature = "profiling")]
use std::sync::OnceLock;

#[cfg(feature = "profiling")]
pub use puffin::{profile_function, profile_scope};

#[cfg(not(feature = "profiling"))]
pub use crate::{profile_function, profile_scope};

#[cfg(not(feature = "profiling"))]
#[doc(hidden)]
#[macro_export]
macro_rules! profile_function {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "profiling"))]
#[doc(hidden)]
#[macro_export]
macro_rules! profile_scope {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "profiling")]
static PROFILING_SERVER: OnceLock<puffin_http::Server> = OnceLock::new();

/// Enable puffin scopes and serve them over HTTP for `puffin_viewer`.
///
/// ```no_run
/// chartfold_core::profiling::init_profiling("0.0.0.0:8585");
/// ```
#[cfg(feature = "profiling")]
pub fn init_profiling(bind_addr: &str) {
    puffin::set_scopes_on(true);

    match puffin_http::Server::new(bind_addr) {
        Ok(server) => {
            tracing::info!("Puffin profiler server started on http://{}", bind_addr);
            let _ = PROFILING_SERVER.set(server);
        }
        Err(e) => {
            tracing::error!("Failed to start puffin server: {}", e);
        }
    }
}

/// No-op when profiling is compiled out.
#[cfg(not(feature = "profiling"))]
pub fn init_profiling(_bind_addr: &str) {}

/// Mark the start of a new scheduler frame.
#[inline]
pub fn new_frame() {
    #[cfg(feature = "profiling")]
    puffin::GlobalProfiler::lock().new_frame();
}
