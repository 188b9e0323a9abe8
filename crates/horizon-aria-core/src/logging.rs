//! Logging facilities for Horizon ARIA.
//!
//! Horizon ARIA uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in the application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_aria=debug,horizon_aria_core=trace")
//!         .init();
//! }
//! ```
//!
//! Effect runs and event dispatch log at `trace`, behavior lifecycle at
//! `debug`, and runaway flushes or self-referencing bindings at `error`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core target.
    pub const CORE: &str = "horizon_aria_core";
    /// Reactive runtime target (flushes, effect runs, binding evaluation).
    pub const RUNTIME: &str = "horizon_aria_core::runtime";
    /// Event dispatcher target.
    pub const DISPATCHER: &str = "horizon_aria_core::dispatcher";
    /// Behavior lifecycle and key handling target.
    pub const BEHAVIOR: &str = "horizon_aria::behavior";
    /// Composed listbox target.
    pub const LISTBOX: &str = "horizon_aria::listbox";
}

/// Macros for common tracing patterns.
///
/// Thin wrappers around the `tracing` macros with the core target.
#[macro_export]
macro_rules! aria_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "horizon_aria_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! aria_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "horizon_aria_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! aria_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "horizon_aria_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! aria_error {
    ($($arg:tt)*) => {
        tracing::error!(target: "horizon_aria_core", $($arg)*)
    };
}
