//! Invocation host surface
//!
//! The core treats the host's invocation context as opaque: it is handed to
//! every handler unmodified, and the dispatcher itself only touches the one
//! capability modeled here.

/// Logging capability the dispatcher needs from the invocation host.
///
/// Handlers receive the full context by reference; the dispatcher only
/// calls [`log`](InvocationContext::log) when raw-message logging has been
/// enabled.
pub trait InvocationContext {
    /// Write one diagnostic line to the host's log.
    fn log(&self, message: &str);
}

/// Discards all log output. Handy when no host context is available.
impl InvocationContext for () {
    fn log(&self, _message: &str) {}
}
