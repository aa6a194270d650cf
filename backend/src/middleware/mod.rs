//! Request-scoped middleware shared by every inbound transport.

pub mod trace;

pub use trace::{Trace, TraceId};
