// LogRoute - lib.rs
//
// Library entry point. The classifier, category catalog, and tracing
// integration are usable programmatically; `main.rs` is a thin CLI on top.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
