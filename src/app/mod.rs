// LogRoute - app/mod.rs
//
// Application layer: category loading, streaming routing, host logging
// integration, output.
// Dependencies: core and platform layers.

pub mod category_mgr;
pub mod output;
pub mod route;
pub mod tracing_filter;
