// LogRoute - core/mod.rs
//
// Core business logic layer: categories, classification, routing.
// Must NOT depend on: app, platform, or any I/O.

pub mod category;
pub mod classifier;
pub mod model;
pub mod router;
