//! HTTP integration
//!
//! This module binds the validation engine to axum: a tower layer for
//! `Router::route_layer` and an equivalent function middleware.

pub mod layer;

pub use layer::{ValidationLayer, ValidationService, guard, read_sources, validate_payload};
