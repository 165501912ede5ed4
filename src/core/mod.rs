//! Core layer — configuration, the application context, and shared process
//! state. Everything here is built once during bootstrap and read-only
//! afterwards.

pub mod config;
pub mod context;
pub mod timezone;
