//! Infrastructure adapters. Implement outbound ports.
//!
//! REST API, in-memory backend, local workspace file, terminal UI. Map errors to DomainError.

pub mod http;
pub mod memory;
pub mod persistence;
pub mod ui;
