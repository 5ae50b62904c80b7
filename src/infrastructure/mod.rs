//! Infrastructure layer: I/O implementations and DI container
//!
//! This layer implements I/O boundary traits and wires up services.
//! Infrastructure failures (git query, filesystem) surface as `io::Error`
//! through the traits; services recover or wrap them, so no separate
//! infra error type exists.

pub mod di;
pub mod traits;
