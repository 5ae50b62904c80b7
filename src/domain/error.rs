//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invariant violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("not a static environment: {0}")]
    NotStatic(String),

    #[error("environment {environment}: subdomain is not a valid DNS label: {subdomain}")]
    InvalidSubdomain {
        environment: String,
        subdomain: String,
    },
}
