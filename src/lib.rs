//! depenv: deployment environment resolver
//!
//! Derives stable `{backend_subdomain, frontend_subdomain, deployment}`
//! tuples from an explicit environment name, CI branch variables, or a
//! local git query, so infrastructure synthesis, e2e test config and CI
//! env-file writers all agree on names.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
