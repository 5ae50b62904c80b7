//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, BranchProvider)
//! but are themselves concrete structs, not traits.

mod envfile;
mod resolver;

pub use envfile::EnvFileService;
pub use resolver::{CiContext, ResolverService};
