//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{CiContext, EnvFileService, ResolverService};
use crate::config::Settings;
use crate::infrastructure::traits::{
    BranchProvider, CommandRunner, FileSystem, GitBranchProvider, RealCommandRunner,
    RealFileSystem,
};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Deployment environment resolver
    pub resolver: ResolverService,

    /// Env-file and stack-name writer
    pub env_file: EnvFileService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    ///
    /// The CI context is snapshotted from the process environment here;
    /// nothing downstream reads ambient state.
    pub fn new(settings: Settings) -> Self {
        let cmd: Arc<dyn CommandRunner> = Arc::new(RealCommandRunner);
        Self::with_deps(
            settings,
            CiContext::from_env(),
            Arc::new(RealFileSystem),
            Arc::new(GitBranchProvider::new(cmd)),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        ci: CiContext,
        fs: Arc<dyn FileSystem>,
        branch: Arc<dyn BranchProvider>,
    ) -> Self {
        let settings = Arc::new(settings);
        let resolver = ResolverService::new(settings.clone(), ci, branch);
        let env_file = EnvFileService::new(fs.clone());

        Self {
            settings,
            fs,
            resolver,
            env_file,
        }
    }
}
