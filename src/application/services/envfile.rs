//! Env-file persistence for resolved deployments
//!
//! Writes the plain `KEY=VALUE` artifacts later scripts reuse: the
//! resolution env file and the stack-name file.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use itertools::Itertools;
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::ResolvedEnvironment;
use crate::infrastructure::traits::FileSystem;

/// Service writing resolution artifacts as plain key=value files.
pub struct EnvFileService {
    fs: Arc<dyn FileSystem>,
}

impl EnvFileService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Render pairs as `KEY=VALUE` lines, newline-joined, no escaping.
    ///
    /// BTreeMap iteration keeps the output deterministic.
    pub fn render(pairs: &BTreeMap<String, String>) -> String {
        let body = pairs.iter().map(|(k, v)| format!("{k}={v}")).join("\n");
        format!("{body}\n")
    }

    /// The standard exported key set for one resolution.
    pub fn resolution_pairs(
        resolved: &ResolvedEnvironment,
        settings: &Settings,
    ) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("DEPLOYMENT".to_string(), resolved.deployment.clone()),
            ("STAGE_NAME".to_string(), resolved.stage_name().to_string()),
            (
                "STACK_NAME".to_string(),
                resolved.stack_name(&settings.stack_prefix),
            ),
            (
                "BACKEND_SUBDOMAIN".to_string(),
                resolved.backend_subdomain.clone(),
            ),
            (
                "FRONTEND_SUBDOMAIN".to_string(),
                resolved.frontend_subdomain.clone(),
            ),
            (
                "BACKEND_URL".to_string(),
                resolved.backend_url(&settings.domain),
            ),
            (
                "FRONTEND_URL".to_string(),
                resolved.frontend_url(&settings.domain),
            ),
        ])
    }

    /// Write pairs to `path`, creating parent directories as needed.
    pub fn write_env_file(
        &self,
        path: &Path,
        pairs: &BTreeMap<String, String>,
    ) -> ApplicationResult<()> {
        debug!("write_env_file: {} ({} keys)", path.display(), pairs.len());
        self.fs
            .ensure_parent(path)
            .and_then(|_| self.fs.write(path, &Self::render(pairs)))
            .map_err(|e| ApplicationError::Write {
                path: path.to_path_buf(),
                source: e,
            })
    }

    /// Persist the stack name for later scripts (deploy, teardown, e2e).
    pub fn write_stack_name(
        &self,
        path: &Path,
        resolved: &ResolvedEnvironment,
        settings: &Settings,
    ) -> ApplicationResult<()> {
        let stack_name = resolved.stack_name(&settings.stack_prefix);
        debug!("write_stack_name: {} -> {}", stack_name, path.display());
        self.fs
            .ensure_parent(path)
            .and_then(|_| self.fs.write(path, &stack_name))
            .map_err(|e| ApplicationError::Write {
                path: path.to_path_buf(),
                source: e,
            })
    }
}
