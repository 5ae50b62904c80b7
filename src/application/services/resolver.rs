//! Deployment environment resolution
//!
//! Derives a stable `ResolvedEnvironment` from an explicit environment
//! name, CI branch variables, or a local git query. Stack naming, DNS
//! records and e2e test base URLs all consume this one result, so it must
//! be deterministic for a fixed process environment and must never fail.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::Settings;
use crate::domain::{
    sanitize_branch_name, EnvironmentConfig, ResolvedEnvironment, StaticEnvironment,
    LOCAL_FALLBACK,
};
use crate::infrastructure::traits::BranchProvider;

/// Snapshot of the CI-provided branch variables.
///
/// `head_ref` is only set for pull-request triggered builds and carries
/// the PR source branch; `ref_name` covers every other trigger. Captured
/// once at startup and passed in explicitly so the resolver itself never
/// reads ambient process state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiContext {
    pub head_ref: Option<String>,
    pub ref_name: Option<String>,
}

impl CiContext {
    /// Capture the GitHub Actions branch variables from the process
    /// environment. Empty values count as absent.
    pub fn from_env() -> Self {
        Self {
            head_ref: non_empty_var("GITHUB_HEAD_REF"),
            ref_name: non_empty_var("GITHUB_REF_NAME"),
        }
    }

    /// First authoritative CI branch signal, if any.
    ///
    /// Each variable is checked for non-emptiness on its own: a set but
    /// empty `head_ref` must not shadow a usable `ref_name`.
    fn branch(&self) -> Option<&str> {
        self.head_ref
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.ref_name.as_deref().filter(|s| !s.is_empty()))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Service resolving deployment environments.
///
/// Infallible by contract: every internal failure degrades to a
/// documented fallback instead of surfacing to the caller.
pub struct ResolverService {
    settings: Arc<Settings>,
    ci: CiContext,
    branch: Arc<dyn BranchProvider>,
}

impl ResolverService {
    pub fn new(settings: Arc<Settings>, ci: CiContext, branch: Arc<dyn BranchProvider>) -> Self {
        Self {
            settings,
            ci,
            branch,
        }
    }

    /// Resolve the deployment environment.
    ///
    /// A requested name that is one of the static environments (`dev`,
    /// `stage`, `prod`) passes through unchanged; any other value,
    /// including none at all, triggers branch-based derivation. The
    /// deployment name is always sanitized before lookup or synthesis.
    pub fn resolve(&self, requested: Option<&str>) -> ResolvedEnvironment {
        let deployment = match requested.and_then(|r| r.parse::<StaticEnvironment>().ok()) {
            Some(env) => env.as_str().to_string(),
            None => self.current_branch(),
        };
        debug!("resolve: deployment={}", deployment);

        let config = self.config_for(&deployment);

        ResolvedEnvironment {
            backend_subdomain: config.backend_subdomain,
            frontend_subdomain: config.frontend_subdomain,
            deployment,
        }
    }

    /// Determine the sanitized name of what is currently being built.
    ///
    /// Precedence: CI pull-request source branch, then CI ref name, then
    /// the local git query. Detached HEAD and every failure in the chain
    /// fall back to `"local"`; this must never abort a build.
    pub fn current_branch(&self) -> String {
        let raw = match self.ci.branch() {
            Some(ci_branch) => {
                debug!("current_branch: from CI: {}", ci_branch);
                ci_branch.to_string()
            }
            None => match self.branch.current_branch() {
                Ok(name) if name == "HEAD" => {
                    debug!("current_branch: detached HEAD, falling back to {LOCAL_FALLBACK}");
                    return LOCAL_FALLBACK.to_string();
                }
                Ok(name) if name.is_empty() => {
                    warn!("current_branch: git returned no branch name, falling back to {LOCAL_FALLBACK}");
                    return LOCAL_FALLBACK.to_string();
                }
                Ok(name) => name,
                Err(e) => {
                    warn!("current_branch: git query failed ({e}), falling back to {LOCAL_FALLBACK}");
                    return LOCAL_FALLBACK.to_string();
                }
            },
        };

        let sanitized = sanitize_branch_name(&raw);
        if sanitized.is_empty() {
            let default = &self.settings.default_environment;
            warn!("current_branch: {raw:?} sanitized to empty, falling back to {default}");
            default.clone()
        } else {
            sanitized
        }
    }

    /// Look up the curated config for `name`, or synthesize one.
    ///
    /// Curated environments keep their hand-assigned subdomains; every
    /// other (already sanitized) name gets a mechanically derived pair,
    /// so no registration step exists for preview environments.
    pub fn config_for(&self, name: &str) -> EnvironmentConfig {
        debug_assert!(!name.is_empty(), "caller must substitute the default env");

        if let Some(entry) = self.settings.environments.get(name) {
            debug!("config_for: curated entry for {}", name);
            return entry.clone();
        }

        debug!("config_for: synthesizing config for {}", name);
        EnvironmentConfig {
            backend_subdomain: format!("{}-{}", name, self.settings.backend_suffix),
            frontend_subdomain: format!("{}-{}", name, self.settings.frontend_suffix),
        }
    }
}
