//! Domain entities: environment names, configs and resolution results

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Fallback deployment name when no branch can be determined.
pub const LOCAL_FALLBACK: &str = "local";

/// Maximum length of a DNS label.
const DNS_LABEL_MAX: usize = 63;

static NON_LABEL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9-]").expect("valid regex"));

/// Strip every character that is not an ASCII letter, digit, or hyphen.
///
/// Total and idempotent; applied to every branch name before it is used
/// as a DNS-label fragment or environment key.
pub fn sanitize_branch_name(raw: &str) -> String {
    NON_LABEL_CHARS.replace_all(raw, "").into_owned()
}

/// Check whether `s` is a valid DNS label (letters, digits, hyphens,
/// non-empty, at most 63 chars).
pub fn is_dns_label(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= DNS_LABEL_MAX
        && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// One of the fixed, curated deployment targets.
///
/// Any other name is an ephemeral branch-derived environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticEnvironment {
    Dev,
    Stage,
    Prod,
}

impl StaticEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaticEnvironment::Dev => "dev",
            StaticEnvironment::Stage => "stage",
            StaticEnvironment::Prod => "prod",
        }
    }
}

impl FromStr for StaticEnvironment {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(StaticEnvironment::Dev),
            "stage" => Ok(StaticEnvironment::Stage),
            "prod" => Ok(StaticEnvironment::Prod),
            other => Err(DomainError::NotStatic(other.to_string())),
        }
    }
}

impl fmt::Display for StaticEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subdomain pair for one deployment target.
///
/// Curated entries come from the settings table; everything else is
/// synthesized from the deployment name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub backend_subdomain: String,
    pub frontend_subdomain: String,
}

impl EnvironmentConfig {
    /// Validate the DNS-label invariant on both subdomains.
    pub fn validate(&self, name: &str) -> Result<(), DomainError> {
        for subdomain in [&self.backend_subdomain, &self.frontend_subdomain] {
            if !is_dns_label(subdomain) {
                return Err(DomainError::InvalidSubdomain {
                    environment: name.to_string(),
                    subdomain: subdomain.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Output of environment resolution.
///
/// Created fresh on each resolution, never mutated afterwards. All
/// downstream names (stack, stage, URLs) derive from this one value so
/// independent consumers agree with each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEnvironment {
    pub backend_subdomain: String,
    pub frontend_subdomain: String,
    /// The environment name the stack is deployed under (static name or
    /// sanitized branch name).
    pub deployment: String,
}

impl ResolvedEnvironment {
    /// Stack name for this deployment, e.g. `FinalStack-dev`.
    pub fn stack_name(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.deployment)
    }

    /// API deployment stage tier.
    ///
    /// `prod` keeps its own stage; `dev` and `stage` share the dev tier;
    /// branch environments get a temp stage named after the branch.
    pub fn stage_name(&self) -> &str {
        match self.deployment.parse::<StaticEnvironment>() {
            Ok(StaticEnvironment::Prod) => "prod",
            Ok(_) => "dev",
            Err(_) => &self.deployment,
        }
    }

    /// Backend base URL under the given apex domain.
    pub fn backend_url(&self, domain: &str) -> String {
        format!("https://{}.{}", self.backend_subdomain, domain)
    }

    /// Frontend base URL under the given apex domain.
    pub fn frontend_url(&self, domain: &str) -> String {
        format!("https://{}.{}", self.frontend_subdomain, domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("feature/login", "featurelogin")]
    #[case("my_branch!", "mybranch")]
    #[case("release-1.2.3", "release-123")]
    #[case("main", "main")]
    #[case("", "")]
    #[case("!!!", "")]
    #[case("Tüpfel/öäü", "Tpfel")]
    fn given_raw_branch_when_sanitizing_then_strips_non_label_chars(
        #[case] raw: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(sanitize_branch_name(raw), expected);
    }

    #[rstest]
    #[case("feature/login")]
    #[case("weird !@#$%^&*() name")]
    #[case("already-clean-123")]
    fn given_any_input_when_sanitizing_twice_then_result_is_stable(#[case] raw: &str) {
        let once = sanitize_branch_name(raw);
        assert_eq!(sanitize_branch_name(&once), once);
        assert!(once.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-'));
    }

    #[test]
    fn given_static_names_when_parsing_then_round_trips() {
        for name in ["dev", "stage", "prod"] {
            let env: StaticEnvironment = name.parse().unwrap();
            assert_eq!(env.as_str(), name);
        }
        assert!("feature-x".parse::<StaticEnvironment>().is_err());
        assert!("Dev".parse::<StaticEnvironment>().is_err());
    }

    #[test]
    fn given_valid_subdomains_when_validating_then_ok() {
        let config = EnvironmentConfig {
            backend_subdomain: "dev-backend-cdk-book".to_string(),
            frontend_subdomain: "dev-frontend-cdk-book".to_string(),
        };
        assert!(config.validate("dev").is_ok());
    }

    #[test]
    fn given_invalid_subdomain_when_validating_then_reports_environment() {
        let config = EnvironmentConfig {
            backend_subdomain: "has.dots".to_string(),
            frontend_subdomain: "ok".to_string(),
        };
        let err = config.validate("prod").unwrap_err();
        assert!(err.to_string().contains("prod"));
        assert!(err.to_string().contains("has.dots"));
    }

    #[test]
    fn given_resolved_environment_when_deriving_names_then_consistent() {
        let resolved = ResolvedEnvironment {
            backend_subdomain: "featurelogin-backend-cdk-book".to_string(),
            frontend_subdomain: "featurelogin-frontend-cdk-book".to_string(),
            deployment: "featurelogin".to_string(),
        };
        assert_eq!(resolved.stack_name("FinalStack"), "FinalStack-featurelogin");
        assert_eq!(resolved.stage_name(), "featurelogin");
        assert_eq!(
            resolved.backend_url("example.com"),
            "https://featurelogin-backend-cdk-book.example.com"
        );
    }

    #[test]
    fn given_static_deployments_when_deriving_stage_then_tiers_collapse() {
        let mk = |deployment: &str| ResolvedEnvironment {
            backend_subdomain: "b".to_string(),
            frontend_subdomain: "f".to_string(),
            deployment: deployment.to_string(),
        };
        assert_eq!(mk("prod").stage_name(), "prod");
        assert_eq!(mk("stage").stage_name(), "dev");
        assert_eq!(mk("dev").stage_name(), "dev");
    }
}
