//! Tests for ResolverService

use std::io;
use std::sync::Arc;

use rstest::rstest;

use depenv::application::services::{CiContext, ResolverService};
use depenv::config::Settings;
use depenv::domain::EnvironmentConfig;
use depenv::infrastructure::traits::BranchProvider;

/// Branch provider returning a canned symbolic name.
struct FakeBranch(&'static str);

impl BranchProvider for FakeBranch {
    fn current_branch(&self) -> io::Result<String> {
        Ok(self.0.to_string())
    }
}

/// Branch provider simulating a failing git query.
struct FailingBranch;

impl BranchProvider for FailingBranch {
    fn current_branch(&self) -> io::Result<String> {
        Err(io::Error::other("fatal: not a git repository"))
    }
}

fn curated_settings() -> Settings {
    let mut settings = Settings::default();
    settings.environments.insert(
        "dev".to_string(),
        EnvironmentConfig {
            backend_subdomain: "dev-backend-cdk-book".to_string(),
            frontend_subdomain: "dev-frontend-cdk-book".to_string(),
        },
    );
    settings.environments.insert(
        "prod".to_string(),
        EnvironmentConfig {
            backend_subdomain: "backend".to_string(),
            frontend_subdomain: "www".to_string(),
        },
    );
    settings
}

fn resolver(
    settings: Settings,
    ci: CiContext,
    branch: impl BranchProvider + 'static,
) -> ResolverService {
    ResolverService::new(Arc::new(settings), ci, Arc::new(branch))
}

#[test]
fn given_prod_requested_when_resolving_then_curated_config_wins_over_ci_state() {
    // CI variables and branch state must not leak into a static override
    let ci = CiContext {
        head_ref: Some("feature/x".to_string()),
        ref_name: Some("feature/x".to_string()),
    };
    let service = resolver(curated_settings(), ci, FakeBranch("feature/x"));

    let resolved = service.resolve(Some("prod"));

    assert_eq!(resolved.deployment, "prod");
    assert_eq!(resolved.backend_subdomain, "backend");
    assert_eq!(resolved.frontend_subdomain, "www");
}

#[test]
fn given_dev_requested_when_resolving_then_returns_curated_dev_config() {
    let service = resolver(curated_settings(), CiContext::default(), FakeBranch("main"));

    let resolved = service.resolve(Some("dev"));

    assert_eq!(resolved.deployment, "dev");
    assert_eq!(resolved.backend_subdomain, "dev-backend-cdk-book");
}

#[test]
fn given_ci_ref_name_when_resolving_without_override_then_sanitized_branch_drives_config() {
    let ci = CiContext {
        head_ref: None,
        ref_name: Some("feature/login".to_string()),
    };
    let service = resolver(Settings::default(), ci, FakeBranch("ignored"));

    let resolved = service.resolve(None);

    assert_eq!(resolved.deployment, "featurelogin");
    assert_eq!(resolved.backend_subdomain, "featurelogin-backend-cdk-book");
    assert_eq!(resolved.frontend_subdomain, "featurelogin-frontend-cdk-book");
}

#[test]
fn given_pr_head_ref_when_resolving_then_it_wins_over_ref_name() {
    let ci = CiContext {
        head_ref: Some("pr-source".to_string()),
        ref_name: Some("merge-target".to_string()),
    };
    let service = resolver(Settings::default(), ci, FakeBranch("ignored"));

    assert_eq!(service.resolve(None).deployment, "pr-source");
}

#[test]
fn given_empty_head_ref_when_resolving_then_ref_name_still_wins() {
    // A set-but-empty PR variable must not shadow a usable ref name
    let ci = CiContext {
        head_ref: Some(String::new()),
        ref_name: Some("main".to_string()),
    };
    let service = resolver(Settings::default(), ci, FakeBranch("gitbranch"));

    assert_eq!(service.resolve(None).deployment, "main");
}

#[test]
fn given_empty_git_output_when_resolving_then_falls_back_to_local() {
    let service = resolver(Settings::default(), CiContext::default(), FakeBranch(""));

    let resolved = service.resolve(None);

    assert_eq!(resolved.deployment, "local");
    assert_eq!(resolved.backend_subdomain, "local-backend-cdk-book");
}

#[test]
fn given_detached_head_when_resolving_then_falls_back_to_local() {
    let service = resolver(Settings::default(), CiContext::default(), FakeBranch("HEAD"));

    let resolved = service.resolve(None);

    assert_eq!(resolved.deployment, "local");
    assert_eq!(resolved.backend_subdomain, "local-backend-cdk-book");
    assert_eq!(resolved.frontend_subdomain, "local-frontend-cdk-book");
}

#[test]
fn given_failing_git_query_when_resolving_then_falls_back_to_local() {
    let service = resolver(Settings::default(), CiContext::default(), FailingBranch);

    assert_eq!(service.resolve(None).deployment, "local");
}

#[test]
fn given_local_branch_with_special_chars_when_resolving_then_sanitized() {
    let service = resolver(
        Settings::default(),
        CiContext::default(),
        FakeBranch("my_branch!"),
    );

    assert_eq!(service.resolve(None).deployment, "mybranch");
}

#[test]
fn given_branch_sanitizing_to_empty_when_resolving_then_default_environment_applies() {
    let service = resolver(
        Settings::default(),
        CiContext::default(),
        FakeBranch("!!!"),
    );

    assert_eq!(service.resolve(None).deployment, "dev");
}

#[test]
fn given_non_static_requested_name_when_resolving_then_branch_derivation_runs() {
    // An explicit name that is not dev/stage/prod does not act as an
    // override; the branch chain decides instead.
    let ci = CiContext {
        head_ref: None,
        ref_name: Some("feature/login".to_string()),
    };
    let service = resolver(Settings::default(), ci, FakeBranch("ignored"));

    assert_eq!(service.resolve(Some("feature-x")).deployment, "featurelogin");
}

#[test]
fn given_identical_inputs_when_resolving_twice_then_results_are_deep_equal() {
    let ci = CiContext {
        head_ref: None,
        ref_name: Some("release/2024".to_string()),
    };
    let service = resolver(curated_settings(), ci, FakeBranch("release/2024"));

    assert_eq!(service.resolve(None), service.resolve(None));
    assert_eq!(service.resolve(Some("prod")), service.resolve(Some("prod")));
}

#[rstest]
#[case("mybranch")]
#[case("a")]
#[case("release-123")]
#[case("x-y-z")]
fn given_sanitized_names_when_looking_up_config_then_always_yields_valid_labels(
    #[case] name: &str,
) {
    let service = resolver(curated_settings(), CiContext::default(), FakeBranch("main"));

    let config = service.config_for(name);

    assert!(config.validate(name).is_ok());
    assert!(config.backend_subdomain.starts_with(name));
}

#[test]
fn given_stage_requested_when_resolving_then_config_synthesized_without_curated_entry() {
    // stage is static but not in the curated table here; formula applies
    let service = resolver(curated_settings(), CiContext::default(), FakeBranch("main"));

    let resolved = service.resolve(Some("stage"));

    assert_eq!(resolved.deployment, "stage");
    assert_eq!(resolved.backend_subdomain, "stage-backend-cdk-book");
}
