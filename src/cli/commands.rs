//! Command dispatch: wires parsed args to services

use std::io;
use std::path::{Path, PathBuf};

use clap::{Command, CommandFactory};
use clap_complete::{generate, Generator};
use tracing::{debug, instrument};

use crate::application::services::{CiContext, EnvFileService};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::CliResult;
use crate::cli::output;
use crate::config::{global_config_path, project_config_path, Settings};
use crate::infrastructure::di::ServiceContainer;

/// Default output path for `env-file`.
const DEFAULT_ENV_FILE: &str = ".env";

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = cli
        .project_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));

    let settings = Settings::load(Some(&project_dir))?;
    debug!("settings: {:?}", settings);
    let container = ServiceContainer::new(settings);

    match &cli.command {
        Some(Commands::Resolve { environment }) => _resolve(&container, environment.as_deref()),
        Some(Commands::Branch) => _branch(&container),
        Some(Commands::StackName { environment, write }) => {
            _stack_name(&container, environment.as_deref(), write.as_deref())
        }
        Some(Commands::BaseUrl {
            environment,
            frontend,
        }) => _base_url(&container, environment.as_deref(), *frontend),
        Some(Commands::EnvFile {
            environment,
            output,
        }) => _env_file(&container, environment.as_deref(), output.as_deref()),
        Some(Commands::Config { command }) => _config(&container, command, &project_dir),
        Some(Commands::Info) => _info(&container),
        Some(Commands::Completion { shell }) => {
            print_completions(*shell, &mut Cli::command());
            Ok(())
        }
        None => Ok(()),
    }
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

/// Expand `~` and `$VAR` in user-supplied paths.
fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

#[instrument(skip(container))]
fn _resolve(container: &ServiceContainer, environment: Option<&str>) -> CliResult<()> {
    let resolved = container.resolver.resolve(environment);
    let pairs = EnvFileService::resolution_pairs(&resolved, &container.settings);
    for (key, value) in &pairs {
        output::info(&format!("{key}={value}"));
    }
    Ok(())
}

#[instrument(skip(container))]
fn _branch(container: &ServiceContainer) -> CliResult<()> {
    output::info(&container.resolver.current_branch());
    Ok(())
}

#[instrument(skip(container))]
fn _stack_name(
    container: &ServiceContainer,
    environment: Option<&str>,
    write: Option<&str>,
) -> CliResult<()> {
    let resolved = container.resolver.resolve(environment);
    let stack_name = resolved.stack_name(&container.settings.stack_prefix);
    output::info(&stack_name);

    if let Some(path) = write {
        let path = expand_path(path);
        container
            .env_file
            .write_stack_name(&path, &resolved, &container.settings)?;
        output::action("Wrote", &path.display());
    }
    Ok(())
}

#[instrument(skip(container))]
fn _base_url(container: &ServiceContainer, environment: Option<&str>, frontend: bool) -> CliResult<()> {
    let resolved = container.resolver.resolve(environment);
    let url = if frontend {
        resolved.frontend_url(&container.settings.domain)
    } else {
        resolved.backend_url(&container.settings.domain)
    };
    output::info(&url);
    Ok(())
}

#[instrument(skip(container))]
fn _env_file(
    container: &ServiceContainer,
    environment: Option<&str>,
    output_path: Option<&str>,
) -> CliResult<()> {
    let resolved = container.resolver.resolve(environment);
    let pairs = EnvFileService::resolution_pairs(&resolved, &container.settings);

    let path = expand_path(output_path.unwrap_or(DEFAULT_ENV_FILE));
    container.env_file.write_env_file(&path, &pairs)?;
    output::action("Wrote", &format!("{} ({} keys)", path.display(), pairs.len()));
    Ok(())
}

fn _config(
    container: &ServiceContainer,
    command: &ConfigCommands,
    project_dir: &Path,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Template => {
            output::info(&Settings::template());
        }
        ConfigCommands::Path => {
            output::header("Config locations (lowest to highest precedence):");
            match global_config_path() {
                Some(path) => output::detail(&format!(
                    "global:  {} {}",
                    path.display(),
                    exists_marker(&path)
                )),
                None => output::detail("global:  <no XDG config directory>"),
            }
            let local = project_config_path(project_dir);
            output::detail(&format!(
                "project: {} {}",
                local.display(),
                exists_marker(&local)
            ));
            output::detail("env:     DEPENV_* variables");
        }
    }
    Ok(())
}

fn exists_marker(path: &Path) -> &'static str {
    if path.exists() {
        "(present)"
    } else {
        "(absent)"
    }
}

#[instrument(skip(container))]
fn _info(container: &ServiceContainer) -> CliResult<()> {
    let ci = CiContext::from_env();

    output::header("Resolver inputs:");
    output::detail(&format!(
        "GITHUB_HEAD_REF: {}",
        ci.head_ref.as_deref().unwrap_or("<unset>")
    ));
    output::detail(&format!(
        "GITHUB_REF_NAME: {}",
        ci.ref_name.as_deref().unwrap_or("<unset>")
    ));
    output::detail(&format!("branch: {}", container.resolver.current_branch()));

    let resolved = container.resolver.resolve(None);
    output::header("Resolution:");
    output::detail(&format!("deployment: {}", resolved.deployment));
    output::detail(&format!("stage: {}", resolved.stage_name()));
    output::detail(&format!(
        "stack: {}",
        resolved.stack_name(&container.settings.stack_prefix)
    ));
    output::detail(&format!(
        "backend: {}",
        resolved.backend_url(&container.settings.domain)
    ));
    output::detail(&format!(
        "frontend: {}",
        resolved.frontend_url(&container.settings.domain)
    ));
    Ok(())
}
