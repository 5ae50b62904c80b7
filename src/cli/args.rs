//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Deployment environment resolver: stable subdomains, stage and stack names
/// from branch or CI context
#[derive(Parser, Debug)]
#[command(name = "depenv")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase debug output (-d, -dd, -ddd)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory holding .depenv.toml (default: cwd)
    #[arg(short = 'C', long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the deployment environment and print it as KEY=VALUE lines
    Resolve {
        /// Explicit environment name; dev/stage/prod short-circuit branch derivation
        environment: Option<String>,
    },

    /// Print the sanitized current branch name
    Branch,

    /// Print the stack name for the resolved environment
    StackName {
        /// Explicit environment name
        environment: Option<String>,
        /// Also persist the stack name to this file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        write: Option<String>,
    },

    /// Print the backend (default) or frontend base URL
    BaseUrl {
        /// Explicit environment name
        environment: Option<String>,
        /// Print the frontend URL instead of the backend URL
        #[arg(long)]
        frontend: bool,
    },

    /// Write the resolution as a plain .env file for later scripts
    EnvFile {
        /// Explicit environment name
        environment: Option<String>,
        /// Output path (default: .env)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show resolver inputs and effective precedence
    Info,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration as TOML
    Show,
    /// Print a commented template config
    Template,
    /// Print config file locations
    Path,
}
