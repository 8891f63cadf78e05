use clap::{Parser, Subcommand, ValueEnum};

use std::path::PathBuf;

use super::config::StorageBackend;
use super::constants::{
    ENV_API_TIMEOUT_SECS, ENV_API_URL, ENV_CONFIG, ENV_PLATFORM_PREFIX, ENV_STORAGE_BACKEND,
};

#[derive(Parser)]
#[command(name = "billdesk")]
#[command(version, about = "Billdesk API client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL
    #[arg(long, global = true, env = ENV_API_URL)]
    pub api_url: Option<String>,

    /// Path prefix routed to the platform-admin session
    #[arg(long, global = true, env = ENV_PLATFORM_PREFIX)]
    pub platform_prefix: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, env = ENV_API_TIMEOUT_SECS)]
    pub api_timeout_secs: Option<u64>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Session storage backend (file, keyring or memory)
    #[arg(long, global = true, env = ENV_STORAGE_BACKEND, value_parser = parse_storage_backend)]
    pub storage_backend: Option<StorageBackend>,
}

/// Parse storage backend from CLI/env string
fn parse_storage_backend(s: &str) -> Result<StorageBackend, String> {
    match s.to_lowercase().as_str() {
        "file" => Ok(StorageBackend::File),
        "keyring" | "keychain" => Ok(StorageBackend::Keyring),
        "memory" => Ok(StorageBackend::Memory),
        _ => Err(format!(
            "Invalid storage backend '{}'. Valid options: file, keyring, memory",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Sign in to the tenant workspace
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create a tenant account and sign in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        company: Option<String>,
    },
    /// Clear the tenant session
    Logout,
    /// Show the signed-in tenant identity
    Whoami,
    /// Issue an authenticated GET and print the response body
    Get {
        /// Path relative to the API base URL (e.g. /invoices)
        path: String,
    },
    /// Platform-admin session commands
    Platform {
        #[command(subcommand)]
        command: PlatformCommands,
    },
    /// Evaluate a route guard against the stored sessions
    Guard {
        #[arg(value_enum)]
        area: GuardArea,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum PlatformCommands {
    /// Sign in to the platform-admin area
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Clear the platform-admin session
    Logout,
    /// Report whether a platform credential is stored
    Status,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardArea {
    Tenant,
    Admin,
    Platform,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub api_url: Option<String>,
    pub platform_prefix: Option<String>,
    pub api_timeout_secs: Option<u64>,
    pub config: Option<PathBuf>,
    pub storage_backend: Option<StorageBackend>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Commands) {
    let cli = Cli::parse();
    let config = CliConfig {
        api_url: cli.api_url,
        platform_prefix: cli.platform_prefix,
        api_timeout_secs: cli.api_timeout_secs,
        config: cli.config,
        storage_backend: cli.storage_backend,
    };
    (config, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_storage_backend() {
        assert_eq!(parse_storage_backend("FILE"), Ok(StorageBackend::File));
        assert_eq!(parse_storage_backend("keychain"), Ok(StorageBackend::Keyring));
        assert!(parse_storage_backend("s3").is_err());
    }

    #[test]
    fn test_parse_platform_login() {
        let cli = Cli::try_parse_from([
            "billdesk",
            "platform",
            "login",
            "--email",
            "ops@example.com",
            "--password",
            "secret",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Platform {
                command: PlatformCommands::Login { .. }
            }
        ));
    }
}
