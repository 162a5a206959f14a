//! CLI interface module
//!
//! This module provides command-line interface functionality for utmlinker.

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands};
use commands::{
    config_generate, config_show, print_base_url, print_link, print_parsed, run_track,
    validate_link,
};

#[derive(Debug)]
pub enum CliError {
    ConfigError(String),
    ParseError(String),
    CommandError(String),
    /// `validate` 判定链接无效
    InvalidLink(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::ConfigError(msg) => format!("Config error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
            CliError::InvalidLink(url) => format!("Invalid UTM link: {}", url),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::ConfigError(msg) => {
                format!("{} {}", "Config error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
            CliError::InvalidLink(url) => {
                format!("{} {}", "✗ Invalid UTM link:".red().bold(), url.blue())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::TrackerError> for CliError {
    fn from(err: crate::errors::TrackerError) -> Self {
        match err {
            crate::errors::TrackerError::Config(msg) => CliError::ConfigError(msg),
            crate::errors::TrackerError::InvalidUrl(msg) => CliError::ParseError(msg),
            other => CliError::CommandError(other.to_string()),
        }
    }
}

/// Run a CLI command from clap-parsed input
pub fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    let config = crate::config::get_config();

    match cmd {
        Commands::Link {
            country,
            page,
            content_type,
            program,
            action,
        } => {
            print_link(
                &config.links,
                country.as_deref(),
                &page,
                &content_type,
                program.as_deref(),
                action.as_deref(),
            );
            Ok(())
        }

        Commands::Parse { url } => print_parsed(&url),

        Commands::Validate { url } => validate_link(&config.links, &url),

        Commands::BaseUrl { country } => {
            print_base_url(&config.links, country.as_deref());
            Ok(())
        }

        Commands::Track { page, event } => run_track(&config, page, event),

        Commands::Config { action } => match action {
            ConfigCommands::Generate { output_path, force } => {
                config_generate(output_path, force)
            }
            ConfigCommands::Show => config_show(&config),
        },
    }
}
