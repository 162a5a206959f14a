//! Config commands

use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;

use crate::config::StaticConfig;
use crate::interfaces::cli::CliError;

/// Generate example configuration file
pub fn config_generate(output_path: Option<String>, force: bool) -> Result<(), CliError> {
    let path = output_path.unwrap_or_else(|| "utmlinker.example.toml".to_string());

    // 文件已存在时，非 --force 模式下交互确认
    if !force && Path::new(&path).exists() {
        print!(
            "{} {} {}",
            "File already exists:".yellow(),
            path.blue(),
            "Overwrite? [y/N] ".yellow()
        );
        io::stdout()
            .flush()
            .map_err(|e| CliError::CommandError(e.to_string()))?;

        let mut input = String::new();
        io::stdin()
            .lock()
            .read_line(&mut input)
            .map_err(|e| CliError::CommandError(e.to_string()))?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("{}", "Aborted.".red());
            return Ok(());
        }
    }

    StaticConfig::default().save_to_file(&path)?;
    println!(
        "{} {}",
        "Configuration file generated successfully:".green(),
        path.blue()
    );
    println!(
        "  {}",
        "Environment variables override file values, e.g. UTM__COLLECTOR__KIND=http".dimmed()
    );
    Ok(())
}

/// Print the effective configuration
pub fn config_show(config: &StaticConfig) -> Result<(), CliError> {
    let content =
        toml::to_string_pretty(config).map_err(|e| CliError::CommandError(e.to_string()))?;
    print!("{}", content);
    Ok(())
}
