//! Link commands

use colored::Colorize;

use crate::config::UtmLinkConfig;
use crate::interfaces::cli::CliError;
use crate::links::{LinkGenerator, LinkRequest, parse_utm_parameters};

pub fn print_link(
    config: &UtmLinkConfig,
    country: Option<&str>,
    page: &str,
    content_type: &str,
    program: Option<&str>,
    action: Option<&str>,
) {
    let generator = LinkGenerator::new(config.clone());
    let request = LinkRequest {
        country,
        page,
        content_type,
        program,
        action,
    };
    println!("{}", generator.generate(&request));
}

pub fn print_parsed(url: &str) -> Result<(), CliError> {
    let params = parse_utm_parameters(url)
        .ok_or_else(|| CliError::ParseError(format!("not a URL: {}", url)))?;
    let json = serde_json::to_string_pretty(&params)
        .map_err(|e| CliError::CommandError(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

pub fn validate_link(config: &UtmLinkConfig, url: &str) -> Result<(), CliError> {
    let generator = LinkGenerator::new(config.clone());
    if !generator.is_valid_link(url) {
        return Err(CliError::InvalidLink(url.to_string()));
    }
    println!("{} Valid UTM link: {}", "✓".bold().green(), url.blue());
    Ok(())
}

pub fn print_base_url(config: &UtmLinkConfig, country: Option<&str>) {
    let generator = LinkGenerator::new(config.clone());
    println!("{}", generator.base_url(country));
}
