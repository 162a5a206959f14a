//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for utmlinker using clap's derive macros.

use clap::{Args, Parser, Subcommand};

/// utmlinker - UTM link builder and conversion-event tracker
#[derive(Parser)]
#[command(name = "utmlinker")]
#[command(version)]
#[command(about = "Build campaign-tagged links and emit conversion events", long_about = None)]
pub struct Cli {
    /// Configuration file path (TOML)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a UTM-tagged link
    Link {
        /// Visitor country; only "Bangladesh" (any case) selects the Bangladesh page
        #[arg(long)]
        country: Option<String>,

        /// Page the link is placed on
        #[arg(long)]
        page: String,

        /// Content type, first segment of utm_content
        #[arg(long)]
        content_type: String,

        #[arg(long)]
        program: Option<String>,

        /// Defaults to "apply-now"
        #[arg(long)]
        action: Option<String>,
    },

    /// Print the UTM parameters of a URL as JSON
    Parse {
        url: String,
    },

    /// Check a link targets the expected domain and carries all UTM parameters
    Validate {
        url: String,
    },

    /// Print the landing page for a country
    BaseUrl {
        #[arg(long)]
        country: Option<String>,
    },

    /// Build a conversion event and forward it to the configured collector
    Track {
        #[command(flatten)]
        page: PageArgs,

        #[command(subcommand)]
        event: TrackCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Page context for `track`
#[derive(Args, Clone, Debug)]
pub struct PageArgs {
    /// Current page URL (its utm_* parameters are recorded)
    #[arg(long, global = true)]
    pub page_url: Option<String>,

    #[arg(long, global = true)]
    pub page_title: Option<String>,

    #[arg(long, global = true)]
    pub referrer: Option<String>,

    /// Reuse an existing session id instead of generating one
    #[arg(long, global = true)]
    pub session_id: Option<String>,

    #[arg(long, global = true)]
    pub user_id: Option<String>,
}

#[derive(Subcommand)]
pub enum TrackCommands {
    /// CTA click
    Cta {
        #[arg(long)]
        cta_type: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        target_url: String,
        #[arg(long)]
        program: Option<String>,
        #[arg(long)]
        content_type: Option<String>,
    },

    /// WhatsApp button click
    Whatsapp {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        message: String,
        /// Where the button sits on the page
        #[arg(long)]
        location: String,
        #[arg(long)]
        program: Option<String>,
        #[arg(long)]
        content_type: Option<String>,
    },

    /// Page view
    PageView {
        #[arg(long)]
        content_type: Option<String>,
        #[arg(long)]
        program: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },

    /// Scholarship calculator usage
    Calculator {
        #[arg(long)]
        program: String,
        #[arg(long)]
        gpa: f64,
        #[arg(long)]
        country: String,
        #[arg(long)]
        base_fee: f64,
        #[arg(long)]
        scholarship: f64,
        #[arg(long)]
        final_amount: f64,
        /// Defaults to "calculate"
        #[arg(long)]
        action: Option<String>,
    },
}

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate a sample configuration file
    Generate {
        /// Output file path (default: utmlinker.example.toml)
        output_path: Option<String>,

        /// Overwrite existing file without confirmation
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration as TOML
    Show,
}
