use clap::Parser;
use tracing::debug;

use utmlinker::cli::Cli;
use utmlinker::config::{get_config, init_config};
use utmlinker::interfaces::cli::run_cli_command;
use utmlinker::system::logging::init_logging;

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config(cli.config.as_deref());
    let config = get_config();

    // guard 必须存活到进程结束，保证日志被刷出
    let guard = match init_logging(&config.logging) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("{}", e.format_colored());
            None
        }
    };
    debug!("Collector kind: {}", config.collector.kind.as_ref());

    let result = run_cli_command(cli.command);
    drop(guard);

    if let Err(e) = result {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }
}
