use anyhow::Result;
use clap::Parser;
use termprofile::cli::{self, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Flag > TERMPROFILE_LOG > off
    let log_file = cli.log_file();
    termprofile::debug::init_log_bridge(cli.log_level, log_file.as_deref());

    log::info!("Starting termprofile");

    let dirs = cli.config_dirs();
    let stdout = std::io::stdout();
    let result = cli::run(&cli.command, &dirs, &mut stdout.lock());
    log::logger().flush();

    if let Err(ref e) = result {
        eprintln!("termprofile: error: {e:#}");
        std::process::exit(1);
    }
    result
}
