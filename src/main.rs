use anyhow::Result;
use cellshape::cli::{self, Cli, LogLevelArg};
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize unified logging: routes all log::info!() etc. to /tmp/cellshape_debug.log.
    // When RUST_LOG is set, also mirrors to stderr for terminal debugging.
    // CLI --log-level flag takes highest precedence, then RUST_LOG, then config (applied later).
    cellshape::debug::init_log_bridge(cli.log_level.map(LogLevelArg::to_level_filter));

    log::info!("Starting cellshape {}", cellshape::VERSION);

    let code = cli::run(cli)?;
    if code != 0 {
        // process::exit skips the stdout flush that returning from main performs
        let _ = std::io::Write::flush(&mut std::io::stdout());
        std::process::exit(code);
    }
    Ok(())
}
