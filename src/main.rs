use clap::Parser;
use convdash::cli::{self, Cli};
use tracing::Level;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Initialize logging; stdout is reserved for reports
    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    cli::run(args)
}
