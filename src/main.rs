//! WorldPop Fetcher CLI application
//!
//! Command-line interface for browsing and downloading WorldPop Global
//! Project population rasters.

use std::process;

use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use wpgp_fetcher::cli::{
    handle_catalog, handle_config, handle_download, handle_isos, load_config, Cli, Commands,
};
use wpgp_fetcher::errors::Result;

fn main() {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();
    init_logging(&cli);

    if let Err(e) = run(cli) {
        error!("{} error: {}", e.category(), e);
        eprintln!("Error: {}", e);
        if e.requires_refresh() {
            eprintln!("Run 'wpgp_fetcher catalog update' to fetch a fresh catalog");
        }
        process::exit(e.exit_code());
    }
}

/// Main application logic
fn run(cli: Cli) -> Result<()> {
    info!("WorldPop Fetcher v{} starting", env!("CARGO_PKG_VERSION"));

    let global = cli.global;
    match cli.command {
        Commands::Isos(args) => {
            info!("Executing isos command");
            handle_isos(args)
        }
        Commands::Download(args) => {
            info!("Executing download command");
            handle_download(&global, args)
        }
        Commands::Catalog(args) => {
            info!("Executing catalog command");
            handle_catalog(&global, args)
        }
        Commands::Config(args) => {
            info!("Executing config command");
            handle_config(&global, args)
        }
    }
}

/// Initialize logging based on CLI verbosity settings
///
/// Without a verbosity flag the `[logging] level` of the configuration file
/// applies.
fn init_logging(cli: &Cli) {
    let global = &cli.global;
    let log_level = if global.quiet || global.verbose || global.very_verbose {
        cli.log_level().to_string()
    } else {
        load_config(global)
            .map(|config| config.logging.level)
            .unwrap_or_else(|_| cli.log_level().to_string())
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("wpgp_fetcher={}", log_level).parse() {
        filter = filter.add_directive(directive);
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .with_writer(std::io::stderr)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
