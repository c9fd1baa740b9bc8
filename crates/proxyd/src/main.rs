//! fsfwd entry point.
//!
//! Loads the slice configuration, builds one policy per slice and reports
//! what each slice may use.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use fsfw_proxyd::FsfwConfig;
use fsfw_slicer::Slicer;

/// FlowSpace Firewall slice proxy
#[derive(Parser, Debug)]
#[command(name = "fsfwd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Slice configuration file
    #[arg(short = 'c', long, default_value = "/etc/fsfw/fsfw.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

fn init_logging(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = FsfwConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    if args.check {
        config.validate().context("validating configuration")?;
        info!(
            "Configuration {} is valid ({} slices)",
            args.config.display(),
            config.slices.len()
        );
        return Ok(());
    }

    let slicers = config.build_slicers().context("building slices")?;
    for slicer in &slicers {
        info!(
            "Slice {}: controller {}, max flows {}, rate {}/{:?}",
            slicer.name(),
            slicer.controller_address(),
            slicer.max_flows(),
            slicer.rate_tracker().rate(),
            slicer.rate_tracker().window()
        );
        for port in slicer.ports() {
            info!(
                "Slice {}: port {} with {} vlans",
                slicer.name(),
                port.name(),
                port.vlans().allowed_count()
            );
        }
    }
    info!("{} slices ready", slicers.len());
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!("--- Starting fsfwd ---");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("fsfwd error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
