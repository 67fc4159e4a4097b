use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use spdlog::{info, warn};

use blogtab::logger::configure_logger;
use blogtab::server::server_run;

use crate::config::{open_config, write_sample_config};

mod config;

const CFG_FILE_NAME: &str = "blogtab.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path
    #[arg(short, long)]
    config_path: Option<String>,

    /// Writes a sample configuration to the config path, or the user config dir, and exits
    #[arg(long)]
    sample_config: bool,
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args.config_path.map(PathBuf::from);

    if args.sample_config {
        let path = write_sample_config(config_path)?;
        println!("Sample configuration written to {}", path.display());
        return Ok(());
    }

    let config = match open_config(config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{:#}", err);
            eprintln!("Please run blogtab --help");
            return Ok(());
        }
    };

    if let Err(err) = configure_logger(&config) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    info!("Starting blogtab =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");
    info!("Listening on {}:{}", config.server.address, config.server.port);

    server_run(config).await?;
    Ok(())
}
