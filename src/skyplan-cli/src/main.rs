mod cli;
mod commands;
mod config;
mod data;

use anyhow::Result;
use clap::Parser;
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "skyplan=info,skyplan_cli=info",
        _ => "skyplan=debug,skyplan_cli=debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load()?;

    match cli.command {
        Commands::Configure { base_url, show } => {
            commands::configure::handle(cli.data, base_url, show)?;
        }

        Commands::Inspect { url } => {
            commands::build::inspect(&url)?;
        }

        Commands::Decode { url, json } => {
            let planner = data::open_planner(
                config.data_or(cli.data.as_deref()),
                config.base_url_or(None),
            )?;
            commands::build::decode(&planner, &url, json)?;
        }

        Commands::Encode {
            build,
            perk_list,
            mechanics,
            base_url,
        } => {
            let planner = data::open_planner(
                config.data_or(cli.data.as_deref()),
                config.base_url_or(base_url.as_deref()),
            )?;
            commands::build::encode(&planner, &build, &perk_list, &mechanics)?;
        }
    }

    Ok(())
}
