mod app;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;

use shart_config::{ConfigOverrides, Loaded};

#[derive(Parser, Debug)]
#[command(name = "shart")]
#[command(about = "Shart: manage Radarr and Sonarr from Slack or Discord")]
#[command(version)]
struct Cli {
    /// Path to config.toml
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Discord bot token
    #[arg(long)]
    token: Option<String>,

    /// Radarr base URL
    #[arg(long, value_name = "URL")]
    radarr_url: Option<String>,

    /// Radarr API key
    #[arg(long, value_name = "KEY")]
    radarr_key: Option<String>,

    /// Sonarr base URL
    #[arg(long, value_name = "URL")]
    sonarr_url: Option<String>,

    /// Sonarr API key
    #[arg(long, value_name = "KEY")]
    sonarr_key: Option<String>,

    /// Keyword that opens a chat command
    #[arg(long)]
    trigger: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            discord_token: self.token.clone(),
            radarr_url: self.radarr_url.clone(),
            radarr_key: self.radarr_key.clone(),
            sonarr_url: self.sonarr_url.clone(),
            sonarr_key: self.sonarr_key.clone(),
            trigger: self.trigger.clone(),
            verbose: self.verbose,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let path = shart_config::resolve_config_path(cli.config.as_deref());
    let config = match shart_config::load(&path).await? {
        Loaded::Config(config) => config,
        Loaded::Created(path) => bail!(
            "No config found. A default one was written to {}; edit it and start shart again.",
            path.display()
        ),
    };
    let config = cli.overrides().apply(config);

    shart_logging::init_logger(config.shart.log_dir.as_deref(), config.shart.log_level())?;
    info!(path = %path.display(), "Using config");

    let config = shart_config::prepare(config)?;
    app::run(config).await
}
