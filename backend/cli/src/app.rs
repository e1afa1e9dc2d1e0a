//! Wires providers, the command registry, and the chat transports together.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use shart_channels::{
    ChannelAdapter, DiscordAdapter, DiscordTransport, SlackAdapter, SlackConfig, SlackTransport,
};
use shart_commands::{
    build_default_registry, CommandRegistry, DefaultSettings, MediaServices, Orchestrator,
    OrchestratorConfig,
};
use shart_config::{BackendSection, ShartConfig, ShartSection, SlackSection};
use shart_logging::mask_secret;
use shart_providers::{ArrSettings, CouchPotatoClient, RadarrClient, SonarrClient};

/// Run every configured transport until Ctrl-C or until one of them stops.
pub async fn run(config: ShartConfig) -> Result<()> {
    info!(config = %shart_config::redacted_snapshot(&config), "Starting shart");

    let services = build_services(&config)?;
    if services.is_empty() {
        warn!("No media backends configured; only help and clear are useful");
    }
    let registry = Arc::new(
        build_default_registry(Arc::new(services), Arc::new(DefaultSettings::new()))
            .context("Failed to build command registry")?,
    );

    let mut tasks: JoinSet<Result<()>> = JoinSet::new();

    if let Some(slack) = &config.slack {
        let slack_config = slack_config(slack);
        let base = OrchestratorConfig::default();
        let transport = SlackTransport::new(&slack_config, base.reply_timeout)
            .context("Failed to build Slack transport")?;
        let orchestrator = Orchestrator::new(
            orchestrator_config(&config.shart, slack.token.clone(), Vec::new()),
            Arc::clone(&registry),
            Arc::new(transport),
        );

        let adapter = SlackAdapter::new(slack_config, orchestrator);
        adapter.start().await?;
        let router = adapter.build_router();
        let addr = config.shart.host().to_string();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind Slack webhook listener on {addr}"))?;
        info!(addr = %addr, "Slack webhook listening");

        tasks.spawn(async move {
            axum::serve(listener, router)
                .await
                .context("Slack webhook server stopped")
        });
    }

    if let Some(discord) = &config.discord {
        let token = discord.token.clone().unwrap_or_default();
        let orchestrator = Orchestrator::new(
            orchestrator_config(&config.shart, None, discord.allowed_channels.clone()),
            Arc::clone(&registry),
            Arc::new(DiscordTransport::new(&token)),
        );
        let adapter = DiscordAdapter::new(token, orchestrator);
        tasks.spawn(async move { adapter.start().await });
    }

    log_commands(&registry);

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            info!("Shutting down");
        }
        Some(joined) = tasks.join_next() => {
            match joined {
                Ok(Ok(())) => warn!("A transport stopped; shutting down"),
                Ok(Err(e)) => {
                    error!(error = %e, "Transport failed");
                    tasks.abort_all();
                    return Err(e);
                }
                Err(e) => {
                    tasks.abort_all();
                    return Err(e).context("Transport task panicked");
                }
            }
        }
    }

    tasks.abort_all();
    Ok(())
}

fn build_services(config: &ShartConfig) -> Result<MediaServices> {
    let timeout = config.shart.backend_timeout();
    let mut services = MediaServices::new();

    if let Some(radarr) = config.radarr() {
        let client = RadarrClient::new(arr_settings(radarr, timeout))
            .context("Failed to build Radarr client")?;
        info!(url = %client_url(radarr), api_key = %masked_key(radarr), "Radarr enabled");
        services = services.with(Arc::new(client));
    } else if let Some(couchpotato) = config.couchpotato() {
        let client = CouchPotatoClient::new(arr_settings(couchpotato, timeout))
            .context("Failed to build CouchPotato client")?;
        info!(url = %client_url(couchpotato), api_key = %masked_key(couchpotato), "CouchPotato enabled");
        services = services.with(Arc::new(client));
    }
    if let Some(sonarr) = config.sonarr() {
        let client = SonarrClient::new(arr_settings(sonarr, timeout))
            .context("Failed to build Sonarr client")?;
        info!(url = %client_url(sonarr), api_key = %masked_key(sonarr), "Sonarr enabled");
        services = services.with(Arc::new(client));
    }

    Ok(services)
}

fn arr_settings(section: &BackendSection, timeout: std::time::Duration) -> ArrSettings {
    ArrSettings {
        base_url: client_url(section).to_string(),
        api_key: section.api_key.clone().unwrap_or_default(),
        timeout,
    }
}

fn client_url(section: &BackendSection) -> &str {
    section.host.as_deref().unwrap_or_default().trim()
}

fn masked_key(section: &BackendSection) -> String {
    mask_secret(section.api_key.as_deref().unwrap_or_default())
}

fn slack_config(slack: &SlackSection) -> SlackConfig {
    SlackConfig {
        incoming_webhook: slack.incoming_webhook.clone().unwrap_or_default(),
        signing_secret: slack.signing_secret.clone().filter(|s| !s.is_empty()),
        webhook_path: slack.webhook_path().to_string(),
        bot_name: slack.bot_name().to_string(),
    }
}

fn orchestrator_config(
    shart: &ShartSection,
    auth_token: Option<String>,
    allowed_channels: Vec<String>,
) -> OrchestratorConfig {
    OrchestratorConfig {
        trigger: shart.trigger().to_string(),
        auth_token,
        allowed_channels,
        command_timeout: shart.command_timeout(),
        ..OrchestratorConfig::default()
    }
}

fn log_commands(registry: &CommandRegistry) {
    let mut names = registry.names();
    names.sort_unstable();
    info!(commands = %names.join(", "), "Commands registered");
}
