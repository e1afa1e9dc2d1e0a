//! Command-line overrides layered on top of the loaded file.

use crate::schema::{BackendSection, DiscordSection, ShartConfig};

/// Values supplied on the command line. `None` leaves the file value alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub discord_token: Option<String>,
    pub radarr_url: Option<String>,
    pub radarr_key: Option<String>,
    pub sonarr_url: Option<String>,
    pub sonarr_key: Option<String>,
    pub trigger: Option<String>,
    /// Forces the `debug` log level.
    pub verbose: bool,
}

impl ConfigOverrides {
    pub fn apply(self, mut config: ShartConfig) -> ShartConfig {
        if let Some(token) = self.discord_token {
            config.discord.get_or_insert_with(DiscordSection::default).token = Some(token);
        }
        overlay_backend(&mut config.radarr, self.radarr_url, self.radarr_key);
        overlay_backend(&mut config.sonarr, self.sonarr_url, self.sonarr_key);
        if let Some(trigger) = self.trigger {
            config.shart.trigger = Some(trigger);
        }
        if self.verbose {
            config.shart.log_level = Some("debug".to_string());
        }
        config
    }
}

fn overlay_backend(section: &mut Option<BackendSection>, url: Option<String>, key: Option<String>) {
    if url.is_none() && key.is_none() {
        return;
    }
    let section = section.get_or_insert_with(BackendSection::default);
    if url.is_some() {
        section.host = url;
    }
    if key.is_some() {
        section.api_key = key;
    }
}
