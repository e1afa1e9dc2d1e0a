use async_trait::async_trait;

pub mod discord;
pub mod slack;

pub use discord::{DiscordAdapter, DiscordTransport};
pub use slack::{SlackAdapter, SlackConfig, SlackTransport};

/// All inbound chat adapters implement this trait.
///
/// Adapters own an `Orchestrator` and hand every inbound message to it.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Human-readable adapter name for logging.
    fn name(&self) -> &str;

    /// Build an optional Axum sub-router for inbound webhook endpoints.
    /// Adapters that hold a long-lived connection return an empty router.
    fn build_router(&self) -> axum::Router {
        axum::Router::new()
    }

    /// Run the adapter's background work (gateway connection, etc.) until it stops.
    async fn start(&self) -> anyhow::Result<()>;
}
