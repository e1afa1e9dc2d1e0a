use async_trait::async_trait;

use crate::error::{BackendError, TransportError};
use crate::message::{DeleteReport, ReplyPayload};
use crate::types::{
    AddOutcome, AddRequest, Capability, LibraryFilter, MediaRecord, MediaType, QualityProfile,
    RootFolder, SearchHit,
};

/// The narrow capability interface every media service client implements.
///
/// Handlers call exactly one of these per command and never see wire formats.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Service name for replies and logs (e.g., "radarr").
    fn name(&self) -> &str;

    fn media_type(&self) -> MediaType;

    /// Catalogue the backend's external ids come from.
    fn id_source(&self) -> &str {
        self.media_type().id_source()
    }

    /// Whether an optional capability is implemented. Discovery is opt-in.
    fn supports(&self, capability: Capability) -> bool {
        capability != Capability::Discover
    }

    async fn search(&self, term: &str) -> Result<Vec<SearchHit>, BackendError>;

    async fn profiles(&self) -> Result<Vec<QualityProfile>, BackendError>;

    async fn root_folders(&self) -> Result<Vec<RootFolder>, BackendError>;

    /// Look a title up by its external id (see [`id_source`](Self::id_source)).
    async fn media_by_id(&self, external_id: u64) -> Result<MediaRecord, BackendError>;

    async fn add_media(&self, request: AddRequest) -> Result<AddOutcome, BackendError>;

    async fn library(&self, filter: LibraryFilter) -> Result<Vec<MediaRecord>, BackendError>;

    /// Remove a title from the library, keeping files on disk. Returns the removed record.
    async fn remove_media(&self, external_id: u64) -> Result<MediaRecord, BackendError>;

    async fn discover(&self) -> Result<Vec<MediaRecord>, BackendError> {
        Err(BackendError::Unsupported {
            backend: self.name().to_string(),
            capability: Capability::Discover,
        })
    }

    /// Lightweight reachability check. Never surfaces the underlying error.
    async fn test_connection(&self) -> bool;
}

/// Outbound side of a chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    fn name(&self) -> &str;

    /// Largest body text the platform accepts in one message.
    fn max_message_len(&self) -> usize;

    async fn send(&self, payload: &ReplyPayload) -> Result<(), TransportError>;

    /// Ids of the most recent messages in `channel`, newest first. `None` means all.
    async fn recent_messages(
        &self,
        _channel: &str,
        _limit: Option<u32>,
    ) -> Result<Vec<String>, TransportError> {
        Err(TransportError::Unsupported("reading message history"))
    }

    async fn delete_messages(
        &self,
        _channel: &str,
        _ids: &[String],
    ) -> Result<DeleteReport, TransportError> {
        Err(TransportError::Unsupported("deleting messages"))
    }
}
