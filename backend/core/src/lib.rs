pub mod error;
pub mod event;
pub mod message;
pub mod traits;
pub mod types;

pub use error::{BackendError, CommandError, TransportError};
pub use event::{EventSource, InboundEvent};
pub use message::{Action, Attachment, Color, DeleteReport, Field, ReplyPayload};
pub use traits::{ChatTransport, MediaBackend};
pub use types::{
    AddOutcome, AddRequest, Capability, LibraryFilter, MediaRecord, MediaType, QualityProfile,
    ReleaseStatus, RootFolder, SearchHit, UnknownMediaType,
};
