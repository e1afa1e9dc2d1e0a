//! Stub collaborators shared by the handler and orchestrator tests.
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use shart_core::{
    AddOutcome, AddRequest, BackendError, Capability, ChatTransport, CommandError, DeleteReport,
    LibraryFilter, MediaBackend, MediaRecord, MediaType, QualityProfile, ReplyPayload, RootFolder,
    SearchHit, TransportError,
};
use uuid::Uuid;

use crate::dispatch::{CommandContext, CommandHandler};

/// Handler that replies with its arguments.
pub struct EchoHandler;

#[async_trait]
impl CommandHandler for EchoHandler {
    async fn handle(&self, _ctx: &CommandContext, args: &[String]) -> Result<ReplyPayload, CommandError> {
        Ok(ReplyPayload::text(args.join(" ")))
    }
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct Calls {
    pub search: AtomicUsize,
    pub profiles: AtomicUsize,
    pub root_folders: AtomicUsize,
    pub media_by_id: AtomicUsize,
    pub add: AtomicUsize,
    pub library: AtomicUsize,
    pub remove: AtomicUsize,
    pub discover: AtomicUsize,
    pub test: AtomicUsize,
}

impl Calls {
    pub fn total(&self) -> usize {
        [
            &self.search,
            &self.profiles,
            &self.root_folders,
            &self.media_by_id,
            &self.add,
            &self.library,
            &self.remove,
            &self.discover,
            &self.test,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }
}

pub struct StubBackend {
    pub media: MediaType,
    pub hits: Vec<SearchHit>,
    pub profiles: Vec<QualityProfile>,
    pub folders: Vec<RootFolder>,
    pub library: Vec<MediaRecord>,
    pub add_outcome: AddOutcome,
    pub discovery: bool,
    /// Capabilities reported as missing, on top of discovery.
    pub unsupported: Vec<Capability>,
    pub reachable: bool,
    pub fail: bool,
    pub last_search: Mutex<Option<String>>,
    pub last_add: Mutex<Option<AddRequest>>,
    pub last_filter: Mutex<Option<LibraryFilter>>,
    pub calls: Calls,
}

impl StubBackend {
    pub fn new(media: MediaType) -> Self {
        Self {
            media,
            hits: Vec::new(),
            profiles: vec![QualityProfile { id: 1, name: "Any".into() }],
            folders: vec![RootFolder { id: 1, path: "/data/media".into(), free_space: None }],
            library: Vec::new(),
            add_outcome: AddOutcome::Added,
            discovery: false,
            unsupported: Vec::new(),
            reachable: true,
            fail: false,
            last_search: Mutex::new(None),
            last_add: Mutex::new(None),
            last_filter: Mutex::new(None),
            calls: Calls::default(),
        }
    }

    fn name_str(&self) -> &'static str {
        match self.media {
            MediaType::Movie => "radarr",
            MediaType::Show => "sonarr",
        }
    }

    fn failure(&self) -> BackendError {
        BackendError::Network {
            backend: self.name_str().into(),
            message: "connection refused".into(),
        }
    }

    fn check(&self) -> Result<(), BackendError> {
        if self.fail { Err(self.failure()) } else { Ok(()) }
    }
}

#[async_trait]
impl MediaBackend for StubBackend {
    fn name(&self) -> &str {
        self.name_str()
    }

    fn media_type(&self) -> MediaType {
        self.media
    }

    fn supports(&self, capability: Capability) -> bool {
        !self.unsupported.contains(&capability) && (capability != Capability::Discover || self.discovery)
    }

    async fn search(&self, term: &str) -> Result<Vec<SearchHit>, BackendError> {
        self.calls.search.fetch_add(1, Ordering::SeqCst);
        *self.last_search.lock().unwrap() = Some(term.to_string());
        self.check()?;
        Ok(self.hits.clone())
    }

    async fn profiles(&self) -> Result<Vec<QualityProfile>, BackendError> {
        self.calls.profiles.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.profiles.clone())
    }

    async fn root_folders(&self) -> Result<Vec<RootFolder>, BackendError> {
        self.calls.root_folders.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.folders.clone())
    }

    async fn media_by_id(&self, external_id: u64) -> Result<MediaRecord, BackendError> {
        self.calls.media_by_id.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.hits
            .iter()
            .find(|h| h.external_id == external_id)
            .map(|h| MediaRecord {
                external_id: h.external_id,
                title: h.title.clone(),
                year: h.year,
                ..Default::default()
            })
            .ok_or_else(|| BackendError::NotFound(format!("No {} with id {external_id}", self.media)))
    }

    async fn add_media(&self, request: AddRequest) -> Result<AddOutcome, BackendError> {
        self.calls.add.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        *self.last_add.lock().unwrap() = Some(request);
        Ok(self.add_outcome.clone())
    }

    async fn library(&self, filter: LibraryFilter) -> Result<Vec<MediaRecord>, BackendError> {
        self.calls.library.fetch_add(1, Ordering::SeqCst);
        *self.last_filter.lock().unwrap() = Some(filter);
        self.check()?;
        Ok(self.library.iter().filter(|r| filter.matches(r)).cloned().collect())
    }

    async fn remove_media(&self, external_id: u64) -> Result<MediaRecord, BackendError> {
        self.calls.remove.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.library
            .iter()
            .find(|r| r.external_id == external_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("No {} with id {external_id} in your library", self.media)))
    }

    async fn discover(&self) -> Result<Vec<MediaRecord>, BackendError> {
        self.calls.discover.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.library.clone())
    }

    async fn test_connection(&self) -> bool {
        self.calls.test.fetch_add(1, Ordering::SeqCst);
        self.reachable
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

pub struct RecordingTransport {
    pub max_len: usize,
    pub history: Option<Vec<String>>,
    pub undeletable: Vec<String>,
    pub sent: Mutex<Vec<ReplyPayload>>,
    pub deleted: Mutex<Vec<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            max_len: 4000,
            history: None,
            undeletable: Vec::new(),
            sent: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_history(ids: &[&str]) -> Self {
        Self {
            history: Some(ids.iter().map(|s| s.to_string()).collect()),
            ..Self::new()
        }
    }

    pub fn sent(&self) -> Vec<ReplyPayload> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    fn max_message_len(&self) -> usize {
        self.max_len
    }

    async fn send(&self, payload: &ReplyPayload) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(payload.clone());
        Ok(())
    }

    async fn recent_messages(&self, _channel: &str, limit: Option<u32>) -> Result<Vec<String>, TransportError> {
        let Some(history) = &self.history else {
            return Err(TransportError::Unsupported("reading message history"));
        };
        let take = limit.map_or(history.len(), |l| l as usize);
        Ok(history.iter().take(take).cloned().collect())
    }

    async fn delete_messages(&self, _channel: &str, ids: &[String]) -> Result<DeleteReport, TransportError> {
        let mut report = DeleteReport::default();
        let mut deleted = self.deleted.lock().unwrap();
        for id in ids {
            if self.undeletable.contains(id) {
                report.failed += 1;
            } else {
                deleted.push(id.clone());
                report.deleted += 1;
            }
        }
        Ok(report)
    }
}

pub fn context(transport: Arc<RecordingTransport>) -> CommandContext {
    CommandContext {
        request_id: Uuid::new_v4(),
        channel: "media".into(),
        sender: "tester".into(),
        transport,
    }
}

pub fn args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}
