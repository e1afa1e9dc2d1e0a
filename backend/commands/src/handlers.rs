/// Built-in command handlers.
///
/// Each handler validates its arguments, calls at most one backend capability
/// and returns a formatted reply. Failures come back as `CommandError` and
/// are rendered by the orchestrator.
use std::sync::Arc;

use async_trait::async_trait;
use shart_core::{
    AddOutcome, AddRequest, Attachment, Capability, Color, CommandError, LibraryFilter,
    MediaBackend, MediaType, ReplyPayload,
};
use tracing::{info, warn};

use crate::dispatch::{CommandContext, CommandHandler};
use crate::services::MediaServices;
use crate::settings::DefaultSettings;
use crate::types::CommandKind;

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

fn usage(kind: CommandKind) -> CommandError {
    CommandError::usage(format!("Usage: `{}`", kind.usage()))
}

/// Require at least `min` arguments, otherwise reply with the usage line.
fn require_args(kind: CommandKind, args: &[String], min: usize) -> Result<(), CommandError> {
    if args.len() < min { Err(usage(kind)) } else { Ok(()) }
}

fn media_arg(token: &str) -> Result<MediaType, CommandError> {
    token
        .parse::<MediaType>()
        .map_err(|_| CommandError::usage(format!("Unknown media type `{token}`. Use `movie` or `show`.")))
}

/// Ids are numeric; IMDb ids may keep their `tt` prefix.
fn external_id_arg(backend: &Arc<dyn MediaBackend>, token: &str) -> Result<u64, CommandError> {
    let digits = token.strip_prefix("tt").unwrap_or(token);
    digits.parse::<u64>().map_err(|_| {
        CommandError::usage(format!("`{token}` is not a valid {} id", backend.id_source()))
    })
}

/// Page tokens too large for `usize` still mean "the last page".
fn page_arg(token: &str) -> Option<usize> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(token.parse::<usize>().unwrap_or(usize::MAX))
}

fn require_capability(backend: &Arc<dyn MediaBackend>, capability: Capability) -> Result<(), CommandError> {
    if backend.supports(capability) {
        Ok(())
    } else {
        Err(CommandError::Unsupported(format!(
            "{} does not support {capability}",
            backend.name()
        )))
    }
}

fn year_suffix(year: Option<i32>) -> String {
    year.map(|y| format!(" ({y})")).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// search
// ---------------------------------------------------------------------------

pub struct SearchHandler {
    pub services: Arc<MediaServices>,
}

#[async_trait]
impl CommandHandler for SearchHandler {
    async fn handle(&self, ctx: &CommandContext, args: &[String]) -> Result<ReplyPayload, CommandError> {
        require_args(CommandKind::Search, args, 2)?;
        let media = media_arg(&args[0])?;
        let backend = self.services.get(media)?;
        require_capability(backend, Capability::Search)?;
        let term = args[1..].join(" ");
        let hits = backend.search(&term).await?;
        Ok(ctx.formatter().search(media, backend.id_source(), &term, &hits))
    }
}

// ---------------------------------------------------------------------------
// add
// ---------------------------------------------------------------------------

pub struct AddHandler {
    pub services: Arc<MediaServices>,
    pub settings: Arc<DefaultSettings>,
}

#[async_trait]
impl CommandHandler for AddHandler {
    async fn handle(&self, ctx: &CommandContext, args: &[String]) -> Result<ReplyPayload, CommandError> {
        require_args(CommandKind::Add, args, 2)?;
        let media = media_arg(&args[0])?;
        let backend = self.services.get(media)?;
        require_capability(backend, Capability::Add)?;
        let external_id = external_id_arg(backend, &args[1])?;

        let defaults = self.settings.get(media).await;
        let quality_profile_id = if backend.supports(Capability::Profiles) {
            let Some(id) = defaults.quality_profile_id else {
                return Err(CommandError::precondition(format!(
                    "No default quality profile for {media}. Run `quality {media}` to list them, then `set-quality {media} <id>`."
                )));
            };
            Some(id)
        } else {
            None
        };
        let root_folder_path = if backend.supports(Capability::RootFolders) {
            let Some(path) = defaults.root_folder else {
                return Err(CommandError::precondition(format!(
                    "No default root folder for {media}. Run `folders {media}` to list them, then `set-folder {media} <id>`."
                )));
            };
            Some(path)
        } else {
            None
        };

        let record = backend.media_by_id(external_id).await?;
        let label = format!("{}{}", record.title, year_suffix(record.year));
        let request = AddRequest {
            record,
            quality_profile_id,
            root_folder_path,
            monitored: true,
            search_on_add: true,
        };

        let formatter = ctx.formatter();
        match backend.add_media(request).await? {
            AddOutcome::Added => {
                info!(request_id = %ctx.request_id, %media, external_id, "[Commands] Added media");
                Ok(formatter
                    .text(format!("Added {label} to your {media} library"))
                    .with_attachment(Attachment::new(label, "Monitored, searching now").with_color(Color::Good)))
            }
            AddOutcome::AlreadyExists => Ok(formatter
                .text(format!("{label} is already in your {media} library"))
                .with_attachment(Attachment::new(label, "Already exists").with_color(Color::Warning))),
            AddOutcome::Rejected(reasons) => Ok(formatter
                .text(format!("❌ {} refused to add {label}: {}", backend.name(), reasons.join("; ")))
                .with_attachment(Attachment::new(label, "Not added").with_color(Color::Danger))),
        }
    }
}

// ---------------------------------------------------------------------------
// show / list / library
// ---------------------------------------------------------------------------

pub struct LibraryHandler {
    pub services: Arc<MediaServices>,
}

#[async_trait]
impl CommandHandler for LibraryHandler {
    async fn handle(&self, ctx: &CommandContext, args: &[String]) -> Result<ReplyPayload, CommandError> {
        require_args(CommandKind::Library, args, 1)?;
        let media = media_arg(&args[0])?;

        let mut filter = LibraryFilter::All;
        let mut page = 1usize;
        for token in &args[1..] {
            if let Some(number) = page_arg(token) {
                page = number;
            } else if let Some(parsed) = LibraryFilter::from_token(token) {
                filter = parsed;
            } else {
                return Err(CommandError::usage(format!(
                    "Unknown filter `{token}`. Valid filters: {}",
                    LibraryFilter::TOKENS.join(", ")
                )));
            }
        }

        let backend = self.services.get(media)?;
        require_capability(backend, Capability::Library)?;
        let records = backend.library(filter).await?;
        Ok(ctx.formatter().library(media, filter, &records, page))
    }
}

// ---------------------------------------------------------------------------
// quality / set-quality
// ---------------------------------------------------------------------------

pub struct QualityHandler {
    pub services: Arc<MediaServices>,
}

#[async_trait]
impl CommandHandler for QualityHandler {
    async fn handle(&self, ctx: &CommandContext, args: &[String]) -> Result<ReplyPayload, CommandError> {
        require_args(CommandKind::Quality, args, 1)?;
        let media = media_arg(&args[0])?;
        let backend = self.services.get(media)?;
        require_capability(backend, Capability::Profiles)?;
        let profiles = backend.profiles().await?;
        Ok(ctx.formatter().profiles(media, &profiles))
    }
}

pub struct SetQualityHandler {
    pub settings: Arc<DefaultSettings>,
}

#[async_trait]
impl CommandHandler for SetQualityHandler {
    async fn handle(&self, ctx: &CommandContext, args: &[String]) -> Result<ReplyPayload, CommandError> {
        require_args(CommandKind::SetQuality, args, 2)?;
        let media = media_arg(&args[0])?;
        let profile_id = args[1]
            .parse::<u64>()
            .map_err(|_| CommandError::usage("Quality profile id must be a positive number"))?;
        self.settings.set_quality(media, profile_id).await?;
        info!(request_id = %ctx.request_id, %media, profile_id, "[Commands] Default quality profile changed");
        Ok(ctx
            .formatter()
            .text(format!("Default quality profile for {media} set to {profile_id}")))
    }
}

// ---------------------------------------------------------------------------
// folders / set-folder
// ---------------------------------------------------------------------------

pub struct FoldersHandler {
    pub services: Arc<MediaServices>,
}

#[async_trait]
impl CommandHandler for FoldersHandler {
    async fn handle(&self, ctx: &CommandContext, args: &[String]) -> Result<ReplyPayload, CommandError> {
        require_args(CommandKind::Folders, args, 1)?;
        let media = media_arg(&args[0])?;
        let backend = self.services.get(media)?;
        require_capability(backend, Capability::RootFolders)?;
        let folders = backend.root_folders().await?;
        Ok(ctx.formatter().folders(media, &folders))
    }
}

pub struct SetFolderHandler {
    pub services: Arc<MediaServices>,
    pub settings: Arc<DefaultSettings>,
}

#[async_trait]
impl CommandHandler for SetFolderHandler {
    async fn handle(&self, ctx: &CommandContext, args: &[String]) -> Result<ReplyPayload, CommandError> {
        require_args(CommandKind::SetFolder, args, 2)?;
        let media = media_arg(&args[0])?;
        let value = args[1..].join(" ");

        let path = if value.starts_with('/') || value.starts_with('\\') {
            value
        } else {
            let backend = self.services.get(media)?;
            require_capability(backend, Capability::RootFolders)?;
            let folders = backend.root_folders().await?;
            value
                .parse::<u64>()
                .ok()
                .and_then(|id| folders.into_iter().find(|f| f.id == id))
                .map(|f| f.path)
                .ok_or_else(|| {
                    CommandError::usage(format!(
                        "No root folder with id `{value}`. Run `folders {media}` to list them."
                    ))
                })?
        };

        self.settings.set_root_folder(media, path.clone()).await?;
        info!(request_id = %ctx.request_id, %media, path = %path, "[Commands] Default root folder changed");
        Ok(ctx.formatter().text(format!("Default root folder for {media} set to {path}")))
    }
}

// ---------------------------------------------------------------------------
// discover
// ---------------------------------------------------------------------------

pub struct DiscoverHandler {
    pub services: Arc<MediaServices>,
}

#[async_trait]
impl CommandHandler for DiscoverHandler {
    async fn handle(&self, ctx: &CommandContext, args: &[String]) -> Result<ReplyPayload, CommandError> {
        require_args(CommandKind::Discover, args, 1)?;
        let media = media_arg(&args[0])?;
        let backend = self.services.get(media)?;
        require_capability(backend, Capability::Discover)?;
        let records = backend.discover().await?;
        Ok(ctx.formatter().discover(media, &records))
    }
}

// ---------------------------------------------------------------------------
// remove
// ---------------------------------------------------------------------------

pub struct RemoveHandler {
    pub services: Arc<MediaServices>,
}

#[async_trait]
impl CommandHandler for RemoveHandler {
    async fn handle(&self, ctx: &CommandContext, args: &[String]) -> Result<ReplyPayload, CommandError> {
        require_args(CommandKind::Remove, args, 2)?;
        let media = media_arg(&args[0])?;
        let backend = self.services.get(media)?;
        require_capability(backend, Capability::Remove)?;
        let external_id = external_id_arg(backend, &args[1])?;
        let removed = backend.remove_media(external_id).await?;
        info!(request_id = %ctx.request_id, %media, external_id, "[Commands] Removed media");
        Ok(ctx.formatter().text(format!(
            "Removed {}{} from your {media} library. Files on disk were kept.",
            removed.title,
            year_suffix(removed.year)
        )))
    }
}

// ---------------------------------------------------------------------------
// clear / delete-messages
// ---------------------------------------------------------------------------

pub struct ClearHandler;

#[async_trait]
impl CommandHandler for ClearHandler {
    async fn handle(&self, ctx: &CommandContext, args: &[String]) -> Result<ReplyPayload, CommandError> {
        let limit = match args.first() {
            None => None,
            Some(token) => match token.parse::<u32>() {
                Ok(n) if n > 0 => Some(n),
                _ => return Err(CommandError::usage("Message count must be a positive number")),
            },
        };

        let ids = ctx.transport.recent_messages(&ctx.channel, limit).await?;
        if ids.is_empty() {
            return Ok(ctx.formatter().text("Nothing to delete"));
        }
        let report = ctx.transport.delete_messages(&ctx.channel, &ids).await?;
        if report.failed > 0 {
            warn!(
                request_id = %ctx.request_id,
                channel = %ctx.channel,
                failed = report.failed,
                "[Commands] Some messages could not be deleted"
            );
        }
        Ok(ctx.formatter().text(format!("Deleted {} messages", report.deleted)))
    }
}

// ---------------------------------------------------------------------------
// test
// ---------------------------------------------------------------------------

pub struct TestHandler {
    pub services: Arc<MediaServices>,
}

#[async_trait]
impl CommandHandler for TestHandler {
    async fn handle(&self, ctx: &CommandContext, args: &[String]) -> Result<ReplyPayload, CommandError> {
        let backends = match args.first() {
            Some(token) => vec![Arc::clone(self.services.get(media_arg(token)?)?)],
            None => self.services.all(),
        };
        if backends.is_empty() {
            return Err(CommandError::Unsupported("No media backends are configured".into()));
        }

        let mut results = Vec::with_capacity(backends.len());
        for backend in backends {
            let ok = backend.test_connection().await;
            if !ok {
                warn!(request_id = %ctx.request_id, backend = backend.name(), "[Commands] Connection test failed");
            }
            results.push((backend.name().to_string(), ok));
        }
        Ok(ctx.formatter().connection(&results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use shart_core::{MediaRecord, SearchHit};

    use crate::testing::{RecordingTransport, StubBackend, args, context};

    fn interstellar() -> SearchHit {
        SearchHit {
            title: "Interstellar".into(),
            year: Some(2014),
            external_id: 157336,
            overview: Some("A team travels through a wormhole.".into()),
        }
    }

    fn movie_services(backend: Arc<StubBackend>) -> Arc<MediaServices> {
        Arc::new(MediaServices::new().with(backend))
    }

    #[tokio::test]
    async fn search_joins_title_and_formats_hits() {
        let mut stub = StubBackend::new(MediaType::Movie);
        stub.hits = vec![interstellar()];
        let stub = Arc::new(stub);
        let handler = SearchHandler { services: movie_services(stub.clone()) };

        let reply = handler
            .handle(&context(Arc::new(RecordingTransport::new())), &args("movie interstellar"))
            .await
            .unwrap();

        assert_eq!(stub.last_search.lock().unwrap().as_deref(), Some("interstellar"));
        assert!(reply.text.lines().any(|l| l == "- Interstellar 2014 (157336)"));
    }

    #[tokio::test]
    async fn search_without_title_is_usage_error() {
        let stub = Arc::new(StubBackend::new(MediaType::Movie));
        let handler = SearchHandler { services: movie_services(stub.clone()) };
        let err = handler
            .handle(&context(Arc::new(RecordingTransport::new())), &args("movie"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Usage(_)));
        assert_eq!(stub.calls.total(), 0);
    }

    #[tokio::test]
    async fn unknown_media_type_is_usage_error() {
        let handler = SearchHandler { services: Arc::new(MediaServices::new()) };
        let err = handler
            .handle(&context(Arc::new(RecordingTransport::new())), &args("music abba"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Usage(msg) if msg.contains("music")));
    }

    #[tokio::test]
    async fn missing_backend_is_unsupported() {
        let handler = QualityHandler { services: Arc::new(MediaServices::new()) };
        let err = handler
            .handle(&context(Arc::new(RecordingTransport::new())), &args("show"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Unsupported(_)));
    }

    #[tokio::test]
    async fn backend_failure_is_reported_not_fatal() {
        let mut stub = StubBackend::new(MediaType::Movie);
        stub.fail = true;
        let handler = SearchHandler { services: movie_services(Arc::new(stub)) };
        let err = handler
            .handle(&context(Arc::new(RecordingTransport::new())), &args("movie heat"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Backend { ref message, .. } if message == "Request to radarr failed"));
    }

    #[tokio::test]
    async fn add_without_defaults_never_calls_backend() {
        let stub = Arc::new(StubBackend::new(MediaType::Movie));
        let handler = AddHandler {
            services: movie_services(stub.clone()),
            settings: Arc::new(DefaultSettings::new()),
        };
        let err = handler
            .handle(&context(Arc::new(RecordingTransport::new())), &args("movie 12345"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Precondition(ref msg) if msg.contains("set-quality movie")));
        assert_eq!(stub.calls.add.load(Ordering::SeqCst), 0);
        assert_eq!(stub.calls.total(), 0);
    }

    #[tokio::test]
    async fn add_with_only_quality_asks_for_folder() {
        let stub = Arc::new(StubBackend::new(MediaType::Movie));
        let settings = Arc::new(DefaultSettings::new());
        settings.set_quality(MediaType::Movie, 4).await.unwrap();
        let handler = AddHandler { services: movie_services(stub.clone()), settings };
        let err = handler
            .handle(&context(Arc::new(RecordingTransport::new())), &args("movie 12345"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Precondition(ref msg) if msg.contains("set-folder movie")));
        assert_eq!(stub.calls.add.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn add_submits_monitored_request_with_defaults() {
        let mut stub = StubBackend::new(MediaType::Movie);
        stub.hits = vec![interstellar()];
        let stub = Arc::new(stub);
        let settings = Arc::new(DefaultSettings::new());
        settings.set_quality(MediaType::Movie, 4).await.unwrap();
        settings.set_root_folder(MediaType::Movie, "/data/movies").await.unwrap();
        let handler = AddHandler { services: movie_services(stub.clone()), settings };

        let reply = handler
            .handle(&context(Arc::new(RecordingTransport::new())), &args("movie 157336"))
            .await
            .unwrap();

        assert_eq!(reply.text, "Added Interstellar (2014) to your movie library");
        let request = stub.last_add.lock().unwrap().clone().unwrap();
        assert_eq!(request.quality_profile_id, Some(4));
        assert_eq!(request.root_folder_path.as_deref(), Some("/data/movies"));
        assert!(request.monitored && request.search_on_add);
        assert_eq!(request.record.external_id, 157336);
    }

    #[tokio::test]
    async fn add_reports_already_exists_distinctly() {
        let mut stub = StubBackend::new(MediaType::Movie);
        stub.hits = vec![interstellar()];
        stub.add_outcome = AddOutcome::AlreadyExists;
        let settings = Arc::new(DefaultSettings::new());
        settings.set_quality(MediaType::Movie, 1).await.unwrap();
        settings.set_root_folder(MediaType::Movie, "/m").await.unwrap();
        let handler = AddHandler { services: movie_services(Arc::new(stub)), settings };

        let reply = handler
            .handle(&context(Arc::new(RecordingTransport::new())), &args("movie 157336"))
            .await
            .unwrap();
        assert!(reply.text.contains("already in your movie library"));
        assert_eq!(reply.attachments[0].color, Some(Color::Warning));
    }

    #[tokio::test]
    async fn add_rejects_non_numeric_id() {
        let handler = AddHandler {
            services: movie_services(Arc::new(StubBackend::new(MediaType::Movie))),
            settings: Arc::new(DefaultSettings::new()),
        };
        let err = handler
            .handle(&context(Arc::new(RecordingTransport::new())), &args("movie abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Usage(ref msg) if msg.contains("TMDB")));
    }

    #[tokio::test]
    async fn wanted_list_backend_adds_without_defaults() {
        let mut stub = StubBackend::new(MediaType::Movie);
        stub.hits = vec![interstellar()];
        stub.unsupported = vec![Capability::Profiles, Capability::RootFolders];
        let stub = Arc::new(stub);
        let handler = AddHandler {
            services: movie_services(stub.clone()),
            settings: Arc::new(DefaultSettings::new()),
        };

        let reply = handler
            .handle(&context(Arc::new(RecordingTransport::new())), &args("movie tt0157336"))
            .await
            .unwrap();

        assert_eq!(reply.text, "Added Interstellar (2014) to your movie library");
        let request = stub.last_add.lock().unwrap().clone().unwrap();
        assert_eq!(request.record.external_id, 157336);
        assert_eq!(request.quality_profile_id, None);
        assert_eq!(request.root_folder_path, None);
    }

    #[tokio::test]
    async fn quality_and_folders_require_capability() {
        let mut stub = StubBackend::new(MediaType::Movie);
        stub.unsupported = vec![Capability::Profiles, Capability::RootFolders];
        let stub = Arc::new(stub);
        let ctx = context(Arc::new(RecordingTransport::new()));

        let err = QualityHandler { services: movie_services(stub.clone()) }
            .handle(&ctx, &args("movie"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Unsupported(ref msg) if msg.contains("quality profiles")));

        let err = FoldersHandler { services: movie_services(stub.clone()) }
            .handle(&ctx, &args("movie"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Unsupported(ref msg) if msg.contains("root folders")));
        assert_eq!(stub.calls.total(), 0);
    }

    #[tokio::test]
    async fn library_clamps_oversized_page() {
        let mut stub = StubBackend::new(MediaType::Show);
        stub.library = (0..30)
            .map(|i| MediaRecord {
                title: format!("Show {i}"),
                ..Default::default()
            })
            .collect();
        let handler = LibraryHandler { services: Arc::new(MediaServices::new().with(Arc::new(stub))) };

        let reply = handler
            .handle(&context(Arc::new(RecordingTransport::new())), &args("show 99999999999999999999999"))
            .await
            .unwrap();
        assert!(reply.text.contains("page 2 of 2"));
    }

    #[tokio::test]
    async fn library_parses_filter_and_page() {
        let mut stub = StubBackend::new(MediaType::Show);
        stub.library = (0..30)
            .map(|i| MediaRecord {
                title: format!("Show {i}"),
                monitored: true,
                downloaded: i % 3 == 0,
                ..Default::default()
            })
            .collect();
        let stub = Arc::new(stub);
        let handler = LibraryHandler { services: Arc::new(MediaServices::new().with(stub.clone())) };

        let reply = handler
            .handle(&context(Arc::new(RecordingTransport::new())), &args("show missing 2"))
            .await
            .unwrap();
        assert_eq!(*stub.last_filter.lock().unwrap(), Some(LibraryFilter::Missing));
        assert!(reply.text.contains("page 1 of 1"));
        assert!(reply.text.contains("20 titles (missing)"));
    }

    #[tokio::test]
    async fn library_rejects_unknown_filter() {
        let stub = Arc::new(StubBackend::new(MediaType::Show));
        let handler = LibraryHandler { services: Arc::new(MediaServices::new().with(stub.clone())) };
        let err = handler
            .handle(&context(Arc::new(RecordingTransport::new())), &args("show wanted"))
            .await
            .unwrap_err();
        let CommandError::Usage(msg) = err else { panic!("expected usage error") };
        for token in LibraryFilter::TOKENS {
            assert!(msg.contains(token));
        }
        assert_eq!(stub.calls.total(), 0);
    }

    #[tokio::test]
    async fn set_quality_rejects_zero_and_text() {
        let settings = Arc::new(DefaultSettings::new());
        let handler = SetQualityHandler { settings: settings.clone() };
        let ctx = context(Arc::new(RecordingTransport::new()));

        handler.handle(&ctx, &args("movie 5")).await.unwrap();
        assert!(handler.handle(&ctx, &args("movie 0")).await.is_err());
        assert!(handler.handle(&ctx, &args("movie best")).await.is_err());
        assert_eq!(settings.get(MediaType::Movie).await.quality_profile_id, Some(5));
    }

    #[tokio::test]
    async fn set_folder_accepts_path_or_id() {
        let stub = Arc::new(StubBackend::new(MediaType::Movie));
        let settings = Arc::new(DefaultSettings::new());
        let handler = SetFolderHandler { services: movie_services(stub.clone()), settings: settings.clone() };
        let ctx = context(Arc::new(RecordingTransport::new()));

        handler.handle(&ctx, &args("movie /data/movies")).await.unwrap();
        handler.handle(&ctx, &args("movie /data/movies")).await.unwrap();
        assert_eq!(settings.get(MediaType::Movie).await.root_folder.as_deref(), Some("/data/movies"));
        assert_eq!(stub.calls.root_folders.load(Ordering::SeqCst), 0);

        handler.handle(&ctx, &args("movie 1")).await.unwrap();
        assert_eq!(settings.get(MediaType::Movie).await.root_folder.as_deref(), Some("/data/media"));
    }

    #[tokio::test]
    async fn set_folder_names_unknown_id() {
        let handler = SetFolderHandler {
            services: movie_services(Arc::new(StubBackend::new(MediaType::Movie))),
            settings: Arc::new(DefaultSettings::new()),
        };
        let err = handler
            .handle(&context(Arc::new(RecordingTransport::new())), &args("movie 42"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Usage(ref msg) if msg.contains("`42`")));
    }

    #[tokio::test]
    async fn discover_requires_capability() {
        let stub = Arc::new(StubBackend::new(MediaType::Show));
        let handler = DiscoverHandler { services: Arc::new(MediaServices::new().with(stub.clone())) };
        let err = handler
            .handle(&context(Arc::new(RecordingTransport::new())), &args("show"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Unsupported(ref msg) if msg.contains("discovery")));
        assert_eq!(stub.calls.discover.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn remove_reports_missing_title() {
        let handler = RemoveHandler { services: movie_services(Arc::new(StubBackend::new(MediaType::Movie))) };
        let err = handler
            .handle(&context(Arc::new(RecordingTransport::new())), &args("movie 99"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Usage(ref msg) if msg.contains("in your library")));
    }

    #[tokio::test]
    async fn clear_deletes_bounded_history() {
        let transport = Arc::new(RecordingTransport::with_history(&["5", "4", "3", "2", "1"]));
        let reply = ClearHandler.handle(&context(transport.clone()), &args("3")).await.unwrap();
        assert_eq!(reply.text, "Deleted 3 messages");
        assert_eq!(*transport.deleted.lock().unwrap(), vec!["5", "4", "3"]);
    }

    #[tokio::test]
    async fn clear_counts_partial_failures() {
        let mut transport = RecordingTransport::with_history(&["3", "2", "1"]);
        transport.undeletable = vec!["2".into()];
        let reply = ClearHandler.handle(&context(Arc::new(transport)), &[]).await.unwrap();
        assert_eq!(reply.text, "Deleted 2 messages");
    }

    #[tokio::test]
    async fn clear_rejects_bad_limit_and_unsupported_transport() {
        let err = ClearHandler
            .handle(&context(Arc::new(RecordingTransport::new())), &args("lots"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Usage(_)));

        let err = ClearHandler
            .handle(&context(Arc::new(RecordingTransport::new())), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Unsupported(_)));
    }

    #[tokio::test]
    async fn test_checks_every_backend() {
        let movie = Arc::new(StubBackend::new(MediaType::Movie));
        let mut show = StubBackend::new(MediaType::Show);
        show.reachable = false;
        let show = Arc::new(show);
        let handler = TestHandler {
            services: Arc::new(MediaServices::new().with(movie.clone()).with(show.clone())),
        };

        let reply = handler
            .handle(&context(Arc::new(RecordingTransport::new())), &[])
            .await
            .unwrap();
        assert!(reply.text.contains("Connection to radarr worked!"));
        assert!(reply.text.contains("Connection to sonarr failed!"));

        let reply = handler
            .handle(&context(Arc::new(RecordingTransport::new())), &args("movie"))
            .await
            .unwrap();
        assert_eq!(reply.attachments.len(), 1);
        assert_eq!(movie.calls.test.load(Ordering::SeqCst), 2);
        assert_eq!(show.calls.test.load(Ordering::SeqCst), 1);
    }
}
