use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use shart_core::{
    AddOutcome, AddRequest, BackendError, Capability, LibraryFilter, MediaBackend, MediaRecord,
    MediaType, QualityProfile, ReleaseStatus, RootFolder, SearchHit,
};
use tracing::info;

use crate::arr::{known_year, ArrClient, ArrSettings};

const NAME: &str = "radarr";
const EXISTS_VALIDATOR: &str = "MovieExistsValidator";

/// Movie backend over the Radarr v3 API. External ids are TMDB ids.
#[derive(Clone)]
pub struct RadarrClient {
    http: ArrClient,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMovie {
    #[serde(default)]
    id: Option<u64>,
    title: String,
    #[serde(default)]
    year: Option<i32>,
    tmdb_id: u64,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    monitored: bool,
    #[serde(default)]
    has_file: bool,
    #[serde(default)]
    status: Option<String>,
}

fn release_status(status: Option<&str>) -> ReleaseStatus {
    match status {
        Some("announced") | Some("tba") => ReleaseStatus::Announced,
        Some("inCinemas") => ReleaseStatus::InCinemas,
        Some("released") => ReleaseStatus::Released,
        _ => ReleaseStatus::Unknown,
    }
}

impl RadarrClient {
    pub fn new(settings: ArrSettings) -> Result<Self, BackendError> {
        Ok(Self {
            http: ArrClient::new(NAME, settings)?,
        })
    }

    fn record(&self, raw: Value) -> Result<MediaRecord, BackendError> {
        let movie: WireMovie = serde_json::from_value(raw.clone()).map_err(|e| BackendError::Decode {
            backend: NAME.to_string(),
            message: e.to_string(),
        })?;
        Ok(MediaRecord {
            external_id: movie.tmdb_id,
            library_id: movie.id.filter(|id| *id > 0),
            title: movie.title,
            year: known_year(movie.year),
            overview: movie.overview,
            monitored: movie.monitored,
            downloaded: movie.has_file,
            status: release_status(movie.status.as_deref()),
            raw,
        })
    }

    fn records(&self, raw: Vec<Value>) -> Result<Vec<MediaRecord>, BackendError> {
        raw.into_iter().map(|v| self.record(v)).collect()
    }

    async fn all_movies(&self) -> Result<Vec<MediaRecord>, BackendError> {
        let raw: Vec<Value> = self.http.get("movie", &[]).await?;
        self.records(raw)
    }
}

#[async_trait]
impl MediaBackend for RadarrClient {
    fn name(&self) -> &str {
        NAME
    }

    fn media_type(&self) -> MediaType {
        MediaType::Movie
    }

    fn supports(&self, _capability: Capability) -> bool {
        true
    }

    async fn search(&self, term: &str) -> Result<Vec<SearchHit>, BackendError> {
        let raw: Vec<Value> = self.http.get("movie/lookup", &[("term", term.to_string())]).await?;
        Ok(self
            .records(raw)?
            .into_iter()
            .map(|r| SearchHit {
                title: r.title,
                year: r.year,
                external_id: r.external_id,
                overview: r.overview,
            })
            .collect())
    }

    async fn profiles(&self) -> Result<Vec<QualityProfile>, BackendError> {
        self.http.quality_profiles().await
    }

    async fn root_folders(&self) -> Result<Vec<RootFolder>, BackendError> {
        self.http.root_folders().await
    }

    async fn media_by_id(&self, external_id: u64) -> Result<MediaRecord, BackendError> {
        let raw: Option<Value> = self
            .http
            .get_optional("movie/lookup/tmdb", &[("tmdbId", external_id.to_string())])
            .await?;
        match raw {
            Some(value) if !value.is_null() => self.record(value),
            _ => Err(BackendError::NotFound(format!("No movie with TMDB id {external_id}"))),
        }
    }

    async fn add_media(&self, request: AddRequest) -> Result<AddOutcome, BackendError> {
        let mut payload = match request.record.raw {
            Value::Object(map) => Value::Object(map),
            _ => json!({
                "title": request.record.title,
                "year": request.record.year.unwrap_or_default(),
                "tmdbId": request.record.external_id,
            }),
        };
        payload["qualityProfileId"] = json!(request.quality_profile_id);
        payload["rootFolderPath"] = json!(request.root_folder_path);
        payload["monitored"] = json!(request.monitored);
        payload["addOptions"] = json!({ "searchForMovie": request.search_on_add });

        let outcome = self.http.post_add("movie", &payload, EXISTS_VALIDATOR).await?;
        info!(backend = NAME, tmdb_id = request.record.external_id, outcome = ?outcome, "Add request finished");
        Ok(outcome)
    }

    async fn library(&self, filter: LibraryFilter) -> Result<Vec<MediaRecord>, BackendError> {
        let mut movies = self.all_movies().await?;
        movies.retain(|m| filter.matches(m));
        movies.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        Ok(movies)
    }

    async fn remove_media(&self, external_id: u64) -> Result<MediaRecord, BackendError> {
        let movie = self
            .all_movies()
            .await?
            .into_iter()
            .find(|m| m.external_id == external_id)
            .ok_or_else(|| BackendError::NotFound(format!("No movie with TMDB id {external_id} in your library")))?;
        let Some(library_id) = movie.library_id else {
            return Err(BackendError::NotFound(format!("No movie with TMDB id {external_id} in your library")));
        };
        self.http
            .delete(&format!("movie/{library_id}"), &[("deleteFiles", "false".to_string())])
            .await?;
        info!(backend = NAME, tmdb_id = external_id, "Removed movie");
        Ok(movie)
    }

    async fn discover(&self) -> Result<Vec<MediaRecord>, BackendError> {
        let raw: Vec<Value> = self
            .http
            .get("importlist/movie", &[("includeRecommendations", "true".to_string())])
            .await?;
        self.records(raw)
    }

    async fn test_connection(&self) -> bool {
        self.http.ping().await
    }
}
