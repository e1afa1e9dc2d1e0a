use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use shart_core::{
    AddOutcome, AddRequest, BackendError, LibraryFilter, MediaBackend, MediaRecord, MediaType,
    QualityProfile, ReleaseStatus, RootFolder, SearchHit,
};
use tracing::info;

use crate::arr::{known_year, ArrClient, ArrSettings};

const NAME: &str = "sonarr";
const EXISTS_VALIDATOR: &str = "SeriesExistsValidator";

/// Show backend over the Sonarr v3 API. External ids are TVDB ids.
///
/// Sonarr has no recommendation endpoint, so discovery stays unsupported.
#[derive(Clone)]
pub struct SonarrClient {
    http: ArrClient,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStatistics {
    #[serde(default)]
    episode_file_count: u64,
    #[serde(default)]
    episode_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSeries {
    #[serde(default)]
    id: Option<u64>,
    title: String,
    #[serde(default)]
    year: Option<i32>,
    tvdb_id: u64,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    monitored: bool,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    statistics: Option<WireStatistics>,
}

fn release_status(status: Option<&str>) -> ReleaseStatus {
    match status {
        Some("upcoming") => ReleaseStatus::Announced,
        Some("continuing") | Some("ended") => ReleaseStatus::Released,
        _ => ReleaseStatus::Unknown,
    }
}

impl SonarrClient {
    pub fn new(settings: ArrSettings) -> Result<Self, BackendError> {
        Ok(Self {
            http: ArrClient::new(NAME, settings)?,
        })
    }

    fn record(&self, raw: Value) -> Result<MediaRecord, BackendError> {
        let series: WireSeries = serde_json::from_value(raw.clone()).map_err(|e| BackendError::Decode {
            backend: NAME.to_string(),
            message: e.to_string(),
        })?;
        let stats = series.statistics.unwrap_or_default();
        Ok(MediaRecord {
            external_id: series.tvdb_id,
            library_id: series.id.filter(|id| *id > 0),
            title: series.title,
            year: known_year(series.year),
            overview: series.overview,
            monitored: series.monitored,
            // Every aired episode has a file.
            downloaded: stats.episode_count > 0 && stats.episode_file_count >= stats.episode_count,
            status: release_status(series.status.as_deref()),
            raw,
        })
    }

    fn records(&self, raw: Vec<Value>) -> Result<Vec<MediaRecord>, BackendError> {
        raw.into_iter().map(|v| self.record(v)).collect()
    }

    async fn all_series(&self) -> Result<Vec<MediaRecord>, BackendError> {
        let raw: Vec<Value> = self.http.get("series", &[]).await?;
        self.records(raw)
    }
}

#[async_trait]
impl MediaBackend for SonarrClient {
    fn name(&self) -> &str {
        NAME
    }

    fn media_type(&self) -> MediaType {
        MediaType::Show
    }

    async fn search(&self, term: &str) -> Result<Vec<SearchHit>, BackendError> {
        let raw: Vec<Value> = self.http.get("series/lookup", &[("term", term.to_string())]).await?;
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
        let raw: Vec<Value> = self
            .http
            .get("series/lookup", &[("term", format!("tvdb:{external_id}"))])
            .await?;
        match raw.into_iter().next() {
            Some(value) => self.record(value),
            None => Err(BackendError::NotFound(format!("No show with TVDB id {external_id}"))),
        }
    }

    async fn add_media(&self, request: AddRequest) -> Result<AddOutcome, BackendError> {
        let mut payload = match request.record.raw {
            Value::Object(map) => Value::Object(map),
            _ => json!({
                "title": request.record.title,
                "tvdbId": request.record.external_id,
            }),
        };
        payload["qualityProfileId"] = json!(request.quality_profile_id);
        payload["rootFolderPath"] = json!(request.root_folder_path);
        payload["monitored"] = json!(request.monitored);
        payload["seasonFolder"] = json!(true);
        payload["addOptions"] = json!({ "searchForMissingEpisodes": request.search_on_add });
        // Sonarr v3 insists on a language profile; v4 ignores the field.
        if payload.get("languageProfileId").is_none() {
            payload["languageProfileId"] = json!(1);
        }

        let outcome = self.http.post_add("series", &payload, EXISTS_VALIDATOR).await?;
        info!(backend = NAME, tvdb_id = request.record.external_id, outcome = ?outcome, "Add request finished");
        Ok(outcome)
    }

    async fn library(&self, filter: LibraryFilter) -> Result<Vec<MediaRecord>, BackendError> {
        let mut series = self.all_series().await?;
        series.retain(|s| filter.matches(s));
        series.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        Ok(series)
    }

    async fn remove_media(&self, external_id: u64) -> Result<MediaRecord, BackendError> {
        let not_found = || BackendError::NotFound(format!("No show with TVDB id {external_id} in your library"));
        let series = self
            .all_series()
            .await?
            .into_iter()
            .find(|s| s.external_id == external_id)
            .ok_or_else(not_found)?;
        let library_id = series.library_id.ok_or_else(not_found)?;
        self.http
            .delete(&format!("series/{library_id}"), &[("deleteFiles", "false".to_string())])
            .await?;
        info!(backend = NAME, tvdb_id = external_id, "Removed show");
        Ok(series)
    }

    async fn test_connection(&self) -> bool {
        self.http.ping().await
    }
}
