//! Movie backend over the CouchPotato API.
//!
//! CouchPotato keeps a wanted list rather than a library with quality
//! profiles and root folders. External ids are the numeric part of IMDb ids
//! (`tt0816692` is `816692`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use shart_core::{
    AddOutcome, AddRequest, BackendError, Capability, LibraryFilter, MediaBackend, MediaRecord,
    MediaType, QualityProfile, ReleaseStatus, RootFolder, SearchHit,
};
use tracing::{debug, info};

use crate::arr::{known_year, truncate, ArrSettings};

const NAME: &str = "couchpotato";

#[derive(Clone)]
pub struct CouchPotatoClient {
    client: Client,
    /// `{host}/api/{api_key}`
    api_url: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct Status {
    #[serde(default)]
    success: bool,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    movies: Vec<WireSearchMovie>,
}

#[derive(Deserialize)]
struct WireSearchMovie {
    #[serde(default)]
    original_title: Option<String>,
    #[serde(default)]
    titles: Vec<String>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    imdb: Option<String>,
    #[serde(default)]
    plot: Option<String>,
    /// `false` or the stored media document.
    #[serde(default)]
    in_library: Value,
    #[serde(default)]
    in_wanted: Value,
}

impl WireSearchMovie {
    fn title(&self) -> String {
        self.original_title
            .clone()
            .or_else(|| self.titles.first().cloned())
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct WantedResponse {
    #[serde(default)]
    movies: Vec<WireWanted>,
}

#[derive(Deserialize)]
struct WireWanted {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    info: WireInfo,
    #[serde(default)]
    identifiers: WireIdentifiers,
    #[serde(default)]
    releases: Vec<WireRelease>,
}

#[derive(Default, Deserialize)]
struct WireInfo {
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    plot: Option<String>,
    #[serde(default)]
    imdb: Option<String>,
}

#[derive(Default, Deserialize)]
struct WireIdentifiers {
    #[serde(default)]
    imdb: Option<String>,
}

#[derive(Deserialize)]
struct WireRelease {
    #[serde(default)]
    status: String,
}

fn imdb_number(imdb: &str) -> Option<u64> {
    imdb.strip_prefix("tt")?.parse().ok()
}

fn imdb_id(number: u64) -> String {
    format!("tt{number:07}")
}

fn truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

impl CouchPotatoClient {
    pub fn new(settings: ArrSettings) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| BackendError::Network {
                backend: NAME.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            api_url: format!("{}/api/{}", settings.base_url.trim_end_matches('/'), settings.api_key),
            timeout: settings.timeout,
        })
    }

    /// `GET {api_url}/{endpoint}/` and decode the JSON body.
    async fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<T, BackendError> {
        debug!(backend = NAME, endpoint, "GET");
        let url = format!("{}/{endpoint}/", self.api_url);
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            return Err(BackendError::Http {
                backend: NAME.to_string(),
                status: status.as_u16(),
                body: truncate(body),
            });
        }
        serde_json::from_str(&body).map_err(|e| BackendError::Decode {
            backend: NAME.to_string(),
            message: e.to_string(),
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::Timeout {
                backend: NAME.to_string(),
                secs: self.timeout.as_secs(),
            }
        } else {
            // The api key is part of the path, so the url must not leak into errors.
            BackendError::Network {
                backend: NAME.to_string(),
                message: err.without_url().to_string(),
            }
        }
    }

    async fn lookup(&self, term: &str) -> Result<Vec<WireSearchMovie>, BackendError> {
        let response: SearchResponse = self.get("search", &[("q", term.to_string())]).await?;
        Ok(response.movies)
    }

    /// The wanted list with CouchPotato's own media ids.
    async fn wanted(&self) -> Result<Vec<(String, MediaRecord)>, BackendError> {
        let response: WantedResponse = self
            .get("media.list", &[("type", "movie".to_string()), ("status", "active".to_string())])
            .await?;
        Ok(response
            .movies
            .into_iter()
            .filter_map(|movie| {
                let imdb = movie.identifiers.imdb.as_deref().or(movie.info.imdb.as_deref())?;
                let external_id = imdb_number(imdb)?;
                let record = MediaRecord {
                    external_id,
                    library_id: None,
                    title: movie.title,
                    year: known_year(movie.info.year),
                    overview: movie.info.plot,
                    monitored: movie.status.as_deref() == Some("active"),
                    downloaded: movie.releases.iter().any(|r| r.status == "done"),
                    status: ReleaseStatus::Unknown,
                    raw: Value::Null,
                };
                Some((movie.id, record))
            })
            .collect())
    }
}

#[async_trait]
impl MediaBackend for CouchPotatoClient {
    fn name(&self) -> &str {
        NAME
    }

    fn media_type(&self) -> MediaType {
        MediaType::Movie
    }

    fn id_source(&self) -> &str {
        "IMDb"
    }

    fn supports(&self, capability: Capability) -> bool {
        matches!(
            capability,
            Capability::Search | Capability::Add | Capability::Library | Capability::Remove
        )
    }

    async fn search(&self, term: &str) -> Result<Vec<SearchHit>, BackendError> {
        Ok(self
            .lookup(term)
            .await?
            .into_iter()
            .filter_map(|movie| {
                let external_id = imdb_number(movie.imdb.as_deref()?)?;
                Some(SearchHit {
                    title: movie.title(),
                    year: known_year(movie.year),
                    external_id,
                    overview: movie.plot,
                })
            })
            .collect())
    }

    async fn profiles(&self) -> Result<Vec<QualityProfile>, BackendError> {
        Err(BackendError::Unsupported {
            backend: NAME.to_string(),
            capability: Capability::Profiles,
        })
    }

    async fn root_folders(&self) -> Result<Vec<RootFolder>, BackendError> {
        Err(BackendError::Unsupported {
            backend: NAME.to_string(),
            capability: Capability::RootFolders,
        })
    }

    async fn media_by_id(&self, external_id: u64) -> Result<MediaRecord, BackendError> {
        let imdb = imdb_id(external_id);
        let movie = self
            .lookup(&imdb)
            .await?
            .into_iter()
            .find(|m| m.imdb.as_deref() == Some(imdb.as_str()))
            .ok_or_else(|| BackendError::NotFound(format!("No movie with IMDb id {imdb}")))?;
        Ok(MediaRecord {
            external_id,
            library_id: None,
            title: movie.title(),
            year: known_year(movie.year),
            overview: movie.plot.clone(),
            monitored: truthy(&movie.in_wanted),
            downloaded: truthy(&movie.in_library),
            status: ReleaseStatus::Unknown,
            raw: Value::Null,
        })
    }

    async fn add_media(&self, request: AddRequest) -> Result<AddOutcome, BackendError> {
        let record = request.record;
        if record.monitored || record.downloaded {
            return Ok(AddOutcome::AlreadyExists);
        }

        let imdb = imdb_id(record.external_id);
        let status: Status = self.get("movie.add", &[("identifier", imdb.clone())]).await?;
        let outcome = if status.success {
            AddOutcome::Added
        } else {
            AddOutcome::Rejected(vec![format!("{imdb} was not added to the wanted list")])
        };
        info!(backend = NAME, imdb = %imdb, outcome = ?outcome, "Add request finished");
        Ok(outcome)
    }

    async fn library(&self, filter: LibraryFilter) -> Result<Vec<MediaRecord>, BackendError> {
        let mut movies: Vec<MediaRecord> = self
            .wanted()
            .await?
            .into_iter()
            .map(|(_, record)| record)
            .filter(|record| filter.matches(record))
            .collect();
        movies.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        Ok(movies)
    }

    async fn remove_media(&self, external_id: u64) -> Result<MediaRecord, BackendError> {
        let imdb = imdb_id(external_id);
        let (media_id, record) = self
            .wanted()
            .await?
            .into_iter()
            .find(|(_, record)| record.external_id == external_id)
            .ok_or_else(|| BackendError::NotFound(format!("No movie with IMDb id {imdb} in your wanted list")))?;

        let status: Status = self
            .get("movie.delete", &[("id", media_id), ("delete_from", "wanted".to_string())])
            .await?;
        if !status.success {
            return Err(BackendError::NotFound(format!(
                "{NAME} could not remove {imdb} from the wanted list"
            )));
        }
        info!(backend = NAME, imdb = %imdb, "Removed movie");
        Ok(record)
    }

    async fn test_connection(&self) -> bool {
        match self.get::<Status>("app.available", &[]).await {
            Ok(status) => status.success,
            Err(err) => {
                debug!(backend = NAME, error = %err, "Connection test failed");
                false
            }
        }
    }
}
