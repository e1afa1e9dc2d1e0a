use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shart_core::{AddOutcome, BackendError, QualityProfile, RootFolder};
use tracing::debug;

/// Connection settings for one Radarr/Sonarr instance.
#[derive(Debug, Clone)]
pub struct ArrSettings {
    /// Base URL including scheme and port, e.g. `http://localhost:7878`.
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// Thin JSON client shared by the Radarr and Sonarr backends.
///
/// Every request carries the `X-Api-Key` header and the configured timeout.
/// Transport failures and non-2xx statuses come back as [`BackendError`].
#[derive(Clone)]
pub struct ArrClient {
    client: Client,
    backend: &'static str,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

/// One entry of the validation error list Radarr/Sonarr return with a 400.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidationFailure {
    #[serde(default)]
    error_message: String,
    #[serde(default)]
    error_code: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRootFolder {
    id: u64,
    path: String,
    free_space: Option<u64>,
}

impl ArrClient {
    pub fn new(backend: &'static str, settings: ArrSettings) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| BackendError::Network {
                backend: backend.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            backend,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key,
            timeout: settings.timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v3/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("X-Api-Key", &self.api_key)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<(StatusCode, String), BackendError> {
        let response = self.request(builder).send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        Ok((status, body))
    }

    fn transport_error(&self, err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::Timeout {
                backend: self.backend.to_string(),
                secs: self.timeout.as_secs(),
            }
        } else {
            BackendError::Network {
                backend: self.backend.to_string(),
                message: err.without_url().to_string(),
            }
        }
    }

    fn http_error(&self, status: StatusCode, body: String) -> BackendError {
        BackendError::Http {
            backend: self.backend.to_string(),
            status: status.as_u16(),
            body: truncate(body),
        }
    }

    fn decode<T: DeserializeOwned>(&self, body: &str) -> Result<T, BackendError> {
        serde_json::from_str(body).map_err(|e| BackendError::Decode {
            backend: self.backend.to_string(),
            message: e.to_string(),
        })
    }

    /// `GET /api/v3/{path}` and decode the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, BackendError> {
        debug!(backend = self.backend, path, "GET");
        let (status, body) = self.send(self.client.get(self.url(path)).query(query)).await?;
        if !status.is_success() {
            return Err(self.http_error(status, body));
        }
        self.decode(&body)
    }

    /// Like [`get`](Self::get), but a 404 becomes `Ok(None)`.
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, BackendError> {
        debug!(backend = self.backend, path, "GET");
        let (status, body) = self.send(self.client.get(self.url(path)).query(query)).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(self.http_error(status, body));
        }
        self.decode(&body).map(Some)
    }

    /// `POST /api/v3/{path}` for an add request.
    ///
    /// A 400 carrying `exists_code` in its validation list means the title is
    /// already in the library; any other 400 is a rejection with the
    /// backend's messages.
    pub async fn post_add(
        &self,
        path: &str,
        payload: &serde_json::Value,
        exists_code: &str,
    ) -> Result<AddOutcome, BackendError> {
        debug!(backend = self.backend, path, "POST");
        let (status, body) = self.send(self.client.post(self.url(path)).json(payload)).await?;
        if status.is_success() {
            return Ok(AddOutcome::Added);
        }
        if status != StatusCode::BAD_REQUEST {
            return Err(self.http_error(status, body));
        }

        let failures: Vec<ValidationFailure> = serde_json::from_str(&body).unwrap_or_default();
        if failures.iter().any(|f| f.error_code.as_deref() == Some(exists_code)) {
            return Ok(AddOutcome::AlreadyExists);
        }
        let mut messages: Vec<String> = failures
            .into_iter()
            .map(|f| f.error_message)
            .filter(|m| !m.is_empty())
            .collect();
        if messages.is_empty() {
            messages.push(truncate(body));
        }
        Ok(AddOutcome::Rejected(messages))
    }

    /// `DELETE /api/v3/{path}`.
    pub async fn delete(&self, path: &str, query: &[(&str, String)]) -> Result<(), BackendError> {
        debug!(backend = self.backend, path, "DELETE");
        let (status, body) = self.send(self.client.delete(self.url(path)).query(query)).await?;
        if !status.is_success() {
            return Err(self.http_error(status, body));
        }
        Ok(())
    }

    pub async fn quality_profiles(&self) -> Result<Vec<QualityProfile>, BackendError> {
        self.get("qualityprofile", &[]).await
    }

    pub async fn root_folders(&self) -> Result<Vec<RootFolder>, BackendError> {
        let folders: Vec<WireRootFolder> = self.get("rootfolder", &[]).await?;
        Ok(folders
            .into_iter()
            .map(|f| RootFolder {
                id: f.id,
                path: f.path,
                free_space: f.free_space,
            })
            .collect())
    }

    /// `GET /api/v3/system/status`; any failure counts as unreachable.
    pub async fn ping(&self) -> bool {
        match self.get::<serde_json::Value>("system/status", &[]).await {
            Ok(_) => true,
            Err(err) => {
                debug!(backend = self.backend, error = %err, "Connection test failed");
                false
            }
        }
    }
}

/// Error bodies can be whole HTML pages; keep log lines readable.
pub(crate) fn truncate(mut body: String) -> String {
    const MAX: usize = 512;
    if body.len() > MAX {
        let mut cut = MAX;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push('…');
    }
    body
}

/// Radarr reports unknown years as 0.
pub(crate) fn known_year(year: Option<i32>) -> Option<i32> {
    year.filter(|y| *y > 0)
}
