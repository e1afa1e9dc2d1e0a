use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Media type
// ---------------------------------------------------------------------------

/// Which kind of media a command targets. Selects the backend to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Show,
}

impl MediaType {
    pub const ALL: [MediaType; 2] = [MediaType::Movie, MediaType::Show];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Show => "show",
        }
    }

    /// Name of the external catalogue whose ids the backend accepts.
    pub fn id_source(&self) -> &'static str {
        match self {
            MediaType::Movie => "TMDB",
            MediaType::Show => "TVDB",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown media type `{0}` (expected `movie` or `show`)")]
pub struct UnknownMediaType(pub String);

impl FromStr for MediaType {
    type Err = UnknownMediaType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" => Ok(MediaType::Movie),
            "show" => Ok(MediaType::Show),
            other => Err(UnknownMediaType(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Backend records
// ---------------------------------------------------------------------------

/// One search result from a backend lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub year: Option<i32>,
    pub external_id: u64,
    pub overview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityProfile {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootFolder {
    pub id: u64,
    pub path: String,
    pub free_space: Option<u64>,
}

/// Coarse release state used by the `released`/`announced`/`cinemas` filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseStatus {
    Announced,
    InCinemas,
    Released,
    #[default]
    Unknown,
}

/// A title as known to a backend, either from its library or from a lookup.
///
/// `raw` keeps the vendor payload so it can be sent back unchanged when the
/// record is submitted for adding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub external_id: u64,
    /// Backend-internal id; `None` for records that are not in the library.
    pub library_id: Option<u64>,
    pub title: String,
    pub year: Option<i32>,
    pub overview: Option<String>,
    pub monitored: bool,
    pub downloaded: bool,
    pub status: ReleaseStatus,
    #[serde(default)]
    pub raw: serde_json::Value,
}

/// Everything a backend needs to add a title.
///
/// The profile and folder are `None` for backends without
/// [`Capability::Profiles`] / [`Capability::RootFolders`].
#[derive(Debug, Clone)]
pub struct AddRequest {
    pub record: MediaRecord,
    pub quality_profile_id: Option<u64>,
    pub root_folder_path: Option<String>,
    pub monitored: bool,
    pub search_on_add: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyExists,
    /// The backend refused the request; messages are the validation errors it returned.
    Rejected(Vec<String>),
}

// ---------------------------------------------------------------------------
// Library filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryFilter {
    #[default]
    All,
    Monitored,
    Downloaded,
    Missing,
    Released,
    Announced,
    Cinemas,
}

impl LibraryFilter {
    /// Tokens accepted on the command line, in help order.
    pub const TOKENS: [&'static str; 6] = [
        "monitored",
        "downloaded",
        "missing",
        "released",
        "announced",
        "cinemas",
    ];

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "all" => Some(LibraryFilter::All),
            "monitored" => Some(LibraryFilter::Monitored),
            "downloaded" => Some(LibraryFilter::Downloaded),
            "missing" => Some(LibraryFilter::Missing),
            "released" => Some(LibraryFilter::Released),
            "announced" => Some(LibraryFilter::Announced),
            "cinemas" => Some(LibraryFilter::Cinemas),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LibraryFilter::All => "all",
            LibraryFilter::Monitored => "monitored",
            LibraryFilter::Downloaded => "downloaded",
            LibraryFilter::Missing => "missing",
            LibraryFilter::Released => "released",
            LibraryFilter::Announced => "announced",
            LibraryFilter::Cinemas => "cinemas",
        }
    }

    pub fn matches(&self, record: &MediaRecord) -> bool {
        match self {
            LibraryFilter::All => true,
            LibraryFilter::Monitored => record.monitored,
            LibraryFilter::Downloaded => record.downloaded,
            LibraryFilter::Missing => record.monitored && !record.downloaded,
            LibraryFilter::Released => record.status == ReleaseStatus::Released,
            LibraryFilter::Announced => record.status == ReleaseStatus::Announced,
            LibraryFilter::Cinemas => record.status == ReleaseStatus::InCinemas,
        }
    }
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// Optional backend features a handler checks before calling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Search,
    Profiles,
    RootFolders,
    Add,
    Library,
    Remove,
    Discover,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Search => "search",
            Capability::Profiles => "quality profiles",
            Capability::RootFolders => "root folders",
            Capability::Add => "adding media",
            Capability::Library => "library listing",
            Capability::Remove => "removing media",
            Capability::Discover => "discovery",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_parses_case_insensitively() {
        assert_eq!("Movie".parse::<MediaType>().unwrap(), MediaType::Movie);
        assert_eq!("show".parse::<MediaType>().unwrap(), MediaType::Show);
        assert!("series".parse::<MediaType>().is_err());
        assert!("".parse::<MediaType>().is_err());
    }

    #[test]
    fn missing_means_monitored_without_file() {
        let mut record = MediaRecord {
            monitored: true,
            ..Default::default()
        };
        assert!(LibraryFilter::Missing.matches(&record));
        record.downloaded = true;
        assert!(!LibraryFilter::Missing.matches(&record));
        assert!(LibraryFilter::Downloaded.matches(&record));
    }

    #[test]
    fn every_listed_token_parses() {
        for token in LibraryFilter::TOKENS {
            let filter = LibraryFilter::from_token(token).unwrap();
            assert_eq!(filter.as_str(), token);
        }
        assert_eq!(LibraryFilter::from_token("wanted"), None);
    }

    #[test]
    fn release_filters_follow_status() {
        let record = MediaRecord {
            status: ReleaseStatus::InCinemas,
            ..Default::default()
        };
        assert!(LibraryFilter::Cinemas.matches(&record));
        assert!(!LibraryFilter::Released.matches(&record));
        assert!(LibraryFilter::All.matches(&record));
    }
}
