//! Media backend clients.
//!
//! Radarr serves movies and Sonarr serves shows. Both speak the same v3 REST
//! dialect, so the HTTP plumbing lives in [`arr::ArrClient`]. CouchPotato is
//! the older movie alternative with a wanted list instead of a library.

pub mod arr;
pub mod couchpotato;
pub mod radarr;
pub mod sonarr;

pub use arr::{ArrClient, ArrSettings};
pub use couchpotato::CouchPotatoClient;
pub use radarr::RadarrClient;
pub use sonarr::SonarrClient;
