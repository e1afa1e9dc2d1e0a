/// Per-media-type defaults used by `add`: quality profile and root folder.
///
/// Shared by every handler and mutated by `set-quality` / `set-folder`, so the
/// map sits behind an async `RwLock`. Values live for the process lifetime.
use std::collections::HashMap;

use shart_core::{CommandError, MediaType};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaDefaults {
    pub quality_profile_id: Option<u64>,
    pub root_folder: Option<String>,
}

#[derive(Debug, Default)]
pub struct DefaultSettings {
    inner: RwLock<HashMap<MediaType, MediaDefaults>>,
}

impl DefaultSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, media: MediaType) -> MediaDefaults {
        self.inner.read().await.get(&media).cloned().unwrap_or_default()
    }

    /// Profile ids start at 1; zero is rejected and leaves the stored value alone.
    pub async fn set_quality(&self, media: MediaType, profile_id: u64) -> Result<(), CommandError> {
        if profile_id == 0 {
            return Err(CommandError::usage("Quality profile id must be a positive number"));
        }
        self.inner.write().await.entry(media).or_default().quality_profile_id = Some(profile_id);
        Ok(())
    }

    pub async fn set_root_folder(&self, media: MediaType, path: impl Into<String>) -> Result<(), CommandError> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(CommandError::usage("Root folder must not be empty"));
        }
        self.inner.write().await.entry(media).or_default().root_folder = Some(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unset_defaults_are_empty() {
        let settings = DefaultSettings::new();
        assert_eq!(settings.get(MediaType::Movie).await, MediaDefaults::default());
    }

    #[tokio::test]
    async fn zero_quality_keeps_previous_value() {
        let settings = DefaultSettings::new();
        settings.set_quality(MediaType::Movie, 5).await.unwrap();
        let err = settings.set_quality(MediaType::Movie, 0).await.unwrap_err();
        assert!(matches!(err, CommandError::Usage(_)));
        assert_eq!(settings.get(MediaType::Movie).await.quality_profile_id, Some(5));
    }

    #[tokio::test]
    async fn setting_folder_twice_is_idempotent() {
        let settings = DefaultSettings::new();
        settings.set_root_folder(MediaType::Show, "/tv").await.unwrap();
        let first = settings.get(MediaType::Show).await;
        settings.set_root_folder(MediaType::Show, "/tv").await.unwrap();
        assert_eq!(settings.get(MediaType::Show).await, first);
    }

    #[tokio::test]
    async fn media_types_are_independent() {
        let settings = DefaultSettings::new();
        settings.set_quality(MediaType::Movie, 4).await.unwrap();
        settings.set_root_folder(MediaType::Movie, "/movies").await.unwrap();
        assert_eq!(
            settings.get(MediaType::Movie).await,
            MediaDefaults {
                quality_profile_id: Some(4),
                root_folder: Some("/movies".into()),
            }
        );
        assert_eq!(settings.get(MediaType::Show).await, MediaDefaults::default());
    }
}
