use std::sync::Arc;

use shart_core::{CommandError, MediaBackend, MediaType};

/// The configured backend clients, at most one per media type.
#[derive(Clone, Default)]
pub struct MediaServices {
    movie: Option<Arc<dyn MediaBackend>>,
    show: Option<Arc<dyn MediaBackend>>,
}

impl MediaServices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `backend` in the slot for the media type it serves.
    pub fn with(mut self, backend: Arc<dyn MediaBackend>) -> Self {
        match backend.media_type() {
            MediaType::Movie => self.movie = Some(backend),
            MediaType::Show => self.show = Some(backend),
        }
        self
    }

    pub fn get(&self, media: MediaType) -> Result<&Arc<dyn MediaBackend>, CommandError> {
        let slot = match media {
            MediaType::Movie => &self.movie,
            MediaType::Show => &self.show,
        };
        slot.as_ref()
            .ok_or_else(|| CommandError::Unsupported(format!("No {media} backend is configured")))
    }

    /// Every configured backend, movies first.
    pub fn all(&self) -> Vec<Arc<dyn MediaBackend>> {
        self.movie.iter().chain(self.show.iter()).cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.movie.is_none() && self.show.is_none()
    }
}
