use std::path::Path;

use anyhow::Context;

use crate::foundation::core::{Photo, decode_photo};
use crate::foundation::error::{BoothError, BoothResult};
use crate::session::wizard::PHOTOS_PER_STRIP;

/// Photos picked from local files instead of the camera.
///
/// Holds at most three; extra files in a batch beyond the free slots are ignored.
#[derive(Clone, Debug, Default)]
pub struct UploadSelection {
    photos: Vec<Photo>,
}

impl UploadSelection {
    /// Empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Photos selected so far.
    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    /// Number of selected photos.
    pub fn len(&self) -> usize {
        self.photos.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Free slots left.
    pub fn remaining(&self) -> usize {
        PHOTOS_PER_STRIP.saturating_sub(self.photos.len())
    }

    /// Read and decode files into the free slots, in the given order.
    ///
    /// Returns how many files were taken. Nothing is added when any taken file fails to
    /// decode.
    #[tracing::instrument(skip_all, fields(offered = paths.len()))]
    pub fn add_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> BoothResult<usize> {
        let take = paths.len().min(self.remaining());
        if take < paths.len() {
            tracing::info!(ignored = paths.len() - take, "selection full, ignoring extra files");
        }

        let mut decoded = Vec::with_capacity(take);
        for path in &paths[..take] {
            let path = path.as_ref();
            let bytes = std::fs::read(path)
                .with_context(|| format!("read photo '{}'", path.display()))?;
            let photo = decode_photo(&bytes).map_err(|e| {
                BoothError::validation(format!("'{}' is not a readable image: {e}", path.display()))
            })?;
            decoded.push(photo);
        }
        self.photos.extend(decoded);
        Ok(take)
    }

    /// Decode in-memory encoded images into the free slots.
    pub fn add_bytes<B: AsRef<[u8]>>(&mut self, sources: &[B]) -> BoothResult<usize> {
        let take = sources.len().min(self.remaining());
        let decoded = sources[..take]
            .iter()
            .enumerate()
            .map(|(i, b)| {
                decode_photo(b.as_ref()).map_err(|e| {
                    BoothError::validation(format!("source #{} is not a readable image: {e}", i + 1))
                })
            })
            .collect::<BoothResult<Vec<_>>>()?;
        self.photos.extend(decoded);
        Ok(take)
    }

    /// Add an already decoded photo, if a slot is free.
    pub fn add_photo(&mut self, photo: Photo) -> bool {
        if self.remaining() == 0 {
            return false;
        }
        self.photos.push(photo);
        true
    }

    /// Remove the photo at `index`, shifting later ones down.
    pub fn remove(&mut self, index: usize) -> Option<Photo> {
        (index < self.photos.len()).then(|| self.photos.remove(index))
    }

    /// Hand over the photos once exactly three are selected.
    ///
    /// Any other count is an [`BoothError::IncompleteSelection`]; the selection is kept so
    /// the user can correct it.
    pub fn finish(&self) -> BoothResult<Vec<Photo>> {
        if self.photos.len() != PHOTOS_PER_STRIP {
            return Err(BoothError::incomplete(format!(
                "Please select exactly {PHOTOS_PER_STRIP} photos ({} selected)",
                self.photos.len()
            )));
        }
        Ok(self.photos.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/upload/selection.rs"]
mod tests;
