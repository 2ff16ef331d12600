//! # Local File Media Picker
//!
//! Console stand-in for the camera and photo library. The session stages a
//! file path before the pickup gate asks for media; the capture resolves to
//! that file only if it exists.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use pr_01_shipment_lifecycle::{MediaPicker, PickerError};
use shared_types::entities::{AssetUri, MediaKind, MediaSource};
use tracing::debug;

pub struct LocalFileMediaPicker {
    root: PathBuf,
    staged: Mutex<Option<PathBuf>>,
}

impl LocalFileMediaPicker {
    /// Relative paths are resolved against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            staged: Mutex::new(None),
        }
    }

    /// Select the file the next capture returns.
    pub fn stage(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let resolved = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        *self.staged.lock() = Some(resolved);
    }
}

#[async_trait]
impl MediaPicker for LocalFileMediaPicker {
    async fn capture(
        &self,
        kind: MediaKind,
        source: MediaSource,
    ) -> Result<AssetUri, PickerError> {
        let path = self.staged.lock().take().ok_or(PickerError::NoSelection)?;
        debug!(path = %path.display(), ?kind, ?source, "Resolving local media");

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| PickerError::File(format!("{}: {e}", path.display())))?;
        if !metadata.is_file() {
            return Err(PickerError::File(format!("{} is not a file", path.display())));
        }

        Ok(AssetUri::new(format!("file://{}", path.display())))
    }
}
