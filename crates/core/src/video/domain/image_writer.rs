use std::path::Path;

use crate::shared::frame::Frame;

/// Persists one frame as a still image (used for preview snapshots).
pub trait ImageWriter: Send {
    /// Writes `frame` to `path`, scaled to `size` when one is given.
    /// The image format follows the path's extension.
    fn write(
        &self,
        path: &Path,
        frame: &Frame,
        size: Option<(u32, u32)>,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
