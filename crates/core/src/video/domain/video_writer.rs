use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Abstracts video encoding so the session can write output without
/// depending on a specific codec library.
pub trait VideoWriter: Send {
    /// Creates the output container. `metadata` supplies the frame size,
    /// fps and codec name; every frame written afterwards must match that size.
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>>;

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Flushes pending packets and finalises the container.
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}
