use crate::preview::domain::frame_preview::{FramePreview, PreviewControl};
use crate::shared::frame::Frame;

/// Preview that shows nothing and never cancels. Used with `--no-preview`.
pub struct NullPreview;

impl FramePreview for NullPreview {
    fn show(&mut self, _frame: &Frame) -> Result<PreviewControl, Box<dyn std::error::Error>> {
        Ok(PreviewControl::Continue)
    }

    fn close(&mut self) {}
}
