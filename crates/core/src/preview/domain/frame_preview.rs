use crate::shared::frame::Frame;

/// What the streaming loop should do after a frame has been previewed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewControl {
    Continue,
    Cancel,
}

/// Shows processed frames while the output is being written and reports
/// whether the user asked to stop.
///
/// `show` is also where the loop is paced; implementations may block for
/// a short delay per frame.
pub trait FramePreview: Send {
    fn show(&mut self, frame: &Frame) -> Result<PreviewControl, Box<dyn std::error::Error>>;

    /// Releases the preview surface. Safe to call more than once.
    fn close(&mut self);
}
