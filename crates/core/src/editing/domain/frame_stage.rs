use crate::shared::frame::Frame;

/// One per-frame transform in the edit chain.
///
/// Stages take the frame by value and hand back the result, so a frame has
/// exactly one owner as it moves through the chain. Stages that work in
/// place return the same buffer; stages that change the geometry allocate.
pub trait FrameStage: Send {
    /// Short name used in timings and error messages.
    fn name(&self) -> &'static str;

    fn apply(&self, frame: Frame) -> Result<Frame, Box<dyn std::error::Error>>;

    /// Size of the frame this stage produces for an input of `input` size.
    fn output_size(&self, input: (u32, u32)) -> (u32, u32) {
        input
    }
}
