use std::cell::RefCell;

use crate::editing::domain::edit_parameters::FilterKind;
use crate::editing::domain::frame_stage::FrameStage;
use crate::shared::constants::BLUR_KERNEL_SIZE;
use crate::shared::frame::Frame;

use super::gaussian;

/// Replaces colour with BT.601 luma, keeping the channel count (and alpha)
/// so downstream stages and the encoder see the same layout.
pub struct GrayscaleStage;

impl FrameStage for GrayscaleStage {
    fn name(&self) -> &'static str {
        "grayscale"
    }

    fn apply(&self, mut frame: Frame) -> Result<Frame, Box<dyn std::error::Error>> {
        let channels = frame.channels() as usize;
        if channels < 3 {
            return Ok(frame);
        }
        for px in frame.data_mut().chunks_exact_mut(channels) {
            let luma = luma_bt601(px[0], px[1], px[2]);
            px[..3].fill(luma);
        }
        Ok(frame)
    }
}

pub fn luma_bt601(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Whole-frame Gaussian blur with a fixed square kernel.
pub struct BlurStage {
    kernel: Vec<f32>,
    temp: RefCell<Vec<f32>>,
}

impl BlurStage {
    pub fn new(kernel_size: usize) -> Self {
        let kernel_size = kernel_size.max(1) | 1;
        Self {
            kernel: gaussian::gaussian_kernel_1d(kernel_size, gaussian::default_sigma(kernel_size)),
            temp: RefCell::new(Vec::new()),
        }
    }
}

impl Default for BlurStage {
    fn default() -> Self {
        Self::new(BLUR_KERNEL_SIZE)
    }
}

impl FrameStage for BlurStage {
    fn name(&self) -> &'static str {
        "blur"
    }

    fn apply(&self, mut frame: Frame) -> Result<Frame, Box<dyn std::error::Error>> {
        let w = frame.width() as usize;
        let h = frame.height() as usize;
        let channels = frame.channels() as usize;
        let mut temp = self.temp.borrow_mut();
        gaussian::separable_gaussian_blur_with_kernel(
            frame.data_mut(),
            w,
            h,
            channels,
            &self.kernel,
            &mut temp,
        );
        Ok(frame)
    }
}

/// Stage for a filter choice, or `None` when no filter was picked.
pub fn create_filter_stage(kind: FilterKind) -> Option<Box<dyn FrameStage>> {
    match kind {
        FilterKind::None => None,
        FilterKind::Grayscale => Some(Box::new(GrayscaleStage)),
        FilterKind::Blur => Some(Box::new(BlurStage::default())),
    }
}
