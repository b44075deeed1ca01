use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, LumaA, Pixel, Rgb, Rgba};

use crate::editing::domain::edit_parameters::TargetSize;
use crate::editing::domain::frame_stage::FrameStage;
use crate::shared::frame::Frame;

/// Scales frames to an exact size with bilinear filtering.
///
/// A target with a zero or negative dimension leaves frames untouched.
pub struct ResizeStage {
    target: TargetSize,
}

impl ResizeStage {
    pub fn new(target: TargetSize) -> Self {
        Self { target }
    }
}

impl FrameStage for ResizeStage {
    fn name(&self) -> &'static str {
        "resize"
    }

    fn apply(&self, frame: Frame) -> Result<Frame, Box<dyn std::error::Error>> {
        let Some((tw, th)) = self.target.dimensions() else {
            return Ok(frame);
        };
        if frame.is_empty() || frame.dimensions() == (tw, th) {
            return Ok(frame);
        }

        let (w, h) = frame.dimensions();
        let channels = frame.channels();
        let index = frame.index();
        let data = frame.into_data();
        let resized = match channels {
            1 => resize_buffer::<Luma<u8>>(data, w, h, tw, th),
            2 => resize_buffer::<LumaA<u8>>(data, w, h, tw, th),
            3 => resize_buffer::<Rgb<u8>>(data, w, h, tw, th),
            4 => resize_buffer::<Rgba<u8>>(data, w, h, tw, th),
            n => return Err(format!("Cannot resize a {n}-channel frame").into()),
        }
        .ok_or("Frame buffer does not match its dimensions")?;

        Ok(Frame::new(resized, tw, th, channels, index))
    }

    fn output_size(&self, input: (u32, u32)) -> (u32, u32) {
        self.target.dimensions().unwrap_or(input)
    }
}

fn resize_buffer<P>(data: Vec<u8>, w: u32, h: u32, tw: u32, th: u32) -> Option<Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let src: ImageBuffer<P, Vec<u8>> = ImageBuffer::from_raw(w, h, data)?;
    Some(imageops::resize(&src, tw, th, FilterType::Triangle).into_raw())
}
