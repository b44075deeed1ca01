use crate::editing::domain::frame_stage::FrameStage;
use crate::shared::constants::{TEXT_ANCHOR, TEXT_COLOR, TEXT_FONT_SIZE, TEXT_THICKNESS};
use crate::shared::frame::Frame;

use super::filter_stage::luma_bt601;
use super::font_resolver::FontResolveError;

/// Draws a fixed string onto every frame.
///
/// The anchor is the left end of the text baseline. Thickness is emulated
/// by stamping each glyph's coverage over a `thickness x thickness` square
/// of offsets. Glyphs that run off the frame are clipped.
pub struct TextOverlayStage {
    text: String,
    font: Option<fontdue::Font>,
    anchor: (i32, i32),
    px: f32,
    color: [u8; 3],
    thickness: u32,
}

impl TextOverlayStage {
    /// Empty text needs no font and makes the stage a no-op.
    pub fn new(text: impl Into<String>, font: Option<fontdue::Font>) -> Result<Self, FontResolveError> {
        let text = text.into();
        if !text.is_empty() && font.is_none() {
            return Err(FontResolveError::Required);
        }
        Ok(Self {
            text,
            font,
            anchor: TEXT_ANCHOR,
            px: TEXT_FONT_SIZE,
            color: TEXT_COLOR,
            thickness: TEXT_THICKNESS.max(1),
        })
    }

    fn draw(&self, font: &fontdue::Font, frame: &mut Frame) {
        let mut pen_x = self.anchor.0 as f32;
        let baseline = self.anchor.1 as f32;
        let mut prev: Option<char> = None;

        for ch in self.text.chars() {
            if let Some(kern) = prev.and_then(|p| font.horizontal_kern(p, ch, self.px)) {
                pen_x += kern;
            }
            let (metrics, coverage) = font.rasterize(ch, self.px);
            if metrics.width > 0 && metrics.height > 0 {
                let left = (pen_x + metrics.xmin as f32).round() as i32;
                let top = (baseline - metrics.height as f32 - metrics.ymin as f32).round() as i32;
                let (mask, mw, mh) = thicken(&coverage, metrics.width, metrics.height, self.thickness);
                self.blend(frame, &mask, mw, mh, left, top);
            }
            pen_x += metrics.advance_width;
            prev = Some(ch);
        }
    }

    fn blend(&self, frame: &mut Frame, mask: &[u8], mw: usize, mh: usize, left: i32, top: i32) {
        let fw = frame.width() as i32;
        let fh = frame.height() as i32;
        let channels = frame.channels() as usize;
        let gray = luma_bt601(self.color[0], self.color[1], self.color[2]);
        let data = frame.data_mut();

        for my in 0..mh {
            let y = top + my as i32;
            if y < 0 || y >= fh {
                continue;
            }
            for mx in 0..mw {
                let x = left + mx as i32;
                if x < 0 || x >= fw {
                    continue;
                }
                let alpha = mask[my * mw + mx] as f32 / 255.0;
                if alpha <= 0.0 {
                    continue;
                }
                let base = (y as usize * fw as usize + x as usize) * channels;
                let px = &mut data[base..base + channels];
                if channels >= 3 {
                    for (c, v) in px[..3].iter_mut().enumerate() {
                        *v = mix(*v, self.color[c], alpha);
                    }
                } else {
                    px[0] = mix(px[0], gray, alpha);
                }
            }
        }
    }
}

impl FrameStage for TextOverlayStage {
    fn name(&self) -> &'static str {
        "text"
    }

    fn apply(&self, mut frame: Frame) -> Result<Frame, Box<dyn std::error::Error>> {
        if self.text.is_empty() || frame.is_empty() {
            return Ok(frame);
        }
        let font = self.font.as_ref().ok_or(FontResolveError::Required)?;
        self.draw(font, &mut frame);
        Ok(frame)
    }
}

/// Max-combines the coverage bitmap over a square of offsets, growing it by
/// `thickness - 1` pixels right and down.
fn thicken(coverage: &[u8], w: usize, h: usize, thickness: u32) -> (Vec<u8>, usize, usize) {
    let t = thickness as usize;
    if t <= 1 {
        return (coverage.to_vec(), w, h);
    }
    let mw = w + t - 1;
    let mh = h + t - 1;
    let mut mask = vec![0u8; mw * mh];
    for dy in 0..t {
        for dx in 0..t {
            for y in 0..h {
                let src = &coverage[y * w..(y + 1) * w];
                let dst = &mut mask[(y + dy) * mw + dx..(y + dy) * mw + dx + w];
                for (d, &s) in dst.iter_mut().zip(src) {
                    *d = (*d).max(s);
                }
            }
        }
    }
    (mask, mw, mh)
}

fn mix(base: u8, over: u8, alpha: f32) -> u8 {
    (base as f32 * (1.0 - alpha) + over as f32 * alpha)
        .round()
        .clamp(0.0, 255.0) as u8
}
