use crate::shared::video_metadata::VideoMetadata;

use super::trim_range::{TrimRange, TrimResolution};

/// Quarter-turn rotation applied to every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Rotate180,
    CounterClockwise90,
}

impl Rotation {
    /// Maps a user-entered angle. Anything other than 90, 180 or 270 is a no-op.
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees {
            90 => Rotation::Clockwise90,
            180 => Rotation::Rotate180,
            270 => Rotation::CounterClockwise90,
            _ => Rotation::None,
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Rotate180 => 180,
            Rotation::CounterClockwise90 => 270,
        }
    }

    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Rotation::Clockwise90 | Rotation::CounterClockwise90)
    }

    pub fn rotated_size(self, (width, height): (u32, u32)) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

/// Requested output size. Non-positive values keep the source size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TargetSize {
    pub width: i32,
    pub height: i32,
}

impl TargetSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// The exact output size, or `None` if either dimension means "keep".
    pub fn dimensions(self) -> Option<(u32, u32)> {
        (self.width > 0 && self.height > 0).then(|| (self.width as u32, self.height as u32))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterKind {
    #[default]
    None,
    Grayscale,
    Blur,
}

impl FilterKind {
    /// Maps the filter menu: 1 = grayscale, 2 = blur, anything else = none.
    pub fn from_choice(choice: i32) -> Self {
        match choice {
            1 => FilterKind::Grayscale,
            2 => FilterKind::Blur,
            _ => FilterKind::None,
        }
    }
}

/// Raw answers collected from the user, before validation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditRequest {
    /// Trim window in seconds; `None` keeps the whole stream.
    pub trim_secs: Option<(f64, f64)>,
    pub rotation_degrees: i32,
    pub target_width: i32,
    pub target_height: i32,
    pub filter_choice: i32,
    pub overlay_text: String,
}

/// Effective edit configuration, resolved once before streaming and never
/// changed afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditParameters {
    pub trim: TrimRange,
    pub rotation: Rotation,
    pub target_size: TargetSize,
    pub filter: FilterKind,
    pub overlay_text: String,
}

impl EditParameters {
    /// Parameters that copy the whole source unchanged.
    #[cfg(test)]
    pub fn passthrough(metadata: &VideoMetadata) -> Self {
        Self {
            trim: TrimRange::full(metadata.total_frames),
            rotation: Rotation::None,
            target_size: TargetSize::default(),
            filter: FilterKind::None,
            overlay_text: String::new(),
        }
    }

    /// Validates a request against the source. The trim resolution is
    /// returned alongside so the caller can report a widened range.
    pub fn resolve(request: &EditRequest, metadata: &VideoMetadata) -> (Self, TrimResolution) {
        let trim = match request.trim_secs {
            Some((start, end)) => {
                TrimRange::resolve(start, end, metadata.fps, metadata.total_frames)
            }
            None => TrimResolution {
                range: TrimRange::full(metadata.total_frames),
                widened: false,
            },
        };

        let params = Self {
            trim: trim.range,
            rotation: Rotation::from_degrees(request.rotation_degrees),
            target_size: TargetSize::new(request.target_width, request.target_height),
            filter: FilterKind::from_choice(request.filter_choice),
            overlay_text: request.overlay_text.clone(),
        };
        (params, trim)
    }

    /// Frame size after resize and rotation, for a source of `source` size.
    pub fn output_size(&self, source: (u32, u32)) -> (u32, u32) {
        let resized = self.target_size.dimensions().unwrap_or(source);
        self.rotation.rotated_size(resized)
    }
}
