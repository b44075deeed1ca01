use std::path::PathBuf;

/// Stream properties read once when a source is opened.
///
/// The same struct describes the encoder side: [`VideoWriter::open`]
/// takes the output frame size, fps and codec from it.
///
/// [`VideoWriter::open`]: crate::video::domain::video_writer::VideoWriter::open
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Copy of this metadata with a different frame size, used to size the sink.
    pub fn with_size(&self, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..self.clone()
        }
    }

    /// Copy of this metadata with a different codec name.
    pub fn with_codec(&self, codec: &str) -> Self {
        Self {
            codec: codec.to_string(),
            ..self.clone()
        }
    }

    /// Duration in seconds, or 0 when fps is unknown.
    pub fn duration_secs(&self) -> f64 {
        if self.fps > 0.0 {
            self.total_frames as f64 / self.fps
        } else {
            0.0
        }
    }
}
