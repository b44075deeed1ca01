use std::path::PathBuf;
use std::time::Duration;

use crate::preview::domain::frame_preview::{FramePreview, PreviewControl};
use crate::shared::constants::{DEFAULT_PREVIEW_DELAY_MS, PREVIEW_MAX_WIDTH};
use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

use super::key_listener::KeyListener;

/// Preview that keeps the latest processed frame on disk as an image, so any
/// image viewer with auto-reload can follow along, and listens for the
/// cancel key between frames.
pub struct SnapshotPreview {
    writer: Box<dyn ImageWriter>,
    path: PathBuf,
    every: usize,
    delay: Duration,
    keys: Option<KeyListener>,
    shown: usize,
    closed: bool,
}

impl SnapshotPreview {
    pub fn new(writer: Box<dyn ImageWriter>, path: impl Into<PathBuf>) -> Self {
        Self {
            writer,
            path: path.into(),
            every: 1,
            delay: Duration::from_millis(DEFAULT_PREVIEW_DELAY_MS),
            keys: None,
            shown: 0,
            closed: false,
        }
    }

    /// Writes only every `n`th frame. The delay and cancel check still run
    /// for every frame.
    pub fn with_every(mut self, n: usize) -> Self {
        self.every = n.max(1);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_keys(mut self, keys: KeyListener) -> Self {
        self.keys = Some(keys);
        self
    }

}

impl FramePreview for SnapshotPreview {
    fn show(&mut self, frame: &Frame) -> Result<PreviewControl, Box<dyn std::error::Error>> {
        let due = self.shown % self.every == 0;
        self.shown += 1;
        let written = if due {
            let size = snapshot_size(frame.dimensions(), PREVIEW_MAX_WIDTH);
            self.writer.write(&self.path, frame, size)
        } else {
            Ok(())
        };

        // Pacing and the cancel check run even when the snapshot failed.
        let cancelled = match &self.keys {
            Some(keys) => keys.wait_for_cancel(self.delay),
            None => {
                std::thread::sleep(self.delay);
                false
            }
        };

        if cancelled {
            return Ok(PreviewControl::Cancel);
        }
        written?;
        Ok(PreviewControl::Continue)
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                log::warn!("Could not remove preview {}: {e}", self.path.display());
            }
        }
    }
}

/// Downscaled size for frames wider than `max_width`, keeping aspect ratio.
fn snapshot_size((w, h): (u32, u32), max_width: u32) -> Option<(u32, u32)> {
    if w <= max_width || w == 0 {
        return None;
    }
    let scaled_h = ((h as u64 * max_width as u64) / w as u64).max(1) as u32;
    Some((max_width, scaled_h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use crate::video::infrastructure::image_file_writer::ImageFileWriter;

    #[derive(Clone, Default)]
    struct RecordingWriter {
        calls: Arc<Mutex<Vec<(usize, Option<(u32, u32)>)>>>,
    }

    impl ImageWriter for RecordingWriter {
        fn write(
            &self,
            _path: &Path,
            frame: &Frame,
            size: Option<(u32, u32)>,
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.calls.lock().unwrap().push((frame.index(), size));
            Ok(())
        }
    }

    struct FailingWriter;

    impl ImageWriter for FailingWriter {
        fn write(
            &self,
            _path: &Path,
            _frame: &Frame,
            _size: Option<(u32, u32)>,
        ) -> Result<(), Box<dyn std::error::Error>> {
            Err("disk full".into())
        }
    }

    #[test]
    fn test_snapshot_size() {
        assert_eq!(snapshot_size((320, 240), 640), None);
        assert_eq!(snapshot_size((640, 480), 640), None);
        assert_eq!(snapshot_size((1920, 1080), 640), Some((640, 360)));
        assert_eq!(snapshot_size((4000, 1), 640), Some((640, 1)));
    }

    #[test]
    fn test_writes_every_nth_frame() {
        let writer = RecordingWriter::default();
        let mut preview = SnapshotPreview::new(Box::new(writer.clone()), "unused.png")
            .with_every(3)
            .with_delay(Duration::ZERO);
        for i in 0..7 {
            preview.show(&Frame::filled(4, 4, [0, 0, 0], i)).unwrap();
        }
        let indices: Vec<usize> = writer.calls.lock().unwrap().iter().map(|c| c.0).collect();
        assert_eq!(indices, vec![0, 3, 6]);
    }

    #[test]
    fn test_wide_frames_are_downscaled() {
        let writer = RecordingWriter::default();
        let mut preview =
            SnapshotPreview::new(Box::new(writer.clone()), "unused.png").with_delay(Duration::ZERO);
        preview.show(&Frame::filled(1280, 720, [0, 0, 0], 0)).unwrap();
        assert_eq!(writer.calls.lock().unwrap()[0].1, Some((640, 360)));
    }

    #[test]
    fn test_cancel_key_stops_streaming() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut preview = SnapshotPreview::new(Box::new(RecordingWriter::default()), "unused.png")
            .with_delay(Duration::from_millis(5))
            .with_keys(KeyListener::from_receiver(rx));

        let frame = Frame::filled(4, 4, [0, 0, 0], 0);
        assert_eq!(preview.show(&frame).unwrap(), PreviewControl::Continue);
        tx.send("q".to_string()).unwrap();
        assert_eq!(preview.show(&frame).unwrap(), PreviewControl::Cancel);
    }

    #[test]
    fn test_writer_failure_is_reported() {
        let mut preview =
            SnapshotPreview::new(Box::new(FailingWriter), "unused.png").with_delay(Duration::ZERO);
        assert!(preview.show(&Frame::filled(4, 4, [0, 0, 0], 0)).is_err());
    }

    #[test]
    fn test_cancel_key_honoured_when_snapshot_fails() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut preview = SnapshotPreview::new(Box::new(FailingWriter), "unused.png")
            .with_delay(Duration::from_millis(5))
            .with_keys(KeyListener::from_receiver(rx));

        let frame = Frame::filled(4, 4, [0, 0, 0], 0);
        assert!(preview.show(&frame).is_err());
        tx.send("q".to_string()).unwrap();
        assert_eq!(preview.show(&frame).unwrap(), PreviewControl::Cancel);
    }

    #[test]
    fn test_close_removes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.png");
        let mut preview =
            SnapshotPreview::new(Box::new(ImageFileWriter::new()), &path).with_delay(Duration::ZERO);

        preview.show(&Frame::filled(16, 16, [9, 9, 9], 0)).unwrap();
        assert!(path.exists());
        preview.close();
        assert!(!path.exists());
        preview.close();
    }
}
