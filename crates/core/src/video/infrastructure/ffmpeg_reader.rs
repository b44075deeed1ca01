use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

/// `AV_NOPTS_VALUE`: ffmpeg's marker for an unset timestamp.
const NO_PTS: i64 = i64::MIN;

/// Decodes video frames via ffmpeg-next (libavformat + libavcodec).
///
/// Converts each decoded frame to RGB24 and wraps it in a [`Frame`].
/// The decoder lives as long as the input, so successive calls to
/// [`frames`](VideoReader::frames) continue from where the last one stopped.
pub struct FfmpegReader {
    input_ctx: Option<ffmpeg_next::format::context::Input>,
    decode: Option<DecodeState>,
}

// Safety: FfmpegReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    pub fn new() -> Self {
        Self {
            input_ctx: None,
            decode: None,
        }
    }
}

impl Default for FfmpegReader {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let video_stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let width = decoder.width();
        let height = decoder.height();
        if width == 0 || height == 0 {
            return Err("Video stream reports zero frame size".into());
        }

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let total_frames = if stream.frames() > 0 {
            stream.frames() as usize
        } else {
            estimate_frame_count(ictx.duration(), fps)
        };

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        let start_pts = match stream.start_time() {
            NO_PTS => 0,
            t => t,
        };

        let metadata = VideoMetadata {
            width,
            height,
            fps,
            total_frames,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };

        log::debug!(
            "Opened {}: {}x{} @ {:.3} fps, {} frames ({})",
            path.display(),
            width,
            height,
            fps,
            total_frames,
            metadata.codec
        );

        self.decode = Some(DecodeState {
            decoder,
            scaler,
            width,
            height,
            video_stream_index,
            time_base: f64::from(stream.time_base()),
            start_pts,
            fps,
            next_index: 0,
            skip_until: 0,
            eof_sent: false,
            done: false,
        });
        self.input_ctx = Some(ictx);

        Ok(metadata)
    }

    fn seek(&mut self, frame_index: usize) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(ictx), Some(state)) = (self.input_ctx.as_mut(), self.decode.as_mut()) else {
            return Err("FfmpegReader: not opened".into());
        };

        // Land on the keyframe at or before the target, then decode forward.
        let target_us = if state.fps > 0.0 {
            (frame_index as f64 / state.fps * f64::from(ffmpeg_next::ffi::AV_TIME_BASE)) as i64
        } else {
            0
        };
        ictx.seek(target_us, ..target_us)?;
        state.decoder.flush();

        state.next_index = frame_index;
        state.skip_until = frame_index;
        state.eof_sent = false;
        state.done = false;
        Ok(())
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let (Some(ictx), Some(state)) = (self.input_ctx.as_mut(), self.decode.as_mut()) else {
            return Box::new(std::iter::once(Err("FfmpegReader: not opened".into())));
        };

        Box::new(FfmpegFrameIter { ictx, state })
    }

    fn close(&mut self) {
        self.decode = None;
        self.input_ctx = None;
    }
}

/// Decoder, scaler and cursor bookkeeping that outlive a single iterator.
struct DecodeState {
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    video_stream_index: usize,
    time_base: f64,
    start_pts: i64,
    fps: f64,
    next_index: usize,
    /// Decoded frames below this index are dropped (post-seek catch-up).
    skip_until: usize,
    eof_sent: bool,
    done: bool,
}

impl DecodeState {
    fn try_receive(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        while self.decoder.receive_frame(&mut decoded).is_ok() {
            let index = frame_index_for(
                decoded.timestamp(),
                self.start_pts,
                self.time_base,
                self.fps,
            )
            .unwrap_or(self.next_index);
            if index < self.skip_until {
                continue;
            }
            self.next_index = index + 1;

            let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
            self.scaler.run(&decoded, &mut rgb_frame)?;

            let pixels = extract_rgb_pixels(&rgb_frame, self.width, self.height);
            return Ok(Some(Frame::new(pixels, self.width, self.height, 3, index)));
        }
        Ok(None)
    }
}

/// Lazy iterator that decodes video frames one at a time, avoiding the need
/// to buffer the entire video in memory.
struct FfmpegFrameIter<'a> {
    ictx: &'a mut ffmpeg_next::format::context::Input,
    state: &'a mut DecodeState,
}

impl Iterator for FfmpegFrameIter<'_> {
    type Item = Result<Frame, Box<dyn std::error::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.state.done {
                return None;
            }

            match self.state.try_receive() {
                Ok(Some(frame)) => return Some(Ok(frame)),
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }

            if self.state.eof_sent {
                self.state.done = true;
                return None;
            }

            match self.ictx.packets().next() {
                Some((stream, packet)) => {
                    if stream.index() != self.state.video_stream_index {
                        continue;
                    }
                    if let Err(e) = self.state.decoder.send_packet(&packet) {
                        log::debug!("Dropping undecodable packet: {e}");
                    }
                }
                None => {
                    if let Err(e) = self.state.decoder.send_eof() {
                        log::debug!("Decoder rejected EOF: {e}");
                    }
                    self.state.eof_sent = true;
                }
            }
        }
    }
}

/// Maps a decoded frame timestamp (in stream time base units) to a frame index.
///
/// Returns `None` when the timestamp or frame rate is unknown.
fn frame_index_for(timestamp: Option<i64>, start_pts: i64, time_base: f64, fps: f64) -> Option<usize> {
    let ts = timestamp?;
    if fps <= 0.0 || time_base <= 0.0 {
        return None;
    }
    let secs = (ts - start_pts) as f64 * time_base;
    Some((secs * fps).round().max(0.0) as usize)
}

/// Frame count for containers that do not store one, from the container
/// duration (in `AV_TIME_BASE` units).
fn estimate_frame_count(duration: i64, fps: f64) -> usize {
    if duration <= 0 || fps <= 0.0 {
        return 0;
    }
    let secs = duration as f64 / f64::from(ffmpeg_next::ffi::AV_TIME_BASE);
    (secs * fps).floor() as usize
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer.
///
/// ffmpeg frames may have padding bytes at the end of each row (stride > width*3).
/// This function strips that padding to produce a tightly-packed pixel buffer.
fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}
