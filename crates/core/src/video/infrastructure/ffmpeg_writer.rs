use std::path::Path;

use crate::shared::constants::DEFAULT_FPS;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Bits per pixel per frame used to size the MPEG-4 bit rate.
const BITS_PER_PIXEL: f64 = 0.2;
const MIN_BIT_RATE: usize = 400_000;

/// Encoder settings for one of the supported codec names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CodecChoice {
    id: ffmpeg_next::codec::Id,
    pixel: ffmpeg_next::format::Pixel,
    /// FourCC written into AVI headers.
    fourcc: [u8; 4],
}

fn codec_choice(name: &str) -> Result<CodecChoice, Box<dyn std::error::Error>> {
    match name {
        "" | "mpeg4" => Ok(CodecChoice {
            id: ffmpeg_next::codec::Id::MPEG4,
            pixel: ffmpeg_next::format::Pixel::YUV420P,
            fourcc: *b"XVID",
        }),
        "mjpeg" => Ok(CodecChoice {
            id: ffmpeg_next::codec::Id::MJPEG,
            pixel: ffmpeg_next::format::Pixel::YUVJ420P,
            fourcc: *b"MJPG",
        }),
        other => Err(format!("Unsupported output codec '{other}'").into()),
    }
}

/// Encodes RGB frames into a single-stream video file via ffmpeg-next.
///
/// The codec comes from [`VideoMetadata::codec`]; the frame rate is kept
/// as close to the source as the encoder's time base allows.
pub struct FfmpegWriter {
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    width: u32,
    height: u32,
    encoder_time_base: ffmpeg_next::Rational,
    stream_time_base: ffmpeg_next::Rational,
    frame_count: usize,
    video_stream_index: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self {
            octx: None,
            encoder: None,
            scaler: None,
            width: 0,
            height: 0,
            encoder_time_base: ffmpeg_next::Rational(1, DEFAULT_FPS),
            stream_time_base: ffmpeg_next::Rational(1, DEFAULT_FPS),
            frame_count: 0,
            video_stream_index: 0,
        }
    }

    /// Number of frames encoded since the last `open`.
    #[cfg(test)]
    pub fn frames_written(&self) -> usize {
        self.frame_count
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        if metadata.width == 0 || metadata.height == 0 {
            return Err(format!(
                "Cannot encode {}x{} frames",
                metadata.width, metadata.height
            )
            .into());
        }

        let choice = codec_choice(&metadata.codec)?;
        let mut octx = ffmpeg_next::format::output(path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(choice.id)
            .ok_or_else(|| format!("{:?} encoder not available", choice.id))?;

        let mut ost = octx.add_stream(Some(codec))?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        let rate = frame_rate(metadata.fps);
        let time_base = rate.invert();

        encoder_ctx.set_width(metadata.width);
        encoder_ctx.set_height(metadata.height);
        encoder_ctx.set_format(choice.pixel);
        encoder_ctx.set_time_base(time_base);
        encoder_ctx.set_frame_rate(Some(rate));
        if choice.id == ffmpeg_next::codec::Id::MPEG4 {
            encoder_ctx.set_bit_rate(bit_rate(metadata.width, metadata.height, f64::from(rate)));
        }

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);
        if is_avi(path) {
            unsafe {
                (*ost.parameters().as_mut_ptr()).codec_tag = fourcc(choice.fourcc);
            }
        }

        self.video_stream_index = 0; // first and only stream

        octx.write_header()?;

        self.stream_time_base = octx
            .stream(self.video_stream_index)
            .ok_or("Output stream missing after header")?
            .time_base();

        // Set up RGB -> encoder pixel format scaler
        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            choice.pixel,
            metadata.width,
            metadata.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        log::debug!(
            "Encoding {} as {:?} {}x{} @ {}/{} fps",
            path.display(),
            choice.id,
            metadata.width,
            metadata.height,
            rate.numerator(),
            rate.denominator()
        );

        self.width = metadata.width;
        self.height = metadata.height;
        self.encoder_time_base = time_base;
        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        self.frame_count = 0;

        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(encoder), Some(scaler), Some(octx)) = (
            self.encoder.as_mut(),
            self.scaler.as_mut(),
            self.octx.as_mut(),
        ) else {
            return Err("FfmpegWriter: not opened".into());
        };

        if frame.width() != self.width || frame.height() != self.height || frame.channels() != 3
        {
            return Err(format!(
                "Frame {} is {}x{}x{}, writer expects {}x{}x3",
                frame.index(),
                frame.width(),
                frame.height(),
                frame.channels(),
                self.width,
                self.height
            )
            .into());
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            self.width,
            self.height,
        );

        let stride = rgb_frame.stride(0);
        let row_bytes = self.width as usize * 3;
        let data = rgb_frame.data_mut(0);
        let src = frame.data();

        // Copy pixel data, respecting stride
        for row in 0..self.height as usize {
            let src_start = row * row_bytes;
            let dst_start = row * stride;
            data[dst_start..dst_start + row_bytes]
                .copy_from_slice(&src[src_start..src_start + row_bytes]);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&rgb_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(self.frame_count as i64));

        encoder.send_frame(&yuv_frame)?;
        drain_packets(
            encoder,
            octx,
            self.video_stream_index,
            self.encoder_time_base,
            self.stream_time_base,
        )?;

        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.scaler = None;
        let (Some(mut encoder), Some(mut octx)) = (self.encoder.take(), self.octx.take()) else {
            return Ok(());
        };

        encoder.send_eof()?;
        drain_packets(
            &mut encoder,
            &mut octx,
            self.video_stream_index,
            self.encoder_time_base,
            self.stream_time_base,
        )?;
        octx.write_trailer()?;

        log::debug!("Encoder closed after {} frames", self.frame_count);
        Ok(())
    }
}

fn drain_packets(
    encoder: &mut ffmpeg_next::codec::encoder::video::Encoder,
    octx: &mut ffmpeg_next::format::context::Output,
    stream_index: usize,
    encoder_time_base: ffmpeg_next::Rational,
    stream_time_base: ffmpeg_next::Rational,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut encoded = ffmpeg_next::Packet::empty();
    while encoder.receive_packet(&mut encoded).is_ok() {
        encoded.set_stream(stream_index);
        encoded.rescale_ts(encoder_time_base, stream_time_base);
        encoded.write_interleaved(octx)?;
    }
    Ok(())
}

/// Encoder frame rate for a source fps.
///
/// Integral rates stay integral and NTSC rates (`n * 1000 / 1001`) stay
/// exact; anything else is kept to millihertz precision. Unknown or
/// non-positive fps falls back to [`DEFAULT_FPS`].
fn frame_rate(fps: f64) -> ffmpeg_next::Rational {
    if !fps.is_finite() || fps <= 0.0 {
        return ffmpeg_next::Rational(DEFAULT_FPS, 1);
    }
    let rounded = fps.round();
    if (fps - rounded).abs() < 1e-3 {
        return ffmpeg_next::Rational(rounded as i32, 1);
    }
    let ntsc = (fps * 1.001).round();
    if (ntsc * 1000.0 / 1001.0 - fps).abs() < 1e-3 {
        return ffmpeg_next::Rational((ntsc * 1000.0) as i32, 1001);
    }
    ffmpeg_next::Rational((fps * 1000.0).round() as i32, 1000).reduce()
}

fn bit_rate(width: u32, height: u32, fps: f64) -> usize {
    let bits = width as f64 * height as f64 * fps * BITS_PER_PIXEL;
    (bits as usize).max(MIN_BIT_RATE)
}

fn fourcc(tag: [u8; 4]) -> u32 {
    u32::from_le_bytes(tag)
}

fn is_avi(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("avi"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::domain::video_reader::VideoReader;
    use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;
    use approx::assert_relative_eq;

    fn metadata(w: u32, h: u32, fps: f64, codec: &str) -> VideoMetadata {
        VideoMetadata {
            width: w,
            height: h,
            fps,
            total_frames: 0,
            codec: codec.to_string(),
            source_path: None,
        }
    }

    fn solid_frame(index: usize, w: u32, h: u32, value: u8) -> Frame {
        Frame::filled(w, h, [value; 3], index)
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");

        let mut writer = FfmpegWriter::new();
        writer.open(&path, &metadata(160, 120, 30.0, "mpeg4")).unwrap();
        for i in 0..3 {
            writer.write(&solid_frame(i, 160, 120, 128)).unwrap();
        }
        assert_eq!(writer.frames_written(), 3);
        writer.close().unwrap();

        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_avi_output_reads_back_with_same_size_and_fps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.avi");

        let mut writer = FfmpegWriter::new();
        writer.open(&path, &metadata(120, 160, 25.0, "mpeg4")).unwrap();
        for i in 0..4 {
            writer.write(&solid_frame(i, 120, 160, 90)).unwrap();
        }
        writer.close().unwrap();

        let mut reader = FfmpegReader::new();
        let meta = reader.open(&path).unwrap();
        assert_eq!((meta.width, meta.height), (120, 160));
        assert_relative_eq!(meta.fps, 25.0, epsilon = 0.01);
        assert_eq!(reader.frames().count(), 4);
    }

    #[test]
    fn test_mjpeg_codec() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.avi");

        let mut writer = FfmpegWriter::new();
        writer.open(&path, &metadata(64, 48, 30.0, "mjpeg")).unwrap();
        writer.write(&solid_frame(0, 64, 48, 200)).unwrap();
        writer.close().unwrap();

        let mut reader = FfmpegReader::new();
        let meta = reader.open(&path).unwrap();
        assert_eq!(meta.codec, "mjpeg");
    }

    #[test]
    fn test_unsupported_codec_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.avi");
        let mut writer = FfmpegWriter::new();
        assert!(writer.open(&path, &metadata(64, 48, 30.0, "prores")).is_err());
    }

    #[test]
    fn test_zero_size_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.avi");
        let mut writer = FfmpegWriter::new();
        assert!(writer.open(&path, &metadata(0, 48, 30.0, "mpeg4")).is_err());
    }

    #[test]
    fn test_mismatched_frame_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");

        let mut writer = FfmpegWriter::new();
        writer.open(&path, &metadata(160, 120, 30.0, "mpeg4")).unwrap();
        assert!(writer.write(&solid_frame(0, 120, 160, 128)).is_err());
        assert_eq!(writer.frames_written(), 0);
        writer.close().unwrap();
    }

    #[test]
    fn test_write_without_open_returns_error() {
        let mut writer = FfmpegWriter::new();
        let result = writer.write(&solid_frame(0, 160, 120, 128));
        assert!(result.is_err());
    }

    #[test]
    fn test_close_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");

        let mut writer = FfmpegWriter::new();
        writer.open(&path, &metadata(160, 120, 30.0, "mpeg4")).unwrap();
        writer.write(&solid_frame(0, 160, 120, 128)).unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn test_open_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.avi");
        std::fs::write(&path, b"not a video").unwrap();

        let mut writer = FfmpegWriter::new();
        writer.open(&path, &metadata(64, 48, 30.0, "mpeg4")).unwrap();
        writer.write(&solid_frame(0, 64, 48, 10)).unwrap();
        writer.close().unwrap();

        let mut reader = FfmpegReader::new();
        assert!(reader.open(&path).is_ok());
    }

    #[test]
    fn test_roundtrip_preserves_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.mp4");

        let mut writer = FfmpegWriter::new();
        writer.open(&path, &metadata(160, 120, 30.0, "mpeg4")).unwrap();
        for i in 0..3 {
            writer.write(&solid_frame(i, 160, 120, 128)).unwrap();
        }
        writer.close().unwrap();

        let mut reader = FfmpegReader::new();
        let read_meta = reader.open(&path).unwrap();
        assert_eq!(read_meta.width, 160);
        assert_eq!(read_meta.height, 120);

        let frames: Vec<_> = reader.frames().map(|f| f.unwrap()).collect();
        assert_eq!(frames.len(), 3);

        // Codec is lossy, but the overall brightness should be close
        let first = &frames[0];
        let avg: f64 =
            first.data().iter().map(|&b| b as f64).sum::<f64>() / first.data().len() as f64;
        assert!(
            (avg - 128.0).abs() < 40.0,
            "Average pixel value {avg} should be close to 128"
        );
    }

    #[test]
    fn test_frame_rate_integral() {
        assert_eq!(frame_rate(30.0), ffmpeg_next::Rational(30, 1));
        assert_eq!(frame_rate(25.0004), ffmpeg_next::Rational(25, 1));
    }

    #[test]
    fn test_frame_rate_ntsc() {
        assert_eq!(frame_rate(30000.0 / 1001.0), ffmpeg_next::Rational(30000, 1001));
        assert_eq!(frame_rate(24000.0 / 1001.0), ffmpeg_next::Rational(24000, 1001));
    }

    #[test]
    fn test_frame_rate_fallback() {
        assert_eq!(frame_rate(0.0), ffmpeg_next::Rational(DEFAULT_FPS, 1));
        assert_eq!(frame_rate(f64::NAN), ffmpeg_next::Rational(DEFAULT_FPS, 1));
    }

    #[test]
    fn test_fourcc_little_endian() {
        assert_eq!(fourcc(*b"XVID"), 0x4449_5658);
    }

    #[test]
    fn test_bit_rate_has_floor() {
        assert_eq!(bit_rate(16, 16, 1.0), MIN_BIT_RATE);
        assert_eq!(bit_rate(1920, 1080, 30.0), 12_441_600);
    }
}
