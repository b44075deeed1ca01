use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::editing::domain::edit_parameters::{EditParameters, EditRequest};
use crate::editing::domain::stage_chain::StageChain;
use crate::error::{SessionError, SessionWarning};
use crate::preview::domain::frame_preview::{FramePreview, PreviewControl};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

use super::pipeline_logger::PipelineLogger;

/// Lifecycle of an [`EditSession`].
///
/// `Idle -> MetadataLoaded -> ParametersResolved -> Streaming -> Finished`,
/// with any step able to move to `Failed`. Both end states are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    MetadataLoaded,
    ParametersResolved,
    Streaming,
    Finished,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every frame in the trim window was read.
    Completed,
    /// The user pressed the cancel key.
    Cancelled,
    /// A decode, stage or encode error stopped streaming early.
    Interrupted,
}

/// What a finished session produced.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub frames_written: usize,
    pub frames_skipped: usize,
    pub output_size: (u32, u32),
    pub output_path: PathBuf,
    pub warnings: Vec<SessionWarning>,
    /// Set when the outcome is `Interrupted`.
    pub stream_error: Option<String>,
}

impl SessionReport {
    fn new(output_path: PathBuf, output_size: (u32, u32)) -> Self {
        Self {
            outcome: SessionOutcome::Completed,
            frames_written: 0,
            frames_skipped: 0,
            output_size,
            output_path,
            warnings: Vec::new(),
            stream_error: None,
        }
    }

    fn interrupt(&mut self, message: String) {
        log::error!("{message}");
        self.outcome = SessionOutcome::Interrupted;
        self.stream_error = Some(message);
    }
}

/// Where and how the edited video is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputTarget {
    pub path: PathBuf,
    pub codec: String,
}

/// One edit of one video, from opening the source to finalising the output.
///
/// The session owns the reader for its whole life. Parameters are fixed
/// before streaming starts and do not change per frame. Streaming is a
/// single sequential loop: read, transform, write, preview.
pub struct EditSession {
    reader: Option<Box<dyn VideoReader>>,
    logger: Box<dyn PipelineLogger>,
    state: SessionState,
    metadata: Option<VideoMetadata>,
    parameters: Option<EditParameters>,
    warnings: Vec<SessionWarning>,
}

impl EditSession {
    pub fn new(reader: Box<dyn VideoReader>, logger: Box<dyn PipelineLogger>) -> Self {
        Self {
            reader: Some(reader),
            logger,
            state: SessionState::Idle,
            metadata: None,
            parameters: None,
            warnings: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[cfg(test)]
    pub fn metadata(&self) -> Option<&VideoMetadata> {
        self.metadata.as_ref()
    }

    #[cfg(test)]
    pub fn parameters(&self) -> Option<&EditParameters> {
        self.parameters.as_ref()
    }

    /// Opens the source and loads its metadata.
    pub fn open(&mut self, path: &Path) -> Result<VideoMetadata, SessionError> {
        self.expect_state(SessionState::Idle)?;
        let result = match self.reader.as_mut() {
            Some(reader) => reader.open(path),
            None => return Err(self.invalid_state(SessionState::Idle)),
        };

        match result {
            Ok(metadata) => {
                log::info!(
                    "Opened {}: {}x{} @ {:.2} fps, {} frames ({:.1}s)",
                    path.display(),
                    metadata.width,
                    metadata.height,
                    metadata.fps,
                    metadata.total_frames,
                    metadata.duration_secs()
                );
                self.metadata = Some(metadata.clone());
                self.state = SessionState::MetadataLoaded;
                Ok(metadata)
            }
            Err(source) => {
                self.abort();
                Err(SessionError::FileNotOpenable {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    /// Validates the user's answers against the loaded metadata.
    ///
    /// An out-of-range trim is not an error: the full video is used and a
    /// warning is recorded.
    pub fn resolve(&mut self, request: &EditRequest) -> Result<EditParameters, SessionError> {
        self.expect_state(SessionState::MetadataLoaded)?;
        let Some(metadata) = self.metadata.as_ref() else {
            return Err(self.invalid_state(SessionState::MetadataLoaded));
        };

        let (params, trim) = EditParameters::resolve(request, metadata);
        if trim.widened {
            let (start_secs, end_secs) = request.trim_secs.unwrap_or_default();
            let warning = SessionWarning::InvalidTrimRange {
                start_secs,
                end_secs,
            };
            log::warn!("{warning}");
            self.warnings.push(warning);
        }

        let (w, h) = params.output_size((metadata.width, metadata.height));
        log::info!(
            "Edit: frames {}..{}, rotation {}, filter {:?}, output {w}x{h}",
            params.trim.start(),
            if params.trim.is_bounded() {
                params.trim.end().to_string()
            } else {
                "end".to_string()
            },
            params.rotation.degrees(),
            params.filter
        );

        self.parameters = Some(params.clone());
        self.state = SessionState::ParametersResolved;
        Ok(params)
    }

    /// Streams the trim window through `chain` into `writer`, showing each
    /// written frame in `preview`.
    ///
    /// The first frame of the window is processed before the writer is
    /// opened and its size becomes the output size. That frame is also the
    /// first one written. Reader, writer and preview are released on every
    /// path out of this method.
    pub fn run(
        &mut self,
        chain: &StageChain,
        mut writer: Box<dyn VideoWriter>,
        mut preview: Box<dyn FramePreview>,
        target: &OutputTarget,
    ) -> Result<SessionReport, SessionError> {
        if let Err(e) = self.expect_state(SessionState::ParametersResolved) {
            preview.close();
            return Err(e);
        }
        let (Some(mut reader), Some(metadata), Some(params)) = (
            self.reader.take(),
            self.metadata.clone(),
            self.parameters.clone(),
        ) else {
            preview.close();
            return Err(self.invalid_state(SessionState::ParametersResolved));
        };

        self.state = SessionState::Streaming;
        let result = stream(
            reader.as_mut(),
            writer.as_mut(),
            preview.as_mut(),
            chain,
            self.logger.as_mut(),
            &metadata,
            &params,
            target,
        );

        reader.close();
        preview.close();

        match result {
            Ok(mut report) => {
                self.logger.summary();
                let mut warnings = std::mem::take(&mut self.warnings);
                warnings.append(&mut report.warnings);
                report.warnings = warnings;
                self.state = SessionState::Finished;
                Ok(report)
            }
            Err(e) => {
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }

    /// Moves the session to `Failed` and releases the reader. Used when
    /// something outside the session (like building the stage chain) fails.
    pub fn abort(&mut self) {
        if let Some(mut reader) = self.reader.take() {
            reader.close();
        }
        self.state = SessionState::Failed;
    }

    fn expect_state(&self, expected: SessionState) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(self.invalid_state(expected))
        }
    }

    fn invalid_state(&self, expected: SessionState) -> SessionError {
        SessionError::InvalidState {
            expected,
            actual: self.state,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn stream(
    reader: &mut dyn VideoReader,
    writer: &mut dyn VideoWriter,
    preview: &mut dyn FramePreview,
    chain: &StageChain,
    logger: &mut dyn PipelineLogger,
    metadata: &VideoMetadata,
    params: &EditParameters,
    target: &OutputTarget,
) -> Result<SessionReport, SessionError> {
    let range = params.trim;
    let start = range.start();
    let unreadable = |reason: String| SessionError::FirstFrameUnreadable {
        index: start,
        reason,
    };

    if start > 0 {
        reader.seek(start).map_err(|e| unreadable(e.to_string()))?;
    }

    let mut frames = reader.frames();
    let first = match frames.next() {
        Some(Ok(frame)) if !frame.is_empty() => frame,
        Some(Ok(_)) => return Err(unreadable("frame is empty".to_string())),
        Some(Err(e)) => return Err(unreadable(e.to_string())),
        None => return Err(unreadable("end of stream".to_string())),
    };
    let first = chain.apply(first, logger)?;
    let (width, height) = first.dimensions();
    logger.info(&format!("Output frame size: {width}x{height}"));

    let existed = target.path.exists();
    let output_metadata = metadata.with_size(width, height).with_codec(&target.codec);
    if let Err(source) = writer.open(&target.path, &output_metadata) {
        let _ = writer.close();
        if !existed && target.path.exists() {
            let _ = std::fs::remove_file(&target.path);
        }
        return Err(SessionError::WriterInitFailed {
            path: target.path.clone(),
            source,
        });
    }

    let mut report = SessionReport::new(target.path.clone(), (width, height));
    let total = range.len().unwrap_or(metadata.total_frames);
    let mut pending = Some(first);
    let mut index = start;
    let mut preview_failed = false;

    while range.contains(index) {
        let frame = match pending.take() {
            Some(frame) => frame,
            None => {
                let t = Instant::now();
                let decoded = match frames.next() {
                    Some(Ok(frame)) => frame,
                    Some(Err(e)) => {
                        report.interrupt(format!("Failed to decode frame {index}: {e}"));
                        break;
                    }
                    None => {
                        logger.info("End of video.");
                        break;
                    }
                };
                logger.timing("decode", elapsed_ms(t));

                if decoded.is_empty() {
                    let warning = SessionWarning::EmptyFrameAtIndex(decoded.index());
                    log::warn!("{warning}");
                    report.warnings.push(warning);
                    report.frames_skipped += 1;
                    index += 1;
                    continue;
                }

                match chain.apply(decoded, logger) {
                    Ok(frame) => frame,
                    Err(e) => {
                        report.interrupt(e.to_string());
                        break;
                    }
                }
            }
        };

        let t = Instant::now();
        if let Err(e) = writer.write(&frame) {
            report.interrupt(format!("Failed to write frame {index}: {e}"));
            break;
        }
        logger.timing("encode", elapsed_ms(t));
        report.frames_written += 1;
        index += 1;
        logger.progress(index - start, total);

        match preview.show(&frame) {
            Ok(PreviewControl::Continue) => {}
            Ok(PreviewControl::Cancel) => {
                logger.info("Video playback interrupted by user.");
                report.outcome = SessionOutcome::Cancelled;
                break;
            }
            Err(e) if !preview_failed => {
                preview_failed = true;
                let warning = SessionWarning::PreviewFailed {
                    index: frame.index(),
                    reason: e.to_string(),
                };
                log::warn!("{warning}");
                report.warnings.push(warning);
            }
            Err(e) => log::debug!("Preview failed again: {e}"),
        }
    }

    if let Err(e) = writer.close() {
        report.interrupt(format!(
            "Failed to finalise {}: {e}",
            target.path.display()
        ));
    }

    logger.metric("frames_skipped", report.frames_skipped as f64);
    Ok(report)
}

fn elapsed_ms(t: Instant) -> f64 {
    t.elapsed().as_secs_f64() * 1000.0
}
