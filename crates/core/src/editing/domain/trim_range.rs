/// Half-open `[start, end)` window of frame indices selected for processing.
///
/// `end == usize::MAX` means "until the end of the stream" and is used when
/// the source does not report a frame count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrimRange {
    start: usize,
    end: usize,
}

/// Result of turning user-entered seconds into a [`TrimRange`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrimResolution {
    pub range: TrimRange,
    /// True when the request was out of bounds and the full range was used instead.
    pub widened: bool,
}

impl TrimRange {
    /// The whole stream. `total_frames == 0` means the count is unknown.
    pub fn full(total_frames: usize) -> Self {
        Self {
            start: 0,
            end: if total_frames == 0 {
                usize::MAX
            } else {
                total_frames
            },
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn is_bounded(&self) -> bool {
        self.end != usize::MAX
    }

    /// Number of frames in the window, or `None` when it runs to end of stream.
    pub fn len(&self) -> Option<usize> {
        self.is_bounded().then(|| self.end - self.start)
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }

    /// Converts a `[start_secs, end_secs)` request to frame indices with
    /// `floor(t * fps)`.
    ///
    /// The request is accepted iff `0 <= start < end <= total_frames`.
    /// Anything else (negative, reversed, past the end, non-finite) silently
    /// falls back to the full range and reports `widened`.
    pub fn resolve(start_secs: f64, end_secs: f64, fps: f64, total_frames: usize) -> TrimResolution {
        let full = Self::full(total_frames);
        let widen = TrimResolution {
            range: full,
            widened: true,
        };

        if !start_secs.is_finite() || !end_secs.is_finite() || !fps.is_finite() || fps <= 0.0 {
            return widen;
        }

        let start = (start_secs * fps).floor();
        let end = (end_secs * fps).floor();
        if start < 0.0 || start >= end || end > full.end as f64 {
            return widen;
        }

        TrimResolution {
            range: Self {
                start: start as usize,
                end: end as usize,
            },
            widened: false,
        }
    }
}
