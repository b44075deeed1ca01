use std::time::Instant;

use crate::error::StageError;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::frame::Frame;

use super::frame_stage::FrameStage;

/// Ordered list of stages applied to every frame.
///
/// The order is fixed when the chain is built and is the same for the
/// first (sizing) frame and every frame after it.
#[derive(Default)]
pub struct StageChain {
    stages: Vec<Box<dyn FrameStage>>,
}

impl StageChain {
    pub fn new(stages: Vec<Box<dyn FrameStage>>) -> Self {
        Self { stages }
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Size of a frame after every stage, for an input of `input` size.
    pub fn output_size(&self, input: (u32, u32)) -> (u32, u32) {
        self.stages
            .iter()
            .fold(input, |size, stage| stage.output_size(size))
    }

    /// Runs `frame` through every stage in order, recording per-stage timings.
    pub fn apply(
        &self,
        frame: Frame,
        logger: &mut dyn PipelineLogger,
    ) -> Result<Frame, StageError> {
        let index = frame.index();
        let mut frame = frame;
        for stage in &self.stages {
            let t = Instant::now();
            frame = stage.apply(frame).map_err(|source| StageError {
                stage: stage.name(),
                index,
                source,
            })?;
            logger.timing(stage.name(), t.elapsed().as_secs_f64() * 1000.0);
        }
        Ok(frame)
    }
}
