use std::path::Path;

use crate::editing::domain::edit_parameters::{EditParameters, Rotation};
use crate::editing::domain::frame_stage::FrameStage;
use crate::editing::domain::stage_chain::StageChain;

use super::filter_stage::create_filter_stage;
use super::font_resolver::{self, FontResolveError};
use super::resize_stage::ResizeStage;
use super::rotate_stage::RotateStage;
use super::text_overlay_stage::TextOverlayStage;

/// Builds the per-frame chain for `params`: resize, rotate, filter, text.
///
/// Stages that would not change the frame are left out. A font is only
/// resolved when there is text to draw.
pub fn create_stage_chain(
    params: &EditParameters,
    font_path: Option<&Path>,
) -> Result<StageChain, FontResolveError> {
    let mut stages: Vec<Box<dyn FrameStage>> = Vec::new();

    if params.target_size.dimensions().is_some() {
        stages.push(Box::new(ResizeStage::new(params.target_size)));
    }
    if params.rotation != Rotation::None {
        stages.push(Box::new(RotateStage::new(params.rotation)));
    }
    if let Some(filter) = create_filter_stage(params.filter) {
        stages.push(filter);
    }
    if !params.overlay_text.is_empty() {
        let path = font_resolver::resolve(font_path)?;
        log::info!("Using font {}", path.display());
        let font = font_resolver::load_font(&path)?;
        stages.push(Box::new(TextOverlayStage::new(
            params.overlay_text.clone(),
            Some(font),
        )?));
    }

    let chain = StageChain::new(stages);
    if chain.is_empty() {
        log::info!("No edits selected, frames are copied unchanged");
    } else {
        log::debug!("Stage chain: {:?}", chain.names());
    }
    Ok(chain)
}
