pub mod filter_stage;
pub mod font_resolver;
pub mod gaussian;
pub mod resize_stage;
pub mod rotate_stage;
pub mod stage_factory;
pub mod text_overlay_stage;
