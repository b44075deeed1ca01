pub mod edit_parameters;
pub mod frame_stage;
pub mod stage_chain;
pub mod trim_range;
