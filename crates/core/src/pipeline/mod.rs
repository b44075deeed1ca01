pub mod edit_session;
pub mod pipeline_logger;
