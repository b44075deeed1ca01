pub mod editing;
pub mod error;
pub mod pipeline;
pub mod preview;
pub mod shared;
pub mod video;
