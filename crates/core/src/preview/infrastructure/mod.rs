pub mod key_listener;
pub mod null_preview;
pub mod snapshot_preview;
