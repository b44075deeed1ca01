pub mod frame_preview;
