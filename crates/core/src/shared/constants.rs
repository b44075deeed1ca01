/// Fallback encoder frame rate when the source does not report one.
pub const DEFAULT_FPS: i32 = 30;

/// Codec used when neither settings nor flags pick one.
pub const DEFAULT_CODEC: &str = "mpeg4";

/// Codecs the writer knows how to configure.
pub const SUPPORTED_CODECS: &[&str] = &["mpeg4", "mjpeg"];

/// Fixed Gaussian blur kernel (width and height) for the blur filter.
pub const BLUR_KERNEL_SIZE: usize = 15;

/// Text overlay: baseline anchor, pixel size, RGB colour, stroke thickness.
pub const TEXT_ANCHOR: (i32, i32) = (30, 50);
pub const TEXT_FONT_SIZE: f32 = 32.0;
pub const TEXT_COLOR: [u8; 3] = [0, 0, 255];
pub const TEXT_THICKNESS: u32 = 2;

/// Key line that cancels streaming from the preview.
pub const CANCEL_KEY: &str = "q";

/// Pause after each previewed frame.
pub const DEFAULT_PREVIEW_DELAY_MS: u64 = 30;

/// Snapshots wider than this are downscaled before being written.
pub const PREVIEW_MAX_WIDTH: u32 = 640;

pub const FONT_ENV_VAR: &str = "VIDEO_EDIT_FONT";

/// Well-known font locations probed when no font is configured.
pub const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// File names looked up inside the user font directory.
pub const USER_FONT_NAMES: &[&str] = &["DejaVuSans.ttf", "LiberationSans-Regular.ttf", "Arial.ttf"];
