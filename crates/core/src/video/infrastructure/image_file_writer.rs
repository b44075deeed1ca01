use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Writes a single frame to an image file using the `image` crate.
///
/// The image is written next to the target and renamed into place, so a
/// viewer polling the path never sees a half-written file.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(
        &self,
        path: &Path,
        frame: &Frame,
        size: Option<(u32, u32)>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let img = to_dynamic_image(frame)?;
        let img = match size {
            Some((w, h)) if (w, h) != frame.dimensions() => {
                img.resize_exact(w, h, image::imageops::FilterType::Triangle)
            }
            _ => img,
        };

        let format = image::ImageFormat::from_path(path)?;
        let staging = staging_path(path);
        img.save_with_format(&staging, format)?;
        std::fs::rename(&staging, path)?;
        Ok(())
    }
}

fn to_dynamic_image(frame: &Frame) -> Result<image::DynamicImage, Box<dyn std::error::Error>> {
    let (w, h) = frame.dimensions();
    let data = frame.data().to_vec();
    let img = match frame.channels() {
        1 => image::GrayImage::from_raw(w, h, data).map(image::DynamicImage::ImageLuma8),
        3 => image::RgbImage::from_raw(w, h, data).map(image::DynamicImage::ImageRgb8),
        4 => image::RgbaImage::from_raw(w, h, data).map(image::DynamicImage::ImageRgba8),
        n => return Err(format!("Cannot save a {n}-channel frame as an image").into()),
    };
    img.ok_or_else(|| "Failed to create image from frame data".into())
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}
