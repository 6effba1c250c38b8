use std::path::Path;

use anyhow::Result;
use image::{ImageReader, RgbaImage};
use tracing::debug;

/// Decode an image to RGBA8, sniffing the format from content.
pub fn decode_rgba8(path: &Path) -> Result<RgbaImage> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(img.to_rgba8())
}

/// [`decode_rgba8`] for callers that treat unreadable files as absent.
pub fn load_rgba8(path: &Path) -> Option<RgbaImage> {
    match decode_rgba8(path) {
        Ok(img) => Some(img),
        Err(err) => {
            debug!(path = %path.display(), "image unreadable: {err:#}");
            None
        }
    }
}
