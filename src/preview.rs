//! Thumbnail rendering for wallpaper list entries.
//!
//! Plain wallpapers get a downscaled copy. Slideshows and light/dark pairs get
//! a "barcode" strip: each frame contributes the vertical slice matching its
//! position in the sequence.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::processing::image_io::load_rgba8;
use crate::processing::layout::{scale_to_height, scale_to_width, shrink_to_fit, slice_span};
use crate::resolution::Dimension;
use crate::wallpaper_list::WallpaperItem;

/// Render a thumbnail for `item` bounded by `size`.
///
/// Returns `None` when nothing usable could be loaded.
#[must_use]
pub fn render_preview(item: &WallpaperItem, size: Dimension) -> Option<RgbaImage> {
    if !item.filename.exists() {
        debug!(path = %item.filename.display(), "preview source missing");
        return None;
    }

    let has_dark = item.filename_dark.as_deref().is_some_and(Path::exists);
    if item.is_slideshow() || has_dark {
        render_slideshow_preview(item, size)
    } else {
        render_single_preview(&item.filename, size)
    }
}

/// Load one image and shrink it into `size`. Smaller images are returned as-is.
#[must_use]
pub fn render_single_preview(path: &Path, size: Dimension) -> Option<RgbaImage> {
    let img = load_rgba8(path)?;
    let (w, h) = shrink_to_fit(size.width, size.height, img.width(), img.height());
    if (w, h) == img.dimensions() {
        return Some(img);
    }
    Some(imageops::resize(&img, w, h, FilterType::Lanczos3))
}

fn render_slideshow_preview(item: &WallpaperItem, size: Dimension) -> Option<RgbaImage> {
    let mut frames: Vec<RgbaImage> = item
        .slideshow
        .static_paths()
        .filter_map(load_rgba8)
        .map(|img| scale_for_strip(&img, size))
        .collect();

    if frames.is_empty() && !item.is_slideshow() {
        let light = load_rgba8(&item.filename);
        let dark = item.filename_dark.as_deref().and_then(load_rgba8);
        if let (Some(light), Some(dark)) = (light, dark) {
            frames = vec![scale_for_strip(&light, size), scale_for_strip(&dark, size)];
        }
    }

    compose_strip(&frames)
}

/// Scale along the thumbnail's limiting side: height for landscape
/// thumbnails, width otherwise.
fn scale_for_strip(img: &RgbaImage, size: Dimension) -> RgbaImage {
    let (w, h) = if size.is_landscape() {
        scale_to_height(img.width(), img.height(), size.height)
    } else {
        scale_to_width(img.width(), img.height(), size.width)
    };
    imageops::resize(img, w, h, FilterType::Triangle)
}

/// Lay frames side by side on a strip as wide as all frames together.
///
/// Frame `i` of `n` fills slice `[i/n, (i+1)/n)` of the strip with the same
/// relative slice of its own image.
#[must_use]
pub fn compose_strip(frames: &[RgbaImage]) -> Option<RgbaImage> {
    if frames.is_empty() {
        return None;
    }

    let width: u32 = frames.iter().map(RgbaImage::width).sum();
    let height = frames.iter().map(RgbaImage::height).max().unwrap_or(0);
    if width == 0 || height == 0 {
        return None;
    }

    let n = frames.len();
    let mut strip = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
    for (i, frame) in frames.iter().enumerate() {
        let (src_x0, src_x1) = slice_span(i, n, frame.width());
        let (dst_x0, dst_x1) = slice_span(i, n, width);
        if src_x1 <= src_x0 || dst_x1 <= dst_x0 {
            continue;
        }
        let slice =
            imageops::crop_imm(frame, src_x0, 0, src_x1 - src_x0, frame.height()).to_image();
        let slice = imageops::resize(&slice, dst_x1 - dst_x0, height, FilterType::Triangle);
        imageops::replace(&mut strip, &slice, i64::from(dst_x0), 0);
    }
    Some(strip)
}
