//! Rendering of the frame a slideshow shows right now.

use std::path::Path;

use chrono::NaiveDateTime;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::debug;

use crate::appearance::Appearance;
use crate::processing::blend::blend_over;
use crate::processing::image_io::load_rgba8;
use crate::processing::layout::shrink_to_fit;
use crate::resolution::Dimension;
use crate::scheduler::{SlideshowState, evaluate};
use crate::slideshow_xml::parse_slideshow;
use crate::timeline::SlideshowTimeline;
use crate::wallpaper_list::WallpaperItem;

/// Render what `timeline` shows at `now`, shrunk to `requested` when given.
///
/// An inactive schedule falls back to the first static image. A transition
/// whose target cannot be read shows its source unblended.
#[must_use]
pub fn render_frame(
    timeline: &SlideshowTimeline,
    now: NaiveDateTime,
    requested: Option<Dimension>,
) -> Option<RgbaImage> {
    let img = match evaluate(timeline, now) {
        SlideshowState::Static { path } => load_rgba8(&path)?,
        SlideshowState::Transition {
            from,
            to,
            blend_ratio,
            ..
        } => {
            let mut base = load_rgba8(&from)?;
            if let Some(overlay) = load_rgba8(&to) {
                blend_over(&mut base, &overlay, blend_ratio);
            }
            base
        }
        SlideshowState::Inactive => load_rgba8(timeline.first_static()?)?,
    };
    Some(fit_requested(img, requested))
}

/// Render a wallpaper list item for `appearance`: its slideshow when the
/// chosen source is one, the plain image otherwise.
#[must_use]
pub fn render_item_frame(
    item: &WallpaperItem,
    appearance: Appearance,
    now: NaiveDateTime,
    requested: Option<Dimension>,
) -> Option<RgbaImage> {
    let source = item.source_for(appearance);
    if item.is_slideshow_source(appearance) {
        if source == item.filename.as_path() {
            return render_frame(&item.slideshow, now, requested);
        }
        let timeline = parse_slideshow(source, requested.unwrap_or_default());
        return render_frame(&timeline, now, requested);
    }
    render_image(source, requested)
}

fn render_image(path: &Path, requested: Option<Dimension>) -> Option<RgbaImage> {
    let img = load_rgba8(path)?;
    Some(fit_requested(img, requested))
}

fn fit_requested(img: RgbaImage, requested: Option<Dimension>) -> RgbaImage {
    let Some(size) = requested.filter(|size| !size.is_empty()) else {
        return img;
    };
    let (w, h) = shrink_to_fit(size.width, size.height, img.width(), img.height());
    if (w, h) == img.dimensions() {
        return img;
    }
    debug!(from = ?img.dimensions(), to = ?(w, h), "shrinking frame");
    imageops::resize(&img, w, h, FilterType::Lanczos3)
}
