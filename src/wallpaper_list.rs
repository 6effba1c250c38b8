//! GNOME wallpaper list documents (`<wallpapers><wallpaper>...`).
//!
//! Each entry names a light image (or slideshow descriptor), an optional dark
//! variant and some display metadata.

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use crate::appearance::Appearance;
use crate::resolution::Dimension;
use crate::slideshow_xml::{
    ParseError, XmlReader, parse_slideshow, read_text, resolve_path, skip_element,
};
use crate::timeline::SlideshowTimeline;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WallpaperItem {
    pub name: String,
    /// Light image, or a slideshow descriptor when it ends in `.xml`.
    pub filename: PathBuf,
    pub filename_dark: Option<PathBuf>,
    pub author: Option<String>,
    /// The list document this item came from.
    pub root: PathBuf,
    /// Parsed slideshow when `filename` is a descriptor; empty otherwise.
    pub slideshow: SlideshowTimeline,
}

impl WallpaperItem {
    /// Source to display for `appearance`. Dark falls back to light when no
    /// dark variant is listed or its file is missing.
    #[must_use]
    pub fn source_for(&self, appearance: Appearance) -> &Path {
        match (&self.filename_dark, appearance) {
            (Some(dark), Appearance::Dark) if !dark.as_os_str().is_empty() && dark.exists() => {
                dark
            }
            _ => &self.filename,
        }
    }

    /// Whether the source for `appearance` is a slideshow descriptor, which
    /// needs the re-evaluation timer.
    #[must_use]
    pub fn is_slideshow_source(&self, appearance: Appearance) -> bool {
        is_xml(self.source_for(appearance))
    }

    #[must_use]
    pub fn is_slideshow(&self) -> bool {
        !self.slideshow.is_empty()
    }
}

pub fn is_xml(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}

/// Name up to the first dot, like `wallpaper` for `wallpaper.tar.jpg`.
pub(crate) fn base_name(path: &Path) -> String {
    path.file_name()
        .and_then(OsStr::to_str)
        .and_then(|name| name.split('.').next())
        .unwrap_or_default()
        .to_owned()
}

/// Case-insensitive natural ordering ("2" before "10").
pub(crate) fn natural_cmp(a: &str, b: &str) -> Ordering {
    natord::compare_ignore_case(a, b)
}

/// Parse the wallpaper list at `path`. Unreadable or malformed documents
/// yield an empty list.
#[must_use]
pub fn parse_wallpaper_list(path: &Path, target: Dimension) -> Vec<WallpaperItem> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            debug!(path = %path.display(), %err, "wallpaper list unreadable");
            return Vec::new();
        }
    };

    let mut reader = Reader::from_str(&text);
    let mut items = match read_items(&mut reader, path, target) {
        Ok(items) => items,
        Err(err) => {
            debug!(path = %path.display(), %err, "malformed wallpaper list");
            return Vec::new();
        }
    };

    sort_items(&mut items);
    items
}

/// Stable natural sort by display name.
pub fn sort_items(items: &mut [WallpaperItem]) {
    items.sort_by(|a, b| natural_cmp(&a.name, &b.name));
}

fn read_items(
    reader: &mut XmlReader<'_>,
    root: &Path,
    target: Dimension,
) -> Result<Vec<WallpaperItem>, ParseError> {
    let base_dir = root.parent().unwrap_or_else(|| Path::new(""));
    let mut items = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"wallpaper" => {
                let mut item = read_item(reader, base_dir)?;
                if item.filename.as_os_str().is_empty() {
                    debug!(name = %item.name, "skipping wallpaper without a filename");
                    continue;
                }
                if item.name.is_empty() {
                    item.name = base_name(&item.filename);
                }
                if is_xml(&item.filename) {
                    item.slideshow = parse_slideshow(&item.filename, target);
                }
                item.root = root.to_path_buf();
                items.push(item);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(items)
}

fn read_item(reader: &mut XmlReader<'_>, base_dir: &Path) -> Result<WallpaperItem, ParseError> {
    let mut item = WallpaperItem::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"name" => item.name = read_text(reader)?.trim().to_owned(),
                b"filename" => item.filename = resolve_path(base_dir, &read_text(reader)?),
                b"filename-dark" => {
                    let dark = resolve_path(base_dir, &read_text(reader)?);
                    item.filename_dark = (!dark.as_os_str().is_empty()).then_some(dark);
                }
                b"author" => {
                    let author = read_text(reader)?.trim().to_owned();
                    item.author = (!author.is_empty()).then_some(author);
                }
                _ => skip_element(reader)?,
            },
            Event::End(_) => break,
            Event::Eof => return Err(ParseError::UnexpectedEof),
            _ => {}
        }
    }
    Ok(item)
}
