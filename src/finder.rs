//! Discovery of wallpapers on disk: plain images, wallpaper list documents
//! and wallpaper packages.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::resolution::{Dimension, find_preferred_image};
use crate::wallpaper_list::{WallpaperItem, is_xml, natural_cmp, parse_wallpaper_list, sort_items};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff"];

/// Package subdirectory holding the image variants.
const PACKAGE_IMAGES: &str = "contents/images";

/// A wallpaper package: a directory with `metadata.json` and
/// `contents/images/`.
#[derive(Debug, Clone, PartialEq)]
pub struct WallpaperPackage {
    pub root: PathBuf,
    pub name: String,
    /// Variant closest to the target resolution.
    pub preferred: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct PackageMetadata {
    #[serde(rename = "KPlugin", default)]
    kplugin: PluginInfo,
}

#[derive(Debug, Default, Deserialize)]
struct PluginInfo {
    #[serde(rename = "Name", default)]
    name: Option<String>,
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

/// Images that belong to a package rather than standing alone.
fn is_package_content(path: &Path) -> bool {
    let in_package = path.to_string_lossy().contains(PACKAGE_IMAGES);
    let screenshot = path
        .file_name()
        .and_then(OsStr::to_str)
        .and_then(|name| name.split('.').next())
        == Some("screenshot");
    in_package || screenshot
}

/// Walk `roots` and return every file, symlinks resolved. A root that is a
/// file is returned as-is. Dot-directories are not entered.
fn walk_files<P: AsRef<Path>>(roots: &[P]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for root in roots {
        let root = root.as_ref();
        if !root.exists() {
            debug!(path = %root.display(), "search path missing; skipping");
            continue;
        }
        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            files.push(fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()));
        }
    }
    files
}

fn dedupe(paths: &mut Vec<PathBuf>) {
    let mut seen = HashSet::new();
    paths.retain(|p| seen.insert(p.clone()));
}

/// Standalone images under `roots`, deduplicated and naturally sorted.
pub fn find_images<P: AsRef<Path>>(roots: &[P]) -> Vec<PathBuf> {
    let mut images: Vec<PathBuf> = walk_files(roots)
        .into_iter()
        .filter(|p| is_image(p) && !is_package_content(p))
        .collect();
    dedupe(&mut images);
    images.sort_by(|a, b| natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()));
    info!(count = images.len(), "image scan complete");
    images
}

/// Entries of every wallpaper list document under `roots`, naturally sorted
/// by name.
pub fn find_wallpaper_lists<P: AsRef<Path>>(roots: &[P], target: Dimension) -> Vec<WallpaperItem> {
    let mut documents: Vec<PathBuf> = walk_files(roots).into_iter().filter(|p| is_xml(p)).collect();
    dedupe(&mut documents);

    let mut items: Vec<WallpaperItem> = documents
        .iter()
        .flat_map(|doc| parse_wallpaper_list(doc, target))
        .collect();
    sort_items(&mut items);
    info!(documents = documents.len(), items = items.len(), "wallpaper list scan complete");
    items
}

/// Wallpaper packages under `roots`, naturally sorted by display name.
///
/// Package directories are not searched further.
pub fn find_packages<P: AsRef<Path>>(roots: &[P], target: Dimension) -> Vec<WallpaperPackage> {
    let mut packages = Vec::new();
    let mut seen = HashSet::new();

    for root in roots {
        let root = root.as_ref();
        if !root.is_dir() {
            continue;
        }
        let mut walker = WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| !is_hidden(e));
        while let Some(entry) = walker.next() {
            let Ok(entry) = entry else { continue };
            if !entry.file_type().is_dir() {
                continue;
            }
            let dir = fs::canonicalize(entry.path()).unwrap_or_else(|_| entry.path().to_path_buf());
            if !dir.join("metadata.json").is_file() {
                continue;
            }
            walker.skip_current_dir();
            if !seen.insert(dir.clone()) {
                continue;
            }
            match load_package(&dir, target) {
                Some(package) => packages.push(package),
                None => debug!(path = %dir.display(), "package has no usable images"),
            }
        }
    }

    packages.sort_by(|a, b| natural_cmp(&a.name, &b.name));
    info!(count = packages.len(), "package scan complete");
    packages
}

fn load_package(dir: &Path, target: Dimension) -> Option<WallpaperPackage> {
    let images_dir = dir.join(PACKAGE_IMAGES);
    let mut images: Vec<PathBuf> = fs::read_dir(&images_dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    images.sort();

    let preferred = find_preferred_image(&images, target)?;
    let name = package_name(dir).unwrap_or_else(|| {
        preferred
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or_default()
            .to_owned()
    });

    Some(WallpaperPackage {
        root: dir.to_path_buf(),
        name,
        preferred,
    })
}

fn package_name(dir: &Path) -> Option<String> {
    let raw = fs::read_to_string(dir.join("metadata.json")).ok()?;
    let meta: PackageMetadata = match serde_json::from_str(&raw) {
        Ok(meta) => meta,
        Err(err) => {
            debug!(path = %dir.display(), %err, "unreadable package metadata");
            return None;
        }
    };
    meta.kplugin.name.filter(|name| !name.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_case_insensitive() {
        assert!(is_image(Path::new("/a/B.JPG")));
        assert!(is_image(Path::new("/a/b.tiff")));
        assert!(!is_image(Path::new("/a/b.xml")));
        assert!(!is_image(Path::new("/a/jpg")));
    }

    #[test]
    fn package_content_is_recognised() {
        assert!(is_package_content(Path::new("/w/Pkg/contents/images/1920x1080.png")));
        assert!(is_package_content(Path::new("/w/Pkg/contents/screenshot.png")));
        assert!(!is_package_content(Path::new("/w/photos/beach.png")));
    }
}
