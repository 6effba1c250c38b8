//! Resolution matching for multi-resolution wallpapers.
//!
//! Wallpaper bundles and slideshow descriptors often ship the same picture in
//! several sizes, named `<width>x<height>.<ext>`. The matcher scores each
//! candidate against the screen and keeps the closest one.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use serde::de::{self, Deserializer};
use tracing::debug;

/// Weight applied to the aspect-ratio mismatch. Large enough that a wrong
/// aspect ratio always loses against a modest size difference.
const ASPECT_WEIGHT: f32 = 25_000.0;

/// Fallback target when the caller has no usable screen size.
pub const DEFAULT_TARGET: Dimension = Dimension::new(1920, 1080);

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl Dimension {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height, or 0 when the height is zero.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0 {
            self.width as f32 / self.height as f32
        } else {
            0.0
        }
    }

    #[must_use]
    pub const fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
        let width = w
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid width in {s:?}: {e}"))?;
        let height = h
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid height in {s:?}: {e}"))?;
        Ok(Self { width, height })
    }
}

impl<'de> Deserialize<'de> for Dimension {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Extract the resolution encoded in a file name such as `1920x1080.jpg`.
///
/// Only the part of the name before the first dot is considered. Returns
/// `None` unless both sides parse as positive integers.
#[must_use]
pub fn resolution_from_name(path: &Path) -> Option<Dimension> {
    let name = path.file_name()?.to_str()?;
    let base = name.split('.').next().unwrap_or(name);
    let (w, h) = base.split_once('x')?;
    let width = w.parse::<u32>().ok()?;
    let height = h.parse::<u32>().ok()?;
    let dim = Dimension::new(width, height);
    (!dim.is_empty()).then_some(dim)
}

/// Distance between a candidate size and the desired size. Lower is better.
///
/// Upscaling a smaller candidate costs twice as much as downscaling a
/// larger one.
#[must_use]
pub fn distance(candidate: Dimension, desired: Dimension) -> f32 {
    let desired_aspect = desired.aspect_ratio();
    let candidate_aspect = if candidate.height > 0 {
        candidate.width as f32 / candidate.height as f32
    } else {
        f32::MAX
    };

    let mut delta = candidate.width as f32 - desired.width as f32;
    if delta < 0.0 {
        delta = -delta * 2.0;
    }

    (candidate_aspect - desired_aspect).abs() * ASPECT_WEIGHT + delta
}

/// Pick the candidate whose dimensions are closest to `target`.
///
/// Candidates without dimensions are skipped. On equal scores the first one
/// seen wins.
pub fn pick_best<K, I>(candidates: I, target: Dimension) -> Option<K>
where
    I: IntoIterator<Item = (K, Dimension)>,
{
    let mut best: Option<(K, f32)> = None;
    for (key, dim) in candidates {
        if dim.is_empty() {
            continue;
        }
        let score = distance(dim, target);
        if best.as_ref().is_none_or(|(_, current)| score < *current) {
            best = Some((key, score));
        }
    }
    best.map(|(key, _)| key)
}

/// Choose the preferred image among resolution-named variants.
///
/// An empty `target` is replaced by [`DEFAULT_TARGET`].
#[must_use]
pub fn find_preferred_image<P: AsRef<Path>>(paths: &[P], target: Dimension) -> Option<PathBuf> {
    let target = if target.is_empty() {
        DEFAULT_TARGET
    } else {
        target
    };
    let candidates = paths.iter().filter_map(|p| {
        let p = p.as_ref();
        match resolution_from_name(p) {
            Some(dim) => Some((p, dim)),
            None => {
                debug!(path = %p.display(), "no resolution in file name; skipping");
                None
            }
        }
    });
    pick_best(candidates, target).map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_resolution_names() {
        assert_eq!(
            resolution_from_name(Path::new("/a/b/1920x1080.jpg")),
            Some(Dimension::new(1920, 1080))
        );
        assert_eq!(
            resolution_from_name(Path::new("3840x2160.tar.gz")),
            Some(Dimension::new(3840, 2160))
        );
        assert_eq!(resolution_from_name(Path::new("wallpaper.jpg")), None);
        assert_eq!(resolution_from_name(Path::new("0x1080.jpg")), None);
        assert_eq!(resolution_from_name(Path::new("1920x.jpg")), None);
    }

    #[test]
    fn exact_match_scores_zero() {
        let d = Dimension::new(1920, 1080);
        assert!(distance(d, d).abs() < f32::EPSILON);
    }

    #[test]
    fn upscaling_costs_double() {
        let target = Dimension::new(2000, 1000);
        let smaller = distance(Dimension::new(1800, 900), target);
        let larger = distance(Dimension::new(2200, 1100), target);
        assert!((smaller - 400.0).abs() < 0.01, "smaller = {smaller}");
        assert!((larger - 200.0).abs() < 0.01, "larger = {larger}");
    }

    #[test]
    fn ties_keep_first_candidate() {
        let picked = pick_best(
            [("a", Dimension::new(1920, 1080)), ("b", Dimension::new(1920, 1080))],
            Dimension::new(1920, 1080),
        );
        assert_eq!(picked, Some("a"));
    }

    #[test]
    fn dimension_from_str() {
        assert_eq!("1366x768".parse::<Dimension>(), Ok(Dimension::new(1366, 768)));
        assert_eq!(" 320 X 180 ".parse::<Dimension>(), Ok(Dimension::new(320, 180)));
        assert!("1366".parse::<Dimension>().is_err());
    }
}
