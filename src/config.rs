use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, ensure};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::appearance::Appearance;
use crate::error::Error;
use crate::playlist::{PlaylistOptions, SortingMode};
use crate::resolution::{DEFAULT_TARGET, Dimension};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Directories (or single files) to search for wallpapers.
    pub wallpaper_paths: Vec<PathBuf>,
    /// Screen size used to pick among resolution variants.
    pub target_resolution: Dimension,
    /// Time each slide stays on screen in folder slideshows.
    #[serde(with = "humantime_serde")]
    pub slide_interval: Duration,
    pub sorting_mode: SortingMode,
    /// Optional deterministic seed for random ordering.
    pub shuffle_seed: Option<u64>,
    /// Group alphabetical orders by folder, nested folders first.
    pub folders_first: bool,
    /// Slides never shown, even when discovered.
    pub excluded_slides: Vec<PathBuf>,
    /// Bounds for rendered previews.
    pub thumbnail_size: Dimension,
    pub appearance: Appearance,
    /// Zone for "now" and for the midnight anchor of undated slideshows.
    /// System local time when absent.
    pub timezone: Option<Tz>,
}

impl Configuration {
    const MIN_SLIDE_INTERVAL: Duration = Duration::from_secs(1);

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            !self.wallpaper_paths.is_empty(),
            "wallpaper-paths must list at least one path"
        );
        let missing: Vec<String> = self
            .wallpaper_paths
            .iter()
            .filter(|p| !p.exists())
            .map(|p| p.display().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::BadDir(missing.join(", ")).into());
        }
        ensure!(
            self.slide_interval >= Self::MIN_SLIDE_INTERVAL,
            "slide-interval must be at least 1s"
        );
        ensure!(
            !self.target_resolution.is_empty(),
            "target-resolution must be non-zero"
        );
        ensure!(
            !self.thumbnail_size.is_empty(),
            "thumbnail-size must be non-zero"
        );
        Ok(self)
    }

    #[must_use]
    pub fn playlist_options(&self) -> PlaylistOptions {
        PlaylistOptions {
            mode: self.sorting_mode,
            seed: self.shuffle_seed,
            folders_first: self.folders_first,
            excluded: self.excluded_slides.clone(),
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            wallpaper_paths: Vec::new(),
            target_resolution: DEFAULT_TARGET,
            slide_interval: Duration::from_secs(10 * 60),
            sorting_mode: SortingMode::default(),
            shuffle_seed: None,
            folders_first: false,
            excluded_slides: Vec::new(),
            thumbnail_size: Dimension::new(320, 180),
            appearance: Appearance::default(),
            timezone: None,
        }
    }
}
