//! Slide ordering for folder slideshows.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::debug;

use crate::error::Error;
use crate::wallpaper_list::natural_cmp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortingMode {
    #[default]
    Random,
    Alphabetical,
    AlphabeticalReversed,
    /// Oldest first.
    Modified,
    /// Newest first.
    ModifiedReversed,
}

/// How a scan becomes a playlist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistOptions {
    pub mode: SortingMode,
    /// Makes random ordering reproducible.
    pub seed: Option<u64>,
    /// Alphabetical modes group slides by folder, nested folders first.
    pub folders_first: bool,
    /// Slides left out of the rotation.
    pub excluded: Vec<PathBuf>,
}

/// Ordered slides plus the position of the one on screen.
#[derive(Debug)]
pub struct Playlist {
    slides: Vec<PathBuf>,
    mode: SortingMode,
    folders_first: bool,
    position: usize,
    rng: StdRng,
}

impl Playlist {
    /// Order `paths` by `mode`. Random mode is reproducible when `seed` is given.
    pub fn new(paths: Vec<PathBuf>, mode: SortingMode, seed: Option<u64>) -> Result<Self, Error> {
        Self::with_options(
            paths,
            &PlaylistOptions {
                mode,
                seed,
                ..PlaylistOptions::default()
            },
        )
    }

    /// Drop excluded slides, then order the rest. Fails when nothing is left.
    pub fn with_options(
        mut paths: Vec<PathBuf>,
        options: &PlaylistOptions,
    ) -> Result<Self, Error> {
        if !options.excluded.is_empty() {
            let before = paths.len();
            paths.retain(|p| !options.excluded.contains(p));
            debug!(excluded = before - paths.len(), "filtered excluded slides");
        }
        if paths.is_empty() {
            return Err(Error::EmptyScan);
        }
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut playlist = Self {
            slides: paths,
            mode: options.mode,
            folders_first: options.folders_first,
            position: 0,
            rng,
        };
        playlist.order();
        Ok(playlist)
    }

    fn order(&mut self) {
        match self.mode {
            SortingMode::Random => self.slides.shuffle(&mut self.rng),
            SortingMode::Alphabetical if self.folders_first => {
                self.slides.sort_by(|a, b| by_folder(a, b, false));
            }
            SortingMode::AlphabeticalReversed if self.folders_first => {
                self.slides.sort_by(|a, b| by_folder(a, b, true));
            }
            SortingMode::Alphabetical => self.slides.sort_by(|a, b| by_name(a, b)),
            SortingMode::AlphabeticalReversed => self.slides.sort_by(|a, b| by_name(b, a)),
            SortingMode::Modified => sort_by_modified(&mut self.slides),
            SortingMode::ModifiedReversed => {
                sort_by_modified(&mut self.slides);
                self.slides.reverse();
            }
        }
    }

    #[must_use]
    pub const fn mode(&self) -> SortingMode {
        self.mode
    }

    #[must_use]
    pub fn slides(&self) -> &[PathBuf] {
        &self.slides
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    #[must_use]
    pub fn current(&self) -> &Path {
        &self.slides[self.position]
    }

    /// Move to the next slide and return it.
    ///
    /// Random playlists reshuffle at the end of each round, keeping the slide
    /// just shown out of the new first position.
    pub fn advance(&mut self) -> &Path {
        self.position += 1;
        if self.position >= self.slides.len() {
            self.position = 0;
            if self.mode == SortingMode::Random {
                self.reshuffle();
            }
        }
        self.current()
    }

    fn reshuffle(&mut self) {
        let Some(last) = self.slides.last().cloned() else {
            return;
        };
        self.slides.shuffle(&mut self.rng);
        if self.slides.len() > 1 && self.slides[0] == last {
            let swap_with = self.slides.len() - 1;
            self.slides.swap(0, swap_with);
        }
        debug!(slides = self.slides.len(), "reshuffled playlist");
    }

    /// Index of `path` in the current order.
    #[must_use]
    pub fn position_of(&self, path: &Path) -> Option<usize> {
        self.slides.iter().position(|p| p == path)
    }

    /// Continue from `path`. Returns false and stays put when it is unknown.
    pub fn seek(&mut self, path: &Path) -> bool {
        match self.position_of(path) {
            Some(index) => {
                self.position = index;
                true
            }
            None => false,
        }
    }
}

fn by_name(a: &Path, b: &Path) -> Ordering {
    let name = |p: &Path| {
        p.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    natural_cmp(&name(a), &name(b)).then_with(|| a.cmp(b))
}

/// Folder first, then file name. A folder nested inside another sorts
/// before it in both directions; `reversed` only flips sibling order.
fn by_folder(a: &Path, b: &Path, reversed: bool) -> Ordering {
    let dir = |p: &Path| p.parent().map(Path::to_path_buf).unwrap_or_default();
    let (da, db) = (dir(a), dir(b));
    let mut ca = da.components();
    let mut cb = db.components();
    let folders = loop {
        match (ca.next(), cb.next()) {
            (None, None) => break Ordering::Equal,
            (Some(_), None) => break Ordering::Less,
            (None, Some(_)) => break Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = natural_cmp(
                    &x.as_os_str().to_string_lossy(),
                    &y.as_os_str().to_string_lossy(),
                );
                if ord != Ordering::Equal {
                    break if reversed { ord.reverse() } else { ord };
                }
            }
        }
    };
    folders.then_with(|| if reversed { by_name(b, a) } else { by_name(a, b) })
}

fn modified(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Oldest first; equal timestamps fall back to name order.
fn sort_by_modified(slides: &mut Vec<PathBuf>) {
    let mut keyed: Vec<(SystemTime, PathBuf)> =
        slides.drain(..).map(|p| (modified(&p), p)).collect();
    keyed.sort_by(|(ta, a), (tb, b)| ta.cmp(tb).then_with(|| by_name(a, b)));
    slides.extend(keyed.into_iter().map(|(_, p)| p));
}
