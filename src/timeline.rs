//! Slideshow timeline model: an ordered cycle of static images and
//! cross-fades, optionally anchored at a start time.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

/// One step of a slideshow cycle. Durations are in seconds.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEntry {
    /// A single image shown for `duration` seconds.
    Static { path: PathBuf, duration: f64 },
    /// A cross-fade from `from` to `to` lasting `duration` seconds.
    /// `kind` is the descriptor's `type` attribute, empty when absent.
    Transition {
        from: PathBuf,
        to: PathBuf,
        duration: f64,
        kind: String,
    },
}

impl TimelineEntry {
    #[must_use]
    pub fn duration(&self) -> f64 {
        match self {
            Self::Static { duration, .. } | Self::Transition { duration, .. } => *duration,
        }
    }

    #[must_use]
    pub const fn is_transition(&self) -> bool {
        matches!(self, Self::Transition { .. })
    }

    /// Whether the entry carries the paths it needs to be shown.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Static { path, .. } => !path.as_os_str().is_empty(),
            Self::Transition { from, to, .. } => {
                !from.as_os_str().is_empty() && !to.as_os_str().is_empty()
            }
        }
    }
}

/// Clamp a raw duration to a finite, non-negative number of seconds.
#[must_use]
pub fn sanitize_duration(seconds: f64) -> f64 {
    if seconds.is_finite() { seconds.max(0.0) } else { 0.0 }
}

/// Immutable, ordered slideshow cycle.
///
/// An empty timeline means "not a slideshow"; every consumer falls back to a
/// plain image in that case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlideshowTimeline {
    entries: Vec<TimelineEntry>,
    start_time: Option<NaiveDateTime>,
}

impl SlideshowTimeline {
    /// Build a timeline, dropping entries with missing paths.
    #[must_use]
    pub fn new(entries: Vec<TimelineEntry>, start_time: Option<NaiveDateTime>) -> Self {
        let entries = entries
            .into_iter()
            .filter(TimelineEntry::is_valid)
            .map(|entry| match entry {
                TimelineEntry::Static { path, duration } => TimelineEntry::Static {
                    path,
                    duration: sanitize_duration(duration),
                },
                TimelineEntry::Transition {
                    from,
                    to,
                    duration,
                    kind,
                } => TimelineEntry::Transition {
                    from,
                    to,
                    duration: sanitize_duration(duration),
                    kind,
                },
            })
            .collect();
        Self {
            entries,
            start_time,
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    #[must_use]
    pub const fn start_time(&self) -> Option<NaiveDateTime> {
        self.start_time
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry durations in seconds.
    #[must_use]
    pub fn total_duration(&self) -> f64 {
        self.entries.iter().map(TimelineEntry::duration).sum()
    }

    #[must_use]
    pub fn cycle_index(&self) -> CycleIndex {
        CycleIndex::new(&self.entries)
    }

    /// Paths of every static frame, in cycle order.
    pub fn static_paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().filter_map(|entry| match entry {
            TimelineEntry::Static { path, .. } => Some(path.as_path()),
            TimelineEntry::Transition { .. } => None,
        })
    }

    #[must_use]
    pub fn first_static(&self) -> Option<&Path> {
        self.static_paths().next()
    }

    #[must_use]
    pub fn last_static(&self) -> Option<&Path> {
        self.static_paths().last()
    }
}

/// Located entry within one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSlot {
    pub index: usize,
    pub start: f64,
    pub end: f64,
}

impl CycleSlot {
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Cumulative entry offsets `[0, d0, d0 + d1, ..., total]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleIndex {
    offsets: Vec<f64>,
}

impl CycleIndex {
    fn new(entries: &[TimelineEntry]) -> Self {
        let mut offsets = Vec::with_capacity(entries.len() + 1);
        let mut total = 0.0;
        offsets.push(total);
        for entry in entries {
            total += entry.duration();
            offsets.push(total);
        }
        Self { offsets }
    }

    #[must_use]
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.offsets.last().copied().unwrap_or(0.0)
    }

    /// First entry whose end offset is strictly greater than `position`.
    ///
    /// An entry therefore covers `[start, end)`: a position sitting exactly on
    /// a boundary belongs to the entry that begins there.
    #[must_use]
    pub fn locate(&self, position: f64) -> Option<CycleSlot> {
        self.offsets
            .windows(2)
            .enumerate()
            .find(|(_, w)| w[1] > position)
            .map(|(index, w)| CycleSlot {
                index,
                start: w[0],
                end: w[1],
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still(path: &str, duration: f64) -> TimelineEntry {
        TimelineEntry::Static {
            path: PathBuf::from(path),
            duration,
        }
    }

    #[test]
    fn invalid_entries_are_dropped() {
        let timeline = SlideshowTimeline::new(
            vec![
                still("", 10.0),
                still("/a.jpg", 10.0),
                TimelineEntry::Transition {
                    from: PathBuf::from("/a.jpg"),
                    to: PathBuf::new(),
                    duration: 5.0,
                    kind: String::new(),
                },
            ],
            None,
        );
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn negative_and_nan_durations_become_zero() {
        let timeline =
            SlideshowTimeline::new(vec![still("/a.jpg", -5.0), still("/b.jpg", f64::NAN)], None);
        assert!(timeline.total_duration().abs() < f64::EPSILON);
    }

    #[test]
    fn locate_uses_half_open_slots() {
        let timeline =
            SlideshowTimeline::new(vec![still("/a.jpg", 10.0), still("/b.jpg", 20.0)], None);
        let index = timeline.cycle_index();
        assert_eq!(index.offsets(), &[0.0, 10.0, 30.0]);
        assert_eq!(index.locate(0.0).map(|s| s.index), Some(0));
        assert_eq!(index.locate(9.5).map(|s| s.index), Some(0));
        assert_eq!(index.locate(10.0).map(|s| s.index), Some(1));
        assert_eq!(index.locate(30.0), None);
    }

    #[test]
    fn zero_length_entries_are_never_located() {
        let timeline = SlideshowTimeline::new(
            vec![still("/a.jpg", 0.0), still("/b.jpg", 10.0)],
            None,
        );
        let slot = timeline.cycle_index().locate(0.0).expect("slot");
        assert_eq!(slot.index, 1);
    }
}
