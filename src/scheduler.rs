//! Wall-clock slideshow evaluation.
//!
//! Nothing is remembered between calls: the active entry is recomputed from
//! the timeline's anchor and the current time, so the schedule survives
//! restarts and suspend/resume without stored state.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::timeline::{CycleSlot, SlideshowTimeline, TimelineEntry};

/// What a slideshow shows at a given instant.
#[derive(Debug, Clone, PartialEq)]
pub enum SlideshowState {
    /// No usable schedule (empty timeline or zero total duration). Callers
    /// show a plain image instead.
    Inactive,
    /// A single image.
    Static { path: PathBuf },
    /// A cross-fade in progress. `blend_ratio` is 0 at the start (all
    /// `from`) and approaches 1 towards the end (all `to`).
    Transition {
        from: PathBuf,
        to: PathBuf,
        kind: String,
        blend_ratio: f64,
    },
}

impl SlideshowState {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Inactive)
    }

    #[must_use]
    pub const fn is_transition(&self) -> bool {
        matches!(self, Self::Transition { .. })
    }

    /// The single image to show, if this state has one.
    #[must_use]
    pub fn active_path(&self) -> Option<&Path> {
        match self {
            Self::Static { path } => Some(path.as_path()),
            Self::Inactive | Self::Transition { .. } => None,
        }
    }

    /// Blend progress for transitions, 0 otherwise.
    #[must_use]
    pub fn blend_ratio(&self) -> f64 {
        match self {
            Self::Transition { blend_ratio, .. } => *blend_ratio,
            Self::Inactive | Self::Static { .. } => 0.0,
        }
    }

    /// Two states show the same picture pair, ignoring blend progress.
    #[must_use]
    pub fn same_entry(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Inactive, Self::Inactive) => true,
            (Self::Static { path: a }, Self::Static { path: b }) => a == b,
            (
                Self::Transition { from: fa, to: ta, .. },
                Self::Transition { from: fb, to: tb, .. },
            ) => fa == fb && ta == tb,
            _ => false,
        }
    }
}

/// Current wall-clock time, in `tz` when given and the system zone otherwise.
#[must_use]
pub fn wall_clock(tz: Option<Tz>) -> NaiveDateTime {
    match tz {
        Some(tz) => Utc::now().with_timezone(&tz).naive_local(),
        None => Local::now().naive_local(),
    }
}

/// The timeline's anchor: its start time, or midnight of `now`'s day.
#[must_use]
pub fn effective_start(timeline: &SlideshowTimeline, now: NaiveDateTime) -> NaiveDateTime {
    timeline
        .start_time()
        .unwrap_or_else(|| now.date().and_time(NaiveTime::MIN))
}

/// Position within the current cycle in seconds, plus the cycle length.
///
/// `None` when the timeline has no schedule. A start time in the future
/// counts as zero elapsed time.
#[must_use]
pub fn cycle_position(timeline: &SlideshowTimeline, now: NaiveDateTime) -> Option<(f64, f64)> {
    let total = timeline.total_duration();
    if timeline.is_empty() || total <= 0.0 {
        return None;
    }
    let start = effective_start(timeline, now);
    let elapsed_ms = now.signed_duration_since(start).num_milliseconds().max(0);
    let elapsed = elapsed_ms as f64 / 1000.0;
    Some((elapsed % total, total))
}

/// Locate the entry active at `now`.
#[must_use]
pub fn active_slot(timeline: &SlideshowTimeline, now: NaiveDateTime) -> Option<(CycleSlot, f64)> {
    let (position, _) = cycle_position(timeline, now)?;
    timeline
        .cycle_index()
        .locate(position)
        .map(|slot| (slot, position))
}

/// Evaluate the slideshow at `now`.
#[must_use]
pub fn evaluate(timeline: &SlideshowTimeline, now: NaiveDateTime) -> SlideshowState {
    let Some((position, _)) = cycle_position(timeline, now) else {
        return SlideshowState::Inactive;
    };

    let Some(slot) = timeline.cycle_index().locate(position) else {
        return timeline
            .last_static()
            .map_or(SlideshowState::Inactive, |path| SlideshowState::Static {
                path: path.to_path_buf(),
            });
    };

    match &timeline.entries()[slot.index] {
        TimelineEntry::Static { path, .. } => SlideshowState::Static { path: path.clone() },
        TimelineEntry::Transition { from, to, kind, .. } => {
            let ratio = 1.0 - (slot.end - position) / slot.duration();
            SlideshowState::Transition {
                from: from.clone(),
                to: to.clone(),
                kind: kind.clone(),
                blend_ratio: ratio.clamp(0.0, 1.0),
            }
        }
    }
}
