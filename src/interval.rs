//! Wake-up alignment for the slideshow re-evaluation timer.

use std::time::Duration;

use chrono::NaiveDateTime;

use crate::scheduler::{active_slot, cycle_position};
use crate::timeline::SlideshowTimeline;

/// Longest wait while a transition is running, so the blend keeps moving.
pub const TRANSITION_WAKE_CAP: Duration = Duration::from_secs(600);

/// Shortest wait in every case.
pub const MIN_WAKE: Duration = Duration::from_secs(60);

/// When to evaluate the slideshow next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeDelay {
    pub delay: Duration,
    /// The boundary being waited for closes a transition.
    pub in_transition: bool,
}

impl WakeDelay {
    /// Delay in whole milliseconds, saturating instead of wrapping.
    #[must_use]
    pub fn millis(&self) -> u64 {
        self.delay.as_millis().min(u128::from(u64::MAX)) as u64
    }

    /// Delay for timer APIs that take a signed 32-bit millisecond count.
    #[must_use]
    pub fn millis_i32(&self) -> i32 {
        i32::try_from(self.millis()).unwrap_or(i32::MAX)
    }
}

/// Seconds to a `Duration`, saturating at `Duration::MAX`.
fn saturating_secs(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(Duration::MAX)
}

/// How long until the slideshow's next boundary.
///
/// Returns `None` when the timeline has no schedule and no timer is needed.
#[must_use]
pub fn next_wake(timeline: &SlideshowTimeline, now: NaiveDateTime) -> Option<WakeDelay> {
    cycle_position(timeline, now)?;

    let Some((slot, position)) = active_slot(timeline, now) else {
        return Some(WakeDelay {
            delay: MIN_WAKE,
            in_transition: false,
        });
    };

    let remaining = saturating_secs(slot.end - position);
    let in_transition = timeline.entries()[slot.index].is_transition();
    let delay = if in_transition {
        remaining.min(TRANSITION_WAKE_CAP)
    } else {
        remaining
    };

    Some(WakeDelay {
        delay: delay.max(MIN_WAKE),
        in_transition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_saturate() {
        let wake = WakeDelay {
            delay: Duration::MAX,
            in_transition: false,
        };
        assert_eq!(wake.millis(), u64::MAX);
        assert_eq!(wake.millis_i32(), i32::MAX);
    }

    #[test]
    fn huge_seconds_saturate() {
        assert_eq!(saturating_secs(f64::MAX), Duration::MAX);
        assert_eq!(saturating_secs(-3.0), Duration::ZERO);
    }
}
