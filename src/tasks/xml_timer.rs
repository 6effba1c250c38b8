use anyhow::Result;
use chrono_tz::Tz;
use tokio::select;
use tokio::sync::mpsc::Sender;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::events::SlideshowEvent;
use crate::interval::next_wake;
use crate::scheduler::{SlideshowState, evaluate, wall_clock};
use crate::timeline::SlideshowTimeline;

/// Drive a descriptor slideshow from the wall clock.
///
/// Every wake re-evaluates from scratch, so suspend or clock jumps need no
/// special handling. A state is sent when the shown entry changes; running
/// transitions are re-sent on each wake so the blend can move on. The task
/// ends when the timeline has nothing to schedule.
#[instrument(skip_all, fields(entries = timeline.len()))]
pub async fn run(
    timeline: SlideshowTimeline,
    tz: Option<Tz>,
    to_display: Sender<SlideshowEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut last: Option<SlideshowState> = None;

    loop {
        let now = wall_clock(tz);
        let state = evaluate(&timeline, now);

        let changed = last.as_ref().is_none_or(|prev| !prev.same_entry(&state));
        if changed || state.is_transition() {
            debug!(?state, "slideshow state");
            select! {
                _ = cancel.cancelled() => {
                    info!("cancel received while sending; exiting slideshow timer");
                    break;
                }
                res = to_display.send(SlideshowEvent::Frame(state.clone())) => {
                    if res.is_err() {
                        warn!("display channel closed");
                        break;
                    }
                }
            }
        }
        last = Some(state);

        let Some(wake) = next_wake(&timeline, now) else {
            info!("slideshow has no schedule; timer stopped");
            break;
        };
        debug!(delay_ms = wake.millis(), in_transition = wake.in_transition, "next wake");

        select! {
            _ = cancel.cancelled() => {
                info!("cancel received; exiting slideshow timer");
                break;
            }
            _ = sleep(wake.delay) => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::TimelineEntry;
    use std::path::PathBuf;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    #[tokio::test]
    async fn empty_timeline_reports_inactive_and_stops() {
        let (tx, mut rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        run(SlideshowTimeline::empty(), None, tx, cancel)
            .await
            .unwrap();
        assert_eq!(
            rx.recv().await,
            Some(SlideshowEvent::Frame(SlideshowState::Inactive))
        );
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn single_still_is_sent_then_waits_for_cancel() {
        let still = PathBuf::from("/w/still.jpg");
        let timeline = SlideshowTimeline::new(
            vec![TimelineEntry::Static {
                path: still.clone(),
                duration: 86_400.0,
            }],
            None,
        );
        let (tx, mut rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(timeline, None, tx, cancel.clone()));

        let event = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timeout waiting for frame")
            .expect("channel closed");
        assert_eq!(
            event,
            SlideshowEvent::Frame(SlideshowState::Static { path: still })
        );

        cancel.cancel();
        timeout(Duration::from_secs(2), handle)
            .await
            .expect("timer did not stop")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn cancel_stops_a_timer_blocked_on_a_full_channel() {
        let timeline = SlideshowTimeline::new(
            vec![TimelineEntry::Static {
                path: PathBuf::from("/w/still.jpg"),
                duration: 86_400.0,
            }],
            None,
        );
        let (tx, mut rx) = mpsc::channel(1);
        tx.send(SlideshowEvent::Frame(SlideshowState::Inactive))
            .await
            .unwrap();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(timeline, None, tx, cancel.clone()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());
        cancel.cancel();
        timeout(Duration::from_secs(2), handle)
            .await
            .expect("timer stayed blocked on send")
            .unwrap()
            .unwrap();

        // Only the queued event; the blocked state was never delivered.
        assert_eq!(
            rx.recv().await,
            Some(SlideshowEvent::Frame(SlideshowState::Inactive))
        );
        assert_eq!(rx.recv().await, None);
    }
}
