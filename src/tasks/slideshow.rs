use std::time::Duration;

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::Sender;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::events::SlideshowEvent;
use crate::playlist::Playlist;

/// Show the playlist's current slide, then advance every `interval`.
#[instrument(skip_all, fields(slides = playlist.len(), mode = ?playlist.mode()))]
pub async fn run(
    mut playlist: Playlist,
    interval: Duration,
    to_display: Sender<SlideshowEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut next = playlist.current().to_path_buf();

    loop {
        debug!(path = %next.display(), "showing slide");
        select! {
            _ = cancel.cancelled() => break,
            res = to_display.send(SlideshowEvent::Image(next.clone())) => {
                if res.is_err() {
                    warn!("display channel closed");
                    break;
                }
            }
        }

        select! {
            _ = cancel.cancelled() => break,
            _ = sleep(interval) => {}
        }
        next = playlist.advance().to_path_buf();
    }

    info!("exiting slideshow task");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::SortingMode;
    use std::path::PathBuf;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    #[tokio::test]
    async fn slides_advance_and_wrap() {
        let paths = vec![PathBuf::from("/w/a.jpg"), PathBuf::from("/w/b.jpg")];
        let playlist = Playlist::new(paths, SortingMode::Alphabetical, None).unwrap();
        let (tx, mut rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(
            playlist,
            Duration::from_millis(10),
            tx,
            cancel.clone(),
        ));

        let mut seen = Vec::new();
        for _ in 0..3 {
            let event = timeout(Duration::from_secs(2), rx.recv())
                .await
                .expect("timeout waiting for slide")
                .expect("channel closed");
            seen.push(event);
        }
        assert_eq!(
            seen,
            vec![
                SlideshowEvent::Image(PathBuf::from("/w/a.jpg")),
                SlideshowEvent::Image(PathBuf::from("/w/b.jpg")),
                SlideshowEvent::Image(PathBuf::from("/w/a.jpg")),
            ]
        );

        cancel.cancel();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn closed_receiver_ends_the_task() {
        let playlist =
            Playlist::new(vec![PathBuf::from("/w/a.jpg")], SortingMode::Random, Some(3)).unwrap();
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        run(playlist, Duration::from_secs(60), tx, CancellationToken::new())
            .await
            .unwrap();
    }
}
