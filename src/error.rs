use thiserror::Error;

/// Library error type for discovery and configuration faults.
///
/// The scheduling core never produces these: parse and render failures
/// degrade to empty timelines or missing images instead.
#[derive(Debug, Error)]
pub enum Error {
    /// One or more configured wallpaper directories are missing or unreadable.
    #[error("invalid wallpaper directory: {0}")]
    BadDir(String),

    /// Discovery completed but found nothing to show.
    #[error("no wallpapers found in configured directories")]
    EmptyScan,

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
}
