use std::path::PathBuf;

use crate::scheduler::SlideshowState;

#[derive(Debug, Clone, PartialEq)]
pub enum SlideshowEvent {
    /// Folder slideshow moved to a new image.
    Image(PathBuf),
    /// A descriptor slideshow changed state, or a transition progressed.
    Frame(SlideshowState),
}
