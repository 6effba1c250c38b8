//! Light/dark palette handling for wallpapers that ship a night variant.

use serde::Deserialize;

/// Gray values below this count as a dark palette.
const DARK_GRAY_THRESHOLD: u32 = 192;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Appearance {
    #[default]
    Light,
    Dark,
}

impl Appearance {
    /// Classify a palette by its window background color.
    #[must_use]
    pub fn from_window_color(rgb: [u8; 3]) -> Self {
        if gray(rgb) < DARK_GRAY_THRESHOLD {
            Self::Dark
        } else {
            Self::Light
        }
    }

    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

/// Weighted gray value in `0..=255`.
fn gray([r, g, b]: [u8; 3]) -> u32 {
    (u32::from(r) * 11 + u32::from(g) * 16 + u32::from(b) * 5) / 32
}
