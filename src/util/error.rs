//! Error types for screenmatch.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for screenmatch operations.
pub type FinderResult<T> = std::result::Result<T, FinderError>;

/// Errors that can occur while loading patterns, capturing the screen or
/// matching.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FinderError {
    /// Width or height is zero or overflows the buffer arithmetic.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride (in elements) is smaller than `width * channels`.
    #[error("invalid stride {stride} for row length {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Channel count outside the supported range.
    #[error("unsupported channel count: {channels}")]
    InvalidChannels { channels: usize },
    /// Backing buffer is shorter than the view requires.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Region of interest does not fit inside the image.
    #[error("roi ({x},{y},{width}x{height}) out of bounds for {img_width}x{img_height} image")]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Template cannot be correlated (e.g. a flat image).
    #[error("degenerate template: {reason}")]
    DegenerateTemplate { reason: &'static str },
    /// No candidate path for a pattern exists on disk.
    #[error("pattern image not found: {name} ({} candidate paths searched)", .searched.len())]
    PatternNotFound { name: String, searched: Vec<PathBuf> },
    /// Image decoding or encoding failed.
    #[error("image io failed for {}: {reason}", .path.display())]
    ImageIo { path: PathBuf, reason: String },
    /// The platform could not produce a screenshot.
    #[error("screenshot failed: {reason}")]
    Screenshot { reason: String },
    /// Unknown match mode name.
    #[error("invalid match mode: {mode:?}")]
    InvalidMatchMode { mode: String },
    /// Display index not present in the registry.
    #[error("display index {index} out of range ({len} displays)")]
    DisplayIndex { index: usize, len: usize },
}

impl FinderError {
    pub(crate) fn screenshot(reason: impl Into<String>) -> Self {
        Self::Screenshot {
            reason: reason.into(),
        }
    }

    /// Returns true for capture failures, which matching loops recover from.
    pub fn is_screenshot(&self) -> bool {
        matches!(self, Self::Screenshot { .. } | Self::DisplayIndex { .. })
    }
}
