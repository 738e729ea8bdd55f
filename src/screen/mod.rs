//! Display enumeration and screen capture.
//!
//! Pixels come from a [`ScreenSource`]. The [`DisplayRegistry`] keeps the
//! last enumerated display list as an immutable snapshot; `refresh` swaps the
//! whole snapshot under a write lock, so readers either see the old list or
//! the new one, never a mix.

mod capture;
mod memory;
#[cfg(feature = "xcap")]
mod live;

pub use capture::ScreenshotImage;
pub use memory::StaticScreen;
#[cfg(feature = "xcap")]
pub use live::XcapScreen;

use crate::geometry::Rectangle;
use crate::util::{FinderError, FinderResult};
use ::image::RgbImage;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// One physical display in absolute desktop coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Display {
    /// Zero-based index in enumeration order.
    pub index: usize,
    pub bounds: Rectangle,
    pub primary: bool,
}

/// Backend that enumerates displays and grabs their pixels.
pub trait ScreenSource: Send + Sync {
    /// Lists the currently attached displays.
    fn displays(&self) -> FinderResult<Vec<Display>>;

    /// Captures `area` (absolute coordinates, contained in `display`) as
    /// 8-bit RGB at exactly `area`'s size.
    fn capture(&self, display: &Display, area: Rectangle) -> FinderResult<RgbImage>;
}

/// Process-wide view of the attached displays.
pub struct DisplayRegistry {
    source: Arc<dyn ScreenSource>,
    snapshot: RwLock<Arc<[Display]>>,
}

impl DisplayRegistry {
    /// Creates an empty registry; call [`DisplayRegistry::refresh`] before use.
    pub fn new(source: Arc<dyn ScreenSource>) -> Self {
        Self {
            source,
            snapshot: RwLock::new(Arc::from(Vec::new())),
        }
    }

    pub fn source(&self) -> &Arc<dyn ScreenSource> {
        &self.source
    }

    /// Re-enumerates displays and publishes the new snapshot.
    pub fn refresh(&self) -> FinderResult<Arc<[Display]>> {
        let displays = self.source.displays()?;
        if displays.is_empty() {
            return Err(FinderError::screenshot("no displays attached"));
        }
        let displays: Arc<[Display]> = Arc::from(displays);
        debug!(displays = displays.len(), "display registry refreshed");
        *self.snapshot.write() = Arc::clone(&displays);
        Ok(displays)
    }

    /// Returns the last published snapshot without re-enumerating.
    pub fn snapshot(&self) -> Arc<[Display]> {
        Arc::clone(&self.snapshot.read())
    }

    pub fn len(&self) -> usize {
        self.snapshot.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Display at `index` in the current snapshot.
    pub fn get(&self, index: usize) -> FinderResult<Display> {
        let snapshot = self.snapshot();
        snapshot
            .get(index)
            .copied()
            .ok_or(FinderError::DisplayIndex {
                index,
                len: snapshot.len(),
            })
    }

    /// The primary display, falling back to index 0.
    pub fn primary(&self) -> FinderResult<Display> {
        let snapshot = self.snapshot();
        snapshot
            .iter()
            .find(|display| display.primary)
            .or_else(|| snapshot.first())
            .copied()
            .ok_or(FinderError::DisplayIndex { index: 0, len: 0 })
    }

    /// Bounds of the display at `index`.
    pub fn bounds(&self, index: usize) -> FinderResult<Rectangle> {
        Ok(self.get(index)?.bounds)
    }

    /// First display whose bounds fully contain `rect`.
    pub fn display_for(&self, rect: &Rectangle) -> Option<Display> {
        self.snapshot()
            .iter()
            .find(|display| display.bounds.contains_rect(rect))
            .copied()
    }
}

impl std::fmt::Debug for DisplayRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayRegistry")
            .field("displays", &self.snapshot())
            .finish_non_exhaustive()
    }
}
