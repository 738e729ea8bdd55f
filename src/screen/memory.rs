//! In-memory screen source backed by fixed frames.

use crate::geometry::Rectangle;
use crate::screen::{Display, ScreenSource};
use crate::util::{FinderError, FinderResult};
use ::image::{imageops, RgbImage};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

struct Frame {
    bounds: Rectangle,
    primary: bool,
    pixels: RgbImage,
}

/// Screen source that serves preloaded RGB frames, one per display.
///
/// Frames can be replaced while a poll loop is running, which lets callers
/// simulate an element appearing or vanishing. Every capture is counted.
pub struct StaticScreen {
    frames: RwLock<Vec<Frame>>,
    captures: AtomicUsize,
    failing: AtomicBool,
}

impl StaticScreen {
    /// Single primary display at the origin showing `frame`.
    pub fn new(frame: RgbImage) -> Self {
        let bounds = Rectangle::new(0, 0, frame.width(), frame.height());
        Self {
            frames: RwLock::new(vec![Frame {
                bounds,
                primary: true,
                pixels: frame,
            }]),
            captures: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Adds another display whose top-left corner sits at `(x, y)`.
    pub fn with_display(self, x: i32, y: i32, frame: RgbImage, primary: bool) -> Self {
        self.frames.write().push(Frame {
            bounds: Rectangle::new(x, y, frame.width(), frame.height()),
            primary,
            pixels: frame,
        });
        self
    }

    /// Replaces the pixels of display `index`; the frame must keep its size.
    pub fn set_frame(&self, index: usize, frame: RgbImage) -> FinderResult<()> {
        let mut frames = self.frames.write();
        let len = frames.len();
        let slot = frames
            .get_mut(index)
            .ok_or(FinderError::DisplayIndex { index, len })?;
        if (frame.width(), frame.height()) != slot.bounds.size() {
            return Err(FinderError::InvalidDimensions {
                width: frame.width() as usize,
                height: frame.height() as usize,
            });
        }
        slot.pixels = frame;
        Ok(())
    }

    /// Makes every subsequent capture fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of capture calls served so far, failed ones included.
    pub fn capture_count(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }
}

impl ScreenSource for StaticScreen {
    fn displays(&self) -> FinderResult<Vec<Display>> {
        Ok(self
            .frames
            .read()
            .iter()
            .enumerate()
            .map(|(index, frame)| Display {
                index,
                bounds: frame.bounds,
                primary: frame.primary,
            })
            .collect())
    }

    fn capture(&self, display: &Display, area: Rectangle) -> FinderResult<RgbImage> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(FinderError::screenshot("capture disabled"));
        }
        let frames = self.frames.read();
        let frame = frames.get(display.index).ok_or(FinderError::DisplayIndex {
            index: display.index,
            len: frames.len(),
        })?;
        if !frame.bounds.contains_rect(&area) {
            return Err(FinderError::screenshot(format!(
                "area {area} outside display {}",
                frame.bounds
            )));
        }
        let x = (area.x() - frame.bounds.x()) as u32;
        let y = (area.y() - frame.bounds.y()) as u32;
        Ok(imageops::crop_imm(&frame.pixels, x, y, area.width(), area.height()).to_image())
    }
}
