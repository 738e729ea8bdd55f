//! Live screen source backed by the `xcap` crate.

use crate::geometry::Rectangle;
use crate::screen::{Display, ScreenSource};
use crate::util::{FinderError, FinderResult};
use ::image::{imageops, DynamicImage, RgbImage};
use xcap::Monitor;

/// Captures real monitors in logical (point) coordinates.
///
/// HiDPI monitors return physical pixels; captures are resampled back to the
/// logical size so pattern scale factors stay meaningful.
#[derive(Clone, Copy, Debug, Default)]
pub struct XcapScreen;

impl XcapScreen {
    pub fn new() -> Self {
        Self
    }

    fn monitors() -> FinderResult<Vec<Monitor>> {
        Monitor::all().map_err(|err| FinderError::screenshot(format!("enumerate monitors: {err}")))
    }
}

impl ScreenSource for XcapScreen {
    fn displays(&self) -> FinderResult<Vec<Display>> {
        Ok(Self::monitors()?
            .iter()
            .enumerate()
            .map(|(index, monitor)| Display {
                index,
                bounds: Rectangle::new(monitor.x(), monitor.y(), monitor.width(), monitor.height()),
                primary: monitor.is_primary(),
            })
            .collect())
    }

    fn capture(&self, display: &Display, area: Rectangle) -> FinderResult<RgbImage> {
        let monitors = Self::monitors()?;
        let len = monitors.len();
        let monitor = monitors.get(display.index).ok_or(FinderError::DisplayIndex {
            index: display.index,
            len,
        })?;
        let frame = monitor
            .capture_image()
            .map_err(|err| FinderError::screenshot(format!("capture failed: {err}")))?;
        let mut frame = DynamicImage::ImageRgba8(frame).to_rgb8();

        let (logical_w, logical_h) = display.bounds.size();
        if frame.dimensions() != (logical_w, logical_h) {
            frame = imageops::resize(&frame, logical_w, logical_h, imageops::FilterType::Triangle);
        }

        let x = (area.x() - display.bounds.x()) as u32;
        let y = (area.y() - display.bounds.y()) as u32;
        Ok(imageops::crop_imm(&frame, x, y, area.width(), area.height()).to_image())
    }
}
