use crate::geometry::Rectangle;
use crate::image::io::{owned_from_gray_image, owned_from_rgb_image};
use crate::image::OwnedImage;
use crate::screen::DisplayRegistry;
use crate::util::{FinderError, FinderResult};
use ::image::{imageops, RgbImage};
use tracing::debug;

/// A freshly captured region with color and luma views.
#[derive(Clone, Debug)]
pub struct ScreenshotImage {
    region: Rectangle,
    rgb: RgbImage,
    color: OwnedImage,
    gray: OwnedImage,
}

impl ScreenshotImage {
    /// Captures `region` from the display at `display`, or from the first
    /// display that fully contains it when no index is given.
    ///
    /// Display bounds are re-enumerated before every capture.
    pub fn capture(
        registry: &DisplayRegistry,
        region: Rectangle,
        display: Option<usize>,
    ) -> FinderResult<Self> {
        if !region.is_valid() {
            return Err(FinderError::screenshot(format!("empty capture region {region}")));
        }
        registry.refresh()?;
        let target = match display {
            Some(index) => {
                let target = registry.get(index)?;
                if !target.bounds.contains_rect(&region) {
                    return Err(FinderError::screenshot(format!(
                        "region {region} outside display {index} {}",
                        target.bounds
                    )));
                }
                target
            }
            None => registry.display_for(&region).ok_or_else(|| {
                FinderError::screenshot(format!("region {region} outside every display"))
            })?,
        };

        let rgb = registry.source().capture(&target, region)?;
        if (rgb.width(), rgb.height()) != region.size() {
            return Err(FinderError::screenshot(format!(
                "source returned {}x{} for region {region}",
                rgb.width(),
                rgb.height()
            )));
        }
        debug!(display = target.index, %region, "captured region");
        Self::from_rgb(region, rgb)
    }

    /// Wraps pixels already covering `region`.
    pub fn from_rgb(region: Rectangle, rgb: RgbImage) -> FinderResult<Self> {
        let color = owned_from_rgb_image(&rgb)?;
        let gray = owned_from_gray_image(&imageops::grayscale(&rgb))?;
        Ok(Self {
            region,
            rgb,
            color,
            gray,
        })
    }

    /// Absolute area these pixels cover.
    pub fn region(&self) -> Rectangle {
        self.region
    }

    pub fn rgb(&self) -> &RgbImage {
        &self.rgb
    }

    pub fn color(&self) -> &OwnedImage {
        &self.color
    }

    pub fn gray(&self) -> &OwnedImage {
        &self.gray
    }
}
