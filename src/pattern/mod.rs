//! Reference images and their match parameters.
//!
//! A `Pattern` is cheap to construct: nothing touches the disk until the
//! first accessor that needs pixels. The decoded image is memoized in a
//! `OnceLock` and shared by `Arc` with patterns derived through
//! [`Pattern::target_offset`], so one decode serves every click target cut
//! from the same image. A missing file therefore surfaces as
//! `PatternNotFound` on first use rather than at construction.

mod name;
mod resolve;

pub use name::parse_name;
pub use resolve::SearchPaths;

use crate::geometry::Location;
use crate::image::io::{load_rgb_image, owned_from_gray_image, owned_from_rgb_image};
use crate::image::scale::downscale_rgb;
use crate::image::OwnedImage;
use crate::settings::Settings;
use crate::util::{FinderError, FinderResult};
use ::image::imageops;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Threshold that selects exact (color) matching.
pub const EXACT_SIMILARITY: f64 = 0.99;

/// Decoded, scale-normalized pixels of a pattern. Immutable once built.
pub struct PatternImage {
    name: String,
    path: PathBuf,
    scale_factor: f64,
    color: OwnedImage,
    gray: OwnedImage,
}

impl PatternImage {
    /// Decodes `path` and resamples it to its logical (post-scale) size.
    pub fn open(path: &Path) -> FinderResult<Self> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (name, scale_factor) = parse_name(&file_name);

        let rgb = load_rgb_image(path)?;
        let rgb = downscale_rgb(&rgb, scale_factor)?;
        let gray = imageops::grayscale(&rgb);
        debug!(
            path = %path.display(),
            scale_factor,
            width = rgb.width(),
            height = rgb.height(),
            "loaded pattern image"
        );

        Ok(Self {
            name,
            path: path.to_path_buf(),
            scale_factor,
            color: owned_from_rgb_image(&rgb)?,
            gray: owned_from_gray_image(&gray)?,
        })
    }

    /// File name with any `@<scale>x` token removed.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Post-scale `(width, height)` in screen pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.color.width() as u32, self.color.height() as u32)
    }

    /// RGB pixels at logical size.
    pub fn color(&self) -> &OwnedImage {
        &self.color
    }

    /// Luma pixels at logical size.
    pub fn gray(&self) -> &OwnedImage {
        &self.gray
    }
}

impl fmt::Debug for PatternImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternImage")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("scale_factor", &self.scale_factor)
            .field("size", &self.size())
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum PatternSource {
    Search(SearchPaths),
    File(PathBuf),
}

/// A reference image plus the parameters used to find it on screen.
#[derive(Clone, Debug)]
pub struct Pattern {
    requested: String,
    source: PatternSource,
    default_similarity: f64,
    similarity: f64,
    target_offset: Option<Location>,
    image: OnceLock<Arc<PatternImage>>,
}

impl Pattern {
    /// Declares a pattern resolved through the settings' image directories.
    pub fn new(image: impl Into<String>, settings: &Settings) -> Self {
        Self::with_source(
            image.into(),
            PatternSource::Search(SearchPaths::from_settings(settings)),
            settings,
        )
    }

    /// Declares a pattern backed by an explicit file, skipping the search order.
    pub fn from_path(path: impl Into<PathBuf>, settings: &Settings) -> Self {
        let path = path.into();
        let requested = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::with_source(requested, PatternSource::File(path), settings)
    }

    fn with_source(requested: String, source: PatternSource, settings: &Settings) -> Self {
        let default_similarity = settings.min_similarity().clamp(0.0, EXACT_SIMILARITY);
        Self {
            requested,
            source,
            default_similarity,
            similarity: default_similarity,
            target_offset: None,
            image: OnceLock::new(),
        }
    }

    /// Loads and memoizes the pixels. Idempotent.
    pub fn load(&self) -> FinderResult<&PatternImage> {
        if let Some(image) = self.image.get() {
            return Ok(image.as_ref());
        }
        let path = match &self.source {
            PatternSource::Search(paths) => paths.resolve(&self.requested)?,
            PatternSource::File(path) if path.is_file() => path.clone(),
            PatternSource::File(path) => {
                return Err(FinderError::PatternNotFound {
                    name: self.requested.clone(),
                    searched: vec![path.clone()],
                })
            }
        };
        let image = Arc::new(PatternImage::open(&path)?);
        Ok(self.image.get_or_init(|| image).as_ref())
    }

    /// Whether pixels have been decoded yet.
    pub fn is_loaded(&self) -> bool {
        self.image.get().is_some()
    }

    /// Name this pattern was declared with.
    pub fn requested_name(&self) -> &str {
        &self.requested
    }

    /// Logical file name (scale token removed).
    pub fn filename(&self) -> FinderResult<&str> {
        Ok(self.load()?.name())
    }

    /// Resolved path of the backing file.
    pub fn file_path(&self) -> FinderResult<&Path> {
        Ok(self.load()?.path())
    }

    pub fn scale_factor(&self) -> FinderResult<f64> {
        Ok(self.load()?.scale_factor())
    }

    /// Post-scale `(width, height)`.
    pub fn size(&self) -> FinderResult<(u32, u32)> {
        Ok(self.load()?.size())
    }

    pub fn color_image(&self) -> FinderResult<&OwnedImage> {
        Ok(self.load()?.color())
    }

    pub fn gray_image(&self) -> FinderResult<&OwnedImage> {
        Ok(self.load()?.gray())
    }

    /// Current similarity threshold in `[0, 0.99]`.
    pub fn similarity(&self) -> f64 {
        self.similarity
    }

    /// Whether the threshold selects exact (color) matching.
    pub fn is_exact(&self) -> bool {
        self.similarity == EXACT_SIMILARITY
    }

    /// Sets the minimum similarity for this instance.
    ///
    /// Values above 0.99 clamp to 0.99; values in `[0, 0.99]` are used as
    /// given; anything else (negative, NaN) restores the configured default.
    /// Pixels are never reloaded.
    pub fn similar(&mut self, value: f64) -> &mut Self {
        self.similarity = if value > EXACT_SIMILARITY {
            EXACT_SIMILARITY
        } else if (0.0..=EXACT_SIMILARITY).contains(&value) {
            value
        } else {
            self.default_similarity
        };
        self
    }

    /// Requires an exact match, equivalent to `similar(0.99)`.
    pub fn exact(&mut self) -> &mut Self {
        self.similar(EXACT_SIMILARITY)
    }

    /// Builder form of [`Pattern::similar`].
    pub fn with_similarity(mut self, value: f64) -> Self {
        self.similar(value);
        self
    }

    /// Returns a new pattern on the same resolved file with click offset
    /// `(dx, dy)` from the match center. The receiver is left untouched and
    /// the decoded pixels are shared.
    pub fn target_offset(&self, dx: i32, dy: i32) -> FinderResult<Pattern> {
        let path = self.file_path()?.to_path_buf();
        Ok(Pattern {
            source: PatternSource::File(path),
            target_offset: Some(Location::new(dx, dy)),
            ..self.clone()
        })
    }

    /// Offset from the match center, if one was set.
    pub fn target_offset_value(&self) -> Option<Location> {
        self.target_offset
    }

    /// Click point for a match whose top-left corner is `top_left`: the
    /// match center plus the target offset.
    pub fn target_location(&self, top_left: Location) -> FinderResult<Location> {
        let (width, height) = self.size()?;
        let center = top_left.offset((width / 2) as i32, (height / 2) as i32);
        Ok(match self.target_offset {
            Some(offset) => center.offset(offset.x, offset.y),
            None => center,
        })
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.image.get() {
            Some(image) => write!(
                f,
                "({}, {}, {}, {})",
                image.name(),
                image.path().display(),
                image.scale_factor(),
                self.similarity
            ),
            None => write!(f, "({}, <unloaded>, {})", self.requested, self.similarity),
        }
    }
}
