//! screenmatch finds reference images on screen for UI automation.
//!
//! A [`Pattern`] names a reference image that is resolved through a
//! platform/locale directory search and decoded lazily. A [`Finder`] captures
//! a screen region through a [`ScreenSource`], correlates the pattern against
//! it with zero-mean normalized cross-correlation and reports absolute
//! [`Location`]s. The `wait_for_*` calls wrap matching in bounded polling
//! loops.
//!
//! Enable the `rayon` feature for row-parallel score maps and the `xcap`
//! feature for a live screen source.

mod candidate;
pub mod debug;
pub mod geometry;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod pattern;
pub mod screen;
pub mod search;
pub mod settings;
pub mod template;
pub mod util;

pub use debug::DebugRecorder;
pub use geometry::{Location, Rectangle};
pub use self::image::{ImageView, OwnedImage};
pub use pattern::{Pattern, PatternImage, EXACT_SIMILARITY};
pub use screen::{Display, DisplayRegistry, ScreenSource, ScreenshotImage, StaticScreen};
#[cfg(feature = "xcap")]
pub use screen::XcapScreen;
pub use search::{Finder, MatchMode, VanishOutcome};
pub use settings::Settings;
pub use util::{FinderError, FinderResult};
