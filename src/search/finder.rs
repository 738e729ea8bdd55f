use crate::debug::DebugRecorder;
use crate::geometry::{Location, Rectangle};
use crate::pattern::Pattern;
use crate::screen::{DisplayRegistry, ScreenSource, ScreenshotImage};
use crate::search::matcher::{is_pattern_size_correct, locate};
use crate::search::poll::{wait_until_found, wait_until_vanished, VanishOutcome};
use crate::search::MatchMode;
use crate::settings::Settings;
use crate::util::{FinderError, FinderResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Entry point tying patterns, screen capture and polling together.
///
/// Regions default to the bounds of display 0. All calls block the caller.
pub struct Finder {
    settings: Settings,
    displays: DisplayRegistry,
    recorder: Option<DebugRecorder>,
}

impl Finder {
    pub fn new(settings: Settings, source: Arc<dyn ScreenSource>) -> Self {
        let recorder = DebugRecorder::from_settings(&settings);
        Self {
            settings,
            displays: DisplayRegistry::new(source),
            recorder,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn displays(&self) -> &DisplayRegistry {
        &self.displays
    }

    /// Declares a pattern resolved with this finder's settings.
    pub fn pattern(&self, image: impl Into<String>) -> Pattern {
        Pattern::new(image, &self.settings)
    }

    /// Fresh bounds of display 0.
    pub fn default_region(&self) -> FinderResult<Rectangle> {
        self.displays.refresh()?;
        self.displays.bounds(0)
    }

    /// One-shot match that surfaces capture failures to the caller.
    pub fn find(
        &self,
        pattern: &Pattern,
        region: Option<Rectangle>,
        mode: MatchMode,
    ) -> FinderResult<Vec<Location>> {
        let image = pattern.load()?;
        let (region, display) = match region {
            Some(region) => (region, None),
            None => (self.default_region()?, Some(0)),
        };
        if !is_pattern_size_correct(image.size(), &region) {
            return Ok(Vec::new());
        }

        let shot = ScreenshotImage::capture(&self.displays, region, display)?;
        let found = match locate(image, pattern.similarity(), &shot, mode) {
            Ok(found) => found,
            Err(FinderError::DegenerateTemplate { reason }) => {
                warn!(pattern = image.name(), reason, "pattern cannot be correlated");
                Vec::new()
            }
            Err(err) => return Err(err),
        };
        if let Some(recorder) = &self.recorder {
            recorder.record(image.name(), &shot, image.size(), &found);
        }
        Ok(found)
    }

    /// Like [`Finder::find`], but a failed capture yields no matches.
    pub fn match_template(
        &self,
        pattern: &Pattern,
        region: Option<Rectangle>,
        mode: MatchMode,
    ) -> FinderResult<Vec<Location>> {
        match self.find(pattern, region, mode) {
            Err(err) if err.is_screenshot() => {
                warn!(error = %err, "screenshot failed, treating as no match");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// [`Finder::match_template`] with the mode given by name. Unknown names
    /// log a warning and yield no matches.
    pub fn match_template_named(
        &self,
        pattern: &Pattern,
        region: Option<Rectangle>,
        mode: &str,
    ) -> FinderResult<Vec<Location>> {
        match mode.parse::<MatchMode>() {
            Ok(mode) => self.match_template(pattern, region, mode),
            Err(err) => {
                warn!(error = %err, "unsupported match mode");
                Ok(Vec::new())
            }
        }
    }

    /// Polls until `pattern` appears once. `Ok(None)` means the timeout
    /// (default: the configured auto-wait timeout) elapsed first.
    pub fn wait_for_appearance(
        &self,
        pattern: &Pattern,
        timeout: Option<Duration>,
        region: Option<Rectangle>,
    ) -> FinderResult<Option<Location>> {
        pattern.load()?;
        let timeout = timeout.unwrap_or_else(|| self.settings.auto_wait_duration());
        wait_until_found(timeout, self.settings.scan_interval(), || {
            self.match_template(pattern, region, MatchMode::Single)
        })
    }

    /// Polls until `pattern` is no longer visible.
    pub fn wait_for_vanish(
        &self,
        pattern: &Pattern,
        timeout: Option<Duration>,
        region: Option<Rectangle>,
    ) -> FinderResult<VanishOutcome> {
        let size = pattern.size()?;
        let bounds = match region {
            Some(region) => region,
            None => self.default_region()?,
        };
        if !is_pattern_size_correct(size, &bounds) {
            return Ok(VanishOutcome::NotApplicable);
        }
        let timeout = timeout.unwrap_or_else(|| self.settings.auto_wait_duration());
        wait_until_vanished(timeout, self.settings.scan_interval(), || {
            self.match_template(pattern, region, MatchMode::Single)
        })
    }
}

impl std::fmt::Debug for Finder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Finder")
            .field("settings", &self.settings)
            .field("displays", &self.displays)
            .field("recorder", &self.recorder)
            .finish()
    }
}
