//! Annotated screenshots for diagnosing match attempts.

use crate::geometry::Location;
use crate::screen::ScreenshotImage;
use crate::settings::Settings;
use crate::util::{FinderError, FinderResult};
use ::image::{ImageFormat, Rgb};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::fs::OpenOptions;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

const MARKER: Rgb<u8> = Rgb([255, 0, 0]);
/// Names tried before giving up on a crowded directory.
const MAX_NAME_ATTEMPTS: usize = 64;

/// Writes `<pattern>_<unix-millis>_<seq>.png` files with a red box per match.
///
/// Clones share the sequence counter, and existing files are never
/// overwritten.
#[derive(Clone, Debug)]
pub struct DebugRecorder {
    dir: PathBuf,
    sequence: Arc<AtomicU64>,
}

impl DebugRecorder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A recorder when debug images are switched on.
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        settings
            .debug_image
            .then(|| Self::new(settings.debug_image_path.clone()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Saves the annotated screenshot. Failures are logged and swallowed.
    pub fn record(
        &self,
        pattern_name: &str,
        shot: &ScreenshotImage,
        pattern_size: (u32, u32),
        matches: &[Location],
    ) -> Option<PathBuf> {
        match self.write(pattern_name, shot, pattern_size, matches) {
            Ok(path) => {
                debug!(path = %path.display(), "wrote debug image");
                Some(path)
            }
            Err(err) => {
                warn!(error = %err, "failed to write debug image");
                None
            }
        }
    }

    fn write(
        &self,
        pattern_name: &str,
        shot: &ScreenshotImage,
        pattern_size: (u32, u32),
        matches: &[Location],
    ) -> FinderResult<PathBuf> {
        let io_error = |path: &Path, err: &dyn std::fmt::Display| FinderError::ImageIo {
            path: path.to_path_buf(),
            reason: err.to_string(),
        };
        std::fs::create_dir_all(&self.dir).map_err(|err| io_error(&self.dir, &err))?;

        let mut canvas = shot.rgb().clone();
        let origin = shot.region().top_left();
        let (width, height) = pattern_size;
        if width > 0 && height > 0 {
            for location in matches {
                let rect = Rect::at(location.x - origin.x, location.y - origin.y).of_size(width, height);
                draw_hollow_rect_mut(&mut canvas, rect, MARKER);
            }
        }

        for _ in 0..MAX_NAME_ATTEMPTS {
            let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
            let path = self.dir.join(file_name(pattern_name, sequence));
            let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(io_error(&path, &err)),
            };
            let mut writer = BufWriter::new(file);
            canvas
                .write_to(&mut writer, ImageFormat::Png)
                .map_err(|err| io_error(&path, &err))?;
            writer.flush().map_err(|err| io_error(&path, &err))?;
            return Ok(path);
        }
        Err(io_error(&self.dir, &"no unused debug image name"))
    }
}

fn file_name(pattern_name: &str, sequence: u64) -> String {
    let stem = pattern_name.split('.').next().unwrap_or(pattern_name);
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0);
    format!("{stem}_{millis}_{sequence}.png")
}
