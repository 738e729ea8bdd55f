//! Locating reference images on disk.

use crate::settings::Settings;
use crate::util::{FinderError, FinderResult};
use std::path::{Path, PathBuf};
use tracing::debug;

const COMMON_DIR: &str = "common";

/// Ordered directory search for a pattern file.
///
/// Candidates are tried in this order, each directory with the exact file
/// name first and the `<stem>@2x.png` variant second:
///
/// 1. `<root>/<platform>/<locale>/`
/// 2. `<root>/common/<locale>/`
/// 3. `<root>/<platform>/`
/// 4. `<root>/common/`
///
/// The locale directories are skipped when the locale is empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchPaths {
    root: PathBuf,
    platform: String,
    locale: String,
}

impl SearchPaths {
    pub fn new(root: impl Into<PathBuf>, platform: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            platform: platform.into(),
            locale: locale.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.image_root.clone(),
            settings.platform.clone(),
            settings.locale.clone(),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every path that `resolve` would check, in priority order.
    pub fn candidates(&self, image: &str) -> Vec<PathBuf> {
        let stem = image.split('.').next().unwrap_or(image);
        let names = [image.to_string(), format!("{stem}@2x.png")];

        let platform_dir = self.root.join(&self.platform);
        let common_dir = self.root.join(COMMON_DIR);
        let mut dirs = Vec::with_capacity(4);
        if !self.locale.is_empty() {
            dirs.push(platform_dir.join(&self.locale));
            dirs.push(common_dir.join(&self.locale));
        }
        dirs.push(platform_dir);
        dirs.push(common_dir);

        dirs.iter()
            .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
            .collect()
    }

    /// Returns the first existing candidate path.
    pub fn resolve(&self, image: &str) -> FinderResult<PathBuf> {
        let candidates = self.candidates(image);
        debug!(image, candidates = candidates.len(), "resolving pattern image");
        match candidates.iter().find(|path| path.is_file()) {
            Some(path) => {
                debug!(path = %path.display(), "found pattern image");
                Ok(path.clone())
            }
            None => Err(FinderError::PatternNotFound {
                name: image.to_string(),
                searched: candidates,
            }),
        }
    }
}
