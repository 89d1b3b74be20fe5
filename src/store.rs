//! Template store loaded once from a directory of image files.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::io::load_gray_image;
use crate::template::Template;
use crate::trace::{trace_event, trace_warn};
use crate::util::{ScreenMatchError, ScreenMatchResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Default directory name, resolved next to the executable.
pub const DEFAULT_TEMPLATE_DIR: &str = "images";

/// Default cap on template files.
pub const DEFAULT_MAX_TEMPLATES: usize = 21;

/// Extensions accepted by the store (case-sensitive).
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "webp", "png"];

/// What the `max_count` cap limits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadLimit {
    /// Count every supported file that was attempted, even if decoding fails.
    #[default]
    Attempts,
    /// Count only successfully decoded templates.
    Successes,
}

/// Outcome of a directory load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Supported files that were attempted.
    pub attempted: usize,
    /// Templates that decoded successfully.
    pub loaded: usize,
    /// Files that failed to decode.
    pub failed: Vec<PathBuf>,
}

/// Read-only set of grayscale templates.
#[derive(Clone, Debug, Default)]
pub struct TemplateStore {
    templates: Vec<Template>,
    report: LoadReport,
}

impl TemplateStore {
    /// Loads up to `max_count` templates from `dir`, capping attempts.
    ///
    /// A missing or unreadable directory yields an empty store and a warning.
    pub fn load<P: AsRef<Path>>(dir: P, max_count: usize) -> Self {
        Self::load_with_limit(dir, max_count, LoadLimit::Attempts)
    }

    /// Loads templates from `dir` with an explicit cap policy.
    ///
    /// Entries are visited in file-name order. Only regular files with a
    /// supported extension are attempted; other entries never count against
    /// `max_count`. Files that fail to decode are skipped with a warning.
    pub fn load_with_limit<P: AsRef<Path>>(dir: P, max_count: usize, limit: LoadLimit) -> Self {
        let dir = dir.as_ref();
        let mut paths = match candidate_files(dir) {
            Ok(paths) => paths,
            Err(err) => {
                trace_warn!("template directory {} unavailable: {}", dir.display(), err);
                return Self::default();
            }
        };
        paths.sort();

        let mut templates = Vec::new();
        let mut report = LoadReport::default();
        for path in paths {
            let counted = match limit {
                LoadLimit::Attempts => report.attempted,
                LoadLimit::Successes => report.loaded,
            };
            if counted >= max_count {
                break;
            }
            report.attempted += 1;
            match load_gray_image(&path) {
                Ok(img) => {
                    templates.push(Template::from_image(img, path.display().to_string()));
                    report.loaded += 1;
                }
                Err(err) => {
                    trace_warn!("could not read template image {}: {}", path.display(), err);
                    report.failed.push(path);
                }
            }
        }

        trace_event!(
            "templates_loaded",
            attempted = report.attempted,
            loaded = report.loaded
        );
        Self { templates, report }
    }

    /// Builds a store from already decoded templates.
    pub fn from_templates(templates: Vec<Template>) -> Self {
        let loaded = templates.len();
        Self {
            templates,
            report: LoadReport {
                attempted: loaded,
                loaded,
                failed: Vec::new(),
            },
        }
    }

    /// Returns the loaded templates in load order.
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Returns the number of loaded templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if no template was loaded.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Returns what happened during loading.
    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}

/// Returns true if `path` has one of the supported extensions.
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}

fn candidate_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)?.map(|entry| entry.map(|entry| entry.path()));
    Ok(supported_files(entries))
}

/// Keeps supported regular files; entries that cannot be read are skipped.
fn supported_files(entries: impl Iterator<Item = std::io::Result<PathBuf>>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() && has_supported_extension(&path) => paths.push(path),
            Ok(_) => {}
            Err(err) => trace_warn!("skipping unreadable directory entry: {}", err),
        }
    }
    paths
}

/// Resolves `dir_name` relative to the directory holding the running executable.
///
/// This is the only fatal startup condition: without an executable location
/// there is nowhere to look for templates.
pub fn resolve_template_dir(dir_name: impl AsRef<Path>) -> ScreenMatchResult<PathBuf> {
    let exe = std::env::current_exe().map_err(|err| ScreenMatchError::NoBasePath {
        reason: err.to_string(),
    })?;
    let base = exe.parent().ok_or_else(|| ScreenMatchError::NoBasePath {
        reason: format!("{} has no parent directory", exe.display()),
    })?;
    Ok(base.join(dir_name))
}
