//! Writes received PNG images to disk.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use cy_core::errors::ImageSinkError;
use cy_core::ports::{AppDirs, ImageSinkPort};

const FOLDER_NAME: &str = "clipy";

pub struct FileImageSink {
    dir: PathBuf,
}

impl FileImageSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<Desktop>/clipy`, or `<app data>/images` when there is no desktop.
    pub fn default_dir(app_dirs: &AppDirs) -> PathBuf {
        dirs::desktop_dir()
            .map(|desktop| desktop.join(FOLDER_NAME))
            .unwrap_or_else(|| app_dirs.app_data_root.join("images"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// e.g. `16-10-26_142305_clipboard_image.png`
fn file_name(now: DateTime<Local>) -> String {
    now.format("%d-%m-%y_%H%M%S_clipboard_image.png").to_string()
}

impl ImageSinkPort for FileImageSink {
    fn persist(&self, png: &[u8]) -> Result<PathBuf, ImageSinkError> {
        if self.dir.as_os_str().is_empty() {
            return Err(ImageSinkError::DirUnavailable);
        }
        std::fs::create_dir_all(&self.dir)?;

        let path = self.dir.join(file_name(Local::now()));
        std::fs::write(&path, png)?;
        info!(path = %path.display(), size_bytes = png.len(), "image written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_uses_day_month_year_then_time() {
        let at = Local.with_ymd_and_hms(2026, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(file_name(at), "07-03-26_090502_clipboard_image.png");
    }

    #[test]
    fn persist_creates_directory_and_writes_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("clipy");
        let sink = FileImageSink::new(&dir);

        let path = sink.persist(b"\x89PNG fake").unwrap();

        assert!(path.starts_with(&dir));
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with("_clipboard_image.png")));
        assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG fake");
    }

    #[test]
    fn persist_fails_when_directory_is_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("clipy");
        std::fs::write(&blocker, b"not a dir").unwrap();

        let err = FileImageSink::new(&blocker).persist(b"png").unwrap_err();

        assert!(matches!(err, ImageSinkError::Io(_)));
    }

    #[test]
    fn empty_dir_is_unavailable() {
        let err = FileImageSink::new("").persist(b"png").unwrap_err();
        assert!(matches!(err, ImageSinkError::DirUnavailable));
    }

    #[test]
    fn default_dir_is_named_clipy_or_under_app_data() {
        let app_dirs = AppDirs {
            app_data_root: PathBuf::from("/tmp/clipy-data"),
            app_config_root: PathBuf::from("/tmp/clipy-config"),
        };
        let dir = FileImageSink::default_dir(&app_dirs);
        assert!(dir.ends_with("clipy") || dir == PathBuf::from("/tmp/clipy-data/images"));
    }
}
