//! 判斷資料夾是否為工作單位
//!
//! 只看資料夾的直接子項目（不遞迴），讀取失敗一律視為「沒有符合的檔案」。

use crate::config::ExtensionSet;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Qualifier {
    extensions: ExtensionSet,
    skip_hidden: bool,
    excluded_marker: Option<String>,
}

impl Qualifier {
    #[must_use]
    pub fn new(extensions: ExtensionSet) -> Self {
        Self {
            extensions,
            skip_hidden: false,
            excluded_marker: None,
        }
    }

    /// 略過以 `.` 開頭的隱藏檔
    #[must_use]
    pub fn skipping_hidden(mut self) -> Self {
        self.skip_hidden = true;
        self
    }

    /// 略過檔名含有指定標記的檔案（例如縮時產物的 `_20x`）
    #[must_use]
    pub fn excluding_marker(mut self, marker: impl Into<String>) -> Self {
        self.excluded_marker = Some(marker.into());
        self
    }

    /// 單一檔案是否符合條件
    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name() else {
            return false;
        };
        // 外部工具的參數是 UTF-8 字串，無法無損傳遞這類檔名
        let Some(name) = file_name.to_str() else {
            warn!("檔名不是有效的 UTF-8，略過: {}", path.display());
            return false;
        };

        if self.skip_hidden && name.starts_with('.') {
            return false;
        }

        if self
            .excluded_marker
            .as_deref()
            .is_some_and(|marker| name.contains(marker))
        {
            return false;
        }

        path.is_file() && self.extensions.matches(path)
    }

    pub fn has_qualifying_file(&self, dir: &Path) -> bool {
        match fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(Result::ok)
                .any(|entry| self.accepts(&entry.path())),
            Err(e) => {
                debug!("無法讀取資料夾 {}: {e}", dir.display());
                false
            }
        }
    }

    /// 資料夾內所有符合條件的檔案，依檔名排序
    pub fn qualifying_files(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = match fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| self.accepts(path))
                .collect(),
            Err(e) => {
                debug!("無法讀取資料夾 {}: {e}", dir.display());
                Vec::new()
            }
        };

        files.sort();
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn video_qualifier() -> Qualifier {
        Qualifier::new(ExtensionSet::new([".mp4", ".rmvb"]))
    }

    #[test]
    fn test_detects_matching_file() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("test.RMVB")).unwrap();
        File::create(temp_dir.path().join("ignore.txt")).unwrap();

        assert!(video_qualifier().has_qualifying_file(temp_dir.path()));
    }

    #[test]
    fn test_ignores_nested_files_and_directories() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("folder.mp4")).unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        File::create(temp_dir.path().join("sub").join("deep.mp4")).unwrap();

        assert!(!video_qualifier().has_qualifying_file(temp_dir.path()));
    }

    #[test]
    fn test_missing_directory_is_not_qualifying() {
        assert!(!video_qualifier().has_qualifying_file(Path::new("/nonexistent/dir")));
        assert!(video_qualifier().qualifying_files(Path::new("/nonexistent/dir")).is_empty());
    }

    #[test]
    fn test_marker_and_hidden_exclusion() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("clip_20x.mp4")).unwrap();
        File::create(temp_dir.path().join(".hidden.mp4")).unwrap();

        let timelapse = video_qualifier().excluding_marker("_20x");
        assert!(timelapse.has_qualifying_file(temp_dir.path()));
        assert_eq!(
            timelapse.qualifying_files(temp_dir.path()),
            vec![temp_dir.path().join(".hidden.mp4")]
        );

        let merge = video_qualifier().skipping_hidden();
        assert_eq!(
            merge.qualifying_files(temp_dir.path()),
            vec![temp_dir.path().join("clip_20x.mp4")]
        );

        let both = video_qualifier().skipping_hidden().excluding_marker("_20x");
        assert!(!both.has_qualifying_file(temp_dir.path()));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_file_name_is_excluded() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let invalid = temp_dir.path().join(OsStr::from_bytes(b"caf\xe9.mp4"));
        File::create(&invalid).unwrap();
        File::create(temp_dir.path().join("ok.mp4")).unwrap();

        assert!(!video_qualifier().accepts(&invalid));
        assert_eq!(
            video_qualifier().qualifying_files(temp_dir.path()),
            vec![temp_dir.path().join("ok.mp4")]
        );
    }

    #[test]
    fn test_qualifying_files_sorted_by_name() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["003.mp4", "001.mp4", "002.mp4"] {
            File::create(temp_dir.path().join(name)).unwrap();
        }

        let names: Vec<String> = video_qualifier()
            .qualifying_files(temp_dir.path())
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["001.mp4", "002.mp4", "003.mp4"]);
    }
}
