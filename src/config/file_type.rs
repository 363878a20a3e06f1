use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// 編譯時嵌入的檔案類型表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTypeTable {
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
    #[serde(rename = "SUBTITLE_FILE")]
    pub subtitle_file: Vec<String>,
}

impl FileTypeTable {
    #[must_use]
    pub fn video_extensions(&self) -> ExtensionSet {
        ExtensionSet::new(&self.video_file)
    }

    /// 字幕副檔名，依偵測優先順序排列
    #[must_use]
    pub fn subtitle_extensions(&self) -> Vec<String> {
        self.subtitle_file
            .iter()
            .map(|ext| normalize_extension(ext))
            .collect()
    }
}

/// 不分大小寫的副檔名集合，元素一律為 `.ext` 形式
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionSet {
    extensions: HashSet<String>,
}

impl ExtensionSet {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        }
    }

    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(&format!(".{}", ext.to_lowercase())))
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_set_is_case_insensitive() {
        let set = ExtensionSet::new([".mp4", "MKV"]);
        assert!(set.matches(Path::new("/videos/a.MP4")));
        assert!(set.matches(Path::new("/videos/b.mkv")));
        assert!(!set.matches(Path::new("/videos/c.txt")));
        assert!(!set.matches(Path::new("/videos/no_extension")));
    }

    #[test]
    fn test_subtitle_extensions_keep_order() {
        let table = FileTypeTable {
            video_file: vec![],
            subtitle_file: vec![".srt".into(), "ASS".into(), ".vtt".into()],
        };
        assert_eq!(table.subtitle_extensions(), vec![".srt", ".ass", ".vtt"]);
    }
}
