//! 遞迴掃描輸入根目錄，找出工作單位並計算鏡像輸出路徑

use super::path_validator::{absolutize, validate_directory_exists};
use super::qualifier::Qualifier;
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 工作單位的粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// 一個資料夾一次處理其中所有符合的檔案
    Folder,
    /// 每個符合的檔案各自是一個工作單位
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    /// 輸入的絕對路徑（資料夾或檔案）
    pub path: PathBuf,
    /// 所在資料夾相對於掃描根目錄的路徑
    pub relative_dir: PathBuf,
    /// 鏡像到輸出根目錄下的資料夾
    pub output_dir: PathBuf,
}

impl WorkUnit {
    /// 取資料夾或檔案名稱，取不到時回傳 `fallback`
    #[must_use]
    pub fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(fallback)
    }
}

#[derive(Debug, Default)]
pub struct WalkReport {
    pub units: Vec<WorkUnit>,
    pub missing_roots: Vec<PathBuf>,
}

pub struct TreeWalker<'a> {
    qualifier: &'a Qualifier,
    granularity: Granularity,
    /// `None` 表示就地處理，輸出資料夾即工作單位所在的資料夾
    output_root: Option<PathBuf>,
}

impl<'a> TreeWalker<'a> {
    #[must_use]
    pub fn new(qualifier: &'a Qualifier, granularity: Granularity, output_root: &Path) -> Self {
        let output_root = absolutize(output_root).unwrap_or_else(|_| output_root.to_path_buf());
        Self {
            qualifier,
            granularity,
            output_root: Some(output_root),
        }
    }

    #[must_use]
    pub const fn in_place(qualifier: &'a Qualifier, granularity: Granularity) -> Self {
        Self {
            qualifier,
            granularity,
            output_root: None,
        }
    }

    /// 輸出根目錄本身或其子孫一律不掃描
    #[must_use]
    pub fn is_inside_output(&self, path: &Path) -> bool {
        self.output_root
            .as_ref()
            .is_some_and(|root| path.starts_with(root))
    }

    pub fn discover(&self, roots: &[PathBuf]) -> WalkReport {
        let mut report = WalkReport::default();

        for root in roots {
            match validate_directory_exists(root).and_then(|()| absolutize(root)) {
                Ok(root_path) => self.walk_root(&root_path, &mut report.units),
                Err(e) => {
                    warn!("略過輸入資料夾: {e:#}");
                    report.missing_roots.push(root.clone());
                }
            }
        }

        report
    }

    fn walk_root(&self, root: &Path, units: &mut Vec<WorkUnit>) {
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !(entry.file_type().is_dir() && self.is_inside_output(entry.path()))
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("無法讀取目錄項目: {e}");
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            let dir = entry.path();
            let relative_dir = mirror_relative(dir, root);
            let output_dir = self
                .output_root
                .as_ref()
                .map_or_else(|| dir.to_path_buf(), |root| root.join(&relative_dir));

            match self.granularity {
                Granularity::Folder => {
                    if self.qualifier.has_qualifying_file(dir) {
                        units.push(WorkUnit {
                            path: dir.to_path_buf(),
                            relative_dir,
                            output_dir,
                        });
                    }
                }
                Granularity::File => {
                    units.extend(self.qualifier.qualifying_files(dir).into_iter().map(
                        |path| WorkUnit {
                            path,
                            relative_dir: relative_dir.clone(),
                            output_dir: output_dir.clone(),
                        },
                    ));
                }
            }
        }
    }
}

/// `dir` 相對於 `root` 的路徑；無法相對化時退回資料夾自己的名稱
#[must_use]
pub fn mirror_relative(dir: &Path, root: &Path) -> PathBuf {
    dir.strip_prefix(root).map_or_else(
        |_| dir.file_name().map(PathBuf::from).unwrap_or_default(),
        Path::to_path_buf,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtensionSet;
    use std::fs;
    use tempfile::TempDir;

    fn qualifier() -> Qualifier {
        Qualifier::new(ExtensionSet::new([".mp4"]))
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"video").unwrap();
    }

    #[test]
    fn test_mirror_relative() {
        let root = Path::new("/in");
        assert_eq!(mirror_relative(Path::new("/in/a/b"), root), PathBuf::from("a/b"));
        assert_eq!(mirror_relative(Path::new("/in"), root), PathBuf::new());
        assert_eq!(mirror_relative(Path::new("/other/c"), root), PathBuf::from("c"));
    }

    #[test]
    fn test_folder_units_are_mirrored() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in");
        let output = temp_dir.path().join("out");
        touch(&input.join("a").join("1.mp4"));
        touch(&input.join("b").join("c").join("2.mp4"));
        touch(&input.join("d").join("notes.txt"));

        let qualifier = qualifier();
        let walker = TreeWalker::new(&qualifier, Granularity::Folder, &output);
        let report = walker.discover(&[input]);

        let relatives: Vec<PathBuf> = report.units.iter().map(|u| u.relative_dir.clone()).collect();
        assert_eq!(relatives, vec![PathBuf::from("a"), PathBuf::from("b/c")]);
        assert!(report.units[1].output_dir.ends_with("out/b/c"));
        assert!(report.missing_roots.is_empty());
    }

    #[test]
    fn test_file_units_one_per_file() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in");
        touch(&input.join("a").join("1.mp4"));
        touch(&input.join("a").join("2.mp4"));
        touch(&input.join("b").join("1.mp4"));

        let qualifier = qualifier();
        let walker = TreeWalker::new(&qualifier, Granularity::File, &temp_dir.path().join("out"));
        let units = walker.discover(&[input]).units;

        assert_eq!(units.len(), 3);
        assert!(units.iter().all(|u| u.path.is_file()));
        assert_eq!(units[2].relative_dir, PathBuf::from("b"));
    }

    #[test]
    fn test_nested_output_root_is_never_walked() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in");
        let output = input.join("out");
        touch(&input.join("1.mp4"));
        touch(&output.join("1.mp4"));
        touch(&output.join("deeper").join("2.mp4"));

        let qualifier = qualifier();
        for granularity in [Granularity::Folder, Granularity::File] {
            let walker = TreeWalker::new(&qualifier, granularity, &output);
            let units = walker.discover(&[input.clone()]).units;
            assert_eq!(units.len(), 1);
            assert!(units.iter().all(|u| !walker.is_inside_output(&u.path)));
        }
    }

    #[test]
    fn test_output_root_equal_to_input_yields_nothing() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("1.mp4"));

        let qualifier = qualifier();
        let walker = TreeWalker::new(&qualifier, Granularity::Folder, temp_dir.path());
        assert!(walker.discover(&[temp_dir.path().to_path_buf()]).units.is_empty());
    }

    #[test]
    fn test_in_place_units_write_next_to_source() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in");
        touch(&input.join("a").join("1.mp4"));

        let qualifier = qualifier();
        let walker = TreeWalker::in_place(&qualifier, Granularity::File);
        let units = walker.discover(&[input]).units;

        assert_eq!(units.len(), 1);
        assert_eq!(Some(units[0].output_dir.as_path()), units[0].path.parent());
        assert!(!walker.is_inside_output(&units[0].path));
    }

    #[test]
    fn test_missing_root_is_reported_and_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in");
        touch(&input.join("1.mp4"));
        let missing = temp_dir.path().join("missing");

        let qualifier = qualifier();
        let walker = TreeWalker::new(&qualifier, Granularity::Folder, &temp_dir.path().join("out"));
        let report = walker.discover(&[missing.clone(), input]);

        assert_eq!(report.missing_roots, vec![missing]);
        assert_eq!(report.units.len(), 1);
        assert_eq!(report.units[0].relative_dir, PathBuf::new());
    }
}
