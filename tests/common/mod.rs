//! 測試用的假媒體工具：把最後一個參數當作輸出檔寫出

#![allow(dead_code)]

use anyhow::Result;
use media_batch::config::{Config, TaskKind, TaskParams};
use media_batch::tools::MediaTool;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeTool {
    calls: Mutex<Vec<Vec<String>>>,
    /// 呼叫當下讀到的 `.txt` 暫存文件內容（concat 清單、章節 metadata）
    documents: Mutex<Vec<String>>,
    fail_when: Option<String>,
    duration: f64,
}

impl FakeTool {
    pub fn new() -> Self {
        Self {
            duration: 200.0,
            ..Self::default()
        }
    }

    /// 任一參數包含 `pattern` 時寫出半成品並回報失敗
    pub fn failing_on(pattern: &str) -> Self {
        Self {
            fail_when: Some(pattern.to_string()),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn documents(&self) -> Vec<String> {
        self.documents.lock().unwrap().clone()
    }
}

impl MediaTool for FakeTool {
    fn invoke(&self, args: &[String]) -> bool {
        self.calls.lock().unwrap().push(args.to_vec());

        for arg in args.iter().filter(|a| a.ends_with(".txt")) {
            if let Ok(content) = fs::read_to_string(arg) {
                self.documents.lock().unwrap().push(content);
            }
        }

        let Some(output) = args.last() else {
            return false;
        };
        let failed = self
            .fail_when
            .as_deref()
            .is_some_and(|pattern| args.iter().any(|a| a.contains(pattern)));

        fs::write(output, if failed { "partial" } else { "media" }).is_ok() && !failed
    }

    fn probe_duration(&self, _path: &Path) -> Result<f64> {
        Ok(self.duration)
    }
}

pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"source").unwrap();
}

pub fn config(task: TaskKind, input: &Path, output: &Path) -> Config {
    Config::from_params(TaskParams {
        task: Some(task),
        input_dirs: vec![input.to_path_buf()],
        output_dir: Some(output.to_path_buf()),
        ..TaskParams::default()
    })
    .unwrap()
}

/// 遞迴列出資料夾下所有檔案（相對路徑，已排序）
pub fn list_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    files.sort();
    files
}
