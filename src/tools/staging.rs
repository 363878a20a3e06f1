//! 暫存檔寫入與原子更名
//!
//! 工具一律寫到 `{stem}_processing{ext}`，成功後才更名為正式檔名；
//! 任何中途離開（失敗、錯誤、panic）都會在 drop 時清掉暫存檔。

use anyhow::{Context, Result, bail};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const STAGING_SUFFIX: &str = "_processing";

/// 由正式輸出路徑推導暫存路徑
#[must_use]
pub fn staging_path(final_path: &Path) -> PathBuf {
    let stem = final_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let file_name = match final_path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}{STAGING_SUFFIX}.{ext}"),
        None => format!("{stem}{STAGING_SUFFIX}"),
    };
    final_path.with_file_name(file_name)
}

pub struct StagedOutput {
    final_path: PathBuf,
    staging_path: PathBuf,
    committed: bool,
}

impl StagedOutput {
    /// 建立輸出資料夾並清除上次中斷留下的暫存檔
    pub fn prepare(final_path: &Path) -> Result<Self> {
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("無法建立輸出資料夾: {}", parent.display()))?;
        }

        let staging_path = staging_path(final_path);
        if staging_path.exists() {
            warn!("移除殘留的暫存檔: {}", staging_path.display());
            fs::remove_file(&staging_path)
                .with_context(|| format!("無法移除暫存檔: {}", staging_path.display()))?;
        }

        Ok(Self {
            final_path: final_path.to_path_buf(),
            staging_path,
            committed: false,
        })
    }

    #[must_use]
    pub fn staging_path(&self) -> &Path {
        &self.staging_path
    }

    /// 暫存檔更名為正式檔名
    pub fn commit(mut self) -> Result<PathBuf> {
        if !self.staging_path.exists() {
            bail!("工具未產生輸出檔: {}", self.staging_path.display());
        }

        fs::rename(&self.staging_path, &self.final_path).with_context(|| {
            format!(
                "無法更名 {} -> {}",
                self.staging_path.display(),
                self.final_path.display()
            )
        })?;

        self.committed = true;
        Ok(self.final_path.clone())
    }

    /// 失敗時清除暫存檔與任何已寫出的正式檔
    pub fn abandon(self) {
        remove_if_exists(&self.final_path);
        // 暫存檔由 drop 清除
    }
}

impl Drop for StagedOutput {
    fn drop(&mut self) {
        if !self.committed {
            remove_if_exists(&self.staging_path);
        }
    }
}

/// 單次處理期間使用的暫存文件（concat 清單、章節 metadata），drop 時刪除
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// 在 `dir` 下建立不會與其他工作衝突的暫存文件
    pub fn create(dir: &Path, label: &str, contents: &str) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("無法建立資料夾: {}", dir.display()))?;

        let path = dir.join(format!(".{label}_{}.txt", Uuid::new_v4().simple()));
        fs::write(&path, contents)
            .with_context(|| format!("無法寫入暫存文件: {}", path.display()))?;

        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        remove_if_exists(&self.path);
    }
}

/// ffmpeg concat demuxer 的清單內容
#[must_use]
pub fn concat_manifest(files: &[PathBuf]) -> String {
    files
        .iter()
        .map(|file| format!("file '{}'\n", escape_concat_path(file)))
        .collect()
}

/// 單引號內的 `'` 需寫成 `'\''`
fn escape_concat_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', r"'\''")
}

pub fn remove_if_exists(path: &Path) {
    if !path.exists() {
        return;
    }
    match fs::remove_file(path) {
        Ok(()) => info!("已刪除: {}", path.display()),
        Err(e) => warn!("無法刪除 {}: {e}", path.display()),
    }
}
