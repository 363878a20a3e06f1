use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// 同一次執行中的輸出目標登記表
///
/// 平行處理時，「檢查是否已存在 → 寫暫存 → 更名」必須對同一個目標互斥。
/// 取得 [`Claim`] 的工作才能產生該檔案，`Claim` drop 時釋放。
/// 另外記錄本次執行已完成的目標，用來分辨「名稱衝突」與「先前執行留下的檔案」。
#[derive(Debug, Default)]
pub struct ClaimRegistry {
    claimed: Mutex<HashSet<PathBuf>>,
    produced: Mutex<HashSet<PathBuf>>,
}

impl ClaimRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 目標已被其他工作持有時回傳 `None`
    pub fn claim(&self, target: &Path) -> Option<Claim<'_>> {
        let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);
        claimed.insert(target.to_path_buf()).then(|| Claim {
            registry: self,
            target: target.to_path_buf(),
        })
    }

    fn is_produced(&self, target: &Path) -> bool {
        self.produced
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(target)
    }

    fn mark_produced(&self, target: &Path) {
        self.produced
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(target.to_path_buf());
    }

    fn release(&self, target: &Path) {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(target);
    }
}

#[derive(Debug)]
pub struct Claim<'a> {
    registry: &'a ClaimRegistry,
    target: PathBuf,
}

impl Claim<'_> {
    /// 本次執行中是否已有其他工作單位產生過同一個目標
    #[must_use]
    pub fn produced_this_run(&self) -> bool {
        self.registry.is_produced(&self.target)
    }

    pub fn mark_produced(&self) {
        self.registry.mark_produced(&self.target);
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.registry.release(&self.target);
    }
}
