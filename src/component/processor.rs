//! 所有任務共用的分段處理流程
//!
//! 1. 已存在正式檔 → 略過，不呼叫工具
//! 2. 寫入暫存檔
//! 3. 呼叫工具
//! 4. 成功則更名為正式檔，失敗則清除暫存與半成品
//!
//! 副作用（刪除來源、刪除字幕）由各任務在第 4 步確認成功後自行處理。

use crate::tools::{ClaimRegistry, Granularity, MediaTool, Qualifier, StagedOutput, WorkUnit};
use anyhow::Result;
use log::{error, info, warn};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    Completed,
    Skipped(String),
    Failed(String),
}

impl UnitOutcome {
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// 合併同一個工作單位內多個產物的結果：任一失敗即失敗，其次任一完成即完成
    #[must_use]
    pub fn combine(outcomes: impl IntoIterator<Item = Self>) -> Self {
        let mut combined: Option<Self> = None;

        for outcome in outcomes {
            combined = Some(match (combined, outcome) {
                (None, next) => next,
                (Some(failed @ Self::Failed(_)), _) => failed,
                (_, failed @ Self::Failed(_)) => failed,
                (Some(Self::Completed), _) | (_, Self::Completed) => Self::Completed,
                (Some(skipped), Self::Skipped(_)) => skipped,
            });
        }

        combined.unwrap_or_else(|| Self::Skipped("沒有可處理的檔案".to_string()))
    }
}

impl fmt::Display for UnitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "完成"),
            Self::Skipped(reason) => write!(f, "略過: {reason}"),
            Self::Failed(reason) => write!(f, "失敗: {reason}"),
        }
    }
}

/// 處理單一工作單位時可用的共享資源
pub struct ProcessContext<'a> {
    pub tool: &'a dyn MediaTool,
    pub claims: &'a ClaimRegistry,
    pub shutdown_signal: Arc<AtomicBool>,
}

impl<'a> ProcessContext<'a> {
    #[must_use]
    pub fn new(
        tool: &'a dyn MediaTool,
        claims: &'a ClaimRegistry,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            tool,
            claims,
            shutdown_signal,
        }
    }

    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown_signal.load(Ordering::SeqCst)
    }

    /// 以暫存檔 + 原子更名產生 `final_path`
    ///
    /// `stage` 收到暫存路徑，負責呼叫工具並回報成功與否；
    /// 其中建立的暫存文件應在閉包結束前釋放。
    pub fn produce<F>(&self, final_path: &Path, stage: F) -> UnitOutcome
    where
        F: FnOnce(&Path) -> Result<bool>,
    {
        self.run_staged(final_path, false, stage)
    }

    /// 就地取代既有檔案：不做「已存在」檢查，失敗時保留原檔只清除暫存檔
    pub fn replace_in_place<F>(&self, target: &Path, stage: F) -> UnitOutcome
    where
        F: FnOnce(&Path) -> Result<bool>,
    {
        self.run_staged(target, true, stage)
    }

    fn run_staged<F>(&self, final_path: &Path, in_place: bool, stage: F) -> UnitOutcome
    where
        F: FnOnce(&Path) -> Result<bool>,
    {
        let Some(claim) = self.claims.claim(final_path) else {
            warn!("輸出檔名衝突，另一個工作正在產生: {}", final_path.display());
            return UnitOutcome::Skipped(format!("其他工作正在產生: {}", final_path.display()));
        };

        if !in_place && final_path.exists() {
            if claim.produced_this_run() {
                warn!("輸出檔名衝突，本次執行已產生過: {}", final_path.display());
                return UnitOutcome::Skipped(format!("輸出檔名衝突: {}", final_path.display()));
            }
            info!("已存在，略過: {}", final_path.display());
            return UnitOutcome::Skipped(format!("已存在: {}", final_path.display()));
        }

        if self.is_shutting_down() {
            return UnitOutcome::Skipped("收到中斷信號".to_string());
        }

        let staged = match StagedOutput::prepare(final_path) {
            Ok(staged) => staged,
            Err(e) => return UnitOutcome::Failed(format!("{e:#}")),
        };

        let reason = match stage(staged.staging_path()) {
            Ok(true) => match staged.commit() {
                Ok(path) => {
                    claim.mark_produced();
                    info!("完成: {}", path.display());
                    return UnitOutcome::Completed;
                }
                Err(e) => format!("{e:#}"),
            },
            Ok(false) => {
                if !in_place {
                    staged.abandon();
                }
                format!("工具執行失敗: {}", final_path.display())
            }
            Err(e) => {
                if !in_place {
                    staged.abandon();
                }
                format!("{e:#}")
            }
        };

        error!("處理失敗 {}: {reason}", final_path.display());
        UnitOutcome::Failed(reason)
    }
}

/// 由樹狀掃描驅動的任務處理器
pub trait StagedProcessor: Send + Sync {
    fn name(&self) -> &'static str;

    fn granularity(&self) -> Granularity;

    /// 決定哪些檔案（以及哪些資料夾）算是工作
    fn qualifier(&self) -> &Qualifier;

    fn process(&self, unit: &WorkUnit, ctx: &ProcessContext<'_>) -> UnitOutcome;
}
