//! 執行結果統計與結束狀態

use super::processor::UnitOutcome;
use console::style;
use rust_i18n::t;
use std::path::PathBuf;
use std::time::Duration;

/// 整體執行結果；啟動失敗不在此列，由 `main` 直接以錯誤結束
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    AllSucceeded,
    PartialFailure,
}

impl RunOutcome {
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::AllSucceeded => 0,
            Self::PartialFailure => 2,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub found: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub missing_roots: Vec<PathBuf>,
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &UnitOutcome) {
        match outcome {
            UnitOutcome::Completed => self.completed += 1,
            UnitOutcome::Skipped(_) => self.skipped += 1,
            UnitOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// 找不到輸入根目錄只算警告，不影響結束狀態
    #[must_use]
    pub const fn outcome(&self) -> RunOutcome {
        if self.failed > 0 {
            RunOutcome::PartialFailure
        } else {
            RunOutcome::AllSucceeded
        }
    }

    pub fn display(&self) {
        println!();
        println!("{}", style(t!("summary.title")).cyan().bold());
        println!("  {}", t!("summary.found", count = self.found));
        println!(
            "  {}",
            style(t!("summary.completed", count = self.completed)).green()
        );
        if self.skipped > 0 {
            println!(
                "  {}",
                style(t!("summary.skipped", count = self.skipped)).yellow()
            );
        }
        if self.failed > 0 {
            println!("  {}", style(t!("summary.failed", count = self.failed)).red());
        }
        for root in &self.missing_roots {
            println!(
                "  {}",
                style(t!("summary.missing_root", path = root.display())).yellow()
            );
        }
        if self.interrupted {
            println!("  {}", style(t!("summary.interrupted")).yellow().bold());
        }
        println!(
            "  {}",
            style(t!(
                "summary.elapsed",
                time = format_elapsed(self.elapsed)
            ))
            .dim()
        );
    }
}

/// 格式化為 `HH:MM:SS`
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_seconds = elapsed.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}
