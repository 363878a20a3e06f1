//! 依任務種類選擇處理器，掃描輸入樹並逐一處理工作單位

use super::audio_extractor::AudioExtractor;
use super::chapter_injector::ChapterInjector;
use super::processor::{ProcessContext, StagedProcessor, UnitOutcome};
use super::subtitle_embedder::SubtitleEmbedder;
use super::summary::RunSummary;
use super::timelapse_maker::TimelapseMaker;
use super::video_converter::VideoConverter;
use super::video_merger::VideoMerger;
use crate::config::{Config, TaskKind};
use crate::tools::{ClaimRegistry, MediaTool, TreeWalker, WorkUnit, ensure_directory_exists};
use anyhow::{Context, Result, bail};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rayon::prelude::*;
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// 章節任務不走樹狀掃描，回傳 `None`
#[must_use]
pub fn processor_for(config: &Config) -> Option<Box<dyn StagedProcessor>> {
    let processor: Box<dyn StagedProcessor> = match config.task {
        TaskKind::Audio => Box::new(AudioExtractor::new(config)),
        TaskKind::Convert => Box::new(VideoConverter::new(config)),
        TaskKind::Timelapse => Box::new(TimelapseMaker::new(config)),
        TaskKind::Merge => Box::new(VideoMerger::new(config)),
        TaskKind::Subtitle => Box::new(SubtitleEmbedder::new(config)),
        TaskKind::Chapter => return None,
    };
    Some(processor)
}

pub struct Dispatcher<'a> {
    config: &'a Config,
    tool: &'a dyn MediaTool,
    shutdown_signal: Arc<AtomicBool>,
}

impl<'a> Dispatcher<'a> {
    #[must_use]
    pub fn new(config: &'a Config, tool: &'a dyn MediaTool, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            tool,
            shutdown_signal,
        }
    }

    /// 執行整個任務；只有啟動階段的錯誤會以 `Err` 回傳
    pub fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        let claims = ClaimRegistry::new();
        let ctx = ProcessContext::new(self.tool, &claims, Arc::clone(&self.shutdown_signal));

        info!("開始任務: {}", self.config.task);
        let mut summary = match processor_for(self.config) {
            Some(processor) => self.run_walk(processor.as_ref(), &ctx)?,
            None => self.run_chapters(&ctx)?,
        };

        summary.interrupted = self.shutdown_signal.load(Ordering::SeqCst);
        summary.elapsed = started.elapsed();
        info!(
            "任務結束: 找到 {}, 完成 {}, 略過 {}, 失敗 {}",
            summary.found, summary.completed, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    fn run_walk(
        &self,
        processor: &dyn StagedProcessor,
        ctx: &ProcessContext<'_>,
    ) -> Result<RunSummary> {
        println!("{}", style(t!("dispatch.scanning")).dim());
        let walker = match self.config.output_dir() {
            Some(output_root) => {
                // 先建立輸出根目錄，掃描時才能以實際路徑排除它
                ensure_directory_exists(output_root)?;
                TreeWalker::new(processor.qualifier(), processor.granularity(), output_root)
            }
            None if self.config.task.requires_output_dir() => {
                bail!("任務 {} 需要 output_dir", self.config.task)
            }
            None => TreeWalker::in_place(processor.qualifier(), processor.granularity()),
        };
        let report = walker.discover(&self.config.params.input_dirs);

        let mut summary = RunSummary {
            found: report.units.len(),
            missing_roots: report.missing_roots,
            ..RunSummary::default()
        };

        if report.units.is_empty() {
            println!("{}", style(t!("dispatch.nothing_found")).yellow());
            return Ok(summary);
        }

        println!(
            "{}",
            style(t!(
                "dispatch.found_units",
                count = report.units.len(),
                task = processor.name()
            ))
            .green()
        );

        let progress_bar = progress_bar(report.units.len())?;
        let outcomes = self.process_units(&report.units, |unit| {
            let outcome = processor.process(unit, ctx);
            progress_bar.set_message(unit.name_or("").to_string());
            progress_bar.inc(1);
            outcome
        })?;
        finish(&progress_bar, self.is_shutting_down());

        for outcome in &outcomes {
            summary.record(outcome);
        }
        Ok(summary)
    }

    /// `jobs` 為 1 時依序處理；否則交給固定大小的執行緒池
    ///
    /// 收到中斷信號後不再開始新的工作單位，已開始的會跑完。
    fn process_units<F>(&self, units: &[WorkUnit], process: F) -> Result<Vec<UnitOutcome>>
    where
        F: Fn(&WorkUnit) -> UnitOutcome + Sync,
    {
        let jobs = self.config.params.jobs.max(1);

        if jobs == 1 {
            let mut outcomes = Vec::with_capacity(units.len());
            for unit in units {
                if self.is_shutting_down() {
                    warn!("收到中斷信號，停止處理剩餘工作");
                    break;
                }
                outcomes.push(process(unit));
            }
            return Ok(outcomes);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("無法建立執行緒池")?;
        info!("平行處理: {jobs} 個工作");

        let outcomes = pool.install(|| {
            units
                .par_iter()
                .filter_map(|unit| {
                    if self.is_shutting_down() {
                        return None;
                    }
                    Some(process(unit))
                })
                .collect()
        });
        Ok(outcomes)
    }

    fn run_chapters(&self, ctx: &ProcessContext<'_>) -> Result<RunSummary> {
        let tasks = &self.config.params.tasks;
        let mut summary = RunSummary {
            found: tasks.len(),
            ..RunSummary::default()
        };

        if tasks.is_empty() {
            println!("{}", style(t!("dispatch.nothing_found")).yellow());
            return Ok(summary);
        }

        let output_dir = self.config.output_dir().map(|dir| dir.as_path());
        if let Some(dir) = output_dir {
            ensure_directory_exists(dir)?;
        }

        let progress_bar = progress_bar(tasks.len())?;
        for task in tasks {
            if self.is_shutting_down() {
                warn!("收到中斷信號，停止處理剩餘工作");
                break;
            }
            let outcome = ChapterInjector::inject(ctx, task, output_dir);
            summary.record(&outcome);
            progress_bar.inc(1);
        }
        finish(&progress_bar, self.is_shutting_down());

        Ok(summary)
    }

    fn is_shutting_down(&self) -> bool {
        self.shutdown_signal.load(Ordering::SeqCst)
    }
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let progress_bar = ProgressBar::new(len as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            )
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );
    Ok(progress_bar)
}

fn finish(progress_bar: &ProgressBar, interrupted: bool) {
    if interrupted {
        progress_bar.abandon_with_message(t!("dispatch.interrupted").to_string());
    } else {
        progress_bar.finish_with_message(t!("dispatch.done").to_string());
    }
}
