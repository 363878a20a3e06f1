//! 功能元件模組
//!
//! 每個子模組實現一種任務的處理器，由 `dispatcher` 依設定選擇

pub mod audio_extractor;
pub mod chapter_injector;
pub mod dispatcher;
pub mod processor;
pub mod subtitle_embedder;
pub mod summary;
pub mod timelapse_maker;
pub mod video_converter;
pub mod video_merger;

pub use dispatcher::{Dispatcher, processor_for};
pub use processor::{ProcessContext, StagedProcessor, UnitOutcome};
pub use summary::{RunOutcome, RunSummary};
