//! 章節標記元件
//!
//! 不走樹狀掃描，直接處理設定檔 `tasks` 列出的檔案
mod main;
mod metadata_builder;

pub use main::{ChapterInjector, output_path, remux_args};
pub use metadata_builder::{ChapterEntry, build_metadata, parse_entries, parse_offset};
