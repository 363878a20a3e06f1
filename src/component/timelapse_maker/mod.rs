//! 縮時影片元件
//!
//! 依倍速壓縮時間戳並丟棄音訊，輸出檔名帶有 `_{倍速}x` 標記

mod main;

pub use main::{TimelapseMaker, build_args, output_file_name, speed_marker};
