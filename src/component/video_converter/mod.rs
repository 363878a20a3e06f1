//! 影片轉檔元件
//!
//! 使用 ffmpeg 將影片縮放到指定解析度並重新編碼為 H.264 / AAC

mod ffmpeg_command;
mod main;

pub use ffmpeg_command::{
    ConvertCommand, SubtitleInput, encoder_args, output_file_name, scale_filter,
};
pub use main::VideoConverter;
