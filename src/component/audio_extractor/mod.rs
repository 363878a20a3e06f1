//! 音訊抽取元件
//!
//! 將資料夾內每支影片的音軌抽成 WAV，再依批次大小合併為 MP3

mod main;

pub use main::{AudioExtractor, extract_args, merge_args};
