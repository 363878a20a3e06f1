//! 字幕嵌入元件
mod main;

pub use main::{SubtitleEmbedder, embed_args, output_file_name};
