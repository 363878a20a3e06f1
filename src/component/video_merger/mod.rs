//! 影片合併元件
mod main;

pub use main::{VideoMerger, concat_args};
