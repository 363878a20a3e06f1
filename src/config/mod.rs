pub mod file_type;
pub mod load;
pub mod types;

pub use file_type::{ExtensionSet, FileTypeTable};
pub use load::DEFAULT_PARAMS_FILE;
pub use types::{
    ChapterTask, Config, ConvertOptions, DEFAULT_SPEED_RATIO, DEFAULT_SUBTITLE_CONTAINER,
    Resolution, SubtitleOptions, TaskKind, TaskParams, TimelapseOptions,
};
