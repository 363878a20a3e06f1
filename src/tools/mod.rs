mod batch_grouper;
mod claim;
mod ffprobe_info;
mod media_tool;
mod path_validator;
mod qualifier;
mod staging;
mod subtitle;
mod tree_walker;

pub use batch_grouper::group;
pub use claim::{Claim, ClaimRegistry};
pub use ffprobe_info::get_duration;
pub use media_tool::{Ffmpeg, MediaTool};
pub use path_validator::{absolutize, ensure_directory_exists, validate_directory_exists};
pub use qualifier::Qualifier;
pub use staging::{ScratchFile, StagedOutput, concat_manifest, remove_if_exists, staging_path};
pub use subtitle::{SUBTITLE_TRACK_TITLE, find_subtitle, subtitle_codec_for, subtitle_track_args};
pub use tree_walker::{Granularity, TreeWalker, WalkReport, WorkUnit, mirror_relative};
