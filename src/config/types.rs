use super::file_type::FileTypeTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_SPEED_RATIO: u32 = 20;
pub const DEFAULT_JOBS: usize = 1;
pub const DEFAULT_SUBTITLE_CONTAINER: &str = "mp4";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Audio,
    Convert,
    Timelapse,
    Chapter,
    Merge,
    Subtitle,
}

impl TaskKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Convert => "convert",
            Self::Timelapse => "timelapse",
            Self::Chapter => "chapter",
            Self::Merge => "merge",
            Self::Subtitle => "subtitle",
        }
    }

    /// 章節與字幕任務可省略 `output_dir`，改寫在來源旁或就地取代
    #[must_use]
    pub const fn requires_output_dir(&self) -> bool {
        !matches!(self, Self::Chapter | Self::Subtitle)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 轉檔目標解析度，限制畫面較長的一邊
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "720p")]
    P720,
    #[default]
    #[serde(rename = "1080p")]
    P1080,
}

impl Resolution {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::P720 => "720p",
            Self::P1080 => "1080p",
        }
    }

    #[must_use]
    pub const fn max_dimension(&self) -> u32 {
        match self {
            Self::P720 => 1280,
            Self::P1080 => 1920,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 章節任務：一個來源檔案與其 (起始時間, 標題) 列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterTask {
    pub file: PathBuf,
    pub chapters: Vec<(String, String)>,
}

/// `params.json` 的原始內容，所有欄位皆可省略
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskParams {
    pub task: Option<TaskKind>,
    pub input_dirs: Vec<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub batch_size: usize,
    pub use_gpu: Option<bool>,
    pub resolution: Resolution,
    pub delete_source: bool,
    pub use_suffix: bool,
    pub compatibility_mode: bool,
    pub embed_subtitles: bool,
    pub remove_subtitle: Option<bool>,
    pub test_mode: bool,
    pub speed_ratio: u32,
    pub container: Option<String>,
    pub tasks: Vec<ChapterTask>,
    pub jobs: usize,
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
}

impl Default for TaskParams {
    fn default() -> Self {
        Self {
            task: None,
            input_dirs: Vec::new(),
            output_dir: None,
            batch_size: 0,
            use_gpu: None,
            resolution: Resolution::default(),
            delete_source: false,
            use_suffix: false,
            compatibility_mode: false,
            embed_subtitles: false,
            remove_subtitle: None,
            test_mode: false,
            speed_ratio: DEFAULT_SPEED_RATIO,
            container: None,
            tasks: Vec::new(),
            jobs: DEFAULT_JOBS,
            ffmpeg: None,
            ffprobe: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    pub use_gpu: bool,
    pub resolution: Resolution,
    pub delete_source: bool,
    pub use_suffix: bool,
    pub compatibility_mode: bool,
    pub embed_subtitles: bool,
    pub remove_subtitle: bool,
    pub test_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelapseOptions {
    pub speed_ratio: u32,
    pub use_gpu: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleOptions {
    /// 輸出到 `output_dir` 時使用的容器副檔名
    pub container: String,
    /// 沒有 `output_dir` 時直接取代來源檔
    pub in_place: bool,
    pub remove_subtitle: bool,
}

/// 驗證後的執行設定
#[derive(Debug, Clone)]
pub struct Config {
    pub file_type_table: FileTypeTable,
    pub task: TaskKind,
    pub params: TaskParams,
}

impl Config {
    #[must_use]
    pub fn output_dir(&self) -> Option<&PathBuf> {
        self.params.output_dir.as_ref()
    }

    /// 縮時任務預設使用硬體編碼，其他任務預設使用 CPU
    #[must_use]
    pub fn use_gpu(&self) -> bool {
        self.params
            .use_gpu
            .unwrap_or(self.task == TaskKind::Timelapse)
    }

    #[must_use]
    pub fn remove_subtitle(&self) -> bool {
        self.params
            .remove_subtitle
            .unwrap_or(self.task == TaskKind::Subtitle)
    }

    #[must_use]
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            use_gpu: self.use_gpu(),
            resolution: self.params.resolution,
            delete_source: self.params.delete_source,
            use_suffix: self.params.use_suffix,
            compatibility_mode: self.params.compatibility_mode,
            embed_subtitles: self.params.embed_subtitles,
            remove_subtitle: self.remove_subtitle(),
            test_mode: self.params.test_mode,
        }
    }

    #[must_use]
    pub fn timelapse_options(&self) -> TimelapseOptions {
        TimelapseOptions {
            speed_ratio: self.params.speed_ratio,
            use_gpu: self.use_gpu(),
        }
    }

    #[must_use]
    pub fn subtitle_options(&self) -> SubtitleOptions {
        SubtitleOptions {
            container: self
                .params
                .container
                .clone()
                .unwrap_or_else(|| DEFAULT_SUBTITLE_CONTAINER.to_string()),
            in_place: self.params.output_dir.is_none(),
            remove_subtitle: self.remove_subtitle(),
        }
    }
}
