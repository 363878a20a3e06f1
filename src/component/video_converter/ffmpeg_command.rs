use crate::config::{ConvertOptions, Resolution};
use crate::tools::subtitle_track_args;
use std::path::{Path, PathBuf};

const VIDEO_CRF_DEFAULT: &str = "28";
const VIDEO_PRESET_DEFAULT: &str = "fast";
const VIDEO_AUDIO_BITRATE: &str = "128k";
const GPU_ENCODER: &str = "h264_videotoolbox";
const GPU_QUALITY: &str = "50";
const TEST_MODE_SECONDS: &str = "180";

/// 硬體與軟體編碼器二擇一
#[must_use]
pub fn encoder_args(use_gpu: bool, crf: &str, preset: &str) -> Vec<String> {
    let args: Vec<&str> = if use_gpu {
        vec!["-c:v", GPU_ENCODER, "-q:v", GPU_QUALITY]
    } else {
        vec!["-c:v", "libx264", "-crf", crf, "-preset", preset]
    };
    args.into_iter().map(String::from).collect()
}

/// 限制較長的一邊，維持比例，兩邊都取偶數
#[must_use]
pub fn scale_filter(resolution: Resolution) -> String {
    let max = resolution.max_dimension();
    format!(
        "scale=w='if(gte(iw,ih),trunc(min({max},iw)/2)*2,-2)':h='if(gte(iw,ih),-2,trunc(min({max},ih)/2)*2)'"
    )
}

/// 輸出檔名：`{stem}[_{解析度}_{GPU|CPU}].mp4`
#[must_use]
pub fn output_file_name(source: &Path, options: &ConvertOptions) -> String {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    if options.use_suffix {
        let mode = if options.use_gpu { "GPU" } else { "CPU" };
        format!("{stem}_{}_{mode}.mp4", options.resolution.label())
    } else {
        format!("{stem}.mp4")
    }
}

/// 要嵌入的外掛字幕與其編碼
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleInput {
    pub path: PathBuf,
    pub codec: &'static str,
}

pub struct ConvertCommand<'a> {
    source: &'a Path,
    options: &'a ConvertOptions,
    subtitle: Option<&'a SubtitleInput>,
}

impl<'a> ConvertCommand<'a> {
    #[must_use]
    pub const fn new(
        source: &'a Path,
        options: &'a ConvertOptions,
        subtitle: Option<&'a SubtitleInput>,
    ) -> Self {
        Self {
            source,
            options,
            subtitle,
        }
    }

    fn video_filters(&self) -> String {
        let mut filters = Vec::new();
        if self.options.compatibility_mode {
            filters.push("yadif=1:-1:0".to_string());
        }
        filters.push(scale_filter(self.options.resolution));
        filters.join(",")
    }

    #[must_use]
    pub fn build_args(&self, output: &Path) -> Vec<String> {
        let mut args: Vec<String> = vec!["-i".into(), self.source.display().to_string()];

        if let Some(subtitle) = self.subtitle {
            args.extend(["-i".into(), subtitle.path.display().to_string()]);
        }

        args.extend(["-map", "0:v", "-map", "0:a?"].map(String::from));

        if let Some(subtitle) = self.subtitle {
            args.extend(subtitle_track_args(1, subtitle.codec));
        }

        args.extend([
            "-vf".into(),
            self.video_filters(),
            "-af".into(),
            "aformat=channel_layouts=stereo".into(),
            "-c:a".into(),
            "aac".into(),
            "-b:a".into(),
            VIDEO_AUDIO_BITRATE.into(),
        ]);

        if self.options.compatibility_mode {
            args.extend(
                ["-vsync", "cfr", "-movflags", "+faststart", "-pix_fmt", "yuv420p"]
                    .map(String::from),
            );
        }

        args.extend(encoder_args(
            self.options.use_gpu,
            VIDEO_CRF_DEFAULT,
            VIDEO_PRESET_DEFAULT,
        ));

        if self.options.compatibility_mode {
            if self.options.use_gpu {
                args.extend(["-profile:v", "high"].map(String::from));
            } else {
                args.extend(
                    ["-profile:v", "high", "-level", "4.1", "-x264-params", "ref=4:bframes=3"]
                        .map(String::from),
                );
            }
        }

        if self.options.test_mode {
            args.extend(["-t".to_string(), TEST_MODE_SECONDS.to_string()]);
        }

        args.push(output.display().to_string());
        args
    }
}
