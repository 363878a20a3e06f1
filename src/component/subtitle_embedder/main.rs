use crate::component::processor::{ProcessContext, StagedProcessor, UnitOutcome};
use crate::config::{Config, SubtitleOptions};
use crate::tools::{
    Granularity, Qualifier, WorkUnit, find_subtitle, remove_if_exists, subtitle_codec_for,
    subtitle_track_args,
};
use log::info;
use std::path::{Path, PathBuf};

/// 輸出檔名沿用來源主檔名，副檔名換成 `container`
#[must_use]
pub fn output_file_name(source: &Path, container: &str) -> PathBuf {
    PathBuf::from(source.file_name().unwrap_or_default())
        .with_extension(container.trim_start_matches('.'))
}

/// 影音串流直接複製，字幕以預設軟字幕軌嵌入
#[must_use]
pub fn embed_args(source: &Path, subtitle: &Path, codec: &str, output: &Path) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-i".into(),
        source.display().to_string(),
        "-i".into(),
        subtitle.display().to_string(),
        "-map".into(),
        "0:v".into(),
        "-map".into(),
        "0:a?".into(),
        "-c".into(),
        "copy".into(),
    ];
    args.extend(subtitle_track_args(1, codec));
    args.push(output.display().to_string());
    args
}

/// 逐檔把同名外掛字幕嵌入影片
pub struct SubtitleEmbedder {
    options: SubtitleOptions,
    qualifier: Qualifier,
    subtitle_extensions: Vec<String>,
}

impl SubtitleEmbedder {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            options: config.subtitle_options(),
            qualifier: Qualifier::new(config.file_type_table.video_extensions()),
            subtitle_extensions: config.file_type_table.subtitle_extensions(),
        }
    }
}

impl StagedProcessor for SubtitleEmbedder {
    fn name(&self) -> &'static str {
        "subtitle"
    }

    fn granularity(&self) -> Granularity {
        Granularity::File
    }

    fn qualifier(&self) -> &Qualifier {
        &self.qualifier
    }

    fn process(&self, unit: &WorkUnit, ctx: &ProcessContext<'_>) -> UnitOutcome {
        let source = unit.path.as_path();

        let Some(subtitle) = find_subtitle(source, &self.subtitle_extensions) else {
            info!("找不到字幕，略過: {}", source.display());
            return UnitOutcome::Skipped(format!("找不到字幕: {}", source.display()));
        };

        // 就地模式不換容器，直接以暫存檔取代來源
        let final_path = if self.options.in_place {
            source.to_path_buf()
        } else {
            unit.output_dir.join(output_file_name(source, &self.options.container))
        };

        let Some(codec) = subtitle_codec_for(&final_path) else {
            info!("輸出容器不支援內嵌字幕，略過: {}", final_path.display());
            return UnitOutcome::Skipped(format!("容器不支援字幕: {}", final_path.display()));
        };

        info!(
            "嵌入字幕 [{codec}]: {} + {} -> {}",
            source.display(),
            subtitle.display(),
            final_path.display()
        );

        let stage = |staging: &Path| -> anyhow::Result<bool> {
            Ok(ctx
                .tool
                .invoke(&embed_args(source, &subtitle, codec, staging)))
        };
        let outcome = if self.options.in_place {
            ctx.replace_in_place(&final_path, stage)
        } else {
            ctx.produce(&final_path, stage)
        };

        if outcome.is_completed() && self.options.remove_subtitle {
            remove_if_exists(&subtitle);
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        let source = Path::new("/in/movie.mkv");
        assert_eq!(output_file_name(source, "mp4"), PathBuf::from("movie.mp4"));
        assert_eq!(output_file_name(source, ".mov"), PathBuf::from("movie.mov"));
        assert_eq!(output_file_name(source, "mkv"), PathBuf::from("movie.mkv"));
    }

    #[test]
    fn test_embed_args_marks_default_track() {
        let args = embed_args(
            Path::new("/in/a.mp4"),
            Path::new("/in/a.srt"),
            "mov_text",
            Path::new("/out/a_processing.mp4"),
        );
        assert_eq!(&args[..4], ["-i", "/in/a.mp4", "-i", "/in/a.srt"]);
        assert!(args.windows(2).any(|w| w == ["-c", "copy"]));
        assert!(args.windows(2).any(|w| w == ["-c:s", "mov_text"]));
        assert!(args.windows(2).any(|w| w == ["-disposition:s:0", "default"]));
        assert_eq!(args.last().unwrap(), "/out/a_processing.mp4");
    }
}
