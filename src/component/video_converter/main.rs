use super::ffmpeg_command::{ConvertCommand, SubtitleInput, output_file_name};
use crate::component::processor::{ProcessContext, StagedProcessor, UnitOutcome};
use crate::config::{Config, ConvertOptions};
use crate::tools::{
    Granularity, Qualifier, WorkUnit, find_subtitle, remove_if_exists, subtitle_codec_for,
};
use log::info;
use std::path::Path;

/// 逐檔轉檔：縮放、音訊轉 AAC、可選內嵌字幕
pub struct VideoConverter {
    options: ConvertOptions,
    qualifier: Qualifier,
    subtitle_extensions: Vec<String>,
}

impl VideoConverter {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            options: config.convert_options(),
            qualifier: Qualifier::new(config.file_type_table.video_extensions()),
            subtitle_extensions: config.file_type_table.subtitle_extensions(),
        }
    }

    /// 找不到字幕或容器不支援時不視為錯誤，只是不嵌入
    fn detect_subtitle(&self, source: &Path, final_path: &Path) -> Option<SubtitleInput> {
        if !self.options.embed_subtitles {
            return None;
        }

        let Some(path) = find_subtitle(source, &self.subtitle_extensions) else {
            info!("找不到字幕，不嵌入: {}", source.display());
            return None;
        };

        match subtitle_codec_for(final_path) {
            Some(codec) => {
                info!("內嵌軟字幕: {}", path.display());
                Some(SubtitleInput { path, codec })
            }
            None => {
                info!("輸出容器不支援內嵌字幕，略過字幕: {}", final_path.display());
                None
            }
        }
    }
}

impl StagedProcessor for VideoConverter {
    fn name(&self) -> &'static str {
        "convert"
    }

    fn granularity(&self) -> Granularity {
        Granularity::File
    }

    fn qualifier(&self) -> &Qualifier {
        &self.qualifier
    }

    fn process(&self, unit: &WorkUnit, ctx: &ProcessContext<'_>) -> UnitOutcome {
        let source = unit.path.as_path();
        let final_path = unit
            .output_dir
            .join(output_file_name(source, &self.options));

        info!(
            "轉檔 [{} {}]: {} -> {}",
            self.options.resolution,
            if self.options.use_gpu { "GPU" } else { "CPU" },
            source.display(),
            final_path.display()
        );

        let mut subtitle = None;
        let outcome = ctx.produce(&final_path, |staging| {
            subtitle = self.detect_subtitle(source, &final_path);
            let command = ConvertCommand::new(source, &self.options, subtitle.as_ref());
            Ok(ctx.tool.invoke(&command.build_args(staging)))
        });

        if outcome.is_completed() {
            if self.options.delete_source {
                remove_if_exists(source);
            }
            if self.options.remove_subtitle {
                if let Some(subtitle) = &subtitle {
                    remove_if_exists(&subtitle.path);
                }
            }
        }

        outcome
    }
}
