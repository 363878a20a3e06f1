use crate::component::processor::{ProcessContext, StagedProcessor, UnitOutcome};
use crate::component::video_converter::encoder_args;
use crate::config::{Config, TimelapseOptions};
use crate::tools::{Granularity, Qualifier, WorkUnit};
use log::info;
use std::path::Path;

const TIMELAPSE_CRF: &str = "24";
const TIMELAPSE_PRESET: &str = "fast";
const TIMELAPSE_FRAMERATE: &str = "30";

/// 檔名中的倍速標記，例如 `_20x`
#[must_use]
pub fn speed_marker(speed_ratio: u32) -> String {
    format!("_{speed_ratio}x")
}

#[must_use]
pub fn output_file_name(source: &Path, speed_ratio: u32) -> String {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    format!("{stem}{}.mp4", speed_marker(speed_ratio))
}

/// 壓縮時間戳、丟棄音訊、固定輸出幀率
#[must_use]
pub fn build_args(source: &Path, output: &Path, options: &TimelapseOptions) -> Vec<String> {
    let pts_multiplier = 1.0 / f64::from(options.speed_ratio);

    let mut args = vec![
        "-i".to_string(),
        source.display().to_string(),
        "-vf".to_string(),
        format!("setpts={pts_multiplier}*PTS"),
        "-an".to_string(),
        "-r".to_string(),
        TIMELAPSE_FRAMERATE.to_string(),
    ];
    args.extend(encoder_args(options.use_gpu, TIMELAPSE_CRF, TIMELAPSE_PRESET));
    args.push(output.display().to_string());
    args
}

/// 以資料夾為單位，把每支影片做成縮時影片
pub struct TimelapseMaker {
    options: TimelapseOptions,
    qualifier: Qualifier,
}

impl TimelapseMaker {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let options = config.timelapse_options();
        Self {
            qualifier: Qualifier::new(config.file_type_table.video_extensions())
                .excluding_marker(speed_marker(options.speed_ratio)),
            options,
        }
    }
}

impl StagedProcessor for TimelapseMaker {
    fn name(&self) -> &'static str {
        "timelapse"
    }

    fn granularity(&self) -> Granularity {
        Granularity::Folder
    }

    fn qualifier(&self) -> &Qualifier {
        &self.qualifier
    }

    fn process(&self, unit: &WorkUnit, ctx: &ProcessContext<'_>) -> UnitOutcome {
        let videos = self.qualifier.qualifying_files(&unit.path);

        info!(
            "縮時任務: {} ({} 個檔案, {}:1, {})",
            unit.path.display(),
            videos.len(),
            self.options.speed_ratio,
            if self.options.use_gpu { "GPU" } else { "CPU" }
        );

        let outcomes: Vec<UnitOutcome> = videos
            .iter()
            .map(|video| {
                let final_path = unit
                    .output_dir
                    .join(output_file_name(video, self.options.speed_ratio));
                ctx.produce(&final_path, |staging| {
                    Ok(ctx.tool.invoke(&build_args(video, staging, &self.options)))
                })
            })
            .collect();

        UnitOutcome::combine(outcomes)
    }
}
