use crate::component::processor::{ProcessContext, StagedProcessor, UnitOutcome};
use crate::config::Config;
use crate::tools::{Granularity, Qualifier, ScratchFile, WorkUnit, concat_manifest};
use log::info;
use std::path::{Path, PathBuf};

/// 以 concat demuxer 無損串接
#[must_use]
pub fn concat_args(manifest: &Path, output: &Path) -> Vec<String> {
    vec![
        "-f".into(),
        "concat".into(),
        "-safe".into(),
        "0".into(),
        "-i".into(),
        manifest.display().to_string(),
        "-c".into(),
        "copy".into(),
        output.display().to_string(),
    ]
}

/// 把資料夾內所有影片依檔名順序串接成 `{資料夾名稱}.mp4`
pub struct VideoMerger {
    qualifier: Qualifier,
}

impl VideoMerger {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            qualifier: Qualifier::new(config.file_type_table.video_extensions()).skipping_hidden(),
        }
    }

    /// 排除將要產生的輸出檔本身
    fn merge_inputs(&self, unit: &WorkUnit, final_path: &Path) -> Vec<PathBuf> {
        self.qualifier
            .qualifying_files(&unit.path)
            .into_iter()
            .filter(|file| file != final_path)
            .collect()
    }
}

impl StagedProcessor for VideoMerger {
    fn name(&self) -> &'static str {
        "merge"
    }

    fn granularity(&self) -> Granularity {
        Granularity::Folder
    }

    fn qualifier(&self) -> &Qualifier {
        &self.qualifier
    }

    fn process(&self, unit: &WorkUnit, ctx: &ProcessContext<'_>) -> UnitOutcome {
        let final_path = unit
            .output_dir
            .join(format!("{}.mp4", unit.name_or("merged")));
        let inputs = self.merge_inputs(unit, &final_path);

        if inputs.is_empty() {
            return UnitOutcome::Skipped(format!("沒有可合併的影片: {}", unit.path.display()));
        }

        info!(
            "合併任務: {} ({} 個檔案) -> {}",
            unit.path.display(),
            inputs.len(),
            final_path.display()
        );

        ctx.produce(&final_path, |staging| {
            let parent = final_path.parent().unwrap_or(Path::new("."));
            let manifest = ScratchFile::create(parent, "merge_list", &concat_manifest(&inputs))?;
            Ok(ctx.tool.invoke(&concat_args(manifest.path(), staging)))
        })
    }
}
