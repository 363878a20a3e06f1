use super::metadata_builder::{build_metadata, parse_entries};
use crate::component::processor::{ProcessContext, UnitOutcome};
use crate::config::ChapterTask;
use crate::tools::ScratchFile;
use anyhow::Context;
use log::{error, info};
use std::path::{Path, PathBuf};

const CHAPTER_SUFFIX: &str = "_chapters";

/// 輸出檔：`{stem}_chapters{ext}`，有指定 `output_dir` 時放在其中，否則與來源同目錄
#[must_use]
pub fn output_path(source: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let file_name = match source.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}{CHAPTER_SUFFIX}.{ext}"),
        None => format!("{stem}{CHAPTER_SUFFIX}"),
    };

    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| source.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(file_name)
}

/// 只複製串流，附上 metadata 檔中的章節
#[must_use]
pub fn remux_args(source: &Path, metadata: &Path, output: &Path) -> Vec<String> {
    vec![
        "-i".into(),
        source.display().to_string(),
        "-i".into(),
        metadata.display().to_string(),
        "-map_metadata".into(),
        "1".into(),
        "-map_chapters".into(),
        "1".into(),
        "-codec".into(),
        "copy".into(),
        "-f".into(),
        "mp4".into(),
        output.display().to_string(),
    ]
}

/// 依章節列表為單一檔案寫入章節標記
pub struct ChapterInjector;

impl ChapterInjector {
    pub fn inject(
        ctx: &ProcessContext<'_>,
        task: &ChapterTask,
        output_dir: Option<&Path>,
    ) -> UnitOutcome {
        let source = task.file.as_path();
        if !source.is_file() {
            error!("找不到來源檔案: {}", source.display());
            return UnitOutcome::Failed(format!("找不到來源檔案: {}", source.display()));
        }

        let final_path = output_path(source, output_dir);
        info!(
            "章節任務: {} ({} 個章節) -> {}",
            source.display(),
            task.chapters.len(),
            final_path.display()
        );

        ctx.produce(&final_path, |staging| {
            let entries = parse_entries(&task.chapters)
                .with_context(|| format!("章節列表無效: {}", source.display()))?;
            let duration = ctx.tool.probe_duration(source)?;
            let metadata = build_metadata(&entries, duration)?;

            let parent = final_path.parent().unwrap_or(Path::new("."));
            let metadata_file = ScratchFile::create(parent, "ffmetadata", &metadata)?;
            Ok(ctx
                .tool
                .invoke(&remux_args(source, metadata_file.path(), staging)))
        })
    }
}
