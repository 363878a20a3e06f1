use crate::component::processor::{ProcessContext, StagedProcessor, UnitOutcome};
use crate::config::Config;
use crate::tools::{Granularity, Qualifier, ScratchFile, WorkUnit, concat_manifest, group};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

const AUDIO_SAMPLE_RATE: &str = "44100";
const TEMP_DIR_NAME: &str = "temp_wav_extracted";

/// 一支影片與其對應的 WAV 中間檔
#[derive(Debug, Clone, PartialEq, Eq)]
struct Intermediate {
    video: PathBuf,
    wav: PathBuf,
}

/// 抽出音軌為 PCM WAV
#[must_use]
pub fn extract_args(video: &Path, wav: &Path) -> Vec<String> {
    vec![
        "-i".into(),
        video.display().to_string(),
        "-vn".into(),
        "-ac".into(),
        "2".into(),
        "-ar".into(),
        AUDIO_SAMPLE_RATE.into(),
        "-c:a".into(),
        "pcm_s16le".into(),
        wav.display().to_string(),
    ]
}

/// 以 concat 清單合併 WAV 並壓成 MP3
#[must_use]
pub fn merge_args(manifest: &Path, output: &Path) -> Vec<String> {
    vec![
        "-f".into(),
        "concat".into(),
        "-safe".into(),
        "0".into(),
        "-i".into(),
        manifest.display().to_string(),
        "-c:a".into(),
        "libmp3lame".into(),
        "-q:a".into(),
        "2".into(),
        output.display().to_string(),
    ]
}

/// 以資料夾為單位抽出所有影片的音訊，依批次大小合併為 MP3
pub struct AudioExtractor {
    batch_size: usize,
    qualifier: Qualifier,
}

impl AudioExtractor {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            batch_size: config.params.batch_size,
            qualifier: Qualifier::new(config.file_type_table.video_extensions()),
        }
    }

    fn group_output(output_dir: &Path, batch: &[Intermediate]) -> PathBuf {
        let first = batch
            .first()
            .and_then(|item| item.video.file_stem())
            .and_then(|s| s.to_str())
            .unwrap_or("audio");
        output_dir.join(format!("{first}.mp3"))
    }

    /// 抽出單一 WAV；已存在的中間檔直接沿用
    fn extract(ctx: &ProcessContext<'_>, item: &Intermediate) -> UnitOutcome {
        if item.wav.exists() {
            return UnitOutcome::Completed;
        }
        ctx.produce(&item.wav, |staging| {
            Ok(ctx.tool.invoke(&extract_args(&item.video, staging)))
        })
    }

    fn merge(ctx: &ProcessContext<'_>, batch: &[Intermediate], output: &Path) -> UnitOutcome {
        info!("合併 {} 個音訊 -> {}", batch.len(), output.display());
        ctx.produce(output, |staging| {
            let wavs: Vec<PathBuf> = batch.iter().map(|item| item.wav.clone()).collect();
            let parent = output.parent().unwrap_or(Path::new("."));
            let manifest = ScratchFile::create(parent, "concat_list", &concat_manifest(&wavs))?;
            Ok(ctx.tool.invoke(&merge_args(manifest.path(), staging)))
        })
    }

    fn extract_and_merge(
        &self,
        unit: &WorkUnit,
        temp_dir: &Path,
        ctx: &ProcessContext<'_>,
    ) -> UnitOutcome {
        let intermediates: Vec<Intermediate> = self
            .qualifier
            .qualifying_files(&unit.path)
            .into_iter()
            .map(|video| {
                let name = video.file_name().map_or_else(
                    || "audio".to_string(),
                    |n| n.to_string_lossy().into_owned(),
                );
                Intermediate {
                    wav: temp_dir.join(format!("{name}.wav")),
                    video,
                }
            })
            .collect();

        if intermediates.is_empty() {
            return UnitOutcome::Skipped("沒有可處理的影片".to_string());
        }

        info!(
            "音訊任務: {} ({} 個檔案, 批次大小 {})",
            unit.path.display(),
            intermediates.len(),
            if self.batch_size == 0 {
                "全部".to_string()
            } else {
                self.batch_size.to_string()
            }
        );

        // 分組只取決於檔名排序，先找出尚未產生的群組，已完成的群組不再抽音訊
        let pending: Vec<(&[Intermediate], PathBuf)> = group(&intermediates, self.batch_size)
            .into_iter()
            .map(|batch| (batch, Self::group_output(&unit.output_dir, batch)))
            .filter(|(_, output)| {
                let exists = output.exists();
                if exists {
                    info!("已存在，略過: {}", output.display());
                }
                !exists
            })
            .collect();

        if pending.is_empty() {
            return UnitOutcome::Skipped(format!("已存在: {}", unit.output_dir.display()));
        }

        let mut outcomes = Vec::new();
        for (batch, output) in &pending {
            let extracted: Vec<UnitOutcome> =
                batch.iter().map(|item| Self::extract(ctx, item)).collect();

            // 缺任何一段就不合併，避免產生不完整的正式檔
            if !extracted.iter().all(UnitOutcome::is_completed) {
                warn!("音訊抽取失敗，不合併: {}", output.display());
                outcomes.push(UnitOutcome::combine(extracted));
                continue;
            }

            outcomes.push(Self::merge(ctx, batch, output));
        }

        UnitOutcome::combine(outcomes)
    }
}

impl StagedProcessor for AudioExtractor {
    fn name(&self) -> &'static str {
        "audio"
    }

    fn granularity(&self) -> Granularity {
        Granularity::Folder
    }

    fn qualifier(&self) -> &Qualifier {
        &self.qualifier
    }

    fn process(&self, unit: &WorkUnit, ctx: &ProcessContext<'_>) -> UnitOutcome {
        let temp_dir = unit.output_dir.join(TEMP_DIR_NAME);
        let outcome = self.extract_and_merge(unit, &temp_dir, ctx);

        // 不論結果如何，中間檔一律清除
        if temp_dir.exists() {
            info!("清理暫存音訊: {}", temp_dir.display());
            if let Err(e) = fs::remove_dir_all(&temp_dir) {
                warn!("無法刪除暫存資料夾 {}: {e}", temp_dir.display());
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_output_named_after_first_member() {
        let batch = vec![
            Intermediate {
                video: PathBuf::from("/in/001.mp4"),
                wav: PathBuf::from("/out/tmp/001.mp4.wav"),
            },
            Intermediate {
                video: PathBuf::from("/in/002.mp4"),
                wav: PathBuf::from("/out/tmp/002.mp4.wav"),
            },
        ];
        assert_eq!(
            AudioExtractor::group_output(Path::new("/out"), &batch),
            PathBuf::from("/out/001.mp3")
        );
    }

    #[test]
    fn test_extract_and_merge_args() {
        let extract = extract_args(Path::new("/in/a.mp4"), Path::new("/tmp/a.wav"));
        assert!(extract.contains(&"pcm_s16le".to_string()));
        assert!(extract.contains(&"-vn".to_string()));
        assert_eq!(extract.last().unwrap(), "/tmp/a.wav");

        let merge = merge_args(Path::new("/out/list.txt"), Path::new("/out/a.mp3"));
        assert_eq!(&merge[..4], ["-f", "concat", "-safe", "0"]);
        assert!(merge.contains(&"libmp3lame".to_string()));
    }
}
