use crate::config::file_type::FileTypeTable;
use crate::config::types::{Config, TaskParams};
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

/// 編譯時嵌入的檔案類型設定（不需要外部檔案）
const FILE_TYPE_TABLE_JSON: &str = include_str!("../data/file_type_table.json");

pub const DEFAULT_PARAMS_FILE: &str = "params/params.json";

impl Config {
    /// 從 JSON 設定檔載入並驗證
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("設定檔不存在: {}", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("無法讀取設定檔: {}", path.display()))?;

        let params: TaskParams = serde_json::from_str(&content)
            .with_context(|| format!("無法解析設定檔: {}", path.display()))?;

        Self::from_params(params)
    }

    pub fn from_params(params: TaskParams) -> Result<Self> {
        let Some(task) = params.task else {
            bail!("設定缺少 'task' 欄位");
        };

        if task.requires_output_dir() && params.output_dir.is_none() {
            bail!("{task} 任務缺少 'output_dir' 欄位");
        }

        if params.speed_ratio == 0 {
            bail!("'speed_ratio' 必須大於 0");
        }

        if params.jobs == 0 {
            bail!("'jobs' 必須大於 0");
        }

        Ok(Self {
            file_type_table: Self::load_embedded_file_type_table()?,
            task,
            params,
        })
    }

    /// 從編譯時嵌入的 JSON 載入檔案類型表
    fn load_embedded_file_type_table() -> Result<FileTypeTable> {
        serde_json::from_str(FILE_TYPE_TABLE_JSON).context("無法解析嵌入的檔案類型設定")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{Resolution, TaskKind};
    use std::path::PathBuf;

    fn parse(json: &str) -> Result<Config> {
        Config::from_params(serde_json::from_str(json)?)
    }

    #[test]
    fn test_embedded_table_contains_legacy_formats() {
        let table = Config::load_embedded_file_type_table().unwrap();
        let videos = table.video_extensions();
        for name in ["a.rm", "a.rmvb", "a.mpg", "a.wmv", "a.webm", "a.vob"] {
            assert!(videos.matches(Path::new(name)), "{name} 應為影片");
        }
    }

    #[test]
    fn test_convert_defaults() {
        let config =
            parse(r#"{"task": "convert", "input_dirs": ["in"], "output_dir": "out"}"#).unwrap();
        assert_eq!(config.task, TaskKind::Convert);
        assert_eq!(config.params.input_dirs, vec![PathBuf::from("in")]);
        assert_eq!(config.params.resolution, Resolution::P1080);
        assert_eq!(config.params.jobs, 1);
        assert!(!config.use_gpu());
        assert!(!config.remove_subtitle());
    }

    #[test]
    fn test_task_specific_defaults() {
        let timelapse = parse(r#"{"task": "timelapse", "output_dir": "out"}"#).unwrap();
        assert!(timelapse.use_gpu());
        assert_eq!(timelapse.timelapse_options().speed_ratio, 20);

        let subtitle = parse(r#"{"task": "subtitle", "output_dir": "out"}"#).unwrap();
        assert!(subtitle.remove_subtitle());
        let options = subtitle.subtitle_options();
        assert_eq!(options.container, "mp4");
        assert!(!options.in_place);
    }

    #[test]
    fn test_subtitle_without_output_dir_is_in_place() {
        let config = parse(r#"{"task": "subtitle", "input_dirs": ["in"]}"#).unwrap();
        assert!(config.output_dir().is_none());
        assert!(config.subtitle_options().in_place);

        let mkv = parse(r#"{"task": "subtitle", "output_dir": "out", "container": "mkv"}"#).unwrap();
        assert_eq!(mkv.subtitle_options().container, "mkv");
    }

    #[test]
    fn test_chapter_tasks_parse_as_pairs() {
        let config = parse(
            r#"{"task": "chapter", "tasks": [
                {"file": "a.mp4", "chapters": [["00:00", "Intro"], ["01:30", "Talk"]]}
            ]}"#,
        )
        .unwrap();
        assert!(config.output_dir().is_none());
        assert_eq!(config.params.tasks[0].chapters[1].1, "Talk");
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        assert!(parse(r#"{"output_dir": "out"}"#).is_err());
        assert!(parse(r#"{"task": "merge"}"#).is_err());
        assert!(parse(r#"{"task": "timelapse", "output_dir": "o", "speed_ratio": 0}"#).is_err());
        assert!(parse(r#"{"task": "audio", "output_dir": "o", "jobs": 0}"#).is_err());
    }

    #[test]
    fn test_unknown_task_is_rejected() {
        assert!(serde_json::from_str::<TaskParams>(r#"{"task": "upscale"}"#).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/params.json")).unwrap_err();
        assert!(err.to_string().contains("設定檔不存在"));
    }
}
