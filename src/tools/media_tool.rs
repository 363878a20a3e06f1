use super::ffprobe_info::get_duration;
use anyhow::{Context, Result, bail};
use log::{debug, error};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// 每次呼叫 ffmpeg 都會加上的固定參數：直接覆寫、不讀 stdin、只輸出錯誤
const BASE_ARGS: [&str; 5] = ["-y", "-hide_banner", "-nostdin", "-loglevel", "error"];

/// stderr 只保留最後幾行寫進日誌
const STDERR_TAIL_LINES: usize = 8;

/// 外部媒體工具邊界
///
/// `invoke` 不會因為工具以非零狀態結束而回傳錯誤，只回報成功與否，
/// 由呼叫端決定要中止還是繼續下一個工作單位。
pub trait MediaTool: Send + Sync {
    fn invoke(&self, args: &[String]) -> bool;

    /// 取得媒體總長度（秒）
    fn probe_duration(&self, path: &Path) -> Result<f64>;
}

/// 以 ffmpeg / ffprobe 實作的媒體工具
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl Ffmpeg {
    /// 啟動時定位執行檔，找不到即為致命錯誤
    pub fn locate(ffmpeg: Option<&Path>, ffprobe: Option<&Path>) -> Result<Self> {
        Ok(Self {
            ffmpeg: resolve_binary("ffmpeg", ffmpeg)?,
            ffprobe: resolve_binary("ffprobe", ffprobe)?,
        })
    }

    #[must_use]
    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg
    }

    #[must_use]
    pub fn ffprobe_path(&self) -> &Path {
        &self.ffprobe
    }
}

impl MediaTool for Ffmpeg {
    fn invoke(&self, args: &[String]) -> bool {
        debug!("ffmpeg {}", args.join(" "));

        let output = Command::new(&self.ffmpeg)
            .args(BASE_ARGS)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output();

        match output {
            Ok(output) if output.status.success() => true,
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let lines: Vec<&str> = stderr.lines().collect();
                let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
                error!("ffmpeg 執行失敗 ({}): {tail}", output.status);
                false
            }
            Err(e) => {
                error!("無法啟動 ffmpeg: {e}");
                false
            }
        }
    }

    fn probe_duration(&self, path: &Path) -> Result<f64> {
        get_duration(&self.ffprobe, path)
    }
}

fn resolve_binary(name: &str, explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => {
            if !path.is_file() {
                bail!("找不到指定的 {name} 執行檔: {}", path.display());
            }
            Ok(path.to_path_buf())
        }
        None => which::which(name).with_context(|| format!("在 PATH 中找不到 {name}")),
    }
}
