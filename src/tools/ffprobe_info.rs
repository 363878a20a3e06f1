use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

/// 使用 ffprobe 取得媒體總長度（秒）
pub fn get_duration(ffprobe: &Path, path: &Path) -> Result<f64> {
    let output = Command::new(ffprobe)
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(path)
        .output()
        .with_context(|| format!("無法執行 ffprobe: {}", path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffprobe 執行失敗: {stderr}");
    }

    parse_duration(&String::from_utf8_lossy(&output.stdout))
        .with_context(|| format!("無法取得長度: {}", path.display()))
}

/// 解析 ffprobe 的 JSON 輸出，回傳 `format.duration`
fn parse_duration(json: &str) -> Result<f64> {
    let probe: FfprobeOutput =
        serde_json::from_str(json).with_context(|| "無法解析 ffprobe 輸出")?;

    let duration = probe
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| anyhow!("ffprobe 輸出缺少 duration"))?;

    let seconds: f64 = duration
        .trim()
        .parse()
        .with_context(|| format!("duration 不是數字: {duration}"))?;

    if !seconds.is_finite() || seconds <= 0.0 {
        bail!("duration 無效: {seconds}");
    }

    Ok(seconds)
}
