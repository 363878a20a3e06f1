use std::path::{Path, PathBuf};

/// 軟字幕軌的顯示名稱
pub const SUBTITLE_TRACK_TITLE: &str = "title=默認字幕";

/// 找出與影片同名的外掛字幕，依 `extensions` 順序取第一個存在者
#[must_use]
pub fn find_subtitle(video: &Path, extensions: &[String]) -> Option<PathBuf> {
    extensions
        .iter()
        .map(|ext| video.with_extension(ext.trim_start_matches('.')))
        .find(|candidate| candidate.is_file())
}

/// 依輸出容器選擇字幕編碼；不支援內嵌軟字幕的容器回傳 `None`
#[must_use]
pub fn subtitle_codec_for(output: &Path) -> Option<&'static str> {
    let ext = output.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "mp4" | "mov" | "m4v" => Some("mov_text"),
        "mkv" => Some("copy"),
        _ => None,
    }
}

/// 將字幕以預設軌嵌入時所需的參數（字幕為第 `input_index` 個輸入）
#[must_use]
pub fn subtitle_track_args(input_index: usize, codec: &str) -> Vec<String> {
    let stream = format!("{input_index}:0");
    [
        "-map",
        stream.as_str(),
        "-c:s",
        codec,
        "-metadata:s:s:0",
        SUBTITLE_TRACK_TITLE,
        "-disposition:s:0",
        "default",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}
