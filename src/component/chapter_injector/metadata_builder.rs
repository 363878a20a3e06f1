//! 章節 metadata 產生器
//!
//! 將 `MM:SS` / `HH:MM:SS` 時間點轉為 ffmpeg 的 `;FFMETADATA1` 文件。
//! 每章的結束時間為下一章的開始時間，最後一章結束於影片總長度。

use anyhow::{Context, Result, anyhow, bail};
use regex::Regex;
use std::fmt::Write;
use std::sync::LazyLock;

static REGEX_OFFSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+):(\d{1,2})(?::(\d{1,2}))?$").expect("Invalid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterEntry {
    pub start_ms: u64,
    pub title: String,
}

/// 解析時間點為毫秒
///
/// 兩段式為 `MM:SS`（分鐘不設上限），三段式為 `HH:MM:SS`；
/// 分、秒欄位在其後還有欄位時必須小於 60。
pub fn parse_offset(raw: &str) -> Result<u64> {
    let trimmed = raw.trim();
    let caps = REGEX_OFFSET
        .captures(trimmed)
        .ok_or_else(|| anyhow!("時間格式錯誤（需為 MM:SS 或 HH:MM:SS）: {raw:?}"))?;

    let field = |index: usize| -> Result<Option<u64>> {
        caps.get(index)
            .map(|m| m.as_str().parse::<u64>())
            .transpose()
            .with_context(|| format!("時間數值過大: {raw:?}"))
    };

    let first = field(1)?.unwrap_or_default();
    let second = field(2)?.unwrap_or_default();
    let (hours, minutes, seconds) = match field(3)? {
        Some(third) => {
            if second >= 60 || third >= 60 {
                bail!("分或秒超出範圍: {raw:?}");
            }
            (first, second, third)
        }
        None => {
            if second >= 60 {
                bail!("秒數超出範圍: {raw:?}");
            }
            (0, first, second)
        }
    };

    hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|total| total.checked_add(seconds))
        .and_then(|total| total.checked_mul(1000))
        .ok_or_else(|| anyhow!("時間數值過大: {raw:?}"))
}

/// 解析並驗證整份章節列表：至少一章，開始時間嚴格遞增
pub fn parse_entries(chapters: &[(String, String)]) -> Result<Vec<ChapterEntry>> {
    if chapters.is_empty() {
        bail!("章節列表是空的");
    }

    let entries = chapters
        .iter()
        .map(|(offset, title)| {
            Ok(ChapterEntry {
                start_ms: parse_offset(offset)?,
                title: title.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(pair) = entries.windows(2).find(|w| w[1].start_ms <= w[0].start_ms) {
        bail!(
            "章節時間必須遞增: {:?} 在 {:?} 之後",
            pair[1].title,
            pair[0].title
        );
    }

    Ok(entries)
}

/// 產生 metadata 文件內容
pub fn build_metadata(entries: &[ChapterEntry], total_duration_secs: f64) -> Result<String> {
    if !total_duration_secs.is_finite() || total_duration_secs <= 0.0 {
        bail!("影片長度無效: {total_duration_secs}");
    }
    let duration_ms = (total_duration_secs * 1000.0) as u64;

    if let Some(last) = entries.last().filter(|last| last.start_ms >= duration_ms) {
        bail!(
            "章節 {:?} 的開始時間超過影片長度 ({duration_ms} ms)",
            last.title
        );
    }

    let mut content = String::from(";FFMETADATA1\n");
    for (i, entry) in entries.iter().enumerate() {
        let end_ms = entries.get(i + 1).map_or(duration_ms, |next| next.start_ms);
        // String 的 fmt::Write 不會失敗
        let _ = write!(
            content,
            "[CHAPTER]\nTIMEBASE=1/1000\nSTART={}\nEND={end_ms}\ntitle={}\n\n",
            entry.start_ms,
            escape_metadata_value(&entry.title)
        );
    }

    Ok(content)
}

/// `=`、`;`、`#`、`\` 與換行在 metadata 中需以反斜線跳脫
fn escape_metadata_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '=' | ';' | '#' | '\\' | '\n') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapters(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(offset, title)| ((*offset).to_string(), (*title).to_string()))
            .collect()
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("00:00").unwrap(), 0);
        assert_eq!(parse_offset("01:30").unwrap(), 90_000);
        assert_eq!(parse_offset("75:00").unwrap(), 4_500_000);
        assert_eq!(parse_offset("1:02:03").unwrap(), 3_723_000);
        assert_eq!(parse_offset(" 02:05 ").unwrap(), 125_000);
    }

    #[test]
    fn test_parse_offset_rejects_malformed() {
        for raw in ["", "90", "aa:bb", "1:2:3:4", "01:60", "1:60:00", "00:-1", "1.5:00"] {
            assert!(parse_offset(raw).is_err(), "{raw:?} 應解析失敗");
        }
    }

    #[test]
    fn test_parse_offset_rejects_overflow() {
        for raw in [
            "999999999999999999:00",
            "99999999999999999999999:00",
            "5124095576030431:00:00",
        ] {
            assert!(parse_offset(raw).is_err(), "{raw:?} 應解析失敗");
        }
        assert!(parse_entries(&chapters(&[("999999999999999999:00", "A")])).is_err());
    }

    #[test]
    fn test_two_chapter_boundaries() {
        let entries = parse_entries(&chapters(&[("00:00", "Intro"), ("01:30", "Talk")])).unwrap();
        let metadata = build_metadata(&entries, 200.0).unwrap();

        assert!(metadata.starts_with(";FFMETADATA1\n"));
        assert_eq!(metadata.matches("[CHAPTER]").count(), 2);
        assert!(metadata.contains("START=0\nEND=90000\ntitle=Intro\n"));
        assert!(metadata.contains("START=90000\nEND=200000\ntitle=Talk\n"));
    }

    #[test]
    fn test_entries_must_increase() {
        assert!(parse_entries(&chapters(&[("01:00", "B"), ("00:30", "A")])).is_err());
        assert!(parse_entries(&chapters(&[("01:00", "A"), ("01:00", "B")])).is_err());
        assert!(parse_entries(&[]).is_err());
    }

    #[test]
    fn test_last_chapter_must_start_before_end() {
        let entries = parse_entries(&chapters(&[("00:00", "A"), ("05:00", "B")])).unwrap();
        assert!(build_metadata(&entries, 120.0).is_err());
        assert!(build_metadata(&entries, 0.0).is_err());
    }

    #[test]
    fn test_titles_are_escaped() {
        let entries = parse_entries(&chapters(&[("00:00", "Q&A; a=b #1")])).unwrap();
        let metadata = build_metadata(&entries, 10.0).unwrap();
        assert!(metadata.contains(r"title=Q&A\; a\=b \#1"));
    }
}
