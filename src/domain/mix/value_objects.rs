//! Mix Context - Value Objects

use serde::{Deserialize, Serialize};

use super::errors::MixError;

/// 剪辑时间窗口（秒）
///
/// 不变量: start_secs < end_secs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_secs: u32,
    pub end_secs: u32,
}

impl TimeWindow {
    pub fn new(start_secs: u32, end_secs: u32) -> Result<Self, MixError> {
        if start_secs >= end_secs {
            return Err(MixError::InvalidWindow {
                start_secs,
                end_secs,
            });
        }
        Ok(Self {
            start_secs,
            end_secs,
        })
    }

    /// 从文本时间戳构造（`SS`、`MM:SS` 或 `HH:MM:SS`）
    pub fn parse(start: &str, end: &str) -> Result<Self, MixError> {
        Self::new(parse_timestamp(start)?, parse_timestamp(end)?)
    }

    pub fn duration_secs(&self) -> u32 {
        self.end_secs - self.start_secs
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s..{}s", self.start_secs, self.end_secs)
    }
}

/// 解析时间戳为秒数
///
/// 支持三种形式: `85`、`1:25`、`0:01:25`
pub fn parse_timestamp(raw: &str) -> Result<u32, MixError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(MixError::InvalidTimestamp(raw.to_string()));
    }

    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() > 3 {
        return Err(MixError::InvalidTimestamp(raw.to_string()));
    }

    let mut total: u32 = 0;
    for (index, part) in parts.iter().enumerate() {
        let value: u32 = part
            .trim()
            .parse()
            .map_err(|_| MixError::InvalidTimestamp(raw.to_string()))?;
        // 多段形式下的分/秒必须小于 60
        if index > 0 && value >= 60 {
            return Err(MixError::InvalidTimestamp(raw.to_string()));
        }
        total = total * 60 + value;
    }

    Ok(total)
}

/// 一段待获取的素材: 来源定位符 + 时间窗口
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipSource {
    pub url: String,
    pub window: TimeWindow,
}

impl ClipSource {
    pub fn new(url: impl Into<String>, window: TimeWindow) -> Self {
        Self {
            url: url.into(),
            window,
        }
    }
}

/// 规划器挑选出的一首歌
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedClip {
    pub title: String,
    pub artist: String,
    pub window: TimeWindow,
}

/// 规划器返回的完整混音计划
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixPlan {
    pub title: String,
    pub clips: Vec<PlannedClip>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_seconds() {
        assert_eq!(parse_timestamp("85").unwrap(), 85);
        assert_eq!(parse_timestamp("0").unwrap(), 0);
    }

    #[test]
    fn test_parse_minutes_seconds() {
        assert_eq!(parse_timestamp("1:25").unwrap(), 85);
        assert_eq!(parse_timestamp("10:00").unwrap(), 600);
    }

    #[test]
    fn test_parse_hours_minutes_seconds() {
        assert_eq!(parse_timestamp("0:01:25").unwrap(), 85);
        assert_eq!(parse_timestamp("1:00:05").unwrap(), 3605);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(parse_timestamp(" 1:25 ").unwrap(), 85);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("").is_err());
        assert!(parse_timestamp("abc").is_err());
        assert!(parse_timestamp("1:2:3:4").is_err());
        assert!(parse_timestamp("1:75").is_err());
    }

    #[test]
    fn test_window_validation() {
        assert!(TimeWindow::new(10, 20).is_ok());
        assert!(TimeWindow::new(20, 10).is_err());
        assert!(TimeWindow::new(10, 10).is_err());
    }

    #[test]
    fn test_window_parse() {
        let window = TimeWindow::parse("0:30", "1:00").unwrap();
        assert_eq!(window.start_secs, 30);
        assert_eq!(window.end_secs, 60);
        assert_eq!(window.duration_secs(), 30);
    }
}
