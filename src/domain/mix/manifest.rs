//! Mix Context - 剪辑清单解析
//!
//! 上传的 CSV 清单，表头 `Url,Start,End`，时间戳支持秒数或 `MM:SS`

use super::errors::MixError;
use super::value_objects::{ClipSource, TimeWindow};

/// 解析 CSV 剪辑清单
///
/// 第一行必须是表头，列顺序以表头为准；空行跳过
pub fn parse_manifest(content: &str) -> Result<Vec<ClipSource>, MixError> {
    let mut lines = content.lines();

    let header = lines
        .next()
        .ok_or_else(|| MixError::InvalidManifest("missing header row".to_string()))?;
    let columns = column_indices(header)?;

    let mut clips = Vec::new();
    for (line_no, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < 3 {
            return Err(MixError::InvalidManifest(format!(
                "row {}: expected 3 columns, got {}",
                line_no + 2,
                fields.len()
            )));
        }

        let url = fields[columns.url];
        if url.is_empty() {
            return Err(MixError::InvalidManifest(format!(
                "row {}: empty url",
                line_no + 2
            )));
        }

        let window = TimeWindow::parse(fields[columns.start], fields[columns.end])?;
        clips.push(ClipSource::new(url, window));
    }

    if clips.is_empty() {
        return Err(MixError::EmptyManifest);
    }

    Ok(clips)
}

struct ColumnIndices {
    url: usize,
    start: usize,
    end: usize,
}

fn column_indices(header: &str) -> Result<ColumnIndices, MixError> {
    let mut url = None;
    let mut start = None;
    let mut end = None;

    for (i, name) in header.split(',').map(str::trim).enumerate() {
        match name.to_ascii_lowercase().as_str() {
            "url" => url = Some(i),
            "start" => start = Some(i),
            "end" => end = Some(i),
            _ => {}
        }
    }

    match (url, start, end) {
        (Some(url), Some(start), Some(end)) => Ok(ColumnIndices { url, start, end }),
        _ => Err(MixError::InvalidManifest(format!(
            "header must contain Url, Start and End columns, got: {}",
            header
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_manifest() {
        let csv = "Url,Start,End\n\
                   http://example.com/a.wav,0:30,1:00\n\
                   http://example.com/b.wav,45,90\n";

        let clips = parse_manifest(csv).unwrap();
        assert_eq!(clips.len(), 2);
        assert_eq!(clips[0].url, "http://example.com/a.wav");
        assert_eq!(clips[0].window, TimeWindow::new(30, 60).unwrap());
        assert_eq!(clips[1].window, TimeWindow::new(45, 90).unwrap());
    }

    #[test]
    fn test_parse_reordered_columns() {
        let csv = "Start,End,Url\n0:10,0:20,http://example.com/a.wav\n";

        let clips = parse_manifest(csv).unwrap();
        assert_eq!(clips[0].url, "http://example.com/a.wav");
        assert_eq!(clips[0].window.start_secs, 10);
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let csv = "Url,Start,End\n\nhttp://example.com/a.wav,1,2\n\n";
        assert_eq!(parse_manifest(csv).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_rejects_missing_header() {
        let csv = "http://example.com/a.wav,1,2\n";
        assert!(parse_manifest(csv).is_err());
    }

    #[test]
    fn test_parse_rejects_short_row() {
        let csv = "Url,Start,End\nhttp://example.com/a.wav,1\n";
        assert!(parse_manifest(csv).is_err());
    }

    #[test]
    fn test_parse_rejects_empty_manifest() {
        assert!(matches!(
            parse_manifest("Url,Start,End\n"),
            Err(MixError::EmptyManifest)
        ));
    }
}
