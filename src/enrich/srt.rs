use anyhow::{Context, Result, bail};
use serde_json::Value;

use super::coerce;
use super::model::SubtitleEntry;

/// Parse SRT text into entries sorted by start time.
///
/// Blocks with a missing or unparseable timing line are skipped. A missing or
/// non-numeric index line falls back to the block's position.
pub fn parse_srt(input: &str) -> Vec<SubtitleEntry> {
    let normalized = input.replace("\r\n", "\n").replace('\u{feff}', "");
    let mut entries = Vec::new();

    for (position, block) in blocks(&normalized).into_iter().enumerate() {
        if let Ok(entry) = parse_block(&block, position + 1) {
            entries.push(entry);
        }
    }

    entries.sort_by(|a, b| a.start.total_cmp(&b.start));
    entries
}

/// Subtitle entries supplied as JSON: a bare array or `{"entries": [...]}`.
pub fn entries_from_value(value: Value) -> Vec<SubtitleEntry> {
    let mut entries: Vec<SubtitleEntry> =
        coerce::records_from_value(value, &["entries", "subtitles", "segments"]);
    for (position, entry) in entries.iter_mut().enumerate() {
        if entry.index == 0 {
            entry.index = position + 1;
        }
        if entry.end < entry.start {
            entry.end = entry.start;
        }
    }
    entries.retain(|entry| !entry.text.is_empty());
    entries.sort_by(|a, b| a.start.total_cmp(&b.start));
    entries
}

fn blocks(input: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn parse_block(lines: &[&str], fallback_index: usize) -> Result<SubtitleEntry> {
    let timing_at = lines
        .iter()
        .position(|line| line.contains("-->"))
        .context("SRT block is missing a timestamp line")?;

    let index = timing_at
        .checked_sub(1)
        .and_then(|idx| lines[idx].parse::<usize>().ok())
        .unwrap_or(fallback_index);

    let (start_raw, end_raw) = lines[timing_at]
        .split_once("-->")
        .map(|(a, b)| (a.trim(), b.trim()))
        .context("SRT timestamp line must contain '-->'")?;
    // Position hints such as `X1:100` may trail the end timestamp
    let end_raw = end_raw.split_whitespace().next().unwrap_or_default();

    let start = parse_timestamp(start_raw)
        .with_context(|| format!("Failed to parse SRT start timestamp '{start_raw}'"))?;
    let end = parse_timestamp(end_raw)
        .with_context(|| format!("Failed to parse SRT end timestamp '{end_raw}'"))?;

    if end < start {
        bail!("SRT cue ends before it starts: {start_raw} --> {end_raw}");
    }

    let text = lines[timing_at + 1..].join(" ");
    if text.is_empty() {
        bail!("SRT cue {index} has no text");
    }

    Ok(SubtitleEntry {
        index,
        start,
        end,
        text,
        duration: None,
    })
}

/// `HH:MM:SS,mmm` (or `.mmm`) to seconds. Fractions keep millisecond
/// precision.
fn parse_timestamp(value: &str) -> Result<f64> {
    let cleaned = value.trim().replace(',', ".");
    let (clock, fraction) = cleaned.split_once('.').unwrap_or((cleaned.as_str(), ""));

    let fields: Vec<&str> = clock.split(':').collect();
    let &[hours, minutes, seconds] = fields.as_slice() else {
        bail!("Timestamp must look like HH:MM:SS: {value}");
    };
    let whole = clock_field(hours, "hours")? * 3600
        + clock_field(minutes, "minutes")? * 60
        + clock_field(seconds, "seconds")?;

    let millis: String = fraction.chars().chain(std::iter::repeat('0')).take(3).collect();
    let millis = clock_field(&millis, "milliseconds")?;
    Ok((whole * 1000 + millis) as f64 / 1000.0)
}

fn clock_field(raw: &str, name: &str) -> Result<u64> {
    raw.parse::<u64>()
        .with_context(|| format!("Invalid {name} '{raw}' in timestamp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_basic_srt() {
        let input = "1\n00:00:01,000 --> 00:00:03,500\nHello world!\n\n2\n00:00:04,000 --> 00:00:05,000\nNext line\nsecond row\n";
        let entries = parse_srt(input);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "Hello world!");
        assert_eq!(entries[0].end, 3.5);
        assert_eq!(entries[1].index, 2);
        assert_eq!(entries[1].start, 4.0);
        assert_eq!(entries[1].text, "Next line second row");
    }

    #[test]
    fn broken_blocks_are_skipped() {
        let input = "1\n00:00:01,000 --> soon\nBad\n\n2\n00:00:02,000 --> 00:00:01,000\nBackwards\n\n3\r\n00:00:06,250 --> 00:00:07,000\r\nKept\r\n";
        let entries = parse_srt(input);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].index, 3);
        assert_eq!(entries[0].start, 6.25);
    }

    #[test]
    fn timestamps_pad_short_fractions() {
        assert_eq!(parse_timestamp("00:00:01,5").unwrap(), 1.5);
        assert_eq!(parse_timestamp("01:02:03").unwrap(), 3723.0);
        assert_eq!(parse_timestamp("00:00:02.123456").unwrap(), 2.123);
        assert!(parse_timestamp("02:03,000").is_err());
        assert!(parse_timestamp("00:0a:01,000").is_err());
    }

    #[test]
    fn missing_index_uses_block_position() {
        let input = "00:01:00.5 --> 00:01:02.000\nNo index here\n";
        let entries = parse_srt(input);
        assert_eq!(entries[0].index, 1);
        assert_eq!(entries[0].start, 60.5);
    }

    #[test]
    fn json_entries_are_normalised() {
        let entries = entries_from_value(json!({
            "entries": [
                {"start": "3.0", "end": 2.0, "text": "clamped end"},
                {"index": 9, "start": 1.0, "end": 2.0, "text": " first "},
                {"start": 4.0, "end": 5.0, "text": ""}
            ]
        }));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].index, 9);
        assert_eq!(entries[0].text, "first");
        assert_eq!(entries[1].index, 1);
        assert_eq!(entries[1].end, 3.0);
    }

    #[test]
    fn json_string_and_negative_indexes_are_kept() {
        let entries = entries_from_value(json!([
            {"index": "4", "start": 2.0, "end": 4.0, "text": "vaccine outcomes"},
            {"index": -1, "start": 5.0, "end": 6.0, "text": "hospital outcomes"}
        ]));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].index, 4);
        assert_eq!(entries[1].index, 2);
    }
}
