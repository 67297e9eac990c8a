//! JSON-lines landmark streams: one frame per line, `null` for no detection.

use super::models::LandmarkFrame;
use anyhow::{Context, Result};
use std::io::BufRead;

/// Reads every frame from a JSON-lines stream. Blank lines are skipped.
pub fn read_jsonl<R: BufRead>(reader: R) -> Result<Vec<LandmarkFrame>> {
    let mut frames = Vec::new();
    for (line_index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_index + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let frame: LandmarkFrame = serde_json::from_str(trimmed)
            .with_context(|| format!("Invalid landmark frame on line {}", line_index + 1))?;
        frames.push(frame);
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_frames_and_skips_blank_lines() {
        let input = "[{\"x\": 0.1, \"y\": 0.2}]\n\nnull\n  \n[]\n";
        let frames = read_jsonl(input.as_bytes()).unwrap();
        assert_eq!(frames.len(), 3);
        assert!(frames[0].is_detected());
        assert_eq!(frames[1], LandmarkFrame::NoDetection);
        assert_eq!(frames[2], LandmarkFrame::Detected(vec![]));
    }

    #[test]
    fn reports_line_number_on_parse_failure() {
        let input = "null\n{not json}\n";
        let err = read_jsonl(input.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
