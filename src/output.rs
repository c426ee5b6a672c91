use crate::error::Result;
use serde::Serialize;
use std::io::{self, Write};

/// Writes `value` as two-space indented JSON followed by a newline.
/// serde_json never HTML-escapes, so `&`, `<` and `>` in titles pass through.
pub fn write_json<W: Write, T: Serialize>(mut writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    write_json(io::stdout().lock(), value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FailureReport, GitHub, PullRequest, Report, Window};
    use chrono::{TimeZone, Utc};

    #[test]
    fn html_characters_are_not_escaped() {
        let now = Utc.with_ymd_and_hms(2026, 2, 18, 14, 0, 0).unwrap();
        let github = GitHub {
            prs_merged: vec![PullRequest {
                repo: "misty-step/factory".into(),
                number: 1,
                title: "Use <T> & friends".into(),
                url: "https://github.com/misty-step/factory/pull/1".into(),
                author: None,
            }],
            ..GitHub::default()
        };
        let report = Report::new(now, &Window::ending_at(now, 24), github);

        let mut buf = Vec::new();
        write_json(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains(r#""title": "Use <T> & friends""#));
        assert!(!text.contains("\\u003c"));
    }

    #[test]
    fn output_is_indented_and_newline_terminated() {
        let mut buf = Vec::new();
        write_json(&mut buf, &FailureReport::new("org flag is required")).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("{\n  \"generatedAt\": "));
        assert!(text.ends_with("}\n"));
    }
}
