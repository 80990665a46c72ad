//! Line Tokenizer
//!
//! Splits a cell into logical lines, each tagged with its nesting depth
//! and classified by shape. Keywords are not checked here; the step parser
//! maps them to step kinds.

use log::debug;

use super::error::ParseError;

/// Shape of one non-blank cell line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    /// `running: Easy Recovery`
    Header { workout_type: String, name: String },

    /// `- run: 3:00 @z4; hold form`
    Step {
        keyword: String,
        duration: String,
        target: Option<String>,
        note: Option<String>,
    },

    /// `- repeat: 5`
    RepeatOpen { count: u32, note: Option<String> },

    /// `- note: Strong but controlled effort`
    Note { text: String },
}

/// A classified line with its position and depth.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalLine {
    /// 1-based line number in the raw cell text
    pub number: usize,
    pub depth: usize,
    /// The line as written, trailing whitespace removed
    pub raw: String,
    pub kind: LineKind,
}

/// Computes the nesting depth from leading whitespace.
///
/// A tab counts as one full level.
pub fn indent_depth(line: &str, indent_width: usize) -> usize {
    let width = indent_width.max(1);
    let columns: usize = line
        .chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { width } else { 1 })
        .sum();
    columns / width
}

/// Splits off the text after the first `;` as an inline note.
fn split_note(text: &str) -> (&str, Option<String>) {
    match text.split_once(';') {
        Some((head, note)) => {
            let note = note.trim();
            (head.trim(), (!note.is_empty()).then(|| note.to_string()))
        }
        None => (text.trim(), None),
    }
}

/// Removes one pair of matching surrounding quotes.
fn strip_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

fn classify_header(number: usize, line: &str) -> Result<LineKind, ParseError> {
    let content = line.trim();

    if content.starts_with('-') {
        return Err(ParseError::malformed(
            number,
            line,
            "cell must start with a 'type: name' header",
        ));
    }

    let (workout_type, name) = content.split_once(':').ok_or_else(|| {
        ParseError::malformed(number, line, "header needs a ':' between type and name")
    })?;

    Ok(LineKind::Header {
        workout_type: workout_type.trim().to_string(),
        name: name.trim().to_string(),
    })
}

fn classify_body(number: usize, line: &str) -> Result<LineKind, ParseError> {
    let content = line.trim();

    let Some(rest) = content.strip_prefix('-') else {
        let reason = if content.contains(':') {
            "header is only allowed on the first line"
        } else {
            "expected '- keyword: value'"
        };
        return Err(ParseError::malformed(number, line, reason));
    };

    let (keyword, value) = rest
        .split_once(':')
        .ok_or_else(|| ParseError::malformed(number, line, "missing ':' after keyword"))?;

    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return Err(ParseError::malformed(number, line, "missing keyword"));
    }

    match keyword.as_str() {
        "note" => {
            let text = strip_quotes(value.trim()).trim();
            if text.is_empty() {
                return Err(ParseError::malformed(number, line, "note has no text"));
            }
            Ok(LineKind::Note {
                text: text.to_string(),
            })
        }
        "repeat" => {
            let (count, note) = split_note(value);
            let count = count
                .parse::<u32>()
                .ok()
                .filter(|c| *c > 0)
                .ok_or_else(|| {
                    ParseError::malformed(number, line, "repeat count must be a positive integer")
                })?;
            Ok(LineKind::RepeatOpen { count, note })
        }
        _ => {
            let (body, note) = split_note(value);
            let (duration, target) = match body.split_once('@') {
                Some((duration, target)) => (duration.trim(), Some(target.trim().to_string())),
                None => (body, None),
            };
            Ok(LineKind::Step {
                keyword,
                duration: duration.to_string(),
                target,
                note,
            })
        }
    }
}

/// Tokenizes a cell into logical lines.
///
/// The first non-blank line must be the header; blank lines are dropped.
/// Any line matching no known shape fails the whole cell.
pub fn tokenize(text: &str, indent_width: usize) -> Result<Vec<LogicalLine>, ParseError> {
    let mut lines = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let raw = raw.trim_end();
        if raw.trim().is_empty() {
            continue;
        }

        let number = index + 1;
        let kind = if lines.is_empty() {
            classify_header(number, raw)?
        } else {
            classify_body(number, raw)?
        };

        let depth = indent_depth(raw, indent_width);
        debug!("line {} depth {}: {:?}", number, depth, kind);

        lines.push(LogicalLine {
            number,
            depth,
            raw: raw.to_string(),
            kind,
        });
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_depth() {
        assert_eq!(indent_depth("- warmup: 15:00", 2), 0);
        assert_eq!(indent_depth("  - run: 2:00", 2), 1);
        assert_eq!(indent_depth("    - run: 2:00", 2), 2);
        assert_eq!(indent_depth("\t- run: 2:00", 2), 1);
        assert_eq!(indent_depth("   - run: 2:00", 2), 1);
        assert_eq!(indent_depth("    - run: 2:00", 4), 1);
    }

    #[test]
    fn test_header_and_step() {
        let lines = tokenize("running: Easy Run\n- run: 30:00 @z1", 2).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0].kind,
            LineKind::Header {
                workout_type: "running".to_string(),
                name: "Easy Run".to_string()
            }
        );
        assert_eq!(
            lines[1].kind,
            LineKind::Step {
                keyword: "run".to_string(),
                duration: "30:00".to_string(),
                target: Some("z1".to_string()),
                note: None
            }
        );
    }

    #[test]
    fn test_step_with_inline_note() {
        let lines = tokenize("running: X\n- Warmup: 15:00 @z2; Easy pace, loosen up", 2).unwrap();

        assert_eq!(
            lines[1].kind,
            LineKind::Step {
                keyword: "warmup".to_string(),
                duration: "15:00".to_string(),
                target: Some("z2".to_string()),
                note: Some("Easy pace, loosen up".to_string())
            }
        );
    }

    #[test]
    fn test_inline_note_keeps_later_semicolons_and_at_signs() {
        let lines = tokenize("running: X\n- run: 5km; hold @ 4:30; no faster", 2).unwrap();

        match &lines[1].kind {
            LineKind::Step { duration, target, note, .. } => {
                assert_eq!(duration, "5km");
                assert!(target.is_none());
                assert_eq!(note.as_deref(), Some("hold @ 4:30; no faster"));
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_repeat_and_note_lines() {
        let text = "running: X\n- repeat: 5\n  - run: 3:00\n  - note: \"Strong effort\"";
        let lines = tokenize(text, 2).unwrap();

        assert_eq!(lines[1].kind, LineKind::RepeatOpen { count: 5, note: None });
        assert_eq!(lines[2].depth, 1);
        assert_eq!(
            lines[3].kind,
            LineKind::Note {
                text: "Strong effort".to_string()
            }
        );
    }

    #[test]
    fn test_blank_lines_dropped_but_numbered() {
        let lines = tokenize("\nrunning: X\n\n   \n- run: 10:00\n", 2).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].number, 2);
        assert_eq!(lines[1].number, 5);
    }

    #[test]
    fn test_missing_header() {
        let err = tokenize("- run: 46km", 2).unwrap_err();
        assert!(matches!(err, ParseError::MalformedLine { line: 1, .. }));

        let err = tokenize("Easy Run", 2).unwrap_err();
        assert!(matches!(err, ParseError::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn test_second_header_is_malformed() {
        let err = tokenize("running: A\nrunning: B", 2).unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedLine {
                line: 2,
                text: "running: B".to_string(),
                reason: "header is only allowed on the first line"
            }
        );
    }

    #[test]
    fn test_malformed_body_lines() {
        for body in ["- run 30:00", "-: 30:00", "just text", "- note:", "- repeat: x", "- repeat: 0"] {
            let text = format!("running: X\n{}", body);
            let err = tokenize(&text, 2).unwrap_err();
            assert!(
                matches!(err, ParseError::MalformedLine { line: 2, .. }),
                "{}: {:?}",
                body,
                err
            );
        }
    }

    #[test]
    fn test_repeat_inline_note() {
        let lines = tokenize("running: X\n- repeat: 3; hill reps", 2).unwrap();
        assert_eq!(
            lines[1].kind,
            LineKind::RepeatOpen {
                count: 3,
                note: Some("hill reps".to_string())
            }
        );
    }
}
