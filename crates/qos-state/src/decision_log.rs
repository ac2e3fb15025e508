//! Decision-engine CSV log.
//!
//! Rows are returned verbatim as strings, header included. Quoted fields may
//! contain commas, doubled quotes and line breaks; a blank line is an empty
//! row.

use std::io::ErrorKind;
use std::path::Path;

use crate::StateError;

/// Read every row of `path`. A missing file has no rows.
pub fn read_decision_log(path: &Path) -> Result<Vec<Vec<String>>, StateError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(parse_csv(&content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(source) => Err(StateError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Parse a single unterminated CSV record.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    parse_csv(line).into_iter().next().unwrap_or_default()
}

/// Parse CSV text into rows.
pub fn parse_csv(content: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    // Set once the current record has any content, so that a line holding
    // nothing produces an empty row instead of `[""]`.
    let mut started = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                other => field.push(other),
            }
            continue;
        }
        match c {
            '"' => {
                in_quotes = true;
                started = true;
            }
            ',' => {
                row.push(std::mem::take(&mut field));
                started = true;
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                if started {
                    row.push(std::mem::take(&mut field));
                }
                rows.push(std::mem::take(&mut row));
                started = false;
            }
            other => {
                field.push(other);
                started = true;
            }
        }
    }

    if started {
        row.push(field);
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_rows() {
        let rows = parse_csv("time,flow,action\n10:00:01,video,prioritize\n");
        assert_eq!(
            rows,
            vec![
                vec!["time", "flow", "action"],
                vec!["10:00:01", "video", "prioritize"],
            ]
        );
    }

    #[test]
    fn quoted_fields() {
        let rows = parse_csv("a,\"b,c\",\"say \"\"hi\"\"\"\r\n");
        assert_eq!(rows, vec![vec!["a", "b,c", "say \"hi\""]]);
    }

    #[test]
    fn quoted_newline_stays_in_field() {
        let rows = parse_csv("note\n\"line one\nline two\"\n");
        assert_eq!(rows, vec![vec!["note".to_string()], vec!["line one\nline two".to_string()]]);
    }

    #[test]
    fn blank_line_is_empty_row() {
        let rows = parse_csv("a,b\n\n1,2");
        assert_eq!(rows.len(), 3);
        assert!(rows[1].is_empty());
        assert_eq!(rows[2], vec!["1", "2"]);
    }

    #[test]
    fn trailing_empty_field_kept() {
        assert_eq!(parse_csv_line("a,b,"), vec!["a", "b", ""]);
        assert!(parse_csv_line("").is_empty());
    }
}
