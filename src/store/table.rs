//! Minimal reader for the comma-delimited tables the catalog ships as.
//!
//! Rules: first non-blank line is a header and is skipped; fields are trimmed; a field may be
//! wrapped in double quotes, inside which `""` is a literal quote and commas are kept.
//! Quoted fields cannot span lines.

use std::io::BufRead;

use thiserror::Error;

const DELIMITER: char = ',';
const QUOTE: char = '"';
const BOM: char = '\u{feff}';

/// One data row with its 1-based line number in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub line: usize,
    pub fields: Vec<String>,
}

#[derive(Error, Debug, PartialEq)]
pub enum LineError {
    #[error("unterminated quoted field")]
    UnterminatedQuote,
    #[error("unexpected text after closing quote")]
    TrailingText,
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {kind}")]
    Malformed { line: usize, kind: LineError },
}

/// Read all data rows (header excluded), stopping at the first malformed line.
pub fn read_rows<R: BufRead>(reader: R) -> Result<Vec<Row>, TableError> {
    let mut rows = Vec::new();
    let mut seen_header = false;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        let text = if i == 0 { line.trim_start_matches(BOM) } else { line.as_str() };

        if text.trim().is_empty() {
            continue;
        }
        if !seen_header {
            seen_header = true;
            continue;
        }

        match split_line(text) {
            Ok(fields) => rows.push(Row { line: line_no, fields }),
            Err(kind) => return Err(TableError::Malformed { line: line_no, kind }),
        }
    }

    Ok(rows)
}

/// Split one line into trimmed fields.
pub fn split_line(line: &str) -> Result<Vec<String>, LineError> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        // Skip leading whitespace of the field
        while chars.peek().is_some_and(|c| *c == ' ' || *c == '\t') {
            chars.next();
        }

        let mut field = String::new();
        if chars.peek() == Some(&QUOTE) {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                if c == QUOTE {
                    if chars.peek() == Some(&QUOTE) {
                        field.push(QUOTE);
                        chars.next();
                    } else {
                        closed = true;
                        break;
                    }
                } else {
                    field.push(c);
                }
            }
            if !closed {
                return Err(LineError::UnterminatedQuote);
            }
            // Only whitespace may follow the closing quote
            while let Some(&c) = chars.peek() {
                if c == DELIMITER {
                    break;
                }
                if !c.is_whitespace() {
                    return Err(LineError::TrailingText);
                }
                chars.next();
            }
            fields.push(field.trim().to_string());
        } else {
            while let Some(&c) = chars.peek() {
                if c == DELIMITER {
                    break;
                }
                field.push(c);
                chars.next();
            }
            fields.push(field.trim().to_string());
        }

        match chars.next() {
            Some(DELIMITER) => continue,
            _ => break,
        }
    }

    Ok(fields)
}
