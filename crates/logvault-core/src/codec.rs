//! Line codec for persisted records
//!
//! One record is one line:
//!
//! ```text
//! [date="2024-01-01T00:00:00Z" id="42" location="src/main.rs:10"]:"message text"
//! ```
//!
//! Inside quoted values `\` is written as `\\`, `"` as `\"`, LF as `\n` and
//! CR as `\r`, so a record never spans more than one line. The level is not
//! part of the line; it comes from the partition the line was read from.
//!
//! Decoding is a single forward pass over the characters. Values are read up
//! to their closing unescaped quote, so a location containing `"]:"` or an
//! escaped quote cannot shift the location/message boundary.

use crate::error::{LogVaultError, Result};
use crate::types::{Level, Record, RecordId};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::iter::Peekable;
use std::str::Chars;

/// Timestamp layout used inside the `date` value (UTC, second precision).
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const KEYS: [&str; 3] = ["date", "id", "location"];

/// Encode a record as one line, without the trailing newline.
pub fn encode_line(record: &Record) -> String {
    let mut line = String::with_capacity(64 + record.location.len() + record.message.len());
    line.push_str("[date=\"");
    line.push_str(&record.created_at.format(DATE_FORMAT).to_string());
    line.push_str("\" id=\"");
    line.push_str(&record.id.to_string());
    line.push_str("\" location=\"");
    escape_into(&record.location, &mut line);
    line.push_str("\"]:\"");
    escape_into(&record.message, &mut line);
    line.push('"');
    line
}

/// Encode a record as one newline-terminated line, ready to append.
pub fn encode(record: &Record) -> String {
    let mut line = encode_line(record);
    line.push('\n');
    line
}

/// Decode one line (without its newline) read from a partition of `level`.
pub fn decode(line: &str, level: Level) -> Result<Record> {
    let mut cursor = Cursor::new(line);

    cursor.expect('[')?;
    let mut values: Vec<String> = Vec::with_capacity(KEYS.len());
    for (i, expected) in KEYS.iter().enumerate() {
        if i > 0 {
            cursor.require_spaces()?;
        }
        let key = cursor.key()?;
        if key != *expected {
            return Err(LogVaultError::malformed(format!(
                "expected key '{}' at position {}, found '{}'",
                expected,
                i + 1,
                key
            )));
        }
        cursor.expect('=')?;
        values.push(cursor.quoted()?);
    }
    cursor.skip_spaces();
    cursor.expect(']')?;
    cursor.expect(':')?;
    let message = cursor.quoted()?;
    cursor.end()?;

    let location = values.pop().unwrap_or_default();
    let id_text = values.pop().unwrap_or_default();
    let date_text = values.pop().unwrap_or_default();

    let created_at = parse_date(&date_text)?;
    let id: RecordId = id_text
        .parse()
        .map_err(|_| LogVaultError::malformed(format!("invalid id '{}'", id_text)))?;

    Ok(Record {
        created_at,
        id,
        level,
        location,
        message,
    })
}

/// Parse a timestamp written with [`DATE_FORMAT`].
pub fn parse_date(text: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| LogVaultError::malformed(format!("invalid date '{}': {}", text, e)))
}

fn escape_into(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
}

struct Cursor<'a> {
    chars: Peekable<Chars<'a>>,
    // Character offset, reported in errors.
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            chars: line.chars().peekable(),
            pos: 0,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn expect(&mut self, want: char) -> Result<()> {
        match self.bump() {
            Some(ch) if ch == want => Ok(()),
            Some(ch) => Err(LogVaultError::malformed(format!(
                "expected '{}' at offset {}, found '{}'",
                want,
                self.pos - 1,
                ch
            ))),
            None => Err(LogVaultError::malformed(format!(
                "expected '{}' at offset {}, found end of line",
                want, self.pos
            ))),
        }
    }

    fn skip_spaces(&mut self) -> usize {
        let mut skipped = 0;
        while self.chars.peek() == Some(&' ') {
            self.bump();
            skipped += 1;
        }
        skipped
    }

    fn require_spaces(&mut self) -> Result<()> {
        if self.skip_spaces() == 0 {
            return Err(LogVaultError::malformed(format!(
                "expected space before key at offset {}",
                self.pos
            )));
        }
        Ok(())
    }

    fn key(&mut self) -> Result<String> {
        let mut key = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                key.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        if key.is_empty() {
            return Err(LogVaultError::malformed(format!(
                "expected key at offset {}",
                self.pos
            )));
        }
        Ok(key)
    }

    fn quoted(&mut self) -> Result<String> {
        self.expect('"')?;
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(value),
                Some('\\') => match self.bump() {
                    Some('\\') => value.push('\\'),
                    Some('"') => value.push('"'),
                    Some('n') => value.push('\n'),
                    Some('r') => value.push('\r'),
                    Some(other) => {
                        return Err(LogVaultError::malformed(format!(
                            "unknown escape '\\{}' at offset {}",
                            other,
                            self.pos - 1
                        )))
                    }
                    None => {
                        return Err(LogVaultError::malformed(
                            "line ends inside an escape sequence",
                        ))
                    }
                },
                Some(ch) => value.push(ch),
                None => return Err(LogVaultError::malformed("unterminated quoted value")),
            }
        }
    }

    fn end(&mut self) -> Result<()> {
        match self.bump() {
            None => Ok(()),
            Some(_) => Err(LogVaultError::malformed(format!(
                "unexpected trailing characters at offset {}",
                self.pos - 1
            ))),
        }
    }
}
