//! Line decoder for operator commands.
//!
//! Grammar (one command per line):
//!
//! ```text
//! create := <interval> <keyword>(<id>) <text>      keyword must be "Message"
//! cancel := <word>: <keyword>(<id>)                word must be "Cancel"
//! ```
//!
//! A line is first scanned against the create shape, then against the cancel
//! shape. A line that has the right shape but the wrong keyword is an
//! [`DecodeError::IncorrectFormat`]; a line with neither shape is a
//! [`DecodeError::BadCommand`].

use klaxon_events::{AlarmId, Command};
use thiserror::Error;

use crate::cursor::Cursor;

/// Longest message kept, in characters; longer text is truncated.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 128;

const CREATE_KEYWORD: &str = "Message";
const CANCEL_WORD: &str = "Cancel";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("bad command")]
    BadCommand,

    #[error("incorrect format: unexpected keyword `{found}`")]
    IncorrectFormat { found: String },

    #[error("interval must be a positive 32-bit integer, got {0}")]
    InvalidInterval(i64),

    #[error("alarm id must be a non-negative 32-bit integer, got {0}")]
    InvalidId(i64),
}

impl DecodeError {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            DecodeError::BadCommand => "bad_command",
            DecodeError::IncorrectFormat { .. } => "incorrect_format",
            DecodeError::InvalidInterval(_) => "invalid_interval",
            DecodeError::InvalidId(_) => "invalid_id",
        }
    }
}

/// Decodes one input line.
///
/// Returns `Ok(None)` for blank lines, which callers skip silently.
pub fn decode(line: &str, max_message_len: usize) -> Result<Option<Command>, DecodeError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(None);
    }

    if let Some(create) = scan_create(line) {
        return create.into_command(max_message_len).map(Some);
    }
    if let Some(cancel) = scan_cancel(line) {
        return cancel.into_command().map(Some);
    }
    Err(DecodeError::BadCommand)
}

/// A line with the create shape, not yet validated.
struct CreateLine<'a> {
    interval: i64,
    keyword: &'a str,
    id: i64,
    text: &'a str,
}

/// A line with the cancel shape, not yet validated.
struct CancelLine<'a> {
    word: &'a str,
    keyword: &'a str,
    id: i64,
}

fn scan_create(line: &str) -> Option<CreateLine<'_>> {
    let mut cur = Cursor::new(line);
    let interval = cur.integer()?;
    cur.skip_whitespace();
    let keyword = cur.until('(')?;
    if !cur.literal('(') {
        return None;
    }
    let id = cur.integer()?;
    if !cur.literal(')') {
        return None;
    }
    let text = cur.rest().trim();
    if text.is_empty() {
        return None;
    }
    Some(CreateLine {
        interval,
        keyword,
        id,
        text,
    })
}

fn scan_cancel(line: &str) -> Option<CancelLine<'_>> {
    let mut cur = Cursor::new(line);
    let word = cur.until(':')?;
    if !cur.literal(':') {
        return None;
    }
    cur.skip_whitespace();
    let keyword = cur.until('(')?;
    if !cur.literal('(') {
        return None;
    }
    let id = cur.integer()?;
    if !cur.literal(')') || !cur.rest().trim().is_empty() {
        return None;
    }
    Some(CancelLine { word, keyword, id })
}

impl CreateLine<'_> {
    fn into_command(self, max_message_len: usize) -> Result<Command, DecodeError> {
        expect_keyword(self.keyword, CREATE_KEYWORD)?;
        let interval_seconds = u32::try_from(self.interval)
            .ok()
            .filter(|&n| n > 0)
            .ok_or(DecodeError::InvalidInterval(self.interval))?;
        Ok(Command::Create {
            id: alarm_id(self.id)?,
            interval_seconds,
            message: self.text.chars().take(max_message_len).collect(),
        })
    }
}

impl CancelLine<'_> {
    fn into_command(self) -> Result<Command, DecodeError> {
        expect_keyword(self.word.trim(), CANCEL_WORD)?;
        expect_keyword(self.keyword, CREATE_KEYWORD)?;
        Ok(Command::Cancel {
            id: alarm_id(self.id)?,
        })
    }
}

fn expect_keyword(found: &str, expected: &str) -> Result<(), DecodeError> {
    if found == expected {
        Ok(())
    } else {
        Err(DecodeError::IncorrectFormat {
            found: found.to_string(),
        })
    }
}

fn alarm_id(raw: i64) -> Result<AlarmId, DecodeError> {
    u32::try_from(raw)
        .map(AlarmId)
        .map_err(|_| DecodeError::InvalidId(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(line: &str) -> Result<Option<Command>, DecodeError> {
        decode(line, DEFAULT_MAX_MESSAGE_LEN)
    }

    #[test]
    fn decodes_create() {
        assert_eq!(
            dec("5 Message(12) take the bread out\n"),
            Ok(Some(Command::Create {
                id: AlarmId(12),
                interval_seconds: 5,
                message: "take the bread out".into(),
            }))
        );
    }

    #[test]
    fn decodes_cancel() {
        assert_eq!(
            dec("Cancel: Message(12)\n"),
            Ok(Some(Command::Cancel { id: AlarmId(12) }))
        );
        assert_eq!(
            dec("Cancel:Message(3)   "),
            Ok(Some(Command::Cancel { id: AlarmId(3) }))
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(dec("\n"), Ok(None));
        assert_eq!(dec("   \r\n"), Ok(None));
    }

    #[test]
    fn wrong_keyword_is_incorrect_format() {
        assert_eq!(
            dec("5 Massage(1) hi"),
            Err(DecodeError::IncorrectFormat {
                found: "Massage".into()
            })
        );
        assert_eq!(
            dec("Cancl: Message(1)"),
            Err(DecodeError::IncorrectFormat {
                found: "Cancl".into()
            })
        );
        assert_eq!(
            dec("Cancel: Msg(1)"),
            Err(DecodeError::IncorrectFormat { found: "Msg".into() })
        );
    }

    #[test]
    fn shapeless_lines_are_bad_commands() {
        for line in [
            "hello",
            "5 Message(1)",
            "5 Message 1 hi",
            "Cancel Message(1)",
            "Cancel: Message(1) extra",
            "Cancel: Message(x)",
        ] {
            assert_eq!(dec(line), Err(DecodeError::BadCommand), "line {line:?}");
        }
    }

    #[test]
    fn interval_must_be_positive() {
        assert_eq!(dec("0 Message(1) hi"), Err(DecodeError::InvalidInterval(0)));
        assert_eq!(dec("-3 Message(1) hi"), Err(DecodeError::InvalidInterval(-3)));
    }

    #[test]
    fn id_must_be_non_negative() {
        assert_eq!(dec("5 Message(-1) hi"), Err(DecodeError::InvalidId(-1)));
        assert_eq!(dec("Cancel: Message(-1)"), Err(DecodeError::InvalidId(-1)));
    }

    #[test]
    fn long_messages_are_truncated() {
        let long = "x".repeat(300);
        let Ok(Some(Command::Create { message, .. })) = dec(&format!("1 Message(1) {long}")) else {
            panic!("expected a create");
        };
        assert_eq!(message.chars().count(), DEFAULT_MAX_MESSAGE_LEN);

        let Ok(Some(Command::Create { message, .. })) = decode("1 Message(1) abcdef", 3) else {
            panic!("expected a create");
        };
        assert_eq!(message, "abc");
    }
}
