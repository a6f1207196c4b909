//! Lexical error taxonomy (`spec.md` §7): line-isolated errors captured
//! into [`crate::lexer::line::Line::maybe_error`], and multi-line errors
//! that fail [`crate::lexer::snapshot::LexerSnapshot::try_from`].

use crate::localization::ErrorTemplate;
use crate::position::Position;
use thiserror::Error;

/// A line-level lexical error. Never fails `LexerState::state_from` --
/// it is captured per-line and surfaced through
/// [`crate::lexer::state::ErrorLineMap`] instead (`spec.md` §4.1, §7).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character {data:?} at line {line_number}, column {column}")]
    UnexpectedRead {
        line_number: u32,
        data: String,
        column: u32,
    },
    #[error("unexpected end of input on line {line_number}")]
    UnexpectedEof { line_number: u32 },
    #[error("unrecognized line terminator on line {line_number}")]
    BadLineTerminator { line_number: u32 },
    #[error("range {start:?}..{end:?} is not valid for this document")]
    BadRange { start: Position, end: Position },
}

impl LexError {
    /// The locale-independent template this error renders under
    /// (`spec.md` §7, [`crate::localization`]).
    pub fn template(&self) -> ErrorTemplate {
        match self {
            LexError::UnexpectedRead { .. } => ErrorTemplate::UnexpectedRead,
            LexError::UnexpectedEof { .. } => ErrorTemplate::UnexpectedEof,
            LexError::BadLineTerminator { .. } => ErrorTemplate::BadLineTerminator,
            LexError::BadRange { .. } => ErrorTemplate::BadRange,
        }
    }
}

/// A multi-line lexical error: some begin token never found its matching
/// end token anywhere in the rest of the document (`spec.md` §4.2).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MultilineError {
    #[error("unterminated block comment starting at {start:?}")]
    UnterminatedBlockComment { start: Position },
    #[error("unterminated quoted identifier starting at {start:?}")]
    UnterminatedQuotedIdentifier { start: Position },
    #[error("unterminated string literal starting at {start:?}")]
    UnterminatedString { start: Position },
}

impl MultilineError {
    pub fn template(&self) -> ErrorTemplate {
        match self {
            MultilineError::UnterminatedBlockComment { .. } => {
                ErrorTemplate::UnterminatedBlockComment
            }
            MultilineError::UnterminatedQuotedIdentifier { .. } => {
                ErrorTemplate::UnterminatedQuotedIdentifier
            }
            MultilineError::UnterminatedString { .. } => ErrorTemplate::UnterminatedString,
        }
    }
}
