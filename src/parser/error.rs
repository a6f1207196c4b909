//! Parse error taxonomy (`spec.md` §4.3, §7). Each variant carries the
//! offending token's data and its absolute position so a caller can derive
//! the grapheme column via [`crate::position::column_number`].

use thiserror::Error;

use crate::lexer::TokenKind;
use crate::localization::ErrorTemplate;
use crate::position::Position;

/// The kind of comma-separated-value continuation that was expected
/// (`spec.md` §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvContinuationKind {
    LetExpression,
    DanglingComma,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected token kind {expected:?}, got {actual:?} ({actual_data:?}) at {position:?}")]
    ExpectedTokenKind {
        expected: TokenKind,
        actual: Option<TokenKind>,
        actual_data: String,
        position: Position,
    },

    #[error("expected one of {expected:?}, got {actual:?} ({actual_data:?}) at {position:?}")]
    ExpectedAnyTokenKind {
        expected: Vec<TokenKind>,
        actual: Option<TokenKind>,
        actual_data: String,
        position: Position,
    },

    #[error("expected a {kind:?} continuation at {position:?}")]
    ExpectedCsvContinuation {
        kind: CsvContinuationKind,
        position: Position,
    },

    #[error("unterminated parentheses starting at {start:?}")]
    UnterminatedParentheses { start: Position },

    #[error("unterminated bracket starting at {start:?}")]
    UnterminatedBracket { start: Position },

    #[error("unused tokens remain starting at {position:?}")]
    UnusedTokensRemain { position: Position },

    #[error("{actual_data:?} at {position:?} is not a valid primitive type")]
    InvalidPrimitiveType { actual_data: String, position: Position },

    /// The caller's cancellation hook reported a cancellation request,
    /// observed at a production boundary (`spec.md` §5).
    #[error("parsing was cancelled at {position:?}")]
    Cancelled { position: Position },

    /// A production nested deeper than `ParserSettings::recursion_limit`
    /// allows, observed at the `expression` production boundary (`spec.md`
    /// §6's recursion-limit setting).
    #[error("recursion limit ({limit}) exceeded at {position:?}")]
    RecursionLimit { limit: usize, position: Position },
}

impl ParseError {
    pub fn template(&self) -> ErrorTemplate {
        match self {
            ParseError::ExpectedTokenKind { .. } => ErrorTemplate::ExpectedTokenKind,
            ParseError::ExpectedAnyTokenKind { .. } => ErrorTemplate::ExpectedAnyTokenKind,
            ParseError::ExpectedCsvContinuation { .. } => ErrorTemplate::ExpectedCsvContinuation,
            ParseError::UnterminatedParentheses { .. } => ErrorTemplate::UnterminatedParentheses,
            ParseError::UnterminatedBracket { .. } => ErrorTemplate::UnterminatedBracket,
            ParseError::UnusedTokensRemain { .. } => ErrorTemplate::UnusedTokensRemain,
            ParseError::InvalidPrimitiveType { .. } => ErrorTemplate::InvalidPrimitiveType,
            ParseError::Cancelled { .. } => ErrorTemplate::Cancellation,
            ParseError::RecursionLimit { .. } => ErrorTemplate::RecursionLimit,
        }
    }
}
