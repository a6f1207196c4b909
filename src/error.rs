//! The crate-wide error type (`spec.md` §7's Runtime category, plus the
//! aggregation `tryLexAndParse`'s `err` arm needs over the per-subsystem
//! error enums).

use thiserror::Error;

use crate::lexer::{LexError, MultilineError};
use crate::localization::{ErrorTemplate, Localizer};
use crate::parser::ParseError;

/// `LexError | ParseError | CommonError` as named in `spec.md` §6's output
/// contract for `tryLexAndParse`, folded into one tagged enum so the public
/// API returns a single `Result` type at the boundary (`spec.md` §9).
#[derive(Debug, Clone, Error)]
pub enum CommonError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Multiline(#[from] MultilineError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// An internal invariant was violated. Should never be observed for
    /// well-formed input; indicates a bug in this crate (`spec.md` §7).
    #[error("internal invariant violated: {0}")]
    Invariant(String),

    /// The caller's cancellation hook reported a cancellation request
    /// (`spec.md` §5).
    #[error("parsing was cancelled")]
    Cancellation,
}

impl CommonError {
    fn template(&self) -> ErrorTemplate {
        match self {
            CommonError::Lex(inner) => inner.template(),
            CommonError::Multiline(inner) => inner.template(),
            CommonError::Parse(inner) => inner.template(),
            CommonError::Invariant(_) => ErrorTemplate::Invariant,
            CommonError::Cancellation => ErrorTemplate::Cancellation,
        }
    }

    /// The user-facing message for this error under `locale`, via
    /// `localizer` (`spec.md` §7). Distinct from `Display`, which is the
    /// locale-less developer-facing rendering `thiserror` derives.
    pub fn localized_message(&self, localizer: &dyn Localizer, locale: &str) -> String {
        localizer.message(self.template(), locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::localization::EnglishLocalizer;
    use crate::position::Position;

    #[test]
    fn cancellation_localizes_to_the_cancellation_template() {
        let error = CommonError::Cancellation;
        assert_eq!(
            error.localized_message(&EnglishLocalizer, "en-US"),
            EnglishLocalizer.message(ErrorTemplate::Cancellation, "en-US"),
        );
    }

    #[test]
    fn parse_error_localizes_through_to_its_own_template() {
        let error = CommonError::Parse(ParseError::RecursionLimit {
            limit: 500,
            position: Position::new(0, 0),
        });
        assert_eq!(
            error.localized_message(&EnglishLocalizer, "en-US"),
            EnglishLocalizer.message(ErrorTemplate::RecursionLimit, "en-US"),
        );
    }
}
