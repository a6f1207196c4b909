//! Localization seam (ambient, `SPEC_FULL.md` §6). Message *content* is an
//! external collaborator (`spec.md` §1); this module only defines the
//! template identifiers and a pure lookup, mirroring how `apollo-parser`
//! leaves terminal rendering to `miette`/`annotate-snippets` examples
//! rather than baking it into `Error` itself.

/// One entry per representative error kind named in `spec.md` §7's error
/// taxonomy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorTemplate {
    UnexpectedRead,
    UnexpectedEof,
    BadLineTerminator,
    BadRange,
    UnterminatedString,
    UnterminatedQuotedIdentifier,
    UnterminatedBlockComment,
    ExpectedTokenKind,
    ExpectedAnyTokenKind,
    ExpectedCsvContinuation,
    UnterminatedParentheses,
    UnterminatedBracket,
    UnusedTokensRemain,
    InvalidPrimitiveType,
    Invariant,
    Cancellation,
    RecursionLimit,
}

/// A pure lookup from `(template, locale)` to a user-facing message. A
/// caller formats structured fields (offending token, grapheme column,
/// expected-kind set) into this message however it likes; the crate's own
/// error `Display` impls (`thiserror`-derived) are the locale-less
/// developer-facing fallback.
pub trait Localizer {
    fn message(&self, template: ErrorTemplate, locale: &str) -> String;
}

/// The one bundled implementor, covering `en-US`. Unrecognized locales fall
/// back to the same English text rather than failing -- this crate ships
/// no other locale's templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLocalizer;

impl Localizer for EnglishLocalizer {
    fn message(&self, template: ErrorTemplate, _locale: &str) -> String {
        match template {
            ErrorTemplate::UnexpectedRead => "unexpected character".to_string(),
            ErrorTemplate::UnexpectedEof => "unexpected end of input".to_string(),
            ErrorTemplate::BadLineTerminator => "unrecognized line terminator".to_string(),
            ErrorTemplate::BadRange => "the given range is not valid for this document".to_string(),
            ErrorTemplate::UnterminatedString => "unterminated string literal".to_string(),
            ErrorTemplate::UnterminatedQuotedIdentifier => {
                "unterminated quoted identifier".to_string()
            }
            ErrorTemplate::UnterminatedBlockComment => "unterminated block comment".to_string(),
            ErrorTemplate::ExpectedTokenKind => "unexpected token".to_string(),
            ErrorTemplate::ExpectedAnyTokenKind => "unexpected token".to_string(),
            ErrorTemplate::ExpectedCsvContinuation => {
                "expected another comma-separated item or a closing delimiter".to_string()
            }
            ErrorTemplate::UnterminatedParentheses => "unterminated parentheses".to_string(),
            ErrorTemplate::UnterminatedBracket => "unterminated bracket".to_string(),
            ErrorTemplate::UnusedTokensRemain => {
                "the parse completed but input remains unconsumed".to_string()
            }
            ErrorTemplate::InvalidPrimitiveType => "not a valid primitive type".to_string(),
            ErrorTemplate::Invariant => {
                "internal error: an invariant was violated, please file a bug".to_string()
            }
            ErrorTemplate::Cancellation => "parsing was cancelled".to_string(),
            ErrorTemplate::RecursionLimit => {
                "the expression nests too deeply to parse".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_locale_falls_back_to_english() {
        let localizer = EnglishLocalizer;
        assert_eq!(
            localizer.message(ErrorTemplate::UnterminatedString, "fr-FR"),
            localizer.message(ErrorTemplate::UnterminatedString, "en-US"),
        );
    }
}
