//! `Identifier`, `GeneralizedIdentifier`, `IdentifierExpression`
//! (`spec.md` §6, GLOSSARY "Generalized identifier").

use crate::lexer::TokenKind;
use crate::parser::error::ParseError;
use crate::parser::grammar::bump_constant;
use crate::parser::node::NodeKind;
use crate::parser::state::ParserState;

pub(crate) fn identifier(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::Identifier);
    parser.expect_token_kind(TokenKind::Identifier)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::Identifier, range, true);
    Ok(id)
}

/// A generalized identifier may start with any of the keyword/hash-keyword
/// forms named in `spec.md` §6 in addition to a plain identifier, since it
/// is used on the key side of a record literal where `and`, `type`, etc.
/// are valid field names.
pub(crate) fn generalized_identifier(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::GeneralizedIdentifier);
    if !parser.is_on_generalized_identifier_start() {
        return Err(ParseError::ExpectedAnyTokenKind {
            expected: vec![TokenKind::Identifier],
            actual: parser.maybe_current_token_kind(),
            actual_data: parser
                .maybe_current_token()
                .map(|t| t.data.clone())
                .unwrap_or_default(),
            position: parser.current_position(),
        });
    }
    parser.expect_any_token_kind(&generalized_identifier_start_kinds())?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::GeneralizedIdentifier, range, true);
    Ok(id)
}

fn generalized_identifier_start_kinds() -> Vec<TokenKind> {
    vec![
        TokenKind::Identifier,
        TokenKind::And,
        TokenKind::As,
        TokenKind::Each,
        TokenKind::Else,
        TokenKind::Error,
        TokenKind::False,
        TokenKind::If,
        TokenKind::In,
        TokenKind::Is,
        TokenKind::Let,
        TokenKind::Meta,
        TokenKind::Not,
        TokenKind::Or,
        TokenKind::Otherwise,
        TokenKind::Section,
        TokenKind::Shared,
        TokenKind::Then,
        TokenKind::True,
        TokenKind::Try,
        TokenKind::Type,
        TokenKind::HashBinary,
        TokenKind::HashDate,
        TokenKind::HashDateTime,
        TokenKind::HashDateTimeZone,
        TokenKind::HashDuration,
        TokenKind::HashInfinity,
        TokenKind::HashNan,
        TokenKind::HashSections,
        TokenKind::HashShared,
        TokenKind::HashTable,
        TokenKind::HashTime,
    ]
}

/// `IdentifierExpression: "@"? Identifier`.
pub(crate) fn identifier_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::IdentifierExpression);
    if parser.is_on_token_kind(TokenKind::AtSign) {
        bump_constant(parser, TokenKind::AtSign)?;
    }
    identifier(parser)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::IdentifierExpression, range, false);
    Ok(id)
}
