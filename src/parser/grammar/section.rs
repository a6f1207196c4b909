//! `SectionDocument`, `SectionMember`. A document built from `section ...;`
//! plus zero or more `name = expression;` members is the other top-level
//! form an M document may take besides a single expression (`spec.md` §4.2's
//! incremental-tokenization discussion assumes a document is either shape).

use crate::lexer::TokenKind;
use crate::parser::error::ParseError;
use crate::parser::grammar::identifier::identifier;
use crate::parser::grammar::let_each_function::identifier_paired_expression;
use crate::parser::grammar::bump_constant;
use crate::parser::node::NodeKind;
use crate::parser::state::ParserState;

/// `SectionMember: "shared"? IdentifierPairedExpression ";"`.
fn section_member(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::SectionMember);
    if parser.is_on_token_kind(TokenKind::Shared) {
        bump_constant(parser, TokenKind::Shared)?;
    }
    identifier_paired_expression(parser)?;
    bump_constant(parser, TokenKind::Semicolon)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::SectionMember, range, false);
    Ok(id)
}

/// `SectionDocument: "section" Identifier? ";" SectionMember*`.
pub(crate) fn section_document(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::SectionDocument);
    bump_constant(parser, TokenKind::Section)?;
    if parser.is_on_token_kind(TokenKind::Identifier) {
        identifier(parser)?;
    }
    bump_constant(parser, TokenKind::Semicolon)?;
    while parser.is_on_token_kind(TokenKind::Shared) || parser.is_on_token_kind(TokenKind::Identifier)
    {
        section_member(parser)?;
    }
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::SectionDocument, range, false);
    Ok(id)
}
