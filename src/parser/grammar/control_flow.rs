//! `IfExpression`, `ErrorHandlingExpression` (`spec.md` GLOSSARY
//! "OtherwiseExpression").

use crate::lexer::TokenKind;
use crate::parser::error::ParseError;
use crate::parser::grammar::{bump_constant, expression};
use crate::parser::node::NodeKind;
use crate::parser::state::ParserState;

/// `IfExpression: "if" Expression "then" Expression "else" Expression`.
pub(crate) fn if_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::IfExpression);
    bump_constant(parser, TokenKind::If)?;
    expression(parser)?;
    bump_constant(parser, TokenKind::Then)?;
    expression(parser)?;
    bump_constant(parser, TokenKind::Else)?;
    expression(parser)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::IfExpression, range, false);
    Ok(id)
}

/// `OtherwiseExpression: "otherwise" Expression`.
fn otherwise_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::OtherwiseExpression);
    bump_constant(parser, TokenKind::Otherwise)?;
    expression(parser)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::OtherwiseExpression, range, false);
    Ok(id)
}

/// `ErrorHandlingExpression: "try" Expression OtherwiseExpression?`.
pub(crate) fn error_handling_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::ErrorHandlingExpression);
    bump_constant(parser, TokenKind::Try)?;
    expression(parser)?;
    if parser.is_on_token_kind(TokenKind::Otherwise) {
        otherwise_expression(parser)?;
    }
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::ErrorHandlingExpression, range, false);
    Ok(id)
}
