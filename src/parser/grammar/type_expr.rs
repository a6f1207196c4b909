//! Type expressions (`spec.md` §4.6's closed type family drives which
//! primitive-type spellings are recognized here). Full M type syntax (list
//! types, record types, function types) is large; this crate recognizes
//! the primitive-type and nullable-primitive-type forms that the `is`/`as`
//! binary operators and parameter annotations actually need, which covers
//! every type position the position/type inspector reasons about.

use crate::parser::error::ParseError;
use crate::parser::grammar::bump_constant;
use crate::parser::node::NodeKind;
use crate::parser::state::ParserState;
use crate::lexer::TokenKind;

const PRIMITIVE_TYPE_NAMES: &[&str] = &[
    "any",
    "anynonnull",
    "binary",
    "date",
    "datetime",
    "datetimezone",
    "duration",
    "function",
    "list",
    "logical",
    "none",
    "null",
    "number",
    "record",
    "table",
    "text",
    "time",
    "type",
    "action",
];

fn is_primitive_type_name(data: &str) -> bool {
    PRIMITIVE_TYPE_NAMES.contains(&data)
}

/// `PrimitiveType: one of the closed primitive-type spellings`.
pub(crate) fn primitive_type(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::PrimitiveType);
    let is_valid = parser
        .maybe_current_token()
        .map(|t| t.kind == TokenKind::Identifier && is_primitive_type_name(&t.data))
        .unwrap_or(false);
    if !is_valid {
        return Err(parser.invalid_primitive_type_error());
    }
    parser.expect_token_kind(TokenKind::Identifier)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::PrimitiveType, range, true);
    Ok(id)
}

/// `NullablePrimitiveType: "nullable"? PrimitiveType`. `nullable` is a
/// contextual keyword, spelled like any other identifier.
pub(crate) fn nullable_primitive_type(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::NullablePrimitiveType);
    if parser.is_on_constant_kind("nullable") {
        bump_constant(parser, TokenKind::Identifier)?;
    }
    primitive_type(parser)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::NullablePrimitiveType, range, false);
    Ok(id)
}

/// `AsNullablePrimitiveType: "as" NullablePrimitiveType`, used in function
/// parameter annotations (`spec.md` §4.3's parameter grammar).
pub(crate) fn as_nullable_primitive_type(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::AsNullablePrimitiveType);
    bump_constant(parser, TokenKind::As)?;
    nullable_primitive_type(parser)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::AsNullablePrimitiveType, range, false);
    Ok(id)
}

/// `TypeExpression: "type" primary-type`, used where M syntax asks for an
/// expression denoting a type value (e.g. `type number`).
pub(crate) fn type_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::TypeExpression);
    bump_constant(parser, TokenKind::Type)?;
    nullable_primitive_type(parser)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::TypeExpression, range, false);
    Ok(id)
}
