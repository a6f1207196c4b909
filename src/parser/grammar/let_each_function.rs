//! `LetExpression`, `EachExpression`, `FunctionExpression` and its parameter
//! list (`spec.md` GLOSSARY "IdentifierPairedExpression").

use crate::lexer::TokenKind;
use crate::parser::error::{CsvContinuationKind, ParseError};
use crate::parser::grammar::identifier::identifier;
use crate::parser::grammar::type_expr::as_nullable_primitive_type;
use crate::parser::grammar::{bump_constant, expression, is_csv_continuation, parse_csv_array};
use crate::parser::node::NodeKind;
use crate::parser::state::ParserState;

/// `IdentifierPairedExpression: Identifier "=" Expression`, a `let` binding
/// (also used for a section member's name/value pair).
pub(crate) fn identifier_paired_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::IdentifierPairedExpression);
    identifier(parser)?;
    bump_constant(parser, TokenKind::Equal)?;
    expression(parser)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::IdentifierPairedExpression, range, false);
    Ok(id)
}

/// `LetExpression: "let" Csv<IdentifierPairedExpression> "in" Expression`.
/// At least one binding is required; a dangling comma with no further
/// binding is reported via [`ParseError::ExpectedCsvContinuation`] rather
/// than silently accepted.
pub(crate) fn let_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::LetExpression);
    bump_constant(parser, TokenKind::Let)?;
    let mut seen_binding = false;
    let csv_result = parse_csv_array(
        parser,
        |parser| {
            if parser.maybe_current_token_kind().is_none() || parser.is_on_token_kind(TokenKind::In)
            {
                return false;
            }
            seen_binding = true;
            true
        },
        identifier_paired_expression,
    )?;
    if !seen_binding {
        return Err(parser.csv_continuation_error(CsvContinuationKind::LetExpression));
    }
    if csv_result.ended_on_dangling_comma {
        return Err(parser.csv_continuation_error(CsvContinuationKind::DanglingComma));
    }
    bump_constant(parser, TokenKind::In)?;
    expression(parser)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::LetExpression, range, false);
    Ok(id)
}

/// `EachExpression: "each" Expression`, sugar for a one-parameter function
/// over the implicit `_` parameter.
pub(crate) fn each_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::EachExpression);
    bump_constant(parser, TokenKind::Each)?;
    expression(parser)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::EachExpression, range, false);
    Ok(id)
}

/// `Parameter: Identifier AsNullablePrimitiveType?`.
fn parameter(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::Parameter);
    identifier(parser)?;
    if parser.is_on_token_kind(TokenKind::As) {
        as_nullable_primitive_type(parser)?;
    }
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::Parameter, range, false);
    Ok(id)
}

/// `ParameterList: "(" Csv<Parameter>? ")"`.
fn parameter_list(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::ParameterList);
    bump_constant(parser, TokenKind::LeftParenthesis)?;
    let csv_result = parse_csv_array(
        parser,
        |parser| is_csv_continuation(parser, TokenKind::RightParenthesis),
        parameter,
    )?;
    if csv_result.ended_on_dangling_comma {
        return Err(parser.csv_continuation_error(CsvContinuationKind::DanglingComma));
    }
    parser.expect_token_kind(TokenKind::RightParenthesis)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::ParameterList, range, false);
    Ok(id)
}

/// `FunctionExpression: ParameterList AsNullablePrimitiveType? "=>" Expression`.
/// Tried speculatively by [`super::primary::primary_expression`] before
/// falling back to a parenthesized expression, since both start with `(`.
pub(crate) fn function_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::FunctionExpression);
    parameter_list(parser)?;
    if parser.is_on_token_kind(TokenKind::As) {
        as_nullable_primitive_type(parser)?;
    }
    bump_constant(parser, TokenKind::FatArrow)?;
    expression(parser)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::FunctionExpression, range, false);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use crate::parser::ParseError;
    use crate::{CommonError, Parser};

    #[test]
    fn let_expression_with_multiple_bindings_parses() {
        Parser::new("let x = 1, y = 2 in x + y")
            .parse()
            .expect("parses");
    }

    #[test]
    fn let_expression_with_dangling_comma_before_in_is_rejected() {
        // The comma is consumed by `parse_csv_array` before `in` is ever
        // seen, so this must be caught via `ended_on_dangling_comma`, not a
        // post-loop `is_on_token_kind(Comma)` check.
        let failure = Parser::new("let x = 1, in x")
            .parse()
            .expect_err("dangling comma");
        assert!(matches!(
            failure.error,
            CommonError::Parse(ParseError::ExpectedCsvContinuation { .. })
        ));
    }

    #[test]
    fn let_expression_with_no_bindings_is_rejected() {
        let failure = Parser::new("let in x").parse().expect_err("no bindings");
        assert!(matches!(
            failure.error,
            CommonError::Parse(ParseError::ExpectedCsvContinuation { .. })
        ));
    }

    #[test]
    fn function_expression_parameter_list_allows_no_trailing_comma() {
        Parser::new("(x, y) => x + y").parse().expect("parses");
    }

    #[test]
    fn function_expression_parameter_list_rejects_dangling_comma() {
        // `function_expression` is tried speculatively before
        // `parenthesized_expression` (both start with `(`), so once the
        // dangling comma fails the parameter list, the state rolls back and
        // `(x, y, ) => x + y` is retried -- and still rejected -- as a
        // parenthesized expression. Either way this must not silently
        // accept the trailing comma.
        Parser::new("(x, y, ) => x + y")
            .parse()
            .expect_err("dangling comma is rejected one way or the other");
    }

    #[test]
    fn each_expression_parses() {
        Parser::new("each 1 + 1").parse().expect("parses");
    }
}
