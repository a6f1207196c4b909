//! `LiteralExpression`, `ParenthesizedExpression`, and the recursive
//! primary-expression chain (`spec.md` GLOSSARY "Recursive primary
//! expression"): a primary followed by zero or more invoke/item-access/
//! field-access suffixes.

use crate::lexer::TokenKind;
use crate::parser::error::{CsvContinuationKind, ParseError};
use crate::parser::grammar::identifier::{generalized_identifier, identifier_expression};
use crate::parser::grammar::list_record::{list_expression, record_expression};
use crate::parser::grammar::let_each_function::{each_expression, function_expression, let_expression};
use crate::parser::grammar::control_flow::{error_handling_expression, if_expression};
use crate::parser::grammar::type_expr::type_expression;
use crate::parser::grammar::{bump_constant, expression, is_csv_continuation, parse_csv_array};
use crate::parser::node::NodeKind;
use crate::parser::state::ParserState;

const LITERAL_KINDS: &[TokenKind] = &[
    TokenKind::Numeric,
    TokenKind::StringLiteral,
    TokenKind::True,
    TokenKind::False,
    TokenKind::NullLiteral,
];

/// `LiteralExpression: numeric | string | "true" | "false" | "null"`.
pub(crate) fn literal_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::LiteralExpression);
    parser.expect_any_token_kind(LITERAL_KINDS)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::LiteralExpression, range, true);
    Ok(id)
}

/// `NotImplementedExpression: "..."`, a placeholder expression M source
/// uses for an intentionally unwritten body.
fn not_implemented_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::NotImplementedExpression);
    parser.expect_token_kind(TokenKind::DotDotDot)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::NotImplementedExpression, range, true);
    Ok(id)
}

/// `ParenthesizedExpression: "(" Expression ")"`.
pub(crate) fn parenthesized_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::ParenthesizedExpression);
    let start = parser.current_position();
    bump_constant(parser, TokenKind::LeftParenthesis)?;
    expression(parser)?;
    if !parser.is_on_token_kind(TokenKind::RightParenthesis) {
        return Err(parser.unterminated_parentheses_error(start));
    }
    bump_constant(parser, TokenKind::RightParenthesis)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::ParenthesizedExpression, range, false);
    Ok(id)
}

/// The non-recursive primary: dispatches on the current token to one of the
/// expression forms that can start an expression. `(` is ambiguous between a
/// function literal's parameter list and a parenthesized expression, so a
/// function literal is tried first, speculatively, before falling back.
fn primary_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    match parser.maybe_current_token_kind() {
        Some(TokenKind::LeftParenthesis) => parser
            .speculate(function_expression)
            .or_else(|_| parenthesized_expression(parser)),
        Some(kind) if LITERAL_KINDS.contains(&kind) => literal_expression(parser),
        Some(TokenKind::Identifier | TokenKind::AtSign) => identifier_expression(parser),
        Some(TokenKind::LeftBracket) => record_expression(parser),
        Some(TokenKind::LeftBrace) => list_expression(parser),
        Some(TokenKind::Each) => each_expression(parser),
        Some(TokenKind::If) => if_expression(parser),
        Some(TokenKind::Let) => let_expression(parser),
        Some(TokenKind::Try) => error_handling_expression(parser),
        Some(TokenKind::Type) => type_expression(parser),
        Some(TokenKind::DotDotDot) => not_implemented_expression(parser),
        other => Err(ParseError::ExpectedAnyTokenKind {
            expected: vec![TokenKind::Identifier, TokenKind::LeftParenthesis],
            actual: other,
            actual_data: parser
                .maybe_current_token()
                .map(|t| t.data.clone())
                .unwrap_or_default(),
            position: parser.current_position(),
        }),
    }
}

/// `InvokeExpression: "(" (Csv<Expression>)? ")"`.
fn invoke_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::InvokeExpression);
    bump_constant(parser, TokenKind::LeftParenthesis)?;
    let csv_result = parse_csv_array(
        parser,
        |parser| is_csv_continuation(parser, TokenKind::RightParenthesis),
        expression,
    )?;
    if csv_result.ended_on_dangling_comma {
        return Err(parser.csv_continuation_error(CsvContinuationKind::DanglingComma));
    }
    parser.expect_token_kind(TokenKind::RightParenthesis)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::InvokeExpression, range, false);
    Ok(id)
}

/// `ItemAccessExpression: "{" Expression "}"`.
fn item_access_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::ItemAccessExpression);
    bump_constant(parser, TokenKind::LeftBrace)?;
    expression(parser)?;
    parser.expect_token_kind(TokenKind::RightBrace)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::ItemAccessExpression, range, false);
    Ok(id)
}

/// `FieldSelector: "[" GeneralizedIdentifier "]"`, the bracketed piece of a
/// `FieldAccessExpression`.
fn field_selector(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::FieldSelector);
    bump_constant(parser, TokenKind::LeftBracket)?;
    generalized_identifier(parser)?;
    parser.expect_token_kind(TokenKind::RightBracket)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::FieldSelector, range, false);
    Ok(id)
}

/// `FieldAccessExpression: FieldSelector`, kept as a distinct wrapper kind so
/// the inspector can tell a field access apart from a record's own `[`
/// literal when walking a recursive-primary chain.
fn field_access_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::FieldAccessExpression);
    field_selector(parser)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::FieldAccessExpression, range, false);
    Ok(id)
}

/// `RecursivePrimaryExpression: PrimaryExpression (InvokeExpression |
/// ItemAccessExpression | FieldAccessExpression)*`. The wrapper node is only
/// materialized once a suffix actually follows, so a bare primary (e.g. a
/// lone numeric literal) stays unwrapped at the tree root.
pub(crate) fn recursive_primary_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    let head_id = primary_expression(parser)?;
    if !parser.is_recursive_primary_expression_next() {
        return Ok(head_id);
    }

    let wrapper_id = parser.wrap_completed_child(head_id, NodeKind::RecursivePrimaryExpression);
    while parser.is_recursive_primary_expression_next() {
        match parser.maybe_current_token_kind() {
            Some(TokenKind::LeftParenthesis) => invoke_expression(parser)?,
            Some(TokenKind::LeftBrace) => item_access_expression(parser)?,
            Some(TokenKind::LeftBracket) => field_access_expression(parser)?,
            _ => unreachable!("is_recursive_primary_expression_next only admits these kinds"),
        };
    }
    let range = parser.token_range_since(wrapper_id);
    parser.end_context(wrapper_id, NodeKind::RecursivePrimaryExpression, range, false);
    Ok(wrapper_id)
}

#[cfg(test)]
mod tests {
    use crate::parser::ParseError;
    use crate::{CommonError, Parser};

    #[test]
    fn invoke_expression_with_arguments_parses() {
        Parser::new("f(1, 2, 3)").parse().expect("parses");
    }

    #[test]
    fn invoke_expression_with_no_arguments_parses() {
        Parser::new("f()").parse().expect("parses");
    }

    #[test]
    fn unterminated_invoke_expression_does_not_read_past_end_of_input() {
        // No trailing comma here, so the EOF is reported as a missing `)`
        // rather than a dangling comma -- exercises the
        // `maybe_current_token_kind().is_some()` guard in
        // `is_csv_continuation` directly, since without it this would try
        // to parse a third argument past the end of input instead.
        let failure = Parser::new("f(1, 2").parse().expect_err("unterminated");
        assert!(matches!(
            failure.error,
            CommonError::Parse(ParseError::ExpectedTokenKind { .. })
        ));
    }

    #[test]
    fn invoke_expression_with_dangling_trailing_comma_is_rejected() {
        let failure = Parser::new("f(1, 2, )")
            .parse()
            .expect_err("dangling comma");
        assert!(matches!(
            failure.error,
            CommonError::Parse(ParseError::ExpectedCsvContinuation { .. })
        ));
    }

    #[test]
    fn literal_expression_is_the_root_node_for_a_bare_literal() {
        Parser::new("42").parse().expect("parses");
    }
}
