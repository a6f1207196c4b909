//! `ListExpression`, `RecordExpression` (`spec.md` GLOSSARY "ArrayWrapper",
//! "Csv" — both literal forms are a delimiter-bounded comma-separated
//! sequence over [`parse_csv_array`]).

use crate::lexer::TokenKind;
use crate::parser::error::{CsvContinuationKind, ParseError};
use crate::parser::grammar::identifier::generalized_identifier;
use crate::parser::grammar::{bump_constant, expression, is_csv_continuation, parse_csv_array};
use crate::parser::node::NodeKind;
use crate::parser::state::ParserState;

/// `GeneralizedIdentifierPairedExpression: GeneralizedIdentifier "=" Expression`,
/// the key/value shape of a record field.
fn generalized_identifier_paired_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::GeneralizedIdentifierPairedExpression);
    generalized_identifier(parser)?;
    bump_constant(parser, TokenKind::Equal)?;
    expression(parser)?;
    let range = parser.token_range_since(id);
    parser.end_context(
        id,
        NodeKind::GeneralizedIdentifierPairedExpression,
        range,
        false,
    );
    Ok(id)
}

/// `ListExpression: "{" (Csv<Expression>)? "}"`.
pub(crate) fn list_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::ListExpression);
    let start = parser.current_position();
    bump_constant(parser, TokenKind::LeftBrace)?;
    let csv_result = parse_csv_array(
        parser,
        |parser| is_csv_continuation(parser, TokenKind::RightBrace),
        expression,
    )?;
    if !parser.is_on_token_kind(TokenKind::RightBrace) {
        return Err(parser.unterminated_bracket_error(start));
    }
    if csv_result.ended_on_dangling_comma {
        return Err(parser.csv_continuation_error(CsvContinuationKind::DanglingComma));
    }
    bump_constant(parser, TokenKind::RightBrace)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::ListExpression, range, false);
    Ok(id)
}

/// `RecordExpression: "[" (Csv<GeneralizedIdentifierPairedExpression>)? "]"`.
pub(crate) fn record_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::RecordExpression);
    let start = parser.current_position();
    bump_constant(parser, TokenKind::LeftBracket)?;
    let csv_result = parse_csv_array(
        parser,
        |parser| is_csv_continuation(parser, TokenKind::RightBracket),
        generalized_identifier_paired_expression,
    )?;
    if !parser.is_on_token_kind(TokenKind::RightBracket) {
        return Err(parser.unterminated_bracket_error(start));
    }
    if csv_result.ended_on_dangling_comma {
        return Err(parser.csv_continuation_error(CsvContinuationKind::DanglingComma));
    }
    bump_constant(parser, TokenKind::RightBracket)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::RecordExpression, range, false);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use crate::parser::ParseError;
    use crate::{CommonError, Parser};

    #[test]
    fn list_with_no_trailing_comma_parses() {
        Parser::new("{1, 2, 3}").parse().expect("parses");
    }

    #[test]
    fn unterminated_list_does_not_read_past_end_of_input() {
        // EOF right after the last comma's element: `is_continuation` must
        // see there is no current token left and stop, rather than
        // attempting another `Csv` element and panicking on a missing token.
        let failure = Parser::new("{ 1, 2, ").parse().expect_err("unterminated");
        assert!(matches!(
            failure.error,
            CommonError::Parse(ParseError::UnterminatedBracket { .. })
        ));
    }

    #[test]
    fn list_with_dangling_trailing_comma_is_rejected() {
        let failure = Parser::new("{1, 2, }").parse().expect_err("dangling comma");
        assert!(matches!(
            failure.error,
            CommonError::Parse(ParseError::ExpectedCsvContinuation { .. })
        ));
    }

    #[test]
    fn record_with_dangling_trailing_comma_is_rejected() {
        let failure = Parser::new("[a = 1, b = 2, ]")
            .parse()
            .expect_err("dangling comma");
        assert!(matches!(
            failure.error,
            CommonError::Parse(ParseError::ExpectedCsvContinuation { .. })
        ));
    }

    #[test]
    fn empty_record_parses() {
        Parser::new("[]").parse().expect("parses");
    }
}
