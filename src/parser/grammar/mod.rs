//! Combinator-style recursive-descent productions for M (component H,
//! `spec.md` §4.3). Each `read_x` function follows the production protocol
//! named there: `start_context`, read children, `end_context` on success,
//! propagate a [`ParseError`] on failure (the enclosing speculative frame,
//! if any, rolls back via [`ParserState::speculate`]).

pub(crate) mod control_flow;
pub(crate) mod identifier;
pub(crate) mod let_each_function;
pub(crate) mod list_record;
pub(crate) mod operators;
pub(crate) mod primary;
pub(crate) mod section;
pub(crate) mod type_expr;

use crate::lexer::TokenKind;
use crate::parser::error::ParseError;
use crate::parser::node::NodeKind;
use crate::parser::state::ParserState;

/// Reads a single token as a leaf `Constant` node, asserting its kind.
pub(crate) fn bump_constant(
    parser: &mut ParserState,
    kind: TokenKind,
) -> Result<u32, ParseError> {
    let id = parser.start_context(NodeKind::Constant);
    parser.expect_token_kind(kind)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::Constant, range, true);
    Ok(id)
}

/// The result of [`parse_csv_array`]: the minted `ArrayWrapper` id, plus
/// whether the loop's last action was consuming a trailing comma with no
/// element following it. A caller that wants a dangling comma to be a
/// syntax error (e.g. `let_expression`) cannot recover this after the fact
/// by inspecting the current token, since the comma is already consumed by
/// the time `parse_csv_array` returns -- this flag is the only place the
/// information is still available.
pub(crate) struct CsvArrayResult {
    pub(crate) wrapper_id: u32,
    pub(crate) ended_on_dangling_comma: bool,
}

/// Parses a delimiter-bounded comma-separated sequence into an
/// `ArrayWrapper` of `Csv` nodes (`spec.md`'s GLOSSARY: `ArrayWrapper`,
/// `Csv`). The caller has already consumed the opening delimiter and will
/// consume the closing one; `is_continuation` decides whether another item
/// should be attempted. `is_continuation` must itself account for
/// end-of-input (`ParserState::maybe_current_token_kind` is `None` there),
/// since `is_on_token_kind` is simply `false` at EOF and a continuation
/// check built only as "not on the closing delimiter" would misread EOF as
/// "more elements follow".
pub(crate) fn parse_csv_array(
    parser: &mut ParserState,
    mut is_continuation: impl FnMut(&ParserState) -> bool,
    mut parse_content: impl FnMut(&mut ParserState) -> Result<u32, ParseError>,
) -> Result<CsvArrayResult, ParseError> {
    let wrapper_id = parser.start_context(NodeKind::ArrayWrapper);
    let mut ended_on_dangling_comma = false;
    let mut should_continue = is_continuation(parser);
    while should_continue {
        let csv_id = parser.start_context(NodeKind::Csv);
        parse_content(parser)?;
        let mut has_comma = false;
        if parser.is_on_token_kind(TokenKind::Comma) {
            bump_constant(parser, TokenKind::Comma)?;
            has_comma = true;
        }
        let range = parser.token_range_since(csv_id);
        parser.end_context(csv_id, NodeKind::Csv, range, false);
        if !has_comma {
            break;
        }
        should_continue = is_continuation(parser);
        ended_on_dangling_comma = !should_continue;
    }
    let range = parser.token_range_since(wrapper_id);
    parser.end_context(wrapper_id, NodeKind::ArrayWrapper, range, false);
    Ok(CsvArrayResult {
        wrapper_id,
        ended_on_dangling_comma,
    })
}

/// EOF-aware continuation check shared by every `parse_csv_array` call
/// site: another element is attempted only while a token remains and it
/// isn't `closing_kind`. Without the `maybe_current_token_kind().is_some()`
/// guard, `!is_on_token_kind(closing_kind)` is vacuously `true` at EOF
/// (`is_on_token_kind` is `false` when there is no current token), which
/// would attempt one CSV element past the end of input instead of letting
/// the caller's own unterminated-delimiter check fire.
pub(crate) fn is_csv_continuation(parser: &ParserState, closing_kind: TokenKind) -> bool {
    parser.maybe_current_token_kind().is_some() && !parser.is_on_token_kind(closing_kind)
}

/// `expression`: the top of the operator precedence chain (`spec.md` §4.3,
/// §4.6's type family implies the grammar supports every operator named
/// there). This is the single entry point every other production recurses
/// into for a nested expression, which makes it the natural production
/// boundary (`spec.md` §5, §6) to consult the cancellation hook and
/// enforce `ParserSettings::recursion_limit` at — every form that can
/// nest arbitrarily deep (parenthesized, list/record elements, function
/// bodies, `let`/`each`/`if` bodies) bottoms out in a call here.
pub(crate) fn expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    parser.enter_production()?;
    let result = operators::or_expression(parser);
    parser.exit_production();
    result
}

#[cfg(test)]
mod tests {
    use crate::parser::ParseError;
    use crate::{CommonError, Parser, ParserSettings};

    #[test]
    fn recursion_limit_is_enforced_on_deeply_nested_parentheses() {
        let text = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        let failure = Parser::with_settings(ParserSettings::new(&text).recursion_limit(5))
            .parse()
            .expect_err("exceeds the limit");
        assert!(matches!(
            failure.error,
            CommonError::Parse(ParseError::RecursionLimit { limit: 5, .. })
        ));
    }

    #[test]
    fn deeply_nested_parentheses_within_the_limit_still_parse() {
        let text = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        Parser::with_settings(ParserSettings::new(&text).recursion_limit(20))
            .parse()
            .expect("within the limit");
    }

    #[test]
    fn cancellation_hook_aborts_the_parse() {
        let failure = Parser::with_settings(
            ParserSettings::new("1 + 1").cancellation_token(|| true),
        )
        .parse()
        .expect_err("cancelled");
        assert!(matches!(failure.error, CommonError::Cancellation));
    }

    #[test]
    fn cancellation_hook_returning_false_does_not_affect_the_parse() {
        Parser::with_settings(ParserSettings::new("1 + 1").cancellation_token(|| false))
            .parse()
            .expect("parses normally");
    }
}
