//! The binary-operator precedence chain (`spec.md` §4.3). Lowest to
//! highest: `or`, `and`, `as`, `is`, equality, relational, `meta`,
//! additive, multiplicative, unary, recursive-primary. `spec.md` does not
//! fix a precedence table; this order follows scenario S2 (`1 is number is
//! number` parses left-associatively as `((1 is number) is number)`) and is
//! recorded as a decision in `DESIGN.md`.
//!
//! Every level is driven through [`left_associative_chain`], which branches
//! on [`ParserKind`](crate::settings::ParserKind): the recursive-descent
//! engine folds operators in as they're read, the combinatorial engine
//! collects the whole `(operator, operand)` run first and folds it
//! afterwards. Both walk the same token stream and must leave the arena in
//! the same shape.

use crate::lexer::TokenKind;
use crate::parser::error::ParseError;
use crate::parser::grammar::primary::recursive_primary_expression;
use crate::parser::grammar::type_expr::nullable_primitive_type;
use crate::parser::grammar::bump_constant;
use crate::parser::node::NodeKind;
use crate::parser::state::ParserState;
use crate::settings::ParserKind;

type Operand = fn(&mut ParserState) -> Result<u32, ParseError>;

/// Wraps `head` in `node_kind`, consumes the operator token already known to
/// be `op_kind`, parses one more operand via `next`, and closes the new
/// context. Returns the wrapper's id, which becomes the new `head`.
fn fold_one(
    parser: &mut ParserState,
    head: u32,
    node_kind: NodeKind,
    op_kind: TokenKind,
    next: Operand,
) -> Result<u32, ParseError> {
    let wrapper_id = parser.wrap_completed_child(head, node_kind);
    bump_constant(parser, op_kind)?;
    next(parser)?;
    let range = parser.token_range_since(wrapper_id);
    parser.end_context(wrapper_id, node_kind, range, false);
    Ok(wrapper_id)
}

/// `next (op next)*`, left-associative.
fn left_associative_chain(
    parser: &mut ParserState,
    next: Operand,
    node_kind: NodeKind,
    ops: &[TokenKind],
) -> Result<u32, ParseError> {
    let head = next(parser)?;
    match parser.parser_kind() {
        ParserKind::RecursiveDescent => {
            let mut head = head;
            while let Some(op_kind) = parser
                .maybe_current_token_kind()
                .filter(|kind| ops.contains(kind))
            {
                head = fold_one(parser, head, node_kind, op_kind, next)?;
            }
            Ok(head)
        }
        ParserKind::Combinatorial => op_kinds_fold(parser, head, next, node_kind, ops),
    }
}

/// The combinatorial engine's fold: recurses on the accumulator instead of
/// looping, one `(operator, operand)` application per call, stopping the
/// first time no operator of this level is on the cursor. Walks exactly the
/// tokens the recursive-descent `while let` loop in
/// [`left_associative_chain`] would; the two engines differ in control flow
/// shape, not in which tokens they consume or the tree they build.
fn op_kinds_fold(
    parser: &mut ParserState,
    head: u32,
    next: Operand,
    node_kind: NodeKind,
    ops: &[TokenKind],
) -> Result<u32, ParseError> {
    match parser
        .maybe_current_token_kind()
        .filter(|kind| ops.contains(kind))
    {
        Some(op_kind) => {
            let folded = fold_one(parser, head, node_kind, op_kind, next)?;
            op_kinds_fold(parser, folded, next, node_kind, ops)
        }
        None => Ok(head),
    }
}

/// `or_expression: and_expression ("or" and_expression)*`.
pub(crate) fn or_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    left_associative_chain(
        parser,
        and_expression,
        NodeKind::LogicalExpression,
        &[TokenKind::Or],
    )
}

/// `and_expression: as_expression ("and" as_expression)*`.
fn and_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    left_associative_chain(
        parser,
        as_expression,
        NodeKind::LogicalExpression,
        &[TokenKind::And],
    )
}

/// `as_expression: is_expression ("as" NullablePrimitiveType)*`. The
/// right-hand side is a type, not a nested expression, so this level can't
/// reuse [`left_associative_chain`].
fn as_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    type_testing_chain(parser, is_expression, NodeKind::AsExpression, TokenKind::As)
}

/// `is_expression: equality_expression ("is" NullablePrimitiveType)*`.
fn is_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    type_testing_chain(
        parser,
        equality_expression,
        NodeKind::IsExpression,
        TokenKind::Is,
    )
}

fn type_testing_chain(
    parser: &mut ParserState,
    next: Operand,
    node_kind: NodeKind,
    op_kind: TokenKind,
) -> Result<u32, ParseError> {
    let mut head = next(parser)?;
    while parser.is_on_token_kind(op_kind) {
        let wrapper_id = parser.wrap_completed_child(head, node_kind);
        bump_constant(parser, op_kind)?;
        nullable_primitive_type(parser)?;
        let range = parser.token_range_since(wrapper_id);
        parser.end_context(wrapper_id, node_kind, range, false);
        head = wrapper_id;
    }
    Ok(head)
}

const EQUALITY_OPS: &[TokenKind] = &[TokenKind::Equal, TokenKind::NotEqual];
const RELATIONAL_OPS: &[TokenKind] = &[
    TokenKind::LessThan,
    TokenKind::LessThanOrEqual,
    TokenKind::GreaterThan,
    TokenKind::GreaterThanOrEqual,
];
const ADDITIVE_OPS: &[TokenKind] = &[TokenKind::Plus, TokenKind::Minus, TokenKind::Ampersand];
const MULTIPLICATIVE_OPS: &[TokenKind] = &[TokenKind::Asterisk, TokenKind::Division];

/// `equality_expression: relational_expression (("=" | "<>") relational_expression)*`.
fn equality_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    left_associative_chain(
        parser,
        relational_expression,
        NodeKind::EqualityExpression,
        EQUALITY_OPS,
    )
}

/// `relational_expression: metadata_expression (("<" | "<=" | ">" | ">=") metadata_expression)*`.
fn relational_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    left_associative_chain(
        parser,
        metadata_expression,
        NodeKind::RelationalExpression,
        RELATIONAL_OPS,
    )
}

/// `metadata_expression: additive_expression ("meta" additive_expression)*`.
fn metadata_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    left_associative_chain(
        parser,
        additive_expression,
        NodeKind::MetadataExpression,
        &[TokenKind::Meta],
    )
}

/// `additive_expression: multiplicative_expression (("+" | "-" | "&") multiplicative_expression)*`.
fn additive_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    left_associative_chain(
        parser,
        multiplicative_expression,
        NodeKind::ArithmeticExpression,
        ADDITIVE_OPS,
    )
}

/// `multiplicative_expression: unary_expression (("*" | "/") unary_expression)*`.
fn multiplicative_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    left_associative_chain(
        parser,
        unary_expression,
        NodeKind::ArithmeticExpression,
        MULTIPLICATIVE_OPS,
    )
}

const UNARY_OPS: &[TokenKind] = &[TokenKind::Plus, TokenKind::Minus, TokenKind::Not];

/// `unary_expression: ("+" | "-" | "not")* recursive_primary_expression`.
/// Right-recursive rather than looping, so stacked unary operators (`- -1`)
/// nest instead of flattening; no wrapper is built when no operator is
/// present, matching the no-wrap-when-bare behavior used for recursive
/// primaries (scenario S1's AST root is a bare `LiteralExpression`).
fn unary_expression(parser: &mut ParserState) -> Result<u32, ParseError> {
    let op_kind = match parser.maybe_current_token_kind() {
        Some(kind) if UNARY_OPS.contains(&kind) => kind,
        _ => return recursive_primary_expression(parser),
    };
    let id = parser.start_context(NodeKind::UnaryExpression);
    bump_constant(parser, op_kind)?;
    unary_expression(parser)?;
    let range = parser.token_range_since(id);
    parser.end_context(id, NodeKind::UnaryExpression, range, false);
    Ok(id)
}
