//! End-to-end coverage of the concrete scenarios and a few of the
//! quantified invariants: build a real `Parser`, inspect the resulting
//! arena and (for position/scope) the inspection subsystem, rather than
//! reaching into parser internals.

use m_parser::inspection::{inspect, inspect_with_type, TypeCache, TypeKind};
use m_parser::parser::node::NodeKind;
use m_parser::position::Position;
use m_parser::settings::ParserKind;
use m_parser::{CommonError, Parser, ParserSettings};

/// S1 — a bare numeric literal parses to a root `LiteralExpression` with no
/// wrapping, and is the sole leaf.
#[test]
fn s1_bare_literal_has_no_wrapper_and_one_leaf() {
    let outcome = Parser::new("1").parse().expect("parses");
    let root = outcome.arena.assert_xor(outcome.root);
    assert_eq!(root.kind(), NodeKind::LiteralExpression);
    assert_eq!(outcome.arena.leaf_node_ids().len(), 1);
}

/// S2 — `1 is number is number` parses left-associatively under both
/// engines, and they produce the same tree shape.
#[test]
fn s2_is_expression_is_left_associative_under_both_engines() {
    let text = "1 is number is number";

    let recursive_descent = Parser::with_settings(
        ParserSettings::new(text).parser_kind(ParserKind::RecursiveDescent),
    )
    .parse()
    .expect("parses");
    let combinatorial = Parser::with_settings(
        ParserSettings::new(text).parser_kind(ParserKind::Combinatorial),
    )
    .parse()
    .expect("parses");

    for outcome in [&recursive_descent, &combinatorial] {
        let root = outcome.arena.assert_xor(outcome.root);
        assert_eq!(root.kind(), NodeKind::IsExpression);

        // Left-associative shape: the outer IsExpression's head (attribute 0)
        // is itself an IsExpression, not the literal `1` directly.
        let head = outcome
            .arena
            .maybe_child_xor_by_attribute_index(outcome.root, 0, None)
            .expect("outer is-expression has a head");
        assert_eq!(head.kind(), NodeKind::IsExpression);
    }

    assert_eq!(
        recursive_descent.arena.leaf_node_ids().len(),
        combinatorial.arena.leaf_node_ids().len(),
    );
}

/// S3 — in `let x = 1, y = x + 1 in y`, the scope immediately before `in`
/// contains both bindings, but the scope immediately after `x =` contains
/// neither (no forward references visible while a binding's own value is
/// still being typed).
#[test]
fn s3_let_bindings_are_not_visible_until_their_value_completes() {
    let text = "let x = 1, y = x + 1 in y";
    let outcome = Parser::new(text).parse().expect("parses");
    let snapshot = m_parser::lexer::lex(text).unwrap();

    let before_in = text.find(" in").unwrap();
    let position_before_in = Position::new(0, before_in as u32);
    let result = inspect(&snapshot, &outcome.arena, position_before_in);
    assert!(result.scope.contains_key("x"));
    assert!(result.scope.contains_key("y"));

    // One code unit past the `=` itself, i.e. "immediately after `x =`" and
    // before `1` has been typed -- `x`'s own value hasn't completed yet.
    let after_x_equals = text.find("= 1").unwrap() + 1;
    let position_after_x_equals = Position::new(0, after_x_equals as u32);
    let result = inspect(&snapshot, &outcome.arena, position_after_x_equals);
    assert!(!result.scope.contains_key("x"));
    assert!(!result.scope.contains_key("y"));
}

/// S4 — an unterminated list still leaves behind a partial tree: the
/// `ListExpression` context's `ArrayWrapper` has two completed `Csv`
/// children even though the list itself never closed.
#[test]
fn s4_unterminated_list_leaves_partial_csv_children() {
    let failure = Parser::new("{ 1, 2, ").parse().expect_err("unterminated");
    assert!(matches!(
        failure.error,
        CommonError::Parse(m_parser::parser::ParseError::UnterminatedBracket { .. })
    ));

    // Context node ids start at 0, and the root `ListExpression` is the
    // first node minted, so id 0 is the list itself.
    let root = failure.arena.assert_xor(0);
    assert_eq!(root.kind(), NodeKind::ListExpression);

    let array_wrapper = failure
        .arena
        .maybe_child_xor_by_attribute_index(0, 1, Some(&[NodeKind::ArrayWrapper]))
        .expect("list has an ArrayWrapper child");
    let csv_children: Vec<_> = failure
        .arena
        .child_ids(array_wrapper.id())
        .iter()
        .filter(|&&id| failure.arena.assert_xor(id).kind() == NodeKind::Csv)
        .collect();
    assert_eq!(csv_children.len(), 2);
}

/// Invariant 3: for a successful parse, the AST's concatenated token range
/// covers every lexed token, none dropped or left over.
#[test]
fn invariant3_successful_parse_consumes_every_token() {
    let text = "let x = 1 in x + 1";
    let snapshot = m_parser::lexer::lex(text).unwrap();
    let outcome = Parser::new(text).parse().expect("parses");
    let root = outcome.arena.maybe_ast(outcome.root).expect("root is an ast node");
    assert_eq!(root.token_range.index_start, 0);
    assert_eq!(root.token_range.index_end, snapshot.tokens.len() as u32);
}

/// Invariant 4: every child's recorded parent resolves back to the node
/// that owns it, and children are attribute-index sorted.
#[test]
fn invariant4_child_parent_links_are_consistent() {
    let outcome = Parser::new("1 + 2 * 3").parse().expect("parses");
    for &child_id in outcome.arena.child_ids(outcome.root) {
        assert_eq!(outcome.arena.maybe_parent_id(child_id), Some(outcome.root));
    }
    let indices: Vec<_> = outcome
        .arena
        .child_ids(outcome.root)
        .iter()
        .map(|&id| outcome.arena.assert_xor(id).maybe_attribute_index())
        .collect();
    let mut sorted = indices.clone();
    sorted.sort();
    assert_eq!(indices, sorted);
}

/// `inspect_with_type` pairs the scope inspector's result with the
/// closest leaf's structural type, threading a [`TypeCache`] across calls.
#[test]
fn inspect_with_type_resolves_the_closest_literals_type() {
    let text = "let x = 1 in x + 1";
    let outcome = Parser::new(text).parse().expect("parses");
    let snapshot = m_parser::lexer::lex(text).unwrap();
    let mut cache = TypeCache::default();

    let end_position = Position::new(0, text.len() as u32);
    let result = inspect_with_type(&snapshot, &outcome.arena, end_position, &mut cache);
    assert!(result.scope.scope.contains_key("x"));
    let ty = result.maybe_type.expect("a leaf is under the cursor");
    assert_eq!(ty.kind, TypeKind::Number);
    assert!(!cache.type_by_id.is_empty());
}

/// A section document with a shared member parses and exposes the member
/// name in section-level scope.
#[test]
fn section_document_member_is_visible_in_scope() {
    let text = "section Foo; shared bar = 1;";
    let outcome = Parser::new(text).parse().expect("parses");
    let snapshot = m_parser::lexer::lex(text).unwrap();
    let end_position = Position::new(0, text.len() as u32);
    let result = inspect(&snapshot, &outcome.arena, end_position);
    assert!(result.scope.contains_key("bar"));
}
