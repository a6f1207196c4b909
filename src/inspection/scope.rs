//! The scope visitor (components I, J, `spec.md` §4.5): given the closest
//! leaf to a cursor position, walks its ancestry invoking a per-kind scope
//! visitor, first-writer-wins, so inner bindings shadow outer ones.

use indexmap::IndexMap;

use crate::inspection::position::{maybe_xor_node_end, maybe_xor_node_start};
use crate::lexer::LexerSnapshot;
use crate::parser::arena::NodeIdMap;
use crate::parser::node::NodeKind;
use crate::position::Position;

/// `{scope, nodes, maybePositionIdentifier, maybeInvokeExpression}`
/// (`spec.md` §4.5, §6's `tryInspection` output).
#[derive(Debug, Clone, Default)]
pub struct InspectionResult {
    /// name → the id of the XOR-node that bound it. Insertion order is
    /// significant (`SPEC_FULL.md`'s ambient-stack note on ordered maps) and
    /// preserved by [`IndexMap`].
    pub scope: IndexMap<String, u32>,
    pub nodes: Vec<ContextualNode>,
    pub maybe_position_identifier: Option<u32>,
    pub maybe_invoke_expression: Option<InvocationContext>,
}

#[derive(Debug, Clone)]
pub struct ContextualNode {
    pub kind: NodeKind,
    pub id: u32,
    pub maybe_position_start: Option<Position>,
    pub maybe_position_end: Option<Position>,
}

#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub maybe_name: Option<String>,
    pub argument_arity: usize,
    pub maybe_argument_index: Option<usize>,
}

/// The kinds [`inspect`] records into `nodes` as the enclosing syntactic
/// context (`spec.md` §4.5: "each, invoke, list, record").
fn is_contextual_kind(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::EachExpression
            | NodeKind::InvokeExpression
            | NodeKind::ListExpression
            | NodeKind::RecordExpression
    )
}

/// The literal text a leaf node's token range covers. Only meaningful for
/// single-token leaves (`Identifier`, `GeneralizedIdentifier`, `Constant`);
/// `spec.md`'s AST node carries no text of its own, so resolving a name
/// requires the originating [`LexerSnapshot`] — not named as an argument to
/// `tryInspection` in `spec.md` §6, but required to build the scope map's
/// string keys. This crate's `inspect` takes it explicitly; see `DESIGN.md`.
fn leaf_text(lexer_snapshot: &LexerSnapshot, arena: &NodeIdMap, id: u32) -> Option<String> {
    let node = arena.maybe_ast(id)?;
    let start = node.token_range.index_start as usize;
    let end = node.token_range.index_end as usize;
    let tokens = lexer_snapshot.tokens.get(start..end)?;
    Some(tokens.iter().map(|t| t.data.as_str()).collect())
}

fn find_child_by_kind(arena: &NodeIdMap, parent_id: u32, kind: NodeKind) -> Option<u32> {
    arena
        .child_ids(parent_id)
        .iter()
        .copied()
        .find(|&child_id| arena.assert_xor(child_id).kind() == kind)
}

/// Rightmost leaf whose `positionEnd` is on-or-before `position`; if none,
/// the lexically-first leaf (`spec.md` §4.5 step 1).
pub(crate) fn closest_leaf_by_position(arena: &NodeIdMap, position: Position) -> Option<u32> {
    let mut best_on_or_before: Option<(Position, u32)> = None;
    let mut lexically_first: Option<(Position, u32)> = None;
    for &id in arena.leaf_node_ids() {
        let Some(node) = arena.maybe_ast(id) else {
            continue;
        };
        let start = node.token_range.position_start;
        let end = node.token_range.position_end;
        if end <= position && best_on_or_before.map_or(true, |(best_end, _)| end > best_end) {
            best_on_or_before = Some((end, id));
        }
        if lexically_first.map_or(true, |(first_start, _)| start < first_start) {
            lexically_first = Some((start, id));
        }
    }
    best_on_or_before.or(lexically_first).map(|(_, id)| id)
}

fn visit_each_expression(scope: &mut IndexMap<String, u32>, each_id: u32) {
    scope.entry("_".to_string()).or_insert(each_id);
}

/// Adds each parameter name → its `Parameter` node.
fn visit_function_expression(
    lexer_snapshot: &LexerSnapshot,
    arena: &NodeIdMap,
    scope: &mut IndexMap<String, u32>,
    function_id: u32,
) {
    let Some(param_list_id) = find_child_by_kind(arena, function_id, NodeKind::ParameterList)
    else {
        return;
    };
    let Some(csv_ids) = arena.maybe_array_wrapper_content(param_list_id) else {
        return;
    };
    for &csv_id in csv_ids {
        let Some(param_id) = find_child_by_kind(arena, csv_id, NodeKind::Parameter) else {
            continue;
        };
        let Some(ident_id) = find_child_by_kind(arena, param_id, NodeKind::Identifier) else {
            continue;
        };
        if let Some(name) = leaf_text(lexer_snapshot, arena, ident_id) {
            scope.entry(name).or_insert(ident_id);
        }
    }
}

/// Adds every binding in a `let`'s key-value array whose value expression
/// has already fully parsed at-or-before `position` — a forward reference
/// (`let x = 1, y = x` with the cursor still inside `x`'s own value) is not
/// yet visible (`spec.md` §4.5, scenario S3).
fn visit_paired_expression_array(
    lexer_snapshot: &LexerSnapshot,
    arena: &NodeIdMap,
    scope: &mut IndexMap<String, u32>,
    wrapper_parent_id: u32,
    pair_kind: NodeKind,
    key_kind: NodeKind,
    position: Position,
) {
    let Some(csv_ids) = arena.maybe_array_wrapper_content(wrapper_parent_id) else {
        return;
    };
    for &csv_id in csv_ids {
        let Some(pair_id) = find_child_by_kind(arena, csv_id, pair_kind) else {
            continue;
        };
        let Some(value_xor) = arena
            .child_ids(pair_id)
            .iter()
            .copied()
            .max_by_key(|&child_id| arena.assert_xor(child_id).maybe_attribute_index())
            .map(|id| arena.assert_xor(id))
        else {
            continue;
        };
        match maybe_xor_node_end(arena, value_xor.id()) {
            Some(end) if end <= position => {}
            _ => continue,
        }
        let Some(key_id) = find_child_by_kind(arena, pair_id, key_kind) else {
            continue;
        };
        if let Some(name) = leaf_text(lexer_snapshot, arena, key_id) {
            scope.entry(name).or_insert(key_id);
        }
    }
}

fn visit_section_document(
    lexer_snapshot: &LexerSnapshot,
    arena: &NodeIdMap,
    scope: &mut IndexMap<String, u32>,
    section_id: u32,
) {
    for &member_id in arena.child_ids(section_id) {
        if arena.assert_xor(member_id).kind() != NodeKind::SectionMember {
            continue;
        }
        let Some(pair_id) =
            find_child_by_kind(arena, member_id, NodeKind::IdentifierPairedExpression)
        else {
            continue;
        };
        let Some(ident_id) = find_child_by_kind(arena, pair_id, NodeKind::Identifier) else {
            continue;
        };
        if let Some(name) = leaf_text(lexer_snapshot, arena, ident_id) {
            scope.entry(name).or_insert(ident_id);
        }
    }
}

/// `IdentifierExpression`'s own name text, descending through its optional
/// `@` to the `Identifier` leaf.
fn identifier_expression_text(
    lexer_snapshot: &LexerSnapshot,
    arena: &NodeIdMap,
    id: u32,
) -> Option<String> {
    let ident_id = find_child_by_kind(arena, id, NodeKind::Identifier)?;
    leaf_text(lexer_snapshot, arena, ident_id)
}

/// "The name of the invoked expression, by looking two ancestors up for the
/// enclosing `RecursivePrimaryExpression`'s head" (`spec.md` §4.5).
fn visit_invoke_expression(
    lexer_snapshot: &LexerSnapshot,
    arena: &NodeIdMap,
    invoke_id: u32,
    position: Position,
) -> Option<InvocationContext> {
    let parent_id = arena.maybe_parent_id(invoke_id)?;
    if arena.assert_xor(parent_id).kind() != NodeKind::RecursivePrimaryExpression {
        return None;
    }
    let maybe_name = arena
        .maybe_child_xor_by_attribute_index(parent_id, 0, None)
        .and_then(|head| identifier_expression_text(lexer_snapshot, arena, head.id()));

    let args = arena.maybe_array_wrapper_content(invoke_id).unwrap_or(&[]);
    let argument_arity = args.len();
    let maybe_argument_index = args.iter().position(|&csv_id| {
        crate::inspection::position::is_in_xor_node(arena, csv_id, position)
    });

    Some(InvocationContext {
        maybe_name,
        argument_arity,
        maybe_argument_index,
    })
}

/// `tryInspection` minus the type layer (`spec.md` §4.5, §6).
pub fn inspect(
    lexer_snapshot: &LexerSnapshot,
    arena: &NodeIdMap,
    position: Position,
) -> InspectionResult {
    let mut result = InspectionResult::default();
    let Some(leaf_id) = closest_leaf_by_position(arena, position) else {
        return result;
    };

    for node_id in arena.assert_ancestry(leaf_id) {
        let kind = arena.assert_xor(node_id).kind();
        match kind {
            NodeKind::EachExpression => visit_each_expression(&mut result.scope, node_id),
            NodeKind::FunctionExpression => {
                visit_function_expression(lexer_snapshot, arena, &mut result.scope, node_id)
            }
            NodeKind::LetExpression => visit_paired_expression_array(
                lexer_snapshot,
                arena,
                &mut result.scope,
                node_id,
                NodeKind::IdentifierPairedExpression,
                NodeKind::Identifier,
                position,
            ),
            NodeKind::RecordExpression => visit_paired_expression_array(
                lexer_snapshot,
                arena,
                &mut result.scope,
                node_id,
                NodeKind::GeneralizedIdentifierPairedExpression,
                NodeKind::GeneralizedIdentifier,
                position,
            ),
            NodeKind::SectionDocument => {
                visit_section_document(lexer_snapshot, arena, &mut result.scope, node_id)
            }
            NodeKind::InvokeExpression => {
                if result.maybe_invoke_expression.is_none() {
                    result.maybe_invoke_expression =
                        visit_invoke_expression(lexer_snapshot, arena, node_id, position);
                }
            }
            NodeKind::Identifier | NodeKind::GeneralizedIdentifier => {
                if maybe_xor_node_start(arena, node_id).is_some_and(|start| start <= position) {
                    if let Some(name) = leaf_text(lexer_snapshot, arena, node_id) {
                        result.scope.entry(name).or_insert(node_id);
                    }
                    if result.maybe_position_identifier.is_none() {
                        result.maybe_position_identifier = Some(node_id);
                    }
                }
            }
            _ => {}
        }

        if is_contextual_kind(kind) {
            result.nodes.push(ContextualNode {
                kind,
                id: node_id,
                maybe_position_start: maybe_xor_node_start(arena, node_id),
                maybe_position_end: maybe_xor_node_end(arena, node_id),
            });
        }
    }

    result
}
