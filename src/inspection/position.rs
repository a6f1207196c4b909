//! `isBeforeXorNode`, `isInXorNode`, `isOnXorNodeStart`, `isOnXorNodeEnd`,
//! `isAfterXorNode` (`spec.md` §4.5). Each reduces to line/code-unit lex
//! order on the node's start and end; [`Position`] already derives `Ord` in
//! that field order so the comparisons below are plain `<`/`<=`/`>`.

use crate::parser::arena::NodeIdMap;
use crate::parser::node::XorNode;
use crate::position::Position;

/// The node's `positionEnd`, if known. An AST node always knows it; a
/// context node (still parsing) only knows it if it has at least one leaf
/// descendant, found by [`NodeIdMap::maybe_right_most_leaf`].
pub fn maybe_xor_node_end(arena: &NodeIdMap, id: u32) -> Option<Position> {
    match arena.assert_xor(id) {
        XorNode::Ast(node) => Some(node.token_range.position_end),
        XorNode::Context(_) => {
            let leaf_id = arena.maybe_right_most_leaf(id)?;
            match arena.assert_xor(leaf_id) {
                XorNode::Ast(leaf) => Some(leaf.token_range.position_end),
                XorNode::Context(_) => None,
            }
        }
    }
}

pub fn maybe_xor_node_start(arena: &NodeIdMap, id: u32) -> Option<Position> {
    arena.assert_xor(id).maybe_position_start()
}

pub fn is_before_xor_node(arena: &NodeIdMap, id: u32, position: Position) -> bool {
    maybe_xor_node_start(arena, id).is_some_and(|start| position < start)
}

pub fn is_on_xor_node_start(arena: &NodeIdMap, id: u32, position: Position) -> bool {
    maybe_xor_node_start(arena, id) == Some(position)
}

pub fn is_on_xor_node_end(arena: &NodeIdMap, id: u32, position: Position) -> bool {
    maybe_xor_node_end(arena, id) == Some(position)
}

/// No known end is treated as "not after" (`spec.md` §4.5: "treated as
/// having no finite end for the purpose of after, returns false").
pub fn is_after_xor_node(arena: &NodeIdMap, id: u32, position: Position) -> bool {
    match maybe_xor_node_end(arena, id) {
        Some(end) => position > end,
        None => false,
    }
}

/// No known end is treated as extending indefinitely (`spec.md` §4.5:
/// "returns true when the cursor is at or after the start").
pub fn is_in_xor_node(arena: &NodeIdMap, id: u32, position: Position) -> bool {
    let Some(start) = maybe_xor_node_start(arena, id) else {
        return false;
    };
    if position < start {
        return false;
    }
    match maybe_xor_node_end(arena, id) {
        Some(end) => position <= end,
        None => true,
    }
}
