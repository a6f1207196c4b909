//! The node-id map (component E, `spec.md` §3, §4.4): the arena that owns
//! every AST and context node, keyed by a never-recycled `u32` id.

use indexmap::{IndexMap, IndexSet};

use crate::parser::node::{AstNode, ContextNode, NodeKind, XorNode};

/// Four mappings keyed by `id` (`spec.md` §3):
/// - `ast_node_by_id` / `context_node_by_id` have disjoint key sets.
/// - `child_ids_by_id[p]` is sorted by each child's `maybe_attribute_index`.
/// - for every child `c` of `p`, `parent_id_by_id[c] == p`.
/// - `leaf_node_ids` holds exactly the ids whose AST kind is a leaf kind.
#[derive(Debug, Clone, Default)]
pub struct NodeIdMap {
    ast_node_by_id: IndexMap<u32, AstNode>,
    context_node_by_id: IndexMap<u32, ContextNode>,
    parent_id_by_id: IndexMap<u32, u32>,
    child_ids_by_id: IndexMap<u32, Vec<u32>>,
    leaf_node_ids: IndexSet<u32>,
}

impl NodeIdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn maybe_ast(&self, id: u32) -> Option<&AstNode> {
        self.ast_node_by_id.get(&id)
    }

    pub fn maybe_context(&self, id: u32) -> Option<&ContextNode> {
        self.context_node_by_id.get(&id)
    }

    pub(crate) fn maybe_context_mut(&mut self, id: u32) -> Option<&mut ContextNode> {
        self.context_node_by_id.get_mut(&id)
    }

    /// `maybeXor(id)`.
    pub fn maybe_xor(&self, id: u32) -> Option<XorNode<'_>> {
        if let Some(node) = self.ast_node_by_id.get(&id) {
            return Some(XorNode::Ast(node));
        }
        self.context_node_by_id.get(&id).map(XorNode::Context)
    }

    /// `assertXor(id)`: the caller has already established `id` is valid.
    pub fn assert_xor(&self, id: u32) -> XorNode<'_> {
        self.maybe_xor(id)
            .unwrap_or_else(|| panic!("node-id map invariant violated: no node for id {id}"))
    }

    pub fn maybe_parent_id(&self, id: u32) -> Option<u32> {
        self.parent_id_by_id.get(&id).copied()
    }

    pub fn child_ids(&self, id: u32) -> &[u32] {
        self.child_ids_by_id
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn leaf_node_ids(&self) -> &IndexSet<u32> {
        &self.leaf_node_ids
    }

    /// `maybeChildXorByAttributeIndex`: the child at `attr_idx`, if its kind
    /// is among `allowed_kinds` (or unconditionally, if `allowed_kinds` is
    /// `None`).
    pub fn maybe_child_xor_by_attribute_index(
        &self,
        parent_id: u32,
        attr_idx: u32,
        allowed_kinds: Option<&[NodeKind]>,
    ) -> Option<XorNode<'_>> {
        for &child_id in self.child_ids(parent_id) {
            let xor = self.assert_xor(child_id);
            if xor.maybe_attribute_index() == Some(attr_idx) {
                return match allowed_kinds {
                    Some(kinds) if !kinds.contains(&xor.kind()) => None,
                    _ => Some(xor),
                };
            }
        }
        None
    }

    /// `maybeNthSiblingXor`: the sibling of `id` whose attribute index is
    /// `id`'s own plus `offset`, or `None` if that index falls outside the
    /// parent's child list. The out-of-bounds guard is `attribute_index >=
    /// child_ids.len()`; an earlier draft inverted this comparison, which
    /// rejected every in-bounds lookup (`spec.md` §9).
    pub fn maybe_nth_sibling_xor(&self, id: u32, offset: i64) -> Option<XorNode<'_>> {
        let parent_id = self.maybe_parent_id(id)?;
        let attribute_index = self.assert_xor(id).maybe_attribute_index()?;
        let target_index = attribute_index as i64 + offset;
        if target_index < 0 {
            return None;
        }
        let target_index = target_index as u32;
        let child_ids = self.child_ids(parent_id);
        if target_index as usize >= child_ids.len() {
            return None;
        }
        self.maybe_child_xor_by_attribute_index(parent_id, target_index, None)
    }

    /// `maybeChildAstByAttributeIndex`: same, but the child must already be
    /// an AST node.
    pub fn maybe_child_ast_by_attribute_index(
        &self,
        parent_id: u32,
        attr_idx: u32,
        allowed_kinds: Option<&[NodeKind]>,
    ) -> Option<&AstNode> {
        match self.maybe_child_xor_by_attribute_index(parent_id, attr_idx, allowed_kinds)? {
            XorNode::Ast(node) => Some(node),
            XorNode::Context(_) => None,
        }
    }

    /// `maybeRightMostLeaf`: descends rightward via `child_ids_by_id` until
    /// a leaf id is reached.
    pub fn maybe_right_most_leaf(&self, id: u32) -> Option<u32> {
        let mut current = id;
        loop {
            if self.leaf_node_ids.contains(&current) {
                return Some(current);
            }
            let children = self.child_ids(current);
            match children.last() {
                Some(&last) => current = last,
                None => return None,
            }
        }
    }

    /// `maybeArrayWrapperContent`: resolves a grouping node wrapping a single
    /// `ArrayWrapper` child at attribute index 1 (the common
    /// `delimiter, ArrayWrapper, delimiter` shape of list/record literals).
    pub fn maybe_array_wrapper_content(&self, parent_id: u32) -> Option<&[u32]> {
        let wrapper = self.maybe_child_xor_by_attribute_index(
            parent_id,
            1,
            Some(&[NodeKind::ArrayWrapper]),
        )?;
        Some(self.child_ids(wrapper.id()))
    }

    /// `assertAncestry`: walks `parent_id_by_id` to the root, id first.
    pub fn assert_ancestry(&self, id: u32) -> Vec<u32> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.maybe_parent_id(current) {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Detaches `child_id` from its current parent (if any) and reattaches
    /// it as the first child of `new_parent_id`, used to retroactively wrap
    /// an already-completed primary expression in a
    /// `RecursivePrimaryExpression` once a trailing invoke/index/field
    /// access is discovered (`spec.md` GLOSSARY "Recursive primary
    /// expression"). This crate's arena has no rowan-style checkpoint, so
    /// recursive-primary wrapping is done as an explicit, narrow reparent
    /// instead.
    pub(crate) fn reparent_as_first_child(&mut self, child_id: u32, new_parent_id: u32) {
        if let Some(old_parent_id) = self.parent_id_by_id.get(&child_id).copied() {
            if let Some(siblings) = self.child_ids_by_id.get_mut(&old_parent_id) {
                siblings.retain(|&id| id != child_id);
            }
        }
        self.parent_id_by_id.insert(child_id, new_parent_id);
        self.child_ids_by_id
            .entry(new_parent_id)
            .or_default()
            .insert(0, child_id);
        if let Some(node) = self.ast_node_by_id.get_mut(&child_id) {
            node.maybe_attribute_index = Some(0);
        } else if let Some(node) = self.context_node_by_id.get_mut(&child_id) {
            node.maybe_attribute_index = Some(0);
        }
    }

    pub(crate) fn decrement_attribute_counter(&mut self, id: u32) {
        if let Some(ctx) = self.context_node_by_id.get_mut(&id) {
            ctx.attribute_counter = ctx.attribute_counter.saturating_sub(1);
        }
    }

    pub(crate) fn set_attribute_counter(&mut self, id: u32, value: u32) {
        if let Some(ctx) = self.context_node_by_id.get_mut(&id) {
            ctx.attribute_counter = value;
        }
    }

    /// Backdates a freshly opened context's recorded start so it covers a
    /// child adopted into it after the fact (`reparent_as_first_child`'s
    /// partner): without this the wrapper's `token_range_since` would start
    /// at the cursor position *after* the adopted child, not before it.
    pub(crate) fn set_context_start(
        &mut self,
        id: u32,
        token_index_start: u32,
        maybe_token_start: Option<crate::position::Position>,
    ) {
        if let Some(ctx) = self.context_node_by_id.get_mut(&id) {
            ctx.token_index_start = token_index_start;
            ctx.maybe_token_start = maybe_token_start;
        }
    }

    // -- mutation, used only by `crate::parser::state::ParserState` --

    pub(crate) fn insert_context(&mut self, node: ContextNode) {
        if let Some(parent_id) = node.maybe_parent_id {
            self.parent_id_by_id.insert(node.id, parent_id);
            let siblings = self.child_ids_by_id.entry(parent_id).or_default();
            siblings.push(node.id);
            siblings.sort_by_key(|&child_id| {
                self.assert_xor(child_id)
                    .maybe_attribute_index()
                    .unwrap_or(u32::MAX)
            });
        }
        self.context_node_by_id.insert(node.id, node);
    }

    /// Promotes `id` from a context node to the given AST node, preserving
    /// its place in `parent_id_by_id` / `child_ids_by_id`.
    pub(crate) fn promote(&mut self, id: u32, ast_node: AstNode) {
        self.context_node_by_id.shift_remove(&id);
        if ast_node.is_leaf {
            self.leaf_node_ids.insert(id);
        }
        self.ast_node_by_id.insert(id, ast_node);
    }

    /// Deletes every node with `id > from_id_exclusive`, descending so a
    /// child is always removed before its parent is inspected, and unlinks
    /// survivors' `child_ids_by_id` entries. Used by speculative restore
    /// (`spec.md` §4.3).
    pub(crate) fn delete_ids_above(&mut self, from_id_exclusive: u32) {
        let mut doomed: Vec<u32> = self
            .ast_node_by_id
            .keys()
            .chain(self.context_node_by_id.keys())
            .copied()
            .filter(|&id| id > from_id_exclusive)
            .collect();
        doomed.sort_unstable_by(|a, b| b.cmp(a));

        for id in doomed {
            self.ast_node_by_id.shift_remove(&id);
            self.context_node_by_id.shift_remove(&id);
            self.leaf_node_ids.shift_remove(&id);
            if let Some(parent_id) = self.parent_id_by_id.shift_remove(&id) {
                if let Some(siblings) = self.child_ids_by_id.get_mut(&parent_id) {
                    siblings.retain(|&child_id| child_id != id);
                }
            }
            self.child_ids_by_id.shift_remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn leaf(id: u32, attribute_index: u32) -> AstNode {
        let position = Position {
            line_number: 0,
            line_code_unit: 0,
        };
        AstNode {
            id,
            kind: NodeKind::Constant,
            maybe_attribute_index: Some(attribute_index),
            token_range: crate::parser::node::TokenRange {
                index_start: 0,
                index_end: 0,
                position_start: position,
                position_end: position,
            },
            is_leaf: true,
        }
    }

    fn three_child_arena() -> NodeIdMap {
        let mut arena = NodeIdMap::new();
        arena.promote(0, leaf(0, 0));
        for id in [1u32, 2, 3] {
            let node = leaf(id, id - 1);
            arena.parent_id_by_id.insert(id, 0);
            arena.child_ids_by_id.entry(0).or_default().push(id);
            arena.promote(id, node);
        }
        arena
    }

    #[test]
    fn nth_sibling_within_bounds_is_some() {
        let arena = three_child_arena();
        let next = arena.maybe_nth_sibling_xor(1, 1).expect("sibling at index 1");
        assert_eq!(next.id(), 2);
    }

    #[test]
    fn nth_sibling_past_last_child_is_none() {
        let arena = three_child_arena();
        // attribute_index 2 (id 3) is the last child; +1 would be index 3,
        // which is out of bounds and must return None, not panic or wrap
        // (regression for the inverted guard noted in `spec.md` §9).
        assert!(arena.maybe_nth_sibling_xor(3, 1).is_none());
    }

    #[test]
    fn nth_sibling_before_first_child_is_none() {
        let arena = three_child_arena();
        assert!(arena.maybe_nth_sibling_xor(1, -1).is_none());
    }
}
