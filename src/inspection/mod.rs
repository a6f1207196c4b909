//! The position/type inspector (components I, J, K, `spec.md` §4.5, §4.6):
//! given a cursor position and a (possibly partial) parse tree, computes the
//! lexical scope visible there, the enclosing syntactic context, and a
//! structural type for the focused node.

pub mod position;
pub mod scope;
pub mod ty;

pub use position::{
    is_after_xor_node, is_before_xor_node, is_in_xor_node, is_on_xor_node_end,
    is_on_xor_node_start, maybe_xor_node_end, maybe_xor_node_start,
};
pub use scope::{inspect, ContextualNode, InspectionResult, InvocationContext};
pub use ty::{infer_type, infer_type_cached, Type, TypeCache, TypeKind, TypeShape};

use crate::lexer::LexerSnapshot;
use crate::parser::arena::NodeIdMap;
use crate::position::Position;

/// `{scope: tryInspection's result, maybeType: tryType's result for the
/// closest leaf}` (`spec.md` §4.5, §4.6): the two position-inspection calls
/// run together against the same cursor, since a caller wanting "what's
/// under the cursor" almost always wants both the enclosing scope and the
/// type of the thing it's resting on.
#[derive(Debug, Clone)]
pub struct TypedInspectionResult {
    pub scope: InspectionResult,
    pub maybe_type: Option<ty::Type>,
}

/// `tryInspection` followed by `tryType` on the same closest-leaf node
/// (`spec.md` §4.5, §4.6), threading a caller-persisted [`TypeCache`]
/// through the latter.
pub fn inspect_with_type(
    lexer_snapshot: &LexerSnapshot,
    arena: &NodeIdMap,
    position: Position,
    type_cache: &mut TypeCache,
) -> TypedInspectionResult {
    let scope = inspect(lexer_snapshot, arena, position);
    let maybe_type = scope::closest_leaf_by_position(arena, position)
        .map(|leaf_id| ty::infer_type_cached(lexer_snapshot, arena, type_cache, leaf_id));
    TypedInspectionResult { scope, maybe_type }
}
