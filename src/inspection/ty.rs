//! The type inspector (component K, `spec.md` §4.6): a closed structural
//! type family, inferred bottom-up over an XOR-node with a two-tier cache —
//! `given_type_by_id` is the caller-supplied, persisted-across-runs cache;
//! `delta_type_by_id` is scratch space for this call only. Unknown subtrees
//! resolve to [`TypeKind::Unknown`] rather than failing, since the arena may
//! be a partial, error-recovered tree.

use indexmap::IndexMap;

use crate::lexer::{LexerSnapshot, TokenKind};
use crate::parser::arena::NodeIdMap;
use crate::parser::node::NodeKind;

/// The closed structural type family (`spec.md` §4.6).
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Any,
    AnyNonNull,
    Binary,
    Date,
    DateTime,
    DateTimeZone,
    Duration,
    Function,
    List,
    Logical,
    Null,
    Number,
    Record,
    Table,
    Text,
    Time,
    Type,
    Action,
    None,
    Unknown,
}

/// A structural type: a [`TypeKind`], nullability, and — for `record`,
/// `function`, and `list` — a richer shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub kind: TypeKind,
    pub is_nullable: bool,
    pub shape: Option<Box<TypeShape>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeShape {
    Record {
        fields: IndexMap<String, Type>,
        is_open: bool,
    },
    Function {
        parameters: Vec<Type>,
        return_type: Type,
    },
    List {
        element: Type,
    },
}

impl Type {
    fn simple(kind: TypeKind, is_nullable: bool) -> Self {
        Self {
            kind,
            is_nullable,
            shape: None,
        }
    }

    pub fn unknown() -> Self {
        Self::simple(TypeKind::Unknown, false)
    }
}

fn primitive_type_kind(name: &str) -> Option<TypeKind> {
    Some(match name {
        "any" => TypeKind::Any,
        "anynonnull" => TypeKind::AnyNonNull,
        "binary" => TypeKind::Binary,
        "date" => TypeKind::Date,
        "datetime" => TypeKind::DateTime,
        "datetimezone" => TypeKind::DateTimeZone,
        "duration" => TypeKind::Duration,
        "function" => TypeKind::Function,
        "list" => TypeKind::List,
        "logical" => TypeKind::Logical,
        "none" => TypeKind::None,
        "null" => TypeKind::Null,
        "number" => TypeKind::Number,
        "record" => TypeKind::Record,
        "table" => TypeKind::Table,
        "text" => TypeKind::Text,
        "time" => TypeKind::Time,
        "type" => TypeKind::Type,
        "action" => TypeKind::Action,
        _ => return None,
    })
}

/// The two-tier memoization cache threaded through a single `tryType` call
/// (`spec.md` §4.6, §9). `given_type_by_id` is the caller's persisted cache
/// from a prior call (if any); `delta_type_by_id` accumulates this call's
/// fresh results so the caller can persist them for next time.
#[derive(Debug, Clone, Default)]
pub struct TypeCache {
    pub scope_by_id: IndexMap<u32, crate::inspection::scope::InspectionResult>,
    pub type_by_id: IndexMap<u32, Type>,
}

fn find_child_by_kind(arena: &NodeIdMap, parent_id: u32, kind: NodeKind) -> Option<u32> {
    arena
        .child_ids(parent_id)
        .iter()
        .copied()
        .find(|&child_id| arena.assert_xor(child_id).kind() == kind)
}

fn leaf_text(lexer_snapshot: &LexerSnapshot, arena: &NodeIdMap, id: u32) -> Option<String> {
    let node = arena.maybe_ast(id)?;
    let start = node.token_range.index_start as usize;
    let end = node.token_range.index_end as usize;
    let tokens = lexer_snapshot.tokens.get(start..end)?;
    Some(tokens.iter().map(|t| t.data.as_str()).collect())
}

fn literal_type(lexer_snapshot: &LexerSnapshot, arena: &NodeIdMap, literal_id: u32) -> Type {
    let Some(node) = arena.maybe_ast(literal_id) else {
        return Type::unknown();
    };
    let Some(token) = lexer_snapshot
        .tokens
        .get(node.token_range.index_start as usize)
    else {
        return Type::unknown();
    };
    match token.kind {
        TokenKind::Numeric => Type::simple(TypeKind::Number, false),
        TokenKind::StringLiteral => Type::simple(TypeKind::Text, false),
        TokenKind::True | TokenKind::False => Type::simple(TypeKind::Logical, false),
        TokenKind::NullLiteral => Type::simple(TypeKind::Null, true),
        _ => Type::unknown(),
    }
}

/// `NullablePrimitiveType` → `Type`: nullability is the syntactic `nullable`
/// marker, resolved by whether the type's first child is a `Constant`
/// spelled `"nullable"` rather than the `PrimitiveType` itself.
fn nullable_primitive_type_to_type(
    lexer_snapshot: &LexerSnapshot,
    arena: &NodeIdMap,
    nullable_primitive_type_id: u32,
) -> Type {
    let children = arena.child_ids(nullable_primitive_type_id);
    let is_nullable = children
        .first()
        .and_then(|&id| leaf_text(lexer_snapshot, arena, id))
        .map(|text| text == "nullable")
        .unwrap_or(false);
    let Some(primitive_id) = find_child_by_kind(arena, nullable_primitive_type_id, NodeKind::PrimitiveType) else {
        return Type::unknown();
    };
    let Some(name) = leaf_text(lexer_snapshot, arena, primitive_id) else {
        return Type::unknown();
    };
    match primitive_type_kind(&name) {
        Some(kind) => Type::simple(kind, is_nullable),
        None => Type::unknown(),
    }
}

/// Parameter nullability is the disjunction of the syntactic `optional`
/// marker and the declared parameter type's own nullability (`spec.md`
/// §4.6). This grammar doesn't recognize an `optional` marker (out of
/// scope, `DESIGN.md`), so it contributes only the declared type's
/// nullability here.
fn parameter_type(lexer_snapshot: &LexerSnapshot, arena: &NodeIdMap, parameter_id: u32) -> Type {
    match find_child_by_kind(arena, parameter_id, NodeKind::AsNullablePrimitiveType) {
        Some(as_type_id) => {
            match find_child_by_kind(arena, as_type_id, NodeKind::NullablePrimitiveType) {
                Some(nullable_id) => {
                    nullable_primitive_type_to_type(lexer_snapshot, arena, nullable_id)
                }
                None => Type::unknown(),
            }
        }
        None => Type::simple(TypeKind::Any, false),
    }
}

fn function_expression_type(
    lexer_snapshot: &LexerSnapshot,
    arena: &NodeIdMap,
    function_id: u32,
    resolve: &mut impl FnMut(&NodeIdMap, u32) -> Type,
) -> Type {
    let parameters = find_child_by_kind(arena, function_id, NodeKind::ParameterList)
        .and_then(|param_list_id| arena.maybe_array_wrapper_content(param_list_id))
        .map(|csv_ids| {
            csv_ids
                .iter()
                .filter_map(|&csv_id| find_child_by_kind(arena, csv_id, NodeKind::Parameter))
                .map(|parameter_id| parameter_type(lexer_snapshot, arena, parameter_id))
                .collect()
        })
        .unwrap_or_default();

    let return_type = arena
        .child_ids(function_id)
        .iter()
        .copied()
        .max_by_key(|&id| arena.assert_xor(id).maybe_attribute_index())
        .map(|body_id| resolve(arena, body_id))
        .unwrap_or_else(Type::unknown);

    Type {
        kind: TypeKind::Function,
        is_nullable: false,
        shape: Some(Box::new(TypeShape::Function {
            parameters,
            return_type,
        })),
    }
}

fn record_expression_type(
    lexer_snapshot: &LexerSnapshot,
    arena: &NodeIdMap,
    record_id: u32,
    resolve: &mut impl FnMut(&NodeIdMap, u32) -> Type,
) -> Type {
    let mut fields = IndexMap::new();
    if let Some(csv_ids) = arena.maybe_array_wrapper_content(record_id) {
        for &csv_id in csv_ids {
            let Some(pair_id) =
                find_child_by_kind(arena, csv_id, NodeKind::GeneralizedIdentifierPairedExpression)
            else {
                continue;
            };
            let Some(key_id) = find_child_by_kind(arena, pair_id, NodeKind::GeneralizedIdentifier)
            else {
                continue;
            };
            let Some(name) = leaf_text(lexer_snapshot, arena, key_id) else {
                continue;
            };
            let value_type = arena
                .child_ids(pair_id)
                .iter()
                .copied()
                .max_by_key(|&id| arena.assert_xor(id).maybe_attribute_index())
                .map(|value_id| resolve(arena, value_id))
                .unwrap_or_else(Type::unknown);
            fields.insert(name, value_type);
        }
    }
    Type {
        kind: TypeKind::Record,
        is_nullable: false,
        shape: Some(Box::new(TypeShape::Record {
            fields,
            is_open: false,
        })),
    }
}

fn list_expression_type(
    arena: &NodeIdMap,
    list_id: u32,
    resolve: &mut impl FnMut(&NodeIdMap, u32) -> Type,
) -> Type {
    let element = arena
        .maybe_array_wrapper_content(list_id)
        .and_then(|csv_ids| csv_ids.first())
        .map(|&first_csv_id| {
            arena
                .child_ids(first_csv_id)
                .first()
                .map(|&id| resolve(arena, id))
                .unwrap_or_else(Type::unknown)
        })
        .unwrap_or_else(Type::unknown);
    Type {
        kind: TypeKind::List,
        is_nullable: false,
        shape: Some(Box::new(TypeShape::List { element })),
    }
}

/// Bottom-up, memoized inference for one node (`spec.md` §4.6). Reads
/// `given_type_by_id` first, then `delta_type_by_id`'s results from earlier
/// in this same call, falling back to deriving the type from the node's
/// kind and children. A node whose children are still contexts (a partial
/// parse) simply treats the unresolved children as unknown; it never fails.
pub fn infer_type(
    lexer_snapshot: &LexerSnapshot,
    arena: &NodeIdMap,
    given_type_by_id: &IndexMap<u32, Type>,
    delta_type_by_id: &mut IndexMap<u32, Type>,
    id: u32,
) -> Type {
    if let Some(ty) = given_type_by_id.get(&id).or_else(|| delta_type_by_id.get(&id)) {
        return ty.clone();
    }

    let kind = arena.assert_xor(id).kind();
    let ty = match kind {
        NodeKind::LiteralExpression => literal_type(lexer_snapshot, arena, id),
        NodeKind::LogicalExpression | NodeKind::EqualityExpression | NodeKind::IsExpression => {
            Type::simple(TypeKind::Logical, false)
        }
        NodeKind::RelationalExpression => Type::simple(TypeKind::Logical, false),
        NodeKind::ArithmeticExpression => Type::simple(TypeKind::Number, false),
        NodeKind::AsExpression => find_child_by_kind(arena, id, NodeKind::NullablePrimitiveType)
            .map(|nullable_id| nullable_primitive_type_to_type(lexer_snapshot, arena, nullable_id))
            .unwrap_or_else(Type::unknown),
        NodeKind::EachExpression => Type::simple(TypeKind::Function, false),
        NodeKind::FunctionExpression => {
            function_expression_type(lexer_snapshot, arena, id, &mut |arena, child_id| {
                infer_type(
                    lexer_snapshot,
                    arena,
                    given_type_by_id,
                    delta_type_by_id,
                    child_id,
                )
            })
        }
        NodeKind::RecordExpression => {
            record_expression_type(lexer_snapshot, arena, id, &mut |arena, child_id| {
                infer_type(
                    lexer_snapshot,
                    arena,
                    given_type_by_id,
                    delta_type_by_id,
                    child_id,
                )
            })
        }
        NodeKind::ListExpression => {
            list_expression_type(arena, id, &mut |arena, child_id| {
                infer_type(
                    lexer_snapshot,
                    arena,
                    given_type_by_id,
                    delta_type_by_id,
                    child_id,
                )
            })
        }
        NodeKind::ParenthesizedExpression => arena
            .child_ids(id)
            .iter()
            .find(|&&child_id| !matches!(arena.assert_xor(child_id).kind(), NodeKind::Constant))
            .map(|&child_id| {
                infer_type(
                    lexer_snapshot,
                    arena,
                    given_type_by_id,
                    delta_type_by_id,
                    child_id,
                )
            })
            .unwrap_or_else(Type::unknown),
        NodeKind::RecursivePrimaryExpression => arena
            .maybe_child_xor_by_attribute_index(id, 0, None)
            .map(|head| {
                infer_type(
                    lexer_snapshot,
                    arena,
                    given_type_by_id,
                    delta_type_by_id,
                    head.id(),
                )
            })
            .unwrap_or_else(Type::unknown),
        _ => Type::unknown(),
    };

    delta_type_by_id.insert(id, ty.clone());
    ty
}

/// `tryType` as actually called by a caller holding a persisted
/// [`TypeCache`] across runs (`spec.md` §4.6, §9): infers `id`'s type using
/// `cache.type_by_id` as the given-type tier, then folds this call's fresh
/// results back into it so the next call sees them as already-resolved.
pub fn infer_type_cached(
    lexer_snapshot: &LexerSnapshot,
    arena: &NodeIdMap,
    cache: &mut TypeCache,
    id: u32,
) -> Type {
    let mut delta_type_by_id = IndexMap::new();
    let ty = infer_type(lexer_snapshot, arena, &cache.type_by_id, &mut delta_type_by_id, id);
    cache.type_by_id.extend(delta_type_by_id);
    ty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;

    fn infer_root_type(text: &str) -> Type {
        let snapshot = crate::lexer::lex(text).unwrap();
        let outcome = Parser::new(text).parse().expect("parses");
        let given = IndexMap::new();
        let mut delta = IndexMap::new();
        infer_type(&snapshot, &outcome.arena, &given, &mut delta, outcome.root)
    }

    #[test]
    fn numeric_literal_infers_number() {
        assert_eq!(infer_root_type("1").kind, TypeKind::Number);
    }

    #[test]
    fn string_literal_infers_text() {
        assert_eq!(infer_root_type("\"hi\"").kind, TypeKind::Text);
    }

    #[test]
    fn boolean_literal_infers_logical() {
        assert_eq!(infer_root_type("true").kind, TypeKind::Logical);
    }

    #[test]
    fn null_literal_infers_nullable_null() {
        let ty = infer_root_type("null");
        assert_eq!(ty.kind, TypeKind::Null);
        assert!(ty.is_nullable);
    }

    #[test]
    fn arithmetic_expression_infers_number() {
        assert_eq!(infer_root_type("1 + 1").kind, TypeKind::Number);
    }

    #[test]
    fn is_expression_infers_logical() {
        assert_eq!(infer_root_type("1 is number").kind, TypeKind::Logical);
    }

    #[test]
    fn as_expression_infers_the_declared_type() {
        let ty = infer_root_type("1 as number");
        assert_eq!(ty.kind, TypeKind::Number);
        assert!(!ty.is_nullable);
    }

    #[test]
    fn as_expression_with_nullable_marker_is_nullable() {
        let ty = infer_root_type("1 as nullable number");
        assert_eq!(ty.kind, TypeKind::Number);
        assert!(ty.is_nullable);
    }

    #[test]
    fn parenthesized_expression_infers_its_inner_type() {
        assert_eq!(infer_root_type("(1)").kind, TypeKind::Number);
    }

    #[test]
    fn list_expression_infers_list_of_its_first_elements_type() {
        let ty = infer_root_type("{1, 2, 3}");
        assert_eq!(ty.kind, TypeKind::List);
        match ty.shape.as_deref() {
            Some(TypeShape::List { element }) => assert_eq!(element.kind, TypeKind::Number),
            other => panic!("expected a list shape, got {other:?}"),
        }
    }

    #[test]
    fn record_expression_infers_a_field_map() {
        let ty = infer_root_type("[a = 1, b = \"x\"]");
        assert_eq!(ty.kind, TypeKind::Record);
        match ty.shape.as_deref() {
            Some(TypeShape::Record { fields, is_open }) => {
                assert_eq!(fields.get("a").map(|t| &t.kind), Some(&TypeKind::Number));
                assert_eq!(fields.get("b").map(|t| &t.kind), Some(&TypeKind::Text));
                assert!(!is_open);
            }
            other => panic!("expected a record shape, got {other:?}"),
        }
    }

    #[test]
    fn function_expression_infers_parameter_and_return_types() {
        let ty = infer_root_type("(x as number) as text => \"x\"");
        assert_eq!(ty.kind, TypeKind::Function);
        match ty.shape.as_deref() {
            Some(TypeShape::Function {
                parameters,
                return_type,
            }) => {
                assert_eq!(parameters.len(), 1);
                assert_eq!(parameters[0].kind, TypeKind::Number);
                assert_eq!(return_type.kind, TypeKind::Text);
            }
            other => panic!("expected a function shape, got {other:?}"),
        }
    }

    #[test]
    fn each_expression_infers_function() {
        assert_eq!(infer_root_type("each 1").kind, TypeKind::Function);
    }

    #[test]
    fn unrecognized_node_kind_infers_unknown() {
        assert_eq!(infer_root_type("let x = 1 in x").kind, TypeKind::Unknown);
    }

    #[test]
    fn given_type_cache_short_circuits_inference() {
        let snapshot = crate::lexer::lex("1").unwrap();
        let outcome = Parser::new("1").parse().expect("parses");
        let mut given = IndexMap::new();
        given.insert(outcome.root, Type::simple(TypeKind::Text, true));
        let mut delta = IndexMap::new();
        let ty = infer_type(&snapshot, &outcome.arena, &given, &mut delta, outcome.root);
        assert_eq!(ty.kind, TypeKind::Text);
        assert!(ty.is_nullable);
    }

    #[test]
    fn infer_type_cached_persists_results_into_the_cache() {
        let snapshot = crate::lexer::lex("1 + 1").unwrap();
        let outcome = Parser::new("1 + 1").parse().expect("parses");
        let mut cache = TypeCache::default();
        assert!(cache.type_by_id.get(&outcome.root).is_none());
        let ty = infer_type_cached(&snapshot, &outcome.arena, &mut cache, outcome.root);
        assert_eq!(ty.kind, TypeKind::Number);
        assert_eq!(cache.type_by_id.get(&outcome.root), Some(&ty));
    }
}
