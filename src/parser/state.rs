//! Parser state (components F, G, `spec.md` §4.3): the token cursor, the
//! node-id map it is building into, and the O(1) speculative
//! backup/restore primitive.

use std::rc::Rc;

use crate::lexer::{LexerSnapshot, Token, TokenKind};
use crate::parser::arena::NodeIdMap;
use crate::parser::error::{CsvContinuationKind, ParseError};
use crate::parser::node::{AstNode, ContextNode, NodeKind, TokenRange};
use crate::position::Position;
use crate::settings::{ParserKind, ParserSettings};

/// `{tokenIndex, idCounter, maybeContextNodeId}` (`spec.md` §4.3). An O(1)
/// capture: nothing but three integers.
#[derive(Debug, Clone, Copy)]
pub struct FastStateBackup {
    token_index: u32,
    id_counter: u32,
    maybe_current_context_node_id: Option<u32>,
}

/// `{lexerSnapshot, tokenIndex, maybeCurrentToken, maybeCurrentTokenKind,
/// contextState, maybeCurrentContextNode}` (`spec.md` §4.3).
pub struct ParserState<'snapshot> {
    lexer_snapshot: &'snapshot LexerSnapshot,
    token_index: u32,
    arena: NodeIdMap,
    id_counter: u32,
    maybe_current_context_node_id: Option<u32>,
    cancellation_token: Option<Rc<dyn Fn() -> bool>>,
    parser_kind: ParserKind,
    recursion_limit: usize,
    depth: u32,
}

impl<'snapshot> ParserState<'snapshot> {
    pub fn new(lexer_snapshot: &'snapshot LexerSnapshot, settings: &ParserSettings<'_>) -> Self {
        Self {
            lexer_snapshot,
            token_index: 0,
            arena: NodeIdMap::new(),
            id_counter: 0,
            maybe_current_context_node_id: None,
            cancellation_token: settings.cancellation_token_fn(),
            parser_kind: settings.parser_kind_value(),
            recursion_limit: settings.recursion_limit_value(),
            depth: 0,
        }
    }

    /// Which of the two front ends (`spec.md` §4.3's `ParserKind`) is
    /// driving this parse; the binary-operator chain is the one place the
    /// two engines genuinely diverge in control flow while still being
    /// required to produce byte-identical trees.
    pub fn parser_kind(&self) -> ParserKind {
        self.parser_kind
    }

    pub fn arena(&self) -> &NodeIdMap {
        &self.arena
    }

    pub fn into_arena(self) -> NodeIdMap {
        self.arena
    }

    pub fn token_index(&self) -> u32 {
        self.token_index
    }

    pub fn maybe_current_context_node_id(&self) -> Option<u32> {
        self.maybe_current_context_node_id
    }

    // -- token cursor --

    pub fn maybe_current_token(&self) -> Option<&'snapshot Token> {
        self.lexer_snapshot.tokens.get(self.token_index as usize)
    }

    pub fn maybe_current_token_kind(&self) -> Option<TokenKind> {
        self.maybe_current_token().map(|token| token.kind)
    }

    pub fn maybe_peek_token(&self, offset: u32) -> Option<&'snapshot Token> {
        self.lexer_snapshot
            .tokens
            .get((self.token_index + offset) as usize)
    }

    pub fn is_on_token_kind(&self, kind: TokenKind) -> bool {
        self.maybe_current_token_kind() == Some(kind)
    }

    pub fn is_next_token_kind(&self, kind: TokenKind) -> bool {
        self.maybe_peek_token(1).map(|t| t.kind) == Some(kind)
    }

    /// `isOnConstantKind`: the current token is an identifier-shaped token
    /// whose payload textually matches `data` (a keyword form that the
    /// lexer did not itself tag with a dedicated `TokenKind`, or whose
    /// `TokenKind` we want to check by spelling rather than kind).
    pub fn is_on_constant_kind(&self, data: &str) -> bool {
        self.maybe_current_token()
            .map(|t| t.data == data)
            .unwrap_or(false)
    }

    /// `isOnGeneralizedIdentifierStart`.
    pub fn is_on_generalized_identifier_start(&self) -> bool {
        self.maybe_current_token_kind()
            .map(TokenKind::is_generalized_identifier_start)
            .unwrap_or(false)
    }

    /// `isRecursivePrimaryExpressionNext`: peek for `{`, `[`, or `(`.
    pub fn is_recursive_primary_expression_next(&self) -> bool {
        matches!(
            self.maybe_current_token_kind(),
            Some(TokenKind::LeftBrace | TokenKind::LeftBracket | TokenKind::LeftParenthesis)
        )
    }

    pub(crate) fn current_position(&self) -> Position {
        self.maybe_current_token()
            .map(|t| t.position_start)
            .or_else(|| self.lexer_snapshot.tokens.last().map(|t| t.position_end))
            .unwrap_or_default()
    }

    /// Consumes the current token, asserting its kind. Returns the consumed
    /// token's text.
    pub fn expect_token_kind(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        match self.maybe_current_token() {
            Some(token) if token.kind == kind => {
                let token = token.clone();
                self.token_index += 1;
                Ok(token)
            }
            other => Err(ParseError::ExpectedTokenKind {
                expected: kind,
                actual: other.map(|t| t.kind),
                actual_data: other.map(|t| t.data.clone()).unwrap_or_default(),
                position: self.current_position(),
            }),
        }
    }

    pub fn expect_any_token_kind(&mut self, kinds: &[TokenKind]) -> Result<Token, ParseError> {
        match self.maybe_current_token() {
            Some(token) if kinds.contains(&token.kind) => {
                let token = token.clone();
                self.token_index += 1;
                Ok(token)
            }
            other => Err(ParseError::ExpectedAnyTokenKind {
                expected: kinds.to_vec(),
                actual: other.map(|t| t.kind),
                actual_data: other.map(|t| t.data.clone()).unwrap_or_default(),
                position: self.current_position(),
            }),
        }
    }

    pub fn csv_continuation_error(&self, kind: CsvContinuationKind) -> ParseError {
        ParseError::ExpectedCsvContinuation {
            kind,
            position: self.current_position(),
        }
    }

    pub fn unterminated_parentheses_error(&self, start: Position) -> ParseError {
        ParseError::UnterminatedParentheses { start }
    }

    pub fn unterminated_bracket_error(&self, start: Position) -> ParseError {
        ParseError::UnterminatedBracket { start }
    }

    pub fn unused_tokens_remain_error(&self) -> ParseError {
        ParseError::UnusedTokensRemain {
            position: self.current_position(),
        }
    }

    pub fn invalid_primitive_type_error(&self) -> ParseError {
        ParseError::InvalidPrimitiveType {
            actual_data: self
                .maybe_current_token()
                .map(|t| t.data.clone())
                .unwrap_or_default(),
            position: self.current_position(),
        }
    }

    /// Consults the user-supplied cancellation hook. Checked at production
    /// boundaries (`spec.md` §5); the caller turns a `true` result into a
    /// `CommonError::Cancellation`.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.as_ref().map(|f| f()).unwrap_or(false)
    }

    /// Called once per `expression` production (`grammar::expression`),
    /// the single choke point every nested form (parenthesized, list,
    /// record, function body, ...) recurses back through. Checks
    /// cancellation and increments the nesting depth, failing if either
    /// the caller's cancellation hook fires or `recursion_limit` is
    /// exceeded. Must be paired with exactly one `exit_production` call,
    /// on every return path, successful or not.
    pub(crate) fn enter_production(&mut self) -> Result<(), ParseError> {
        if self.is_cancelled() {
            return Err(ParseError::Cancelled {
                position: self.current_position(),
            });
        }
        self.depth += 1;
        if self.depth as usize > self.recursion_limit {
            self.depth -= 1;
            return Err(ParseError::RecursionLimit {
                limit: self.recursion_limit,
                position: self.current_position(),
            });
        }
        Ok(())
    }

    pub(crate) fn exit_production(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // -- context bookkeeping (production protocol, `spec.md` §4.3) --

    /// `startContext(kind)`: allocates a context node, links it as a child
    /// of the current context, and makes it current.
    pub fn start_context(&mut self, kind: NodeKind) -> u32 {
        let parent_id = self.maybe_current_context_node_id;
        let maybe_attribute_index = parent_id.map(|parent_id| {
            self.arena
                .maybe_context(parent_id)
                .map(|ctx| ctx.attribute_counter)
                .unwrap_or(0)
        });

        let id = self.id_counter;
        self.id_counter += 1;

        self.arena.insert_context(ContextNode {
            id,
            kind,
            maybe_attribute_index,
            maybe_token_start: self.maybe_current_token().map(|t| t.position_start),
            token_index_start: self.token_index,
            attribute_counter: 0,
            maybe_parent_id: parent_id,
        });
        self.maybe_current_context_node_id = Some(id);
        id
    }

    /// Called by a child production immediately after it succeeds, so the
    /// parent's next child gets the right `maybeAttributeIndex`.
    pub fn increment_attribute_counter(&mut self, parent_id: u32) {
        if let Some(ctx) = self.arena_mut_context(parent_id) {
            ctx.attribute_counter += 1;
        }
    }

    fn arena_mut_context(&mut self, id: u32) -> Option<&mut ContextNode> {
        self.arena.maybe_context_mut(id)
    }

    /// `endContext(astNode)`: promotes the current context node to `kind`,
    /// restoring the parent as current. The caller supplies the completed
    /// node's `token_range` and leaf-ness; everything else is threaded
    /// through from the context being closed.
    pub fn end_context(
        &mut self,
        context_id: u32,
        kind: NodeKind,
        token_range: TokenRange,
        is_leaf: bool,
    ) {
        let context = self
            .arena
            .maybe_context(context_id)
            .unwrap_or_else(|| panic!("endContext on unknown context id {context_id}"))
            .clone();
        debug_assert_eq!(context.kind, kind, "endContext kind mismatch");

        self.arena.promote(
            context_id,
            AstNode {
                id: context_id,
                kind,
                maybe_attribute_index: context.maybe_attribute_index,
                token_range,
                is_leaf,
            },
        );
        if let Some(parent_id) = context.maybe_parent_id {
            self.increment_attribute_counter(parent_id);
        }
        self.maybe_current_context_node_id = context.maybe_parent_id;
    }

    /// `token_range` for a context that consumed `[token_index_start,
    /// token_index)`, used by callers constructing the `endContext`
    /// argument.
    pub fn token_range_since(&self, context_id: u32) -> TokenRange {
        let context = self.arena.maybe_context(context_id).expect("open context");
        let index_start = context.token_index_start;
        let index_end = self.token_index;
        let position_start = context
            .maybe_token_start
            .or_else(|| self.maybe_current_token().map(|t| t.position_start))
            .unwrap_or_default();
        let position_end = if index_end > index_start {
            self.lexer_snapshot.tokens[(index_end - 1) as usize].position_end
        } else {
            position_start
        };
        TokenRange {
            index_start,
            index_end,
            position_start,
            position_end,
        }
    }

    /// Retroactively wraps the already-completed node `child_id` (the
    /// current context's previous child) in a new context of `wrapper_kind`,
    /// taking `child_id`'s old place in its parent's child list. Used to
    /// build `RecursivePrimaryExpression` only once a trailing
    /// invoke/index/field-access is actually seen, so a bare primary (e.g.
    /// scenario parsing a lone `1`) stays unwrapped. There is no rowan-style
    /// checkpoint here, so this is an explicit narrow reparent instead: undo
    /// the attribute-counter bump `end_context` already applied to the old
    /// parent, open the wrapper in the old parent's place, then adopt the
    /// child as the wrapper's first attribute.
    pub(crate) fn wrap_completed_child(&mut self, child_id: u32, wrapper_kind: NodeKind) -> u32 {
        let maybe_old_parent_id = self.arena.maybe_parent_id(child_id);
        if let Some(old_parent_id) = maybe_old_parent_id {
            self.arena.decrement_attribute_counter(old_parent_id);
        }
        self.maybe_current_context_node_id = maybe_old_parent_id;

        let wrapper_id = self.start_context(wrapper_kind);
        self.arena.reparent_as_first_child(child_id, wrapper_id);
        self.arena.set_attribute_counter(wrapper_id, 1);
        if let Some(child) = self.arena.maybe_ast(child_id) {
            let index_start = child.token_range.index_start;
            let position_start = child.token_range.position_start;
            self.arena
                .set_context_start(wrapper_id, index_start, Some(position_start));
        }
        wrapper_id
    }

    // -- speculative read (`spec.md` §4.3) --

    /// `fastStateBackup`: an O(1) capture of everything restore needs.
    pub fn fast_state_backup(&self) -> FastStateBackup {
        FastStateBackup {
            token_index: self.token_index,
            id_counter: self.id_counter,
            maybe_current_context_node_id: self.maybe_current_context_node_id,
        }
    }

    /// Delta rollback: deletes every node minted since `backup` was taken
    /// and rebinds the cursor and current context to the backed-up values.
    pub fn apply_fast_state_backup(&mut self, backup: FastStateBackup) {
        self.token_index = backup.token_index;
        self.arena.delete_ids_above(backup.id_counter);
        self.id_counter = backup.id_counter;
        self.maybe_current_context_node_id = backup.maybe_current_context_node_id;
    }

    /// Runs `f` speculatively: on `Err`, the state is rolled back to
    /// exactly as it was before `f` ran.
    pub fn speculate<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let backup = self.fast_state_backup();
        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.apply_fast_state_backup(backup);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;
    use crate::parser::grammar::expression;
    use crate::settings::ParserSettings;

    /// Invariant 6: a failed speculative read leaves `tokenIndex`,
    /// `idCounter`, and `maybeCurrentContextNode` exactly as they were
    /// before the speculation began.
    #[test]
    fn failed_speculation_restores_cursor_and_id_counter() {
        let snapshot = lexer::lex("1 + ").unwrap();
        let settings = ParserSettings::new("1 + ");
        let mut parser = ParserState::new(&snapshot, &settings);

        let before_index = parser.token_index();
        let before_id_counter = parser.id_counter;
        let before_context = parser.maybe_current_context_node_id();

        let result = parser.speculate(|parser| {
            let id = parser.start_context(NodeKind::ParenthesizedExpression);
            expression(parser)?;
            let range = parser.token_range_since(id);
            parser.end_context(id, NodeKind::ParenthesizedExpression, range, false);
            Ok(id)
        });

        assert!(result.is_err());
        assert_eq!(parser.token_index(), before_index);
        assert_eq!(parser.id_counter, before_id_counter);
        assert_eq!(parser.maybe_current_context_node_id(), before_context);
    }

    /// Invariant 5: every `start_context` on a normal-return path is matched
    /// by exactly one `end_context`, so a fully successful parse leaves
    /// `maybe_current_context_node_id` at its entry value (`None`, here,
    /// since the whole expression completes).
    #[test]
    fn successful_parse_returns_current_context_to_entry_value() {
        let snapshot = lexer::lex("1 + 2").unwrap();
        let settings = ParserSettings::new("1 + 2");
        let mut parser = ParserState::new(&snapshot, &settings);

        expression(&mut parser).unwrap();

        assert_eq!(parser.maybe_current_context_node_id(), None);
    }

    #[test]
    fn enter_production_is_balanced_by_exit_production() {
        let snapshot = lexer::lex("1").unwrap();
        let settings = ParserSettings::new("1");
        let mut parser = ParserState::new(&snapshot, &settings);

        parser.enter_production().unwrap();
        assert_eq!(parser.depth, 1);
        parser.enter_production().unwrap();
        assert_eq!(parser.depth, 2);
        parser.exit_production();
        parser.exit_production();
        assert_eq!(parser.depth, 0);
    }

    #[test]
    fn enter_production_fails_past_the_recursion_limit() {
        let snapshot = lexer::lex("1").unwrap();
        let settings = ParserSettings::new("1").recursion_limit(1);
        let mut parser = ParserState::new(&snapshot, &settings);

        parser.enter_production().expect("within the limit");
        let result = parser.enter_production();
        assert!(matches!(
            result,
            Err(ParseError::RecursionLimit { limit: 1, .. })
        ));
        // A failed `enter_production` must not itself bump the depth it just
        // rejected -- otherwise depth would climb unboundedly on repeated
        // failed attempts at the same nesting level.
        assert_eq!(parser.depth, 1);
    }

    #[test]
    fn enter_production_fails_when_cancelled() {
        let snapshot = lexer::lex("1").unwrap();
        let settings = ParserSettings::new("1").cancellation_token(|| true);
        let mut parser = ParserState::new(&snapshot, &settings);

        assert!(matches!(
            parser.enter_production(),
            Err(ParseError::Cancelled { .. })
        ));
        assert_eq!(parser.depth, 0);
    }
}
