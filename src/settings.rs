//! Parse configuration (`spec.md` §6's input record, expanded per
//! `SPEC_FULL.md` §10), built the way `apollo_parser::Parser`'s own
//! builder methods (`recursion_limit`, `token_limit`) are chained.

use std::rc::Rc;

/// `parser: {CombinatorialParser | RecursiveDescentParser}` (`spec.md` §6).
/// Both share the same production interface and must produce byte-identical
/// ASTs for identical input (`spec.md` §4.3); they differ only in how the
/// binary-operator-chain productions fold adjacent reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserKind {
    #[default]
    RecursiveDescent,
    Combinatorial,
}

/// Recursion limit chosen the same way `apollo-parser`'s
/// `DEFAULT_RECURSION_LIMIT` was: experimentally, to stay well clear of a
/// stack overflow on deeply nested input.
const DEFAULT_RECURSION_LIMIT: usize = 500;

/// `{locale, parser, cancellationToken?, newParserState?}` (`spec.md` §6).
pub struct ParserSettings<'input> {
    pub(crate) text: &'input str,
    locale: String,
    parser_kind: ParserKind,
    cancellation_token: Option<Rc<dyn Fn() -> bool>>,
    recursion_limit: usize,
}

impl<'input> ParserSettings<'input> {
    pub fn new(text: &'input str) -> Self {
        Self {
            text,
            locale: String::from("en-US"),
            parser_kind: ParserKind::default(),
            cancellation_token: None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    /// A BCP-47 locale tag, used to select the error-message template set
    /// (`spec.md` §7, [`crate::localization`]). Defaults to `"en-US"`.
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn parser_kind(mut self, parser_kind: ParserKind) -> Self {
        self.parser_kind = parser_kind;
        self
    }

    /// A callback consulted at production boundaries; if it returns `true`
    /// the parse raises a cancellation error (`spec.md` §5).
    pub fn cancellation_token(mut self, token: impl Fn() -> bool + 'static) -> Self {
        self.cancellation_token = Some(Rc::new(token));
        self
    }

    pub fn recursion_limit(mut self, recursion_limit: usize) -> Self {
        self.recursion_limit = recursion_limit;
        self
    }

    pub fn locale_tag(&self) -> &str {
        &self.locale
    }

    pub(crate) fn parser_kind_value(&self) -> ParserKind {
        self.parser_kind
    }

    pub(crate) fn cancellation_token_fn(&self) -> Option<Rc<dyn Fn() -> bool>> {
        self.cancellation_token.clone()
    }

    pub(crate) fn recursion_limit_value(&self) -> usize {
        self.recursion_limit
    }
}
