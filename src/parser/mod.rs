//! The parser runtime (components F, G, H, `spec.md` §4.3-§4.4): the
//! node-id map, parser state, and the grammar built on top of them, wired
//! up behind the public [`Parser`] entry point (`spec.md` §6's
//! `tryLexAndParse`).

pub mod arena;
pub mod error;
pub(crate) mod grammar;
pub mod node;
pub mod state;

pub use error::{CsvContinuationKind, ParseError};

use crate::error::CommonError;
use crate::lexer;
use crate::parser::arena::NodeIdMap;
use crate::parser::state::ParserState;
use crate::settings::ParserSettings;

/// `{ok, root, nodeIdMapCollection, leafNodeIds}` (`spec.md` §6). `root` is
/// the id of the outermost AST node; `arena` is the full node-id map,
/// already public about its own `leaf_node_ids()`.
#[derive(Debug)]
pub struct ParseOutcome {
    pub root: u32,
    pub arena: NodeIdMap,
}

/// The `{err, error}` arm of `tryLexAndParse`: a failed parse still hands
/// back whatever context was built before the failure, so inspection can
/// run against a partial tree (`spec.md` §4.3, §7).
#[derive(Debug)]
pub struct ParseFailure {
    pub error: CommonError,
    pub arena: NodeIdMap,
}

/// Dispatches the top-level production: a document is either a `section`
/// header followed by members, or a single expression. Either way every
/// token must be consumed, or `UnusedTokensRemainError` is raised.
fn parse_document(parser: &mut ParserState) -> Result<u32, ParseError> {
    let root = if parser.is_on_token_kind(lexer::TokenKind::Section) {
        grammar::section::section_document(parser)?
    } else {
        grammar::expression(parser)?
    };
    if parser.maybe_current_token_kind().is_some() {
        return Err(parser.unused_tokens_remain_error());
    }
    Ok(root)
}

/// The crate's public entry point: lexes `text`, then parses it according
/// to `settings` (`spec.md` §6's `tryLexAndParse`).
pub struct Parser<'input> {
    settings: ParserSettings<'input>,
}

impl<'input> Parser<'input> {
    pub fn new(text: &'input str) -> Self {
        Self {
            settings: ParserSettings::new(text),
        }
    }

    pub fn with_settings(settings: ParserSettings<'input>) -> Self {
        Self { settings }
    }

    /// Runs the lex, then the parse, against `self.settings.text`.
    /// `CommonError::Lex`/`Multiline` carry no partial arena (they fail
    /// before a single context node exists); a `ParseError` failure does,
    /// since the production protocol leaves the node-id map in place on
    /// throw (`spec.md` §4.3, §7).
    pub fn parse(&self) -> Result<ParseOutcome, ParseFailure> {
        let snapshot = match lexer::lex(self.settings.text) {
            Ok(snapshot) => snapshot,
            Err(multiline_error) => {
                return Err(ParseFailure {
                    error: CommonError::Multiline(multiline_error),
                    arena: NodeIdMap::new(),
                });
            }
        };

        let mut parser = ParserState::new(&snapshot, &self.settings);
        match parse_document(&mut parser) {
            Ok(root) => Ok(ParseOutcome {
                root,
                arena: parser.into_arena(),
            }),
            Err(ParseError::Cancelled { .. }) => Err(ParseFailure {
                error: CommonError::Cancellation,
                arena: parser.into_arena(),
            }),
            Err(parse_error) => Err(ParseFailure {
                error: CommonError::Parse(parse_error),
                arena: parser.into_arena(),
            }),
        }
    }
}
