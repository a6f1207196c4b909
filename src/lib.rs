//! A pure, incremental lexer and error-tolerant parser for the Power
//! Query/M formula language.
//!
//! The crate is organized around three subsystems that mirror the
//! architecture of a typical IDE-grade language front end:
//!
//! * [`lexer`] — a line-oriented tokenizer that supports incremental edits
//!   (insert/replace/delete a line range) and multi-line token forms (block
//!   comments, quoted identifiers, multi-line strings), collapsed by
//!   [`lexer::LexerSnapshot`] into a flat token stream.
//! * [`parser`] — a combinator-style recursive-descent engine that builds a
//!   dual context/AST tree in an arena ([`parser::arena::NodeIdMap`]) with
//!   an O(1) speculative backup/restore primitive.
//! * [`inspection`] — given a cursor position and a (possibly partial) parse
//!   tree, computes lexical scope and a structural type for the expression
//!   under the cursor.
//!
//! ```rust
//! use m_parser::Parser;
//!
//! let parser = Parser::new("let x = 1 in x + 1");
//! let result = parser.parse();
//! assert!(result.is_ok());
//! ```

pub mod error;
pub mod inspection;
pub mod lexer;
pub mod localization;
pub mod parser;
pub mod position;
pub mod settings;

pub use crate::error::CommonError;
pub use crate::parser::{ParseOutcome, Parser};
pub use crate::settings::{ParserKind, ParserSettings};
