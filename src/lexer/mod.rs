//! The incremental lexer (`spec.md` §4.1-4.2): a line-oriented tokenizer
//! with cheap insertion/replacement edits, and a snapshot step that fuses
//! the line model into the flat token stream the parser consumes.

mod comment;
mod cursor;
mod error;
mod line;
mod snapshot;
mod state;
mod token;

pub use comment::{Comment, CommentKind};
pub use error::{LexError, MultilineError};
pub use line::{Line, LineMode, LineTerminator};
pub use snapshot::LexerSnapshot;
pub use state::{ErrorLineMap, LexerState};
pub use token::{Token, TokenKind};

/// Convenience wrapper over `stateFrom` + `tryFrom` for callers who do not
/// need to hold the editable `LexerState` themselves -- most parsing entry
/// points just want a finished snapshot (`spec.md` §2's data-flow diagram:
/// text → C → D).
pub fn lex(text: &str) -> Result<LexerSnapshot, MultilineError> {
    let state = LexerState::state_from(text);
    LexerSnapshot::try_from(&state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_convenience_wrapper_matches_manual_pipeline() {
        let direct = lex("let x = 1 in x").unwrap();
        let manual = LexerSnapshot::try_from(&LexerState::state_from("let x = 1 in x")).unwrap();
        assert_eq!(direct.tokens.len(), manual.tokens.len());
    }
}
