//! The snapshot step (component D, `spec.md` §4.2): collapses the per-line
//! `Begin`/`Content`/`End` token triples produced by the line lexer into a
//! flat, immutable token stream, and detects multi-line forms that never
//! closed.

use crate::lexer::comment::{Comment, CommentKind};
use crate::lexer::error::MultilineError;
use crate::lexer::line::{LineTerminator, RawKind};
use crate::lexer::state::LexerState;
use crate::lexer::token::{Token, TokenKind};
use crate::position::Position;

/// `{tokens, comments, lineTerminators}`, plus the fact that every token
/// already carries its own absolute start position -- grapheme columns are
/// derived on demand from that via [`crate::position::column_number`]
/// (`spec.md` §4.2).
#[derive(Debug, Clone)]
pub struct LexerSnapshot {
    pub tokens: Vec<Token>,
    pub comments: Vec<Comment>,
    pub line_terminators: Vec<LineTerminator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingKind {
    BlockComment,
    QuotedIdentifier,
    String,
}

struct Pending {
    kind: PendingKind,
    start: Position,
    data: String,
}

impl LexerSnapshot {
    /// `tryFrom(state) -> Snapshot | MultilineError`. Fails iff some `Begin`
    /// token never found its matching `End` anywhere in the rest of the
    /// document (`spec.md` §4.2).
    pub fn try_from(state: &LexerState) -> Result<Self, MultilineError> {
        let mut tokens = Vec::new();
        let mut comments = Vec::new();
        let mut pending: Option<Pending> = None;
        let line_terminators = state.lines().iter().map(|l| l.line_terminator).collect();

        for line in state.lines() {
            for raw in &line.tokens {
                match raw.kind {
                    RawKind::Finished(kind) => {
                        tokens.push(Token::new(
                            kind,
                            raw.data.clone(),
                            raw.position_start,
                            raw.position_end,
                        ));
                    }
                    RawKind::LineComment => {
                        comments.push(Comment {
                            kind: CommentKind::Line,
                            data: raw.data.clone(),
                            position_start: raw.position_start,
                            position_end: raw.position_end,
                            contains_newline: false,
                        });
                    }
                    RawKind::BlockCommentBegin => {
                        pending = Some(Pending {
                            kind: PendingKind::BlockComment,
                            start: raw.position_start,
                            data: String::new(),
                        });
                    }
                    RawKind::QuotedIdentifierBegin => {
                        pending = Some(Pending {
                            kind: PendingKind::QuotedIdentifier,
                            start: raw.position_start,
                            data: String::new(),
                        });
                    }
                    RawKind::StringBegin => {
                        pending = Some(Pending {
                            kind: PendingKind::String,
                            start: raw.position_start,
                            data: String::new(),
                        });
                    }
                    RawKind::BlockCommentContent
                    | RawKind::QuotedIdentifierContent
                    | RawKind::StringContent => {
                        // Invariant: a `*Content` raw token only ever
                        // follows a `*Begin` on an earlier line within the
                        // same line-lexer run (`spec.md` §4.1).
                        let p = pending
                            .as_mut()
                            .expect("content token without a pending begin");
                        p.data.push_str(&raw.data);
                    }
                    RawKind::BlockCommentEnd => {
                        let p = pending.take().expect("end token without a pending begin");
                        let contains_newline = raw.position_end.line_number != p.start.line_number;
                        let inner = strip_suffix_len(&raw.data, 2);
                        comments.push(Comment {
                            kind: CommentKind::Block,
                            data: format!("{}{}", p.data, inner),
                            position_start: p.start,
                            position_end: raw.position_end,
                            contains_newline,
                        });
                    }
                    RawKind::QuotedIdentifierEnd => {
                        let p = pending.take().expect("end token without a pending begin");
                        let inner = strip_suffix_len(&raw.data, 1);
                        tokens.push(Token::new(
                            TokenKind::QuotedIdentifier,
                            format!("{}{}", p.data, inner),
                            p.start,
                            raw.position_end,
                        ));
                    }
                    RawKind::StringEnd => {
                        let p = pending.take().expect("end token without a pending begin");
                        let inner = strip_suffix_len(&raw.data, 1);
                        tokens.push(Token::new(
                            TokenKind::StringLiteral,
                            format!("{}{}", p.data, inner),
                            p.start,
                            raw.position_end,
                        ));
                    }
                }
            }
        }

        if let Some(p) = pending {
            return Err(match p.kind {
                PendingKind::BlockComment => {
                    MultilineError::UnterminatedBlockComment { start: p.start }
                }
                PendingKind::QuotedIdentifier => {
                    MultilineError::UnterminatedQuotedIdentifier { start: p.start }
                }
                PendingKind::String => MultilineError::UnterminatedString { start: p.start },
            });
        }

        Ok(LexerSnapshot {
            tokens,
            comments,
            line_terminators,
        })
    }
}

/// Drops the trailing closing delimiter (`"` or `*/`) a closed `*End` raw
/// token's data carries, leaving just the content covered between
/// delimiters -- `spec.md`'s scenario *S6* pins the fused token's `data` to
/// exactly that inner text, e.g. `a` rather than `"a"`.
fn strip_suffix_len(data: &str, len: usize) -> &str {
    &data[..data.len() - len]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unterminated_block_comment_fails_snapshot() {
        let state = LexerState::state_from("/* open");
        let err = LexerSnapshot::try_from(&state).unwrap_err();
        assert!(matches!(err, MultilineError::UnterminatedBlockComment { .. }));
    }

    #[test]
    fn single_line_string_round_trips_plain_data() {
        let state = LexerState::state_from("\"a\"");
        let snapshot = LexerSnapshot::try_from(&state).unwrap();
        assert_eq!(snapshot.tokens.len(), 1);
        assert_eq!(snapshot.tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(snapshot.tokens[0].data, "a");
    }

    #[test]
    fn incremental_append_then_update_closes_string_across_edits() {
        let mut state = LexerState::state_from("// hello");
        state.append_line("\"a", LineTerminator::Lf);
        state.try_update_line(1, "\"a\"").unwrap();
        let snapshot = LexerSnapshot::try_from(&state).unwrap();
        assert_eq!(snapshot.tokens.len(), 1);
        assert_eq!(snapshot.tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(snapshot.tokens[0].data, "a");
    }

    #[test]
    fn line_comment_is_routed_to_comments_not_tokens() {
        let state = LexerState::state_from("// hi\n1");
        let snapshot = LexerSnapshot::try_from(&state).unwrap();
        assert_eq!(snapshot.tokens.len(), 1);
        assert_eq!(snapshot.comments.len(), 1);
        assert_eq!(snapshot.comments[0].kind, CommentKind::Line);
    }
}
