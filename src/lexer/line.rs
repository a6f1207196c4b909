//! The line lexer (component B) and the `Line` record (component C's unit
//! of storage), `spec.md` §3, §4.1.

use crate::lexer::cursor::Cursor;
use crate::lexer::error::LexError;
use crate::lexer::token::{Token, TokenKind};
use crate::position::Position;

/// The lexer "mode" threaded across line boundaries. Invariant (`spec.md`
/// §3): `lineN.kind_at_end == lineN+1.kind_at_start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    Default,
    InsideBlockComment,
    InsideQuotedIdentifier,
    InsideString,
}

impl Default for LineMode {
    fn default() -> Self {
        LineMode::Default
    }
}

/// The line-terminator set named in `spec.md` §6. `Eof` marks a final line
/// with no trailing terminator (including the single empty line of an
/// entirely empty document).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTerminator {
    CrLf,
    Lf,
    Cr,
    LineSeparator,
    ParagraphSeparator,
    VerticalTab,
    FormFeed,
    Nel,
    Eof,
}

impl LineTerminator {
    pub fn as_str(self) -> &'static str {
        match self {
            LineTerminator::CrLf => "\r\n",
            LineTerminator::Lf => "\n",
            LineTerminator::Cr => "\r",
            LineTerminator::LineSeparator => "\u{2028}",
            LineTerminator::ParagraphSeparator => "\u{2029}",
            LineTerminator::VerticalTab => "\u{000B}",
            LineTerminator::FormFeed => "\u{000C}",
            LineTerminator::Nel => "\u{0085}",
            LineTerminator::Eof => "",
        }
    }

    /// Detects which terminator (if any) `text` starts with at `at`,
    /// returning the terminator and its byte length.
    pub(crate) fn detect(text: &str, at: usize) -> Option<(LineTerminator, usize)> {
        let rest = &text[at..];
        if rest.starts_with("\r\n") {
            Some((LineTerminator::CrLf, 2))
        } else if rest.starts_with('\n') {
            Some((LineTerminator::Lf, 1))
        } else if rest.starts_with('\r') {
            Some((LineTerminator::Cr, 1))
        } else if rest.starts_with('\u{2028}') {
            Some((LineTerminator::LineSeparator, 3))
        } else if rest.starts_with('\u{2029}') {
            Some((LineTerminator::ParagraphSeparator, 3))
        } else if rest.starts_with('\u{000B}') {
            Some((LineTerminator::VerticalTab, 1))
        } else if rest.starts_with('\u{000C}') {
            Some((LineTerminator::FormFeed, 1))
        } else if rest.starts_with('\u{0085}') {
            Some((LineTerminator::Nel, 2))
        } else {
            None
        }
    }
}

/// The raw per-line token kind. A small superset of [`TokenKind`]: the three
/// multi-line forms (block comment, quoted identifier, string literal) are
/// lexed as `Begin`/`Content`/`End` triples that [`crate::lexer::snapshot`]
/// later fuses into a single [`Token`] or [`crate::lexer::comment::Comment`].
/// This distinction never crosses the snapshot boundary, so it stays
/// private to the line lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawKind {
    Finished(TokenKind),
    LineComment,
    BlockCommentBegin,
    BlockCommentContent,
    BlockCommentEnd,
    QuotedIdentifierBegin,
    QuotedIdentifierContent,
    QuotedIdentifierEnd,
    StringBegin,
    StringContent,
    StringEnd,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawToken {
    pub(crate) kind: RawKind,
    pub(crate) data: String,
    pub(crate) position_start: Position,
    pub(crate) position_end: Position,
}

/// `(kindAtStart, kindAtEnd, lineString, lineTerminator, tokens,
/// maybeError)`, `spec.md` §3.
#[derive(Debug, Clone)]
pub struct Line {
    pub(crate) kind_at_start: LineMode,
    pub(crate) kind_at_end: LineMode,
    pub line_string: String,
    pub line_terminator: LineTerminator,
    pub(crate) tokens: Vec<RawToken>,
    pub maybe_error: Option<LexError>,
}

impl Line {
    pub fn is_empty_default(&self) -> bool {
        self.line_string.is_empty()
            && self.kind_at_start == LineMode::Default
            && self.kind_at_end == LineMode::Default
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn keyword_kind(word: &str) -> Option<TokenKind> {
    Some(match word {
        "and" => TokenKind::And,
        "as" => TokenKind::As,
        "each" => TokenKind::Each,
        "else" => TokenKind::Else,
        "error" => TokenKind::Error,
        "false" => TokenKind::False,
        "if" => TokenKind::If,
        "in" => TokenKind::In,
        "is" => TokenKind::Is,
        "let" => TokenKind::Let,
        "meta" => TokenKind::Meta,
        "not" => TokenKind::Not,
        "null" => TokenKind::NullLiteral,
        "or" => TokenKind::Or,
        "otherwise" => TokenKind::Otherwise,
        "section" => TokenKind::Section,
        "shared" => TokenKind::Shared,
        "then" => TokenKind::Then,
        "true" => TokenKind::True,
        "try" => TokenKind::Try,
        "type" => TokenKind::Type,
        _ => return None,
    })
}

fn hash_keyword_kind(word: &str) -> Option<TokenKind> {
    Some(match word {
        "#binary" => TokenKind::HashBinary,
        "#date" => TokenKind::HashDate,
        "#datetime" => TokenKind::HashDateTime,
        "#datetimezone" => TokenKind::HashDateTimeZone,
        "#duration" => TokenKind::HashDuration,
        "#infinity" => TokenKind::HashInfinity,
        "#nan" => TokenKind::HashNan,
        "#sections" => TokenKind::HashSections,
        "#shared" => TokenKind::HashShared,
        "#table" => TokenKind::HashTable,
        "#time" => TokenKind::HashTime,
        _ => return None,
    })
}

/// Tokenizes one line's text, threading `mode` in from the previous line's
/// `kind_at_end` and returning this line's tokens, outgoing mode, and at
/// most one line-isolated error (`spec.md` §4.1).
pub(crate) fn tokenize_line(
    line_number: u32,
    text: &str,
    mode: LineMode,
) -> (Vec<RawToken>, LineMode, Option<LexError>) {
    let mut tokens = Vec::new();
    let mut cursor = Cursor::new(text);
    let mut current_mode = mode;

    let mut error = None;

    loop {
        let pos_before = cursor.code_units_consumed();
        match current_mode {
            LineMode::Default => {
                if cursor.is_eof() {
                    break;
                }
                match lex_default(line_number, &mut cursor, pos_before) {
                    Ok(Some(token)) => {
                        let entering_multiline = matches!(
                            token.kind,
                            RawKind::BlockCommentBegin
                                | RawKind::QuotedIdentifierBegin
                                | RawKind::StringBegin
                        );
                        tokens.push(token);
                        if entering_multiline {
                            current_mode = match tokens.last().unwrap().kind {
                                RawKind::BlockCommentBegin => LineMode::InsideBlockComment,
                                RawKind::QuotedIdentifierBegin => LineMode::InsideQuotedIdentifier,
                                RawKind::StringBegin => LineMode::InsideString,
                                _ => unreachable!(),
                            };
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        error = Some(err);
                        break;
                    }
                }
            }
            LineMode::InsideBlockComment => {
                let (token, closed) = lex_multiline_rest(
                    line_number,
                    &mut cursor,
                    pos_before,
                    "*/",
                    RawKind::BlockCommentContent,
                    RawKind::BlockCommentEnd,
                );
                tokens.push(token);
                if closed {
                    current_mode = LineMode::Default;
                }
                if cursor.is_eof() {
                    break;
                }
            }
            LineMode::InsideQuotedIdentifier => {
                let (token, closed) = lex_multiline_quoted(
                    line_number,
                    &mut cursor,
                    pos_before,
                    RawKind::QuotedIdentifierContent,
                    RawKind::QuotedIdentifierEnd,
                );
                tokens.push(token);
                if closed {
                    current_mode = LineMode::Default;
                }
                if cursor.is_eof() {
                    break;
                }
            }
            LineMode::InsideString => {
                let (token, closed) = lex_multiline_quoted(
                    line_number,
                    &mut cursor,
                    pos_before,
                    RawKind::StringContent,
                    RawKind::StringEnd,
                );
                tokens.push(token);
                if closed {
                    current_mode = LineMode::Default;
                }
                if cursor.is_eof() {
                    break;
                }
            }
        }
    }

    (tokens, current_mode, error)
}

/// Consumes the rest of the line as content for a `"`-delimited multi-line
/// form (quoted identifier or string literal), where `""` is a literal
/// escaped quote and an unescaped `"` closes the form.
fn lex_multiline_quoted(
    line_number: u32,
    cursor: &mut Cursor,
    pos_before: u32,
    content_kind: RawKind,
    end_kind: RawKind,
) -> (RawToken, bool) {
    let mut buf = String::new();
    let mut closed = false;
    loop {
        if cursor.is_eof() {
            break;
        }
        if cursor.first() == '"' {
            if cursor.second() == '"' {
                buf.push('"');
                buf.push('"');
                cursor.bump();
                cursor.bump();
                continue;
            }
            cursor.bump();
            closed = true;
            break;
        }
        buf.push(cursor.bump().unwrap());
    }
    let pos_after = cursor.code_units_consumed();
    let kind = if closed { end_kind } else { content_kind };
    if closed {
        buf.push('"');
    }
    (
        RawToken {
            kind,
            data: buf,
            position_start: Position::new(line_number, pos_before),
            position_end: Position::new(line_number, pos_after),
        },
        closed,
    )
}

/// Consumes the rest of the line looking for `closer` (`*/`), treating
/// everything else as block-comment content.
fn lex_multiline_rest(
    line_number: u32,
    cursor: &mut Cursor,
    pos_before: u32,
    closer: &str,
    content_kind: RawKind,
    end_kind: RawKind,
) -> (RawToken, bool) {
    let mut buf = String::new();
    let mut closed = false;
    let close_first = closer.chars().next().unwrap();
    let close_second = closer.chars().nth(1).unwrap();
    loop {
        if cursor.is_eof() {
            break;
        }
        if cursor.first() == close_first && cursor.second() == close_second {
            cursor.bump();
            cursor.bump();
            closed = true;
            break;
        }
        buf.push(cursor.bump().unwrap());
    }
    let pos_after = cursor.code_units_consumed();
    let kind = if closed { end_kind } else { content_kind };
    if closed {
        buf.push_str(closer);
    }
    (
        RawToken {
            kind,
            data: buf,
            position_start: Position::new(line_number, pos_before),
            position_end: Position::new(line_number, pos_after),
        },
        closed,
    )
}

fn lex_default(
    line_number: u32,
    cursor: &mut Cursor,
    pos_before: u32,
) -> Result<Option<RawToken>, LexError> {
    let make = |kind: RawKind, data: String, start: u32, cursor: &Cursor| RawToken {
        kind,
        data,
        position_start: Position::new(line_number, start),
        position_end: Position::new(line_number, cursor.code_units_consumed()),
    };

    if cursor.first().is_whitespace() {
        cursor.eat_while(char::is_whitespace);
        return Ok(None);
    }

    if cursor.first() == '/' && cursor.second() == '/' {
        cursor.bump();
        cursor.bump();
        let mut buf = String::from("//");
        while !cursor.is_eof() {
            buf.push(cursor.bump().unwrap());
        }
        return Ok(Some(make(RawKind::LineComment, buf, pos_before, cursor)));
    }

    // The three multi-line forms always emit a `Begin` token covering just
    // the opening delimiter; the next loop iteration in `tokenize_line`
    // picks up content/close (possibly immediately, on the same line)
    // because it has already switched into the corresponding mode. This
    // way a form that happens to close on the line it opened on still goes
    // through the same Begin/Content/End shape the snapshot fusion step
    // expects uniformly (`spec.md` §4.2).
    if cursor.first() == '/' && cursor.second() == '*' {
        cursor.bump();
        cursor.bump();
        return Ok(Some(make(RawKind::BlockCommentBegin, "/*".into(), pos_before, cursor)));
    }

    if cursor.first() == '#' && cursor.second() == '"' {
        cursor.bump();
        cursor.bump();
        return Ok(Some(make(
            RawKind::QuotedIdentifierBegin,
            "#\"".into(),
            pos_before,
            cursor,
        )));
    }

    if cursor.first() == '#' {
        cursor.bump();
        let mut word = String::from("#");
        while is_ident_continue(cursor.first()) {
            word.push(cursor.bump().unwrap());
        }
        return finish_hash_keyword(line_number, cursor, pos_before, word);
    }

    if cursor.first() == '"' {
        cursor.bump();
        return Ok(Some(make(RawKind::StringBegin, "\"".into(), pos_before, cursor)));
    }

    if is_ident_start(cursor.first()) {
        let mut buf = String::new();
        buf.push(cursor.bump().unwrap());
        while is_ident_continue(cursor.first()) {
            buf.push(cursor.bump().unwrap());
        }
        let kind = keyword_kind(&buf).unwrap_or(TokenKind::Identifier);
        return Ok(Some(make(RawKind::Finished(kind), buf, pos_before, cursor)));
    }

    if cursor.first().is_ascii_digit() {
        return lex_numeric(line_number, cursor, pos_before).map(Some);
    }

    lex_punctuation(line_number, cursor, pos_before).map(Some)
}

fn finish_hash_keyword(
    line_number: u32,
    cursor: &mut Cursor,
    pos_before: u32,
    word: String,
) -> Result<Option<RawToken>, LexError> {
    match hash_keyword_kind(&word) {
        Some(kind) => Ok(Some(RawToken {
            kind: RawKind::Finished(kind),
            data: word,
            position_start: Position::new(line_number, pos_before),
            position_end: Position::new(line_number, cursor.code_units_consumed()),
        })),
        None => Err(LexError::UnexpectedRead {
            line_number,
            data: word,
            column: pos_before,
        }),
    }
}

fn lex_numeric(
    line_number: u32,
    cursor: &mut Cursor,
    pos_before: u32,
) -> Result<RawToken, LexError> {
    let mut buf = String::new();
    if cursor.first() == '0' && matches!(cursor.second(), 'x' | 'X') {
        buf.push(cursor.bump().unwrap());
        buf.push(cursor.bump().unwrap());
        if !cursor.first().is_ascii_hexdigit() {
            return Err(LexError::UnexpectedRead {
                line_number,
                data: buf,
                column: pos_before,
            });
        }
        while cursor.first().is_ascii_hexdigit() {
            buf.push(cursor.bump().unwrap());
        }
        return Ok(RawToken {
            kind: RawKind::Finished(TokenKind::Numeric),
            data: buf,
            position_start: Position::new(line_number, pos_before),
            position_end: Position::new(line_number, cursor.code_units_consumed()),
        });
    }

    while cursor.first().is_ascii_digit() {
        buf.push(cursor.bump().unwrap());
    }
    if cursor.first() == '.' && cursor.second().is_ascii_digit() {
        buf.push(cursor.bump().unwrap());
        while cursor.first().is_ascii_digit() {
            buf.push(cursor.bump().unwrap());
        }
    }
    if matches!(cursor.first(), 'e' | 'E') {
        let save = buf.len();
        let mut exp = String::new();
        exp.push(cursor.first());
        let mut lookahead = cursor.clone();
        lookahead.bump();
        if matches!(lookahead.first(), '+' | '-') {
            exp.push(lookahead.first());
            lookahead.bump();
        }
        if lookahead.first().is_ascii_digit() {
            *cursor = lookahead;
            buf.push_str(&exp);
            while cursor.first().is_ascii_digit() {
                buf.push(cursor.bump().unwrap());
            }
        } else {
            let _ = save;
        }
    }

    Ok(RawToken {
        kind: RawKind::Finished(TokenKind::Numeric),
        data: buf,
        position_start: Position::new(line_number, pos_before),
        position_end: Position::new(line_number, cursor.code_units_consumed()),
    })
}

fn lex_punctuation(
    line_number: u32,
    cursor: &mut Cursor,
    pos_before: u32,
) -> Result<RawToken, LexError> {
    let make = |kind: TokenKind, data: String, cursor: &Cursor| RawToken {
        kind: RawKind::Finished(kind),
        data,
        position_start: Position::new(line_number, pos_before),
        position_end: Position::new(line_number, cursor.code_units_consumed()),
    };

    let c = cursor.first();
    let result = match c {
        '(' => {
            cursor.bump();
            make(TokenKind::LeftParenthesis, "(".into(), cursor)
        }
        ')' => {
            cursor.bump();
            make(TokenKind::RightParenthesis, ")".into(), cursor)
        }
        '[' => {
            cursor.bump();
            make(TokenKind::LeftBracket, "[".into(), cursor)
        }
        ']' => {
            cursor.bump();
            make(TokenKind::RightBracket, "]".into(), cursor)
        }
        '{' => {
            cursor.bump();
            make(TokenKind::LeftBrace, "{".into(), cursor)
        }
        '}' => {
            cursor.bump();
            make(TokenKind::RightBrace, "}".into(), cursor)
        }
        ',' => {
            cursor.bump();
            make(TokenKind::Comma, ",".into(), cursor)
        }
        ';' => {
            cursor.bump();
            make(TokenKind::Semicolon, ";".into(), cursor)
        }
        '+' => {
            cursor.bump();
            make(TokenKind::Plus, "+".into(), cursor)
        }
        '-' => {
            cursor.bump();
            make(TokenKind::Minus, "-".into(), cursor)
        }
        '*' => {
            cursor.bump();
            make(TokenKind::Asterisk, "*".into(), cursor)
        }
        '/' => {
            cursor.bump();
            make(TokenKind::Division, "/".into(), cursor)
        }
        '&' => {
            cursor.bump();
            make(TokenKind::Ampersand, "&".into(), cursor)
        }
        '@' => {
            cursor.bump();
            make(TokenKind::AtSign, "@".into(), cursor)
        }
        '=' => {
            cursor.bump();
            if cursor.first() == '>' {
                cursor.bump();
                make(TokenKind::FatArrow, "=>".into(), cursor)
            } else {
                make(TokenKind::Equal, "=".into(), cursor)
            }
        }
        '<' => {
            cursor.bump();
            match cursor.first() {
                '=' => {
                    cursor.bump();
                    make(TokenKind::LessThanOrEqual, "<=".into(), cursor)
                }
                '>' => {
                    cursor.bump();
                    make(TokenKind::NotEqual, "<>".into(), cursor)
                }
                _ => make(TokenKind::LessThan, "<".into(), cursor),
            }
        }
        '>' => {
            cursor.bump();
            if cursor.first() == '=' {
                cursor.bump();
                make(TokenKind::GreaterThanOrEqual, ">=".into(), cursor)
            } else {
                make(TokenKind::GreaterThan, ">".into(), cursor)
            }
        }
        '?' => {
            cursor.bump();
            make(TokenKind::NullableQuestionMark, "?".into(), cursor)
        }
        '.' => {
            cursor.bump();
            if cursor.first() == '.' && cursor.second() == '.' {
                cursor.bump();
                cursor.bump();
                make(TokenKind::DotDotDot, "...".into(), cursor)
            } else {
                make(TokenKind::Dot, ".".into(), cursor)
            }
        }
        other => {
            cursor.bump();
            return Err(LexError::UnexpectedRead {
                line_number,
                data: other.to_string(),
                column: pos_before,
            });
        }
    };
    Ok(result)
}
