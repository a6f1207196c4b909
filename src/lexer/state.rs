//! Lexer state (component C): an ordered sequence of [`Line`]s plus the
//! incremental edit operations of `spec.md` §4.1.

use indexmap::IndexMap;

use crate::lexer::error::LexError;
use crate::lexer::line::{tokenize_line, Line, LineMode, LineTerminator};
use crate::position::Position;

/// `{lines: ordered sequence of Line}`. Invariant: lines are non-empty
/// collectively; a purely empty document has one empty `Line` with default
/// modes (`spec.md` §3).
#[derive(Debug, Clone)]
pub struct LexerState {
    pub(crate) lines: Vec<Line>,
}

/// `lineNumber -> line-level error`, ascending by `lineNumber`, absent when
/// there are no errors (`spec.md` §4.1).
#[derive(Debug, Clone)]
pub struct ErrorLineMap(IndexMap<u32, LexError>);

impl ErrorLineMap {
    pub fn iter(&self) -> impl Iterator<Item = (u32, &LexError)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    pub fn get(&self, line_number: u32) -> Option<&LexError> {
        self.0.get(&line_number)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn code_unit_to_byte(line: &str, code_unit: u32) -> usize {
    let mut units = 0u32;
    for (byte_idx, ch) in line.char_indices() {
        if units >= code_unit {
            return byte_idx;
        }
        units += ch.len_utf16() as u32;
    }
    line.len()
}

/// Splits `text` on the auto-detected line-terminator set of `spec.md` §6,
/// returning `(content, terminator)` pairs. The final element's terminator
/// is [`LineTerminator::Eof`] unless overwritten by the caller -- it marks
/// "no terminator seen yet," true both for a whole untouched document and
/// for whatever is currently the last physical line of one being edited.
pub(crate) fn split_lines(text: &str) -> Vec<(String, LineTerminator)> {
    if text.is_empty() {
        return vec![(String::new(), LineTerminator::Eof)];
    }
    let mut result = Vec::new();
    let mut line_start = 0usize;
    let mut i = 0usize;
    while i < text.len() {
        if let Some((term, term_len)) = LineTerminator::detect(text, i) {
            result.push((text[line_start..i].to_string(), term));
            i += term_len;
            line_start = i;
        } else {
            let ch_len = text[i..].chars().next().unwrap().len_utf8();
            i += ch_len;
        }
    }
    result.push((text[line_start..].to_string(), LineTerminator::Eof));
    result
}

impl LexerState {
    /// `stateFrom(text) -> State`: split on line terminators, then tokenize
    /// each line in sequence, threading the end-mode of line *i* into the
    /// start-mode of line *i+1* (`spec.md` §4.1).
    pub fn state_from(text: &str) -> Self {
        let raw_lines = split_lines(text);
        let mut lines = Vec::with_capacity(raw_lines.len());
        let mut mode = LineMode::Default;
        for (i, (content, terminator)) in raw_lines.into_iter().enumerate() {
            let (tokens, end_mode, error) = tokenize_line(i as u32, &content, mode);
            lines.push(Line {
                kind_at_start: mode,
                kind_at_end: end_mode,
                line_string: content,
                line_terminator: terminator,
                tokens,
                maybe_error: error,
            });
            mode = end_mode;
        }
        LexerState { lines }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, line_number: usize) -> Option<&Line> {
        self.lines.get(line_number)
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// `ErrorLineMap`, computed fresh from `self.lines` (`spec.md` §4.1).
    pub fn error_line_map(&self) -> Option<ErrorLineMap> {
        let map: IndexMap<u32, LexError> = self
            .lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| line.maybe_error.clone().map(|err| (i as u32, err)))
            .collect();
        if map.is_empty() {
            None
        } else {
            Some(ErrorLineMap(map))
        }
    }

    /// `appendLine(state, text, terminator)` -- appends, re-tokenizing from
    /// the prior line's end-mode (`spec.md` §4.1). The terminator supplied
    /// now separates the old last line from the new one; the new line
    /// itself becomes the document's tentative new end (`Eof` terminator)
    /// until something is appended after it in turn.
    pub fn append_line(&mut self, text: &str, terminator: LineTerminator) {
        let prior_mode = self
            .lines
            .last()
            .map(|line| line.kind_at_end)
            .unwrap_or(LineMode::Default);
        if let Some(last) = self.lines.last_mut() {
            last.line_terminator = terminator;
        }
        let line_number = self.lines.len() as u32;
        let (tokens, end_mode, error) = tokenize_line(line_number, text, prior_mode);
        self.lines.push(Line {
            kind_at_start: prior_mode,
            kind_at_end: end_mode,
            line_string: text.to_string(),
            line_terminator: LineTerminator::Eof,
            tokens,
            maybe_error: error,
        });
    }

    /// Re-tokenizes `self.lines[first_line..]` forward from `mode`,
    /// stopping as soon as a line's freshly computed end-mode matches what
    /// was already stored as the next line's start-mode -- the incremental
    /// optimization named in `spec.md` §4.1.
    ///
    /// `min_count` forces the first `min_count` lines to be re-tokenized
    /// regardless of what the short-circuit check would otherwise conclude.
    /// This matters for freshly spliced lines (`try_update_range`): their
    /// `kind_at_start`/`kind_at_end` are placeholder values, not real lexer
    /// output, so comparing a neighbor's end-mode against a placeholder's
    /// start-mode can spuriously match and stop propagation before every
    /// spliced line has actually been lexed.
    fn propagate_from(&mut self, mut line_number: usize, mut mode: LineMode, min_count: usize) {
        let mut remaining_forced = min_count;
        loop {
            if line_number >= self.lines.len() {
                break;
            }
            let text = self.lines[line_number].line_string.clone();
            let (tokens, end_mode, error) = tokenize_line(line_number as u32, &text, mode);
            self.lines[line_number].kind_at_start = mode;
            self.lines[line_number].kind_at_end = end_mode;
            self.lines[line_number].tokens = tokens;
            self.lines[line_number].maybe_error = error;
            remaining_forced = remaining_forced.saturating_sub(1);

            if remaining_forced == 0 {
                let next_expects = self.lines.get(line_number + 1).map(|l| l.kind_at_start);
                match next_expects {
                    None => break,
                    Some(expected) if expected == end_mode => break,
                    Some(_) => {}
                }
            }
            if line_number + 1 >= self.lines.len() {
                break;
            }
            mode = end_mode;
            line_number += 1;
        }
    }

    /// `tryUpdateLine(state, lineNumber, newText)` -- replaces one line,
    /// re-tokenizing forward only as long as necessary (`spec.md` §4.1).
    /// Never throws; returns a structured error carrying the offending
    /// line number.
    pub fn try_update_line(&mut self, line_number: usize, new_text: &str) -> Result<(), LexError> {
        if line_number >= self.lines.len() {
            return Err(LexError::BadRange {
                start: Position::new(line_number as u32, 0),
                end: Position::new(line_number as u32, 0),
            });
        }
        self.lines[line_number].line_string = new_text.to_string();
        let mode = self.lines[line_number].kind_at_start;
        self.propagate_from(line_number, mode, 1);
        Ok(())
    }

    /// `tryUpdateRange(state, range, newText)` -- the generalization to an
    /// arbitrary position range, built on top of [`Self::try_update_line`]'s
    /// propagation primitive (`spec.md` §4.1).
    pub fn try_update_range(
        &mut self,
        start: Position,
        end: Position,
        new_text: &str,
    ) -> Result<(), LexError> {
        let s = start.line_number as usize;
        let e = end.line_number as usize;
        if s >= self.lines.len() || e >= self.lines.len() || end < start {
            return Err(LexError::BadRange { start, end });
        }

        let prefix_end = code_unit_to_byte(&self.lines[s].line_string, start.line_code_unit);
        let prefix = self.lines[s].line_string[..prefix_end].to_string();
        let suffix_start = code_unit_to_byte(&self.lines[e].line_string, end.line_code_unit);
        let suffix = self.lines[e].line_string[suffix_start..].to_string();
        let merged = format!("{prefix}{new_text}{suffix}");
        let tail_terminator = self.lines[e].line_terminator;
        let start_mode = self.lines[s].kind_at_start;

        let mut raw = split_lines(&merged);
        if let Some(last) = raw.last_mut() {
            last.1 = tail_terminator;
        }

        let placeholder_lines: Vec<Line> = raw
            .into_iter()
            .map(|(content, terminator)| Line {
                kind_at_start: LineMode::Default,
                kind_at_end: LineMode::Default,
                line_string: content,
                line_terminator: terminator,
                tokens: Vec::new(),
                maybe_error: None,
            })
            .collect();

        let spliced_count = placeholder_lines.len();
        self.lines.splice(s..=e, placeholder_lines);
        self.propagate_from(s, start_mode, spliced_count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_one_default_line() {
        let state = LexerState::state_from("");
        assert_eq!(state.line_count(), 1);
        assert!(state.lines()[0].is_empty_default());
    }

    #[test]
    fn trailing_terminator_yields_extra_empty_line() {
        let state = LexerState::state_from("a\n");
        assert_eq!(state.line_count(), 2);
        assert_eq!(state.lines()[1].line_string, "");
    }

    #[test]
    fn mixed_terminators_split_correctly() {
        let state = LexerState::state_from("a\r\nb\nc");
        assert_eq!(state.line_count(), 3);
        assert_eq!(state.lines()[0].line_string, "a");
        assert_eq!(state.lines()[1].line_string, "b");
        assert_eq!(state.lines()[2].line_string, "c");
    }

    /// A range edit that inserts a new line must re-tokenize every line it
    /// splices in, not just the first: splitting `"a\nb"` into `"a\nX\nb"`
    /// by inserting `"X\n"` before `b` must leave `b` with real tokens, not
    /// the empty placeholder set a spliced line starts out with.
    #[test]
    fn range_edit_that_inserts_a_line_retokenizes_every_spliced_line() {
        let mut state = LexerState::state_from("a\nb");
        state
            .try_update_range(Position::new(1, 0), Position::new(1, 0), "X\n")
            .unwrap();

        assert_eq!(state.line_count(), 3);
        assert_eq!(state.lines()[1].line_string, "X");
        assert_eq!(state.lines()[2].line_string, "b");
        assert!(
            !state.lines()[2].tokens.is_empty(),
            "the trailing spliced line must be re-tokenized, not left empty"
        );
    }
}
