//! Scanner for ntscript
//!
//! Two split rules turn raw script text into tokens:
//! - [`split_command`] cuts a buffer into command units, one per physical
//!   line unless a single-quoted run keeps the unit open across lines
//! - [`split_argument`] cuts a command unit into argument tokens, keeping
//!   back-quoted, single-quoted and double-quoted runs whole
//!
//! Both are incremental: given the buffer so far and whether the input is
//! exhausted, they report how much input the next token consumed, or that
//! they need more input to decide.

use std::io::BufRead;

use crate::parser::types::ParseErrorKind;

/// Outcome of one split step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split<'a> {
    /// A token was found; drop `advance` bytes from the front of the buffer.
    Token { advance: usize, token: &'a str },
    /// The buffer ends inside a token and more input may arrive.
    NeedMore,
    /// Nothing left at end of input.
    Done,
}

/// Quote characters that delimit a run, in priority order.
const RUN_DELIMITERS: [char; 3] = ['`', '\'', '"'];

/// Progress of a command split over a buffer that is still growing.
///
/// Holds the offset of the first line not yet counted and the single
/// quotes seen before it, so a resumed split only reads new input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandSplit {
    scanned: usize,
    quotes: usize,
}

/// Split the next command unit off `data`.
///
/// A unit is one line without its terminator. When the line holds an odd
/// number of single quotes, whole lines are added until the running count
/// is even again, so a quoted JSON blob can span several lines. Blank and
/// `#` lines are returned like any other; the parser discards them.
pub fn split_command(data: &str, at_eof: bool) -> Split<'_> {
    split_command_resume(data, at_eof, &mut CommandSplit::default())
}

/// [`split_command`] that picks up where the last `NeedMore` on the same
/// buffer stopped. `state` resets once a unit is returned.
pub fn split_command_resume<'a>(data: &'a str, at_eof: bool, state: &mut CommandSplit) -> Split<'a> {
    if data.is_empty() {
        return if at_eof { Split::Done } else { Split::NeedMore };
    }

    let mut pos = state.scanned.min(data.len());
    loop {
        let (end, advance) = match data[pos..].find('\n') {
            Some(i) => (pos + i, pos + i + 1),
            // Input ended right after a counted line; drop its terminator.
            None if at_eof && pos == data.len() => (pos - 1, pos),
            None if at_eof => (data.len(), data.len()),
            None => {
                state.scanned = pos;
                return Split::NeedMore;
            }
        };
        if end >= pos {
            state.quotes += data[pos..end].matches('\'').count();
        }
        if state.quotes % 2 == 0 || (advance == data.len() && at_eof) {
            *state = CommandSplit::default();
            let token = data[..end].strip_suffix('\r').unwrap_or(&data[..end]);
            return Split::Token { advance, token };
        }
        if advance == data.len() {
            state.scanned = advance;
            return Split::NeedMore;
        }
        pos = advance;
    }
}

/// Split the next argument token off `data`.
///
/// The default token is a whitespace-delimited word. If the word contains a
/// back-quote (else a single quote, else a double quote), the token runs
/// from the word's start to the matching closing delimiter, wherever it is
/// in the buffer.
pub fn split_argument(data: &str, at_eof: bool) -> Split<'_> {
    let start = match data.find(|c: char| !c.is_whitespace()) {
        Some(i) => i,
        None => return if at_eof { Split::Done } else { Split::NeedMore },
    };

    let (end, advance) = match data[start..].find(char::is_whitespace) {
        Some(i) => {
            let ws = data[start + i..].chars().next().map_or(1, char::len_utf8);
            (start + i, start + i + ws)
        }
        None if at_eof => (data.len(), data.len()),
        None => return Split::NeedMore,
    };
    let word = &data[start..end];

    for delim in RUN_DELIMITERS {
        if let Some(open) = word.find(delim) {
            let open = start + open;
            return match data[open + 1..].find(delim) {
                Some(close) => {
                    let close = open + 1 + close;
                    Split::Token {
                        advance: close + 1,
                        token: &data[start..=close],
                    }
                }
                None if at_eof => Split::Token {
                    advance: data.len(),
                    token: &data[start..],
                },
                None => Split::NeedMore,
            };
        }
    }

    Split::Token {
        advance,
        token: word,
    }
}

/// Iterator over the argument tokens of one complete command unit.
pub struct Arguments<'a> {
    rest: &'a str,
}

impl<'a> Arguments<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl<'a> Iterator for Arguments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        match split_argument(self.rest, true) {
            Split::Token { advance, token } => {
                self.rest = &self.rest[advance..];
                Some(token)
            }
            Split::NeedMore | Split::Done => None,
        }
    }
}

/// Split a command unit into its argument tokens.
pub fn split_args(text: &str) -> Vec<&str> {
    Arguments::new(text).collect()
}

/// Reads command units from a reader, one line at a time.
///
/// Yields `(line, unit)` where `line` is the 1-based number of the unit's
/// first physical line.
pub struct CommandScanner<R> {
    reader: R,
    buf: String,
    split: CommandSplit,
    eof: bool,
    next_line: usize,
    consumed: usize,
    max_input_size: usize,
}

impl<R: BufRead> CommandScanner<R> {
    pub fn new(reader: R, max_input_size: usize) -> Self {
        Self {
            reader,
            buf: String::new(),
            split: CommandSplit::default(),
            eof: false,
            next_line: 1,
            consumed: 0,
            max_input_size,
        }
    }

    /// Line number the next unit will start on.
    pub fn line(&self) -> usize {
        self.next_line
    }

    fn fill(&mut self) -> Result<(), ParseErrorKind> {
        let n = self.reader.read_line(&mut self.buf)?;
        if n == 0 {
            self.eof = true;
        }
        self.consumed += n;
        if self.consumed > self.max_input_size {
            return Err(ParseErrorKind::InputTooLarge(self.max_input_size));
        }
        Ok(())
    }
}

impl<R: BufRead> Iterator for CommandScanner<R> {
    type Item = Result<(usize, String), ParseErrorKind>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match split_command_resume(&self.buf, self.eof, &mut self.split) {
                Split::Token { advance, token } => {
                    let line = self.next_line;
                    let unit = token.to_string();
                    self.next_line += 1 + unit.matches('\n').count();
                    self.buf.drain(..advance);
                    return Some(Ok((line, unit)));
                }
                Split::Done => return None,
                Split::NeedMore => {
                    if let Err(e) = self.fill() {
                        // Stop after reporting; the buffer is no longer trustworthy.
                        self.eof = true;
                        self.buf.clear();
                        self.split = CommandSplit::default();
                        return Some(Err(e));
                    }
                }
            }
        }
    }
}

/// Split in-memory text into `(line, unit)` command units.
pub fn split_command_lines(text: &str) -> Vec<(usize, String)> {
    CommandScanner::new(text.as_bytes(), usize::MAX)
        .filter_map(Result::ok)
        .collect()
}

/// Check that `id` is a valid identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_identifier(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(text: &str) -> Vec<String> {
        split_command_lines(text).into_iter().map(|(_, u)| u).collect()
    }

    #[test]
    fn test_valid_identifier() {
        assert!(is_valid_identifier("a"));
        assert!(is_valid_identifier("a_b"));
        assert!(is_valid_identifier("a1"));
        assert!(is_valid_identifier("_a_b_1"));
        assert!(!is_valid_identifier("@ab"));
        assert!(!is_valid_identifier("1ab"));
        assert!(!is_valid_identifier("a.b"));
        assert!(!is_valid_identifier(""));
    }

    #[test]
    fn test_split_args_words() {
        assert!(split_args("").is_empty());
        assert_eq!(split_args("x"), vec!["x"]);
        assert_eq!(split_args(" x "), vec!["x"]);
        assert_eq!(split_args("echo 1 2"), vec!["echo", "1", "2"]);
        assert_eq!(split_args("echo   1\t2"), vec!["echo", "1", "2"]);
    }

    #[test]
    fn test_split_args_quoted_runs() {
        assert_eq!(split_args(r#"echo 1 "2 3""#), vec!["echo", "1", r#""2 3""#]);
        assert_eq!(split_args("let @host `env HOST`"), vec!["let", "@host", "`env HOST`"]);
        assert_eq!(
            split_args(r#"let @a `base64 "abc$(v)"`"#),
            vec!["let", "@a", r#"`base64 "abc$(v)"`"#]
        );
        assert_eq!(split_args("echo 'a\nb' c"), vec!["echo", "'a\nb'", "c"]);
    }

    #[test]
    fn test_split_args_leading_spaces_keep_run_whole() {
        assert_eq!(split_args(r#"echo    "x  y"   z"#), vec!["echo", r#""x  y""#, "z"]);
    }

    #[test]
    fn test_split_args_unterminated_run_takes_rest() {
        assert_eq!(split_args(r#"echo "a b"#), vec!["echo", r#""a b"#]);
    }

    #[test]
    fn test_split_argument_needs_more() {
        assert_eq!(split_argument(r#""a b"#, false), Split::NeedMore);
        assert_eq!(split_argument("abc", false), Split::NeedMore);
        assert_eq!(split_argument("   ", false), Split::NeedMore);
        assert_eq!(split_argument("   ", true), Split::Done);
        assert_eq!(
            split_argument("abc ", false),
            Split::Token { advance: 4, token: "abc" }
        );
    }

    #[test]
    fn test_split_single_word_is_unchanged() {
        for word in ["echo", "1.5", "@x", "$(a)", r#""s""#] {
            assert_eq!(split_args(word), vec![word]);
        }
    }

    #[test]
    fn test_split_commands_one_per_line() {
        assert_eq!(units("echo 1 2\necho 3 4\n"), vec!["echo 1 2", "echo 3 4"]);
        assert_eq!(units("echo 1\r\necho 2"), vec!["echo 1", "echo 2"]);
    }

    #[test]
    fn test_split_commands_quoted_multiline() {
        assert_eq!(units("echo '1234\n56'"), vec!["echo '1234\n56'"]);
        assert_eq!(units("echo '123' '123'"), vec!["echo '123' '123'"]);
        assert_eq!(units("echo '123\n456' '123\n'"), vec!["echo '123\n456' '123\n'"]);
        assert_eq!(
            units("echo '{\n    \"key\": \"value\"\n}'\n"),
            vec!["echo '{\n    \"key\": \"value\"\n}'"]
        );
    }

    #[test]
    fn test_split_commands_line_numbers() {
        let lines = split_command_lines("echo '1\n2'\n\n# note\necho 3\n");
        let numbers: Vec<usize> = lines.iter().map(|(n, _)| *n).collect();
        assert_eq!(numbers, vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_split_command_needs_more() {
        assert_eq!(split_command("echo 1", false), Split::NeedMore);
        assert_eq!(split_command("echo '1\n", false), Split::NeedMore);
        assert_eq!(split_command("", true), Split::Done);
        assert_eq!(
            split_command("echo '1\n2'\nnext", false),
            Split::Token { advance: 11, token: "echo '1\n2'" }
        );
    }

    #[test]
    fn test_split_command_resume_skips_counted_lines() {
        let mut state = CommandSplit::default();
        assert_eq!(split_command_resume("echo '1\n", false, &mut state), Split::NeedMore);
        assert_eq!(state, CommandSplit { scanned: 8, quotes: 1 });
        assert_eq!(split_command_resume("echo '1\n2\n", false, &mut state), Split::NeedMore);
        assert_eq!(state, CommandSplit { scanned: 10, quotes: 1 });
        assert_eq!(
            split_command_resume("echo '1\n2\n3'\nnext", false, &mut state),
            Split::Token { advance: 13, token: "echo '1\n2\n3'" }
        );
        assert_eq!(state, CommandSplit::default());
    }

    #[test]
    fn test_long_quoted_unit_scans_in_one_pass() {
        let lines = 200_000;
        let mut text = String::from("echo '\n");
        for _ in 0..lines {
            text.push_str("a\n");
        }
        text.push_str("'\necho 2\n");

        let start = std::time::Instant::now();
        let units = split_command_lines(&text);
        assert!(start.elapsed() < std::time::Duration::from_secs(10));
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].1.matches('\n').count(), lines + 1);
        assert_eq!(units[1], (lines + 3, "echo 2".to_string()));
    }

    #[test]
    fn test_unterminated_quote_takes_rest_at_eof() {
        assert_eq!(units("echo 'a\necho b\n"), vec!["echo 'a\necho b"]);
    }

    #[test]
    fn test_input_limit() {
        let mut scanner = CommandScanner::new("echo 1\necho 2\n".as_bytes(), 4);
        assert!(matches!(scanner.next(), Some(Err(ParseErrorKind::InputTooLarge(4)))));
        assert!(scanner.next().is_none());
    }
}
