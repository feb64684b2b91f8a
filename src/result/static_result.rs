//! Fully collected command results.

use std::fmt;

use super::event::{LineData, Stream};
use crate::Result;

/// Read access to a finished command's outcome.
pub trait CommandOutput {
    /// The command text.
    fn command(&self) -> &str;
    /// Lines written to stdout, in order.
    fn stdout(&self) -> &[String];
    /// Lines written to stderr, in order.
    fn stderr(&self) -> &[String];
    /// The exit code.
    fn exit_code(&self) -> i32;
}

/// Immutable snapshot of a command's complete outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticResult {
    command: String,
    stdout: Vec<String>,
    stderr: Vec<String>,
    exit_code: i32,
}

impl StaticResult {
    /// Create a result from already collected lines.
    ///
    /// Byte lines are decoded as UTF-8; invalid bytes fail with
    /// [`ShellResultError::Decoding`](crate::ShellResultError::Decoding).
    pub fn new<O, E>(command: impl Into<String>, stdout: O, stderr: E, exit_code: i32) -> Result<Self>
    where
        O: IntoIterator,
        O::Item: Into<LineData>,
        E: IntoIterator,
        E::Item: Into<LineData>,
    {
        Ok(Self {
            command: command.into(),
            stdout: decode_all(stdout, Stream::Stdout)?,
            stderr: decode_all(stderr, Stream::Stderr)?,
            exit_code,
        })
    }

    pub(crate) fn from_parts(
        command: String,
        stdout: Vec<String>,
        stderr: Vec<String>,
        exit_code: i32,
    ) -> Self {
        Self {
            command,
            stdout,
            stderr,
            exit_code,
        }
    }

    /// The command text.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Lines written to stdout.
    pub fn stdout(&self) -> &[String] {
        &self.stdout
    }

    /// Lines written to stderr.
    pub fn stderr(&self) -> &[String] {
        &self.stderr
    }

    /// The exit code.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Check if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Iterate over stdout lines.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.stdout.iter()
    }

    /// Compare field by field against another result.
    pub fn eq_result(&self, other: &impl CommandOutput) -> bool {
        outputs_equal(self, other)
    }

    /// Compare stdout against an expected multi-line blob.
    pub fn eq_text(&self, expected: &str) -> bool {
        stdout_matches_text(&self.stdout, expected)
    }
}

impl CommandOutput for StaticResult {
    fn command(&self) -> &str {
        &self.command
    }

    fn stdout(&self) -> &[String] {
        &self.stdout
    }

    fn stderr(&self) -> &[String] {
        &self.stderr
    }

    fn exit_code(&self) -> i32 {
        self.exit_code
    }
}

impl PartialEq<str> for StaticResult {
    fn eq(&self, other: &str) -> bool {
        self.eq_text(other)
    }
}

impl PartialEq<&str> for StaticResult {
    fn eq(&self, other: &&str) -> bool {
        self.eq_text(other)
    }
}

impl fmt::Display for StaticResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stdout.join("\n"))
    }
}

impl<'a> IntoIterator for &'a StaticResult {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.stdout.iter()
    }
}

fn decode_all<I>(lines: I, stream: Stream) -> Result<Vec<String>>
where
    I: IntoIterator,
    I::Item: Into<LineData>,
{
    lines
        .into_iter()
        .map(|line| line.into().decode(stream))
        .collect()
}

pub(crate) fn outputs_equal(a: &impl CommandOutput, b: &impl CommandOutput) -> bool {
    a.command() == b.command()
        && a.stdout() == b.stdout()
        && a.stderr() == b.stderr()
        && a.exit_code() == b.exit_code()
}

/// An empty blob matches a single blank line, since that is what a command
/// printing one empty line produces.
pub(crate) fn stdout_matches_text(stdout: &[String], expected: &str) -> bool {
    if expected.is_empty() {
        return stdout.len() == 1 && stdout[0].is_empty();
    }
    split_lines(expected).eq(stdout.iter().map(String::as_str))
}

/// Characters that end a line: `\n`, `\r`, vertical tab, form feed, the
/// file/group/record separators, NEL and the Unicode line and paragraph
/// separators.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}'
            | '\u{2029}'
    )
}

/// Split on every line break, with `\r\n` counted once and no empty line
/// after a trailing break.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.char_indices().find(|&(_, c)| is_line_break(c)) {
            Some((i, c)) => {
                let line = &rest[..i];
                let mut end = i + c.len_utf8();
                if c == '\r' && rest[end..].starts_with('\n') {
                    end += 1;
                }
                rest = &rest[end..];
                Some(line)
            }
            None => Some(std::mem::take(&mut rest)),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShellResultError;

    fn result(stdout: &[&str], stderr: &[&str], exit_code: i32) -> StaticResult {
        StaticResult::new("cmd", stdout.iter().copied(), stderr.iter().copied(), exit_code)
            .unwrap()
    }

    #[test]
    fn test_accessors() {
        let r = result(&["Foo"], &["Bar"], 3);
        assert_eq!(r.command(), "cmd");
        assert_eq!(r.stdout(), ["Foo"]);
        assert_eq!(r.stderr(), ["Bar"]);
        assert_eq!(r.exit_code(), 3);
    }

    #[test]
    fn test_bytes_are_decoded() {
        let from_bytes =
            StaticResult::new("cmd", vec![b"Foo".to_vec()], Vec::<Vec<u8>>::new(), 0).unwrap();
        assert_eq!(from_bytes, result(&["Foo"], &[], 0));
    }

    #[test]
    fn test_invalid_bytes_rejected() {
        let err = StaticResult::new("cmd", Vec::<String>::new(), vec![vec![0xc3u8]], 0)
            .unwrap_err();
        assert!(matches!(
            err,
            ShellResultError::Decoding {
                stream: Stream::Stderr,
                ..
            }
        ));
    }

    #[test]
    fn test_success() {
        assert!(result(&[], &[], 0).success());
        assert!(!result(&[], &[], 10).success());
        assert!(!result(&[], &[], -1).success());
    }

    #[test]
    fn test_display_joins_stdout() {
        assert_eq!(result(&["Foo", "Bar"], &["err"], 0).to_string(), "Foo\nBar");
        assert_eq!(result(&[], &[], 0).to_string(), "");
    }

    #[test]
    fn test_iterates_stdout_only() {
        let r = result(&["a", "b"], &["x"], 0);
        let collected: Vec<_> = r.iter().cloned().collect();
        assert_eq!(collected, vec!["a", "b"]);

        let mut count = 0;
        for _ in &r {
            count += 1;
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn test_text_equality() {
        let r = result(&["Foo", "Bar"], &[], 0);
        assert!(r == "Foo\nBar");
        assert!(r == "Foo\nBar\n");
        assert!(r != "Foo");
        assert!(r.eq_text("Foo\r\nBar"));
    }

    #[test]
    fn test_text_equality_splitlines() {
        let r = result(&["Foo", "Bar"], &[], 0);
        assert!(r == "Foo\rBar");
        assert!(r == "Foo\x0cBar");
        assert!(r == "Foo\x0bBar\u{2028}");
        assert!(r != "Foo\r\n\nBar");

        let blank_middle = result(&["Foo", "", "Bar"], &[], 0);
        assert!(blank_middle == "Foo\r\rBar");
        assert!(blank_middle == "Foo\n\u{85}Bar");
    }

    #[test]
    fn test_split_lines() {
        let split: Vec<_> = split_lines("a\r\nb\rc\x1dd\n").collect();
        assert_eq!(split, vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("\n").collect::<Vec<_>>(), vec![""]);
        assert_eq!(split_lines("").count(), 0);
        assert_eq!(split_lines("no break").collect::<Vec<_>>(), vec!["no break"]);
    }

    #[test]
    fn test_empty_text_matches_single_blank_line() {
        assert!(result(&[""], &[], 0) == "");
        assert!(result(&[], &[], 0) != "");
        assert!(result(&["", ""], &[], 0) != "");
    }

    #[test]
    fn test_result_equality() {
        let a = result(&["Foo"], &["Bar"], 0);
        assert!(a.eq_result(&result(&["Foo"], &["Bar"], 0)));
        assert!(!a.eq_result(&result(&["Foo"], &["Bar"], 1)));
        assert!(!a.eq_result(&result(&["Foo"], &[], 0)));

        let other_cmd = StaticResult::new("other", ["Foo"], ["Bar"], 0).unwrap();
        assert!(!a.eq_result(&other_cmd));
        assert_ne!(a, other_cmd);
    }
}
