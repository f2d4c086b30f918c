//! Line-oriented terminal prompt.

use std::io::{self, BufRead, Write};
use termdesk_core::controller::prompt::UserPrompt;

/// Reads answers from `input` and writes notices to `output`.
pub struct TerminalPrompt<I: BufRead, W: Write> {
    input: I,
    output: W,
}

impl<I: BufRead, W: Write> TerminalPrompt<I, W> {
    pub fn new(input: I, output: W) -> Self {
        Self { input, output }
    }

    /// Prints `label` and reads one line without its line ending.
    ///
    /// Returns `None` at end of input.
    pub fn read_line(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<I: BufRead, W: Write> UserPrompt for TerminalPrompt<I, W> {
    fn notify_success(&mut self, message: &str) {
        let _ = writeln!(self.output, "ok: {message}");
    }

    fn alert(&mut self, context: &str, detail: &str) {
        let _ = writeln!(self.output, "error: {context}\n  {detail}");
    }

    fn confirm(&mut self, question: &str) -> bool {
        match self.read_line(&format!("{question} [y/N] ")) {
            Ok(Some(answer)) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TerminalPrompt;
    use std::io::Cursor;
    use termdesk_core::controller::prompt::UserPrompt;

    #[test]
    fn confirm_accepts_only_yes() {
        let mut prompt = TerminalPrompt::new(Cursor::new("Y\nno\n"), Vec::new());
        assert!(prompt.confirm("Sure?"));
        assert!(!prompt.confirm("Sure?"));
        assert!(!prompt.confirm("Sure?"));
    }

    #[test]
    fn read_line_strips_line_endings_and_reports_eof() {
        let mut prompt = TerminalPrompt::new(Cursor::new("hello\r\n"), Vec::new());
        assert_eq!(prompt.read_line("> ").unwrap().as_deref(), Some("hello"));
        assert_eq!(prompt.read_line("> ").unwrap(), None);
        assert_eq!(String::from_utf8(prompt.into_output()).unwrap(), "> > ");
    }
}
