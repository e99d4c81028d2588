//! Console plumbing for the interactive session.
//!
//! Every prompt and every rendered line flows through [`Console`], which is
//! generic over its streams so tests can script a whole session with an
//! in-memory cursor and a byte buffer. Reads block with no timeout; the
//! only way out of a prompt is an answer or end of input.

use crate::error::{BibfetchError, Result};
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

/// Interactive input/output streams for one session.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<BufReader<Stdin>, Stdout> {
    /// Console over the process's stdin/stdout.
    pub fn stdio() -> Self {
        Console {
            input: BufReader::new(io::stdin()),
            output: io::stdout(),
        }
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Console over arbitrary streams.
    pub fn new(input: R, output: W) -> Self {
        Console { input, output }
    }

    /// Write one line of output.
    pub fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    /// Report a recoverable input mistake; the caller re-prompts after this.
    pub fn error(&mut self, message: &str) -> Result<()> {
        self.line(&format!("Error: {}", message))
    }

    /// Print `label` without a trailing newline and block for one reply.
    ///
    /// The reply has its line ending stripped. End of input is a fatal
    /// I/O error: with no way to read further replies the session cannot
    /// continue, matching the retry loops that only exit on valid input.
    pub fn prompt(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(BibfetchError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "end of input while waiting for a reply",
            )));
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_strips_line_ending() {
        let mut out = Vec::new();
        let mut console = Console::new(Cursor::new(&b"hello\r\n"[..]), &mut out);
        let reply = console.prompt("Q: ").expect("prompt failed");
        assert_eq!(reply, "hello");
    }

    #[test]
    fn test_prompt_writes_label_without_newline() {
        let mut out = Vec::new();
        {
            let mut console = Console::new(Cursor::new(&b"x\n"[..]), &mut out);
            console.prompt("Search: ").expect("prompt failed");
        }
        assert_eq!(String::from_utf8(out).expect("utf8"), "Search: ");
    }

    #[test]
    fn test_prompt_fails_at_end_of_input() {
        let mut out = Vec::new();
        let mut console = Console::new(Cursor::new(&b""[..]), &mut out);
        assert!(console.prompt("Q: ").is_err());
    }

    #[test]
    fn test_error_prefixes_message() {
        let mut out = Vec::new();
        {
            let mut console = Console::new(Cursor::new(&b""[..]), &mut out);
            console.error("Unknown command").expect("write failed");
        }
        assert_eq!(String::from_utf8(out).expect("utf8"), "Error: Unknown command\n");
    }
}
