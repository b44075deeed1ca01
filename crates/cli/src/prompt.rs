use std::io::{self, BufRead, Write};
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("input ended before all answers were given")]
    Eof,

    #[error("could not read input: {0}")]
    Io(#[from] io::Error),
}

/// Asks questions on `output` and reads one-line answers from `input`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints a line of text without waiting for an answer.
    pub fn say(&mut self, text: &str) -> Result<(), PromptError> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// Returns the whole answer line without its line ending.
    pub fn line(&mut self, question: &str) -> Result<String, PromptError> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Err(PromptError::Eof);
        }
        Ok(answer
            .trim_end_matches(|c| c == '\n' || c == '\r')
            .to_string())
    }

    /// Asks until the answer parses as `T`.
    pub fn parse<T: FromStr>(&mut self, question: &str) -> Result<T, PromptError> {
        loop {
            let answer = self.line(question)?;
            match answer.trim().parse() {
                Ok(value) => return Ok(value),
                Err(_) => self.say(&format!("'{}' is not a valid number.", answer.trim()))?,
            }
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_line_strips_line_ending() {
        let mut p = prompter("clip.mp4\r\nnext\n");
        assert_eq!(p.line("Path: ").unwrap(), "clip.mp4");
        assert_eq!(p.line("Path: ").unwrap(), "next");
    }

    #[test]
    fn test_line_keeps_inner_spaces() {
        let mut p = prompter("  Hello World  \n");
        assert_eq!(p.line("Text: ").unwrap(), "  Hello World  ");
    }

    #[test]
    fn test_question_is_written() {
        let mut p = prompter("x\n");
        p.line("Enter the video file path: ").unwrap();
        let out = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(out, "Enter the video file path: ");
    }

    #[test]
    fn test_eof_is_an_error() {
        let mut p = prompter("");
        assert!(matches!(p.line("Path: "), Err(PromptError::Eof)));
    }

    #[test]
    fn test_last_line_without_newline() {
        let mut p = prompter("42");
        assert_eq!(p.parse::<i32>("n: ").unwrap(), 42);
    }

    #[test]
    fn test_parse_reprompts_on_bad_number() {
        let mut p = prompter("abc\n\n 90 \n");
        assert_eq!(p.parse::<i32>("Angle: ").unwrap(), 90);
        let out = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(out.matches("Angle: ").count(), 3);
        assert!(out.contains("'abc' is not a valid number."));
    }

    #[test]
    fn test_parse_float() {
        let mut p = prompter("1.5\n");
        assert_eq!(p.parse::<f64>("Start: ").unwrap(), 1.5);
    }

    #[test]
    fn test_parse_eof_while_reprompting() {
        let mut p = prompter("nope\n");
        assert!(matches!(p.parse::<i32>("n: "), Err(PromptError::Eof)));
    }
}
