//! Line-aware terminal output
//!
//! Assistant text arrives in fragments that may stop mid-line, while status
//! lines must always start at column zero. [`Console`] remembers whether the
//! cursor sits at the start of a line so both kinds of output interleave
//! cleanly.

use std::io::{self, Write};

pub struct Console<W: Write> {
    out: W,
    at_line_start: bool,
}

impl Console<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            at_line_start: true,
        }
    }

    /// Write a fragment verbatim, with no added line breaks
    pub fn text(&mut self, fragment: &str) -> io::Result<()> {
        if fragment.is_empty() {
            return Ok(());
        }
        self.out.write_all(fragment.as_bytes())?;
        self.out.flush()?;
        self.at_line_start = fragment.ends_with('\n');
        Ok(())
    }

    /// Write a full line, breaking the current one first if needed
    pub fn line(&mut self, line: &str) -> io::Result<()> {
        self.end_line()?;
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        self.at_line_start = true;
        Ok(())
    }

    /// Terminate a partially written line
    pub fn end_line(&mut self) -> io::Result<()> {
        if !self.at_line_start {
            writeln!(self.out)?;
            self.at_line_start = true;
        }
        Ok(())
    }

    pub fn rule(&mut self) -> io::Result<()> {
        self.line(&"=".repeat(60))
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
