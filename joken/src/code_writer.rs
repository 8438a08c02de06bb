use thiserror::Error;

use std::io;

pub struct CodeWriter<W: io::Write> {
    w: W,
    indent_level: u32,
}

impl<W: io::Write> CodeWriter<W> {
    pub fn new(w: W) -> CodeWriter<W> {
        CodeWriter { w, indent_level: 0 }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn unindent(&mut self) -> Result<(), Error> {
        if self.indent_level == 0 {
            return Err(Error::IndentUnderflow);
        }
        self.indent_level -= 1;
        Ok(())
    }

    pub fn append_indent(&mut self) -> Result<(), Error> {
        // FIRRTL is indentation-sensitive; two spaces per level
        for _ in 0..self.indent_level {
            write!(self.w, "  ")?;
        }
        Ok(())
    }

    pub fn append_newline(&mut self) -> Result<(), Error> {
        writeln!(self.w)?;
        Ok(())
    }

    pub fn append(&mut self, s: &str) -> Result<(), Error> {
        write!(self.w, "{}", s)?;
        Ok(())
    }

    pub fn append_line(&mut self, s: &str) -> Result<(), Error> {
        self.append_indent()?;
        self.append(s)?;
        self.append_newline()?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("attempted to unindent past the outermost indentation level")]
    IndentUnderflow,
    #[error(transparent)]
    Io(#[from] io::Error),
}
