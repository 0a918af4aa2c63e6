//! Plain text backend writing frames to any byte sink.

use std::io::Write;

use anyhow::{Context, Result as AnyResult};
use overworld_rendering::{Frame, RenderingBackend};

/// Backend that prints each frame below the previous one.
#[derive(Debug)]
pub(crate) struct Terminal<W> {
    out: W,
}

impl<W: Write> Terminal<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderingBackend for Terminal<W> {
    fn present(&mut self, frame: &Frame) -> AnyResult<()> {
        write!(self.out, "{frame}").context("failed to draw the map")?;
        self.out.flush().context("failed to flush the terminal")
    }

    fn present_lines(&mut self, lines: &[String]) -> AnyResult<()> {
        for line in lines {
            writeln!(self.out, "{line}").context("failed to write a message")?;
        }
        self.out.flush().context("failed to flush the terminal")
    }
}
