//! Line-oriented output that measures text in terminal cells.

use std::io::{self, Write};
use std::sync::Arc;

use crate::host::{HostWidth, WidthStrategy};
use crate::render_prep::improve_rendering;

/// Writes lines to any [`Write`] sink, padding by measured cell width.
///
/// The width strategy defaults to the host slot, so an installed override is
/// picked up automatically; [`with_strategy`](Self::with_strategy) pins a
/// specific one instead.
pub struct Console<W: Write> {
    out: W,
    width: Arc<dyn WidthStrategy>,
    improve_display: bool,
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
            width: Arc::new(HostWidth),
            improve_display: true,
        }
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn WidthStrategy>) -> Self {
        self.width = strategy;
        self
    }

    /// Insert hair spaces after complex-script characters when printing.
    pub fn with_improve_display(mut self, enabled: bool) -> Self {
        self.improve_display = enabled;
        self
    }

    pub fn cell_len(&self, text: &str) -> usize {
        self.width.cell_len(text)
    }

    /// Cells taken by `text` as [`println`](Self::println) writes it, hair spaces included.
    pub fn display_len(&self, text: &str) -> usize {
        self.cell_len(&self.display(text))
    }

    /// `text` followed by spaces up to `width` cells; wider text is left as is.
    pub fn pad(&self, text: &str, width: usize) -> String {
        let mut padded = self.display(text);
        let used = self.cell_len(&padded);
        padded.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
        padded
    }

    pub fn println(&mut self, text: &str) -> io::Result<()> {
        let line = self.display(text);
        writeln!(self.out, "{line}")
    }

    pub fn blank_line(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    /// One table row: each `(text, width)` column padded, separated by two spaces.
    pub fn print_row(&mut self, columns: &[(&str, usize)]) -> io::Result<()> {
        let row = columns
            .iter()
            .map(|(text, width)| self.pad(text, *width))
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(self.out, "{}", row.trim_end())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn display(&self, text: &str) -> String {
        if self.improve_display {
            improve_rendering(text).into_owned()
        } else {
            text.to_string()
        }
    }
}
