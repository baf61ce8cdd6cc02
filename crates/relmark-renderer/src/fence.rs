//! Fenced code block detection.
//!
//! Directives inside fenced code blocks are shown as code, never expanded.

/// Where a line sits relative to fenced code blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind {
    /// Ordinary markdown.
    Text,
    /// Opening fence line.
    Open,
    /// Content of an open fence.
    Code,
    /// Closing fence line.
    Close,
}

/// Marker of an open fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    /// Parse an opening fence: three or more backticks or tildes, indented
    /// by at most three spaces. A backtick fence's info string may not
    /// contain backticks.
    fn open(line: &str) -> Option<Self> {
        let rest = strip_indent(line)?;
        let marker = rest.chars().next().filter(|c| matches!(c, '`' | '~'))?;
        let len = rest.chars().take_while(|&c| c == marker).count();
        if len < 3 || (marker == '`' && rest[len..].contains('`')) {
            return None;
        }
        Some(Self { marker, len })
    }

    /// A closing fence uses the same marker, is at least as long, and has
    /// nothing but whitespace after it.
    fn closed_by(self, line: &str) -> bool {
        let Some(rest) = strip_indent(line) else {
            return false;
        };
        let len = rest.chars().take_while(|&c| c == self.marker).count();
        len >= self.len && rest[len..].trim().is_empty()
    }
}

/// Strip up to three leading spaces; `None` for deeper indentation.
fn strip_indent(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches(' ');
    (line.len() - rest.len() <= 3).then_some(rest)
}

/// Classifies lines of a document, in order, as text or fenced code.
#[derive(Debug, Default)]
pub(crate) struct FenceScanner {
    open: Option<Fence>,
}

impl FenceScanner {
    pub(crate) fn classify(&mut self, line: &str) -> LineKind {
        match self.open {
            Some(fence) if fence.closed_by(line) => {
                self.open = None;
                LineKind::Close
            }
            Some(_) => LineKind::Code,
            None => match Fence::open(line) {
                Some(fence) => {
                    self.open = Some(fence);
                    LineKind::Open
                }
                None => LineKind::Text,
            },
        }
    }
}
