//! Block-level markdown preprocessing.
//!
//! A document is normalized, split into blocks on blank lines, and offered
//! block by block to the registered [`BlockProcessor`]s. Processors may
//! consume the front block and push replacement blocks in its place; the
//! replacements are offered to the processors again. Blocks nobody claims
//! pass through unchanged and are joined back with blank lines.
//!
//! Fenced code blocks are stashed before splitting and restored verbatim at
//! the end, so processors never see their contents.

use std::collections::VecDeque;

use crate::error::RenderError;
use crate::fence::{FenceScanner, LineKind};

/// Separator between blocks.
const BLOCK_SEPARATOR: &str = "\n\n";

/// Stash placeholder delimiters. Stripped from input before stashing.
const STX: char = '\u{2}';
const ETX: char = '\u{3}';

/// A processor for one kind of markdown block.
pub trait BlockProcessor {
    /// Check whether this processor handles the block.
    fn test(&self, block: &str) -> bool;

    /// Process the front block of `blocks`.
    ///
    /// Called only after [`test`](Self::test) accepted `blocks[0]`. The
    /// processor may pop the front block and push replacements. Returns
    /// `true` when the remaining processors should still be offered the
    /// front block, `false` when this processor has handled it.
    ///
    /// A processor returning `false` must have replaced the front block,
    /// otherwise it is offered the same block again.
    fn run(&mut self, blocks: &mut VecDeque<String>) -> Result<bool, RenderError>;

    /// Called once before each document is split into blocks.
    ///
    /// Per-document state is reset here, so a parser can be reused across
    /// documents.
    fn begin_document(&mut self) {}
}

/// Runs block processors over a markdown document.
#[derive(Default)]
pub struct BlockParser {
    processors: Vec<Box<dyn BlockProcessor>>,
}

impl BlockParser {
    /// Create a parser with no processors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a processor. Processors are offered blocks in registration
    /// order.
    #[must_use]
    pub fn with_processor<P: BlockProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Whether any processor is registered.
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Process a document.
    ///
    /// Line endings are normalized to `\n` and whitespace-only lines are
    /// emptied. The first processor error aborts the document.
    pub fn process(&mut self, markdown: &str) -> Result<String, RenderError> {
        for processor in &mut self.processors {
            processor.begin_document();
        }

        let normalized = normalize(markdown);
        let (text, stash) = stash_fences(&normalized);

        let mut blocks: VecDeque<String> =
            text.split(BLOCK_SEPARATOR).map(str::to_owned).collect();
        let mut output = Vec::with_capacity(blocks.len());

        while !blocks.is_empty() {
            let mut handled = false;
            for processor in &mut self.processors {
                let Some(front) = blocks.front() else {
                    break;
                };
                if processor.test(front) && !processor.run(&mut blocks)? {
                    handled = true;
                    break;
                }
            }
            if !handled && let Some(block) = blocks.pop_front() {
                output.push(block);
            }
        }

        Ok(restore_fences(&output.join(BLOCK_SEPARATOR), &stash))
    }
}

/// Normalize line endings and empty whitespace-only lines.
fn normalize(markdown: &str) -> String {
    let text = markdown
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace([STX, ETX], "");

    text.split('\n')
        .map(|line| if line.trim().is_empty() { "" } else { line })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace every fenced code block by a single-line placeholder.
///
/// An unclosed fence runs to the end of the document.
fn stash_fences(text: &str) -> (String, Vec<String>) {
    let mut scanner = FenceScanner::default();
    let mut stash = Vec::new();
    let mut lines = Vec::new();
    let mut fence: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        match scanner.classify(line) {
            LineKind::Text => lines.push(line.to_owned()),
            LineKind::Open | LineKind::Code => fence.push(line),
            LineKind::Close => {
                fence.push(line);
                lines.push(placeholder(stash.len()));
                stash.push(fence.join("\n"));
                fence.clear();
            }
        }
    }

    if !fence.is_empty() {
        lines.push(placeholder(stash.len()));
        stash.push(fence.join("\n"));
    }

    (lines.join("\n"), stash)
}

fn placeholder(index: usize) -> String {
    format!("{STX}fence:{index}{ETX}")
}

fn restore_fences(text: &str, stash: &[String]) -> String {
    stash
        .iter()
        .enumerate()
        .fold(text.to_owned(), |acc, (index, fence)| {
            acc.replacen(&placeholder(index), fence, 1)
        })
}
