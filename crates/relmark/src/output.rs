//! Status and error reporting on stderr.
//!
//! stdout carries rendered documents, so everything the CLI says about its
//! own progress goes through [`Output`].

use std::error::Error;

use console::{Style, Term};

/// How a status line is colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Plain,
    Success,
    Warning,
    Failure,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Plain => Style::new(),
            Self::Success => Style::new().green(),
            Self::Warning => Style::new().yellow(),
            Self::Failure => Style::new().red().bold(),
        }
    }
}

/// Status writer for the CLI.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(Tone::Plain, msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.line(Tone::Success, msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.line(Tone::Warning, msg);
    }

    /// Report a fatal error with every cause not already in its message.
    pub(crate) fn report(&self, err: &dyn Error) {
        let mut chain = error_chain(err).into_iter();
        if let Some(head) = chain.next() {
            self.line(Tone::Failure, &format!("Error: {head}"));
        }
        let dim = Style::new().red().dim();
        for cause in chain {
            let _ = self
                .term
                .write_line(&dim.apply_to(format!("  caused by: {cause}")).to_string());
        }
    }

    fn line(&self, tone: Tone, msg: &str) {
        let _ = self.term.write_line(&tone.style().apply_to(msg).to_string());
    }
}

/// Messages of `err` and its sources, outermost first.
///
/// Most wrappers embed their source's message in their own; a source whose
/// message already appears earlier in the chain is skipped.
fn error_chain(err: &dyn Error) -> Vec<String> {
    let mut chain = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !chain.iter().any(|seen| seen.contains(&text)) {
            chain.push(text);
        }
        source = cause.source();
    }
    chain
}
