//! `relmark releases` command implementation.

use std::io::{self, Write};

use clap::Args;
use relmark_renderer::directive::{DirectiveMatch, DirectiveOptions, parse_line};
use relmark_renderer::{ChangelogProcessor, TemplateRegistry};

use super::{CommonArgs, create_formatter};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the releases command.
#[derive(Args)]
pub(crate) struct ReleasesArgs {
    /// Repository as OWNER/REPO.
    repository: String,

    /// Only render releases whose name starts with a match of this regex.
    #[arg(long = "match")]
    name_filter: Option<String>,

    /// Template each release is rendered with.
    #[arg(long)]
    template: Option<String>,

    /// Extra heading levels for the rendered releases.
    #[arg(long)]
    base_indent: Option<usize>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ReleasesArgs {
    /// Execute the releases command.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository is malformed or rendering fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let directive = parse_repository(&self.repository)?;
        let config = self.common.load_config(None)?;

        let formatter = create_formatter(&config.changelog, &TemplateRegistry::new())?;
        let processor = ChangelogProcessor::from_config(formatter, &config.changelog);
        let options = DirectiveOptions {
            base_indent: self.base_indent,
            release_template: self.template,
            name_filter: self.name_filter,
            ..DirectiveOptions::default()
        };

        output.info(&format!(
            "Fetching releases for {}/{}...",
            directive.owner, directive.repo
        ));
        let rendered = processor.render_directive(&directive, &options)?;
        if rendered.is_empty() {
            output.warning("No releases matched");
            return Ok(());
        }

        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{rendered}")?;
        stdout.flush()?;
        Ok(())
    }
}

/// Parse `OWNER/REPO` with the same grammar as a directive line.
fn parse_repository(repository: &str) -> Result<DirectiveMatch, CliError> {
    let invalid = || {
        CliError::Validation(format!(
            "invalid repository '{repository}', expected OWNER/REPO"
        ))
    };

    let trimmed = repository.trim();
    if trimmed.contains(char::is_whitespace) {
        return Err(invalid());
    }
    parse_line(&format!("::github-release-changelog {trimmed}")).ok_or_else(invalid)
}
