//! `relmark render` command implementation.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use pulldown_cmark::{Options, Parser, html};
use relmark_config::ChangelogConfig;
use relmark_renderer::{BlockParser, ChangelogProcessor, TemplateRegistry};
use tracing::info;

use super::{CommonArgs, create_formatter};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to process (`-` reads stdin).
    input: PathBuf,

    /// Write the result here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render the result to HTML.
    #[arg(long)]
    html: bool,

    /// Leave changelog directives untouched.
    #[arg(long)]
    disable: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, reading, expansion, or writing fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.common.load_config(self.disable.then_some(false))?;
        if let Some(path) = &config.config_path {
            info!("Using config {}", path.display());
        }
        if !config.changelog.enabled {
            output.warning("Changelog directives disabled; leaving them as written");
        }

        let markdown = read_input(&self.input)?;
        let mut parser = build_parser(&config.changelog, &TemplateRegistry::new())?;
        let processed = parser.process(&markdown)?;

        let rendered = if self.html {
            markdown_to_html(&processed)
        } else {
            processed
        };

        write_output(self.output.as_deref(), &rendered)?;
        if let Some(path) = &self.output {
            output.success(&format!("Wrote {}", path.display()));
        }

        Ok(())
    }
}

/// Build the block parser for a document.
///
/// With the directive disabled no processor is registered and every block
/// passes through.
fn build_parser(
    changelog: &ChangelogConfig,
    registry: &TemplateRegistry,
) -> Result<BlockParser, CliError> {
    if !changelog.enabled {
        info!("Changelog directive disabled, passing blocks through");
        return Ok(BlockParser::new());
    }

    let formatter = create_formatter(changelog, registry)?;
    Ok(BlockParser::new().with_processor(ChangelogProcessor::from_config(formatter, changelog)))
}

fn read_input(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

fn write_output(path: Option<&Path>, text: &str) -> Result<(), CliError> {
    match path {
        Some(path) => std::fs::write(path, text)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
