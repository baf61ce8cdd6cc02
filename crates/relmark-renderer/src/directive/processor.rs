//! Block processor expanding changelog directives.

use std::collections::VecDeque;

use relmark_config::ChangelogConfig;
use tracing::{debug, info};

use super::options::{DirectiveOptions, GlobalOptions};
use super::parser::{self, DirectiveMatch};
use crate::blocks::BlockProcessor;
use crate::error::RenderError;
use crate::formatter::ReleaseFormatter;

/// Default cap on directive expansions per document.
pub const DEFAULT_MAX_EXPANSIONS: usize = 64;

/// Expands `::github-release-changelog` blocks into rendered releases.
///
/// The rendered markdown is pushed back onto the block queue, so headings
/// and lists in release notes are handled like any other markdown.
pub struct ChangelogProcessor {
    formatter: ReleaseFormatter,
    global: GlobalOptions,
    max_expansions: usize,
    expansions: usize,
}

impl ChangelogProcessor {
    /// Create a processor with the given plugin-level options.
    pub fn new(formatter: ReleaseFormatter, global: GlobalOptions) -> Self {
        Self {
            formatter,
            global,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
            expansions: 0,
        }
    }

    /// Create a processor from the `[changelog]` configuration section.
    pub fn from_config(formatter: ReleaseFormatter, config: &ChangelogConfig) -> Self {
        Self::new(formatter, GlobalOptions::from(config))
            .with_max_expansions(config.max_expansions)
    }

    /// Set the maximum number of directives expanded per document.
    ///
    /// Release notes may themselves contain directives; the cap stops
    /// runaway expansion. The count restarts with every document handed to
    /// [`BlockParser::process`](crate::BlockParser::process).
    #[must_use]
    pub fn with_max_expansions(mut self, max: usize) -> Self {
        self.max_expansions = max;
        self
    }

    /// Render one directive.
    ///
    /// `body` is the detabbed option body.
    pub fn expand(&self, directive: &DirectiveMatch, body: &str) -> Result<String, RenderError> {
        let options = DirectiveOptions::parse(body)?;
        self.render_directive(directive, &options)
    }

    /// Render one directive with already parsed options.
    ///
    /// Rendered releases are joined with blank lines and every `# ` is
    /// deepened by the base indent.
    pub fn render_directive(
        &self,
        directive: &DirectiveMatch,
        options: &DirectiveOptions,
    ) -> Result<String, RenderError> {
        let options = options.resolve(&self.global, directive.heading_level);
        debug!(
            "Directive {}/{}: base_indent={}, autolink={}, filter={:?}",
            directive.owner,
            directive.repo,
            options.base_indent,
            options.autolink,
            options.name_filter
        );

        let releases = self
            .formatter
            .render(&directive.owner, &directive.repo, &options)?;

        Ok(shift_headings(&releases.join("\n\n"), options.base_indent))
    }
}

impl BlockProcessor for ChangelogProcessor {
    fn test(&self, block: &str) -> bool {
        parser::matches(block)
    }

    fn run(&mut self, blocks: &mut VecDeque<String>) -> Result<bool, RenderError> {
        let Some(block) = blocks.pop_front() else {
            return Ok(true);
        };
        let Some(extracted) = parser::extract(&block) else {
            blocks.push_front(block);
            return Ok(true);
        };

        self.expansions += 1;
        if self.expansions > self.max_expansions {
            return Err(RenderError::ExpansionLimit(self.max_expansions));
        }

        info!(
            "Expanding changelog for {}/{}",
            extracted.directive.owner, extracted.directive.repo
        );
        let rendered = self.expand(&extracted.directive, &extracted.body)?;

        if !extracted.remainder.is_empty() {
            blocks.push_front(extracted.remainder);
        }
        if !rendered.is_empty() {
            blocks.push_front(rendered);
        }
        let prefix = extracted.prefix.trim_end_matches('\n');
        if !prefix.is_empty() {
            blocks.push_front(prefix.to_owned());
        }

        Ok(false)
    }

    fn begin_document(&mut self) {
        self.expansions = 0;
    }
}

/// Deepen every `# ` in `text` by `levels` extra `#`.
fn shift_headings(text: &str, levels: usize) -> String {
    if levels == 0 {
        return text.to_owned();
    }
    text.replace("# ", &format!("{}# ", "#".repeat(levels)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::blocks::BlockParser;
    use crate::formatter::tests::{FakeSources, api_release};
    use crate::template::DefaultEnvironment;
    use crate::test_env::ScopedEnv;

    const RELEASES: &str = "# 0.1.0\n\n## Features\n Hello World ([#1](https://www.google.com))";
    const SHIFTED: &str = "#### 0.1.0\n\n##### Features\n Hello World ([#1](https://www.google.com))";

    /// `abc/def` with a single release whose body is [`RELEASES`].
    fn sources() -> FakeSources {
        FakeSources::with_repo(
            "abc/def",
            vec![api_release(
                "0.1.0",
                "https://github.com/abc/def/releases/tag/0.1.0",
                "2023-11-01T13:46:00Z",
                RELEASES,
            )],
        )
    }

    /// Renders bodies verbatim.
    fn body_only() -> GlobalOptions {
        GlobalOptions {
            release_template: Some("{{ release.body }}".to_owned()),
            autoprocess: false,
            ..GlobalOptions::default()
        }
    }

    fn processor(sources: &FakeSources, global: GlobalOptions) -> ChangelogProcessor {
        ChangelogProcessor::new(
            ReleaseFormatter::new(sources.clone(), &DefaultEnvironment),
            global,
        )
    }

    fn directive(heading_level: usize) -> DirectiveMatch {
        DirectiveMatch {
            heading_level,
            owner: "abc".to_owned(),
            repo: "def".to_owned(),
        }
    }

    #[test]
    fn test_expand_simple() {
        let sources = sources();
        let result = processor(&sources, body_only())
            .expand(&directive(0), "")
            .unwrap();

        assert_eq!(result, RELEASES);
        assert_eq!(sources.calls.borrow().connects, vec![(None, None)]);
        assert_eq!(
            sources.calls.borrow().listings,
            vec![("abc".to_owned(), "def".to_owned())]
        );
    }

    #[test]
    fn test_expand_with_global_config() {
        let sources = sources();
        let global = GlobalOptions {
            token: Some("789".to_owned()),
            name_filter: Some("0.1".to_owned()),
            ..body_only()
        };
        let result = processor(&sources, global)
            .expand(&directive(0), "")
            .unwrap();

        assert_eq!(result, RELEASES);
        assert_eq!(
            sources.calls.borrow().connects,
            vec![(Some("789".to_owned()), None)]
        );
    }

    #[test]
    fn test_expand_with_local_config() {
        let sources = sources();
        let global = GlobalOptions {
            token: Some("789".to_owned()),
            release_template: Some("xyz".to_owned()),
            ..GlobalOptions::default()
        };
        let result = processor(&sources, global)
            .expand(
                &directive(0),
                "token: 567\nrelease_template: \"# {{ release.name }}\"\ngithub_api_url: https://microsoft.com\nbase_indent: 3\nmatch: \"0.1\"\nautoprocess: false",
            )
            .unwrap();

        assert_eq!(result, "#### 0.1.0");
        assert_eq!(
            sources.calls.borrow().connects,
            vec![(
                Some("567".to_owned()),
                Some("https://microsoft.com".to_owned())
            )]
        );
    }

    #[test]
    fn test_expand_with_env() {
        let _env = ScopedEnv::lock().set("RELMARK_TEST_PROCESSOR_TOKEN", "abcdef");
        let sources = sources();
        let global = GlobalOptions {
            token: Some("789".to_owned()),
            ..body_only()
        };
        let result = processor(&sources, global)
            .expand(
                &directive(0),
                "token: !ENV RELMARK_TEST_PROCESSOR_TOKEN\ngithub_api_url: https://microsoft.com\nbase_indent: 3",
            )
            .unwrap();

        assert_eq!(result, SHIFTED);
        assert_eq!(
            sources.calls.borrow().connects,
            vec![(
                Some("abcdef".to_owned()),
                Some("https://microsoft.com".to_owned())
            )]
        );
    }

    #[test]
    fn test_expand_with_heading_level() {
        let sources = sources();
        let result = processor(&sources, body_only())
            .expand(&directive(3), "")
            .unwrap();
        assert_eq!(result, SHIFTED);
    }

    #[test]
    fn test_expand_base_indent_overrides_heading() {
        let sources = sources();
        let result = processor(&sources, body_only())
            .expand(&directive(3), "base_indent: 0")
            .unwrap();
        assert_eq!(result, RELEASES);
    }

    #[test]
    fn test_expand_nothing_selected() {
        let sources = sources();
        let result = processor(&sources, body_only())
            .expand(&directive(2), "match: \"9\"")
            .unwrap();
        assert_eq!(result, "");
    }

    #[test]
    fn test_expand_invalid_options() {
        let sources = sources();
        let err = processor(&sources, body_only())
            .expand(&directive(0), "base_indent: lots")
            .unwrap_err();
        assert!(matches!(err, RenderError::Options { .. }));
        assert!(sources.calls.borrow().connects.is_empty());
    }

    #[test]
    fn test_test_matching() {
        let sources = sources();
        let processor = processor(&sources, body_only());
        for block in [
            "::github-release-changelog abc/def\n    github_api_url: 123",
            "## ::github-release-changelog abc-0123/def.xyz",
            "### ::github-release-changelog abc-0123/def.xyz_123",
        ] {
            assert!(processor.test(block), "expected match: {block}");
        }
    }

    #[test]
    fn test_test_not_matching() {
        let sources = sources();
        let processor = processor(&sources, body_only());
        for block in [
            "::github-release-changelog",
            "::github-release-changelog abc*21/@12",
            "::: github-release-changelog",
            "::github-release-changelog abcder",
            ":: github-release-changelog abc/def\n    github_api_url: 123",
        ] {
            assert!(!processor.test(block), "unexpected match: {block}");
        }
    }

    #[test]
    fn test_run_matching_block() {
        let sources = sources();
        let mut processor = processor(&sources, body_only());
        let mut blocks: VecDeque<String> =
            ["::github-release-changelog abc/def", "b"].map(String::from).into();

        assert!(!processor.run(&mut blocks).unwrap());
        assert_eq!(blocks, [RELEASES, "b"]);
    }

    #[test]
    fn test_run_no_matching_block() {
        let sources = sources();
        let mut processor = processor(&sources, body_only());
        let mut blocks: VecDeque<String> = ["a", "b"].map(String::from).into();

        assert!(processor.run(&mut blocks).unwrap());
        assert_eq!(blocks, ["a", "b"]);
        assert!(sources.calls.borrow().connects.is_empty());
    }

    #[test]
    fn test_run_splits_prefix_and_remainder() {
        let sources = sources();
        let mut processor = processor(&sources, body_only());
        let mut blocks: VecDeque<String> = [
            "Intro.\n### ::github-release-changelog abc/def\n    base_indent: 1\nOutro.",
            "b",
        ]
        .map(String::from)
        .into();

        processor.run(&mut blocks).unwrap();
        assert_eq!(
            blocks,
            [
                "Intro.",
                "## 0.1.0\n\n### Features\n Hello World ([#1](https://www.google.com))",
                "Outro.",
                "b",
            ]
        );
    }

    #[test]
    fn test_run_empty_result_leaves_no_block() {
        let sources = sources();
        let mut processor = processor(&sources, body_only());
        let mut blocks: VecDeque<String> =
            ["::github-release-changelog abc/def\n    match: x"].map(String::from).into();

        processor.run(&mut blocks).unwrap();
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_run_error_propagates() {
        let sources = sources();
        let mut processor = processor(&sources, body_only());
        let mut blocks: VecDeque<String> =
            ["::github-release-changelog nobody/here"].map(String::from).into();

        let err = processor.run(&mut blocks).unwrap_err();
        assert!(matches!(err, RenderError::Github(_)));
    }

    #[test]
    fn test_expansion_limit() {
        let sources = sources();
        let mut processor = processor(&sources, body_only()).with_max_expansions(1);
        let mut blocks: VecDeque<String> = [
            "::github-release-changelog abc/def",
            "::github-release-changelog abc/def",
        ]
        .map(String::from)
        .into();

        processor.run(&mut blocks).unwrap();
        blocks.pop_front();
        let err = processor.run(&mut blocks).unwrap_err();
        assert!(matches!(err, RenderError::ExpansionLimit(1)));
    }

    #[test]
    fn test_expansion_limit_is_per_document() {
        let sources = sources();
        let mut parser = BlockParser::new()
            .with_processor(processor(&sources, body_only()).with_max_expansions(2));
        let input = "::github-release-changelog abc/def\n\n::github-release-changelog abc/def";

        for _ in 0..3 {
            let output = parser.process(input).unwrap();
            assert_eq!(output, format!("{RELEASES}\n\n{RELEASES}"));
        }
        assert_eq!(sources.calls.borrow().listings.len(), 6);
    }

    #[test]
    fn test_document_round_trip() {
        let sources = sources();
        let mut parser = BlockParser::new().with_processor(processor(&sources, body_only()));
        let input = "# Changelog\n\n## ::github-release-changelog abc/def\n\n```\n::github-release-changelog abc/def\n```\n";

        let output = parser.process(input).unwrap();
        assert_eq!(
            output,
            "# Changelog\n\n### 0.1.0\n\n#### Features\n Hello World ([#1](https://www.google.com))\n\n```\n::github-release-changelog abc/def\n```\n"
        );
        assert_eq!(sources.calls.borrow().listings.len(), 1);
    }

    #[test]
    fn test_from_config_respects_max_expansions() {
        let sources = sources();
        let config = ChangelogConfig {
            max_expansions: 0,
            ..ChangelogConfig::default()
        };
        let mut processor = ChangelogProcessor::from_config(
            ReleaseFormatter::new(sources.clone(), &DefaultEnvironment),
            &config,
        );
        let mut blocks: VecDeque<String> =
            ["::github-release-changelog abc/def"].map(String::from).into();

        let err = processor.run(&mut blocks).unwrap_err();
        assert!(matches!(err, RenderError::ExpansionLimit(0)));
    }

    #[test]
    fn test_render_directive_typed_options() {
        let sources = sources();
        let options = DirectiveOptions {
            release_template: Some("# {{ release.tag_name }}".to_owned()),
            base_indent: Some(1),
            ..DirectiveOptions::default()
        };
        let result = processor(&sources, GlobalOptions::default())
            .render_directive(&directive(0), &options)
            .unwrap();
        assert_eq!(result, "## 0.1.0");
    }

    #[test]
    fn test_shift_headings() {
        assert_eq!(shift_headings("# a\n## b", 0), "# a\n## b");
        assert_eq!(shift_headings("# a\n## b", 2), "### a\n#### b");
        assert_eq!(shift_headings("issue #1 fixed", 2), "issue #1 fixed");
    }
}
