//! Directive line grammar and block splitting.
//!
//! Recognizes `::github-release-changelog <owner>/<repo>` on a line of its
//! own, optionally behind an ATX heading marker, and splits the surrounding
//! block into the text before it, its indented option body, and whatever
//! unindented text follows.

use std::sync::LazyLock;

use regex::Regex;

/// Indentation removed from the option body lines.
pub(crate) const TAB_LENGTH: usize = 4;

static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^(?:(?P<heading>#{1,6}) +)?::github-release-changelog ?(?P<org>[a-zA-Z0-9-]+?)/(?P<repo>.+?) *$",
    )
    .unwrap()
});

/// A recognized directive line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveMatch {
    /// Number of `#` in the heading marker (0 when the line has none).
    pub heading_level: usize,
    /// Organisation or user owning the repository.
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

/// A block split around its first directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDirective {
    /// Text before the directive line, to be handled as ordinary markup.
    pub prefix: String,
    /// The directive itself.
    pub directive: DirectiveMatch,
    /// Indented option lines after the directive, with one level of
    /// indentation removed.
    pub body: String,
    /// Unindented lines following the body. They belong to a separate block.
    pub remainder: String,
}

/// Check whether a block contains a directive line anywhere.
pub fn matches(block: &str) -> bool {
    DIRECTIVE_RE.is_match(block)
}

/// Parse a single line as a directive.
pub fn parse_line(line: &str) -> Option<DirectiveMatch> {
    let caps = DIRECTIVE_RE.captures(line)?;
    Some(directive_from_captures(&caps))
}

/// Split a block around its first directive line.
///
/// Returns `None` if the block contains no directive.
pub fn extract(block: &str) -> Option<ExtractedDirective> {
    let caps = DIRECTIVE_RE.captures(block)?;
    let whole = caps.get(0)?;
    let (body, remainder) = detab(&block[whole.end()..], TAB_LENGTH);

    Some(ExtractedDirective {
        prefix: block[..whole.start()].to_owned(),
        directive: directive_from_captures(&caps),
        body,
        remainder,
    })
}

fn directive_from_captures(caps: &regex::Captures<'_>) -> DirectiveMatch {
    DirectiveMatch {
        heading_level: caps.name("heading").map_or(0, |m| m.as_str().len()),
        owner: caps["org"].to_owned(),
        repo: caps["repo"].to_owned(),
    }
}

/// Remove one level of indentation from the leading indented lines.
///
/// Blank lines are kept (emptied). The first non-blank line without the
/// indentation ends the indented part; it and everything after it are
/// returned unchanged as the second element.
pub(crate) fn detab(text: &str, width: usize) -> (String, String) {
    let indent = " ".repeat(width);
    let lines: Vec<&str> = text.split('\n').collect();

    let mut body = Vec::with_capacity(lines.len());
    for line in &lines {
        if let Some(stripped) = line.strip_prefix(indent.as_str()) {
            body.push(stripped);
        } else if line.trim().is_empty() {
            body.push("");
        } else {
            break;
        }
    }

    let rest = lines[body.len()..].join("\n");
    (body.join("\n"), rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive(heading_level: usize, owner: &str, repo: &str) -> DirectiveMatch {
        DirectiveMatch {
            heading_level,
            owner: owner.to_owned(),
            repo: repo.to_owned(),
        }
    }

    #[test]
    fn test_parse_plain_directive() {
        assert_eq!(
            parse_line("::github-release-changelog abc/def"),
            Some(directive(0, "abc", "def"))
        );
    }

    #[test]
    fn test_parse_heading_directive() {
        assert_eq!(
            parse_line("## ::github-release-changelog abc-0123/def.xyz"),
            Some(directive(2, "abc-0123", "def.xyz"))
        );
        assert_eq!(
            parse_line("### ::github-release-changelog abc-0123/def.xyz_123"),
            Some(directive(3, "abc-0123", "def.xyz_123"))
        );
    }

    #[test]
    fn test_parse_trailing_spaces_trimmed() {
        assert_eq!(
            parse_line("::github-release-changelog my-org/my-repo   "),
            Some(directive(0, "my-org", "my-repo"))
        );
    }

    #[test]
    fn test_parse_non_matching() {
        for line in [
            "::github-release-changelog",
            "::github-release-changelog abc*21/@12",
            "::: github-release-changelog",
            "::github-release-changelog abcder",
            ":: github-release-changelog abc/def",
            "####### ::github-release-changelog abc/def",
            "##::github-release-changelog abc/def",
            "see ::github-release-changelog abc/def",
        ] {
            assert!(parse_line(line).is_none(), "unexpected match: {line}");
            assert!(!matches(line), "unexpected match: {line}");
        }
    }

    #[test]
    fn test_matches_anywhere_in_block() {
        assert!(matches(
            "::github-release-changelog abc/def\n    github_api_url: 123"
        ));
        assert!(matches("Some prose.\n## ::github-release-changelog abc/def"));
    }

    #[test]
    fn test_extract_simple() {
        let extracted = extract("::github-release-changelog abc/def").unwrap();
        assert_eq!(extracted.prefix, "");
        assert_eq!(extracted.directive, directive(0, "abc", "def"));
        assert_eq!(extracted.body, "");
        assert_eq!(extracted.remainder, "");
    }

    #[test]
    fn test_extract_prefix_body_and_remainder() {
        let block = "Intro text.\n### ::github-release-changelog abc/def\n    token: 567\n\n    base_indent: 3\nTrailing paragraph.\nMore.";
        let extracted = extract(block).unwrap();
        assert_eq!(extracted.prefix, "Intro text.\n");
        assert_eq!(extracted.directive, directive(3, "abc", "def"));
        assert_eq!(extracted.body, "\ntoken: 567\n\nbase_indent: 3");
        assert_eq!(extracted.remainder, "Trailing paragraph.\nMore.");
    }

    #[test]
    fn test_extract_first_directive_only() {
        let block = "::github-release-changelog a/one\n::github-release-changelog b/two";
        let extracted = extract(block).unwrap();
        assert_eq!(extracted.directive, directive(0, "a", "one"));
        assert_eq!(extracted.remainder, "::github-release-changelog b/two");
    }

    #[test]
    fn test_extract_no_match() {
        assert!(extract("just a paragraph").is_none());
    }

    #[test]
    fn test_detab_keeps_deeper_indentation() {
        let (body, rest) = detab("    a:\n        - b\n  c", 4);
        assert_eq!(body, "a:\n    - b");
        assert_eq!(rest, "  c");
    }
}
