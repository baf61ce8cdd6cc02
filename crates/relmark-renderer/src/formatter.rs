//! Release formatter: fetch, link, filter, and render releases.

use minijinja::{Environment, context};
use regex::Regex;
use relmark_github::ReleaseSourceFactory;
use tracing::{debug, info};

use crate::autolink::autolink;
use crate::directive::RenderOptions;
use crate::error::RenderError;
use crate::release::ReleaseRecord;
use crate::template::{DEFAULT_RELEASE_TEMPLATE, TemplateEnvironmentFactory};

/// Renders a repository's releases through a template.
///
/// Holds the template environment for the whole build; construct one per
/// build and reuse it for every directive.
pub struct ReleaseFormatter {
    sources: Box<dyn ReleaseSourceFactory>,
    env: Environment<'static>,
}

impl ReleaseFormatter {
    /// Create a formatter.
    ///
    /// The template environment is built from `templates` once, here.
    pub fn new<S>(sources: S, templates: &dyn TemplateEnvironmentFactory) -> Self
    where
        S: ReleaseSourceFactory + 'static,
    {
        Self {
            sources: Box::new(sources),
            env: templates.create(),
        }
    }

    /// Render every release of `owner/repo` that passes the name filter.
    ///
    /// Output order is the order the source returned releases in. Source,
    /// filter, and template errors are returned as-is; nothing is retried.
    pub fn render(
        &self,
        owner: &str,
        repo: &str,
        options: &RenderOptions,
    ) -> Result<Vec<String>, RenderError> {
        let api_url = options
            .api_base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'));
        let source = self.sources.connect(options.token.as_deref(), api_url)?;
        let releases = source.list_releases(owner, repo)?;
        let total = releases.len();

        let filter = options
            .name_filter
            .as_deref()
            .filter(|pattern| !pattern.is_empty())
            .map(prefix_regex)
            .transpose()?;

        let mut selected = Vec::with_capacity(total);
        for release in releases {
            let mut record = ReleaseRecord::from_api(release)?;
            if options.autolink {
                autolink(&mut record);
            }
            if filter.as_ref().is_none_or(|re| re.is_match(&record.name)) {
                selected.push(record);
            } else {
                debug!("Skipping release {} (name filter)", record.name);
            }
        }

        info!(
            "Rendering {} of {} releases for {}/{}",
            selected.len(),
            total,
            owner,
            repo
        );

        let source = options.template.as_deref().unwrap_or(DEFAULT_RELEASE_TEMPLATE);
        let template = self.env.template_from_str(source)?;
        selected
            .iter()
            .map(|release| {
                template
                    .render(context! { release => release })
                    .map_err(RenderError::from)
            })
            .collect()
    }
}

/// Compile a filter that must match at the start of the name.
fn prefix_regex(pattern: &str) -> Result<Regex, RenderError> {
    Ok(Regex::new(&format!(r"\A(?:{pattern})"))?)
}
