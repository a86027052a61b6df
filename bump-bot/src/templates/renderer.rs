//! Template renderer.

use crate::dependency::Dependency;
use handlebars::{no_escape, Handlebars};
use serde_json::{json, Value};

/// Commit message for a bump.
pub const COMMIT_MESSAGE_TEMPLATE: &str = "{{dependency}}: {{compare_url}}";

/// Body of a bump pull request.
pub const PR_BODY_TEMPLATE: &str = "This is a {{dependency}} version bump. \
See the link below for a diff of new changes:

{{compare_url}} 

Associated PRs:
{{#each changelog}}{{this}}
{{/each}}";

/// Creates a configured Handlebars registry.
///
/// The registry is configured with:
/// - No HTML escaping (for markdown output)
/// - Strict mode (catches missing variables)
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();

    // Disable HTML escaping for markdown output
    hbs.register_escape_fn(no_escape);

    // Enable strict mode to catch missing variables
    hbs.set_strict_mode(true);

    hbs
}

/// Renders commit messages and PR bodies.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Creates a new template renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlebars: create_handlebars_registry(),
        }
    }

    /// Renders the commit message for bumping `dependency`.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_commit_message(
        &self,
        dependency: &Dependency,
        compare_url: &str,
    ) -> Result<String, super::TemplateError> {
        let data = json!({
            "dependency": dependency.id.as_str(),
            "compare_url": compare_url,
        });

        self.render_template(COMMIT_MESSAGE_TEMPLATE, &data)
    }

    /// Renders the PR body with the changelog lines.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_pr_body(
        &self,
        dependency: &Dependency,
        compare_url: &str,
        changelog: &[String],
    ) -> Result<String, super::TemplateError> {
        let data = json!({
            "dependency": dependency.id.as_str(),
            "compare_url": compare_url,
            "live": dependency.live,
            "latest": dependency.latest,
            "changelog": changelog,
        });

        self.render_template(PR_BODY_TEMPLATE, &data)
    }

    fn render_template(&self, template: &str, data: &Value) -> Result<String, super::TemplateError> {
        Ok(self.handlebars.render_template(template, data)?)
    }
}
