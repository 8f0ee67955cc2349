//! Two-pass Jinja2 rendering of intended router configuration.
//!
//! Variables may themselves carry template directives (a host var such as
//! `router_id: "{{ loopback }}"`), so the output of the first pass is rendered
//! once more against the same context. Rendering is strict: any reference to
//! an undefined variable fails the render instead of producing empty text.

use indexmap::IndexMap;
use minijinja::{Environment, ErrorKind, UndefinedBehavior, Value};
use std::path::Path;
use tracing::trace;

use crate::error::{Error, Result};

/// Variable context handed to the renderer.
pub type Vars = IndexMap<String, serde_yaml::Value>;

/// Strict two-pass template renderer.
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRenderer").finish_non_exhaustive()
    }
}

impl TemplateRenderer {
    /// Create a renderer with Jinja2-compatible block handling.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(false);
        Self { env }
    }

    /// Render `source` twice against `vars`.
    ///
    /// `name` only labels errors (usually the template path).
    pub fn render(&self, name: &str, source: &str, vars: &Vars) -> Result<String> {
        let ctx = Value::from_serialize(vars);

        let first = self.render_once(name, source, &ctx)?;
        trace!(template = %name, len = first.len(), "first pass rendered");

        if !has_directives(&first) {
            return Ok(first);
        }

        let second = self.render_once(name, &first, &ctx)?;
        trace!(template = %name, len = second.len(), "second pass rendered");
        Ok(second)
    }

    /// Read a template from disk and render it.
    pub fn render_file(&self, path: &Path, vars: &Vars) -> Result<String> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let source = std::fs::read_to_string(path)?;
        self.render(&path.display().to_string(), &source, vars)
    }

    fn render_once(&self, name: &str, source: &str, ctx: &Value) -> Result<String> {
        self.env.render_str(source, ctx).map_err(|e| {
            let message = describe(&e);
            match e.kind() {
                ErrorKind::SyntaxError | ErrorKind::BadEscape => Error::template_syntax(name, message),
                _ => Error::template_render(name, message),
            }
        })
    }
}

/// Whether `text` still contains Jinja2 delimiters.
pub fn has_directives(text: &str) -> bool {
    text.contains("{{") || text.contains("{%") || text.contains("{#")
}

fn describe(err: &minijinja::Error) -> String {
    match (err.detail(), err.line()) {
        (Some(detail), Some(line)) => format!("{} (line {}): {}", err.kind(), line, detail),
        (Some(detail), None) => format!("{}: {}", err.kind(), detail),
        (None, Some(line)) => format!("{} (line {})", err.kind(), line),
        (None, None) => err.kind().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, serde_yaml::Value)]) -> Vars {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn s(v: &str) -> serde_yaml::Value {
        serde_yaml::Value::String(v.to_string())
    }

    #[test]
    fn test_single_pass_substitution() {
        let r = TemplateRenderer::new();
        let out = r
            .render("t", "hostname {{ name }}\n", &vars(&[("name", s("r1"))]))
            .unwrap();
        assert_eq!(out, "hostname r1");
    }

    #[test]
    fn test_nested_directive_expanded_in_second_pass() {
        let r = TemplateRenderer::new();
        let ctx = vars(&[("a", s("{{ b }}")), ("b", s("x"))]);
        assert_eq!(r.render("t", "{{ a }}", &ctx).unwrap(), "x");
    }

    #[test]
    fn test_undefined_variable_fails() {
        let r = TemplateRenderer::new();
        let err = r.render("frr.conf.j2", "{{ missing }}", &Vars::new()).unwrap_err();
        assert!(matches!(err, Error::TemplateRender { .. }));
        assert!(err.to_string().contains("frr.conf.j2"));
    }

    #[test]
    fn test_undefined_in_second_pass_fails() {
        let r = TemplateRenderer::new();
        let ctx = vars(&[("a", s("{{ nope }}"))]);
        assert!(r.render("t", "{{ a }}", &ctx).is_err());
    }

    #[test]
    fn test_syntax_error_is_classified() {
        let r = TemplateRenderer::new();
        let err = r.render("t", "{% if %}", &Vars::new()).unwrap_err();
        assert!(matches!(err, Error::TemplateSyntax { .. }));
    }

    #[test]
    fn test_rendering_plain_text_is_identity() {
        let r = TemplateRenderer::new();
        let text = "router ospf\n ospf router-id 1.1.1.1\n!";
        assert_eq!(r.render("t", text, &Vars::new()).unwrap(), text);
    }

    #[test]
    fn test_render_is_idempotent_on_output() {
        let r = TemplateRenderer::new();
        let ctx = vars(&[(
            "nets",
            serde_yaml::Value::Sequence(vec![s("10.0.1.0/24"), s("10.0.12.0/30")]),
        )]);
        let tmpl = "router ospf\n{% for n in nets %}\n network {{ n }} area 0\n{% endfor %}\n!\n";
        let once = r.render("t", tmpl, &ctx).unwrap();
        assert_eq!(
            once,
            "router ospf\n network 10.0.1.0/24 area 0\n network 10.0.12.0/30 area 0\n!"
        );
        assert_eq!(r.render("t", &once, &ctx).unwrap(), once);
    }

    #[test]
    fn test_render_file_missing() {
        let r = TemplateRenderer::new();
        let err = r
            .render_file(Path::new("/nonexistent/frr.conf.j2"), &Vars::new())
            .unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }
}
