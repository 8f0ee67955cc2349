//! Render command - show the intended configuration of a host

use super::CommandContext;
use anyhow::{Context, Result};
use clap::Parser;
use netauto::normalize::normalize;
use netauto::section::extract_ospf;
use netauto::template::TemplateRenderer;
use netauto::vars::{build_context, FileVarStore};
use serde_json::json;
use std::path::PathBuf;

/// Arguments for the render command
#[derive(Parser, Debug, Clone)]
pub struct RenderArgs {
    /// Host to render
    pub host: String,

    /// Only print the `router ospf` block
    #[arg(long)]
    pub section: bool,

    /// Normalize whitespace before printing
    #[arg(long)]
    pub normalize: bool,

    /// Write to a file instead of stdout
    #[arg(long = "out", short = 'o')]
    pub out: Option<PathBuf>,

    /// Template file (overrides the configured path)
    #[arg(long, short = 't')]
    pub template: Option<PathBuf>,
}

impl RenderArgs {
    /// Execute the render command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let paths = &ctx.config.paths;
        let template = self
            .template
            .clone()
            .unwrap_or_else(|| paths.template.clone());

        let store = FileVarStore::new(&paths.group_vars, &paths.host_vars_dir);
        let vars = build_context(&store, &self.host)
            .with_context(|| format!("Failed to load variables for {}", self.host))?;
        let mut text = TemplateRenderer::new()
            .render_file(&template, &vars)
            .with_context(|| format!("Failed to render {} for {}", template.display(), self.host))?;

        if self.section {
            text = extract_ospf(&text);
            if text.is_empty() {
                ctx.output
                    .warning(&format!("No router ospf section rendered for {}", self.host));
            }
        }
        if self.normalize {
            text = normalize(&text);
        }

        match &self.out {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                std::fs::write(path, &text)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                ctx.output.info(&format!("Wrote {}", path.display()));
            }
            None => ctx
                .output
                .document(&json!({ "host": self.host, "config": text }), &text),
        }

        Ok(0)
    }
}
