//! Error types for Netauto.
//!
//! Per-host failures during a drift check or a collection run are recorded in
//! the batch result instead of being returned, so most of these variants only
//! surface through the library API or as the reason attached to a failed host.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Netauto operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Netauto.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Template Errors
    // ========================================================================
    /// Template syntax error.
    #[error("Template syntax error in '{template}': {message}")]
    TemplateSyntax {
        /// Template name or path
        template: String,
        /// Error message
        message: String,
    },

    /// Template rendering error (undefined variable, bad filter call, ...).
    #[error("Template rendering failed for '{template}': {message}")]
    TemplateRender {
        /// Template name or path
        template: String,
        /// Error message
        message: String,
    },

    // ========================================================================
    // Variable Errors
    // ========================================================================
    /// A variables file exists but could not be parsed.
    #[error("Failed to load variables from '{path}': {message}")]
    VarsLoad {
        /// Path to the variables file
        path: PathBuf,
        /// Error message
        message: String,
    },

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl Error {
    /// Creates a new template render error.
    pub fn template_render(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TemplateRender {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Creates a new template syntax error.
    pub fn template_syntax(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TemplateSyntax {
            template: template.into(),
            message: message.into(),
        }
    }
}
