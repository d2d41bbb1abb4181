//! Error types for device bring-up, renderer construction, and asset loading.
//!
//! Misuse of the frame protocol (drawing outside `begin_render`/`end_render`)
//! is a programming error and panics instead of showing up here.

use std::fmt;

use crate::config::ConfigError;

/// Errors returned while bringing up the GPU or creating renderer resources.
#[derive(Debug)]
pub enum RenderError {
    /// No adapter compatible with the surface was found.
    Adapter(String),
    /// The logical device could not be created.
    Device(String),
    /// The window surface could not be created.
    Surface(String),
    /// A GPU object failed validation during creation.
    ResourceCreation {
        resource: &'static str,
        message: String,
    },
    /// An image could not be read or decoded.
    TextureLoad { path: String, message: String },
    /// The renderer configuration was rejected.
    Config(ConfigError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Adapter(e) => write!(f, "no suitable GPU adapter: {e}"),
            RenderError::Device(e) => write!(f, "GPU device creation failed: {e}"),
            RenderError::Surface(e) => write!(f, "surface creation failed: {e}"),
            RenderError::ResourceCreation { resource, message } => {
                write!(f, "[SpriteRenderer] failed to create {resource}: {message}")
            }
            RenderError::TextureLoad { path, message } => {
                write!(f, "failed to load texture '{path}': {message}")
            }
            RenderError::Config(e) => write!(f, "invalid renderer config: {e}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for RenderError {
    fn from(e: ConfigError) -> Self {
        RenderError::Config(e)
    }
}
