//! Renderer configuration loaded from JSON.
//!
//! Every field has a default, so a config file only needs the keys it wants to
//! change:
//!
//! ```json
//! { "max_sprites": 4096, "filter": "nearest" }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::render2d::Color;
use crate::render2d::pipeline::PipelineConfig;

/// Default number of quads a single batch can hold before it is flushed.
pub const DEFAULT_MAX_SPRITES: u32 = 2048;

/// Largest batch whose vertex indices still fit in a `u16` index buffer.
pub const MAX_SPRITES_LIMIT: u32 = (u16::MAX as u32 + 1) / 4;

/// How sprite textures are filtered when scaled or rotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureFilter {
    #[default]
    Linear,
    /// Keeps hard texel edges, which is what pixel art usually wants.
    Nearest,
}

impl TextureFilter {
    pub(crate) fn to_wgpu(self) -> wgpu::FilterMode {
        match self {
            TextureFilter::Linear => wgpu::FilterMode::Linear,
            TextureFilter::Nearest => wgpu::FilterMode::Nearest,
        }
    }
}

/// Settings for a [`SpriteRenderer`](crate::render2d::SpriteRenderer).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Quads per batch. A full batch is flushed automatically.
    pub max_sprites: u32,
    pub filter: TextureFilter,
    /// Tint used by [`DrawParams::default`](crate::render2d::DrawParams).
    pub default_tint: Color,
    /// Shader and entry points. Not part of the JSON file.
    #[serde(skip)]
    pub pipeline: PipelineConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_sprites: DEFAULT_MAX_SPRITES,
            filter: TextureFilter::default(),
            default_tint: Color::WHITE,
            pipeline: PipelineConfig::default(),
        }
    }
}

impl RendererConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config = Self::from_json_str(&json)?;
        log::debug!("Loaded renderer config from {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Parse)
    }

    /// Check that the values can back a renderer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_sprites == 0 || self.max_sprites > MAX_SPRITES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_sprites must be in 1..={MAX_SPRITES_LIMIT}, got {}",
                self.max_sprites
            )));
        }
        Ok(())
    }
}

/// Errors from reading or validating a [`RendererConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config read failed: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse failed: {e}"),
            ConfigError::Invalid(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = RendererConfig::from_json_str("{}").unwrap();
        assert_eq!(config.max_sprites, DEFAULT_MAX_SPRITES);
        assert_eq!(config.filter, TextureFilter::Linear);
        assert_eq!(config.default_tint, Color::WHITE);
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config =
            RendererConfig::from_json_str(r#"{ "max_sprites": 64, "filter": "nearest" }"#).unwrap();
        assert_eq!(config.max_sprites, 64);
        assert_eq!(config.filter, TextureFilter::Nearest);
    }

    #[test]
    fn tint_is_read_as_rgba() {
        let config = RendererConfig::from_json_str(
            r#"{ "default_tint": { "r": 1.0, "g": 0.5, "b": 0.0, "a": 0.25 } }"#,
        )
        .unwrap();
        assert_eq!(config.default_tint, Color::rgba(1.0, 0.5, 0.0, 0.25));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = RendererConfig::from_json_str(r#"{ "max_sprites": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got {err}");
    }

    #[test]
    fn capacity_beyond_u16_indices_is_rejected() {
        let ok = format!(r#"{{ "max_sprites": {MAX_SPRITES_LIMIT} }}"#);
        assert!(RendererConfig::from_json_str(&ok).is_ok());

        let too_big = format!(r#"{{ "max_sprites": {} }}"#, MAX_SPRITES_LIMIT + 1);
        assert!(RendererConfig::from_json_str(&too_big).is_err());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = RendererConfig::from_json_str("{ max_sprites: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn serialized_config_parses_back() {
        let config = RendererConfig {
            max_sprites: 512,
            filter: TextureFilter::Nearest,
            ..Default::default()
        };
        let json = config.to_json_string().unwrap();
        let parsed = RendererConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed.max_sprites, 512);
        assert_eq!(parsed.filter, TextureFilter::Nearest);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = RendererConfig::load("definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
