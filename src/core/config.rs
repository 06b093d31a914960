//! Configuration for vector renderers
//!
//! Options are plain serde structs so they can be loaded from JSON, validated
//! once, and swapped between presets the same way map performance profiles are.

use crate::core::constants::{DEFAULT_PADDING, DEFAULT_TOLERANCE};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Renderer options recognized by the layer system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererOptions {
    /// How much to extend the clip area around the map view, relative to its size.
    /// 0.1 is 10% of the view in each direction.
    pub padding: f64,
    /// How much to extend click tolerance around a drawable, in pixels.
    pub tolerance: f64,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl RendererOptions {
    /// Creates validated options
    pub fn new(padding: f64, tolerance: f64) -> Result<Self> {
        let options = Self { padding, tolerance };
        options.validate()?;
        Ok(options)
    }

    /// Parses options from JSON; missing keys fall back to defaults
    pub fn from_json(raw: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(raw)?;
        options.validate()?;
        Ok(options)
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(Error::InvalidOptions(format!(
                "padding must be a finite, non-negative fraction (got {})",
                self.padding
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(Error::InvalidOptions(format!(
                "tolerance must be a finite, non-negative pixel value (got {})",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Named option presets
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RendererProfile {
    #[default]
    Balanced,
    /// Clip exactly to the visible container
    Tight,
    /// Pre-render half a view in every direction for fast panning
    Generous,
    Custom(RendererOptions),
}

impl RendererProfile {
    pub fn resolve(&self) -> RendererOptions {
        match self {
            Self::Balanced => RendererOptions::default(),
            Self::Tight => RendererOptions {
                padding: 0.0,
                ..RendererOptions::default()
            },
            Self::Generous => RendererOptions {
                padding: 0.5,
                ..RendererOptions::default()
            },
            Self::Custom(options) => *options,
        }
    }
}

/// What the rendering surface can do, resolved once when a renderer is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceCapabilities {
    /// Whether the surface accepts a combined translate + scale transform.
    /// Without it the surface is only repositioned and renders at native scale.
    pub combined_transforms: bool,
}

impl SurfaceCapabilities {
    pub fn position_only() -> Self {
        Self {
            combined_transforms: false,
        }
    }
}

impl Default for SurfaceCapabilities {
    fn default() -> Self {
        Self {
            combined_transforms: true,
        }
    }
}
