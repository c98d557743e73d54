use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::viewport::ZoomLimits;
use crate::*;

const SCREEN_WIDTH_DEFAULT: f32 = 1280.0;
const SCREEN_HEIGHT_DEFAULT: f32 = 800.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub node_width: f32,
    pub node_height: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub zoom_step: f32,
    pub screen_width: f32,
    pub screen_height: f32,
}

fn lookup_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    fallback: T,
) -> T {
    lookup(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(fallback)
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

impl EditorConfig {
    /// Reads a JSON config file; missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let config: EditorConfig = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
        config.validated()
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::default()
                .validated()
                .context("invalid LAYERBOARD_* environment settings"),
        }
    }

    /// Builds a config from `LAYERBOARD_*` style keys; unset or unparsable
    /// keys keep the built-in defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            node_width: lookup_or(&lookup, "LAYERBOARD_NODE_WIDTH", NODE_WIDTH),
            node_height: lookup_or(&lookup, "LAYERBOARD_NODE_HEIGHT", NODE_HEIGHT),
            min_zoom: lookup_or(&lookup, "LAYERBOARD_MIN_ZOOM", MIN_ZOOM),
            max_zoom: lookup_or(&lookup, "LAYERBOARD_MAX_ZOOM", MAX_ZOOM),
            zoom_step: lookup_or(&lookup, "LAYERBOARD_ZOOM_STEP", ZOOM_STEP),
            screen_width: lookup_or(&lookup, "LAYERBOARD_SCREEN_WIDTH", SCREEN_WIDTH_DEFAULT),
            screen_height: lookup_or(&lookup, "LAYERBOARD_SCREEN_HEIGHT", SCREEN_HEIGHT_DEFAULT),
        }
    }

    pub fn validated(self) -> Result<Self> {
        let positive = |value: f32| value.is_finite() && value > 0.0;

        if !positive(self.node_width) || !positive(self.node_height) {
            anyhow::bail!("node size must be positive");
        }
        if !positive(self.min_zoom) || !positive(self.max_zoom) || self.min_zoom > self.max_zoom {
            anyhow::bail!(
                "zoom limits must satisfy 0 < min ({}) <= max ({})",
                self.min_zoom,
                self.max_zoom
            );
        }
        if !self.zoom_step.is_finite() || self.zoom_step <= 1.0 {
            anyhow::bail!("zoom step must be greater than 1");
        }
        if !positive(self.screen_width) || !positive(self.screen_height) {
            anyhow::bail!("screen size must be positive");
        }
        Ok(self)
    }

    pub fn node_size(&self) -> Size {
        Size::new(self.node_width, self.node_height)
    }

    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits {
            min: self.min_zoom,
            max: self.max_zoom,
            step: self.zoom_step,
        }
    }

    pub fn screen_size(&self) -> Size {
        Size::new(self.screen_width, self.screen_height)
    }
}
