//! Engine configuration loaded from JSON.
//!
//! Every key is optional; a missing key keeps its default.
//!
//! ```json
//! {
//!   "frame_rate": 30.0,
//!   "vertex_resolution": 128,
//!   "defaults": { "mapper": { "strategy": "greedy" }, "color_space": "lab" }
//! }
//! ```

use anyhow::{ensure, Context, Result};
use morphline_core::{ElementBuilder, Element, MorphDefaults};
use morphline_data::{ShapeState, DEFAULT_NUM_VERTICES};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub defaults: MorphDefaults,
    /// Frames per unit of sequence time when sampling.
    pub frame_rate: f64,
    /// Vertex count given to records that do not set their own.
    pub vertex_resolution: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            defaults: MorphDefaults::default(),
            frame_rate: 30.0,
            vertex_resolution: DEFAULT_NUM_VERTICES,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).context("Failed to parse engine config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_json_str(&json)
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        info!(path = %path.display(), mapper = ?config.defaults.mapper, "Loaded engine config");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.frame_rate > 0.0,
            "frame_rate must be positive, got {}",
            self.frame_rate
        );
        ensure!(
            self.vertex_resolution >= 3,
            "vertex_resolution must be at least 3, got {}",
            self.vertex_resolution
        );
        ensure!(
            (0.0..=1.0).contains(&self.defaults.step_threshold),
            "step_threshold must lie in [0, 1], got {}",
            self.defaults.step_threshold
        );
        Ok(())
    }

    /// Element builder sharing these defaults.
    pub fn element(&self) -> ElementBuilder {
        Element::builder().defaults(Arc::new(self.defaults.clone()))
    }

    /// Applies the configured vertex resolution to `state` and everything
    /// nested in it that still uses the built-in default.
    pub fn with_resolution(&self, mut state: ShapeState) -> ShapeState {
        if state.num_vertices == DEFAULT_NUM_VERTICES {
            state.num_vertices = self.vertex_resolution;
        }
        state.clip = state.clip.map(|clip| Box::new(self.with_resolution(*clip)));
        state.mask = state.mask.map(|mask| Box::new(self.with_resolution(*mask)));
        state.clips = state
            .clips
            .into_iter()
            .map(|clip| self.with_resolution(clip))
            .collect();
        state.masks = state
            .masks
            .into_iter()
            .map(|mask| self.with_resolution(mask))
            .collect();
        state
    }

    /// Number of frames covering `duration` units of time, both ends
    /// included.
    pub fn frame_count(&self, duration: f64) -> usize {
        (duration * self.frame_rate).round().max(0.0) as usize + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphline_core::MapperStrategy;
    use morphline_data::ShapeKind;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(EngineConfig::from_json_str("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_nested_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{"vertex_resolution": 64, "defaults": {"mapper": {"strategy": "simple"}}}"#,
        )
        .unwrap();
        assert_eq!(config.vertex_resolution, 64);
        assert_eq!(config.defaults.mapper, MapperStrategy::Simple);
        assert_eq!(config.frame_rate, 30.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(EngineConfig::from_json_str(r#"{"frame_rate": 0}"#).is_err());
        assert!(EngineConfig::from_json_str(r#"{"vertex_resolution": 2}"#).is_err());
        assert!(EngineConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_resolution_reaches_clips() {
        let config = EngineConfig {
            vertex_resolution: 48,
            ..EngineConfig::default()
        };
        let clip = ShapeState::new(ShapeKind::Circle { radius: 1.0 });
        let state = ShapeState::new(ShapeKind::Circle { radius: 2.0 })
            .with_clip(Some(clip))
            .with_num_vertices(DEFAULT_NUM_VERTICES);
        let state = config.with_resolution(state);
        assert_eq!(state.num_vertices, 48);
        assert_eq!(state.clip.unwrap().num_vertices, 48);

        let custom = ShapeState::new(ShapeKind::Line { length: 1.0 }).with_num_vertices(16);
        assert_eq!(config.with_resolution(custom).num_vertices, 16);
    }

    #[test]
    fn test_frame_count() {
        let config = EngineConfig::default();
        assert_eq!(config.frame_count(1.0), 31);
        assert_eq!(config.frame_count(0.0), 1);
    }
}
