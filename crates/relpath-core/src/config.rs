//! Configuration for path rendering, alignment checks, anchors and batch runs.
//!
//! Load order: `.relpath/config.toml` → environment variables → defaults.

use crate::align::AlignmentMap;
use crate::anchor::AnchorMode;
use crate::error::{AlignmentDefect, PathError};
use crate::node_id::NodeIds;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level relpath configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelpathConfig {
    pub render: RenderConfig,
    pub align: AlignConfig,
    pub anchor: AnchorConfig,
    pub batch: BatchConfig,
}

/// How paths are turned into strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Prefix for steps from a child to its parent.
    pub up_glyph: String,
    /// Prefix for steps from a parent to its child.
    pub down_glyph: String,
    /// Insert the label entering the peak node in multi-variant renderings.
    pub mark_peak: bool,
    /// Stand-in label for a peak without incoming edges.
    pub root_label: String,
    /// Joins entity → trigger and trigger → entity segments.
    pub segment_separator: String,
}

/// Which alignment defects reject a sentence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    pub require_total: bool,
    pub require_surjective: bool,
}

/// How entity spans map onto graph nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    pub mode: AnchorMode,
    pub node_ids: NodeIds,
}

/// Batch runner settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker threads; 0 lets rayon pick one per core.
    pub threads: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            up_glyph: "<".to_string(),
            down_glyph: ">".to_string(),
            mark_peak: true,
            root_label: "0".to_string(),
            segment_separator: " >< ".to_string(),
        }
    }
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            require_total: true,
            require_surjective: true,
        }
    }
}

impl AlignConfig {
    /// Check `map` against the enabled requirements, totality first.
    pub fn check(&self, map: &AlignmentMap) -> Result<(), PathError> {
        if self.require_total && !map.is_total() {
            return Err(AlignmentDefect::NotTotal {
                missing: map.missing(),
            }
            .into());
        }
        if self.require_surjective && !map.is_surjective() {
            return Err(AlignmentDefect::NotSurjective {
                uncovered: map.uncovered(),
            }
            .into());
        }
        Ok(())
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl RelpathConfig {
    /// Load config from `.relpath/config.toml` in the project root, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".relpath").join("config.toml");

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read {}", config_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("failed to parse {}", config_path.display()))?
        } else {
            Self::default()
        };

        env_override("RELPATH_UP_GLYPH", &mut config.render.up_glyph);
        env_override("RELPATH_DOWN_GLYPH", &mut config.render.down_glyph);
        env_override("RELPATH_MARK_PEAK", &mut config.render.mark_peak);
        env_override("RELPATH_ROOT_LABEL", &mut config.render.root_label);
        env_override(
            "RELPATH_SEGMENT_SEPARATOR",
            &mut config.render.segment_separator,
        );
        env_override("RELPATH_REQUIRE_TOTAL", &mut config.align.require_total);
        env_override(
            "RELPATH_REQUIRE_SURJECTIVE",
            &mut config.align.require_surjective,
        );
        env_override("RELPATH_ANCHOR", &mut config.anchor.mode);
        env_override("RELPATH_NODE_IDS", &mut config.anchor.node_ids);
        env_override("RELPATH_THREADS", &mut config.batch.threads);

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make renderings ambiguous.
    pub fn validate(&self) -> Result<()> {
        if self.render.up_glyph == self.render.down_glyph {
            anyhow::bail!(
                "up_glyph and down_glyph must differ (both are {:?})",
                self.render.up_glyph
            );
        }
        Ok(())
    }
}
