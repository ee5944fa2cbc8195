use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of fixed columns in the diagram.
pub const COLUMN_COUNT: usize = 5;

/// Tunable geometry constants for the layout engine and the drag controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Node width as a fraction of the spacing between adjacent column origins.
    pub node_width_ratio: f64,
    /// Horizontal padding on each side, as a fraction of the surface width.
    pub padding_ratio: f64,
    /// Minimum vertical gap between stacked nodes, in pixels.
    pub node_gap: f64,
    /// Maximum drag displacement, as a fraction of the surface width.
    pub max_drag_ratio: f64,
    pub min_surface_width: f64,
    pub min_surface_height: f64,
    pub default_surface_width: f64,
    pub default_surface_height: f64,
    /// Height derived on resize: `max(min_viewport_height, width * viewport_height_ratio)`.
    pub viewport_height_ratio: f64,
    pub min_viewport_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width_ratio: 0.08,
            padding_ratio: 0.02,
            node_gap: 10.0,
            max_drag_ratio: 0.10,
            min_surface_width: 200.0,
            min_surface_height: 120.0,
            default_surface_width: 700.0,
            default_surface_height: 420.0,
            viewport_height_ratio: 0.55,
            min_viewport_height: 300.0,
        }
    }
}

impl LayoutConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Applies a partial JSON object on top of this config.
    ///
    /// Keys not present in `overrides` keep their current values.
    pub fn with_overrides(&self, overrides: &Value) -> Result<Self> {
        let mut base = serde_json::to_value(self)?;
        deep_merge_value(&mut base, overrides);
        let cfg: Self = serde_json::from_value(base)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Surface height to use for a freshly observed surface width.
    pub fn surface_height_for(&self, width: f64) -> f64 {
        self.min_viewport_height.max(width * self.viewport_height_ratio)
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("nodeWidthRatio", self.node_width_ratio),
            ("paddingRatio", self.padding_ratio),
            ("nodeGap", self.node_gap),
            ("maxDragRatio", self.max_drag_ratio),
            ("minSurfaceWidth", self.min_surface_width),
            ("minSurfaceHeight", self.min_surface_height),
            ("defaultSurfaceWidth", self.default_surface_width),
            ("defaultSurfaceHeight", self.default_surface_height),
            ("viewportHeightRatio", self.viewport_height_ratio),
            ("minViewportHeight", self.min_viewport_height),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }

        if !(self.node_width_ratio > 0.0 && self.node_width_ratio < 1.0) {
            return Err(invalid("nodeWidthRatio must be in (0, 1)".to_string()));
        }
        if self.padding_ratio >= 0.25 {
            return Err(invalid("paddingRatio must be below 0.25".to_string()));
        }
        if self.min_surface_width <= 0.0 || self.min_surface_height <= 0.0 {
            return Err(invalid("minimum surface size must be positive".to_string()));
        }

        // Two neighbouring columns dragged towards each other must still leave a gap.
        let free = self.column_spacing_ratio() * (1.0 - self.node_width_ratio);
        if 2.0 * self.max_drag_ratio >= free {
            return Err(invalid(format!(
                "maxDragRatio {} lets adjacent columns overlap (limit {:.4})",
                self.max_drag_ratio,
                free / 2.0
            )));
        }
        Ok(())
    }

    /// Spacing between adjacent column origins, as a fraction of the surface width.
    pub fn column_spacing_ratio(&self) -> f64 {
        let usable = 1.0 - 2.0 * self.padding_ratio;
        usable / ((COLUMN_COUNT - 1) as f64 + self.node_width_ratio)
    }
}

fn invalid(message: String) -> Error {
    Error::InvalidConfig { message }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}
