//! Per-column horizontal displacement and its legal bounds.

use cashflow_core::COLUMN_COUNT;
use serde::{Deserialize, Serialize};

pub const SOURCE_COLUMN: usize = 0;
pub const TYPE_COLUMN: usize = 1;
pub const TOTAL_COLUMN: usize = 2;
pub const CATEGORY_COLUMN: usize = 3;
pub const LEAF_COLUMN: usize = COLUMN_COUNT - 1;

/// Pixel displacement applied to every node of a column, leftmost column first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnOffsets([f64; COLUMN_COUNT]);

impl ColumnOffsets {
    pub fn new(values: [f64; COLUMN_COUNT]) -> Self {
        Self(values)
    }

    pub fn get(&self, column: usize) -> f64 {
        self.0.get(column).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, column: usize, value: f64) {
        if let Some(slot) = self.0.get_mut(column) {
            *slot = value;
        }
    }

    pub fn reset(&mut self) {
        self.0 = [0.0; COLUMN_COUNT];
    }

    pub fn is_neutral(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }

    pub fn as_array(&self) -> &[f64; COLUMN_COUNT] {
        &self.0
    }

    /// Replaces non-finite entries with zero and clamps every entry to its column's bounds.
    pub fn sanitized(&self, surface_width: f64, max_drag_ratio: f64) -> Self {
        let mut out = *self;
        for (column, slot) in out.0.iter_mut().enumerate() {
            let bounds = OffsetBounds::for_column(column, surface_width, max_drag_ratio);
            *slot = if slot.is_finite() {
                bounds.clamp(*slot)
            } else {
                0.0
            };
        }
        out
    }
}

impl From<[f64; COLUMN_COUNT]> for ColumnOffsets {
    fn from(values: [f64; COLUMN_COUNT]) -> Self {
        Self(values)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetBounds {
    pub min: f64,
    pub max: f64,
}

impl OffsetBounds {
    /// The leftmost column only moves right, the rightmost only left, interior columns both ways.
    pub fn for_column(column: usize, surface_width: f64, max_drag_ratio: f64) -> Self {
        let limit = if surface_width.is_finite() && max_drag_ratio.is_finite() {
            (surface_width * max_drag_ratio).max(0.0)
        } else {
            0.0
        };
        let min = if column == SOURCE_COLUMN { 0.0 } else { -limit };
        let max = if column >= LEAF_COLUMN { 0.0 } else { limit };
        Self { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}
