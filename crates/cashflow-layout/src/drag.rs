//! Column drag state machine.
//!
//! Drags are elastic: offsets only hold while a pointer button is down, and every way out of
//! a drag puts all columns back at their baseline.

use crate::offsets::{ColumnOffsets, OffsetBounds};
use cashflow_core::{COLUMN_COUNT, LayoutConfig};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        column: usize,
        origin_pointer_x: f64,
        origin_offset: f64,
    },
}

/// Why an input was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragNoopReason {
    IdleWithoutActiveDrag,
    ActiveDragAlreadyInProgress,
    ColumnOutOfRange,
    NonFinitePointer,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEffect {
    Started {
        column: usize,
    },
    Moved {
        column: usize,
        offset: f64,
    },
    /// The drag ended and every offset went back to zero. `stale` marks a move that arrived
    /// with no button pressed, i.e. a release the pointer layer never reported.
    Released {
        stale: bool,
    },
    Noop(DragNoopReason),
}

#[derive(Debug, Clone)]
pub struct ColumnDragController {
    state: DragState,
    offsets: ColumnOffsets,
    surface_width: f64,
    rendered_width: f64,
    max_drag_ratio: f64,
}

impl Default for ColumnDragController {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl ColumnDragController {
    pub fn new(surface_width: f64, max_drag_ratio: f64) -> Self {
        Self {
            state: DragState::Idle,
            offsets: ColumnOffsets::default(),
            surface_width,
            rendered_width: surface_width,
            max_drag_ratio,
        }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.default_surface_width, config.max_drag_ratio)
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn offsets(&self) -> &ColumnOffsets {
        &self.offsets
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn dragged_column(&self) -> Option<usize> {
        match self.state {
            DragState::Dragging { column, .. } => Some(column),
            DragState::Idle => None,
        }
    }

    pub fn surface_width(&self) -> f64 {
        self.surface_width
    }

    pub fn bounds(&self, column: usize) -> OffsetBounds {
        OffsetBounds::for_column(column, self.surface_width, self.max_drag_ratio)
    }

    /// Records a new logical (layout) width and the width it is actually drawn at.
    ///
    /// Non-finite or non-positive widths are ignored. Current offsets are re-clamped to the
    /// bounds of the new width.
    pub fn resize(&mut self, surface_width: f64, rendered_width: f64) {
        if surface_width.is_finite() && surface_width > 0.0 {
            self.surface_width = surface_width;
        } else {
            tracing::warn!(surface_width, "ignoring invalid surface width");
        }
        if rendered_width.is_finite() && rendered_width > 0.0 {
            self.rendered_width = rendered_width;
        }
        self.offsets = self
            .offsets
            .sanitized(self.surface_width, self.max_drag_ratio);
    }

    /// Logical pixels per rendered pixel, so drag distance feels the same at any zoom.
    fn pointer_scale(&self) -> f64 {
        let scale = self.surface_width / self.rendered_width;
        if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        }
    }

    pub fn pointer_down(&mut self, column: usize, pointer_x: f64) -> DragEffect {
        if self.is_dragging() {
            return DragEffect::Noop(DragNoopReason::ActiveDragAlreadyInProgress);
        }
        if column >= COLUMN_COUNT {
            return DragEffect::Noop(DragNoopReason::ColumnOutOfRange);
        }
        if !pointer_x.is_finite() {
            return DragEffect::Noop(DragNoopReason::NonFinitePointer);
        }
        self.state = DragState::Dragging {
            column,
            origin_pointer_x: pointer_x,
            origin_offset: self.offsets.get(column),
        };
        tracing::debug!(column, pointer_x, "column drag started");
        DragEffect::Started { column }
    }

    pub fn pointer_move(&mut self, pointer_x: f64, buttons_pressed: bool) -> DragEffect {
        let DragState::Dragging {
            column,
            origin_pointer_x,
            origin_offset,
        } = self.state
        else {
            return DragEffect::Noop(DragNoopReason::IdleWithoutActiveDrag);
        };

        if !buttons_pressed {
            self.release();
            tracing::debug!(column, "stale column drag released");
            return DragEffect::Released { stale: true };
        }

        let raw = origin_offset + (pointer_x - origin_pointer_x) * self.pointer_scale();
        if !raw.is_finite() {
            tracing::warn!(column, pointer_x, "ignoring non-finite drag delta");
            return DragEffect::Noop(DragNoopReason::NonFinitePointer);
        }

        let offset = self.bounds(column).clamp(raw);
        self.offsets.set(column, offset);
        DragEffect::Moved { column, offset }
    }

    pub fn pointer_up(&mut self) -> DragEffect {
        let was_dragging = self.is_dragging();
        self.release();
        if was_dragging {
            tracing::debug!("column drag released");
            DragEffect::Released { stale: false }
        } else {
            DragEffect::Noop(DragNoopReason::IdleWithoutActiveDrag)
        }
    }

    fn release(&mut self) {
        self.state = DragState::Idle;
        self.offsets.reset();
    }
}
