use crate::drag::{ColumnDragController, DragEffect};
use crate::layout_or_empty;
use crate::model::{Geometry, Surface};
use cashflow_core::{ExpenseRecord, IncomeRecord, LayoutConfig};
use serde::Serialize;

/// Details shown for the link under the pointer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverReadout {
    pub link_id: String,
    pub source_label: String,
    pub target_label: String,
    pub value: f64,
    /// `value / total_income`, or 0 when there is no income.
    pub share_of_income: f64,
}

/// Interaction state of one diagram: surface size, drag controller and hovered link.
#[derive(Debug, Clone)]
pub struct ViewState {
    config: LayoutConfig,
    surface: Surface,
    drag: ColumnDragController,
    hovered: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl ViewState {
    pub fn new(config: LayoutConfig) -> Self {
        let surface = Surface::new(config.default_surface_width, config.default_surface_height);
        let drag = ColumnDragController::from_config(&config);
        Self {
            config,
            surface,
            drag,
            hovered: None,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn drag(&self) -> &ColumnDragController {
        &self.drag
    }

    /// A newly observed surface width; the height follows from the width.
    pub fn resize(&mut self, width: f64) {
        self.resize_rendered(width, width);
    }

    /// Like [`ViewState::resize`], when the surface is drawn scaled to `rendered_width`.
    pub fn resize_rendered(&mut self, width: f64, rendered_width: f64) {
        if !(width.is_finite() && width > 0.0) {
            tracing::warn!(width, "ignoring invalid surface width");
            return;
        }
        self.surface = Surface::new(width, self.config.surface_height_for(width));
        self.drag.resize(width, rendered_width);
    }

    pub fn pointer_down(&mut self, column: usize, pointer_x: f64) -> DragEffect {
        self.drag.pointer_down(column, pointer_x)
    }

    pub fn pointer_move(&mut self, pointer_x: f64, buttons_pressed: bool) -> DragEffect {
        self.drag.pointer_move(pointer_x, buttons_pressed)
    }

    pub fn pointer_up(&mut self) -> DragEffect {
        self.drag.pointer_up()
    }

    pub fn set_hovered(&mut self, link_id: Option<String>) {
        self.hovered = link_id;
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Geometry for the current surface and drag offsets. Never fails.
    pub fn layout(&self, income: &[IncomeRecord], expenses: &[ExpenseRecord]) -> Geometry {
        layout_or_empty(
            income,
            expenses,
            self.surface,
            self.drag.offsets(),
            &self.config,
        )
    }

    /// Readout for the hovered link, if it is still part of `geometry`.
    pub fn readout(&self, geometry: &Geometry) -> Option<HoverReadout> {
        let link = geometry.link(self.hovered.as_deref()?)?;
        let source = geometry.node(&link.source_id)?;
        let target = geometry.node(&link.target_id)?;
        let share_of_income = if geometry.total_income > 0.0 {
            link.value / geometry.total_income
        } else {
            0.0
        };
        Some(HoverReadout {
            link_id: link.id(),
            source_label: source.label.clone(),
            target_label: target.label.clone(),
            value: link.value,
            share_of_income,
        })
    }
}
