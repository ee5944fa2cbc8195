#![forbid(unsafe_code)]

//! Headless layout for cash-flow Sankey diagrams.
//!
//! [`layout_cash_flow`] turns income and expense records into positioned nodes and links over
//! five fixed columns. [`ColumnDragController`] turns pointer input into the per-column offsets
//! fed back into the layout on every frame, and [`ViewState`] ties both to a resizable surface.

pub mod drag;
mod flow;
pub mod model;
pub mod offsets;
pub mod sankey;
pub mod view;

pub use drag::{ColumnDragController, DragEffect, DragNoopReason, DragState};
pub use flow::{
    DEFICIT_AGGREGATE_ID, DEFICIT_SOURCE_ID, SURPLUS_ID, TOTAL_ID, category_node_id,
    expense_node_id, income_node_id, type_node_id,
};
pub use model::{Geometry, Link, LinkKind, Node, NodeKind, Surface, link_id};
pub use offsets::{ColumnOffsets, OffsetBounds};
pub use view::{HoverReadout, ViewState};

use cashflow_core::{ExpenseRecord, IncomeRecord, LayoutConfig};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid cash-flow input: {0}")]
    Input(#[from] cashflow_core::Error),
    #[error("invalid surface size {width}x{height}")]
    InvalidSurface { width: f64, height: f64 },
    #[error("inconsistent layout: {message}")]
    Inconsistent { message: String },
}

pub type LayoutError = Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Clamps a surface to the configured floor. Non-finite sizes are rejected.
pub fn clamp_surface(surface: Surface, config: &LayoutConfig) -> Result<Surface> {
    if !(surface.width.is_finite() && surface.height.is_finite()) {
        return Err(Error::InvalidSurface {
            width: surface.width,
            height: surface.height,
        });
    }
    Ok(Surface {
        width: surface.width.max(config.min_surface_width),
        height: surface.height.max(config.min_surface_height),
    })
}

/// Lays out one month of records on a surface, with `offsets` applied per column.
///
/// Stateless: every call recomputes the whole geometry. Offsets outside a column's drag bounds
/// are clamped and non-finite offsets count as zero.
pub fn layout_cash_flow(
    income: &[IncomeRecord],
    expenses: &[ExpenseRecord],
    surface: Surface,
    offsets: &ColumnOffsets,
    config: &LayoutConfig,
) -> Result<Geometry> {
    config.validate()?;
    let surface = clamp_surface(surface, config)?;
    let graph = flow::build_flow_graph(income, expenses)?;
    let geometry = sankey::position_flow_graph(&graph, surface, offsets, config);

    if let Some(id) = geometry.dangling_endpoint() {
        return Err(Error::Inconsistent {
            message: format!("link endpoint {id} has no node"),
        });
    }

    tracing::debug!(
        nodes = geometry.nodes.len(),
        links = geometry.links.len(),
        width = geometry.width,
        height = geometry.height,
        surplus = geometry.surplus,
        "cash-flow layout computed"
    );
    Ok(geometry)
}

/// Like [`layout_cash_flow`], but any failure yields an empty, well-formed geometry.
pub fn layout_or_empty(
    income: &[IncomeRecord],
    expenses: &[ExpenseRecord],
    surface: Surface,
    offsets: &ColumnOffsets,
    config: &LayoutConfig,
) -> Geometry {
    match layout_cash_flow(income, expenses, surface, offsets, config) {
        Ok(geometry) => geometry,
        Err(err) => {
            tracing::warn!(error = %err, "cash-flow layout failed, rendering empty diagram");
            empty_geometry(surface, config)
        }
    }
}

/// The fallback geometry for a surface; non-finite sizes fall back to the configured default.
pub fn empty_geometry(surface: Surface, config: &LayoutConfig) -> Geometry {
    let surface = clamp_surface(surface, config).unwrap_or(Surface {
        width: config.default_surface_width,
        height: config.default_surface_height,
    });
    let frame = sankey::ColumnFrame::new(surface.width, config);
    let node_width = if frame.node_width.is_finite() {
        frame.node_width
    } else {
        0.0
    };
    Geometry::empty(surface.width, surface.height, node_width)
}
