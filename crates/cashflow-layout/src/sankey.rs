use crate::flow::FlowGraph;
use crate::model::{Geometry, Link, Node, Surface};
use crate::offsets::ColumnOffsets;
use cashflow_core::{COLUMN_COUNT, LayoutConfig};
use std::cmp::Ordering;

/// Horizontal frame shared by every column: padding, origin spacing and node width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnFrame {
    pub padding: f64,
    pub spacing: f64,
    pub node_width: f64,
}

impl ColumnFrame {
    pub fn new(surface_width: f64, config: &LayoutConfig) -> Self {
        let spacing = surface_width * config.column_spacing_ratio();
        Self {
            padding: surface_width * config.padding_ratio,
            spacing,
            node_width: spacing * config.node_width_ratio,
        }
    }

    /// Left edge of a column's nodes with no drag applied.
    pub fn base_x(&self, column: usize) -> f64 {
        self.padding + column as f64 * self.spacing
    }
}

fn f64_cmp(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Positions an already balanced flow graph.
///
/// One pass: a single vertical scale shared by all columns (so a link has the same thickness
/// at both ends), every column centred on its own, then link bands stacked along node edges.
pub(crate) fn position_flow_graph(
    graph: &FlowGraph,
    surface: Surface,
    offsets: &ColumnOffsets,
    config: &LayoutConfig,
) -> Geometry {
    let width = surface.width;
    let height = surface.height;
    let frame = ColumnFrame::new(width, config);
    let offsets = offsets.sanitized(width, config.max_drag_ratio);

    let mut columns: Vec<Vec<usize>> = vec![Vec::new(); COLUMN_COUNT];
    for (i, node) in graph.nodes.values().enumerate() {
        columns[node.column.min(COLUMN_COUNT - 1)].push(i);
    }

    let max_len = columns.iter().map(|c| c.len()).max().unwrap_or(0);
    // Gaps never take more than half of the drawable height.
    let py = if max_len <= 1 {
        config.node_gap
    } else {
        config.node_gap.min(height * 0.5 / (max_len as f64 - 1.0))
    };

    let mut ky = f64::INFINITY;
    for col in &columns {
        if col.is_empty() {
            continue;
        }
        let sum_values: f64 = col.iter().map(|&ni| graph.nodes[ni].value).sum();
        if sum_values <= 0.0 {
            continue;
        }
        let denom = height - (col.len() as f64 - 1.0) * py;
        ky = ky.min(denom / sum_values);
    }
    if !ky.is_finite() {
        ky = 0.0;
    }

    let mut nodes: Vec<Node> = graph
        .nodes
        .iter()
        .map(|(id, n)| Node {
            id: id.clone(),
            label: n.label.clone(),
            value: n.value,
            column: n.column,
            x: frame.base_x(n.column) + offsets.get(n.column),
            y: 0.0,
            width: frame.node_width,
            height: n.value * ky,
            kind: n.kind,
        })
        .collect();

    for col in &columns {
        if col.is_empty() {
            continue;
        }
        let content: f64 = col.iter().map(|&ni| nodes[ni].height).sum::<f64>()
            + (col.len() as f64 - 1.0) * py;
        let mut y = ((height - content) / 2.0).max(0.0);
        for &ni in col {
            nodes[ni].y = y;
            y += nodes[ni].height + py;
        }
    }

    let mut source_links: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut target_links: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (li, l) in graph.links.iter().enumerate() {
        source_links[l.source].push(li);
        target_links[l.target].push(li);
    }
    for list in &mut source_links {
        list.sort_by(|&a, &b| {
            let ta = nodes[graph.links[a].target].y;
            let tb = nodes[graph.links[b].target].y;
            f64_cmp(ta, tb).then_with(|| a.cmp(&b))
        });
    }
    for list in &mut target_links {
        list.sort_by(|&a, &b| {
            let sa = nodes[graph.links[a].source].y;
            let sb = nodes[graph.links[b].source].y;
            f64_cmp(sa, sb).then_with(|| a.cmp(&b))
        });
    }

    let mut source_y = vec![0.0; graph.links.len()];
    let mut target_y = vec![0.0; graph.links.len()];
    for (ni, node) in nodes.iter().enumerate() {
        let mut y0 = node.y;
        for &li in &source_links[ni] {
            let w = graph.links[li].value * ky;
            source_y[li] = y0 + w / 2.0;
            y0 += w;
        }
        let mut y1 = node.y;
        for &li in &target_links[ni] {
            let w = graph.links[li].value * ky;
            target_y[li] = y1 + w / 2.0;
            y1 += w;
        }
    }

    let links: Vec<Link> = graph
        .links
        .iter()
        .enumerate()
        .map(|(li, l)| {
            let source = &nodes[l.source];
            let target = &nodes[l.target];
            Link {
                source_id: source.id.clone(),
                target_id: target.id.clone(),
                value: l.value,
                thickness: l.value * ky,
                kind: l.kind,
                source_anchor_x: source.right(),
                source_anchor_y: source_y[li],
                target_anchor_x: target.x,
                target_anchor_y: target_y[li],
            }
        })
        .collect();

    Geometry {
        width,
        height,
        node_width: frame.node_width,
        node_gap: py,
        nodes,
        links,
        total_income: graph.totals.total_income,
        total_expense: graph.totals.total_expense,
        surplus: graph.totals.surplus,
    }
}
