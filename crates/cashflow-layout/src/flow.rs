//! Aggregates raw records into the five-column flow graph, before any geometry.

use crate::model::{LinkKind, NodeKind};
use crate::offsets::{CATEGORY_COLUMN, LEAF_COLUMN, SOURCE_COLUMN, TOTAL_COLUMN, TYPE_COLUMN};
use crate::{Error, Result};
use cashflow_core::{
    ExpenseCategory, ExpenseRecord, IncomeKind, IncomeRecord, Totals, validate_records,
};
use indexmap::IndexMap;
use indexmap::map::Entry;

pub const TOTAL_ID: &str = "total";
pub const SURPLUS_ID: &str = "surplus";
pub const DEFICIT_SOURCE_ID: &str = "deficit:source";
pub const DEFICIT_AGGREGATE_ID: &str = "deficit:aggregate";

pub fn income_node_id(record_id: &str) -> String {
    format!("income:{record_id}")
}

pub fn expense_node_id(record_id: &str) -> String {
    format!("expense:{record_id}")
}

pub fn type_node_id(kind: IncomeKind) -> String {
    format!("type:{}", kind.as_str())
}

pub fn category_node_id(category: ExpenseCategory) -> String {
    format!("category:{}", category.as_str())
}

#[derive(Debug, Clone)]
pub(crate) struct FlowNode {
    pub(crate) label: String,
    pub(crate) kind: NodeKind,
    pub(crate) column: usize,
    pub(crate) value: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct FlowLink {
    pub(crate) source: usize,
    pub(crate) target: usize,
    pub(crate) value: f64,
    pub(crate) kind: LinkKind,
}

/// Nodes keyed by id in stacking order, plus links by node index.
#[derive(Debug, Clone, Default)]
pub(crate) struct FlowGraph {
    pub(crate) nodes: IndexMap<String, FlowNode>,
    pub(crate) links: Vec<FlowLink>,
    pub(crate) totals: Totals,
}

impl FlowGraph {
    fn add_node(
        &mut self,
        id: String,
        label: &str,
        kind: NodeKind,
        column: usize,
        value: f64,
    ) -> Result<usize> {
        match self.nodes.entry(id) {
            Entry::Occupied(e) => Err(Error::Inconsistent {
                message: format!("node id {} produced twice", e.key()),
            }),
            Entry::Vacant(e) => {
                let index = e.index();
                e.insert(FlowNode {
                    label: label.to_string(),
                    kind,
                    column,
                    value,
                });
                Ok(index)
            }
        }
    }

    fn add_link(&mut self, source: usize, target: usize, value: f64, kind: LinkKind) {
        self.links.push(FlowLink {
            source,
            target,
            value,
            kind,
        });
    }
}

/// Builds the balanced flow graph for one month of records.
///
/// Sources and leaves are grouped under their aggregate (fixed type/category order) and keep
/// first-seen order inside each group, so links between adjacent columns never cross.
pub(crate) fn build_flow_graph(
    income: &[IncomeRecord],
    expenses: &[ExpenseRecord],
) -> Result<FlowGraph> {
    validate_records(income, expenses)?;

    let mut graph = FlowGraph {
        totals: Totals::compute(income, expenses),
        ..Default::default()
    };
    if income.is_empty() && expenses.is_empty() {
        return Ok(graph);
    }
    let totals = graph.totals;
    let deficit = totals.deficit();

    // Columns 0 and 1: income sources feeding their type aggregate.
    let mut type_nodes: Vec<(usize, f64)> = Vec::new();
    for kind in IncomeKind::ALL {
        let records: Vec<&IncomeRecord> = income.iter().filter(|r| r.kind == kind).collect();
        if records.is_empty() {
            continue;
        }
        let mut sources = Vec::with_capacity(records.len());
        for r in &records {
            let idx = graph.add_node(
                income_node_id(&r.id),
                &r.label,
                NodeKind::Source,
                SOURCE_COLUMN,
                r.value,
            )?;
            sources.push((idx, r.value));
        }
        let sum: f64 = records.iter().map(|r| r.value).sum();
        let agg = graph.add_node(
            type_node_id(kind),
            kind.label(),
            NodeKind::Aggregate,
            TYPE_COLUMN,
            sum,
        )?;
        for (src, value) in sources {
            graph.add_link(src, agg, value, LinkKind::Income);
        }
        type_nodes.push((agg, sum));
    }

    let deficit_agg = if deficit > 0.0 {
        let src = graph.add_node(
            DEFICIT_SOURCE_ID.to_string(),
            "Deficit",
            NodeKind::Deficit,
            SOURCE_COLUMN,
            deficit,
        )?;
        let agg = graph.add_node(
            DEFICIT_AGGREGATE_ID.to_string(),
            "Deficit",
            NodeKind::Deficit,
            TYPE_COLUMN,
            deficit,
        )?;
        graph.add_link(src, agg, deficit, LinkKind::Deficit);
        Some(agg)
    } else {
        None
    };

    // Column 2: everything merges into the total, which balances in and out.
    let total = graph.add_node(
        TOTAL_ID.to_string(),
        "Total",
        NodeKind::Total,
        TOTAL_COLUMN,
        totals.total_income + deficit,
    )?;
    for (agg, sum) in type_nodes {
        graph.add_link(agg, total, sum, LinkKind::Income);
    }
    if let Some(agg) = deficit_agg {
        graph.add_link(agg, total, deficit, LinkKind::Deficit);
    }

    // Columns 3 and 4: categories fanning out to their expense leaves.
    for category in ExpenseCategory::ALL {
        let records: Vec<&ExpenseRecord> = expenses
            .iter()
            .filter(|r| r.category == category)
            .collect();
        if records.is_empty() {
            continue;
        }
        let sum: f64 = records.iter().map(|r| r.value).sum();
        let cat = graph.add_node(
            category_node_id(category),
            category.label(),
            NodeKind::Category,
            CATEGORY_COLUMN,
            sum,
        )?;
        graph.add_link(total, cat, sum, LinkKind::Expense);
        for r in records {
            let leaf = graph.add_node(
                expense_node_id(&r.id),
                &r.label,
                NodeKind::Leaf,
                LEAF_COLUMN,
                r.value,
            )?;
            graph.add_link(cat, leaf, r.value, LinkKind::Expense);
        }
    }

    // Zero surplus still gets a (zero-height) leaf; only a deficit replaces it.
    if totals.surplus >= 0.0 {
        let surplus = graph.add_node(
            SURPLUS_ID.to_string(),
            "Surplus",
            NodeKind::Surplus,
            LEAF_COLUMN,
            totals.surplus,
        )?;
        graph.add_link(total, surplus, totals.surplus, LinkKind::Surplus);
    }

    Ok(graph)
}
