use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Source,
    Aggregate,
    Total,
    Category,
    Leaf,
    Surplus,
    Deficit,
}

/// What a link carries, so renderers can style flows without inspecting ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Income,
    Expense,
    Surplus,
    Deficit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Surface {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub label: String,
    pub value: f64,
    pub column: usize,
    /// Top-left corner.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub kind: NodeKind,
}

impl Node {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub source_id: String,
    pub target_id: String,
    pub value: f64,
    /// Band thickness in pixels, on the same scale as node heights.
    pub thickness: f64,
    pub kind: LinkKind,
    pub source_anchor_x: f64,
    pub source_anchor_y: f64,
    pub target_anchor_x: f64,
    pub target_anchor_y: f64,
}

impl Link {
    /// Stable identifier used for hover reporting: `"<source>-><target>"`.
    pub fn id(&self) -> String {
        link_id(&self.source_id, &self.target_id)
    }
}

pub fn link_id(source_id: &str, target_id: &str) -> String {
    format!("{source_id}->{target_id}")
}

/// The positioned node/link graph handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    pub width: f64,
    pub height: f64,
    pub node_width: f64,
    pub node_gap: f64,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub total_income: f64,
    pub total_expense: f64,
    pub surplus: f64,
}

impl Geometry {
    /// A well-formed geometry with no nodes, no links and zero totals.
    pub fn empty(width: f64, height: f64, node_width: f64) -> Self {
        Self {
            width,
            height,
            node_width,
            node_gap: 0.0,
            nodes: Vec::new(),
            links: Vec::new(),
            total_income: 0.0,
            total_expense: 0.0,
            surplus: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn link(&self, id: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.id() == id)
    }

    pub fn nodes_in_column(&self, column: usize) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.column == column)
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    pub fn incoming<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Link> + 'a {
        self.links.iter().filter(move |l| l.target_id == node_id)
    }

    pub fn outgoing<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Link> + 'a {
        self.links.iter().filter(move |l| l.source_id == node_id)
    }

    /// Returns the first link endpoint that does not name a node of this geometry.
    pub fn dangling_endpoint(&self) -> Option<&str> {
        let index: FxHashMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();
        self.links
            .iter()
            .flat_map(|l| [l.source_id.as_str(), l.target_id.as_str()])
            .find(|id| !index.contains_key(id))
    }
}
