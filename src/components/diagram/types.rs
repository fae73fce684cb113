//! Dataset and graph data structures shared by the builder, layouts and renderer.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single spreadsheet cell. Columns hold either text or numbers.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
	Text(String),
	Number(f64),
}

impl FieldValue {
	/// Whether the cell counts as filled in: non-empty text or a non-zero number.
	pub fn is_truthy(&self) -> bool {
		match self {
			FieldValue::Text(s) => !s.is_empty(),
			FieldValue::Number(n) => *n != 0.0 && !n.is_nan(),
		}
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			FieldValue::Text(s) => Some(s),
			FieldValue::Number(_) => None,
		}
	}
}

impl fmt::Display for FieldValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FieldValue::Text(s) => f.write_str(s),
			// Sheets hand us integral ids as floats; print them the way the sheet shows them.
			FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
			FieldValue::Number(n) => write!(f, "{n}"),
		}
	}
}

impl From<&str> for FieldValue {
	fn from(s: &str) -> Self {
		FieldValue::Text(s.to_string())
	}
}

/// One spreadsheet row keyed by its literal column header (stray spaces included).
pub type RawRecord = IndexMap<String, FieldValue>;

/// Look up a filled-in field. Empty and zero cells read as absent.
pub fn field<'a>(record: &'a RawRecord, key: &str) -> Option<&'a FieldValue> {
	record.get(key).filter(|v| v.is_truthy())
}

/// A named sheet of rows as served by the spreadsheet API.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Sheet {
	#[serde(rename = "sheetName", default)]
	pub sheet_name: Option<String>,
	#[serde(default)]
	pub children: Vec<RawRecord>,
}

/// The full API response: `{ data: [sheet, ...] }`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Payload {
	pub data: Vec<Sheet>,
}

impl Payload {
	/// All rows of all sheets, in sheet order.
	pub fn records(&self) -> impl Iterator<Item = &RawRecord> {
		self.data.iter().flat_map(|sheet| sheet.children.iter())
	}

	pub fn sheet(&self, name: &str) -> Option<&Sheet> {
		self.data
			.iter()
			.find(|sheet| sheet.sheet_name.as_deref() == Some(name))
	}
}

/// Semantic category of a node. Drives column/ring assignment and colouring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
	Ingredient,
	Modifier,
	Fabrication,
	Output,
	OutputType,
	BioBased,
}

impl NodeType {
	pub fn as_str(self) -> &'static str {
		match self {
			NodeType::Ingredient => "ingredient",
			NodeType::Modifier => "modifier",
			NodeType::Fabrication => "fabrication",
			NodeType::Output => "output",
			NodeType::OutputType => "outputType",
			NodeType::BioBased => "bioBased",
		}
	}
}

/// Composite lookup key. Names repeat across categories, so `id` alone is ambiguous.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey {
	pub kind: NodeType,
	pub id: String,
}

impl NodeKey {
	pub fn new(kind: NodeType, id: impl Into<String>) -> Self {
		Self {
			kind,
			id: id.into(),
		}
	}
}

/// A drawable vertex.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Node {
	/// Display name; unique within a category, not across categories.
	pub id: String,
	#[serde(rename = "type")]
	pub kind: NodeType,
	#[serde(default)]
	pub x: Option<f64>,
	#[serde(default)]
	pub y: Option<f64>,
	/// Originating spreadsheet row, when the node came from one.
	#[serde(default, skip_serializing)]
	pub data: Option<RawRecord>,
}

impl Node {
	pub fn new(id: impl Into<String>, kind: NodeType) -> Self {
		Self {
			id: id.into(),
			kind,
			x: None,
			y: None,
			data: None,
		}
	}

	pub fn with_data(mut self, data: Option<RawRecord>) -> Self {
		self.data = data;
		self
	}

	pub fn key(&self) -> NodeKey {
		NodeKey::new(self.kind, self.id.clone())
	}

	/// Current position, with unplaced coordinates read as zero.
	pub fn position(&self) -> (f64, f64) {
		(self.x.unwrap_or(0.0), self.y.unwrap_or(0.0))
	}
}

/// One end of a link: a name until the resolution pass, then an index into `Graph::nodes`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "String")]
pub enum Endpoint {
	Unresolved {
		id: String,
		kind: Option<NodeType>,
	},
	Resolved(usize),
}

impl Endpoint {
	pub fn typed(key: NodeKey) -> Self {
		Endpoint::Unresolved {
			id: key.id,
			kind: Some(key.kind),
		}
	}

	pub fn index(&self) -> Option<usize> {
		match self {
			Endpoint::Resolved(idx) => Some(*idx),
			Endpoint::Unresolved { .. } => None,
		}
	}
}

impl From<String> for Endpoint {
	fn from(id: String) -> Self {
		Endpoint::Unresolved { id, kind: None }
	}
}

impl From<&str> for Endpoint {
	fn from(id: &str) -> Self {
		Endpoint::from(id.to_string())
	}
}

/// A directed edge. `group` names the output whose chain the link belongs to.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Link {
	pub source: Endpoint,
	pub target: Endpoint,
	#[serde(rename = "type", default)]
	pub group: Option<String>,
}

impl Link {
	pub fn between(source: NodeKey, target: NodeKey, group: &str) -> Self {
		Self {
			source: Endpoint::typed(source),
			target: Endpoint::typed(target),
			group: Some(group.to_string()),
		}
	}

	pub fn is_resolved(&self) -> bool {
		self.source.index().is_some() && self.target.index().is_some()
	}
}

/// Pre-shaped `{ nodes, links }` input for the supply/demand network.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NetworkData {
	pub nodes: Vec<Node>,
	#[serde(default)]
	pub links: Vec<Link>,
}

/// Nodes and links for one render. Rebuilt from scratch every time.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	pub nodes: Vec<Node>,
	pub links: Vec<Link>,
}

impl Graph {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn node(&self, endpoint: &Endpoint) -> Option<&Node> {
		endpoint.index().and_then(|idx| self.nodes.get(idx))
	}

	/// Position of a link endpoint; dangling endpoints sit at the origin.
	pub fn endpoint_position(&self, endpoint: &Endpoint) -> (f64, f64) {
		self.node(endpoint).map(Node::position).unwrap_or((0.0, 0.0))
	}

	/// Indices of nodes of `kind`, in insertion order.
	pub fn indices_of(&self, kind: NodeType) -> Vec<usize> {
		self.nodes
			.iter()
			.enumerate()
			.filter(|(_, node)| node.kind == kind)
			.map(|(idx, _)| idx)
			.collect()
	}
}

/// Name of a category-tree leaf: a plain cell value or an output's composite entry.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LeafName {
	Output(OutputEntry),
	Value(FieldValue),
}

/// Everything needed to chain one output back to its ingredients.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct OutputEntry {
	#[serde(rename = "outputName")]
	pub output_name: FieldValue,
	#[serde(default)]
	pub ingredients: Vec<FieldValue>,
	#[serde(default)]
	pub modifiers: Vec<FieldValue>,
	#[serde(rename = "outputType", default)]
	pub output_type: Option<FieldValue>,
	#[serde(rename = "bioBased", default)]
	pub bio_based: Option<FieldValue>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TreeLeaf {
	pub name: LeafName,
	#[serde(skip)]
	pub record: Option<RawRecord>,
}

impl TreeLeaf {
	pub fn value(value: FieldValue, record: Option<RawRecord>) -> Self {
		Self {
			name: LeafName::Value(value),
			record,
		}
	}

	/// Display name used for node ids and deduplication.
	pub fn display_name(&self) -> String {
		match &self.name {
			LeafName::Output(entry) => entry.output_name.to_string(),
			LeafName::Value(value) => value.to_string(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TreeGroup {
	pub name: String,
	#[serde(default)]
	pub children: Vec<TreeLeaf>,
}

/// Pre-shaped hierarchy consumed by the tree builder: `{ name, children: [group, ...] }`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CategoryTree {
	pub name: FieldValue,
	#[serde(default)]
	pub children: Vec<TreeGroup>,
}

impl CategoryTree {
	pub fn group(&self, name: &str) -> Option<&TreeGroup> {
		self.children.iter().find(|group| group.name == name)
	}
}
