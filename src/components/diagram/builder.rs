//! Category trees and flat networks to typed nodes and links.
//!
//! Links are emitted with name endpoints and resolved to node indices in a
//! separate pass before any layout runs. The tree shape resolves by
//! `(type, id)` because the same name can be both an ingredient and an
//! output; the network shape resolves by `id` alone, first match wins.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use super::types::{
	CategoryTree, Endpoint, Graph, LeafName, Link, NetworkData, Node, NodeKey, NodeType, TreeGroup,
	TreeLeaf,
};

const INGREDIENTS: &str = "Ingredients";
const OUTPUTS: &str = "Outputs";
const MODIFIERS: &str = "Modifiers";
const FABRICATION_METHODS: &str = "Fabrication Methods";

/// Fixed name tables that seed nodes independent of the data.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalogues {
	pub modifiers: Vec<String>,
	pub output_types: Vec<String>,
	pub bio_based: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
	list.iter().map(|s| s.to_string()).collect()
}

impl Catalogues {
	/// Processing modifiers only.
	pub fn basic() -> Self {
		Self {
			modifiers: names(&[
				"Cutting",
				"Shredding",
				"Milling",
				"Soaking",
				"Boiling",
				"Sterilization",
				"Mixing",
				"Straining",
				"Growing",
				"Joining",
				"Weaving",
				"Pressing",
				"Drying",
				"Heating",
				"Heating + Pressing",
			]),
			output_types: Vec::new(),
			bio_based: Vec::new(),
		}
	}

	/// Modifiers plus the output-type and bio-based tiers.
	pub fn extended() -> Self {
		Self {
			output_types: names(&[
				"Textile",
				"Building Material",
				"Packaging",
				"Furniture",
				"Tableware",
				"Paper",
			]),
			bio_based: names(&["Bio-based", "Partially Bio-based", "Not Bio-based"]),
			..Self::basic()
		}
	}

	pub fn is_extended(&self) -> bool {
		!self.output_types.is_empty() || !self.bio_based.is_empty()
	}
}

impl Default for Catalogues {
	fn default() -> Self {
		Self::basic()
	}
}

/// How link endpoints find their nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
	/// Match on `(type, id)`; untyped endpoints fall back to `id`.
	ByKey,
	/// Match on `id` across all types.
	ById,
}

/// Resolve name endpoints to node indices. Unmatched endpoints stay as names.
///
/// Returns the number of links left dangling.
pub fn resolve_links(nodes: &[Node], links: &mut [Link], resolution: Resolution) -> usize {
	let mut by_id: HashMap<&str, usize> = HashMap::new();
	let mut by_key: HashMap<NodeKey, usize> = HashMap::new();
	for (idx, node) in nodes.iter().enumerate() {
		by_id.entry(node.id.as_str()).or_insert(idx);
		if resolution == Resolution::ByKey {
			by_key.entry(node.key()).or_insert(idx);
		}
	}

	let lookup = |endpoint: &Endpoint| -> Option<usize> {
		match endpoint {
			Endpoint::Resolved(idx) => Some(*idx),
			Endpoint::Unresolved { id, kind } => match (resolution, kind) {
				(Resolution::ByKey, Some(kind)) => {
					by_key.get(&NodeKey::new(*kind, id.clone())).copied()
				}
				_ => by_id.get(id.as_str()).copied(),
			},
		}
	};

	let mut dangling = 0;
	for link in links.iter_mut() {
		if let Some(idx) = lookup(&link.source) {
			link.source = Endpoint::Resolved(idx);
		}
		if let Some(idx) = lookup(&link.target) {
			link.target = Endpoint::Resolved(idx);
		}
		if !link.is_resolved() {
			dangling += 1;
		}
	}
	if dangling > 0 {
		warn!("soil-graph: {dangling} links reference unknown nodes");
	}
	dangling
}

/// Builds render graphs with a fixed set of catalogues and category ranking.
#[derive(Clone, Debug)]
pub struct GraphBuilder {
	catalogues: Catalogues,
	rank: Vec<String>,
}

impl GraphBuilder {
	pub fn new(catalogues: Catalogues) -> Self {
		let rank = if catalogues.is_extended() {
			names(&["Bio Based", "Output Types", OUTPUTS, MODIFIERS, INGREDIENTS])
		} else {
			names(&[OUTPUTS, MODIFIERS, INGREDIENTS])
		};
		Self { catalogues, rank }
	}

	/// Override the order groups are visited in.
	pub fn with_rank(mut self, rank: &[&str]) -> Self {
		self.rank = names(rank);
		self
	}

	pub fn catalogues(&self) -> &Catalogues {
		&self.catalogues
	}

	/// Graph for the columnar and radial views. `None` yields an empty graph.
	pub fn build_tree(&self, tree: Option<&CategoryTree>) -> Graph {
		let Some(tree) = tree else {
			return Graph::default();
		};
		let tree = restructure(tree, &self.rank);
		let nodes = self.tree_nodes(&tree);
		let mut links = tree_links(&tree);
		resolve_links(&nodes, &mut links, Resolution::ByKey);
		debug!(
			"soil-graph: built tree graph with {} nodes, {} links",
			nodes.len(),
			links.len()
		);
		Graph { nodes, links }
	}

	/// One node per `(type, id)`; repeated leaves keep the first row's record.
	fn tree_nodes(&self, tree: &CategoryTree) -> Vec<Node> {
		let mut nodes = Vec::new();
		let mut seen = HashSet::new();
		let mut push = |node: Node| {
			if seen.insert(node.key()) {
				nodes.push(node);
			}
		};

		for group in &tree.children {
			let kind = match group.name.as_str() {
				INGREDIENTS => NodeType::Ingredient,
				OUTPUTS => NodeType::Output,
				_ => continue,
			};
			for leaf in &group.children {
				push(Node::new(leaf.display_name(), kind).with_data(leaf.record.clone()));
			}
		}

		push(Node::new(tree.name.to_string(), NodeType::Ingredient));

		let catalogues = [
			(&self.catalogues.modifiers, NodeType::Modifier),
			(&self.catalogues.output_types, NodeType::OutputType),
			(&self.catalogues.bio_based, NodeType::BioBased),
		];
		for (names, kind) in catalogues {
			for name in names {
				push(Node::new(name.clone(), kind));
			}
		}
		nodes
	}
}

impl Default for GraphBuilder {
	fn default() -> Self {
		Self::new(Catalogues::default())
	}
}

/// Graph for the network and ring views: endpoints resolve by `id` only.
pub fn build_network(data: Option<NetworkData>) -> Graph {
	let Some(NetworkData { nodes, mut links }) = data else {
		return Graph::default();
	};
	resolve_links(&nodes, &mut links, Resolution::ById);
	debug!(
		"soil-graph: built network graph with {} nodes, {} links",
		nodes.len(),
		links.len()
	);
	Graph { nodes, links }
}

/// Fold fabrication methods into the modifier group and order groups by `rank`.
///
/// Modifier entries come first, fabrication entries after, duplicates by name
/// dropped. Groups missing from `rank` keep their position.
pub fn restructure(tree: &CategoryTree, rank: &[String]) -> CategoryTree {
	let merged = merged_modifiers(tree);
	let mut children: Vec<TreeGroup> = tree
		.children
		.iter()
		.filter(|group| group.name != FABRICATION_METHODS)
		.map(|group| {
			if group.name == MODIFIERS {
				TreeGroup {
					name: MODIFIERS.to_string(),
					children: merged.clone(),
				}
			} else {
				group.clone()
			}
		})
		.collect();

	sort_ranked(&mut children, rank);

	CategoryTree {
		name: tree.name.clone(),
		children,
	}
}

fn merged_modifiers(tree: &CategoryTree) -> Vec<TreeLeaf> {
	let modifiers = tree.group(MODIFIERS).map(|g| g.children.as_slice());
	let fabrication = tree.group(FABRICATION_METHODS).map(|g| g.children.as_slice());

	let mut seen = HashSet::new();
	modifiers
		.unwrap_or_default()
		.iter()
		.chain(fabrication.unwrap_or_default())
		.filter(|leaf| seen.insert(leaf.display_name()))
		.cloned()
		.collect()
}

/// Stable rank sort where unranked groups never move.
fn sort_ranked(groups: &mut [TreeGroup], rank: &[String]) {
	let position = |group: &TreeGroup| rank.iter().position(|r| *r == group.name);
	let slots: Vec<usize> = groups
		.iter()
		.enumerate()
		.filter(|(_, g)| position(g).is_some())
		.map(|(i, _)| i)
		.collect();
	let mut ranked: Vec<TreeGroup> = slots.iter().map(|&i| groups[i].clone()).collect();
	ranked.sort_by_key(|g| position(g));
	for (slot, group) in slots.into_iter().zip(ranked) {
		groups[slot] = group;
	}
}

fn tree_links(tree: &CategoryTree) -> Vec<Link> {
	let mut links = Vec::new();
	let Some(outputs) = tree.group(OUTPUTS) else {
		return links;
	};

	for leaf in &outputs.children {
		let LeafName::Output(entry) = &leaf.name else {
			continue;
		};
		let output = entry.output_name.to_string();
		let output_key = NodeKey::new(NodeType::Output, output.clone());

		let output_type = entry
			.output_type
			.as_ref()
			.map(|t| NodeKey::new(NodeType::OutputType, t.to_string()));
		if let Some(bio) = &entry.bio_based {
			let bio = NodeKey::new(NodeType::BioBased, bio.to_string());
			// Without an output type the bio-based tier hangs off the output itself.
			let next = output_type.clone().unwrap_or_else(|| output_key.clone());
			links.push(Link::between(bio, next, &output));
		}
		if let Some(output_type) = output_type {
			links.push(Link::between(output_type, output_key.clone(), &output));
		}

		let modifiers: Vec<NodeKey> = entry
			.modifiers
			.iter()
			.map(|m| NodeKey::new(NodeType::Modifier, m.to_string()))
			.collect();
		for modifier in &modifiers {
			links.push(Link::between(output_key.clone(), modifier.clone(), &output));
		}

		for (i, ingredient) in entry.ingredients.iter().enumerate() {
			let Some(modifier) = modifiers.get(i) else {
				warn!(
					"soil-graph: output {output:?} lists {} ingredients but {} modifiers",
					entry.ingredients.len(),
					modifiers.len()
				);
				break;
			};
			let ingredient = NodeKey::new(NodeType::Ingredient, ingredient.to_string());
			links.push(Link::between(modifier.clone(), ingredient, &output));
		}
	}
	links
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::diagram::types::{FieldValue, OutputEntry};

	fn output_leaf(name: &str, ingredients: &[&str], modifiers: &[&str]) -> TreeLeaf {
		TreeLeaf {
			name: LeafName::Output(OutputEntry {
				output_name: name.into(),
				ingredients: ingredients.iter().map(|s| FieldValue::from(*s)).collect(),
				modifiers: modifiers.iter().map(|s| FieldValue::from(*s)).collect(),
				output_type: None,
				bio_based: None,
			}),
			record: None,
		}
	}

	fn group(name: &str, children: Vec<TreeLeaf>) -> TreeGroup {
		TreeGroup {
			name: name.to_string(),
			children,
		}
	}

	fn leaves(list: &[&str]) -> Vec<TreeLeaf> {
		list.iter()
			.map(|s| TreeLeaf::value((*s).into(), None))
			.collect()
	}

	fn edge_names(graph: &Graph) -> Vec<(String, String)> {
		graph
			.links
			.iter()
			.map(|l| {
				(
					graph.node(&l.source).map(|n| n.id.clone()).unwrap_or_default(),
					graph.node(&l.target).map(|n| n.id.clone()).unwrap_or_default(),
				)
			})
			.collect()
	}

	#[test]
	fn pairs_modifiers_and_ingredients_positionally() {
		let tree = CategoryTree {
			name: "Root".into(),
			children: vec![
				group("Ingredients", leaves(&["Hemp", "Clay"])),
				group(
					"Outputs",
					vec![output_leaf("Brick", &["Hemp", "Clay"], &["Cutting", "Mixing"])],
				),
			],
		};
		let graph = GraphBuilder::default().build_tree(Some(&tree));
		let edges = edge_names(&graph);
		let pair = |a: &str, b: &str| (a.to_string(), b.to_string());
		assert_eq!(
			edges,
			vec![
				pair("Brick", "Cutting"),
				pair("Brick", "Mixing"),
				pair("Cutting", "Hemp"),
				pair("Mixing", "Clay"),
			]
		);
		assert!(!edges.contains(&pair("Cutting", "Clay")));
		assert!(!edges.contains(&pair("Mixing", "Hemp")));
		assert!(graph.links.iter().all(|l| l.group.as_deref() == Some("Brick")));
	}

	#[test]
	fn same_name_resolves_per_type() {
		let tree = CategoryTree {
			name: "Root".into(),
			children: vec![
				group("Ingredients", leaves(&["Hemp"])),
				group("Outputs", vec![output_leaf("Hemp", &["Hemp"], &["Drying"])]),
			],
		};
		let graph = GraphBuilder::default().build_tree(Some(&tree));
		let output_link = &graph.links[0];
		let drying_link = &graph.links[1];
		assert_eq!(graph.node(&output_link.source).unwrap().kind, NodeType::Output);
		assert_eq!(graph.node(&drying_link.target).unwrap().kind, NodeType::Ingredient);
	}

	#[test]
	fn extra_ingredients_without_modifiers_are_skipped() {
		let tree = CategoryTree {
			name: "Root".into(),
			children: vec![
				group("Ingredients", leaves(&["Hemp", "Clay"])),
				group("Outputs", vec![output_leaf("Brick", &["Hemp", "Clay"], &["Mixing"])]),
			],
		};
		let graph = GraphBuilder::default().build_tree(Some(&tree));
		assert_eq!(graph.links.len(), 2);
	}

	#[test]
	fn fabrication_methods_fold_into_modifiers() {
		let tree = CategoryTree {
			name: "Root".into(),
			children: vec![
				group("Ingredients", leaves(&["Hemp"])),
				group("Modifiers", leaves(&["Cutting", "Drying"])),
				group("Fabrication Methods", leaves(&["Weaving", "Drying"])),
				group("Outputs", Vec::new()),
			],
		};
		let rank = names(&["Outputs", "Modifiers", "Ingredients"]);
		let out = restructure(&tree, &rank);
		let order: Vec<&str> = out.children.iter().map(|g| g.name.as_str()).collect();
		assert_eq!(order, vec!["Outputs", "Modifiers", "Ingredients"]);
		let merged: Vec<String> = out
			.group("Modifiers")
			.unwrap()
			.children
			.iter()
			.map(TreeLeaf::display_name)
			.collect();
		assert_eq!(merged, vec!["Cutting", "Drying", "Weaving"]);
	}

	#[test]
	fn unranked_groups_keep_their_slot() {
		let tree = CategoryTree {
			name: "Root".into(),
			children: vec![
				group("Ingredients", Vec::new()),
				group("Notes", Vec::new()),
				group("Outputs", Vec::new()),
			],
		};
		let out = restructure(&tree, &names(&["Outputs", "Modifiers", "Ingredients"]));
		let order: Vec<&str> = out.children.iter().map(|g| g.name.as_str()).collect();
		assert_eq!(order, vec!["Outputs", "Notes", "Ingredients"]);
	}

	#[test]
	fn catalogues_and_self_node_are_always_emitted() {
		let tree = CategoryTree {
			name: "Hemp".into(),
			children: Vec::new(),
		};
		let graph = GraphBuilder::new(Catalogues::extended()).build_tree(Some(&tree));
		let catalogues = Catalogues::extended();
		assert_eq!(graph.nodes[0], Node::new("Hemp", NodeType::Ingredient));
		assert_eq!(
			graph.nodes.len(),
			1 + catalogues.modifiers.len() + catalogues.output_types.len() + catalogues.bio_based.len()
		);
		assert_eq!(graph.indices_of(NodeType::BioBased).len(), 3);
	}

	#[test]
	fn extended_chain_runs_through_output_type() {
		let mut leaf = output_leaf("Tote", &["Hemp"], &["Weaving"]);
		if let LeafName::Output(entry) = &mut leaf.name {
			entry.output_type = Some("Textile".into());
			entry.bio_based = Some("Bio-based".into());
		}
		let tree = CategoryTree {
			name: "Hemp".into(),
			children: vec![group("Outputs", vec![leaf])],
		};
		let graph = GraphBuilder::new(Catalogues::extended()).build_tree(Some(&tree));
		let edges = edge_names(&graph);
		assert_eq!(edges[0], ("Bio-based".to_string(), "Textile".to_string()));
		assert_eq!(edges[1], ("Textile".to_string(), "Tote".to_string()));
		assert!(graph.links.iter().all(Link::is_resolved));
	}

	#[test]
	fn shared_ingredient_is_one_node() {
		let mut first = TreeLeaf::value("Hemp".into(), None);
		first.record = Some(
			[("Ingredient 1 Name".to_string(), FieldValue::from("Hemp"))]
				.into_iter()
				.collect(),
		);
		let tree = CategoryTree {
			name: "Process".into(),
			children: vec![
				group("Ingredients", vec![first, TreeLeaf::value("Hemp".into(), None)]),
				group(
					"Outputs",
					vec![
						output_leaf("Rope", &["Hemp"], &["Cutting"]),
						output_leaf("Paper", &["Hemp"], &["Soaking"]),
					],
				),
			],
		};
		let graph = GraphBuilder::default().build_tree(Some(&tree));
		let hemp: Vec<usize> = graph
			.indices_of(NodeType::Ingredient)
			.into_iter()
			.filter(|&i| graph.nodes[i].id == "Hemp")
			.collect();
		assert_eq!(hemp.len(), 1);
		assert!(graph.nodes[hemp[0]].data.is_some());
		let into_hemp = graph
			.links
			.iter()
			.filter(|l| l.target == Endpoint::Resolved(hemp[0]))
			.count();
		assert_eq!(into_hemp, 2);
	}

	#[test]
	fn missing_input_degrades_to_empty_graph() {
		assert!(GraphBuilder::default().build_tree(None).is_empty());
		assert!(build_network(None).is_empty());
	}

	#[test]
	fn network_resolution_is_first_match_and_tolerates_dangling() {
		let data = NetworkData {
			nodes: vec![
				Node::new("Kenya", NodeType::Ingredient),
				Node::new("Kenya", NodeType::Output),
				Node::new("Sisal", NodeType::Modifier),
			],
			links: vec![
				Link {
					source: "Sisal".into(),
					target: "Kenya".into(),
					group: None,
				},
				Link {
					source: "Sisal".into(),
					target: "Atlantis".into(),
					group: None,
				},
			],
		};
		let graph = build_network(Some(data));
		assert_eq!(graph.links[0].target, Endpoint::Resolved(0));
		assert_eq!(graph.links[1].source, Endpoint::Resolved(2));
		assert_eq!(graph.links[1].target, Endpoint::from("Atlantis"));
		assert_eq!(graph.endpoint_position(&graph.links[1].target), (0.0, 0.0));
	}
}
