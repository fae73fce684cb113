//! Payload to scene: pick the graph shape a layout needs, build it, lay it out.

use log::{debug, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;

use super::builder::{Catalogues, GraphBuilder, build_network};
use super::layout::{
	ColumnarConfig, ForceConfig, ForceSimulation, LayoutKind, RadialConfig, RingConfig, Scene,
	Viewport, columnar, force_scene, radial, ring,
};
use super::normalize::{CategoryRoot, ROOT_NAME, normalize};
use super::render::TextMeasure;
use super::theme::Theme;
use super::types::{CategoryTree, Graph, NetworkData, Payload};

/// Any of the payload shapes the host page can hand over.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(untagged)]
pub enum DiagramData {
	/// `{ nodes, links }` supply/demand network.
	Network(NetworkData),
	/// `{ data: [sheet, ...] }` straight from the spreadsheet API.
	Sheets(Payload),
	/// `{ name, children }` pre-shaped category tree.
	Tree(CategoryTree),
	#[default]
	Empty,
}

impl DiagramData {
	pub fn is_empty(&self) -> bool {
		match self {
			DiagramData::Network(data) => data.nodes.is_empty(),
			DiagramData::Sheets(payload) => payload.records().next().is_none(),
			DiagramData::Tree(tree) => tree.children.is_empty(),
			DiagramData::Empty => true,
		}
	}

	/// Category tree for the tree-shaped builder; rows are folded into one.
	fn category_tree(&self, root_name: &str) -> Option<CategoryTree> {
		match self {
			DiagramData::Sheets(payload) => Some(CategoryTree::from_records(root_name, payload.records())),
			DiagramData::Tree(tree) => Some(tree.clone()),
			DiagramData::Network(_) | DiagramData::Empty => None,
		}
	}

	fn graph(&self, builder: &GraphBuilder, root_name: &str) -> Graph {
		match self {
			DiagramData::Network(data) => build_network(Some(data.clone())),
			_ => builder.build_tree(self.category_tree(root_name).as_ref()),
		}
	}

	fn category_root(&self, root_name: &str) -> CategoryRoot {
		match self {
			DiagramData::Sheets(payload) => normalize(payload.records()),
			DiagramData::Tree(tree) => CategoryRoot::from_tree(tree),
			DiagramData::Network(_) | DiagramData::Empty => {
				warn!("soil-graph: radial layout needs rows or a category tree");
				CategoryRoot {
					name: root_name.to_string(),
					children: Vec::new(),
				}
			}
		}
	}
}

/// Constant tables and per-layout configuration.
#[derive(Clone, Debug)]
pub struct DiagramSettings {
	/// Name tables seeded into tree graphs.
	pub catalogues: Catalogues,
	pub columnar: ColumnarConfig,
	pub radial: RadialConfig,
	pub force: ForceConfig,
	pub ring: RingConfig,
	/// Root name for trees built from raw rows.
	pub root_name: String,
	/// Seed for ring arc curvature.
	pub seed: u64,
}

impl DiagramSettings {
	/// Output-type and bio-based catalogues with their extra columns.
	pub fn extended() -> Self {
		Self {
			catalogues: Catalogues::extended(),
			columnar: ColumnarConfig::extended(),
			..Self::default()
		}
	}
}

impl Default for DiagramSettings {
	fn default() -> Self {
		Self {
			catalogues: Catalogues::basic(),
			columnar: ColumnarConfig::default(),
			radial: RadialConfig::default(),
			force: ForceConfig::default(),
			ring: RingConfig::default(),
			root_name: ROOT_NAME.to_string(),
			seed: 0x50_11,
		}
	}
}

/// One rendered surface: the graph, its current scene, and the running
/// simulation for the force layout.
pub struct Diagram {
	pub kind: LayoutKind,
	pub graph: Graph,
	pub scene: Scene,
	pub theme: Theme,
	simulation: Option<ForceSimulation>,
	force: ForceConfig,
}

impl Diagram {
	/// Advance the simulation one tick and rebuild the scene. Returns whether
	/// more frames are needed.
	pub fn step(&mut self, dt: f64) -> bool {
		let Some(sim) = self.simulation.as_mut() else {
			return false;
		};
		let running = sim.tick(dt);
		sim.apply(&mut self.graph);
		self.scene = force_scene(&self.graph, self.scene.viewport, &self.force, &self.theme);
		running
	}

	pub fn settled(&self) -> bool {
		self.simulation.as_ref().is_none_or(ForceSimulation::settled)
	}
}

/// Build and lay out `data` for `kind`. Everything is rebuilt from scratch.
pub fn render_diagram(
	data: &DiagramData,
	kind: LayoutKind,
	viewport: Viewport,
	settings: &DiagramSettings,
	measure: &dyn TextMeasure,
) -> Diagram {
	let theme = Theme::for_layout(kind);
	let builder = GraphBuilder::new(settings.catalogues.clone());
	let mut simulation = None;

	let (graph, scene) = match kind {
		LayoutKind::Columnar => {
			let mut graph = data.graph(&builder, &settings.root_name);
			let scene = columnar(&mut graph, viewport, &settings.columnar, &theme, measure);
			(graph, scene)
		}
		LayoutKind::Radial => {
			let root = data.category_root(&settings.root_name);
			(Graph::default(), radial(&root, viewport, &settings.radial, &theme))
		}
		LayoutKind::Force => {
			let mut graph = data.graph(&builder, &settings.root_name);
			if !graph.is_empty() {
				let sim = ForceSimulation::new(&graph, viewport, settings.force.clone());
				sim.apply(&mut graph);
				simulation = Some(sim);
			}
			let scene = force_scene(&graph, viewport, &settings.force, &theme);
			(graph, scene)
		}
		LayoutKind::Ring => {
			let mut graph = data.graph(&builder, &settings.root_name);
			let mut rng = StdRng::seed_from_u64(settings.seed);
			let scene = ring(&mut graph, viewport, &settings.ring, &theme, &mut rng);
			(graph, scene)
		}
	};
	debug!(
		"soil-graph: {kind} scene with {} nodes, {} links",
		scene.nodes.len(),
		scene.links.len()
	);

	Diagram {
		kind,
		graph,
		scene,
		theme,
		simulation,
		force: settings.force.clone(),
	}
}
