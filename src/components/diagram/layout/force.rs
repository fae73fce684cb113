//! Force-directed layout of the supply/demand network.
//!
//! Spring and charge forces come from the `force_graph` physics; each tick then
//! runs centring, collision, and the centre-pin constraint on the resulting
//! positions before cooling `alpha` the way d3-force does.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::super::theme::Theme;
use super::super::types::Graph;
use super::{Label, LinkGlyph, LinkShape, NodeGlyph, Scene, TextAnchor, Viewport, link_style};

/// Which node the centre-pin constraint pulls toward the viewport centre.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CenterNode {
	/// `nodes[0]`.
	#[default]
	First,
	/// The first node with this id.
	Id(String),
	/// No pinned node.
	None,
}

/// Physics constants and cooling schedule for [`ForceSimulation`].
#[derive(Clone, Debug)]
pub struct ForceConfig {
	/// Many-body repulsion strength.
	pub charge: f32,
	/// Link spring stiffness.
	pub spring: f32,
	pub max_force: f32,
	pub node_speed: f32,
	pub damping: f32,
	/// Minimum distance kept between node centres.
	pub collide_radius: f64,
	/// Radius of the circle nodes start on.
	pub initial_radius: f64,
	/// Node pulled to the viewport centre each tick.
	pub center: CenterNode,
	/// The simulation settles once alpha drops below this.
	pub alpha_min: f64,
	/// Fraction of alpha lost per tick.
	pub alpha_decay: f64,
	pub node_radius: f64,
	/// Label offset below the marker.
	pub label_dy: f64,
}

impl Default for ForceConfig {
	fn default() -> Self {
		Self {
			charge: 50.0,
			spring: 0.05,
			max_force: 100.0,
			node_speed: 3000.0,
			damping: 0.9,
			collide_radius: 35.0,
			initial_radius: 100.0,
			center: CenterNode::First,
			alpha_min: 0.001,
			alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
			node_radius: 5.0,
			label_dy: 15.0,
		}
	}
}

/// Running simulation for one surface. Rebuilt on every render.
pub struct ForceSimulation {
	physics: ForceGraph<usize, ()>,
	positions: Vec<(f64, f64)>,
	pinned: Option<usize>,
	viewport: Viewport,
	config: ForceConfig,
	alpha: f64,
}

impl ForceSimulation {
	pub fn new(graph: &Graph, viewport: Viewport, config: ForceConfig) -> Self {
		let mut physics = ForceGraph::new(SimulationParameters {
			force_charge: config.charge,
			force_spring: config.spring,
			force_max: config.max_force,
			node_speed: config.node_speed,
			damping_factor: config.damping,
		});
		let (cx, cy) = viewport.center();
		let count = graph.nodes.len().max(1) as f64;
		let mut handles = HashMap::new();
		let mut positions = Vec::with_capacity(graph.nodes.len());

		for (i, node) in graph.nodes.iter().enumerate() {
			let (x, y) = match (node.x, node.y) {
				(Some(x), Some(y)) => (x, y),
				_ => {
					let angle = i as f64 * 2.0 * PI / count;
					(
						cx + config.initial_radius * angle.cos(),
						cy + config.initial_radius * angle.sin(),
					)
				}
			};
			let handle = physics.add_node(NodeData {
				x: x as f32,
				y: y as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: i,
			});
			handles.insert(i, handle);
			positions.push((x, y));
		}

		let mut springs = 0;
		for link in &graph.links {
			if let (Some(s), Some(t)) = (link.source.index(), link.target.index()) {
				if s == t {
					continue;
				}
				if let (Some(&a), Some(&b)) = (handles.get(&s), handles.get(&t)) {
					physics.add_edge(a, b, EdgeData::default());
					springs += 1;
				}
			}
		}

		let pinned = match &config.center {
			CenterNode::First => (!graph.nodes.is_empty()).then_some(0),
			CenterNode::Id(id) => graph.nodes.iter().position(|n| &n.id == id),
			CenterNode::None => None,
		};
		debug!(
			"soil-graph: force simulation with {} nodes, {springs} springs",
			positions.len()
		);

		Self {
			physics,
			positions,
			pinned,
			viewport,
			config,
			alpha: 1.0,
		}
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn settled(&self) -> bool {
		self.alpha < self.config.alpha_min
	}

	pub fn positions(&self) -> &[(f64, f64)] {
		&self.positions
	}

	/// Later ticks centre on the new viewport.
	pub fn resize(&mut self, viewport: Viewport) {
		self.viewport = viewport;
	}

	/// Advance one step. Returns `false` once the simulation has settled.
	pub fn tick(&mut self, dt: f64) -> bool {
		if self.settled() {
			return false;
		}
		self.physics.update((dt * self.alpha) as f32);
		let positions = &mut self.positions;
		self.physics.visit_nodes(|node| {
			if let Some(p) = positions.get_mut(node.data.user_data) {
				*p = (node.x() as f64, node.y() as f64);
			}
		});

		let center = self.viewport.center();
		recenter(&mut self.positions, center);
		collide(&mut self.positions, self.config.collide_radius);
		if let Some(p) = self.pinned.and_then(|i| self.positions.get_mut(i)) {
			*p = pin(*p, center, self.alpha);
		}

		let positions = &self.positions;
		self.physics.visit_nodes_mut(|node| {
			if let Some(&(x, y)) = positions.get(node.data.user_data) {
				node.data.x = x as f32;
				node.data.y = y as f32;
			}
		});

		self.alpha += (0.0 - self.alpha) * self.config.alpha_decay;
		!self.settled()
	}

	/// Copy the current positions onto the graph's nodes.
	pub fn apply(&self, graph: &mut Graph) {
		for (node, &(x, y)) in graph.nodes.iter_mut().zip(&self.positions) {
			node.x = Some(x);
			node.y = Some(y);
		}
	}
}

/// Shift every position so their mean lands on `center`.
fn recenter(positions: &mut [(f64, f64)], center: (f64, f64)) {
	if positions.is_empty() {
		return;
	}
	let n = positions.len() as f64;
	let (sx, sy) = positions
		.iter()
		.fold((0.0, 0.0), |(ax, ay), &(x, y)| (ax + x, ay + y));
	let (dx, dy) = (center.0 - sx / n, center.1 - sy / n);
	for p in positions.iter_mut() {
		p.0 += dx;
		p.1 += dy;
	}
}

/// Push overlapping pairs apart until they are `2 * radius` from each other.
fn collide(positions: &mut [(f64, f64)], radius: f64) {
	let min = 2.0 * radius;
	for i in 0..positions.len() {
		for j in (i + 1)..positions.len() {
			let (mut dx, mut dy) = (positions[j].0 - positions[i].0, positions[j].1 - positions[i].1);
			let mut dist = (dx * dx + dy * dy).sqrt();
			if dist >= min {
				continue;
			}
			if dist == 0.0 {
				// Coincident nodes separate along an index-dependent direction.
				let angle = (j as f64) * 2.399_963;
				(dx, dy, dist) = (angle.cos(), angle.sin(), 1.0);
			}
			let push = (min - dist) / 2.0 / dist;
			positions[i].0 -= dx * push;
			positions[i].1 -= dy * push;
			positions[j].0 += dx * push;
			positions[j].1 += dy * push;
		}
	}
}

/// Centre-pin constraint: move `p` toward `target` by the fraction `alpha`.
fn pin(p: (f64, f64), target: (f64, f64), alpha: f64) -> (f64, f64) {
	(p.0 + (target.0 - p.0) * alpha, p.1 + (target.1 - p.1) * alpha)
}

/// Scene for the current node positions: type-coloured markers, labels
/// centred below, and arcs whose radius is the endpoint distance.
pub fn force_scene(graph: &Graph, viewport: Viewport, config: &ForceConfig, theme: &Theme) -> Scene {
	let mut scene = Scene::empty(viewport, theme);
	for (idx, link) in graph.links.iter().enumerate() {
		let (sx, sy) = graph.endpoint_position(&link.source);
		let (tx, ty) = graph.endpoint_position(&link.target);
		let radius = ((tx - sx).powi(2) + (ty - sy).powi(2)).sqrt();
		scene.links.push(LinkGlyph {
			link: Some(idx),
			group: link.group.clone(),
			shape: LinkShape::Arc {
				sx,
				sy,
				tx,
				ty,
				radius,
			},
			style: link_style(graph, link, theme),
		});
	}
	for (idx, node) in graph.nodes.iter().enumerate() {
		let (x, y) = node.position();
		scene.nodes.push(NodeGlyph {
			node: Some(idx),
			id: node.id.clone(),
			kind: Some(node.kind),
			x,
			y,
			radius: config.node_radius,
			fill: theme.node_fill(Some(node.kind)),
			label: Label {
				text: node.id.clone(),
				x,
				y,
				dx: 0.0,
				dy: config.label_dy,
				rotation: 0.0,
				anchor: TextAnchor::Middle,
				font: theme.node.label_font.clone(),
				color: theme.label_color(Some(node.kind)),
				halo: theme.node.label_halo,
			},
		});
	}
	scene
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::diagram::types::{Endpoint, Link, Node, NodeType};

	fn network() -> Graph {
		Graph {
			nodes: vec![
				Node::new("Lithuania", NodeType::Ingredient),
				Node::new("Hemp", NodeType::Ingredient),
				Node::new("Rope", NodeType::Output),
			],
			links: vec![
				Link {
					source: Endpoint::Resolved(1),
					target: Endpoint::Resolved(0),
					group: Some("Rope".into()),
				},
				Link {
					source: Endpoint::Resolved(2),
					target: Endpoint::Resolved(1),
					group: Some("Rope".into()),
				},
			],
		}
	}

	#[test]
	fn recenter_moves_mean_to_center() {
		let mut ps = vec![(0.0, 0.0), (10.0, 20.0)];
		recenter(&mut ps, (100.0, 100.0));
		assert_eq!(ps, vec![(95.0, 90.0), (105.0, 110.0)]);
	}

	#[test]
	fn collide_separates_overlapping_pairs() {
		let mut ps = vec![(0.0, 0.0), (10.0, 0.0)];
		collide(&mut ps, 35.0);
		assert!((ps[1].0 - ps[0].0 - 70.0).abs() < 1e-9);
		assert_eq!(ps[0].0 + ps[1].0, 10.0);

		let mut same = vec![(5.0, 5.0), (5.0, 5.0)];
		collide(&mut same, 35.0);
		let d = ((same[1].0 - same[0].0).powi(2) + (same[1].1 - same[0].1).powi(2)).sqrt();
		assert!(d > 0.0);
	}

	#[test]
	fn pin_pulls_by_alpha() {
		assert_eq!(pin((0.0, 0.0), (100.0, 50.0), 0.5), (50.0, 25.0));
		assert_eq!(pin((10.0, 10.0), (100.0, 50.0), 0.0), (10.0, 10.0));
	}

	#[test]
	fn cools_to_settled_on_the_d3_schedule() {
		let mut sim = ForceSimulation::new(&network(), Viewport::new(600.0, 400.0), ForceConfig::default());
		for _ in 0..290 {
			assert!(sim.tick(0.016));
		}
		assert!(!sim.settled());
		for _ in 0..20 {
			sim.tick(0.016);
		}
		assert!(sim.settled());
		assert!(!sim.tick(0.016));
	}

	#[test]
	fn named_center_resolves_by_id() {
		let config = ForceConfig {
			center: CenterNode::Id("Rope".into()),
			..ForceConfig::default()
		};
		let sim = ForceSimulation::new(&network(), Viewport::new(600.0, 400.0), config);
		assert_eq!(sim.pinned, Some(2));
		let none = ForceSimulation::new(
			&network(),
			Viewport::new(600.0, 400.0),
			ForceConfig {
				center: CenterNode::None,
				..ForceConfig::default()
			},
		);
		assert_eq!(none.pinned, None);
	}

	#[test]
	fn apply_writes_positions_and_scene_draws_arcs() {
		let mut graph = network();
		let view = Viewport::new(600.0, 400.0);
		let sim = ForceSimulation::new(&graph, view, ForceConfig::default());
		sim.apply(&mut graph);
		assert!(graph.nodes.iter().all(|n| n.x.is_some() && n.y.is_some()));
		// Starting circle of radius 100 around the centre.
		assert!((graph.nodes[0].x.unwrap() - 400.0).abs() < 1e-3);

		let scene = force_scene(&graph, view, &ForceConfig::default(), &Theme::soil());
		let LinkShape::Arc { sx, sy, tx, ty, radius } = scene.links[0].shape else {
			panic!("force links are arcs");
		};
		assert!((radius - ((tx - sx).powi(2) + (ty - sy).powi(2)).sqrt()).abs() < 1e-9);
		assert_eq!(scene.nodes[2].fill, Theme::soil().palette.output);
		assert_eq!(scene.nodes[2].label.anchor, TextAnchor::Middle);
		assert_eq!(scene.links[0].group.as_deref(), Some("Rope"));
	}
}
