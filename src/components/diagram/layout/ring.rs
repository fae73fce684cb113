//! Concentric type rings around an optional centre node.
//!
//! Node positions depend only on the graph and the ring table. The injected
//! RNG decides nothing but how flat each link arc is.

use log::debug;
use rand::Rng;

use super::super::theme::Theme;
use super::super::types::{Graph, NodeType};
use super::{Guide, Label, LinkGlyph, LinkShape, NodeGlyph, Scene, TextAnchor, Viewport, link_style};

/// One concentric ring: which nodes sit on it and how they are spread.
#[derive(Clone, Debug, PartialEq)]
pub struct RingSpec {
	/// Node type placed on this ring.
	pub kind: NodeType,
	pub radius: f64,
	/// Degrees, clockwise from the positive x axis.
	pub start_angle: f64,
	/// Degrees covered by the ring's nodes.
	pub span: f64,
}

/// Ring table and centre node for [`ring`].
#[derive(Clone, Debug)]
pub struct RingConfig {
	/// Innermost first.
	pub rings: Vec<RingSpec>,
	/// Node pinned to the viewport centre instead of its ring.
	pub center_id: Option<String>,
	pub node_radius: f64,
	/// Label offset below the marker.
	pub label_dy: f64,
	/// Chance that a link arc is drawn flatter. Clamped to `[0, 1]`; NaN reads as 0.
	pub flat_arc_probability: f64,
	/// Radius multiplier for flat arcs.
	pub flat_arc_factor: f64,
}

impl RingConfig {
	/// Ingredient, modifier, fabrication and output rings at `inner + k * spacing`.
	pub fn concentric(inner: f64, spacing: f64) -> Self {
		let ring = |k: f64, kind, start_angle, span| RingSpec {
			kind,
			radius: inner + k * spacing,
			start_angle,
			span,
		};
		Self {
			rings: vec![
				ring(0.0, NodeType::Ingredient, 0.0, 360.0),
				ring(1.0, NodeType::Modifier, -25.0, 360.0),
				ring(2.0, NodeType::Fabrication, 0.0, 180.0),
				ring(3.0, NodeType::Output, 0.0, 360.0),
			],
			center_id: None,
			node_radius: 5.0,
			label_dy: 15.0,
			flat_arc_probability: 0.5,
			flat_arc_factor: 3.0,
		}
	}

	pub fn with_center(mut self, id: impl Into<String>) -> Self {
		self.center_id = Some(id.into());
		self
	}
}

impl Default for RingConfig {
	fn default() -> Self {
		Self::concentric(100.0, 100.0)
	}
}

/// Place nodes on concentric rings by type.
///
/// Each ring's angular step is `span / n` where `n` counts every node of the
/// ring's type, the centre node included; the centre node itself does not
/// advance the angle. Nodes whose type has no ring stay unplaced and are not
/// drawn. `rng` only decides link curvature.
pub fn ring<R: Rng + ?Sized>(
	graph: &mut Graph,
	viewport: Viewport,
	config: &RingConfig,
	theme: &Theme,
	rng: &mut R,
) -> Scene {
	let (cx, cy) = viewport.center();
	let mut scene = Scene::empty(viewport, theme);
	let mut placed = Vec::new();

	for spec in &config.rings {
		let members = graph.indices_of(spec.kind);
		let increment = spec.span / members.len().max(1) as f64;
		let mut angle = spec.start_angle;
		for idx in members {
			let node = &mut graph.nodes[idx];
			if config.center_id.as_deref() == Some(node.id.as_str()) {
				node.x = Some(cx);
				node.y = Some(cy);
			} else {
				let rad = angle.to_radians();
				node.x = Some(cx + spec.radius * rad.cos());
				node.y = Some(cy + spec.radius * rad.sin());
				angle -= increment;
			}
			placed.push(idx);
		}
		scene.guides.push(Guide {
			cx,
			cy,
			r: spec.radius,
			color: theme.guide,
		});
	}
	debug!(
		"soil-graph: ring layout placed {} of {} nodes",
		placed.len(),
		graph.nodes.len()
	);

	let flat_chance = if config.flat_arc_probability.is_nan() {
		0.0
	} else {
		config.flat_arc_probability.clamp(0.0, 1.0)
	};
	for (idx, link) in graph.links.iter().enumerate() {
		let (sx, sy) = graph.endpoint_position(&link.source);
		let (tx, ty) = graph.endpoint_position(&link.target);
		let distance = ((tx - sx).powi(2) + (ty - sy).powi(2)).sqrt();
		let factor = if rng.random_bool(flat_chance) {
			config.flat_arc_factor
		} else {
			1.0
		};
		scene.links.push(LinkGlyph {
			link: Some(idx),
			group: link.group.clone(),
			shape: LinkShape::Arc {
				sx,
				sy,
				tx,
				ty,
				radius: distance * factor,
			},
			style: link_style(graph, link, theme),
		});
	}

	placed.sort_unstable();
	for idx in placed {
		let node = &graph.nodes[idx];
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
