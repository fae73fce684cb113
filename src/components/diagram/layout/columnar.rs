//! Type columns: outputs, then modifiers, then ingredients, left to right.

use log::debug;

use super::super::render::TextMeasure;
use super::super::theme::Theme;
use super::super::types::{Graph, NodeType};
use super::{Label, LinkGlyph, LinkShape, NodeGlyph, Scene, TextAnchor, Viewport, link_style};

/// Column order and row metrics for [`columnar`].
#[derive(Clone, Debug)]
pub struct ColumnarConfig {
	/// Column order, left to right. Types not listed are not drawn.
	pub columns: Vec<NodeType>,
	pub row_height: f64,
	/// Vertical space between rows.
	pub gap: f64,
	/// Label offset from the column position.
	pub label_dx: f64,
	pub label_dy: f64,
	/// Space between the end of a label and its marker.
	pub marker_gap: f64,
	pub marker_radius: f64,
	/// Extra height added when content overflows the viewport.
	pub overflow_margin: f64,
}

impl ColumnarConfig {
	/// Columns for graphs built with the extended catalogues.
	pub fn extended() -> Self {
		Self {
			columns: vec![
				NodeType::BioBased,
				NodeType::OutputType,
				NodeType::Output,
				NodeType::Modifier,
				NodeType::Ingredient,
			],
			..Self::default()
		}
	}
}

impl Default for ColumnarConfig {
	fn default() -> Self {
		Self {
			columns: vec![NodeType::Output, NodeType::Modifier, NodeType::Ingredient],
			row_height: 20.0,
			gap: 16.0,
			label_dx: 10.0,
			label_dy: 3.0,
			marker_gap: 20.0,
			marker_radius: 3.0,
			overflow_margin: 100.0,
		}
	}
}

/// Column centre and row position for each placed node, `(index, x, y)`.
fn place(graph: &Graph, config: &ColumnarConfig, viewport: Viewport) -> Vec<(usize, f64, f64)> {
	let column_width = viewport.width / config.columns.len().max(1) as f64;
	let mut placed = Vec::with_capacity(graph.nodes.len());
	for (col, kind) in config.columns.iter().enumerate() {
		let members = graph.indices_of(*kind);
		let x = column_width / 2.0 + col as f64 * column_width;
		let mut y = (viewport.height - stack_height(members.len(), config)) / 2.0;
		for idx in members {
			placed.push((idx, x, y));
			y += config.row_height + config.gap;
		}
	}
	placed
}

fn stack_height(count: usize, config: &ColumnarConfig) -> f64 {
	if count == 0 {
		return 0.0;
	}
	count as f64 * config.row_height + (count - 1) as f64 * config.gap
}

/// Vertical extent actually covered by placed rows.
fn realized_height(placed: &[(usize, f64, f64)], config: &ColumnarConfig) -> f64 {
	let top = placed.iter().map(|p| p.2).fold(f64::INFINITY, f64::min);
	let bottom = placed.iter().map(|p| p.2).fold(f64::NEG_INFINITY, f64::max);
	if placed.is_empty() {
		0.0
	} else {
		bottom + config.row_height - top
	}
}

/// Lay out `graph` in type columns.
///
/// Non-ingredient markers sit to the right of their label (`x + text width +
/// marker gap`); ingredient markers stay on the column line. When the tallest
/// column does not fit, the layout runs once more with the content height plus
/// the overflow margin and the returned scene is that tall.
pub fn columnar(
	graph: &mut Graph,
	viewport: Viewport,
	config: &ColumnarConfig,
	theme: &Theme,
	measure: &dyn TextMeasure,
) -> Scene {
	let mut viewport = viewport;
	let mut placed = place(graph, config, viewport);
	let content = realized_height(&placed, config);
	if content > viewport.height {
		viewport.height = content + config.overflow_margin;
		debug!(
			"soil-graph: columnar content {content}px overflows, relaying at {}px",
			viewport.height
		);
		placed = place(graph, config, viewport);
	}

	let mut scene = Scene::empty(viewport, theme);
	for (idx, x, y) in placed {
		let node = &mut graph.nodes[idx];
		let label_width = measure.text_width(&node.id, &theme.node.label_font);
		let marker_x = if node.kind == NodeType::Ingredient {
			x
		} else {
			x + label_width + config.marker_gap
		};
		node.x = Some(marker_x);
		node.y = Some(y);

		scene.nodes.push(NodeGlyph {
			node: Some(idx),
			id: node.id.clone(),
			kind: Some(node.kind),
			x: marker_x,
			y,
			radius: config.marker_radius,
			fill: theme.node_fill(Some(node.kind)),
			label: Label {
				text: node.id.clone(),
				x,
				y,
				dx: config.label_dx,
				dy: config.label_dy,
				rotation: 0.0,
				anchor: TextAnchor::Start,
				font: theme.node.label_font.clone(),
				color: theme.label_color(Some(node.kind)),
				halo: theme.node.label_halo,
			},
		});
	}

	for (idx, link) in graph.links.iter().enumerate() {
		let (sx, sy) = graph.endpoint_position(&link.source);
		let (tx, ty) = graph.endpoint_position(&link.target);
		scene.links.push(LinkGlyph {
			link: Some(idx),
			group: link.group.clone(),
			shape: LinkShape::Horizontal { sx, sy, tx, ty },
			style: link_style(graph, link, theme),
		});
	}
	scene
}
