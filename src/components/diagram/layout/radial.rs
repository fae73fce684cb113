//! Radial tidy tree of the normalized category groups.

use std::f64::consts::{PI, TAU};

use log::debug;

use super::super::normalize::{Category, CategoryRoot};
use super::super::theme::Theme;
use super::super::types::NodeType;
use super::tidy::{Hierarchy, TidyTree};
use super::{
	Label, LinkGlyph, LinkShape, LinkStyle, NodeGlyph, Scene, TextAnchor, Viewport, point_radial,
};

/// Sizes and label offsets for [`radial`].
#[derive(Clone, Debug)]
pub struct RadialConfig {
	/// Subtracted from half the short side to get the outer radius.
	pub margin: f64,
	/// Origin offset from the centre, as a fraction of width and height.
	pub origin_offset: f64,
	pub node_radius: f64,
	/// Label distance from the marker along the radius.
	pub label_dx: f64,
	/// Baseline shift in ems.
	pub label_dy_em: f64,
}

impl Default for RadialConfig {
	fn default() -> Self {
		Self {
			margin: 150.0,
			origin_offset: 0.01,
			node_radius: 2.5,
			label_dx: 6.0,
			label_dy_em: 0.31,
		}
	}
}

struct Item {
	name: String,
	kind: Option<NodeType>,
}

fn node_type(category: Category) -> NodeType {
	match category {
		Category::Ingredients => NodeType::Ingredient,
		Category::Modifiers => NodeType::Modifier,
		Category::Fabrication => NodeType::Fabrication,
		Category::Output => NodeType::Output,
	}
}

fn hierarchy(root: &CategoryRoot) -> Hierarchy<Item> {
	let mut h = Hierarchy::new(Item {
		name: root.name.clone(),
		kind: None,
	});
	for group in &root.children {
		let g = h.push(
			0,
			Item {
				name: group.category.label().to_string(),
				kind: None,
			},
		);
		for leaf in &group.children {
			h.push(
				g,
				Item {
					name: leaf.name.clone(),
					kind: Some(node_type(group.category)),
				},
			);
		}
	}
	h
}

fn separation(h: &Hierarchy<Item>, a: usize, b: usize) -> f64 {
	let base = if h.nodes[a].parent == h.nodes[b].parent { 1.0 } else { 2.0 };
	base / h.nodes[a].depth.max(1) as f64
}

/// Pixel size from a CSS font shorthand such as `"bold 10px sans-serif"`.
fn font_px(font: &str) -> f64 {
	font.split_whitespace()
		.find_map(|part| part.strip_suffix("px")?.parse().ok())
		.unwrap_or(10.0)
}

/// Tidy tree of the category groups laid out around a circle.
pub fn radial(root: &CategoryRoot, viewport: Viewport, config: &RadialConfig, theme: &Theme) -> Scene {
	let h = hierarchy(root);
	let radius = (viewport.width.min(viewport.height) / 2.0 - config.margin).max(0.0);
	let positions = TidyTree::new((TAU, radius), separation).layout(&h);
	let (cx, cy) = viewport.center();
	let (ox, oy) = (
		cx + viewport.width * config.origin_offset,
		cy + viewport.height * config.origin_offset,
	);
	debug!(
		"soil-graph: radial tree of {} nodes, radius {radius}",
		h.len()
	);

	let mut scene = Scene::empty(viewport, theme);
	let dy = config.label_dy_em * font_px(&theme.node.label_font);
	let order = h.pre_order();

	for &idx in &order {
		let Some(parent) = h.nodes[idx].parent else {
			continue;
		};
		let (a0, r0) = positions[parent];
		let (a1, r1) = positions[idx];
		scene.links.push(LinkGlyph {
			link: None,
			group: None,
			shape: LinkShape::RadialBump {
				cx: ox,
				cy: oy,
				a0,
				r0,
				a1,
				r1,
			},
			style: LinkStyle {
				color: theme.edge.color,
				width: theme.edge.width,
				opacity: theme.edge.opacity,
			},
		});
	}

	for &idx in &order {
		let (angle, r) = positions[idx];
		let (px, py) = point_radial(angle, r);
		let (x, y) = (ox + px, oy + py);
		let is_leaf = h.is_leaf(idx);
		let outward = (angle < PI) == is_leaf;
		let mut rotation = angle * 180.0 / PI - 90.0;
		if angle >= PI {
			rotation += 180.0;
		}
		let item = &h.nodes[idx].data;

		scene.nodes.push(NodeGlyph {
			node: None,
			id: item.name.clone(),
			kind: item.kind,
			x,
			y,
			radius: config.node_radius,
			fill: if is_leaf {
				theme.node.fill
			} else {
				theme.node.branch_fill
			},
			label: Label {
				text: item.name.clone(),
				x,
				y,
				dx: if outward { config.label_dx } else { -config.label_dx },
				dy,
				rotation,
				anchor: if outward {
					TextAnchor::Start
				} else {
					TextAnchor::End
				},
				font: theme.node.label_font.clone(),
				color: theme.node.label,
				halo: theme.node.label_halo,
			},
		});
	}
	scene
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::diagram::normalize::{CategoryGroup, Leaf};

	fn leaf(name: &str) -> Leaf {
		Leaf {
			name: name.to_string(),
			id: None,
		}
	}

	fn two_leaves() -> CategoryRoot {
		CategoryRoot {
			name: "Process".to_string(),
			children: vec![CategoryGroup {
				category: Category::Ingredients,
				children: vec![leaf("Ingredient - Hemp"), leaf("Ingredient - Flax")],
			}],
		}
	}

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-6
	}

	#[test]
	fn cousins_sit_twice_as_far_apart_as_siblings() {
		let root = CategoryRoot {
			name: "Process".to_string(),
			children: vec![
				CategoryGroup {
					category: Category::Ingredients,
					children: vec![leaf("Ingredient - Hemp"), leaf("Ingredient - Flax")],
				},
				CategoryGroup {
					category: Category::Modifiers,
					children: vec![leaf("Modifier - Cutting"), leaf("Modifier - Soaking")],
				},
			],
		};
		let h = hierarchy(&root);
		assert!(close(separation(&h, 2, 3), 0.5));
		assert!(close(separation(&h, 3, 5), 1.0));
		assert!(close(separation(&h, 1, 4), 1.0));

		let angles: Vec<f64> = TidyTree::new((TAU, 100.0), separation)
			.layout(&h)
			.into_iter()
			.map(|(a, _)| a)
			.collect();
		let sibling = angles[3] - angles[2];
		assert!(sibling > 0.0);
		assert!(close(angles[6] - angles[5], sibling));
		assert!(close(angles[5] - angles[3], 2.0 * sibling));
	}

	#[test]
	fn root_sits_at_offset_origin() {
		let scene = radial(
			&two_leaves(),
			Viewport::new(800.0, 800.0),
			&RadialConfig::default(),
			&Theme::radial(),
		);
		assert_eq!(scene.nodes[0].id, "Process");
		assert!(close(scene.nodes[0].x, 408.0));
		assert!(close(scene.nodes[0].y, 408.0));
	}

	#[test]
	fn labels_face_outward_on_both_halves() {
		let scene = radial(
			&two_leaves(),
			Viewport::new(800.0, 800.0),
			&RadialConfig::default(),
			&Theme::radial(),
		);
		let hemp = &scene.nodes[2];
		let flax = &scene.nodes[3];
		// Right half, outer ring.
		assert!(close(hemp.x, 408.0 + 250.0));
		assert!(close(hemp.y, 408.0));
		assert_eq!(hemp.label.anchor, TextAnchor::Start);
		assert_eq!(hemp.label.dx, 6.0);
		assert!(close(hemp.label.rotation, 0.0));
		// Left half flips.
		assert_eq!(flax.label.anchor, TextAnchor::End);
		assert_eq!(flax.label.dx, -6.0);
		assert!(close(flax.label.rotation, 360.0));
		assert_eq!(hemp.kind, Some(NodeType::Ingredient));
	}

	#[test]
	fn branches_are_darker_and_linked_to_children() {
		let theme = Theme::radial();
		let scene = radial(
			&two_leaves(),
			Viewport::new(800.0, 800.0),
			&RadialConfig::default(),
			&theme,
		);
		assert_eq!(scene.nodes[1].fill, theme.node.branch_fill);
		assert_eq!(scene.nodes[2].fill, theme.node.fill);
		assert_eq!(scene.links.len(), 3);
		assert!(scene.links.iter().all(|l| l.link.is_none() && l.group.is_none()));
		assert!(close(scene.nodes[2].label.dy, 3.1));
	}

	#[test]
	fn font_size_is_read_from_shorthand() {
		assert_eq!(font_px("bold 12px sans-serif"), 12.0);
		assert_eq!(font_px("serif"), 10.0);
	}
}
