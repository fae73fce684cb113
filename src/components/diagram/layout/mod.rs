//! Layout strategies and the scene they produce.
//!
//! Every layout is a pure function of its inputs and the viewport: it writes
//! positions onto the graph's nodes and returns a [`Scene`] of glyphs ready for
//! a [`RenderBackend`](super::render::RenderBackend). Nothing carries over
//! between renders; a resize simply runs the layout again.

use std::fmt;
use std::str::FromStr;

use super::theme::{Color, Theme};
use super::types::{Graph, Link, NodeType};

mod columnar;
mod force;
mod radial;
mod ring;
mod tidy;

pub use columnar::{ColumnarConfig, columnar};
pub use force::{CenterNode, ForceConfig, ForceSimulation, force_scene};
pub use radial::{RadialConfig, radial};
pub use ring::{RingConfig, RingSpec, ring};
pub use tidy::{Hierarchy, TidyTree};

/// Drawing surface size in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}
}

/// Which layout a surface renders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutKind {
	/// Nodes in type columns; the collapsible tree view.
	Columnar,
	/// Tidy tree of the category groups around a circle.
	Radial,
	/// Physics simulation of the supply/demand network.
	#[default]
	Force,
	/// Concentric type rings around a centre node.
	Ring,
}

impl LayoutKind {
	/// Layouts that keep re-rendering until the simulation settles.
	pub fn is_animated(self) -> bool {
		matches!(self, LayoutKind::Force)
	}
}

impl FromStr for LayoutKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"columnar" | "tree" | "collapsable" => Ok(LayoutKind::Columnar),
			"radial" => Ok(LayoutKind::Radial),
			"force" | "network" => Ok(LayoutKind::Force),
			"ring" => Ok(LayoutKind::Ring),
			other => Err(format!("unknown layout {other:?}")),
		}
	}
}

impl fmt::Display for LayoutKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			LayoutKind::Columnar => "columnar",
			LayoutKind::Radial => "radial",
			LayoutKind::Force => "force",
			LayoutKind::Ring => "ring",
		})
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
	Start,
	Middle,
	End,
}

impl TextAnchor {
	/// Canvas `textAlign` value.
	pub fn as_align(self) -> &'static str {
		match self {
			TextAnchor::Start => "start",
			TextAnchor::Middle => "center",
			TextAnchor::End => "end",
		}
	}
}

/// Label text placed relative to its node.
///
/// The frame is the node position rotated by `rotation` degrees; `dx`/`dy`
/// offset the text inside that frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
	pub text: String,
	pub x: f64,
	pub y: f64,
	pub dx: f64,
	pub dy: f64,
	pub rotation: f64,
	pub anchor: TextAnchor,
	pub font: String,
	pub color: Color,
	pub halo: Option<Color>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeGlyph {
	/// Index into `Graph::nodes`; `None` for hierarchy-only glyphs.
	pub node: Option<usize>,
	pub id: String,
	pub kind: Option<NodeType>,
	pub x: f64,
	pub y: f64,
	pub radius: f64,
	pub fill: Color,
	pub label: Label,
}

/// Geometry of a link, serialisable as SVG path data.
#[derive(Clone, Debug, PartialEq)]
pub enum LinkShape {
	/// Horizontal cubic link between two points.
	Horizontal { sx: f64, sy: f64, tx: f64, ty: f64 },
	/// Clockwise circular arc of the given radius.
	Arc {
		sx: f64,
		sy: f64,
		tx: f64,
		ty: f64,
		radius: f64,
	},
	/// Radial bump curve between polar points around `(cx, cy)`.
	RadialBump {
		cx: f64,
		cy: f64,
		a0: f64,
		r0: f64,
		a1: f64,
		r1: f64,
	},
}

/// Polar to cartesian with angle zero pointing up.
pub fn point_radial(angle: f64, radius: f64) -> (f64, f64) {
	let a = angle - std::f64::consts::FRAC_PI_2;
	(radius * a.cos(), radius * a.sin())
}

impl LinkShape {
	pub fn to_path(&self) -> String {
		match *self {
			LinkShape::Horizontal { sx, sy, tx, ty } => {
				let mx = (sx + tx) / 2.0;
				format!("M{sx},{sy}C{mx},{sy},{mx},{ty},{tx},{ty}")
			}
			LinkShape::Arc {
				sx,
				sy,
				tx,
				ty,
				radius,
			} => format!("M{sx},{sy}A{radius},{radius} 0 0,1 {tx},{ty}"),
			LinkShape::RadialBump {
				cx,
				cy,
				a0,
				r0,
				a1,
				r1,
			} => {
				let rm = (r0 + r1) / 2.0;
				let at = |a: f64, r: f64| {
					let (x, y) = point_radial(a, r);
					(cx + x, cy + y)
				};
				let (p0, p1, p2, p3) = (at(a0, r0), at(a0, rm), at(a1, rm), at(a1, r1));
				format!(
					"M{},{}C{},{},{},{},{},{}",
					p0.0, p0.1, p1.0, p1.1, p2.0, p2.1, p3.0, p3.1
				)
			}
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkStyle {
	pub color: Color,
	pub width: f64,
	pub opacity: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkGlyph {
	/// Index into `Graph::links`; `None` for hierarchy-only links.
	pub link: Option<usize>,
	/// Highlight group: the id of the output owning this link.
	pub group: Option<String>,
	pub shape: LinkShape,
	pub style: LinkStyle,
}

/// A circle drawn behind the graph (ring guides).
#[derive(Clone, Debug, PartialEq)]
pub struct Guide {
	pub cx: f64,
	pub cy: f64,
	pub r: f64,
	pub color: Color,
}

/// Everything a backend needs to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
	/// Surface size; may be taller than the window after overflow correction.
	pub viewport: Viewport,
	pub background: Color,
	pub guides: Vec<Guide>,
	pub links: Vec<LinkGlyph>,
	pub nodes: Vec<NodeGlyph>,
}

impl Scene {
	pub fn empty(viewport: Viewport, theme: &Theme) -> Self {
		Self {
			viewport,
			background: theme.background,
			guides: Vec::new(),
			links: Vec::new(),
			nodes: Vec::new(),
		}
	}
}

/// Resting style for a graph link under `theme`.
pub(crate) fn link_style(graph: &Graph, link: &Link, theme: &Theme) -> LinkStyle {
	let source = graph.node(&link.source).map(|n| n.kind);
	LinkStyle {
		color: theme.link_color(source),
		width: theme.edge.width,
		opacity: theme.edge.opacity,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn horizontal_link_bends_at_midpoint() {
		let shape = LinkShape::Horizontal {
			sx: 0.0,
			sy: 10.0,
			tx: 100.0,
			ty: 50.0,
		};
		assert_eq!(shape.to_path(), "M0,10C50,10,50,50,100,50");
	}

	#[test]
	fn arc_path_uses_sweep_flag() {
		let shape = LinkShape::Arc {
			sx: 1.0,
			sy: 2.0,
			tx: 4.0,
			ty: 6.0,
			radius: 5.0,
		};
		assert_eq!(shape.to_path(), "M1,2A5,5 0 0,1 4,6");
	}

	#[test]
	fn radial_zero_angle_points_up() {
		let (x, y) = point_radial(0.0, 10.0);
		assert!(x.abs() < 1e-9);
		assert!((y + 10.0).abs() < 1e-9);
	}

	#[test]
	fn layout_names_parse() {
		assert_eq!("Ring".parse::<LayoutKind>(), Ok(LayoutKind::Ring));
		assert_eq!("network".parse::<LayoutKind>(), Ok(LayoutKind::Force));
		assert!("spiral".parse::<LayoutKind>().is_err());
		assert_eq!(LayoutKind::Columnar.to_string(), "columnar");
	}
}
