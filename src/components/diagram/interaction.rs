//! Pointer interaction: pan, hit testing, hover highlight and click actions.

use std::borrow::Cow;

use super::layout::{LayoutKind, LinkGlyph, LinkStyle, NodeGlyph, Scene};
use super::theme::Theme;
use super::types::NodeType;

/// Pan offset applied to the whole scene. Zoom is not supported.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
}

impl ViewTransform {
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(sx - self.x, sy - self.y)
	}
}

/// Tracks an in-progress background drag.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

impl PanState {
	pub fn begin(&mut self, x: f64, y: f64, transform: &ViewTransform) {
		self.active = true;
		self.start_x = x;
		self.start_y = y;
		self.transform_start_x = transform.x;
		self.transform_start_y = transform.y;
	}

	/// Move `transform` with the pointer. Returns whether a pan is in progress.
	pub fn drag(&self, x: f64, y: f64, transform: &mut ViewTransform) -> bool {
		if !self.active {
			return false;
		}
		transform.x = self.transform_start_x + (x - self.start_x);
		transform.y = self.transform_start_y + (y - self.start_y);
		true
	}

	pub fn end(&mut self) {
		self.active = false;
	}
}

/// Minimum pointer distance that counts as a hit, in graph units.
pub const HIT_RADIUS: f64 = 8.0;

/// Index of the glyph under the pointer. Later glyphs are drawn on top, so the
/// last match wins.
pub fn node_at(scene: &Scene, transform: &ViewTransform, sx: f64, sy: f64) -> Option<usize> {
	let (gx, gy) = transform.screen_to_graph(sx, sy);
	let mut found = None;
	for (i, glyph) in scene.nodes.iter().enumerate() {
		let (dx, dy) = (glyph.x - gx, glyph.y - gy);
		if (dx * dx + dy * dy).sqrt() <= glyph.radius.max(HIT_RADIUS) {
			found = Some(i);
		}
	}
	found
}

/// What happens to links outside the hovered group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoverPolicy {
	/// Drop them to opacity 0.
	Hide,
	/// Leave them at their resting style.
	KeepDefault,
}

impl HoverPolicy {
	pub fn for_layout(kind: LayoutKind) -> Self {
		match kind {
			LayoutKind::Force | LayoutKind::Columnar => HoverPolicy::Hide,
			LayoutKind::Ring | LayoutKind::Radial => HoverPolicy::KeepDefault,
		}
	}
}

/// Hover highlight over link groups.
///
/// Only output nodes start a highlight; the links whose group equals the
/// hovered id are emphasised. The scene itself is never modified, so clearing
/// the hover restores every link exactly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HighlightState {
	hovered: Option<String>,
}

impl HighlightState {
	/// Update from the glyph under the pointer. Returns `true` when the
	/// highlighted group changed and the surface needs a redraw.
	pub fn set_hover(&mut self, glyph: Option<&NodeGlyph>) -> bool {
		let group = glyph
			.filter(|g| g.kind == Some(NodeType::Output))
			.map(|g| g.id.clone());
		if self.hovered == group {
			return false;
		}
		self.hovered = group;
		true
	}

	pub fn clear(&mut self) -> bool {
		self.set_hover(None)
	}

	pub fn hovered(&self) -> Option<&str> {
		self.hovered.as_deref()
	}

	pub fn link_style(&self, link: &LinkGlyph, theme: &Theme, policy: HoverPolicy) -> LinkStyle {
		let Some(hovered) = self.hovered.as_deref() else {
			return link.style.clone();
		};
		if link.group.as_deref() == Some(hovered) {
			LinkStyle {
				color: theme.edge.highlight,
				width: theme.edge.highlight_width,
				opacity: 1.0,
			}
		} else {
			match policy {
				HoverPolicy::Hide => LinkStyle {
					opacity: 0.0,
					..link.style.clone()
				},
				HoverPolicy::KeepDefault => link.style.clone(),
			}
		}
	}

	/// The scene as it should be drawn under the current hover.
	pub fn styled<'a>(&self, scene: &'a Scene, theme: &Theme, policy: HoverPolicy) -> Cow<'a, Scene> {
		if self.hovered.is_none() {
			return Cow::Borrowed(scene);
		}
		let mut styled = scene.clone();
		for link in &mut styled.links {
			link.style = self.link_style(link, theme, policy);
		}
		Cow::Owned(styled)
	}
}

/// Response to a click on a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickAction {
	/// Open the detail panel from the node's originating record.
	ShowDetail,
	/// Route to the node's page.
	Navigate,
	None,
}

impl ClickAction {
	/// Nodes built from spreadsheet rows open their record; network nodes
	/// carry none and route to their page instead.
	pub fn for_click(kind: LayoutKind, has_record: bool) -> Self {
		match (kind, has_record) {
			(LayoutKind::Radial, _) => ClickAction::None,
			(LayoutKind::Columnar | LayoutKind::Force, true) => ClickAction::ShowDetail,
			(LayoutKind::Columnar, false) => ClickAction::None,
			(LayoutKind::Force | LayoutKind::Ring, _) => ClickAction::Navigate,
		}
	}
}

/// Route for a node page; `None` for blank ids.
pub fn node_route(id: &str) -> Option<String> {
	if id.trim().is_empty() {
		None
	} else {
		Some(format!("/node/{id}"))
	}
}
