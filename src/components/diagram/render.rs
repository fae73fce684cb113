//! Drawing a [`Scene`] onto a surface.
//!
//! Layouts only produce scenes; a [`RenderBackend`] turns one into pixels.
//! Draw order is background, guides, links, markers, then labels so text stays
//! readable over everything else.

use std::f64::consts::PI;

use log::warn;
use web_sys::{CanvasRenderingContext2d, Path2d};

use super::interaction::ViewTransform;
use super::layout::{Label, Scene, TextAnchor};
use super::theme::Color;

/// Width of rendered text, used by layouts that place markers after labels.
pub trait TextMeasure {
	fn text_width(&self, text: &str, font: &str) -> f64;
}

/// Fixed advance per character. Used when no real text metrics are available.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMeasure {
	pub char_width: f64,
}

impl Default for MonospaceMeasure {
	fn default() -> Self {
		Self { char_width: 7.0 }
	}
}

impl TextMeasure for MonospaceMeasure {
	fn text_width(&self, text: &str, _font: &str) -> f64 {
		text.chars().count() as f64 * self.char_width
	}
}

/// A drawing surface.
pub trait RenderBackend: TextMeasure {
	fn clear(&mut self, width: f64, height: f64, background: Color);
	/// Enter graph space.
	fn push_transform(&mut self, transform: &ViewTransform);
	fn pop_transform(&mut self);
	fn circle(&mut self, x: f64, y: f64, r: f64, fill: Option<Color>, stroke: Option<Color>);
	/// Stroke SVG path data.
	fn path(&mut self, d: &str, color: Color, width: f64, opacity: f64);
	fn text(&mut self, label: &Label);
}

/// Draws `scene` under the pan `transform`.
pub fn draw_scene<B: RenderBackend + ?Sized>(backend: &mut B, scene: &Scene, transform: &ViewTransform) {
	backend.clear(scene.viewport.width, scene.viewport.height, scene.background);
	backend.push_transform(transform);

	for guide in &scene.guides {
		backend.circle(guide.cx, guide.cy, guide.r, None, Some(guide.color));
	}
	for link in &scene.links {
		if link.style.opacity <= 0.0 {
			continue;
		}
		backend.path(
			&link.shape.to_path(),
			link.style.color,
			link.style.width,
			link.style.opacity,
		);
	}
	for node in &scene.nodes {
		backend.circle(node.x, node.y, node.radius, Some(node.fill), None);
	}
	for node in &scene.nodes {
		backend.text(&node.label);
	}

	backend.pop_transform();
}

/// [`RenderBackend`] over a 2D canvas context.
pub struct CanvasBackend {
	ctx: CanvasRenderingContext2d,
	fallback: MonospaceMeasure,
}

impl CanvasBackend {
	pub fn new(ctx: CanvasRenderingContext2d) -> Self {
		Self {
			ctx,
			fallback: MonospaceMeasure::default(),
		}
	}
}

impl TextMeasure for CanvasBackend {
	fn text_width(&self, text: &str, font: &str) -> f64 {
		self.ctx.set_font(font);
		match self.ctx.measure_text(text) {
			Ok(metrics) => metrics.width(),
			Err(_) => self.fallback.text_width(text, font),
		}
	}
}

impl RenderBackend for CanvasBackend {
	fn clear(&mut self, width: f64, height: f64, background: Color) {
		self.ctx.set_fill_style_str(&background.to_css());
		self.ctx.fill_rect(0.0, 0.0, width, height);
	}

	fn push_transform(&mut self, transform: &ViewTransform) {
		self.ctx.save();
		let _ = self.ctx.translate(transform.x, transform.y);
	}

	fn pop_transform(&mut self) {
		self.ctx.restore();
	}

	fn circle(&mut self, x: f64, y: f64, r: f64, fill: Option<Color>, stroke: Option<Color>) {
		self.ctx.begin_path();
		let _ = self.ctx.arc(x, y, r, 0.0, 2.0 * PI);
		if let Some(fill) = fill {
			self.ctx.set_fill_style_str(&fill.to_css());
			self.ctx.fill();
		}
		if let Some(stroke) = stroke {
			self.ctx.set_stroke_style_str(&stroke.to_css());
			self.ctx.set_line_width(1.0);
			self.ctx.stroke();
		}
	}

	fn path(&mut self, d: &str, color: Color, width: f64, opacity: f64) {
		let path = match Path2d::new_with_path_string(d) {
			Ok(path) => path,
			Err(err) => {
				warn!("soil-graph: bad link path {d:?}: {err:?}");
				return;
			}
		};
		let _ = self.ctx.set_line_dash(&js_sys::Array::new());
		self.ctx.set_global_alpha(opacity);
		self.ctx.set_stroke_style_str(&color.to_css());
		self.ctx.set_line_width(width);
		self.ctx.stroke_with_path(&path);
		self.ctx.set_global_alpha(1.0);
	}

	fn text(&mut self, label: &Label) {
		let ctx = &self.ctx;
		ctx.save();
		let _ = ctx.translate(label.x, label.y);
		if label.rotation != 0.0 {
			let _ = ctx.rotate(label.rotation.to_radians());
		}
		ctx.set_font(&label.font);
		ctx.set_text_align(label.anchor.as_align());
		ctx.set_text_baseline(match label.anchor {
			TextAnchor::Middle => "middle",
			TextAnchor::Start | TextAnchor::End => "alphabetic",
		});
		if let Some(halo) = label.halo {
			ctx.set_line_join("round");
			ctx.set_line_width(3.0);
			ctx.set_stroke_style_str(&halo.to_css());
			let _ = ctx.stroke_text(&label.text, label.dx, label.dy);
		}
		ctx.set_fill_style_str(&label.color.to_css());
		let _ = ctx.fill_text(&label.text, label.dx, label.dy);
		ctx.restore();
	}
}

/// One recorded drawing call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
	Clear { width: f64, height: f64 },
	Push(ViewTransform),
	Pop,
	Circle { x: f64, y: f64, r: f64, filled: bool },
	Path { d: String, color: Color, width: f64, opacity: f64 },
	Text { text: String, x: f64, y: f64 },
}

/// Headless backend that records calls instead of drawing.
#[derive(Clone, Debug, Default)]
pub struct RecordingBackend {
	pub ops: Vec<DrawOp>,
	pub measure: MonospaceMeasure,
}

impl RecordingBackend {
	pub fn paths(&self) -> impl Iterator<Item = &DrawOp> {
		self.ops.iter().filter(|op| matches!(op, DrawOp::Path { .. }))
	}
}

impl TextMeasure for RecordingBackend {
	fn text_width(&self, text: &str, font: &str) -> f64 {
		self.measure.text_width(text, font)
	}
}

impl RenderBackend for RecordingBackend {
	fn clear(&mut self, width: f64, height: f64, _background: Color) {
		self.ops.push(DrawOp::Clear { width, height });
	}

	fn push_transform(&mut self, transform: &ViewTransform) {
		self.ops.push(DrawOp::Push(*transform));
	}

	fn pop_transform(&mut self) {
		self.ops.push(DrawOp::Pop);
	}

	fn circle(&mut self, x: f64, y: f64, r: f64, fill: Option<Color>, _stroke: Option<Color>) {
		self.ops.push(DrawOp::Circle {
			x,
			y,
			r,
			filled: fill.is_some(),
		});
	}

	fn path(&mut self, d: &str, color: Color, width: f64, opacity: f64) {
		self.ops.push(DrawOp::Path {
			d: d.to_string(),
			color,
			width,
			opacity,
		});
	}

	fn text(&mut self, label: &Label) {
		self.ops.push(DrawOp::Text {
			text: label.text.clone(),
			x: label.x,
			y: label.y,
		});
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::diagram::layout::{Guide, LinkGlyph, LinkShape, LinkStyle, Viewport};
	use crate::components::diagram::theme::Theme;

	fn scene() -> Scene {
		let theme = Theme::ring();
		let mut scene = Scene::empty(Viewport::new(200.0, 100.0), &theme);
		scene.guides.push(Guide {
			cx: 100.0,
			cy: 50.0,
			r: 40.0,
			color: theme.guide,
		});
		for opacity in [1.0, 0.0] {
			scene.links.push(LinkGlyph {
				link: None,
				group: None,
				shape: LinkShape::Horizontal {
					sx: 0.0,
					sy: 0.0,
					tx: 10.0,
					ty: 10.0,
				},
				style: LinkStyle {
					color: theme.edge.color,
					width: 1.0,
					opacity,
				},
			});
		}
		scene
	}

	#[test]
	fn monospace_counts_chars() {
		let m = MonospaceMeasure { char_width: 6.0 };
		assert_eq!(m.text_width("Hemp", "12px sans-serif"), 24.0);
		assert_eq!(m.text_width("Ø", "x"), 6.0);
	}

	#[test]
	fn draws_in_layer_order_and_skips_hidden_links() {
		let mut backend = RecordingBackend::default();
		let pan = ViewTransform { x: 3.0, y: 4.0 };
		draw_scene(&mut backend, &scene(), &pan);
		assert_eq!(backend.ops, vec![
			DrawOp::Clear {
				width: 200.0,
				height: 100.0
			},
			DrawOp::Push(pan),
			DrawOp::Circle {
				x: 100.0,
				y: 50.0,
				r: 40.0,
				filled: false
			},
			DrawOp::Path {
				d: "M0,0C5,0,5,10,10,10".to_string(),
				color: Theme::ring().edge.color,
				width: 1.0,
				opacity: 1.0
			},
			DrawOp::Pop,
		]);
	}
}
