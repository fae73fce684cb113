//! Tidy tree layout (Reingold–Tilford with Buchheim's linear-time refinement).
//!
//! Produces a breadth coordinate `x` and a depth coordinate `y` for every node
//! of a [`Hierarchy`], scaled so the leftmost and rightmost nodes fit the
//! requested breadth and the deepest level sits at the requested depth.

/// Plain rooted tree stored in pre-order. Index 0 is the root.
#[derive(Clone, Debug)]
pub struct Hierarchy<T> {
	pub nodes: Vec<HierarchyNode<T>>,
}

#[derive(Clone, Debug)]
pub struct HierarchyNode<T> {
	pub data: T,
	pub parent: Option<usize>,
	pub children: Vec<usize>,
	pub depth: usize,
}

impl<T> Hierarchy<T> {
	pub fn new(root: T) -> Self {
		Self {
			nodes: vec![HierarchyNode {
				data: root,
				parent: None,
				children: Vec::new(),
				depth: 0,
			}],
		}
	}

	/// Append a child under `parent` and return its index.
	pub fn push(&mut self, parent: usize, data: T) -> usize {
		let idx = self.nodes.len();
		let depth = self.nodes[parent].depth + 1;
		self.nodes.push(HierarchyNode {
			data,
			parent: Some(parent),
			children: Vec::new(),
			depth,
		});
		self.nodes[parent].children.push(idx);
		idx
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn is_leaf(&self, idx: usize) -> bool {
		self.nodes[idx].children.is_empty()
	}

	/// Indices in pre-order (parents before children, siblings left to right).
	pub fn pre_order(&self) -> Vec<usize> {
		let mut order = Vec::with_capacity(self.nodes.len());
		let mut stack = vec![0];
		while let Some(idx) = stack.pop() {
			order.push(idx);
			stack.extend(self.nodes[idx].children.iter().rev());
		}
		order
	}
}

/// Separation between two neighbouring nodes, in units of the breadth step.
pub type Separation<T> = fn(&Hierarchy<T>, usize, usize) -> f64;

/// Buchheim walk state. Slot 0 is a virtual parent of the root.
#[derive(Clone, Debug, Default)]
struct Walk {
	parent: Option<usize>,
	children: Vec<usize>,
	/// Hierarchy index; `None` for the virtual parent.
	node: Option<usize>,
	/// Sibling index.
	i: usize,
	/// Ancestor pointer used by apportion.
	a: usize,
	/// Default ancestor of this node's children.
	default_ancestor: Option<usize>,
	/// Thread to the next contour node.
	t: Option<usize>,
	z: f64,
	m: f64,
	c: f64,
	s: f64,
}

pub struct TidyTree<T> {
	/// Breadth and depth extents.
	pub size: (f64, f64),
	pub separation: Separation<T>,
}

impl<T> TidyTree<T> {
	pub fn new(size: (f64, f64), separation: Separation<T>) -> Self {
		Self { size, separation }
	}

	/// `(x, y)` for every hierarchy node, indexed like `hierarchy.nodes`.
	pub fn layout(&self, hierarchy: &Hierarchy<T>) -> Vec<(f64, f64)> {
		if hierarchy.is_empty() {
			return Vec::new();
		}
		let mut walk = Tidy {
			w: build_walk(hierarchy),
			hierarchy,
			separation: self.separation,
		};
		walk.first_walk(1);
		walk.w[0].m = -walk.w[1].z;
		let mut x = vec![0.0; hierarchy.len()];
		walk.second_walk(1, &mut x);

		let order = hierarchy.pre_order();
		let (mut left, mut right, mut bottom) = (0, 0, 0);
		for &idx in &order {
			if x[idx] < x[left] {
				left = idx;
			}
			if x[idx] > x[right] {
				right = idx;
			}
			if hierarchy.nodes[idx].depth > hierarchy.nodes[bottom].depth {
				bottom = idx;
			}
		}
		let s = if left == right {
			1.0
		} else {
			(self.separation)(hierarchy, left, right) / 2.0
		};
		let tx = s - x[left];
		let kx = self.size.0 / (x[right] + s + tx);
		let ky = self.size.1 / hierarchy.nodes[bottom].depth.max(1) as f64;

		hierarchy
			.nodes
			.iter()
			.enumerate()
			.map(|(idx, node)| ((x[idx] + tx) * kx, node.depth as f64 * ky))
			.collect()
	}
}

fn build_walk<T>(hierarchy: &Hierarchy<T>) -> Vec<Walk> {
	let mut w: Vec<Walk> = (0..=hierarchy.len()).map(|_| Walk::default()).collect();
	w[0].children = vec![1];
	w[0].a = 0;
	for (idx, node) in hierarchy.nodes.iter().enumerate() {
		let slot = idx + 1;
		w[slot].node = Some(idx);
		w[slot].a = slot;
		w[slot].parent = Some(node.parent.map_or(0, |p| p + 1));
		w[slot].children = node.children.iter().map(|c| c + 1).collect();
	}
	for slot in 0..w.len() {
		let children = w[slot].children.clone();
		for (i, child) in children.into_iter().enumerate() {
			w[child].i = i;
		}
	}
	w
}

struct Tidy<'a, T> {
	w: Vec<Walk>,
	hierarchy: &'a Hierarchy<T>,
	separation: Separation<T>,
}

impl<T> Tidy<'_, T> {
	fn sep(&self, a: usize, b: usize) -> f64 {
		match (self.w[a].node, self.w[b].node) {
			(Some(a), Some(b)) => (self.separation)(self.hierarchy, a, b),
			_ => 1.0,
		}
	}

	fn next_left(&self, v: usize) -> Option<usize> {
		self.w[v].children.first().copied().or(self.w[v].t)
	}

	fn next_right(&self, v: usize) -> Option<usize> {
		self.w[v].children.last().copied().or(self.w[v].t)
	}

	fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
		let change = shift / (self.w[wp].i as f64 - self.w[wm].i as f64);
		self.w[wp].c -= change;
		self.w[wp].s += shift;
		self.w[wm].c += change;
		self.w[wp].z += shift;
		self.w[wp].m += shift;
	}

	fn execute_shifts(&mut self, v: usize) {
		let (mut shift, mut change) = (0.0, 0.0);
		let children = self.w[v].children.clone();
		for &child in children.iter().rev() {
			let w = &mut self.w[child];
			w.z += shift;
			w.m += shift;
			change += w.c;
			shift += w.s + change;
		}
	}

	fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
		let a = self.w[vim].a;
		if self.w[a].parent == self.w[v].parent {
			a
		} else {
			ancestor
		}
	}

	fn first_walk(&mut self, v: usize) {
		let children = self.w[v].children.clone();
		for &child in &children {
			self.first_walk(child);
		}

		let Some(parent) = self.w[v].parent else {
			return;
		};
		let i = self.w[v].i;
		let left = if i > 0 {
			Some(self.w[parent].children[i - 1])
		} else {
			None
		};

		if let (Some(&first), Some(&last)) = (children.first(), children.last()) {
			self.execute_shifts(v);
			let midpoint = (self.w[first].z + self.w[last].z) / 2.0;
			if let Some(l) = left {
				self.w[v].z = self.w[l].z + self.sep(v, l);
				self.w[v].m = self.w[v].z - midpoint;
			} else {
				self.w[v].z = midpoint;
			}
		} else if let Some(l) = left {
			self.w[v].z = self.w[l].z + self.sep(v, l);
		}

		let ancestor = self.w[parent]
			.default_ancestor
			.unwrap_or(self.w[parent].children[0]);
		let ancestor = self.apportion(v, left, ancestor);
		self.w[parent].default_ancestor = Some(ancestor);
	}

	fn apportion(&mut self, v: usize, left: Option<usize>, mut ancestor: usize) -> usize {
		let Some(left) = left else {
			return ancestor;
		};
		let Some(parent) = self.w[v].parent else {
			return ancestor;
		};
		let (mut vip, mut vop, mut vim) = (v, v, left);
		let mut vom = self.w[parent].children[0];
		let (mut sip, mut sop) = (self.w[vip].m, self.w[vop].m);
		let (mut sim, mut som) = (self.w[vim].m, self.w[vom].m);

		let (mut next_im, mut next_ip) = (self.next_right(vim), self.next_left(vip));
		while let (Some(im), Some(ip)) = (next_im, next_ip) {
			vim = im;
			vip = ip;
			let (Some(om), Some(op)) = (self.next_left(vom), self.next_right(vop)) else {
				break;
			};
			vom = om;
			vop = op;
			self.w[vop].a = v;
			let shift = self.w[vim].z + sim - self.w[vip].z - sip + self.sep(vim, vip);
			if shift > 0.0 {
				let wm = self.next_ancestor(vim, v, ancestor);
				self.move_subtree(wm, v, shift);
				sip += shift;
				sop += shift;
			}
			sim += self.w[vim].m;
			sip += self.w[vip].m;
			som += self.w[vom].m;
			sop += self.w[vop].m;
			next_im = self.next_right(vim);
			next_ip = self.next_left(vip);
		}

		if let Some(im) = next_im {
			if self.next_right(vop).is_none() {
				self.w[vop].t = Some(im);
				self.w[vop].m += sim - sop;
			}
		}
		if let Some(ip) = next_ip {
			if self.next_left(vom).is_none() {
				self.w[vom].t = Some(ip);
				self.w[vom].m += sip - som;
				ancestor = v;
			}
		}
		ancestor
	}

	fn second_walk(&mut self, v: usize, x: &mut [f64]) {
		let parent_m = self.w[v].parent.map_or(0.0, |p| self.w[p].m);
		if let Some(node) = self.w[v].node {
			x[node] = self.w[v].z + parent_m;
		}
		self.w[v].m += parent_m;
		let children = self.w[v].children.clone();
		for child in children {
			self.second_walk(child, x);
		}
	}
}
