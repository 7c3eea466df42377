use log::debug;
use rand::Rng;
use rand::rngs::SmallRng;

use super::color::recolor;
use super::ids::{IdAllocator, max_suffix};
use super::types::{NEW_NODE_TEXT, Node, NodeId};

/// Horizontal distance from the root at which new nodes appear.
pub const NEW_NODE_OFFSET: f64 = 150.0;
/// New nodes are jittered vertically within `[-NEW_NODE_JITTER, NEW_NODE_JITTER)`.
pub const NEW_NODE_JITTER: f64 = 25.0;

/// Owner of the durable node collection.
///
/// Every mutation builds the next collection from the previous one and then
/// recolors it as a whole, so colors always match positions afterwards.
pub struct GraphStore {
	nodes: Vec<Node>,
	ids: IdAllocator,
	rng: SmallRng,
}

impl GraphStore {
	pub fn new(nodes: Vec<Node>, ids: IdAllocator, rng: SmallRng) -> Self {
		Self {
			nodes: recolor(nodes, &NodeId::root()),
			ids,
			rng,
		}
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn node(&self, id: &NodeId) -> Option<&Node> {
		self.nodes.iter().find(|n| &n.id == id)
	}

	pub fn root(&self) -> Option<&Node> {
		self.nodes.iter().find(|n| n.is_root())
	}

	pub fn ids(&self) -> &IdAllocator {
		&self.ids
	}

	fn commit(&mut self, next: Vec<Node>) {
		self.nodes = recolor(next, &NodeId::root());
	}

	/// Add a node to the right of the root. Returns `None` when there is no root.
	pub fn add_node(&mut self) -> Option<NodeId> {
		let (root_x, root_y) = self.root()?.position();
		let id = loop {
			let id = self.ids.next();
			if self.node(&id).is_none() {
				break id;
			}
		};
		let jitter = self.rng.gen_range(-NEW_NODE_JITTER..NEW_NODE_JITTER);

		let mut next = self.nodes.clone();
		next.push(Node {
			id: id.clone(),
			text: NEW_NODE_TEXT.to_owned(),
			x: root_x + NEW_NODE_OFFSET,
			y: root_y + jitter,
			connections: Vec::new(),
			color: None,
		});
		self.commit(next);
		debug!("added node {id}");
		Some(id)
	}

	/// Remove a node and every connection pointing at it. The root is kept.
	pub fn delete_node(&mut self, id: &NodeId) {
		if id.is_root() {
			return;
		}
		let next = self
			.nodes
			.iter()
			.filter(|n| &n.id != id)
			.cloned()
			.map(|mut n| {
				n.connections.retain(|c| c != id);
				n
			})
			.collect();
		self.commit(next);
		debug!("deleted node {id}");
	}

	pub fn update_text(&mut self, id: &NodeId, text: impl Into<String>) {
		let text = text.into();
		let next = self
			.nodes
			.iter()
			.cloned()
			.map(|mut n| {
				if &n.id == id {
					n.text = text.clone();
				}
				n
			})
			.collect();
		self.commit(next);
	}

	/// Add the edge `from -> to` unless it is already present or either end
	/// is unknown.
	pub fn connect(&mut self, from: &NodeId, to: &NodeId) {
		if self.node(to).is_none() {
			return;
		}
		match self.node(from) {
			Some(source) if !source.connects_to(to) => {}
			_ => return,
		}
		let next = self
			.nodes
			.iter()
			.cloned()
			.map(|mut n| {
				if &n.id == from {
					n.connections.push(to.clone());
				}
				n
			})
			.collect();
		self.commit(next);
		debug!("connected {from} -> {to}");
	}

	pub fn disconnect(&mut self, from: &NodeId, to: &NodeId) {
		let next = self
			.nodes
			.iter()
			.cloned()
			.map(|mut n| {
				if &n.id == from {
					n.connections.retain(|c| c != to);
				}
				n
			})
			.collect();
		self.commit(next);
		debug!("disconnected {from} -> {to}");
	}

	/// Reposition a node. Unknown ids leave the graph untouched.
	pub fn move_node(&mut self, id: &NodeId, x: f64, y: f64) {
		if self.node(id).is_none() {
			return;
		}
		let next = self
			.nodes
			.iter()
			.cloned()
			.map(|mut n| {
				if &n.id == id {
					n.x = x;
					n.y = y;
				}
				n
			})
			.collect();
		self.commit(next);
	}

	/// Swap in a whole new collection and continue id numbering after it.
	pub fn replace(&mut self, nodes: Vec<Node>) {
		self.ids.reset(max_suffix(&nodes));
		self.commit(nodes);
	}
}
