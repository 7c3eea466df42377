use std::fmt;

use serde::{Deserialize, Serialize};

pub const ROOT_ID: &str = "ROOT";
pub const NODE_ID_PREFIX: &str = "NODE-";

pub const ROOT_COLOR: &str = "#dedede";
pub const ROOT_TEXT: &str = "Central Idea";
pub const NEW_NODE_TEXT: &str = "New Node";

/// Identifier of a node. `ROOT` is reserved for the single root node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn root() -> Self {
		Self(ROOT_ID.to_owned())
	}

	pub fn is_root(&self) -> bool {
		self.0 == ROOT_ID
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Running number behind a `NODE-<n>` id. Leading digits are taken after
	/// the prefix, so `NODE-12b` yields 12 and `NODE-x` yields nothing.
	pub fn numeric_suffix(&self) -> Option<u64> {
		let rest = self.0.strip_prefix(NODE_ID_PREFIX).unwrap_or(&self.0);
		let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
		if rest.is_empty() {
			return Some(0);
		}
		digits.parse().ok()
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NodeId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	pub id: NodeId,
	#[serde(default)]
	pub text: String,
	pub x: f64,
	pub y: f64,
	/// Outgoing edges, in insertion order.
	#[serde(default)]
	pub connections: Vec<NodeId>,
	#[serde(default)]
	pub color: Option<String>,
}

impl Node {
	pub fn root_at(x: f64, y: f64) -> Self {
		Self {
			id: NodeId::root(),
			text: ROOT_TEXT.to_owned(),
			x,
			y,
			connections: Vec::new(),
			color: Some(ROOT_COLOR.to_owned()),
		}
	}

	pub fn is_root(&self) -> bool {
		self.id.is_root()
	}

	pub fn position(&self) -> (f64, f64) {
		(self.x, self.y)
	}

	pub fn connects_to(&self, target: &NodeId) -> bool {
		self.connections.contains(target)
	}
}
