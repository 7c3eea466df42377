use super::types::{NODE_ID_PREFIX, Node, NodeId};

/// Suffixes above this are left out of numbering so the counter cannot
/// overflow. Ids that large are still kept, just never reached.
pub const MAX_TRACKED_SUFFIX: u64 = u32::MAX as u64;

/// Issues `NODE-<n>` ids for one editor session.
#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
	current: u64,
}

impl IdAllocator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn next(&mut self) -> NodeId {
		self.current += 1;
		NodeId::new(format!("{NODE_ID_PREFIX}{}", self.current))
	}

	/// Continue numbering after `max_seen`. The counter never moves backward.
	pub fn reset(&mut self, max_seen: u64) {
		self.current = self.current.max(max_seen.min(MAX_TRACKED_SUFFIX));
	}

	pub fn current(&self) -> u64 {
		self.current
	}
}

/// Highest numeric suffix among non-root ids, 0 when there is none.
/// Suffixes above [`MAX_TRACKED_SUFFIX`] are ignored.
pub fn max_suffix(nodes: &[Node]) -> u64 {
	nodes
		.iter()
		.filter(|node| !node.is_root())
		.filter_map(|node| node.id.numeric_suffix())
		.filter(|&n| n <= MAX_TRACKED_SUFFIX)
		.max()
		.unwrap_or(0)
}
