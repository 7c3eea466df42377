use log::{debug, warn};
use rand::rngs::SmallRng;

use super::interaction::InteractionController;
use super::persistence::PersistenceGateway;
use super::store::GraphStore;
use super::toast::Toast;
use super::types::{Node, NodeId};

pub const NODE_WIDTH: f64 = 150.0;
pub const NODE_HEIGHT: f64 = 60.0;
pub const DELETE_BADGE_RADIUS: f64 = 14.0;
pub const DISCONNECT_BADGE_RADIUS: f64 = 10.0;
/// Half the width of the invisible band around a connection line that counts
/// as hovering it.
pub const CONNECTION_HOVER_SLOP: f64 = 7.5;

const MSG_SAVED: &str = "Mindmap saved.";
const MSG_SAVE_FAILED: &str = "Could not save the mindmap.";
const MSG_EXPORT_FAILED: &str = "Could not export the file.";
const MSG_IMPORTED: &str = "File imported.";
const MSG_IMPORT_FAILED: &str = "Import failed: the file is invalid or damaged.";
const MSG_RESET: &str = "Mindmap reset.";
const MSG_RESET_FAILED: &str = "Could not reset the mindmap.";

#[derive(Clone, Debug, PartialEq)]
pub enum HoverTarget {
	Node(NodeId),
	Connection(NodeId, NodeId),
}

/// What a pointer press landed on.
#[derive(Clone, Debug, PartialEq)]
pub enum Press {
	Deleted(NodeId),
	Disconnected(NodeId, NodeId),
	Drag(NodeId),
	Ignored,
}

/// Center of the delete badge drawn on a hovered node.
pub fn delete_badge_center(node: &Node) -> (f64, f64) {
	(node.x + NODE_WIDTH / 2.0 - 5.0, node.y - NODE_HEIGHT / 2.0 + 5.0)
}

fn contains_point(node: &Node, x: f64, y: f64) -> bool {
	(x - node.x).abs() <= NODE_WIDTH / 2.0 && (y - node.y).abs() <= NODE_HEIGHT / 2.0
}

fn within(center: (f64, f64), x: f64, y: f64, radius: f64) -> bool {
	let (dx, dy) = (x - center.0, y - center.1);
	(dx * dx + dy * dy).sqrt() <= radius
}

fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (abx, aby) = (b.0 - a.0, b.1 - a.1);
	let len_sq = abx * abx + aby * aby;
	let t = if len_sq < f64::EPSILON {
		0.0
	} else {
		(((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len_sq).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.0 + t * abx, a.1 + t * aby);
	((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

/// One editor session: the graph, the gesture in progress, persistence and
/// the status line, plus what the pointer is hovering.
pub struct MindmapState {
	pub store: GraphStore,
	pub controller: InteractionController,
	pub toast: Toast,
	pub hover: Option<HoverTarget>,
	pub width: f64,
	pub height: f64,
	gateway: PersistenceGateway,
}

impl MindmapState {
	pub fn new(gateway: PersistenceGateway, width: f64, height: f64, rng: SmallRng) -> Self {
		let store = gateway.load_initial((width, height), rng);
		Self {
			store,
			controller: InteractionController::new(),
			toast: Toast::default(),
			hover: None,
			width,
			height,
			gateway,
		}
	}

	pub fn is_editing(&self) -> bool {
		self.controller.editing().is_some()
	}

	/// Topmost node whose rectangle contains the point.
	pub fn node_at_position(&self, x: f64, y: f64) -> Option<&Node> {
		self.store.nodes().iter().rev().find(|n| contains_point(n, x, y))
	}

	fn connection_at_position(&self, x: f64, y: f64) -> Option<(NodeId, NodeId)> {
		let nodes = self.store.nodes();
		nodes.iter().rev().find_map(|from| {
			from.connections.iter().rev().find_map(|to_id| {
				let to = nodes.iter().find(|n| &n.id == to_id)?;
				let distance = distance_to_segment((x, y), from.position(), to.position());
				(distance <= CONNECTION_HOVER_SLOP).then(|| (from.id.clone(), to.id.clone()))
			})
		})
	}

	fn delete_badge_hit(&self, x: f64, y: f64) -> Option<NodeId> {
		let Some(HoverTarget::Node(id)) = &self.hover else {
			return None;
		};
		let node = self.store.node(id).filter(|n| !n.is_root())?;
		within(delete_badge_center(node), x, y, DELETE_BADGE_RADIUS).then(|| id.clone())
	}

	fn disconnect_badge_hit(&self, x: f64, y: f64) -> Option<(NodeId, NodeId)> {
		let Some(HoverTarget::Connection(from, to)) = &self.hover else {
			return None;
		};
		let (a, b) = (self.store.node(from)?, self.store.node(to)?);
		let mid = ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
		within(mid, x, y, DISCONNECT_BADGE_RADIUS).then(|| (from.clone(), to.clone()))
	}

	fn update_hover(&mut self, x: f64, y: f64) {
		if self.delete_badge_hit(x, y).is_some() || self.disconnect_badge_hit(x, y).is_some() {
			return;
		}
		self.hover = match self.node_at_position(x, y) {
			Some(node) => Some(HoverTarget::Node(node.id.clone())),
			None => self
				.connection_at_position(x, y)
				.map(|(from, to)| HoverTarget::Connection(from, to)),
		};
	}

	/// Handle a press on the canvas. A press anywhere ends an open edit; the
	/// view commits the typed text before forwarding the press.
	pub fn pointer_down(&mut self, x: f64, y: f64, modifier: bool) -> Press {
		self.controller.cancel_edit();
		if !self.controller.is_dragging() {
			if let Some(id) = self.delete_badge_hit(x, y) {
				self.delete_node(&id);
				return Press::Deleted(id);
			}
			if let Some((from, to)) = self.disconnect_badge_hit(x, y) {
				self.disconnect(&from, &to);
				return Press::Disconnected(from, to);
			}
		}
		let Some(id) = self.node_at_position(x, y).map(|n| n.id.clone()) else {
			return Press::Ignored;
		};
		if self.controller.pointer_down(&self.store, &id, x, y, modifier) {
			Press::Drag(id)
		} else {
			Press::Ignored
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if self.controller.is_dragging() {
			self.controller.pointer_move(&mut self.store, x, y);
		} else {
			self.update_hover(x, y);
		}
	}

	pub fn pointer_up(&mut self, x: f64, y: f64) -> Option<NodeId> {
		self.controller.pointer_up(&mut self.store, x, y)
	}

	pub fn pointer_leave(&mut self) {
		self.controller.cancel();
		self.hover = None;
	}

	/// Enter text editing for the node under the pointer.
	pub fn double_click(&mut self, x: f64, y: f64) -> Option<NodeId> {
		let id = self.node_at_position(x, y)?.id.clone();
		self.controller.double_click(&id).then_some(id)
	}

	pub fn commit_text(&mut self, id: &NodeId, text: impl Into<String>) {
		self.controller.commit_text(&mut self.store, id, text);
	}

	pub fn cancel_edit(&mut self) {
		self.controller.cancel_edit();
	}

	pub fn add_node(&mut self) -> Option<NodeId> {
		self.store.add_node()
	}

	pub fn delete_node(&mut self, id: &NodeId) {
		self.store.delete_node(id);
		if matches!(&self.hover, Some(HoverTarget::Node(h)) if h == id) {
			self.hover = None;
		}
	}

	pub fn disconnect(&mut self, from: &NodeId, to: &NodeId) {
		self.store.disconnect(from, to);
		self.hover = None;
	}

	/// Write the graph to local storage. Returns the toast ticket.
	pub fn save(&mut self) -> u64 {
		match self.gateway.save(self.store.nodes()) {
			Ok(()) => self.toast.show(MSG_SAVED),
			Err(e) => {
				warn!("save failed: {e}");
				self.toast.show(MSG_SAVE_FAILED)
			}
		}
	}

	/// Offer the graph as a download. A toast is only raised on failure.
	pub fn export(&mut self) -> Option<u64> {
		match self.gateway.export(self.store.nodes()) {
			Ok(()) => None,
			Err(e) => {
				warn!("export failed: {e}");
				Some(self.toast.show(MSG_EXPORT_FAILED))
			}
		}
	}

	pub fn import_text(&mut self, text: &str) -> u64 {
		match self.gateway.import_text(&mut self.store, text) {
			Ok(()) => {
				self.controller.cancel();
				self.controller.cancel_edit();
				self.hover = None;
				self.toast.show(MSG_IMPORTED)
			}
			Err(e) => {
				warn!("import failed: {e}");
				self.toast.show(MSG_IMPORT_FAILED)
			}
		}
	}

	/// Drop the saved graph and start over with a lone root.
	pub fn reset(&mut self, rng: SmallRng) -> u64 {
		match self.gateway.reset((self.width, self.height), rng) {
			Ok(store) => {
				self.store = store;
				self.controller = InteractionController::new();
				self.hover = None;
				self.toast.show(MSG_RESET)
			}
			Err(e) => {
				warn!("reset failed: {e}");
				self.toast.show(MSG_RESET_FAILED)
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		debug!("viewport {width}x{height}");
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use rand::SeedableRng;

	use super::*;
	use crate::components::mindmap::persistence::STORAGE_KEY;
	use crate::components::mindmap::persistence::testing::{MemoryStorage, RecordingSink, gateway};

	fn rng() -> SmallRng {
		SmallRng::seed_from_u64(5)
	}

	fn session(storage: &MemoryStorage) -> MindmapState {
		MindmapState::new(gateway(storage, &RecordingSink::default()), 800.0, 600.0, rng())
	}

	/// ROOT at (400, 300), NODE-1 at (700, 300), NODE-2 at (400, 500).
	fn laid_out(storage: &MemoryStorage) -> MindmapState {
		let mut state = session(storage);
		let a = state.add_node().unwrap();
		let b = state.add_node().unwrap();
		state.store.move_node(&a, 700.0, 300.0);
		state.store.move_node(&b, 400.0, 500.0);
		state
	}

	fn id(s: &str) -> NodeId {
		NodeId::from(s)
	}

	#[test]
	fn press_on_node_rectangle_starts_drag() {
		let mut state = laid_out(&MemoryStorage::default());
		assert_eq!(state.pointer_down(760.0, 320.0, false), Press::Drag(id("NODE-1")));
		state.pointer_move(560.0, 120.0);
		assert_eq!(state.store.node(&id("NODE-1")).unwrap().position(), (500.0, 100.0));
		state.pointer_up(560.0, 120.0);
		assert!(!state.controller.is_dragging());
	}

	#[test]
	fn press_on_empty_canvas_is_ignored() {
		let mut state = laid_out(&MemoryStorage::default());
		assert_eq!(state.pointer_down(50.0, 50.0, false), Press::Ignored);
	}

	#[test]
	fn shift_drag_from_node_to_node_connects() {
		let mut state = laid_out(&MemoryStorage::default());
		assert_eq!(state.pointer_down(700.0, 300.0, true), Press::Drag(id("NODE-1")));
		state.pointer_move(420.0, 490.0);
		assert!(state.controller.ghost().is_some());
		assert_eq!(state.pointer_up(420.0, 490.0), Some(id("NODE-2")));
		assert_eq!(state.store.node(&id("NODE-1")).unwrap().connections, vec![id("NODE-2")]);
	}

	#[test]
	fn delete_badge_removes_hovered_node() {
		let mut state = laid_out(&MemoryStorage::default());
		state.pointer_move(700.0, 300.0);
		assert_eq!(state.hover, Some(HoverTarget::Node(id("NODE-1"))));

		let (bx, by) = delete_badge_center(state.store.node(&id("NODE-1")).unwrap());
		assert_eq!(state.pointer_down(bx + 10.0, by - 5.0, false), Press::Deleted(id("NODE-1")));
		assert!(state.store.node(&id("NODE-1")).is_none());
		assert_eq!(state.hover, None);
	}

	#[test]
	fn root_has_no_delete_badge() {
		let mut state = laid_out(&MemoryStorage::default());
		state.pointer_move(400.0, 300.0);
		let (bx, by) = delete_badge_center(state.store.root().unwrap());
		assert_eq!(state.pointer_down(bx, by, false), Press::Ignored);
		assert!(state.store.root().is_some());
	}

	#[test]
	fn disconnect_badge_removes_hovered_connection() {
		let mut state = laid_out(&MemoryStorage::default());
		state.store.connect(&id("NODE-1"), &id("NODE-2"));

		state.pointer_move(550.0, 400.0);
		assert_eq!(state.hover, Some(HoverTarget::Connection(id("NODE-1"), id("NODE-2"))));
		assert_eq!(
			state.pointer_down(553.0, 402.0, false),
			Press::Disconnected(id("NODE-1"), id("NODE-2"))
		);
		assert!(state.store.node(&id("NODE-1")).unwrap().connections.is_empty());
	}

	#[test]
	fn double_click_enters_edit_and_commit_leaves_it() {
		let mut state = laid_out(&MemoryStorage::default());
		assert_eq!(state.double_click(400.0, 500.0), Some(id("NODE-2")));
		assert!(state.is_editing());

		state.commit_text(&id("NODE-2"), "Plans");
		assert!(!state.is_editing());
		assert_eq!(state.store.node(&id("NODE-2")).unwrap().text, "Plans");
	}

	#[test]
	fn press_on_empty_canvas_ends_editing() {
		let mut state = laid_out(&MemoryStorage::default());
		state.double_click(400.0, 500.0);
		state.commit_text(&id("NODE-2"), "Plans");
		assert_eq!(state.double_click(400.0, 500.0), Some(id("NODE-2")));

		assert_eq!(state.pointer_down(50.0, 50.0, false), Press::Ignored);
		assert!(!state.is_editing());
		assert_eq!(state.store.node(&id("NODE-2")).unwrap().text, "Plans");
	}

	#[test]
	fn press_on_another_node_while_editing_starts_drag() {
		let mut state = laid_out(&MemoryStorage::default());
		state.double_click(400.0, 500.0);
		assert_eq!(state.pointer_down(760.0, 320.0, false), Press::Drag(id("NODE-1")));
		assert!(!state.is_editing());
		assert!(state.controller.is_dragging());
	}

	#[test]
	fn leaving_canvas_cancels_connect_drag() {
		let mut state = laid_out(&MemoryStorage::default());
		state.pointer_down(700.0, 300.0, true);
		state.pointer_move(400.0, 500.0);
		state.pointer_leave();
		assert_eq!(state.pointer_up(400.0, 500.0), None);
		assert!(state.store.nodes().iter().all(|n| n.connections.is_empty()));
	}

	#[test]
	fn save_reports_success_and_failure() {
		let storage = MemoryStorage::default();
		let mut state = laid_out(&storage);
		state.save();
		assert_eq!(state.toast.message(), Some(MSG_SAVED));
		assert!(storage.slots.borrow().contains_key(STORAGE_KEY));

		let mut failing = session(&MemoryStorage::failing());
		let nodes_before = failing.store.nodes().to_vec();
		failing.save();
		assert_eq!(failing.toast.message(), Some(MSG_SAVE_FAILED));
		assert_eq!(failing.store.nodes(), nodes_before.as_slice());
	}

	#[test]
	fn export_failure_raises_toast() {
		let sink = RecordingSink {
			fail: true,
			..RecordingSink::default()
		};
		let gw = gateway(&MemoryStorage::default(), &sink);
		let mut state = MindmapState::new(gw, 800.0, 600.0, rng());
		assert!(state.export().is_some());
		assert_eq!(state.toast.message(), Some(MSG_EXPORT_FAILED));

		let mut ok = session(&MemoryStorage::default());
		assert_eq!(ok.export(), None);
	}

	#[test]
	fn bad_import_keeps_graph_and_warns() {
		let mut state = laid_out(&MemoryStorage::default());
		let before = state.store.nodes().to_vec();
		state.import_text("{not valid json");
		assert_eq!(state.store.nodes(), before.as_slice());
		assert_eq!(state.toast.message(), Some(MSG_IMPORT_FAILED));
	}

	#[test]
	fn good_import_replaces_graph_and_ends_editing() {
		let mut state = laid_out(&MemoryStorage::default());
		state.double_click(400.0, 500.0);
		state.import_text(
			r#"[
				{"id":"ROOT","text":"r","x":1,"y":2,"connections":[]},
				{"id":"NODE-8","text":"n","x":3,"y":4}
			]"#,
		);

		assert_eq!(state.toast.message(), Some(MSG_IMPORTED));
		assert_eq!(state.store.nodes().len(), 2);
		assert!(!state.is_editing());
		assert_eq!(state.add_node().unwrap().as_str(), "NODE-9");
	}

	#[test]
	fn reset_restarts_numbering_and_clears_storage() {
		let storage = MemoryStorage::default();
		let mut state = laid_out(&storage);
		state.save();
		state.reset(rng());

		assert_eq!(state.store.nodes().len(), 1);
		assert_eq!(state.store.root().unwrap().position(), (400.0, 300.0));
		assert!(!storage.slots.borrow().contains_key(STORAGE_KEY));
		assert_eq!(state.add_node().unwrap().as_str(), "NODE-1");
	}
}
