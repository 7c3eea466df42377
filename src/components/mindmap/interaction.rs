//! Pointer gesture state machine: move vs. connect drags and text editing.

use log::debug;

use super::store::GraphStore;
use super::types::{Node, NodeId};

/// Release distance from a node center that counts as dropping onto it.
/// Circular even though nodes are drawn as rectangles.
pub const HIT_RADIUS: f64 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragMode {
	Move,
	Connect,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DragState {
	pub id: NodeId,
	pub offset_x: f64,
	pub offset_y: f64,
	pub mode: DragMode,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TempConnection {
	pub from_x: f64,
	pub from_y: f64,
	pub to_x: f64,
	pub to_y: f64,
}

/// Editing and dragging are mutually exclusive.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
	#[default]
	Idle,
	Editing(NodeId),
	Dragging(DragState),
}

#[derive(Debug, Default)]
pub struct InteractionController {
	gesture: Gesture,
	temp_connection: Option<TempConnection>,
	ghost: Option<Node>,
}

impl InteractionController {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn gesture(&self) -> &Gesture {
		&self.gesture
	}

	pub fn drag(&self) -> Option<&DragState> {
		match &self.gesture {
			Gesture::Dragging(drag) => Some(drag),
			_ => None,
		}
	}

	pub fn editing(&self) -> Option<&NodeId> {
		match &self.gesture {
			Gesture::Editing(id) => Some(id),
			_ => None,
		}
	}

	pub fn is_dragging(&self) -> bool {
		self.drag().is_some()
	}

	pub fn temp_connection(&self) -> Option<&TempConnection> {
		self.temp_connection.as_ref()
	}

	pub fn ghost(&self) -> Option<&Node> {
		self.ghost.as_ref()
	}

	/// Start a gesture on node `id`. With `modifier` held the gesture connects,
	/// otherwise it moves. Returns whether a drag started.
	pub fn pointer_down(
		&mut self,
		store: &GraphStore,
		id: &NodeId,
		x: f64,
		y: f64,
		modifier: bool,
	) -> bool {
		if !matches!(self.gesture, Gesture::Idle) {
			return false;
		}
		let Some(node) = store.node(id) else {
			return false;
		};
		let mode = if modifier { DragMode::Connect } else { DragMode::Move };
		if mode == DragMode::Move && node.is_root() {
			return false;
		}

		debug!("drag start {id} ({mode:?})");
		self.gesture = Gesture::Dragging(DragState {
			id: id.clone(),
			offset_x: x - node.x,
			offset_y: y - node.y,
			mode,
		});
		true
	}

	pub fn pointer_move(&mut self, store: &mut GraphStore, x: f64, y: f64) {
		let Gesture::Dragging(drag) = &self.gesture else {
			return;
		};
		match drag.mode {
			DragMode::Move => {
				store.move_node(&drag.id, x - drag.offset_x, y - drag.offset_y);
			}
			DragMode::Connect => {
				if let Some(from) = store.node(&drag.id) {
					self.temp_connection = Some(TempConnection {
						from_x: from.x,
						from_y: from.y,
						to_x: x,
						to_y: y,
					});
					self.ghost = Some(Node { x, y, ..from.clone() });
				}
			}
		}
	}

	/// End the gesture at `(x, y)`. A connect drag released within
	/// [`HIT_RADIUS`] of another node links the origin to it; the new target
	/// is returned.
	pub fn pointer_up(&mut self, store: &mut GraphStore, x: f64, y: f64) -> Option<NodeId> {
		self.temp_connection = None;
		self.ghost = None;
		let drag = match std::mem::take(&mut self.gesture) {
			Gesture::Dragging(drag) => drag,
			other => {
				self.gesture = other;
				return None;
			}
		};
		debug!("drag end {} ({:?})", drag.id, drag.mode);
		if drag.mode != DragMode::Connect {
			return None;
		}

		let target = drop_target(store.nodes(), &drag.id, x, y)?;
		let origin = store.node(&drag.id)?;
		if origin.connects_to(&target) {
			return None;
		}
		store.connect(&drag.id, &target);
		Some(target)
	}

	/// Abandon an active drag without creating anything.
	pub fn cancel(&mut self) {
		if self.is_dragging() {
			self.gesture = Gesture::Idle;
		}
		self.temp_connection = None;
		self.ghost = None;
	}

	/// Enter text editing for `id`, unless a drag is in progress.
	pub fn double_click(&mut self, id: &NodeId) -> bool {
		if self.is_dragging() {
			return false;
		}
		self.gesture = Gesture::Editing(id.clone());
		true
	}

	/// Write the edited text and leave edit mode, changed or not.
	pub fn commit_text(&mut self, store: &mut GraphStore, id: &NodeId, text: impl Into<String>) {
		store.update_text(id, text);
		if self.editing() == Some(id) {
			self.gesture = Gesture::Idle;
		}
	}

	pub fn cancel_edit(&mut self) {
		if self.editing().is_some() {
			self.gesture = Gesture::Idle;
		}
	}
}

/// First node other than `origin` whose center lies within [`HIT_RADIUS`].
pub fn drop_target(nodes: &[Node], origin: &NodeId, x: f64, y: f64) -> Option<NodeId> {
	nodes
		.iter()
		.filter(|n| &n.id != origin)
		.find(|n| {
			let (dx, dy) = (x - n.x, y - n.y);
			(dx * dx + dy * dy).sqrt() < HIT_RADIUS
		})
		.map(|n| n.id.clone())
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;
	use crate::components::mindmap::ids::IdAllocator;

	fn node(id: &str, x: f64, y: f64) -> Node {
		Node {
			id: NodeId::from(id),
			text: id.to_owned(),
			x,
			y,
			connections: Vec::new(),
			color: None,
		}
	}

	/// ROOT at the origin, NODE-1 to the east, NODE-2 to the south.
	fn three_nodes() -> GraphStore {
		GraphStore::new(
			vec![node("ROOT", 0.0, 0.0), node("NODE-1", 300.0, 0.0), node("NODE-2", 0.0, 300.0)],
			IdAllocator::new(),
			SmallRng::seed_from_u64(3),
		)
	}

	fn id(s: &str) -> NodeId {
		NodeId::from(s)
	}

	#[test]
	fn move_drag_keeps_grab_offset() {
		let mut store = three_nodes();
		let mut ctl = InteractionController::new();

		assert!(ctl.pointer_down(&store, &id("NODE-1"), 310.0, 5.0, false));
		ctl.pointer_move(&mut store, 410.0, 105.0);
		ctl.pointer_move(&mut store, 510.0, 205.0);

		let moved = store.node(&id("NODE-1")).unwrap();
		assert_eq!((moved.x, moved.y), (500.0, 200.0));
		assert!(ctl.temp_connection().is_none());

		assert_eq!(ctl.pointer_up(&mut store, 510.0, 205.0), None);
		assert_eq!(ctl.gesture(), &Gesture::Idle);
	}

	#[test]
	fn root_cannot_be_moved() {
		let mut store = three_nodes();
		let mut ctl = InteractionController::new();
		assert!(!ctl.pointer_down(&store, &NodeId::root(), 0.0, 0.0, false));
		ctl.pointer_move(&mut store, 100.0, 100.0);
		assert_eq!(store.root().unwrap().position(), (0.0, 0.0));
		assert_eq!(ctl.gesture(), &Gesture::Idle);
	}

	#[test]
	fn root_can_start_a_connection() {
		let mut store = three_nodes();
		let mut ctl = InteractionController::new();
		assert!(ctl.pointer_down(&store, &NodeId::root(), 0.0, 0.0, true));
		assert_eq!(ctl.pointer_up(&mut store, 290.0, 10.0), Some(id("NODE-1")));
		assert_eq!(store.root().unwrap().connections, vec![id("NODE-1")]);
	}

	#[test]
	fn connect_drag_previews_without_mutating() {
		let mut store = three_nodes();
		let mut ctl = InteractionController::new();
		let before = store.nodes().to_vec();

		ctl.pointer_down(&store, &id("NODE-1"), 300.0, 0.0, true);
		ctl.pointer_move(&mut store, 120.0, 80.0);

		assert_eq!(store.nodes(), before.as_slice());
		assert_eq!(
			ctl.temp_connection(),
			Some(&TempConnection { from_x: 300.0, from_y: 0.0, to_x: 120.0, to_y: 80.0 })
		);
		let ghost = ctl.ghost().unwrap();
		assert_eq!(ghost.id, id("NODE-1"));
		assert_eq!((ghost.x, ghost.y), (120.0, 80.0));
	}

	#[test]
	fn connect_drop_on_node_adds_edge() {
		let mut store = three_nodes();
		let mut ctl = InteractionController::new();

		ctl.pointer_down(&store, &id("NODE-1"), 300.0, 0.0, true);
		ctl.pointer_move(&mut store, 20.0, 280.0);
		assert_eq!(ctl.pointer_up(&mut store, 20.0, 280.0), Some(id("NODE-2")));

		assert_eq!(store.node(&id("NODE-1")).unwrap().connections, vec![id("NODE-2")]);
		assert!(ctl.temp_connection().is_none());
		assert!(ctl.ghost().is_none());
		assert_eq!(ctl.gesture(), &Gesture::Idle);
	}

	#[test]
	fn connect_drop_outside_radius_adds_nothing() {
		let mut store = three_nodes();
		let mut ctl = InteractionController::new();

		ctl.pointer_down(&store, &id("NODE-1"), 300.0, 0.0, true);
		ctl.pointer_move(&mut store, 0.0, 250.0);
		assert_eq!(ctl.pointer_up(&mut store, 0.0, 250.0), None);

		assert!(store.nodes().iter().all(|n| n.connections.is_empty()));
		assert!(ctl.temp_connection().is_none());
		assert!(ctl.ghost().is_none());
	}

	#[test]
	fn connect_drop_on_origin_is_not_a_self_loop() {
		let mut store = three_nodes();
		let mut ctl = InteractionController::new();
		ctl.pointer_down(&store, &id("NODE-1"), 300.0, 0.0, true);
		assert_eq!(ctl.pointer_up(&mut store, 301.0, 1.0), None);
		assert!(store.node(&id("NODE-1")).unwrap().connections.is_empty());
	}

	#[test]
	fn existing_edge_is_not_duplicated() {
		let mut store = three_nodes();
		store.connect(&id("NODE-1"), &id("NODE-2"));
		let mut ctl = InteractionController::new();
		ctl.pointer_down(&store, &id("NODE-1"), 300.0, 0.0, true);
		assert_eq!(ctl.pointer_up(&mut store, 0.0, 300.0), None);
		assert_eq!(store.node(&id("NODE-1")).unwrap().connections, vec![id("NODE-2")]);
	}

	#[test]
	fn dragged_node_deleted_mid_gesture_ends_cleanly() {
		let mut store = three_nodes();
		let mut ctl = InteractionController::new();
		ctl.pointer_down(&store, &id("NODE-1"), 300.0, 0.0, false);
		store.delete_node(&id("NODE-1"));
		ctl.pointer_move(&mut store, 50.0, 50.0);
		assert_eq!(ctl.pointer_up(&mut store, 50.0, 50.0), None);
		assert_eq!(store.nodes().len(), 2);
		assert_eq!(ctl.gesture(), &Gesture::Idle);
	}

	#[test]
	fn editing_blocks_drags_until_committed() {
		let mut store = three_nodes();
		let mut ctl = InteractionController::new();

		assert!(ctl.double_click(&id("NODE-2")));
		assert!(!ctl.pointer_down(&store, &id("NODE-1"), 300.0, 0.0, false));
		assert_eq!(ctl.editing(), Some(&id("NODE-2")));

		ctl.commit_text(&mut store, &id("NODE-2"), "renamed");
		assert_eq!(store.node(&id("NODE-2")).unwrap().text, "renamed");
		assert_eq!(ctl.gesture(), &Gesture::Idle);
		assert!(ctl.pointer_down(&store, &id("NODE-1"), 300.0, 0.0, false));
	}

	#[test]
	fn double_click_ignored_while_dragging() {
		let store = three_nodes();
		let mut ctl = InteractionController::new();
		ctl.pointer_down(&store, &id("NODE-1"), 300.0, 0.0, false);
		assert!(!ctl.double_click(&id("NODE-2")));
		assert!(ctl.is_dragging());
	}

	#[test]
	fn double_click_switches_edited_node() {
		let mut ctl = InteractionController::new();
		ctl.double_click(&id("NODE-1"));
		ctl.double_click(&id("NODE-2"));
		assert_eq!(ctl.editing(), Some(&id("NODE-2")));
		ctl.cancel_edit();
		assert_eq!(ctl.editing(), None);
	}

	#[test]
	fn pointer_up_keeps_edit_mode() {
		let mut store = three_nodes();
		let mut ctl = InteractionController::new();
		ctl.double_click(&id("NODE-1"));
		assert_eq!(ctl.pointer_up(&mut store, 0.0, 0.0), None);
		assert_eq!(ctl.editing(), Some(&id("NODE-1")));
	}

	#[test]
	fn cancel_drops_connect_preview() {
		let mut store = three_nodes();
		let mut ctl = InteractionController::new();
		ctl.pointer_down(&store, &id("NODE-1"), 300.0, 0.0, true);
		ctl.pointer_move(&mut store, 0.0, 300.0);
		ctl.cancel();
		assert_eq!(ctl.gesture(), &Gesture::Idle);
		assert!(ctl.ghost().is_none());
		assert!(store.nodes().iter().all(|n| n.connections.is_empty()));
	}

	#[test]
	fn drop_target_takes_first_match_in_order() {
		let nodes = vec![
			node("ROOT", 0.0, 0.0),
			node("NODE-1", 10.0, 0.0),
			node("NODE-2", 5.0, 0.0),
		];
		assert_eq!(drop_target(&nodes, &id("ROOT"), 6.0, 0.0), Some(id("NODE-1")));
		assert_eq!(drop_target(&nodes, &id("NODE-1"), 6.0, 0.0), Some(id("ROOT")));
		assert_eq!(drop_target(&nodes, &id("ROOT"), 0.0, 50.0), None);
	}
}
