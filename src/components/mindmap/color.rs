//! Direction-keyed pastel coloring relative to the root node.

use std::f64::consts::PI;

use super::types::{Node, NodeId, ROOT_COLOR};

pub const SATURATION: u8 = 60;
pub const LIGHTNESS: u8 = 85;

/// Bearing of `point` seen from `center`, in degrees within `[0, 360)`.
/// 0° points up (toward decreasing y) and angles grow clockwise.
pub fn angle_of(center: (f64, f64), point: (f64, f64)) -> f64 {
	let (dx, dy) = (point.0 - center.0, -(point.1 - center.1));
	let mut deg = dx.atan2(dy) * (180.0 / PI);
	if deg < 0.0 {
		deg += 360.0;
	}
	// -1e-15 + 360 rounds to 360
	if deg >= 360.0 { 0.0 } else { deg }
}

pub fn color_for(angle: f64) -> String {
	format!("hsl({angle}, {SATURATION}%, {LIGHTNESS}%)")
}

/// Recompute every non-root color from its bearing to `root_id`. Without a
/// root the nodes are returned unchanged.
pub fn recolor(nodes: Vec<Node>, root_id: &NodeId) -> Vec<Node> {
	let Some(center) = nodes.iter().find(|n| &n.id == root_id).map(Node::position) else {
		return nodes;
	};

	nodes
		.into_iter()
		.map(|mut node| {
			if &node.id == root_id {
				node.color.get_or_insert_with(|| ROOT_COLOR.to_owned());
			} else {
				node.color = Some(color_for(angle_of(center, node.position())));
			}
			node
		})
		.collect()
}
