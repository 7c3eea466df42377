use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{
	DELETE_BADGE_RADIUS, DISCONNECT_BADGE_RADIUS, HoverTarget, MindmapState, NODE_HEIGHT,
	NODE_WIDTH, delete_badge_center,
};
use super::types::{Node, ROOT_COLOR};

const BACKGROUND: &str = "#f5f5f5";
const EDGE_COLOR: &str = "#555";
const TEMP_EDGE_COLOR: &str = "red";
const BADGE_COLOR: &str = "#F08080";
const FALLBACK_NODE_COLOR: &str = "#ADD8E6";
const CORNER_RADIUS: f64 = 10.0;

pub fn render(state: &MindmapState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	draw_temp_connection(state, ctx);
	if let Some(ghost) = state.controller.ghost() {
		ctx.set_global_alpha(0.4);
		draw_node(ghost, ctx);
		ctx.set_global_alpha(1.0);
	}
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
}

fn draw_temp_connection(state: &MindmapState, ctx: &CanvasRenderingContext2d) {
	let Some(temp) = state.controller.temp_connection() else {
		return;
	};
	ctx.set_stroke_style_str(TEMP_EDGE_COLOR);
	ctx.set_line_width(2.0);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(5.0),
		&JsValue::from_f64(5.0),
	));
	ctx.begin_path();
	ctx.move_to(temp.from_x, temp.from_y);
	ctx.line_to(temp.to_x, temp.to_y);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_edges(state: &MindmapState, ctx: &CanvasRenderingContext2d) {
	let nodes = state.store.nodes();
	ctx.set_stroke_style_str(EDGE_COLOR);
	ctx.set_line_width(2.0);

	for from in nodes {
		for to_id in &from.connections {
			let Some(to) = nodes.iter().find(|n| &n.id == to_id) else {
				continue;
			};
			ctx.begin_path();
			ctx.move_to(from.x, from.y);
			ctx.line_to(to.x, to.y);
			ctx.stroke();

			let hovered = matches!(
				&state.hover,
				Some(HoverTarget::Connection(f, t)) if f == &from.id && t == to_id
			);
			if hovered && !state.controller.is_dragging() {
				let (mx, my) = ((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
				draw_badge(ctx, mx, my, DISCONNECT_BADGE_RADIUS, true);
				ctx.set_stroke_style_str(EDGE_COLOR);
				ctx.set_line_width(2.0);
			}
		}
	}
}

fn draw_nodes(state: &MindmapState, ctx: &CanvasRenderingContext2d) {
	let editing = state.controller.editing();
	for node in state.store.nodes() {
		if editing == Some(&node.id) {
			draw_node_body(node, ctx);
		} else {
			draw_node(node, ctx);
		}

		let hovered = matches!(&state.hover, Some(HoverTarget::Node(h)) if h == &node.id);
		if hovered && !node.is_root() && !state.controller.is_dragging() {
			let (bx, by) = delete_badge_center(node);
			draw_badge(ctx, bx, by, DELETE_BADGE_RADIUS, false);
		}
	}
}

fn draw_node(node: &Node, ctx: &CanvasRenderingContext2d) {
	draw_node_body(node, ctx);
	ctx.set_fill_style_str("#000");
	ctx.set_font("18px Pretendard, sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text_with_max_width(&node.text, node.x, node.y, NODE_WIDTH - 12.0);
}

fn draw_node_body(node: &Node, ctx: &CanvasRenderingContext2d) {
	let fallback = if node.is_root() { ROOT_COLOR } else { FALLBACK_NODE_COLOR };
	ctx.set_fill_style_str(node.color.as_deref().unwrap_or(fallback));
	let (left, top) = (node.x - NODE_WIDTH / 2.0, node.y - NODE_HEIGHT / 2.0);
	let (right, bottom, r) = (left + NODE_WIDTH, top + NODE_HEIGHT, CORNER_RADIUS);
	ctx.begin_path();
	ctx.move_to(left + r, top);
	let _ = ctx.arc_to(right, top, right, bottom, r);
	let _ = ctx.arc_to(right, bottom, left, bottom, r);
	let _ = ctx.arc_to(left, bottom, left, top, r);
	let _ = ctx.arc_to(left, top, right, top, r);
	ctx.close_path();
	ctx.fill();
}

fn draw_badge(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64, outlined: bool) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str("#FFFFFF");
	ctx.fill();
	if outlined {
		ctx.set_stroke_style_str(BADGE_COLOR);
		ctx.set_line_width(1.0);
		ctx.stroke();
	}
	ctx.set_fill_style_str(BADGE_COLOR);
	ctx.set_font(&format!("bold {radius}px sans-serif"));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text("X", x, y);
}
