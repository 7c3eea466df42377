use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, KeyboardEvent, MouseEvent, Window};

use super::browser::{DownloadLink, LocalStorage, clock_rng, read_text_file, viewport_size};
use super::persistence::PersistenceGateway;
use super::render;
use super::shortcuts::{Shortcut, shortcut_for_key};
use super::state::{MindmapState, NODE_HEIGHT, NODE_WIDTH, Press};
use super::toast::TOAST_DURATION_MS;
use super::types::NodeId;

type SharedState = Rc<RefCell<Option<MindmapState>>>;

const CONNECT_HINT: &str = "Shift+drag onto a node";
const CANVAS_HELP: &str = "Drag a node to move it. Shift+drag from one node onto another to \
	connect them. Double-click a node to edit its text.";

/// Node whose text is being edited through the overlay input.
#[derive(Clone, Debug, PartialEq)]
struct EditOverlay {
	id: NodeId,
	text: String,
	x: f64,
	y: f64,
}

/// Push the current toast message to the view and schedule its removal.
fn publish_toast(state: &SharedState, toast: RwSignal<Option<String>>, ticket: u64) {
	let message = state
		.borrow()
		.as_ref()
		.and_then(|s| s.toast.message().map(str::to_owned));
	toast.set(message);

	let state = state.clone();
	set_timeout(
		move || {
			if let Some(ref mut s) = *state.borrow_mut() {
				if s.toast.clear(ticket) {
					toast.set(None);
				}
			}
		},
		Duration::from_millis(TOAST_DURATION_MS),
	);
}

fn with_state<R>(state: &SharedState, f: impl FnOnce(&mut MindmapState) -> R) -> Option<R> {
	state.borrow_mut().as_mut().map(f)
}

#[component]
pub fn MindmapCanvas(
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let file_input_ref = NodeRef::<leptos::html::Input>::new();
	let edit_input_ref = NodeRef::<leptos::html::Input>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let keydown_cb: Rc<RefCell<Option<Closure<dyn FnMut(KeyboardEvent)>>>> =
		Rc::new(RefCell::new(None));
	let toast = RwSignal::new(None::<String>);
	let editor = RwSignal::new(None::<EditOverlay>);

	let open_file_picker = move || match file_input_ref.get() {
		Some(input) => input.click(),
		None => error!("file input not mounted"),
	};

	let run_shortcut = {
		let state = state.clone();
		move |shortcut: Shortcut| {
			let ticket = match shortcut {
				Shortcut::AddNode => {
					with_state(&state, |s| s.add_node());
					None
				}
				Shortcut::Save => with_state(&state, |s| s.save()),
				Shortcut::Export => with_state(&state, |s| s.export()).flatten(),
				Shortcut::Import => {
					open_file_picker();
					None
				}
			};
			if let Some(ticket) = ticket {
				publish_toast(&state, toast, ticket);
			}
		}
	};

	let (state_init, animate_init, resize_cb_init, keydown_init, run_shortcut_init) = (
		state.clone(),
		animate.clone(),
		resize_cb.clone(),
		keydown_cb.clone(),
		run_shortcut.clone(),
	);
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			viewport_size().unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => return,
			},
			_ => {
				error!("2d canvas context unavailable");
				return;
			}
		};
		let gateway = PersistenceGateway::new(Box::new(LocalStorage), Box::new(DownloadLink));
		*state_init.borrow_mut() = Some(MindmapState::new(gateway, w, h, clock_rng()));

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = viewport_size() else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				with_state(&state_resize, |s| s.resize(nw, nh));
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_keys, run_shortcut) = (state_init.clone(), run_shortcut_init.clone());
		*keydown_init.borrow_mut() = Some(Closure::new(move |ev: KeyboardEvent| {
			let editing = state_keys
				.borrow()
				.as_ref()
				.is_some_and(MindmapState::is_editing);
			if editing {
				return;
			}
			if let Some(shortcut) = shortcut_for_key(&ev.key(), ev.ctrl_key()) {
				ev.prevent_default();
				ev.stop_propagation();
				debug!("shortcut {shortcut:?}");
				run_shortcut(shortcut);
			}
		}));
		if let Some(ref cb) = *keydown_init.borrow() {
			let _ = window.add_event_listener_with_callback("keydown", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref s) = *state_anim.borrow() {
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let canvas_point = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let rect = canvas_ref.get()?.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = canvas_point(&ev) {
			with_state(&state_mm, |s| s.pointer_move(x, y));
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		if let Some((x, y)) = canvas_point(&ev) {
			with_state(&state_mu, |s| s.pointer_up(x, y));
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		with_state(&state_ml, MindmapState::pointer_leave);
	};

	let state_dc = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(&ev) else {
			return;
		};
		let overlay = with_state(&state_dc, |s| {
			let id = s.double_click(x, y)?;
			let node = s.store.node(&id)?;
			Some(EditOverlay {
				id,
				text: node.text.clone(),
				x: node.x,
				y: node.y,
			})
		})
		.flatten();
		if overlay.is_some() {
			editor.set(overlay);
			request_animation_frame(move || {
				if let Some(input) = edit_input_ref.get_untracked() {
					let _ = input.focus();
					input.select();
				}
			});
		}
	};

	let commit_edit = {
		let state = state.clone();
		move || {
			let Some(edit) = editor.get_untracked() else {
				return;
			};
			editor.set(None);
			let text = edit_input_ref
				.get_untracked()
				.map(|input| input.value())
				.unwrap_or(edit.text);
			with_state(&state, |s| s.commit_text(&edit.id, text));
		}
	};

	let cancel_edit = {
		let state = state.clone();
		move || {
			editor.set(None);
			with_state(&state, MindmapState::cancel_edit);
		}
	};

	let state_md = state.clone();
	let commit_press = commit_edit.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(&ev) else {
			return;
		};
		commit_press();
		let press = with_state(&state_md, |s| s.pointer_down(x, y, ev.shift_key()));
		if matches!(press, Some(Press::Drag(_))) {
			ev.prevent_default();
		}
	};

	let commit_blur = commit_edit.clone();
	let on_edit_keydown = move |ev: KeyboardEvent| match ev.key().as_str() {
		"Enter" => commit_edit(),
		"Escape" => cancel_edit(),
		_ => {}
	};

	let editor_style = move || {
		editor.with(|edit| match edit {
			Some(edit) => format!(
				"position: absolute; left: {}px; top: {}px; \
				 width: {NODE_WIDTH}px; height: {NODE_HEIGHT}px; box-sizing: border-box; \
				 text-align: center; font-size: 18px; \
				 border: 1px solid red; background: transparent;",
				edit.x - NODE_WIDTH / 2.0,
				edit.y - NODE_HEIGHT / 2.0,
			),
			None => "display: none;".to_owned(),
		})
	};

	let editor_value = move || {
		editor.with(|edit| edit.as_ref().map(|e| e.text.clone()).unwrap_or_default())
	};

	let state_import = state.clone();
	let on_file_change = move |_| {
		let Some(input) = file_input_ref.get() else {
			return;
		};
		if let Some(file) = input.files().and_then(|files| files.get(0)) {
			let state = state_import.clone();
			read_text_file(&file, move |text| {
				if let Some(ticket) = with_state(&state, |s| s.import_text(&text)) {
					publish_toast(&state, toast, ticket);
				}
			});
		}
		input.set_value("");
	};

	let state_reset = state.clone();
	let on_reset = move |_| {
		let confirmed = web_sys::window()
			.and_then(|w: Window| {
				w.confirm_with_message("Clear the saved mindmap and start over?")
					.ok()
			})
			.unwrap_or(false);
		if !confirmed {
			return;
		}
		editor.set(None);
		if let Some(ticket) = with_state(&state_reset, |s| s.reset(clock_rng())) {
			publish_toast(&state_reset, toast, ticket);
		}
	};

	let toolbar_button = move |label: &'static str, hint: &'static str, shortcut: Shortcut| {
		let run = run_shortcut.clone();
		view! {
			<button title=hint on:click=move |_| run(shortcut)>
				{label}
				<span class="shortcut">{hint}</span>
			</button>
		}
	};

	view! {
		<div class="mindmap" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="mindmap-canvas"
				title=CANVAS_HELP
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:dblclick=on_dblclick
				style="display: block; cursor: grab;"
			/>
			<div class="toolbar">
				{toolbar_button("Add node", "C", Shortcut::AddNode)}
				{toolbar_button("Save", "Ctrl+S", Shortcut::Save)}
				{toolbar_button("Export", "Ctrl+E", Shortcut::Export)}
				{toolbar_button("Import", "Ctrl+I", Shortcut::Import)}
				<p class="help" title=CANVAS_HELP>
					"Connect"
					<span class="shortcut">{CONNECT_HINT}</span>
				</p>
			</div>
			<button class="reset" title="Reset" on:click=on_reset>"Reset"</button>
			<input
				node_ref=file_input_ref
				type="file"
				accept=".json"
				style="display: none;"
				on:change=on_file_change
			/>
			<input
				node_ref=edit_input_ref
				type="text"
				class="node-editor"
				style=editor_style
				prop:value=editor_value
				on:keydown=on_edit_keydown
				on:blur=move |_| commit_blur()
			/>
			{move || toast.get().map(|message| view! { <div class="toast">{message}</div> })}
		</div>
	}
}
