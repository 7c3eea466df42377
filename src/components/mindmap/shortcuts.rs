#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
	AddNode,
	Save,
	Export,
	Import,
}

/// Map a `KeyboardEvent.key` plus Ctrl state to an editor shortcut.
/// Callers skip this entirely while a node's text is being edited.
pub fn shortcut_for_key(key: &str, ctrl: bool) -> Option<Shortcut> {
	match (key, ctrl) {
		("c" | "C", false) => Some(Shortcut::AddNode),
		("s", true) => Some(Shortcut::Save),
		("e", true) => Some(Shortcut::Export),
		("i", true) => Some(Shortcut::Import),
		_ => None,
	}
}
