use leptos::prelude::*;
use minimind::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App)
}
