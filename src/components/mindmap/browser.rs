//! Web implementations of the persistence seams.

use std::time::Duration;

use leptos::prelude::set_timeout;
use log::error;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
	Blob, BlobPropertyBag, File, FileReader, HtmlAnchorElement, ProgressEvent, Storage, Url,
};

use super::error::PersistenceError;
use super::persistence::{FileSink, SlotStorage};

/// Object URLs outlive the download click by this much.
const REVOKE_DELAY_MS: u64 = 1000;

fn describe(e: JsValue) -> String {
	e.as_string()
		.or_else(|| js_sys::JSON::stringify(&e).ok().and_then(|s| s.as_string()))
		.unwrap_or_else(|| format!("{e:?}"))
}

/// `window.localStorage`.
pub struct LocalStorage;

impl LocalStorage {
	fn storage() -> Result<Storage, PersistenceError> {
		web_sys::window()
			.ok_or_else(|| PersistenceError::Storage("no window".into()))?
			.local_storage()
			.map_err(|e| PersistenceError::Storage(describe(e)))?
			.ok_or_else(|| PersistenceError::Storage("local storage unavailable".into()))
	}
}

impl SlotStorage for LocalStorage {
	fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
		Self::storage()?
			.get_item(key)
			.map_err(|e| PersistenceError::Storage(describe(e)))
	}

	fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
		Self::storage()?
			.set_item(key, value)
			.map_err(|e| PersistenceError::Storage(describe(e)))
	}

	fn remove(&self, key: &str) -> Result<(), PersistenceError> {
		Self::storage()?
			.remove_item(key)
			.map_err(|e| PersistenceError::Storage(describe(e)))
	}
}

/// Downloads through a temporary object URL and a synthetic `<a download>` click.
pub struct DownloadLink;

impl FileSink for DownloadLink {
	fn offer_download(
		&self,
		file_name: &str,
		mime: &str,
		contents: &str,
	) -> Result<(), PersistenceError> {
		let export_err = |e: JsValue| PersistenceError::Export(describe(e));
		let document = web_sys::window()
			.and_then(|w| w.document())
			.ok_or_else(|| PersistenceError::Export("no document".into()))?;

		let options = BlobPropertyBag::new();
		options.set_type(mime);
		let parts = js_sys::Array::of1(&JsValue::from_str(contents));
		let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(export_err)?;
		let url = Url::create_object_url_with_blob(&blob).map_err(export_err)?;

		let anchor: HtmlAnchorElement = document
			.create_element("a")
			.map_err(export_err)?
			.dyn_into()
			.map_err(|_| PersistenceError::Export("anchor element expected".into()))?;
		anchor.set_href(&url);
		anchor.set_download(file_name);
		anchor.click();

		set_timeout(
			move || {
				if let Err(e) = Url::revoke_object_url(&url) {
					error!("revoking {url} failed: {}", describe(e));
				}
			},
			Duration::from_millis(REVOKE_DELAY_MS),
		);
		Ok(())
	}
}

/// Read a user-chosen file as text and hand it to `on_load` once done.
/// Overlapping reads are not ordered: whichever finishes last wins.
pub fn read_text_file(file: &File, on_load: impl FnOnce(String) + 'static) {
	let reader = match FileReader::new() {
		Ok(reader) => reader,
		Err(e) => {
			error!("FileReader unavailable: {}", describe(e));
			return;
		}
	};
	let reader_done = reader.clone();
	let onload = wasm_bindgen::closure::Closure::once_into_js(move |_: ProgressEvent| {
		match reader_done.result().ok().and_then(|v| v.as_string()) {
			Some(text) => on_load(text),
			None => error!("file read produced no text"),
		}
	});
	reader.set_onload(Some(onload.unchecked_ref()));
	if let Err(e) = reader.read_as_text(file) {
		error!("reading {} failed: {}", file.name(), describe(e));
	}
}

/// Jitter source seeded from the wall clock.
pub fn clock_rng() -> SmallRng {
	SmallRng::seed_from_u64(js_sys::Date::now() as u64)
}

pub fn viewport_size() -> Option<(f64, f64)> {
	let window = web_sys::window()?;
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}
