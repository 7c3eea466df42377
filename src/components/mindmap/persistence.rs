//! Save, export, load and import of the node collection as JSON text.
//!
//! Browser access goes through [`SlotStorage`] and [`FileSink`]; the web
//! implementations live in `browser`.

use std::collections::HashSet;

use log::{info, warn};
use rand::rngs::SmallRng;

use super::error::{GraphFormatError, PersistenceError};
use super::ids::IdAllocator;
use super::store::GraphStore;
use super::types::{Node, NodeId};

pub const STORAGE_KEY: &str = "minimind_mindmap_data";
pub const EXPORT_FILE_NAME: &str = "minimind_export.json";
pub const EXPORT_MIME: &str = "application/json";

/// A keyed text slot, e.g. `window.localStorage`.
pub trait SlotStorage {
	fn read(&self, key: &str) -> Result<Option<String>, PersistenceError>;
	fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
	fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

/// Hands a finished file to the user.
pub trait FileSink {
	fn offer_download(
		&self,
		file_name: &str,
		mime: &str,
		contents: &str,
	) -> Result<(), PersistenceError>;
}

pub fn serialize(nodes: &[Node]) -> Result<String, PersistenceError> {
	serde_json::to_string(nodes).map_err(PersistenceError::Serialize)
}

/// Parse and validate a node list: it must be a JSON array holding exactly one
/// root. Duplicate and dangling connections are dropped.
pub fn parse_graph(text: &str) -> Result<Vec<Node>, GraphFormatError> {
	let nodes: Vec<Node> = serde_json::from_str(text)?;
	match nodes.iter().filter(|n| n.is_root()).count() {
		0 => return Err(GraphFormatError::MissingRoot),
		1 => {}
		n => return Err(GraphFormatError::MultipleRoots(n)),
	}
	Ok(normalize_connections(nodes))
}

fn normalize_connections(nodes: Vec<Node>) -> Vec<Node> {
	let known: HashSet<NodeId> = nodes.iter().map(|n| n.id.clone()).collect();
	nodes
		.into_iter()
		.map(|mut node| {
			let mut seen = HashSet::new();
			node.connections.retain(|c| known.contains(c) && seen.insert(c.clone()));
			node
		})
		.collect()
}

fn default_nodes(viewport: (f64, f64)) -> Vec<Node> {
	vec![Node::root_at(viewport.0 / 2.0, viewport.1 / 2.0)]
}

pub struct PersistenceGateway {
	storage: Box<dyn SlotStorage>,
	sink: Box<dyn FileSink>,
}

impl PersistenceGateway {
	pub fn new(storage: Box<dyn SlotStorage>, sink: Box<dyn FileSink>) -> Self {
		Self { storage, sink }
	}

	pub fn save(&self, nodes: &[Node]) -> Result<(), PersistenceError> {
		let text = serialize(nodes)?;
		self.storage.write(STORAGE_KEY, &text)?;
		info!("saved {} nodes", nodes.len());
		Ok(())
	}

	pub fn export(&self, nodes: &[Node]) -> Result<(), PersistenceError> {
		let text = serialize(nodes)?;
		self.sink.offer_download(EXPORT_FILE_NAME, EXPORT_MIME, &text)?;
		info!("exported {} nodes to {EXPORT_FILE_NAME}", nodes.len());
		Ok(())
	}

	fn read_saved(&self) -> Result<Option<Vec<Node>>, PersistenceError> {
		let Some(text) = self.storage.read(STORAGE_KEY)? else {
			return Ok(None);
		};
		parse_graph(&text).map(Some).map_err(PersistenceError::CorruptPersistedState)
	}

	/// Build the startup graph from the storage slot. Anything missing or
	/// unreadable yields a lone root centered in `viewport`.
	pub fn load_initial(&self, viewport: (f64, f64), rng: SmallRng) -> GraphStore {
		let mut store = GraphStore::new(default_nodes(viewport), IdAllocator::new(), rng);
		match self.read_saved() {
			Ok(Some(nodes)) => {
				info!("loaded {} nodes from local storage", nodes.len());
				store.replace(nodes);
			}
			Ok(None) => info!("no saved mindmap, starting fresh"),
			Err(e) => warn!("ignoring saved mindmap: {e}"),
		}
		store
	}

	/// Replace the graph with the one encoded in `text`. On any validation
	/// failure the current graph is left as it was.
	pub fn import_text(&self, store: &mut GraphStore, text: &str) -> Result<(), PersistenceError> {
		let nodes = parse_graph(text).map_err(PersistenceError::ImportValidation)?;
		info!("imported {} nodes", nodes.len());
		store.replace(nodes);
		Ok(())
	}

	/// Forget the saved graph and return a fresh one centered in `viewport`.
	pub fn reset(
		&self,
		viewport: (f64, f64),
		rng: SmallRng,
	) -> Result<GraphStore, PersistenceError> {
		self.storage.remove(STORAGE_KEY)?;
		info!("cleared saved mindmap");
		Ok(GraphStore::new(default_nodes(viewport), IdAllocator::new(), rng))
	}
}
