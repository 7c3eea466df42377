use thiserror::Error;

/// Why a piece of text is not a usable node list.
#[derive(Debug, Error)]
pub enum GraphFormatError {
	#[error("not a valid node list: {0}")]
	Malformed(#[from] serde_json::Error),

	#[error("no ROOT node present")]
	MissingRoot,

	#[error("{0} ROOT nodes present, expected exactly one")]
	MultipleRoots(usize),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
	#[error("could not write to local storage: {0}")]
	Storage(String),

	#[error("could not export file: {0}")]
	Export(String),

	#[error("import rejected: {0}")]
	ImportValidation(#[source] GraphFormatError),

	#[error("stored mindmap is unreadable: {0}")]
	CorruptPersistedState(#[source] GraphFormatError),

	#[error("could not encode mindmap: {0}")]
	Serialize(#[source] serde_json::Error),
}
