//! Error type for loading the payload and attaching to the canvas.

/// Failures at the browser boundary.
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
	/// The page lacks an element the app reads from.
	#[error("no element with id {id:?} in the document")]
	MissingElement { id: String },
	/// The embedded payload does not deserialize.
	#[error("graph payload is not valid JSON: {0}")]
	Payload(#[from] serde_json::Error),
	/// No usable 2D context on the canvas.
	#[error("canvas unavailable: {0}")]
	Canvas(String),
}

/// Result alias for browser-boundary operations.
pub type Result<T> = std::result::Result<T, DiagramError>;
