use thiserror::Error;

/// Failures at the boundaries of the dashboard: parsing, fetching, mounting.
///
/// Degraded data inside a loaded document is never an error; it is dropped
/// or defaulted and logged where it is consumed.
#[derive(Debug, Error)]
pub enum DashboardError {
	/// The render target id does not exist in the DOM.
	#[error("container `{0}` not found")]
	MissingContainer(String),

	/// A document, catalog or config failed to deserialize.
	#[error("failed to parse JSON: {0}")]
	Parse(#[from] serde_json::Error),

	/// A fetch did not produce a body.
	#[error("fetch of `{url}` failed: {reason}")]
	Fetch { url: String, reason: String },

	/// A browser API returned an error or was unavailable.
	#[error("browser API error: {0}")]
	Browser(String),

	/// A map id that the catalog does not list.
	#[error("unknown map `{0}`")]
	UnknownMap(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, DashboardError>;
