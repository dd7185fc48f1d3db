//! Error types for capture, sequencing and registry loads.

use std::fmt;

use thiserror::Error;

/// Result type alias for loader operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The kind of page resource a tag refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
	/// `<script src=...>`
	Script,
	/// `<link href=... rel="stylesheet">`
	Stylesheet,
}

impl ResourceKind {
	/// Returns the URL attribute carrying the resource location.
	pub fn url_attribute(self) -> &'static str {
		match self {
			ResourceKind::Script => "src",
			ResourceKind::Stylesheet => "href",
		}
	}
}

impl fmt::Display for ResourceKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ResourceKind::Script => f.write_str("script"),
			ResourceKind::Stylesheet => f.write_str("stylesheet"),
		}
	}
}

/// Errors that can occur while loading deferred resources.
#[derive(Debug, Error)]
pub enum Error {
	/// Another loader session is still live on the same manager.
	#[error("only one loader session may be active at a time")]
	SessionActive,

	/// The document's write capability could not be read or replaced.
	#[error("write channel unavailable: {0}")]
	WriteChannel(String),

	/// A resource element could not be created or attached to the page.
	#[error("failed to attach {kind} '{url}': {reason}")]
	Attach {
		kind: ResourceKind,
		url: String,
		reason: String,
	},

	/// A resource element fired its error signal.
	#[error("{kind} '{url}' failed to load: {reason}")]
	ResourceFailed {
		kind: ResourceKind,
		url: String,
		reason: String,
	},

	/// Invalid loader configuration.
	#[error("invalid loader configuration: {0}")]
	Config(String),

	/// JSON deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Returns true if a page resource failed to attach or load.
	pub fn is_resource_failure(&self) -> bool {
		matches!(self, Error::Attach { .. } | Error::ResourceFailed { .. })
	}

	/// Returns the URL of the failed resource, if any.
	pub fn resource_url(&self) -> Option<&str> {
		match self {
			Error::Attach { url, .. } | Error::ResourceFailed { url, .. } => Some(url),
			_ => None,
		}
	}
}
