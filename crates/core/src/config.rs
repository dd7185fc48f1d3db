//! Loader configuration supplied by the host page.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Host configuration: which script URLs make up each named library.
///
/// ```json
/// {
///   "libraries": {
///     "chart": ["https://cdn.example.com/chart.js", "https://cdn.example.com/chart-theme.js"],
///     "maps": "https://maps.example.com/api.js"
///   },
///   "logLevel": "debug"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderConfig {
	/// Library name to its script URLs, in load order.
	#[serde(default)]
	pub libraries: IndexMap<String, ScriptSources>,
	/// Log filter directive used by hosts that install logging.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub log_level: Option<String>,
}

impl LoaderConfig {
	/// Parses and validates a JSON configuration document.
	pub fn from_json(json: &str) -> Result<Self> {
		let config: Self = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}

	/// Rejects libraries with no URLs or blank URLs.
	pub fn validate(&self) -> Result<()> {
		for (name, sources) in &self.libraries {
			if sources.is_empty() {
				return Err(Error::Config(format!("library '{name}' has no script URLs")));
			}
			if sources.iter().any(|url| url.trim().is_empty()) {
				return Err(Error::Config(format!("library '{name}' has a blank script URL")));
			}
		}
		Ok(())
	}
}

/// One script URL or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptSources {
	One(String),
	Many(Vec<String>),
}

impl ScriptSources {
	pub fn iter(&self) -> std::slice::Iter<'_, String> {
		match self {
			ScriptSources::One(url) => std::slice::from_ref(url).iter(),
			ScriptSources::Many(urls) => urls.iter(),
		}
	}

	pub fn len(&self) -> usize {
		match self {
			ScriptSources::One(_) => 1,
			ScriptSources::Many(urls) => urls.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn into_vec(self) -> Vec<String> {
		match self {
			ScriptSources::One(url) => vec![url],
			ScriptSources::Many(urls) => urls,
		}
	}
}

impl IntoIterator for ScriptSources {
	type Item = String;
	type IntoIter = std::vec::IntoIter<String>;

	fn into_iter(self) -> Self::IntoIter {
		self.into_vec().into_iter()
	}
}

impl From<&str> for ScriptSources {
	fn from(url: &str) -> Self {
		ScriptSources::One(url.to_string())
	}
}

impl From<String> for ScriptSources {
	fn from(url: String) -> Self {
		ScriptSources::One(url)
	}
}

impl From<Vec<String>> for ScriptSources {
	fn from(urls: Vec<String>) -> Self {
		ScriptSources::Many(urls)
	}
}

impl<const N: usize> From<[&str; N]> for ScriptSources {
	fn from(urls: [&str; N]) -> Self {
		ScriptSources::Many(urls.iter().map(|url| url.to_string()).collect())
	}
}
