//! Classification and queuing of intercepted `document.write` payloads.
//!
//! Every payload is parsed once into a [`Captured`] variant. Script tags are
//! queued by URL; link tags are queued raw and their `href` is extracted when
//! the link queue is drained.

use std::collections::VecDeque;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::ResourceKind;

/// Quoted `src="..."` / `src='...'` attribute inside a tag fragment.
static SRC_ATTR_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#"(?i)(?:^|\s)src\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());
/// Quoted `href="..."` / `href='...'` attribute inside a tag fragment.
static HREF_ATTR_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#"(?i)(?:^|\s)href\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());

const SCRIPT_MARKER: &str = "<script";
const LINK_MARKER: &str = "<link";

/// Result of classifying a single write payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Captured {
	/// A script tag with an extracted `src` URL.
	Script { url: String },
	/// A link tag, kept raw until drain time.
	Stylesheet { raw: String },
	/// A recognized tag whose URL attribute could not be extracted.
	Malformed { kind: ResourceKind, payload: String },
	/// Anything that is neither a script nor a link tag.
	Unrecognized { payload: String },
}

impl Captured {
	/// Classifies a payload written through the document write channel.
	pub fn parse(payload: &str) -> Self {
		let tag = payload.trim_start();
		match tag_kind(tag) {
			Some(ResourceKind::Script) => match extract_url(tag, ResourceKind::Script) {
				Some(url) => Captured::Script { url },
				None => Captured::Malformed {
					kind: ResourceKind::Script,
					payload: payload.to_string(),
				},
			},
			Some(ResourceKind::Stylesheet) => Captured::Stylesheet { raw: tag.to_string() },
			None => Captured::Unrecognized {
				payload: payload.to_string(),
			},
		}
	}
}

fn tag_kind(tag: &str) -> Option<ResourceKind> {
	let starts_with = |marker: &str| tag.get(..marker.len()).is_some_and(|prefix| prefix.eq_ignore_ascii_case(marker));

	if starts_with(SCRIPT_MARKER) {
		Some(ResourceKind::Script)
	} else if starts_with(LINK_MARKER) {
		Some(ResourceKind::Stylesheet)
	} else {
		None
	}
}

/// Extracts the quoted URL attribute (`src` for scripts, `href` for
/// stylesheets) from a tag fragment.
///
/// Returns `None` when the attribute is missing, unquoted, unterminated or
/// empty. The value ends at the next quote of the same kind as the opening
/// one and is returned as written.
pub fn extract_url(tag: &str, kind: ResourceKind) -> Option<String> {
	let re = match kind {
		ResourceKind::Script => &*SRC_ATTR_RE,
		ResourceKind::Stylesheet => &*HREF_ATTR_RE,
	};

	let caps = re.captures(tag)?;
	let value = caps.get(1).or_else(|| caps.get(2))?.as_str();
	if value.is_empty() {
		return None;
	}
	Some(value.to_string())
}

/// Ordered script and stylesheet queues filled by intercepted writes.
#[derive(Debug, Default)]
pub struct CaptureBuffer {
	scripts: VecDeque<String>,
	links: Vec<String>,
	dropped: usize,
}

impl CaptureBuffer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Classifies `payload` and queues it. Returns `false` if it was dropped.
	pub fn capture(&mut self, payload: &str) -> bool {
		match Captured::parse(payload) {
			Captured::Script { url } => {
				debug!(%url, "captured script");
				self.scripts.push_back(url);
				true
			}
			Captured::Stylesheet { raw } => {
				debug!(payload = %raw, "captured stylesheet");
				self.links.push(raw);
				true
			}
			Captured::Malformed { kind, payload } => {
				warn!(%kind, attribute = kind.url_attribute(), %payload, "dropping write without a quoted URL attribute");
				self.dropped += 1;
				false
			}
			Captured::Unrecognized { payload } => {
				warn!(%payload, "dropping unrecognized document write");
				self.dropped += 1;
				false
			}
		}
	}

	/// Appends a script URL, bypassing classification.
	pub fn push_script(&mut self, url: impl Into<String>) {
		self.scripts.push_back(url.into());
	}

	/// Removes and returns the next script URL in load order.
	pub fn pop_script(&mut self) -> Option<String> {
		self.scripts.pop_front()
	}

	/// Drains every queued link tag.
	pub fn take_links(&mut self) -> Vec<String> {
		std::mem::take(&mut self.links)
	}

	/// Counts an entry dropped outside of [`capture`](Self::capture).
	pub(crate) fn record_drop(&mut self) {
		self.dropped += 1;
	}

	/// Queued script URLs, front first.
	pub fn scripts(&self) -> impl Iterator<Item = &str> {
		self.scripts.iter().map(String::as_str)
	}

	/// Queued raw link tags.
	pub fn links(&self) -> impl Iterator<Item = &str> {
		self.links.iter().map(String::as_str)
	}

	/// Number of payloads dropped so far.
	pub fn dropped(&self) -> usize {
		self.dropped
	}

	pub fn is_empty(&self) -> bool {
		self.scripts.is_empty() && self.links.is_empty()
	}
}
