//! [`LibraryRegistry`]: named libraries loaded on demand, at most once.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::LoaderConfig;
use crate::document::Document;
use crate::error::Result;
use crate::manager::SessionManager;
use crate::session::{LoadSummary, LoaderSession};

/// Result of a [`LibraryRegistry::load`] call that completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LoadOutcome {
	/// The library was loaded by this call.
	Loaded(LoadSummary),
	/// The name is unknown or was already loaded.
	NotRegistered,
}

/// Maps library names to script URL lists and loads each through a
/// [`LoaderSession`].
///
/// A library is removed once it loaded successfully, so loading it again is
/// a no-op. A failed load leaves the entry in place for a retry.
pub struct LibraryRegistry<D: Document> {
	manager: Rc<SessionManager<D>>,
	libraries: RefCell<IndexMap<String, Vec<String>>>,
}

impl<D: Document> LibraryRegistry<D> {
	pub fn new(manager: Rc<SessionManager<D>>, libraries: IndexMap<String, Vec<String>>) -> Self {
		Self {
			manager,
			libraries: RefCell::new(libraries),
		}
	}

	/// Builds a registry from the host configuration.
	pub fn from_config(manager: Rc<SessionManager<D>>, config: LoaderConfig) -> Result<Self> {
		config.validate()?;
		let libraries = config
			.libraries
			.into_iter()
			.map(|(name, sources)| (name, sources.into_vec()))
			.collect();
		Ok(Self::new(manager, libraries))
	}

	pub fn manager(&self) -> &Rc<SessionManager<D>> {
		&self.manager
	}

	/// Loads the library `name` and calls `on_done` once it is usable.
	///
	/// Unknown (or already loaded) names call `on_done` right away without
	/// touching the page. On failure `on_done` is not called, the entry stays
	/// registered and the error is returned.
	pub async fn load<F>(&self, name: &str, on_done: F) -> Result<LoadOutcome>
	where
		F: FnOnce(),
	{
		let urls = self.libraries.borrow().get(name).cloned();
		let Some(urls) = urls else {
			debug!(library = name, "library not registered, nothing to load");
			on_done();
			return Ok(LoadOutcome::NotRegistered);
		};

		debug!(library = name, count = urls.len(), "loading library");
		let mut session = LoaderSession::new(&self.manager)?;
		session.add_scripts(urls);
		let summary = session.init().await?;

		self.libraries.borrow_mut().shift_remove(name);
		info!(library = name, scripts = summary.scripts, stylesheets = summary.stylesheets, "library loaded");
		on_done();
		Ok(LoadOutcome::Loaded(summary))
	}

	/// Returns true if `name` is registered and not loaded yet.
	pub fn contains(&self, name: &str) -> bool {
		self.libraries.borrow().contains_key(name)
	}

	/// Names still waiting to be loaded, in registration order.
	pub fn names(&self) -> Vec<String> {
		self.libraries.borrow().keys().cloned().collect()
	}

	/// Script URLs registered for `name`.
	pub fn scripts(&self, name: &str) -> Option<Vec<String>> {
		self.libraries.borrow().get(name).cloned()
	}

	pub fn len(&self) -> usize {
		self.libraries.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.libraries.borrow().is_empty()
	}
}

impl<D: Document> std::fmt::Debug for LibraryRegistry<D> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LibraryRegistry")
			.field("libraries", &self.libraries.borrow())
			.field("manager", &self.manager)
			.finish()
	}
}
