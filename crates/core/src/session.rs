//! [`LoaderSession`]: one capture, drain and restore cycle.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::capture::CaptureBuffer;
use crate::document::{Document, WriteSink};
use crate::error::Result;
use crate::intercept::Interception;
use crate::manager::SessionManager;
use crate::sequencer;

/// Lifecycle of a [`LoaderSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
	Created,
	Intercepting,
	DrainingScripts,
	DrainingLinks,
	Settled,
	Failed,
}

impl fmt::Display for SessionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			SessionState::Created => "created",
			SessionState::Intercepting => "intercepting",
			SessionState::DrainingScripts => "draining-scripts",
			SessionState::DrainingLinks => "draining-links",
			SessionState::Settled => "settled",
			SessionState::Failed => "failed",
		};
		f.write_str(name)
	}
}

/// What a settled session loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
	/// Scripts attached and loaded, in order.
	pub scripts: usize,
	/// Stylesheets attached and loaded.
	pub stylesheets: usize,
	/// Captured payloads that were discarded.
	pub dropped: usize,
}

/// Single-use orchestration of a deferred load.
///
/// Construction fails with [`Error::SessionActive`](crate::Error::SessionActive)
/// while another session of the same manager is alive. Dropping the session
/// frees the manager for the next one.
pub struct LoaderSession<D: Document> {
	manager: Rc<SessionManager<D>>,
	buffer: Rc<RefCell<CaptureBuffer>>,
	state: SessionState,
}

impl<D: Document> LoaderSession<D> {
	/// Creates a session, claiming the manager's single session slot.
	pub fn new(manager: &Rc<SessionManager<D>>) -> Result<Self> {
		manager.acquire()?;
		Ok(Self {
			manager: Rc::clone(manager),
			buffer: Rc::new(RefCell::new(CaptureBuffer::new())),
			state: SessionState::Created,
		})
	}

	/// Queues one script URL ahead of anything captured later.
	pub fn add_script(&mut self, url: impl Into<String>) -> &mut Self {
		self.buffer.borrow_mut().push_script(url);
		self
	}

	/// Queues script URLs in the given order.
	pub fn add_scripts<I, S>(&mut self, urls: I) -> &mut Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		{
			let mut buffer = self.buffer.borrow_mut();
			for url in urls {
				buffer.push_script(url);
			}
		}
		self
	}

	pub fn state(&self) -> SessionState {
		self.state
	}

	/// Intercepts the write channel, loads every queued and captured script
	/// in order, then every captured stylesheet concurrently.
	///
	/// The write channel is restored before this returns, on success and on
	/// error alike. A resource that never signals keeps this pending.
	pub async fn init(mut self) -> Result<LoadSummary> {
		let result = self.run().await;
		match &result {
			Ok(summary) => {
				self.transition(SessionState::Settled);
				debug!(
					scripts = summary.scripts,
					stylesheets = summary.stylesheets,
					dropped = summary.dropped,
					"session settled"
				);
			}
			Err(e) => {
				self.transition(SessionState::Failed);
				warn!(error = %e, "session failed");
			}
		}
		result
	}

	async fn run(&mut self) -> Result<LoadSummary> {
		let manager = Rc::clone(&self.manager);
		let document = manager.document();

		let original = manager.original_write()?;
		let mut interception = Interception::install(document, original, self.sink())?;
		self.transition(SessionState::Intercepting);

		self.transition(SessionState::DrainingScripts);
		let scripts = sequencer::drain_scripts(document, &self.buffer).await?;

		self.transition(SessionState::DrainingLinks);
		let stylesheets = sequencer::drain_stylesheets(document, &self.buffer).await?;

		interception.restore();

		let buffer = self.buffer.borrow();
		if !buffer.is_empty() {
			debug!("entries captured after the link phase are discarded");
		}
		Ok(LoadSummary {
			scripts,
			stylesheets,
			dropped: buffer.dropped(),
		})
	}

	/// Write hook routing payloads into this session's buffer.
	fn sink(&self) -> WriteSink {
		let buffer = Rc::clone(&self.buffer);
		Rc::new(move |payload: &str| match buffer.try_borrow_mut() {
			Ok(mut buffer) => {
				buffer.capture(payload);
			}
			Err(_) => warn!(%payload, "dropping re-entrant document write"),
		})
	}

	fn transition(&mut self, next: SessionState) {
		debug!(from = %self.state, to = %next, "session state");
		self.state = next;
	}
}

impl<D: Document> Drop for LoaderSession<D> {
	fn drop(&mut self) {
		self.manager.release();
	}
}

impl<D: Document> fmt::Debug for LoaderSession<D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LoaderSession")
			.field("state", &self.state)
			.field("buffer", &self.buffer.borrow())
			.finish()
	}
}
