//! Shared state guarding the one-session-at-a-time contract.

use std::cell::{Cell, RefCell};

use tracing::error;

use crate::document::Document;
use crate::error::{Error, Result};

/// Owns the host document, the "session active" marker and the saved
/// native write capability.
///
/// Shared by `Rc` between the [`LibraryRegistry`](crate::LibraryRegistry)
/// and every [`LoaderSession`](crate::LoaderSession) built from it.
pub struct SessionManager<D: Document> {
	document: D,
	active: Cell<bool>,
	original_write: RefCell<Option<D::Write>>,
}

impl<D: Document> SessionManager<D> {
	pub fn new(document: D) -> Self {
		Self {
			document,
			active: Cell::new(false),
			original_write: RefCell::new(None),
		}
	}

	/// Returns the managed document.
	pub fn document(&self) -> &D {
		&self.document
	}

	/// Returns true while a session exists.
	pub fn is_active(&self) -> bool {
		self.active.get()
	}

	/// Marks a session as live, saving the native write capability the first
	/// time a session is acquired.
	pub(crate) fn acquire(&self) -> Result<()> {
		if self.active.get() {
			error!("refusing to start a second loader session");
			return Err(Error::SessionActive);
		}
		if self.original_write.borrow().is_none() {
			let original = self.document.current_write()?;
			*self.original_write.borrow_mut() = Some(original);
		}
		self.active.set(true);
		Ok(())
	}

	pub(crate) fn release(&self) {
		self.active.set(false);
	}

	/// The write capability saved when the first session was acquired.
	pub(crate) fn original_write(&self) -> Result<D::Write> {
		self.original_write
			.borrow()
			.clone()
			.ok_or_else(|| Error::WriteChannel("no write capability saved".to_string()))
	}
}

impl<D: Document> std::fmt::Debug for SessionManager<D> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SessionManager")
			.field("active", &self.active.get())
			.field("write_saved", &self.original_write.borrow().is_some())
			.finish()
	}
}
