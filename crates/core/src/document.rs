//! The page seam: everything the loader needs from a host document.

use std::rc::Rc;

use futures_util::future::LocalBoxFuture;

use crate::error::Result;

/// Receives every payload written while interception is installed.
pub type WriteSink = Rc<dyn Fn(&str)>;

/// Settles when an attached resource element fires its load or error signal.
pub type ResourceLoad = LocalBoxFuture<'static, Result<()>>;

/// A host page whose write channel can be intercepted and to which script
/// and stylesheet elements can be attached.
///
/// Implementations are single-threaded; the loader never holds internal
/// borrows while calling into the document, so a write issued from inside
/// any of these methods is safe.
pub trait Document {
	/// The document's native write capability, saved and later put back.
	type Write: Clone;

	/// Returns the write capability currently installed on the document.
	fn current_write(&self) -> Result<Self::Write>;

	/// Replaces the write capability with a forwarder calling `sink`.
	fn install_write(&self, sink: WriteSink) -> Result<()>;

	/// Puts `original` back as the document's write capability.
	///
	/// Called from `Drop`, so failures must be handled (logged) by the
	/// implementation.
	fn restore_write(&self, original: &Self::Write);

	/// Attaches a `<script src=...>` element to the page body.
	fn append_script(&self, src: &str) -> Result<ResourceLoad>;

	/// Attaches a `<link rel="stylesheet" href=...>` element to the head.
	fn append_stylesheet(&self, href: &str) -> Result<ResourceLoad>;
}
