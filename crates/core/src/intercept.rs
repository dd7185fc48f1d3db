//! Scoped interception of the document write channel.

use tracing::debug;

use crate::document::{Document, WriteSink};
use crate::error::Result;

/// RAII handle that redirects document writes into a sink while alive.
///
/// The original capability is put back by [`restore`](Self::restore) or, at
/// the latest, on drop. Restoring twice is a no-op.
pub struct Interception<'a, D: Document> {
	document: &'a D,
	original: D::Write,
	installed: bool,
}

impl<'a, D: Document> Interception<'a, D> {
	/// Installs a forwarder on `document` that routes every write to `sink`.
	///
	/// `original` is what gets restored afterwards, regardless of what was
	/// installed at the time of the call.
	pub fn install(document: &'a D, original: D::Write, sink: WriteSink) -> Result<Self> {
		document.install_write(sink)?;
		debug!("write channel intercepted");
		Ok(Self {
			document,
			original,
			installed: true,
		})
	}

	/// Returns true while writes are being redirected.
	pub fn is_installed(&self) -> bool {
		self.installed
	}

	/// Puts the original write capability back.
	pub fn restore(&mut self) {
		if !self.installed {
			return;
		}
		self.installed = false;
		self.document.restore_write(&self.original);
		debug!("write channel restored");
	}
}

impl<D: Document> Drop for Interception<'_, D> {
	fn drop(&mut self) {
		self.restore();
	}
}

impl<D: Document> std::fmt::Debug for Interception<'_, D> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Interception")
			.field("installed", &self.installed)
			.finish()
	}
}
