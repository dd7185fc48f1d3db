//! Load ordering: scripts one after another, then stylesheets all at once.

use std::cell::RefCell;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::capture::{CaptureBuffer, extract_url};
use crate::document::Document;
use crate::error::{ResourceKind, Result};

/// Attaches queued scripts one at a time, awaiting each load before popping
/// the next entry. Returns the number of scripts loaded.
///
/// Scripts captured while an earlier script loads join the same queue and
/// are loaded by this loop.
pub async fn drain_scripts<D: Document>(document: &D, buffer: &RefCell<CaptureBuffer>) -> Result<usize> {
	let mut loaded = 0;
	loop {
		// The borrow must end before the document runs any script.
		let next = buffer.borrow_mut().pop_script();
		let Some(src) = next else { break };

		debug!(url = %src, "attaching script");
		document.append_script(&src)?.await?;
		debug!(url = %src, "script loaded");
		loaded += 1;
	}
	Ok(loaded)
}

/// Attaches every queued stylesheet and waits until all of them settled.
/// Returns the number of stylesheets loaded.
///
/// Completion order is irrelevant. If any stylesheet failed to attach or
/// load, an error is returned once every attached load settled. Attach
/// failures are reported before load failures.
pub async fn drain_stylesheets<D: Document>(document: &D, buffer: &RefCell<CaptureBuffer>) -> Result<usize> {
	let raws = buffer.borrow_mut().take_links();

	let mut pending = Vec::with_capacity(raws.len());
	let mut first_error = None;
	for raw in raws {
		let Some(href) = extract_url(&raw, ResourceKind::Stylesheet) else {
			warn!(payload = %raw, "dropping link without a quoted href");
			buffer.borrow_mut().record_drop();
			continue;
		};
		debug!(url = %href, "attaching stylesheet");
		match document.append_stylesheet(&href) {
			Ok(load) => pending.push(load),
			Err(err) => {
				warn!(url = %href, error = %err, "stylesheet not attached");
				first_error.get_or_insert(err);
			}
		}
	}

	let count = pending.len();
	for result in join_all(pending).await {
		if let Err(err) = result {
			first_error.get_or_insert(err);
		}
	}
	if let Some(err) = first_error {
		return Err(err);
	}
	debug!(count, "stylesheets settled");
	Ok(count)
}
