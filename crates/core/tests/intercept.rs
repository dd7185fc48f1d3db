// Write channel interception tests.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{Event, FakeDocument, NativeWrite, PageWrite};
use deferload::{Document, Interception, WriteSink};

fn recording_sink() -> (WriteSink, Rc<RefCell<Vec<String>>>) {
	let seen = Rc::new(RefCell::new(Vec::new()));
	let sink_seen = Rc::clone(&seen);
	let sink: WriteSink = Rc::new(move |payload: &str| sink_seen.borrow_mut().push(payload.to_string()));
	(sink, seen)
}

#[test]
fn test_interception_redirects_until_restored() {
	let page = FakeDocument::auto();
	let original = page.current_write().unwrap();
	let (sink, seen) = recording_sink();

	let mut interception = Interception::install(&page, original, sink).unwrap();
	assert!(interception.is_installed());

	page.write("<script src='a.js'></script>");
	assert_eq!(*seen.borrow(), ["<script src='a.js'></script>"]);
	assert!(page.dom_writes().is_empty());

	interception.restore();
	assert!(!interception.is_installed());
	interception.restore();
	drop(interception);

	assert_eq!(page.count(|e| matches!(e, Event::Restored(_))), 1);
	assert_eq!(page.native_write(), Some(NativeWrite(1)));
	page.write("<p>page</p>");
	assert_eq!(page.dom_writes(), ["<p>page</p>"]);
}

#[test]
fn test_interception_restores_on_drop() {
	let page = FakeDocument::auto();
	let (sink, _) = recording_sink();

	{
		let interception = Interception::install(&page, PageWrite::Native(NativeWrite(7)), sink).unwrap();
		assert!(interception.is_installed());
		assert_eq!(page.native_write(), None);
	}

	assert_eq!(page.events(), [Event::Intercepted, Event::Restored(NativeWrite(7))]);
	assert_eq!(page.native_write(), Some(NativeWrite(7)));
}
