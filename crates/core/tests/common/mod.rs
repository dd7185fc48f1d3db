// In-memory page used by the integration tests.
//
// Loads are oneshot channels: in auto mode they settle on first poll, in
// manual mode the test settles them with `complete` / `fail`.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use deferload::{Document, Error, ResourceKind, ResourceLoad, Result, WriteSink};
use tokio::sync::oneshot;

/// Something the page observed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
	Intercepted,
	Restored(NativeWrite),
	/// A session hook was put back instead of a native capability.
	RestoredHook,
	Attached(ResourceKind, String),
	Loaded(ResourceKind, String),
	Failed(ResourceKind, String),
}

/// Identifies a native write capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeWrite(pub u32);

/// Whatever `document.write` currently holds. Like a real page, reading it
/// while a session is intercepting yields that session's hook.
#[derive(Clone)]
pub enum PageWrite {
	Native(NativeWrite),
	Hooked(WriteSink),
}

struct Pending {
	kind: ResourceKind,
	url: String,
	tx: oneshot::Sender<Result<()>>,
}

struct State {
	slot: PageWrite,
	manual: bool,
	refuse_install: bool,
	unattachable: HashSet<String>,
	events: Vec<Event>,
	pending: Vec<Pending>,
	dom_writes: Vec<String>,
	writes_on_load: HashMap<String, Vec<String>>,
	failing: HashSet<String>,
}

#[derive(Clone)]
pub struct FakeDocument {
	state: Rc<RefCell<State>>,
}

impl FakeDocument {
	/// Loads settle as soon as they are awaited.
	pub fn auto() -> Self {
		Self::with_mode(false)
	}

	/// Loads settle only when the test says so.
	pub fn manual() -> Self {
		Self::with_mode(true)
	}

	fn with_mode(manual: bool) -> Self {
		Self {
			state: Rc::new(RefCell::new(State {
				slot: PageWrite::Native(NativeWrite(1)),
				manual,
				refuse_install: false,
				unattachable: HashSet::new(),
				events: Vec::new(),
				pending: Vec::new(),
				dom_writes: Vec::new(),
				writes_on_load: HashMap::new(),
				failing: HashSet::new(),
			})),
		}
	}

	/// When `url` finishes loading it writes `payloads` through the page.
	pub fn writes_on_load(&self, url: &str, payloads: &[&str]) {
		self.state
			.borrow_mut()
			.writes_on_load
			.insert(url.to_string(), payloads.iter().map(|p| p.to_string()).collect());
	}

	/// In auto mode, `url` fires its error signal instead of loading.
	pub fn fails(&self, url: &str) {
		self.state.borrow_mut().failing.insert(url.to_string());
	}

	pub fn refuse_install(&self) {
		self.state.borrow_mut().refuse_install = true;
	}

	/// Appending an element for `url` fails before anything is attached.
	pub fn refuse_attach(&self, url: &str) {
		self.state.borrow_mut().unattachable.insert(url.to_string());
	}

	/// Replaces the native write capability, as a host script might.
	pub fn set_native_write(&self, native: NativeWrite) {
		self.state.borrow_mut().slot = PageWrite::Native(native);
	}

	/// The native capability currently installed, if not intercepted.
	pub fn native_write(&self) -> Option<NativeWrite> {
		match self.state.borrow().slot {
			PageWrite::Native(native) => Some(native),
			PageWrite::Hooked(_) => None,
		}
	}

	/// Calls `document.write(payload)`.
	pub fn write(&self, payload: &str) {
		let hook = match &self.state.borrow().slot {
			PageWrite::Hooked(sink) => Some(Rc::clone(sink)),
			PageWrite::Native(_) => None,
		};
		match hook {
			Some(sink) => sink(payload),
			None => self.state.borrow_mut().dom_writes.push(payload.to_string()),
		}
	}

	pub fn events(&self) -> Vec<Event> {
		self.state.borrow().events.clone()
	}

	/// URLs attached for `kind`, in attachment order.
	pub fn attached(&self, kind: ResourceKind) -> Vec<String> {
		self.state
			.borrow()
			.events
			.iter()
			.filter_map(|event| match event {
				Event::Attached(k, url) if *k == kind => Some(url.clone()),
				_ => None,
			})
			.collect()
	}

	pub fn count(&self, wanted: fn(&Event) -> bool) -> usize {
		self.state.borrow().events.iter().filter(|e| wanted(e)).count()
	}

	/// Markup that reached the page through the native write channel.
	pub fn dom_writes(&self) -> Vec<String> {
		self.state.borrow().dom_writes.clone()
	}

	/// Unsettled loads, oldest first.
	pub fn pending(&self) -> Vec<(ResourceKind, String)> {
		self.state
			.borrow()
			.pending
			.iter()
			.map(|p| (p.kind, p.url.clone()))
			.collect()
	}

	/// Yields until at least `n` loads are pending.
	pub async fn wait_pending(&self, n: usize) -> Vec<(ResourceKind, String)> {
		loop {
			let pending = self.pending();
			if pending.len() >= n {
				return pending;
			}
			tokio::task::yield_now().await;
		}
	}

	/// Settles the pending load of `url` successfully.
	pub fn complete(&self, url: &str) {
		self.settle(url, true);
	}

	/// Settles the pending load of `url` with its error signal.
	pub fn fail(&self, url: &str) {
		self.settle(url, false);
	}

	fn settle(&self, url: &str, ok: bool) {
		let pending = {
			let mut state = self.state.borrow_mut();
			let index = state
				.pending
				.iter()
				.position(|p| p.url == url)
				.unwrap_or_else(|| panic!("no pending load for {url}"));
			state.pending.remove(index)
		};
		let result = self.finish(pending.kind, &pending.url, ok);
		let _ = pending.tx.send(result);
	}

	/// Runs the resource's side effects and records the outcome.
	fn finish(&self, kind: ResourceKind, url: &str, ok: bool) -> Result<()> {
		if !ok {
			self.record(Event::Failed(kind, url.to_string()));
			return Err(Error::ResourceFailed {
				kind,
				url: url.to_string(),
				reason: "error event".to_string(),
			});
		}
		let writes = self.state.borrow().writes_on_load.get(url).cloned().unwrap_or_default();
		for payload in writes {
			self.write(&payload);
		}
		self.record(Event::Loaded(kind, url.to_string()));
		Ok(())
	}

	fn record(&self, event: Event) {
		self.state.borrow_mut().events.push(event);
	}

	fn attach(&self, kind: ResourceKind, url: &str) -> Result<ResourceLoad> {
		if self.state.borrow().unattachable.contains(url) {
			return Err(Error::Attach {
				kind,
				url: url.to_string(),
				reason: "appendChild threw".to_string(),
			});
		}
		self.record(Event::Attached(kind, url.to_string()));
		let url = url.to_string();

		if self.state.borrow().manual {
			let (tx, rx) = oneshot::channel();
			self.state.borrow_mut().pending.push(Pending {
				kind,
				url: url.clone(),
				tx,
			});
			return Ok(Box::pin(async move {
				rx.await.unwrap_or_else(|_| {
					Err(Error::ResourceFailed {
						kind,
						url,
						reason: "element removed".to_string(),
					})
				})
			}));
		}

		let page = self.clone();
		Ok(Box::pin(async move {
			let ok = !page.state.borrow().failing.contains(&url);
			page.finish(kind, &url, ok)
		}))
	}
}

impl Document for FakeDocument {
	type Write = PageWrite;

	fn current_write(&self) -> Result<PageWrite> {
		Ok(self.state.borrow().slot.clone())
	}

	fn install_write(&self, sink: WriteSink) -> Result<()> {
		let mut state = self.state.borrow_mut();
		if state.refuse_install {
			return Err(Error::WriteChannel("document.write is not writable".to_string()));
		}
		state.slot = PageWrite::Hooked(sink);
		state.events.push(Event::Intercepted);
		Ok(())
	}

	fn restore_write(&self, original: &PageWrite) {
		let mut state = self.state.borrow_mut();
		state.slot = original.clone();
		let event = match original {
			PageWrite::Native(native) => Event::Restored(*native),
			PageWrite::Hooked(_) => Event::RestoredHook,
		};
		state.events.push(event);
	}

	fn append_script(&self, src: &str) -> Result<ResourceLoad> {
		self.attach(ResourceKind::Script, src)
	}

	fn append_stylesheet(&self, href: &str) -> Result<ResourceLoad> {
		self.attach(ResourceKind::Stylesheet, href)
	}
}
