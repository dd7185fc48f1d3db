//! Deferred loading of `document.write` resources.
//!
//! Third-party snippets often emit `<script>` and `<link>` tags through
//! `document.write`, which blocks the page. This crate intercepts that write
//! channel, captures the tags, and replays them as asynchronous loads:
//!
//! - **Capture**: every write is parsed into a [`Captured`] variant; scripts
//!   and stylesheets are queued, anything else is dropped with a diagnostic.
//! - **Sequencing**: scripts load strictly one after another, stylesheets
//!   load concurrently once every script is in.
//! - **Sessions**: a [`LoaderSession`] runs one capture, drain and restore
//!   cycle. The [`SessionManager`] allows a single live session at a time
//!   and keeps the native write capability to restore.
//! - **Registry**: a [`LibraryRegistry`] loads named libraries on demand and
//!   forgets them once loaded.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ LibraryRegistry  │  name → script URLs
//! └────────┬─────────┘
//!          │ one session per load
//! ┌────────▼─────────┐      ┌────────────────┐
//! │  LoaderSession   │─────▶│ SessionManager │  active marker, saved write
//! │  ┌────────────┐  │      └───────┬────────┘
//! │  │Interception│  │              │
//! │  └────────────┘  │      ┌───────▼────────┐
//! │  ┌────────────┐  │      │  impl Document │  host page seam
//! │  │ Sequencer  │──┼─────▶│                │
//! │  └────────────┘  │      └────────────────┘
//! └──────────────────┘
//! ```
//!
//! The core is host-agnostic; a page binding implements [`Document`].

pub mod capture;
pub mod config;
pub mod document;
pub mod error;
pub mod intercept;
pub mod manager;
pub mod registry;
pub mod sequencer;
pub mod session;
pub mod style;

pub use capture::{CaptureBuffer, Captured, extract_url};
pub use config::{LoaderConfig, ScriptSources};
pub use document::{Document, ResourceLoad, WriteSink};
pub use error::{Error, ResourceKind, Result};
pub use intercept::Interception;
pub use manager::SessionManager;
pub use registry::{LibraryRegistry, LoadOutcome};
pub use session::{LoadSummary, LoaderSession, SessionState};
pub use style::{ElementLookup, PRESENTATIONAL_ATTRIBUTES, StyledElement, strip_inline_style, strip_presentational};
