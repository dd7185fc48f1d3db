//! `deferload::Document` on the live browser page.

use std::cell::RefCell;

use deferload::{
    Document, ElementLookup, Error, ResourceKind, ResourceLoad, Result, StyledElement, WriteSink,
};
use js_sys::{Function, Promise, Reflect};
use tracing::{trace, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlElement, HtmlLinkElement, HtmlScriptElement};

const WRITE: &str = "write";

/// The page's `document`, with the installed write hook kept alive.
pub struct WebDocument {
    document: web_sys::Document,
    hook: RefCell<Option<Closure<dyn Fn(JsValue)>>>,
}

impl WebDocument {
    pub fn new(document: web_sys::Document) -> Self {
        Self {
            document,
            hook: RefCell::new(None),
        }
    }

    /// Wraps `window.document`.
    pub fn from_window() -> Result<Self> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| Error::WriteChannel("no window.document".to_string()))?;
        Ok(Self::new(document))
    }

    fn attach(
        &self,
        kind: ResourceKind,
        url: &str,
        element: &HtmlElement,
        parent: Option<web_sys::Node>,
    ) -> Result<ResourceLoad> {
        let attach_error = |reason: String| Error::Attach {
            kind,
            url: url.to_string(),
            reason,
        };
        let parent = parent.ok_or_else(|| attach_error("no parent element".to_string()))?;

        let settled = Promise::new(&mut |resolve, reject| {
            element.set_onload(Some(&resolve));
            element.set_onerror(Some(&reject));
        });
        parent
            .append_child(element)
            .map_err(|err| attach_error(describe(&err)))?;
        trace!(%kind, url, "element appended");

        let url = url.to_string();
        Ok(Box::pin(async move {
            JsFuture::from(settled)
                .await
                .map(|_| ())
                .map_err(|err| Error::ResourceFailed {
                    kind,
                    url,
                    reason: describe(&err),
                })
        }))
    }
}

impl Document for WebDocument {
    type Write = Function;

    fn current_write(&self) -> Result<Function> {
        Reflect::get(&self.document, &JsValue::from_str(WRITE))
            .map_err(|err| Error::WriteChannel(describe(&err)))?
            .dyn_into::<Function>()
            .map_err(|_| Error::WriteChannel("document.write is not a function".to_string()))
    }

    fn install_write(&self, sink: WriteSink) -> Result<()> {
        // document.write(...text) is variadic; only the first argument is captured.
        let hook = Closure::<dyn Fn(JsValue)>::new(move |payload: JsValue| {
            match payload.as_string() {
                Some(payload) => sink(payload.as_str()),
                None => warn!(payload = ?payload, "ignoring non-string document write"),
            }
        });
        Reflect::set(
            &self.document,
            &JsValue::from_str(WRITE),
            hook.as_ref(),
        )
        .map_err(|err| Error::WriteChannel(describe(&err)))?;
        *self.hook.borrow_mut() = Some(hook);
        Ok(())
    }

    fn restore_write(&self, original: &Function) {
        if let Err(err) = Reflect::set(&self.document, &JsValue::from_str(WRITE), original) {
            warn!(error = %describe(&err), "failed to restore document.write");
            return;
        }
        self.hook.borrow_mut().take();
    }

    fn append_script(&self, src: &str) -> Result<ResourceLoad> {
        let script = self
            .document
            .create_element("script")
            .and_then(|el| el.dyn_into::<HtmlScriptElement>().map_err(JsValue::from))
            .map_err(|err| Error::Attach {
                kind: ResourceKind::Script,
                url: src.to_string(),
                reason: describe(&err),
            })?;
        script.set_src(src);
        self.attach(
            ResourceKind::Script,
            src,
            &script,
            self.document.body().map(Into::into),
        )
    }

    fn append_stylesheet(&self, href: &str) -> Result<ResourceLoad> {
        let link = self
            .document
            .create_element("link")
            .and_then(|el| el.dyn_into::<HtmlLinkElement>().map_err(JsValue::from))
            .map_err(|err| Error::Attach {
                kind: ResourceKind::Stylesheet,
                url: href.to_string(),
                reason: describe(&err),
            })?;
        link.set_rel("stylesheet");
        link.set_href(href);
        self.attach(
            ResourceKind::Stylesheet,
            href,
            &link,
            self.document.head().map(Into::into),
        )
    }
}

/// An element of the live page whose presentational attributes can be stripped.
pub struct PageElement(HtmlElement);

impl StyledElement for PageElement {
    fn is_hidden(&self) -> bool {
        self.0
            .style()
            .get_property_value("display")
            .is_ok_and(|display| display == "none")
    }

    fn remove_attribute(&self, name: &str) {
        if let Err(err) = self.0.remove_attribute(name) {
            trace!(attribute = name, error = %describe(&err), "attribute not removed");
        }
    }

    fn hide(&self) {
        if let Err(err) = self.0.style().set_property("display", "none") {
            warn!(error = %describe(&err), "failed to re-hide element");
        }
    }
}

impl ElementLookup for WebDocument {
    type Element = PageElement;

    fn element_by_id(&self, id: &str) -> Option<PageElement> {
        self.document
            .get_element_by_id(id)?
            .dyn_into::<HtmlElement>()
            .ok()
            .map(PageElement)
    }

    fn descendants_by_tag(&self, root: &PageElement, tag: &str) -> Vec<PageElement> {
        let collection = root.0.get_elements_by_tag_name(tag);
        (0..collection.length())
            .filter_map(|i| collection.item(i))
            .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
            .map(PageElement)
            .collect()
    }
}

/// Best-effort message for a thrown JS value or error event.
pub(crate) fn describe(err: &JsValue) -> String {
    if let Some(message) = err.as_string() {
        return message;
    }
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    js_sys::JSON::stringify(err)
        .ok()
        .and_then(|s| s.as_string())
        .filter(|s| s != "{}")
        .unwrap_or_else(|| "error event".to_string())
}
